//! In-memory character buffer shared between a writer and its owner.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Growable text buffer. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<String>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> String {
        self.inner.lock().clone()
    }

    /// Drain the buffer, leaving it empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl fmt::Write for SharedBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.lock().push_str(s);
        Ok(())
    }
}
