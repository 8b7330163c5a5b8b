//! Request-scoped attribute store.

use super::{AttributeSource, AttributeValue, ScopeKind};
use crate::error::ScopeError;
use std::collections::HashMap;

/// Attributes bound to a single request. Owned by one worker thread; no locking.
#[derive(Debug, Clone, Default)]
pub struct RequestAttributes {
    values: HashMap<String, AttributeValue>,
}

impl RequestAttributes {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttributeSource for RequestAttributes {
    type Value = AttributeValue;

    fn scope(&self) -> ScopeKind {
        ScopeKind::Request
    }

    fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.values.get(key).cloned()
    }

    fn set_attribute(&mut self, key: &str, value: AttributeValue) -> Result<(), ScopeError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_attribute(&mut self, key: &str) -> Result<(), ScopeError> {
        self.values.remove(key);
        Ok(())
    }

    fn attribute_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
