//! Session and application attribute stores.
//!
//! These outlive a single request and are reachable from concurrently executing request
//! threads, so the store itself is guarded at this boundary.

use super::{AttributeSource, AttributeValue, ScopeKind};
use crate::error::ScopeError;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Attribute store shared across requests. Cloning yields another handle to the same store.
#[derive(Debug, Clone)]
pub struct SharedAttributes {
    scope: ScopeKind,
    values: Arc<RwLock<HashMap<String, AttributeValue>>>,
}

impl SharedAttributes {
    pub fn new(scope: ScopeKind) -> Self {
        Self {
            scope,
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn application() -> Self {
        Self::new(ScopeKind::Application)
    }

    /// True when both handles point at the same underlying store.
    pub fn same_store(&self, other: &SharedAttributes) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl AttributeSource for SharedAttributes {
    type Value = AttributeValue;

    fn scope(&self) -> ScopeKind {
        self.scope
    }

    fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.values.read().get(key).cloned()
    }

    fn set_attribute(&mut self, key: &str, value: AttributeValue) -> Result<(), ScopeError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_attribute(&mut self, key: &str) -> Result<(), ScopeError> {
        self.values.write().remove(key);
        Ok(())
    }

    fn attribute_names(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }
}

/// An HTTP session: an id plus its shared attribute store
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    attributes: SharedAttributes,
}

impl Session {
    pub fn new() -> Self {
        let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let created_at = Utc::now();
        Self {
            id: format!("sess-{}-{}-{seq}", created_at.timestamp_millis(), std::process::id()),
            created_at,
            attributes: SharedAttributes::new(ScopeKind::Session),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn attributes(&self) -> SharedAttributes {
        self.attributes.clone()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
