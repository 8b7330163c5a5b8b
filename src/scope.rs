//! Scoped Attribute Maps
//!
//! A uniform map view over heterogeneous attribute stores (request, session, application,
//! cookies, headers, parameters, init parameters). Each store supplies four primitives
//! through [`AttributeSource`]; [`AttributeMap`] derives the full map surface from them once.

pub mod read_only;
pub mod request;
pub mod shared;

pub use read_only::{Cookie, ReadOnlySource};
pub use request::RequestAttributes;
pub use shared::{Session, SharedAttributes};

use crate::error::ScopeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type stored in the mutable scopes
pub type AttributeValue = serde_json::Value;

/// Which backing store a map is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    Request,
    Session,
    Application,
    Cookie,
    Header,
    HeaderValues,
    Parameter,
    ParameterValues,
    InitParameter,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeKind::Request => "request",
            ScopeKind::Session => "session",
            ScopeKind::Application => "application",
            ScopeKind::Cookie => "cookie",
            ScopeKind::Header => "header",
            ScopeKind::HeaderValues => "header-values",
            ScopeKind::Parameter => "parameter",
            ScopeKind::ParameterValues => "parameter-values",
            ScopeKind::InitParameter => "init-parameter",
        };
        f.write_str(name)
    }
}

/// The four primitives a concrete store must supply.
pub trait AttributeSource {
    type Value: Clone + PartialEq;

    fn scope(&self) -> ScopeKind;

    /// Read-only stores reject every mutation, including bulk ones on an empty map.
    fn is_read_only(&self) -> bool {
        false
    }

    fn get_attribute(&self, key: &str) -> Option<Self::Value>;

    fn set_attribute(&mut self, key: &str, value: Self::Value) -> Result<(), ScopeError>;

    fn remove_attribute(&mut self, key: &str) -> Result<(), ScopeError>;

    fn attribute_names(&self) -> Vec<String>;
}

/// Map semantics implemented against an [`AttributeSource`]
#[derive(Debug, Clone)]
pub struct AttributeMap<S> {
    source: S,
}

impl<S: AttributeSource> AttributeMap<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn scope(&self) -> ScopeKind {
        self.source.scope()
    }

    pub fn get(&self, key: &str) -> Option<S::Value> {
        self.source.get_attribute(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.source.get_attribute(key).is_some()
    }

    /// Linear scan over every attribute.
    pub fn contains_value(&self, value: &S::Value) -> bool {
        self.source
            .attribute_names()
            .iter()
            .filter_map(|name| self.source.get_attribute(name))
            .any(|v| &v == value)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn put(
        &mut self,
        key: impl AsRef<str>,
        value: S::Value,
    ) -> Result<Option<S::Value>, ScopeError> {
        let key = key.as_ref();
        let previous = self.source.get_attribute(key);
        self.source.set_attribute(key, value)?;
        Ok(previous)
    }

    /// Remove `key`, returning the removed value. Read-only stores fail even for absent keys.
    pub fn remove(&mut self, key: &str) -> Result<Option<S::Value>, ScopeError> {
        let previous = self.source.get_attribute(key);
        self.source.remove_attribute(key)?;
        Ok(previous)
    }

    pub fn put_all<K, I>(&mut self, entries: I) -> Result<(), ScopeError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, S::Value)>,
    {
        self.reject_if_read_only("put_all")?;
        for (key, value) in entries {
            self.source.set_attribute(key.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ScopeError> {
        self.reject_if_read_only("clear")?;
        for name in self.source.attribute_names() {
            self.source.remove_attribute(&name)?;
        }
        Ok(())
    }

    /// Size by counting the enumeration.
    pub fn len(&self) -> usize {
        self.source.attribute_names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.source.attribute_names()
    }

    pub fn values(&self) -> Vec<S::Value> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    pub fn entries(&self) -> Vec<(String, S::Value)> {
        self.source
            .attribute_names()
            .into_iter()
            .filter_map(|name| {
                let value = self.source.get_attribute(&name)?;
                Some((name, value))
            })
            .collect()
    }

    /// Read-only iteration over a snapshot of the current entries.
    pub fn iter(&self) -> impl Iterator<Item = (String, S::Value)> {
        self.entries().into_iter()
    }

    /// Cursor that supports one `remove()` per `next()`.
    pub fn cursor(&mut self) -> AttributeCursor<'_, S> {
        let names = self.source.attribute_names().into_iter();
        AttributeCursor {
            map: self,
            names,
            current: None,
        }
    }

    fn reject_if_read_only(&self, operation: &'static str) -> Result<(), ScopeError> {
        if self.source.is_read_only() {
            return Err(ScopeError::ReadOnly {
                scope: self.source.scope(),
                operation,
            });
        }
        Ok(())
    }
}

/// Iteration cursor over an [`AttributeMap`]
pub struct AttributeCursor<'a, S: AttributeSource> {
    map: &'a mut AttributeMap<S>,
    names: std::vec::IntoIter<String>,
    current: Option<String>,
}

impl<S: AttributeSource> AttributeCursor<'_, S> {
    /// Advance to the next live entry. Names removed since the cursor was created are skipped.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(String, S::Value)> {
        for name in self.names.by_ref() {
            if let Some(value) = self.map.source.get_attribute(&name) {
                self.current = Some(name.clone());
                return Some((name, value));
            }
        }
        self.current = None;
        None
    }

    /// Remove the entry last returned by `next()`.
    pub fn remove(&mut self) -> Result<(), ScopeError> {
        let key = self
            .current
            .take()
            .ok_or(ScopeError::IllegalIteratorState)?;
        self.map.source.remove_attribute(&key)
    }
}
