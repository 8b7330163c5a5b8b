//! Read-only attribute stores: cookies, headers, request parameters and init parameters.

use super::{AttributeSource, ScopeKind};
use crate::error::ScopeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A request cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub max_age: Option<i64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            secure: false,
            http_only: false,
        }
    }
}

/// Immutable snapshot of request-supplied data exposed as a map.
///
/// Entries keep the order in which names first appeared.
#[derive(Debug, Clone)]
pub struct ReadOnlySource<V> {
    scope: ScopeKind,
    entries: Arc<Vec<(String, V)>>,
    case_insensitive: bool,
}

impl<V: Clone + PartialEq> ReadOnlySource<V> {
    fn from_entries(scope: ScopeKind, entries: Vec<(String, V)>, case_insensitive: bool) -> Self {
        Self {
            scope,
            entries: Arc::new(entries),
            case_insensitive,
        }
    }

    fn matches(&self, candidate: &str, key: &str) -> bool {
        if self.case_insensitive {
            candidate.eq_ignore_ascii_case(key)
        } else {
            candidate == key
        }
    }
}

impl ReadOnlySource<Cookie> {
    /// First cookie wins when a name repeats.
    pub fn cookies(cookies: &[Cookie]) -> Self {
        let mut entries: Vec<(String, Cookie)> = Vec::new();
        for cookie in cookies {
            if !entries.iter().any(|(name, _)| name == &cookie.name) {
                entries.push((cookie.name.clone(), cookie.clone()));
            }
        }
        Self::from_entries(ScopeKind::Cookie, entries, false)
    }
}

impl ReadOnlySource<String> {
    /// Header name to first value; lookup ignores ASCII case.
    pub fn headers(pairs: &[(String, String)]) -> Self {
        let entries = group(pairs, true)
            .into_iter()
            .filter_map(|(name, mut values)| {
                if values.is_empty() {
                    None
                } else {
                    Some((name, values.swap_remove(0)))
                }
            })
            .collect();
        Self::from_entries(ScopeKind::Header, entries, true)
    }

    /// Parameter name to first value.
    pub fn parameters(pairs: &[(String, String)]) -> Self {
        let entries = group(pairs, false)
            .into_iter()
            .filter_map(|(name, mut values)| {
                if values.is_empty() {
                    None
                } else {
                    Some((name, values.swap_remove(0)))
                }
            })
            .collect();
        Self::from_entries(ScopeKind::Parameter, entries, false)
    }

    pub fn init_parameters(params: &HashMap<String, String>) -> Self {
        let mut entries: Vec<(String, String)> =
            params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self::from_entries(ScopeKind::InitParameter, entries, false)
    }
}

impl ReadOnlySource<Vec<String>> {
    pub fn header_values(pairs: &[(String, String)]) -> Self {
        Self::from_entries(ScopeKind::HeaderValues, group(pairs, true), true)
    }

    pub fn parameter_values(pairs: &[(String, String)]) -> Self {
        Self::from_entries(ScopeKind::ParameterValues, group(pairs, false), false)
    }
}

fn group(pairs: &[(String, String)], case_insensitive: bool) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (name, value) in pairs {
        let existing = grouped.iter_mut().find(|(n, _)| {
            if case_insensitive {
                n.eq_ignore_ascii_case(name)
            } else {
                n == name
            }
        });
        match existing {
            Some((_, values)) => values.push(value.clone()),
            None => grouped.push((name.clone(), vec![value.clone()])),
        }
    }
    grouped
}

impl<V: Clone + PartialEq> AttributeSource for ReadOnlySource<V> {
    type Value = V;

    fn scope(&self) -> ScopeKind {
        self.scope
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn get_attribute(&self, key: &str) -> Option<V> {
        self.entries
            .iter()
            .find(|(name, _)| self.matches(name, key))
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&mut self, _key: &str, _value: V) -> Result<(), ScopeError> {
        Err(ScopeError::ReadOnly {
            scope: self.scope,
            operation: "put",
        })
    }

    fn remove_attribute(&mut self, _key: &str) -> Result<(), ScopeError> {
        Err(ScopeError::ReadOnly {
            scope: self.scope,
            operation: "remove",
        })
    }

    fn attribute_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }
}
