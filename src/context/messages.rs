//! Faces messages and the per-request message list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        f.write_str(name)
    }
}

/// A user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacesMessage {
    /// `None` means the message carries no severity and never raises the maximum.
    pub severity: Option<Severity>,
    pub summary: String,
    pub detail: String,
}

impl FacesMessage {
    pub fn new(severity: Severity, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Some(severity),
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn info(summary: impl Into<String>) -> Self {
        let summary = summary.into();
        Self::new(Severity::Info, summary.clone(), summary)
    }

    pub fn error(summary: impl Into<String>) -> Self {
        let summary = summary.into();
        Self::new(Severity::Error, summary.clone(), summary)
    }
}

/// Messages paired positionally with the client id they were queued for.
#[derive(Debug, Clone, Default)]
pub struct MessageList {
    messages: Vec<FacesMessage>,
    client_ids: Vec<Option<String>>,
    maximum_severity: Option<Severity>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message. `client_id == None` marks a global message.
    pub fn add(&mut self, client_id: Option<&str>, message: FacesMessage) {
        if let Some(severity) = message.severity {
            self.maximum_severity = Some(match self.maximum_severity {
                Some(current) if current >= severity => current,
                _ => severity,
            });
        }
        self.messages.push(message);
        self.client_ids.push(client_id.map(str::to_string));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Every message, in the order queued.
    pub fn all(&self) -> &[FacesMessage] {
        &self.messages
    }

    /// Messages queued for exactly `client_id`; `None` selects only global messages.
    pub fn for_client(&self, client_id: Option<&str>) -> Vec<&FacesMessage> {
        self.messages
            .iter()
            .zip(&self.client_ids)
            .filter(|(_, id)| id.as_deref() == client_id)
            .map(|(message, _)| message)
            .collect()
    }

    /// Distinct client ids in first-occurrence order, `None` included for global messages.
    pub fn client_ids(&self) -> Vec<Option<String>> {
        let mut seen: Vec<Option<String>> = Vec::new();
        for id in &self.client_ids {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }

    pub fn maximum_severity(&self) -> Option<Severity> {
        self.maximum_severity
    }
}
