//! View root handle.

use serde::{Deserialize, Serialize};

/// Root of a component tree. The tree itself is owned by rendering code; the request
/// context only tracks which view is current and its locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRoot {
    pub view_id: String,
    pub locale: String,
    #[serde(default = "default_render_kit")]
    pub render_kit_id: String,
}

fn default_render_kit() -> String {
    "HTML_BASIC".to_string()
}

impl ViewRoot {
    pub fn new(view_id: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            locale: locale.into(),
            render_kit_id: default_render_kit(),
        }
    }

    /// Client id written on the partial-response envelope.
    pub fn container_client_id(&self) -> &str {
        &self.view_id
    }
}
