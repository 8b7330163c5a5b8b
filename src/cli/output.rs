//! CLI output: error mapping and replay result formatting.

use super::replay::ReplayOutput;

/// Map errors to a string for CLI output, including the cause chain.
pub fn map_error(e: &anyhow::Error) -> String {
    format!("Error: {:#}", e)
}

pub fn format_replay_text(output: &ReplayOutput) -> String {
    let mut text = format!("status: {}\n", output.status);
    if let Some(content_type) = &output.content_type {
        text.push_str(&format!("content-type: {}\n", content_type));
    }
    text.push_str(&format!("handled-events: {}\n", output.handled_events));
    if let Some(unhandled) = &output.unhandled {
        text.push_str(&format!("unhandled: {}\n", unhandled));
    }
    text.push('\n');
    text.push_str(&output.body);
    text
}

pub fn format_replay_json(output: &ReplayOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(output)
}
