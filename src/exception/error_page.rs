//! Built-in error report rendering.

use super::event::{ExceptionQueuedEvent, PhaseError, PhaseId, QueuedException};
use super::root_cause::{cause_chain, root_cause};
use crate::context::FacesContext;
use crate::error::{FacesError, WriterError};
use crate::writer::{MarkupWriter, ResponseWriter};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// One reportable failure, resolved to its root cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    /// Client id of the component that raised it
    pub component: Option<String>,
    pub phase: PhaseId,
    pub error_name: String,
    /// Root-cause message
    pub message: String,
    /// Messages from the raised error down to the root cause
    pub cause_chain: Vec<String>,
    /// 404 when the root cause is a missing view, 500 otherwise
    pub status: u16,
}

impl ReportedError {
    /// Report for a failure event; `None` for abort signals.
    pub fn from_event(event: &ExceptionQueuedEvent) -> Option<Self> {
        match event.exception() {
            QueuedException::Failure(error) => Some(Self::from_failure(event, error)),
            QueuedException::Abort(_) => None,
        }
    }

    fn from_failure(event: &ExceptionQueuedEvent, error: &PhaseError) -> Self {
        let root = root_cause(error);
        let status = match root {
            PhaseError::ViewNotFound(_) => 404,
            _ => 500,
        };
        Self {
            component: event.component().map(str::to_string),
            phase: event.phase(),
            error_name: root.error_name().to_string(),
            message: root.to_string(),
            cause_chain: cause_chain(error),
            status,
        }
    }
}

/// Writes collected errors to the response: a partial-response `<error>` block for ajax
/// requests, an HTML page with status 500 otherwise.
pub struct ErrorPageWriter;

impl ErrorPageWriter {
    pub fn render(ctx: &mut FacesContext, errors: &[ReportedError]) -> Result<(), FacesError> {
        if errors.is_empty() {
            return Ok(());
        }
        if !Self::reset_response(ctx)? {
            warn!(count = errors.len(), "Response already committed; error report not rendered");
            return Ok(());
        }
        let ajax = ctx.partial_view_context()?.is_ajax_request();
        debug!(count = errors.len(), ajax, "Rendering error report");
        if ajax {
            Self::render_partial(ctx, errors)
        } else {
            Self::render_page(ctx, errors)
        }
    }

    fn reset_response(ctx: &mut FacesContext) -> Result<bool, FacesError> {
        if !ctx.external_context_mut()?.response_mut()?.reset() {
            return Ok(false);
        }
        ctx.reset_response_output()?;
        Ok(true)
    }

    fn render_partial(ctx: &mut FacesContext, errors: &[ReportedError]) -> Result<(), FacesError> {
        let writer = ctx.partial_response_writer()?;
        writer.start_document()?;
        for error in errors {
            writer.start_error(&error.error_name)?;
            writer.write(&error.message)?;
            writer.end_error()?;
        }
        writer.end_document()?;
        writer.flush()?;
        Ok(())
    }

    fn render_page(ctx: &mut FacesContext, errors: &[ReportedError]) -> Result<(), FacesError> {
        let view_id = ctx.view_root()?.map(|root| root.view_id.clone());
        let body = {
            let response = ctx.external_context_mut()?.response_mut()?;
            response.set_status(500);
            response.set_content_type("text/html");
            response.body()
        };
        ctx.set_response_writer(Box::new(MarkupWriter::html(Box::new(body))))?;
        let writer = ctx.response_writer()?;
        write_page(writer, errors, view_id.as_deref(), Utc::now())?;
        Ok(())
    }
}

fn text_element(
    writer: &mut dyn ResponseWriter,
    name: &str,
    class: Option<&str>,
    text: &str,
) -> Result<(), WriterError> {
    writer.start_element(name, None)?;
    if let Some(class) = class {
        writer.write_attribute("class", class, None)?;
    }
    writer.write_text(text, None)?;
    writer.end_element(name)
}

fn write_page(
    writer: &mut dyn ResponseWriter,
    errors: &[ReportedError],
    view_id: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Result<(), WriterError> {
    let heading = if errors.len() == 1 {
        "An Error Occurred:"
    } else {
        "Multiple Errors Occurred:"
    };

    writer.write("<!DOCTYPE html>")?;
    writer.start_element("html", None)?;
    writer.start_element("head", None)?;
    text_element(writer, "title", None, "Error")?;
    writer.end_element("head")?;
    writer.start_element("body", None)?;
    text_element(writer, "h1", None, heading)?;

    for (index, error) in errors.iter().enumerate() {
        writer.start_element("div", None)?;
        writer.write_attribute("class", "error", None)?;
        writer.write_attribute("id", &format!("error{}", index), None)?;
        text_element(
            writer,
            "h2",
            None,
            &format!("{}: {}", error.error_name, error.message),
        )?;
        text_element(writer, "p", Some("phase"), &format!("Phase: {}", error.phase))?;
        if let Some(component) = &error.component {
            text_element(
                writer,
                "p",
                Some("component"),
                &format!("Component: {}", component),
            )?;
        }
        if error.cause_chain.len() > 1 {
            text_element(writer, "h3", None, "Caused by:")?;
            writer.start_element("ul", None)?;
            for cause in &error.cause_chain {
                text_element(writer, "li", None, cause)?;
            }
            writer.end_element("ul")?;
        }
        writer.end_element("div")?;
    }

    if let Some(view_id) = view_id {
        text_element(writer, "p", Some("view"), &format!("View: {}", view_id))?;
    }
    text_element(
        writer,
        "p",
        Some("timestamp"),
        &format!(
            "Generated at {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    )?;
    writer.end_element("body")?;
    writer.end_element("html")?;
    writer.flush()
}
