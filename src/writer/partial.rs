//! Partial Response Writer
//!
//! Decorates a [`ResponseWriter`] to emit the ajax partial-response envelope. Content placed
//! in `<update>`, `<insert>`, `<eval>` and `<error>` blocks is wrapped in one CDATA section;
//! CDATA sections opened by the content itself are nested through a stack of buffering
//! frames so the output never contains a premature `]]>`.
//!
//! With an empty frame stack every call passes straight through to the wrapped writer. With
//! frames open, every output-producing call goes to the writer of the innermost frame, whose
//! text is escaped by a [`CdataEndEscaper`] into that frame's buffer. Popping a frame writes
//! its buffer into the next frame out (escaping it once more) or, for the last frame, into
//! the wrapped writer.
//!
//! Block boundaries (`end_insert`, `end_update`, `end_eval`, `end_extension`, `end_error`)
//! and `close` pop every remaining frame, so unbalanced CDATA in user content can never
//! leak past the block that contained it.

use super::{CdataEndEscaper, ResponseWriter, SharedBuffer, Sink, CDATA_END, CDATA_START};
use crate::error::WriterError;
use tracing::debug;

/// Content type of a partial response
pub const PARTIAL_CONTENT_TYPE: &str = "text/xml";

struct CdataFrame {
    writer: Box<dyn ResponseWriter>,
    buffer: SharedBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    fn element(self) -> &'static str {
        match self {
            InsertPosition::Before => "before",
            InsertPosition::After => "after",
        }
    }
}

/// Ajax partial-response writer
pub struct PartialResponseWriter {
    inner: Box<dyn ResponseWriter>,
    frames: Vec<CdataFrame>,
    in_changes: bool,
    insert: Option<InsertPosition>,
    response_id: Option<String>,
}

impl PartialResponseWriter {
    pub fn new(inner: Box<dyn ResponseWriter>) -> Self {
        Self {
            inner,
            frames: Vec::new(),
            in_changes: false,
            insert: None,
            response_id: None,
        }
    }

    /// Id written on the `<partial-response>` element, normally the view root's client id.
    pub fn with_response_id(mut self, id: impl Into<String>) -> Self {
        self.response_id = Some(id.into());
        self
    }

    /// Number of nested CDATA frames currently open.
    pub fn cdata_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_buffering(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Writer that receives output right now: the innermost frame, or the wrapped writer.
    fn target(&mut self) -> &mut dyn ResponseWriter {
        match self.frames.last_mut() {
            Some(frame) => frame.writer.as_mut(),
            None => self.inner.as_mut(),
        }
    }

    fn open_double_buffer(&mut self) {
        let buffer = SharedBuffer::new();
        let writer = self
            .inner
            .clone_with_writer(Box::new(CdataEndEscaper::new(buffer.clone())));
        self.frames.push(CdataFrame { writer, buffer });
    }

    fn pop_frame(&mut self) -> Result<(), WriterError> {
        if let Some(mut frame) = self.frames.pop() {
            frame.writer.flush()?;
            let content = frame.buffer.take();
            self.target().write(&content)?;
        }
        Ok(())
    }

    fn close_double_buffer(&mut self, force: bool) -> Result<(), WriterError> {
        if force {
            if !self.frames.is_empty() {
                debug!(depth = self.frames.len(), "Force-closing nested CDATA sections");
            }
            while !self.frames.is_empty() {
                self.pop_frame()?;
            }
            Ok(())
        } else {
            self.pop_frame()
        }
    }

    /// Pop every frame and terminate the outermost section on the real output.
    fn close_open_sections(&mut self) -> Result<(), WriterError> {
        if self.frames.is_empty() {
            return Ok(());
        }
        self.close_double_buffer(true)?;
        self.inner.end_cdata()
    }

    fn start_changes_if_necessary(&mut self) -> Result<(), WriterError> {
        if !self.in_changes {
            self.start_element("changes", None)?;
            self.in_changes = true;
        }
        Ok(())
    }

    fn end_changes_if_necessary(&mut self) -> Result<(), WriterError> {
        if self.in_changes {
            self.end_element("changes")?;
            self.in_changes = false;
        }
        Ok(())
    }

    fn start_insert(&mut self, position: InsertPosition, target_id: &str) -> Result<(), WriterError> {
        self.start_changes_if_necessary()?;
        self.start_element("insert", None)?;
        self.start_element(position.element(), None)?;
        self.write_attribute("id", target_id, None)?;
        self.insert = Some(position);
        self.start_cdata()
    }

    pub fn start_insert_before(&mut self, target_id: &str) -> Result<(), WriterError> {
        self.start_insert(InsertPosition::Before, target_id)
    }

    pub fn start_insert_after(&mut self, target_id: &str) -> Result<(), WriterError> {
        self.start_insert(InsertPosition::After, target_id)
    }

    pub fn end_insert(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        let position = self.insert.take().unwrap_or(InsertPosition::Before);
        self.end_element(position.element())?;
        self.end_element("insert")
    }

    pub fn start_update(&mut self, target_id: &str) -> Result<(), WriterError> {
        self.start_changes_if_necessary()?;
        self.start_element("update", None)?;
        self.write_attribute("id", target_id, None)?;
        self.start_cdata()
    }

    pub fn end_update(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        self.end_element("update")
    }

    pub fn update_attributes(
        &mut self,
        target_id: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), WriterError> {
        self.start_changes_if_necessary()?;
        self.start_element("attributes", None)?;
        self.write_attribute("id", target_id, None)?;
        for (name, value) in attributes {
            self.start_element("attribute", None)?;
            self.write_attribute("name", name, None)?;
            self.write_attribute("value", value, None)?;
            self.end_element("attribute")?;
        }
        self.end_element("attributes")
    }

    pub fn delete(&mut self, target_id: &str) -> Result<(), WriterError> {
        self.start_changes_if_necessary()?;
        self.start_element("delete", None)?;
        self.write_attribute("id", target_id, None)?;
        self.end_element("delete")
    }

    pub fn redirect(&mut self, url: &str) -> Result<(), WriterError> {
        self.end_changes_if_necessary()?;
        self.start_element("redirect", None)?;
        self.write_uri_attribute("url", url, None)?;
        self.end_element("redirect")
    }

    pub fn start_eval(&mut self) -> Result<(), WriterError> {
        self.start_changes_if_necessary()?;
        self.start_element("eval", None)?;
        self.start_cdata()
    }

    pub fn end_eval(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        self.end_element("eval")
    }

    pub fn start_extension(&mut self, attributes: &[(&str, &str)]) -> Result<(), WriterError> {
        self.start_changes_if_necessary()?;
        self.start_element("extension", None)?;
        for (name, value) in attributes {
            self.write_attribute(name, value, None)?;
        }
        Ok(())
    }

    pub fn end_extension(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        self.end_element("extension")
    }

    pub fn start_error(&mut self, error_name: &str) -> Result<(), WriterError> {
        self.end_changes_if_necessary()?;
        self.start_element("error", None)?;
        self.start_element("error-name", None)?;
        self.write_text(error_name, None)?;
        self.end_element("error-name")?;
        self.start_element("error-message", None)?;
        self.start_cdata()
    }

    pub fn end_error(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        self.end_element("error-message")?;
        self.end_element("error")
    }
}

impl ResponseWriter for PartialResponseWriter {
    fn content_type(&self) -> &str {
        PARTIAL_CONTENT_TYPE
    }

    fn character_encoding(&self) -> &str {
        self.inner.character_encoding()
    }

    fn start_document(&mut self) -> Result<(), WriterError> {
        let declaration = format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>",
            self.inner.character_encoding()
        );
        self.target().write(&declaration)?;
        self.start_element("partial-response", None)?;
        if let Some(id) = self.response_id.clone() {
            self.write_attribute("id", &id, None)?;
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        self.end_changes_if_necessary()?;
        self.end_element("partial-response")?;
        self.inner.end_document()
    }

    fn start_element(&mut self, name: &str, component: Option<&str>) -> Result<(), WriterError> {
        self.target().start_element(name, component)
    }

    fn end_element(&mut self, name: &str) -> Result<(), WriterError> {
        self.target().end_element(name)
    }

    fn write_attribute(
        &mut self,
        name: &str,
        value: &str,
        property: Option<&str>,
    ) -> Result<(), WriterError> {
        self.target().write_attribute(name, value, property)
    }

    fn write_uri_attribute(
        &mut self,
        name: &str,
        value: &str,
        property: Option<&str>,
    ) -> Result<(), WriterError> {
        self.target().write_uri_attribute(name, value, property)
    }

    fn write_comment(&mut self, comment: &str) -> Result<(), WriterError> {
        self.target().write_comment(comment)
    }

    fn write_text(&mut self, text: &str, property: Option<&str>) -> Result<(), WriterError> {
        self.target().write_text(text, property)
    }

    fn write_text_for_component(
        &mut self,
        text: &str,
        component: Option<&str>,
        property: Option<&str>,
    ) -> Result<(), WriterError> {
        self.target()
            .write_text_for_component(text, component, property)
    }

    fn write_text_range(
        &mut self,
        text: &str,
        offset: usize,
        len: usize,
    ) -> Result<(), WriterError> {
        self.target().write_text_range(text, offset, len)
    }

    /// Outside any section the marker goes to the wrapped writer; inside one it becomes
    /// character data of the enclosing section. Either way a new frame is pushed.
    fn start_cdata(&mut self) -> Result<(), WriterError> {
        if self.frames.is_empty() {
            self.inner.start_cdata()?;
        } else {
            self.target().write(CDATA_START)?;
        }
        self.open_double_buffer();
        Ok(())
    }

    /// Closes only the innermost section. Without an open section there is nothing to end.
    fn end_cdata(&mut self) -> Result<(), WriterError> {
        if self.frames.is_empty() {
            debug!("Ignoring CDATA end marker with no open section");
            return Ok(());
        }
        self.close_double_buffer(false)?;
        if self.frames.is_empty() {
            self.inner.end_cdata()
        } else {
            self.target().write(CDATA_END)
        }
    }

    fn write(&mut self, raw: &str) -> Result<(), WriterError> {
        self.target().write(raw)
    }

    fn append(&mut self, raw: &str) -> Result<(), WriterError> {
        self.target().append(raw)
    }

    fn flush(&mut self) -> Result<(), WriterError> {
        self.target().flush()
    }

    fn close(&mut self) -> Result<(), WriterError> {
        self.close_open_sections()?;
        self.inner.close()
    }

    fn clone_with_writer(&self, sink: Sink) -> Box<dyn ResponseWriter> {
        self.inner.clone_with_writer(sink)
    }
}
