//! Concrete markup writer for HTML and XML output.

use super::{ResponseWriter, Sink, CDATA_END, CDATA_START};
use crate::error::WriterError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Writes markup into a [`Sink`], escaping text and attribute values.
///
/// A start tag stays open until the next piece of content so attributes can be added;
/// an element closed while its start tag is still open is written in empty form.
pub struct MarkupWriter {
    sink: Sink,
    content_type: String,
    encoding: String,
    xml: bool,
    start_tag_open: bool,
    closed: bool,
}

impl MarkupWriter {
    pub fn new(sink: Sink, content_type: impl Into<String>, encoding: impl Into<String>) -> Self {
        let content_type = content_type.into();
        let xml = content_type.contains("xml");
        Self {
            sink,
            content_type,
            encoding: encoding.into(),
            xml,
            start_tag_open: false,
            closed: false,
        }
    }

    pub fn html(sink: Sink) -> Self {
        Self::new(sink, "text/html", "UTF-8")
    }

    pub fn xml(sink: Sink) -> Self {
        Self::new(sink, "text/xml", "UTF-8")
    }

    fn ensure_open(&self) -> Result<(), WriterError> {
        if self.closed {
            return Err(WriterError::Closed);
        }
        Ok(())
    }

    fn close_start_tag_if_necessary(&mut self) -> Result<(), WriterError> {
        if self.start_tag_open {
            self.sink.write_char('>')?;
            self.start_tag_open = false;
        }
        Ok(())
    }

    fn push_escaped(&mut self, text: &str, attribute: bool) -> Result<(), WriterError> {
        let mut start = 0;
        for (i, c) in text.char_indices() {
            let replacement = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' if attribute => "&quot;",
                _ => continue,
            };
            self.sink.write_str(&text[start..i])?;
            self.sink.write_str(replacement)?;
            start = i + 1;
        }
        self.sink.write_str(&text[start..])?;
        Ok(())
    }
}

fn encode_uri(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '"' => out.push_str("%22"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(c),
        }
    }
    out
}

impl ResponseWriter for MarkupWriter {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn character_encoding(&self) -> &str {
        &self.encoding
    }

    fn start_document(&mut self) -> Result<(), WriterError> {
        self.ensure_open()
    }

    fn end_document(&mut self) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.close_start_tag_if_necessary()
    }

    fn start_element(&mut self, name: &str, _component: Option<&str>) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.close_start_tag_if_necessary()?;
        self.sink.write_char('<')?;
        self.sink.write_str(name)?;
        self.start_tag_open = true;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), WriterError> {
        self.ensure_open()?;
        if self.start_tag_open {
            self.start_tag_open = false;
            if self.xml || VOID_ELEMENTS.contains(&name) {
                self.sink.write_str("/>")?;
                return Ok(());
            }
            self.sink.write_char('>')?;
        }
        self.sink.write_str("</")?;
        self.sink.write_str(name)?;
        self.sink.write_char('>')?;
        Ok(())
    }

    fn write_attribute(
        &mut self,
        name: &str,
        value: &str,
        _property: Option<&str>,
    ) -> Result<(), WriterError> {
        self.ensure_open()?;
        if !self.start_tag_open {
            return Err(WriterError::AttributeOutsideStartTag(name.to_string()));
        }
        self.sink.write_char(' ')?;
        self.sink.write_str(name)?;
        self.sink.write_str("=\"")?;
        self.push_escaped(value, true)?;
        self.sink.write_char('"')?;
        Ok(())
    }

    fn write_uri_attribute(
        &mut self,
        name: &str,
        value: &str,
        property: Option<&str>,
    ) -> Result<(), WriterError> {
        if value.trim_start().starts_with("javascript:") {
            return self.write_attribute(name, value, property);
        }
        self.write_attribute(name, &encode_uri(value), property)
    }

    fn write_comment(&mut self, comment: &str) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.close_start_tag_if_necessary()?;
        self.sink.write_str("<!--")?;
        self.sink.write_str(comment)?;
        self.sink.write_str("-->")?;
        Ok(())
    }

    fn write_text(&mut self, text: &str, _property: Option<&str>) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.close_start_tag_if_necessary()?;
        self.push_escaped(text, false)
    }

    fn write_text_for_component(
        &mut self,
        text: &str,
        _component: Option<&str>,
        property: Option<&str>,
    ) -> Result<(), WriterError> {
        self.write_text(text, property)
    }

    fn write_text_range(
        &mut self,
        text: &str,
        offset: usize,
        len: usize,
    ) -> Result<(), WriterError> {
        let slice: String = text.chars().skip(offset).take(len).collect();
        self.write_text(&slice, None)
    }

    fn start_cdata(&mut self) -> Result<(), WriterError> {
        self.write(CDATA_START)
    }

    fn end_cdata(&mut self) -> Result<(), WriterError> {
        self.write(CDATA_END)
    }

    fn write(&mut self, raw: &str) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.close_start_tag_if_necessary()?;
        self.sink.write_str(raw)?;
        Ok(())
    }

    fn append(&mut self, raw: &str) -> Result<(), WriterError> {
        self.write(raw)
    }

    fn flush(&mut self) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.close_start_tag_if_necessary()
    }

    fn close(&mut self) -> Result<(), WriterError> {
        if self.closed {
            return Ok(());
        }
        self.close_start_tag_if_necessary()?;
        self.closed = true;
        Ok(())
    }

    fn clone_with_writer(&self, sink: Sink) -> Box<dyn ResponseWriter> {
        Box::new(MarkupWriter::new(
            sink,
            self.content_type.clone(),
            self.encoding.clone(),
        ))
    }
}
