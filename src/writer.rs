//! Response Writers
//!
//! The markup-writing capability set consumed by rendering code, a concrete markup writer,
//! and the partial-response decorator used for ajax requests.

pub mod buffer;
pub mod escape;
pub mod markup;
pub mod partial;

pub use buffer::SharedBuffer;
pub use escape::CdataEndEscaper;
pub use markup::MarkupWriter;
pub use partial::PartialResponseWriter;

use crate::error::WriterError;
use std::fmt;

/// Literal CDATA start marker
pub const CDATA_START: &str = "<![CDATA[";
/// Literal CDATA end marker
pub const CDATA_END: &str = "]]>";

/// Destination a writer renders into
pub type Sink = Box<dyn fmt::Write + Send>;

/// Markup writer capability set.
///
/// Decorators must route every output-producing method; there are no default methods so
/// that a new method cannot silently bypass a decorator.
pub trait ResponseWriter: Send {
    fn content_type(&self) -> &str;

    fn character_encoding(&self) -> &str;

    fn start_document(&mut self) -> Result<(), WriterError>;

    fn end_document(&mut self) -> Result<(), WriterError>;

    /// Open an element. `component` is the client id of the component being rendered, if any.
    fn start_element(&mut self, name: &str, component: Option<&str>) -> Result<(), WriterError>;

    fn end_element(&mut self, name: &str) -> Result<(), WriterError>;

    fn write_attribute(
        &mut self,
        name: &str,
        value: &str,
        property: Option<&str>,
    ) -> Result<(), WriterError>;

    fn write_uri_attribute(
        &mut self,
        name: &str,
        value: &str,
        property: Option<&str>,
    ) -> Result<(), WriterError>;

    fn write_comment(&mut self, comment: &str) -> Result<(), WriterError>;

    /// Escaped character data.
    fn write_text(&mut self, text: &str, property: Option<&str>) -> Result<(), WriterError>;

    fn write_text_for_component(
        &mut self,
        text: &str,
        component: Option<&str>,
        property: Option<&str>,
    ) -> Result<(), WriterError>;

    /// Escaped character data for `len` chars of `text` starting at char `offset`.
    fn write_text_range(&mut self, text: &str, offset: usize, len: usize)
        -> Result<(), WriterError>;

    fn start_cdata(&mut self) -> Result<(), WriterError>;

    fn end_cdata(&mut self) -> Result<(), WriterError>;

    /// Unescaped output.
    fn write(&mut self, raw: &str) -> Result<(), WriterError>;

    fn append(&mut self, raw: &str) -> Result<(), WriterError>;

    fn flush(&mut self) -> Result<(), WriterError>;

    fn close(&mut self) -> Result<(), WriterError>;

    /// A writer with the same configuration rendering into `sink`.
    fn clone_with_writer(&self, sink: Sink) -> Box<dyn ResponseWriter>;
}
