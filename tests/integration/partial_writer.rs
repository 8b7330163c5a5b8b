//! Integration tests for the partial response writer

use super::test_utils::{ajax_request, application, request_context};
use faces_core::config::ProjectStage;
use faces_core::context::ViewRoot;
use faces_core::writer::{MarkupWriter, PartialResponseWriter, ResponseWriter, SharedBuffer};

fn partial() -> (PartialResponseWriter, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let inner = MarkupWriter::xml(Box::new(buffer.clone()));
    (PartialResponseWriter::new(Box::new(inner)), buffer)
}

/// Literal terminators in `xml` that are not part of an escape sequence.
fn unescaped_terminators(xml: &str) -> usize {
    xml.matches("]]>").count() - xml.matches("]]]]><![CDATA[>").count()
}

#[test]
fn test_cdata_nesting_produces_escaped_terminator() {
    let (mut writer, buffer) = partial();
    writer.start_cdata().unwrap();
    writer.write("]]>").unwrap();
    writer.end_cdata().unwrap();
    let out = buffer.contents();
    assert_eq!(out, "<![CDATA[]]]]><![CDATA[>]]>");
    assert_eq!(unescaped_terminators(&out), 1);
    assert!(out.ends_with("]]>"));
}

#[test]
fn test_end_update_force_closes() {
    let (mut writer, buffer) = partial();
    writer.start_document().unwrap();
    writer.start_update("panel").unwrap();
    writer.start_cdata().unwrap();
    writer.start_cdata().unwrap();
    writer.write("unbalanced").unwrap();
    assert_eq!(writer.cdata_depth(), 3);
    writer.end_update().unwrap();
    assert_eq!(writer.cdata_depth(), 0);
    assert!(!writer.is_buffering());

    writer.write("<after/>").unwrap();
    writer.end_document().unwrap();
    let out = buffer.contents();
    assert!(out.contains(
        "<update id=\"panel\"><![CDATA[<![CDATA[<![CDATA[unbalanced]]></update><after/>"
    ));
    assert!(out.ends_with("</changes></partial-response>"));
}

#[test]
fn test_every_block_kind_force_closes() {
    let (mut writer, buffer) = partial();
    writer.start_insert_before("row1").unwrap();
    writer.start_cdata().unwrap();
    writer.end_insert().unwrap();
    assert_eq!(writer.cdata_depth(), 0);

    writer.start_eval().unwrap();
    writer.start_cdata().unwrap();
    writer.end_eval().unwrap();
    assert_eq!(writer.cdata_depth(), 0);

    writer.start_error("E").unwrap();
    writer.start_cdata().unwrap();
    writer.end_error().unwrap();
    assert_eq!(writer.cdata_depth(), 0);

    let out = buffer.contents();
    assert!(out.contains("<insert><before id=\"row1\"><![CDATA[<![CDATA[]]></before></insert>"));
    assert!(out.contains("<eval><![CDATA[<![CDATA[]]></eval>"));
}

#[test]
fn test_close_while_buffering_terminates_document() {
    let (mut writer, buffer) = partial();
    writer.start_update("x").unwrap();
    writer.write("a]]>b").unwrap();
    writer.close().unwrap();
    assert_eq!(
        buffer.contents(),
        "<changes><update id=\"x\"><![CDATA[a]]]]><![CDATA[>b]]>"
    );
}

#[test]
fn test_context_partial_writer_wraps_existing_html_writer() {
    let (mut ctx, body) = request_context(
        application(ProjectStage::Production),
        ajax_request("/list.xhtml"),
    );
    ctx.set_view_root(ViewRoot::new("j_id1", "en")).unwrap();
    let html = MarkupWriter::html(Box::new(body.clone()));
    ctx.set_response_writer(Box::new(html)).unwrap();
    {
        let writer = ctx.partial_response_writer().unwrap();
        writer.start_document().unwrap();
        writer.delete("row7").unwrap();
        writer.redirect("/done.xhtml").unwrap();
        writer.end_document().unwrap();
    }
    assert_eq!(
        body.contents(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><partial-response id=\"j_id1\">\
         <changes><delete id=\"row7\"></delete></changes><redirect url=\"/done.xhtml\"></redirect>\
         </partial-response>"
    );
    ctx.release().unwrap();
}
