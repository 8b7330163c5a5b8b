//! Property-based tests for message severity and CDATA escaping

use faces_core::context::{FacesMessage, MessageList, Severity};
use faces_core::writer::{CdataEndEscaper, MarkupWriter, PartialResponseWriter, ResponseWriter, SharedBuffer};
use proptest::prelude::*;
use std::fmt::Write;

fn severity() -> impl Strategy<Value = Option<Severity>> {
    prop_oneof![
        Just(None),
        Just(Some(Severity::Info)),
        Just(Some(Severity::Warn)),
        Just(Some(Severity::Error)),
        Just(Some(Severity::Fatal)),
    ]
}

/// Text biased towards brackets and angle brackets.
fn cdata_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just(']'), Just('>'), Just('<'), Just('!'), Just('a')], 0..40)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Undo the terminator escape applied inside a CDATA section.
fn unescape(text: &str) -> String {
    text.replace("]]]]><![CDATA[>", "]]>")
}

/// Test that the maximum severity always equals the maximum of the severities added so far
#[test]
fn test_severity_monotonicity_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&proptest::collection::vec(severity(), 0..30), |severities| {
            let mut list = MessageList::new();
            let mut expected: Option<Severity> = None;
            let mut previous: Option<Severity> = None;
            for s in severities {
                list.add(
                    None,
                    FacesMessage {
                        severity: s,
                        summary: "m".to_string(),
                        detail: String::new(),
                    },
                );
                expected = expected.max(s);
                let current = list.maximum_severity();
                prop_assert_eq!(current, expected);
                prop_assert!(current >= previous);
                previous = current;
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// The escaper never lets a terminator through and loses nothing, however the text is split.
    #[test]
    fn test_escaper_never_leaks_terminator(text in cdata_text(), split in 0usize..40) {
        let split = split.min(text.len());
        let mut escaper = CdataEndEscaper::new(String::new());
        escaper.write_str(&text[..split]).unwrap();
        escaper.write_str(&text[split..]).unwrap();
        let escaped = escaper.into_inner();

        prop_assert_eq!(
            escaped.matches("]]>").count(),
            escaped.matches("]]]]><![CDATA[>").count()
        );
        prop_assert_eq!(unescape(&escaped), text);
    }

    /// A single update block always yields exactly one outermost section around the text.
    #[test]
    fn test_update_block_is_one_section(text in cdata_text()) {
        let buffer = SharedBuffer::new();
        let mut writer = PartialResponseWriter::new(Box::new(MarkupWriter::xml(Box::new(buffer.clone()))));
        writer.start_update("t").unwrap();
        writer.write(&text).unwrap();
        writer.end_update().unwrap();
        prop_assert_eq!(writer.cdata_depth(), 0);

        let out = buffer.contents();
        let prefix = "<changes><update id=\"t\"><![CDATA[";
        let suffix = "]]></update>";
        prop_assert!(out.starts_with(prefix));
        prop_assert!(out.ends_with(suffix));
        let inner = &out[prefix.len()..out.len() - suffix.len()];
        prop_assert_eq!(unescape(inner), text);
    }
}
