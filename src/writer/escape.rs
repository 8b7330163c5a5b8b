//! CDATA terminator escaping.

use std::fmt;

/// Replacement emitted when `]]>` is seen; the preceding `]]` has already passed through,
/// so the sink receives `]]]]><![CDATA[>` in total.
const ESCAPED_TERMINATOR_TAIL: &str = "]]><![CDATA[>";

/// Filter that rewrites every `]]>` in the text written through it so the text stays valid
/// inside an enclosing CDATA section.
///
/// State carries across writes, so a terminator split over several calls is still caught.
#[derive(Debug)]
pub struct CdataEndEscaper<W> {
    out: W,
    brackets: usize,
}

impl<W: fmt::Write> CdataEndEscaper<W> {
    pub fn new(out: W) -> Self {
        Self { out, brackets: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: fmt::Write> fmt::Write for CdataEndEscaper<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut start = 0;
        for (i, c) in s.char_indices() {
            match c {
                ']' => self.brackets += 1,
                '>' if self.brackets >= 2 => {
                    self.out.write_str(&s[start..i])?;
                    self.out.write_str(ESCAPED_TERMINATOR_TAIL)?;
                    start = i + c.len_utf8();
                    self.brackets = 0;
                }
                _ => self.brackets = 0,
            }
        }
        self.out.write_str(&s[start..])
    }
}
