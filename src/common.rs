//! Shared position, version, and character-class primitives.
//!
//! These are the building blocks every other module in the crate is built
//! on top of: a `{row, column}` position attached to every event and error,
//! the declared XML version, and the character-range predicates from the
//! XML 1.0/1.1 and XML Names recommendations.

use std::fmt;

/// A 2D position in a document: zero-indexed row (line) and column.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, PartialOrd, Ord)]
pub struct TextPosition {
    pub row: u64,
    pub column: u64,
}

impl TextPosition {
    #[must_use]
    pub const fn new() -> Self {
        TextPosition { row: 0, column: 0 }
    }

    pub(crate) fn advance(&mut self, n: u64) {
        self.column += n;
    }

    pub(crate) fn new_line(&mut self) {
        self.row += 1;
        self.column = 0;
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}

/// Something that can report the document position it corresponds to.
pub trait Position {
    fn position(&self) -> TextPosition;
}

impl Position for TextPosition {
    #[inline]
    fn position(&self) -> TextPosition {
        *self
    }
}

/// The XML version a document declared, or the implied default.
///
/// `Version1x` covers any `1.N` (`N > 1`) declaration accepted per the
/// liberal `version_num ::= '1.' [0-9]+` production some profiles allow;
/// the parser only ever treats `1.0` vs. everything else ("is this
/// XML 1.1 or later for character-range purposes?") as meaningfully
/// different, so `Version1x` carries the literal string for round-tripping
/// but is otherwise handled like `Version11`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum XmlVersion {
    Version10,
    Version11,
    Version1x(String),
}

impl XmlVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            XmlVersion::Version10 => "1.0",
            XmlVersion::Version11 => "1.1",
            XmlVersion::Version1x(s) => s,
        }
    }

    /// Whether this version uses the permissive XML 1.1 character ranges
    /// and namespace-undeclaring rules.
    #[must_use]
    pub fn is_xml11_or_later(&self) -> bool {
        !matches!(self, XmlVersion::Version10)
    }
}

impl fmt::Display for XmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a `version_num` value (`"1.0"`, `"1.1"`, `"1.2"`, ...) per
/// `spec.md` §4.4: must match `1\.[0-9]+`.
#[must_use]
pub fn parse_xml_version(s: &str) -> Option<XmlVersion> {
    let rest = s.strip_prefix("1.")?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(match s {
        "1.0" => XmlVersion::Version10,
        "1.1" => XmlVersion::Version11,
        _ => XmlVersion::Version1x(s.to_owned()),
    })
}

/// `#x9 | #xA | #xD | [#x20–#xD7FF] | [#xE000–#xFFFD] | [#x10000–#x10FFFF]`
#[must_use]
pub fn is_xml10_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}' |
        '\u{20}'..='\u{D7FF}' |
        '\u{E000}'..='\u{FFFD}' |
        '\u{10000}'..='\u{10FFFF}'
    )
}

/// `#x1–#xD7FF | #xE000–#xFFFD | #x10000–#x10FFFF` (control chars other
/// than tab/CR/LF are technically restricted further by XML 1.1, but
/// exhaustive enforcement of that sub-range is left to the character
/// reader's `is_valid` gate, not this coarse predicate).
#[must_use]
pub fn is_xml11_char(c: char) -> bool {
    matches!(c,
        '\u{1}'..='\u{D7FF}' |
        '\u{E000}'..='\u{FFFD}' |
        '\u{10000}'..='\u{10FFFF}'
    )
}

#[must_use]
pub fn is_xml_char(c: char, xml11: bool) -> bool {
    if xml11 { is_xml11_char(c) } else { is_xml10_char(c) }
}

/// `#x20 | #x9 | #xD | #xA`
#[must_use]
pub fn is_whitespace_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// `NCNameStartChar` narrowed to the common case: ASCII letter, `_`, or any
/// non-ASCII letter (covers the Unicode letter categories the XML Names
/// recommendation lists by enumeration of code-point ranges).
#[must_use]
pub fn is_ncname_start_char(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// `NCNameChar` = start char, combining marks, modifier letters, digits,
/// `.`, `-`, middle dot (`·`, U+00B7).
#[must_use]
pub fn is_ncname_char(c: char) -> bool {
    is_ncname_start_char(c)
        || c.is_numeric()
        || matches!(c, '.' | '-' | '\u{B7}')
        || is_combining_mark(c)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |
        '\u{1AB0}'..='\u{1AFF}' |
        '\u{1DC0}'..='\u{1DFF}' |
        '\u{20D0}'..='\u{20FF}' |
        '\u{FE20}'..='\u{FE2F}'
    )
}

/// `NameChar` used inside a qualified name: `NCNameChar` plus `:` itself
/// is handled separately by the `QName` reader, not by this predicate.
#[must_use]
pub fn is_name_char(c: char) -> bool {
    is_ncname_char(c) || c == ':'
}

#[must_use]
pub fn is_name_start_char(c: char) -> bool {
    is_ncname_start_char(c) || c == ':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parsing() {
        assert_eq!(parse_xml_version("1.0"), Some(XmlVersion::Version10));
        assert_eq!(parse_xml_version("1.1"), Some(XmlVersion::Version11));
        assert_eq!(parse_xml_version("1.2"), Some(XmlVersion::Version1x("1.2".into())));
        assert_eq!(parse_xml_version("2.0"), None);
        assert_eq!(parse_xml_version("1."), None);
        assert_eq!(parse_xml_version("1.0.0"), None);
    }

    #[test]
    fn char_ranges() {
        assert!(is_xml10_char('a'));
        assert!(!is_xml10_char('\u{0}'));
        assert!(is_xml11_char('\u{1}'));
        assert!(!is_xml10_char('\u{1}'));
    }

    #[test]
    fn name_predicates() {
        assert!(is_ncname_start_char('_'));
        assert!(!is_ncname_start_char(':'));
        assert!(is_name_start_char(':'));
        assert!(is_ncname_char('-'));
        assert!(is_ncname_char('3'));
    }

    #[test]
    fn position_display_is_one_indexed() {
        let pos = TextPosition::new();
        assert_eq!(pos.to_string(), "1:1");
    }
}
