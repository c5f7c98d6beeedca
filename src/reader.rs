//! Contains the high-level interface for the pull-based XML parser.
//!
//! The most important type in this module is `EventReader`, which provides
//! an iterator view over the events in an XML document.

use core::iter::FusedIterator;
use core::result;

use crate::common::{Position, TextPosition};

pub use self::config::ParserConfig;
pub use self::error::{Error, ErrorKind, NscKind, SyntaxError, WfcKind};
pub use self::events::XmlEvent;

use self::parser::PullParser;

mod config;
pub(crate) mod error;
mod events;
mod lexer;
mod parser;
pub(crate) mod source;

/// A result type yielded by `EventReader`.
pub type Result<T, E = Error> = result::Result<T, E>;

/// A pull-based XML parser over an in-memory queue of `char` sources
/// (`spec.md` §4.1). Unlike the teacher's byte-stream-generic reader, this
/// one is not generic over its source: the character queue it wraps can
/// be fed incrementally at any time, which is what the templating
/// suspension protocol (`spec.md` §4.8) needs.
pub struct EventReader {
    parser: PullParser,
}

impl EventReader {
    /// Creates a new, empty reader. Feed it source text with `feed`/`feed_str`
    /// before calling `next`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        EventReader::new_with_config(ParserConfig::new())
    }

    /// Creates a new reader with the given configuration.
    #[inline]
    #[must_use]
    pub fn new_with_config(config: ParserConfig) -> Self {
        EventReader { parser: PullParser::new(config) }
    }

    /// A convenience constructor that immediately feeds a string slice.
    #[inline]
    #[must_use]
    pub fn from_str(source: &str) -> Self {
        let mut reader = EventReader::new();
        reader.feed_str(source);
        reader
    }

    /// Appends more characters to be parsed. Legal at any time; this is
    /// how a caller resumes parsing after an `Expect*` placeholder event
    /// in partial mode (`spec.md` §4.8), and how a templating caller
    /// splices in a template argument.
    #[inline]
    pub fn feed(&mut self, source: impl Iterator<Item = char> + 'static) {
        self.parser.feed(source);
    }

    /// As `feed`, for anything that can be turned into an owned `String`.
    #[inline]
    pub fn feed_str(&mut self, s: impl Into<String>) {
        self.parser.feed_str(s.into());
    }

    /// Pulls and returns the next XML event from the stream.
    ///
    /// Once this returns `Some(Err(_))` or `Some(Ok(XmlEvent::EndDocument { .. }))`,
    /// further calls return `None`.
    #[inline]
    pub fn next(&mut self) -> Option<Result<XmlEvent>> {
        self.parser.next()
    }

    /// Whether the document has declared itself XML 1.1 (or later) so far.
    #[inline]
    pub(crate) fn is_xml11(&self) -> bool {
        self.parser.is_xml11()
    }

    /// See `ParserConfig::xml11_permissive_undeclare`.
    #[inline]
    pub(crate) fn permissive_undeclare(&self) -> bool {
        self.parser.permissive_undeclare()
    }

    /// Toggles the templating suspension protocol off once the final
    /// source fragment of a `parse_parts` call has been fed
    /// (`spec.md` §6).
    #[inline]
    pub(crate) fn set_partial(&mut self, partial: bool) {
        self.parser.set_partial(partial);
    }

    /// Splices template-supplied attributes into a suspended
    /// `ExpectAttributes` tag (`spec.md` §4.8).
    #[inline]
    pub(crate) fn splice_attrs(&mut self, extra: Vec<crate::attribute::Attr>) -> Result<()> {
        self.parser.splice_template_attrs(extra)
    }

    /// Resolves a suspended `ExpectAttributeValue` placeholder
    /// (`spec.md` §4.8).
    #[inline]
    pub(crate) fn splice_attr_value(&mut self, value: Option<String>) -> Result<()> {
        self.parser.splice_template_attr_value(value)
    }

    /// Skips all XML events until the matching end tag at the current
    /// nesting level.
    ///
    /// Convenience function for the case where you have encountered a
    /// start tag that is of no interest and want to skip the entire
    /// subtree until its corresponding end tag.
    pub fn skip(&mut self) -> Result<()> {
        let mut depth = 1u32;
        loop {
            match self.next() {
                Some(Ok(XmlEvent::StartTag { is_empty: false, .. })) => depth += 1,
                Some(Ok(XmlEvent::EndTag { .. })) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(Ok(XmlEvent::EndDocument { .. })) | None => return Ok(()),
                Some(Err(e)) => return Err(e),
                _ => {}
            }
        }
    }
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Position for EventReader {
    /// Returns the position the underlying character queue has reached.
    #[inline]
    fn position(&self) -> TextPosition {
        self.parser.position()
    }
}

impl IntoIterator for EventReader {
    type Item = Result<XmlEvent>;
    type IntoIter = Events;

    fn into_iter(self) -> Events {
        Events { reader: self, finished: false }
    }
}

/// An iterator over the events of an `EventReader`.
///
/// When the next event is an error or `XmlEvent::EndDocument`, it is
/// returned once, and the iterator then stops producing events.
pub struct Events {
    reader: EventReader,
    finished: bool,
}

impl Events {
    /// Unwraps the iterator, returning the internal `EventReader`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> EventReader {
        self.reader
    }
}

impl FusedIterator for Events {}

impl Iterator for Events {
    type Item = Result<XmlEvent>;

    #[inline]
    fn next(&mut self) -> Option<Result<XmlEvent>> {
        if self.finished {
            return None;
        }
        let ev = self.reader.next();
        if matches!(ev, Some(Ok(XmlEvent::EndDocument { .. })) | Some(Err(_)) | None) {
            self.finished = true;
        }
        ev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_simple_document() {
        let mut r = EventReader::from_str("<root a='1'>text</root>");
        let mut saw_start = false;
        let mut saw_text = false;
        while let Some(ev) = r.next() {
            match ev.unwrap() {
                XmlEvent::StartTag { name, .. } if &*name.local == "root" => saw_start = true,
                XmlEvent::XmlString { text, .. } if text == "text" => saw_text = true,
                _ => {}
            }
        }
        assert!(saw_start && saw_text);
    }

    #[test]
    fn skip_consumes_a_subtree() {
        let mut r = EventReader::from_str("<root><a><b/></a>tail</root>");
        assert!(matches!(r.next().unwrap().unwrap(), XmlEvent::StartDocument { .. }));
        assert!(matches!(r.next().unwrap().unwrap(), XmlEvent::StartTag { .. })); // root
        assert!(matches!(r.next().unwrap().unwrap(), XmlEvent::StartTag { .. })); // a
        r.skip().unwrap();
        match r.next().unwrap().unwrap() {
            XmlEvent::EndTag { name, .. } => assert_eq!(&*name.local, "root"),
            other => panic!("expected root's end tag, got {other:?}"),
        }
    }
}
