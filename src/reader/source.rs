//! The character reader (`spec.md` §4.1): a queue of character sources with
//! one-character lookahead, line/column tracking, and XML character-range
//! validation.

use std::collections::VecDeque;

use crate::common::{is_xml_char, Position, TextPosition};
use crate::reader::error::{Error, SyntaxError};

/// One pending input source: a boxed iterator of already-decoded `char`s.
/// Decoding bytes into characters is explicitly out of scope (`spec.md`
/// §1) — by the time a source reaches this queue it is already `char`s.
type Source = Box<dyn Iterator<Item = char>>;

/// Supplies characters one at a time with one-character lookahead over an
/// ordered queue of sources. Sources are consumed in order and dropped
/// once exhausted; `feed` may append a new one at any time, which is what
/// lets the parser resume after a templating suspension (`spec.md` §4.4).
pub(crate) struct CharQueue {
    sources: VecDeque<Source>,
    /// Characters pushed back after having already been consumed and
    /// validated — read before pulling anything new from `sources`. Used
    /// by lookahead-then-backtrack matching (e.g. distinguishing `<?xml `
    /// from `<?xml-stylesheet`) that consumes more than one character of
    /// lookahead before deciding it guessed wrong.
    unread: VecDeque<char>,
    lookahead: Option<char>,
    pos: TextPosition,
    /// Set once `version="1.1"` has been seen in the XML declaration;
    /// widens the accepted character range for `next`/`peek`.
    xml11: bool,
}

impl CharQueue {
    pub(crate) fn new() -> Self {
        CharQueue {
            sources: VecDeque::new(),
            unread: VecDeque::new(),
            lookahead: None,
            pos: TextPosition::new(),
            xml11: false,
        }
    }

    pub(crate) fn from_str(s: &str) -> Self {
        let mut q = Self::new();
        q.feed_str(s.to_owned());
        q
    }

    pub(crate) fn set_xml11(&mut self, xml11: bool) {
        self.xml11 = xml11;
    }

    /// Appends a new source to the back of the queue. Legal at any time.
    pub(crate) fn feed(&mut self, source: impl Iterator<Item = char> + 'static) {
        self.sources.push_back(Box::new(source));
    }

    pub(crate) fn feed_str(&mut self, s: String) {
        self.feed(s.chars().collect::<Vec<char>>().into_iter());
    }

    /// Pushes already-consumed, already-validated characters back to be
    /// read again before anything else, and rewinds `position()` to
    /// match. Assumes `s` spans no line breaks, true of every call site
    /// (short ASCII lookahead tokens).
    ///
    /// A live `lookahead` (the next character already peeked off the
    /// stream but not yet consumed) must end up *after* `s` and before
    /// whatever was already queued, or it would be delivered ahead of the
    /// characters we are restoring — flush it into `unread` first so
    /// `next`/`peek` see `s` followed by the old lookahead, in order.
    pub(crate) fn unread(&mut self, s: &str) {
        if let Some(c) = self.lookahead.take() {
            self.unread.push_front(c);
        }
        for c in s.chars().rev() {
            self.unread.push_front(c);
        }
        self.pos.column = self.pos.column.saturating_sub(s.chars().count() as u64);
    }

    fn pull_raw(&mut self) -> Option<char> {
        if let Some(c) = self.unread.pop_front() {
            return Some(c);
        }
        while let Some(front) = self.sources.front_mut() {
            if let Some(c) = front.next() {
                return Some(c);
            }
            self.sources.pop_front();
        }
        None
    }

    /// Returns the next character without consuming it.
    pub(crate) fn peek(&mut self) -> Result<Option<char>, Error> {
        if self.lookahead.is_none() {
            self.lookahead = self.pull_raw();
            if let Some(c) = self.lookahead {
                self.validate(c)?;
            }
        }
        Ok(self.lookahead)
    }

    /// Consumes and returns the next character, advancing position.
    pub(crate) fn next_opt(&mut self) -> Result<Option<char>, Error> {
        let c = match self.lookahead.take() {
            Some(c) => Some(c),
            None => {
                let c = self.pull_raw();
                if let Some(c) = c {
                    self.validate(c)?;
                }
                c
            }
        };
        if let Some(c) = c {
            if c == '\n' {
                self.pos.new_line();
            } else {
                self.pos.advance(1);
            }
        }
        Ok(c)
    }

    /// Consumes and returns the next character, failing `Syntax("1")` on
    /// end of input (`spec.md` §4.1).
    pub(crate) fn next(&mut self) -> Result<char, Error> {
        self.next_opt()?.ok_or_else(|| self.error(SyntaxError::unexpected_eof()))
    }

    fn validate(&self, c: char) -> Result<(), Error> {
        if is_xml_char(c, self.xml11) {
            Ok(())
        } else {
            Err(self.error(SyntaxError::invalid_character(c as u32)))
        }
    }

    fn error(&self, e: SyntaxError) -> Error {
        Error::syntax(e, self.pos)
    }

    /// True once every queued source is exhausted and no lookahead remains.
    pub(crate) fn is_exhausted(&mut self) -> Result<bool, Error> {
        Ok(self.peek()?.is_none())
    }
}

impl Position for CharQueue {
    fn position(&self) -> TextPosition {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut q = CharQueue::from_str("ab");
        assert_eq!(q.peek().unwrap(), Some('a'));
        assert_eq!(q.peek().unwrap(), Some('a'));
        assert_eq!(q.next().unwrap(), 'a');
        assert_eq!(q.next().unwrap(), 'b');
        assert!(q.next_opt().unwrap().is_none());
    }

    #[test]
    fn feed_appends_mid_stream() {
        let mut q = CharQueue::from_str("a");
        assert_eq!(q.next().unwrap(), 'a');
        assert!(q.is_exhausted().unwrap());
        q.feed_str("b".to_owned());
        assert_eq!(q.next().unwrap(), 'b');
    }

    #[test]
    fn line_tracking() {
        let mut q = CharQueue::from_str("a\nb");
        q.next().unwrap();
        assert_eq!(q.position().row, 0);
        q.next().unwrap();
        assert_eq!(q.position().row, 1);
        assert_eq!(q.position().column, 0);
    }

    #[test]
    fn rejects_forbidden_codepoint() {
        let mut q = CharQueue::from_str("\u{0}");
        assert!(q.next().is_err());
    }

    #[test]
    fn unread_preserves_order_against_a_live_lookahead() {
        // Mirrors a failed multi-char keyword match: one char is matched
        // (consumed) and pushed into `matched`, then `peek()` loads the
        // mismatching char into `lookahead` before the caller unreads
        // `matched`. The restored text must still precede that lookahead
        // char, not follow it.
        let mut q = CharQueue::from_str("oo?>");
        assert_eq!(q.peek().unwrap(), Some('o'));
        q.unread("xm");
        let mut out = String::new();
        while let Some(c) = q.next_opt().unwrap() {
            out.push(c);
        }
        assert_eq!(out, "xmoo?>");
    }
}
