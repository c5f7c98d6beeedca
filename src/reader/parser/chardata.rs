//! Character data outside CDATA sections (`spec.md` §4.4): read up to the
//! next `<`, `&`, or lone `CR`; `]]>` is forbidden here (only legal inside
//! a CDATA section). Character and entity references split the run into
//! separate events so the tree builder can keep them unresolved until
//! `spec.md` §4.7 runs.

use crate::common::TextPosition;
use crate::lexical::{parse_numeric_ref, read_ncname};
use crate::reader::error::{Error, SyntaxError};
use crate::reader::events::XmlEvent;

use super::PullParser;

impl PullParser {
    /// Reads one run of character data, possibly producing more than one
    /// event (`XmlString` chunks interleaved with `XmlCharRef`/
    /// `XmlEntityRef`), enqueueing all but the first onto `self.pending`.
    /// Returns `Ok(None)` only when `partial` end-of-input is hit with no
    /// events produced yet, signalling the caller to emit `ExpectNodes`.
    pub(super) fn read_chardata(&mut self) -> Result<Option<XmlEvent>, Error> {
        let mut events = Vec::new();
        let mut buf = String::new();
        let start_pos = self.queue.position();
        // Counts a run of trailing `]` characters already pushed to `buf`,
        // so a `>` immediately following two or more of them is detected
        // as the forbidden `]]>` sequence regardless of how many `]`s
        // preceded it (`spec.md` §4.4, production 14).
        let mut trailing_brackets = 0u32;

        loop {
            let pos = self.queue.position();
            match self.queue.peek()? {
                None => break,
                Some('<') => break,
                Some('&') => {
                    self.queue.next()?;
                    trailing_brackets = 0;
                    if !buf.is_empty() {
                        events.push(XmlEvent::XmlString { text: std::mem::take(&mut buf), is_cdata: false, pos: start_pos });
                    }
                    events.push(self.read_reference(pos)?);
                }
                Some(']') => {
                    self.queue.next()?;
                    buf.push(']');
                    trailing_brackets += 1;
                }
                Some('>') if trailing_brackets >= 2 => {
                    return Err(self.err(SyntaxError::forbidden_cdata_close(), pos));
                }
                Some('\r') => {
                    self.queue.next()?;
                    trailing_brackets = 0;
                    if self.queue.peek()? == Some('\n') {
                        self.queue.next()?;
                    }
                    buf.push('\n');
                }
                Some(c) => {
                    if self.level == 0 && !crate::common::is_whitespace_char(c) {
                        return Err(self.err(SyntaxError::char_data_at_top_level(), pos));
                    }
                    self.queue.next()?;
                    trailing_brackets = 0;
                    buf.push(c);
                }
            }
        }

        if !buf.is_empty() {
            events.push(XmlEvent::XmlString { text: buf, is_cdata: false, pos: start_pos });
        }

        if events.is_empty() {
            if self.partial && self.queue.is_exhausted()? {
                return Ok(None);
            }
            // Non-partial end-of-input inside the body with no root close
            // yet is handled by the caller (`body.rs`), which knows
            // whether we are at level 0 (epilog) or deeper (unexpected).
            return Ok(None);
        }

        let first = events.remove(0);
        for ev in events {
            self.pending.push_back(ev);
        }
        Ok(Some(first))
    }

    fn read_reference(&mut self, pos: TextPosition) -> Result<XmlEvent, Error> {
        if self.queue.peek()? == Some('#') {
            self.queue.next()?;
            let hex = self.queue.peek()? == Some('x');
            if hex {
                self.queue.next()?;
            }
            let mut digits = String::new();
            while let Some(c) = self.queue.peek()? {
                if c == ';' {
                    break;
                }
                digits.push(self.queue.next()?);
            }
            self.expect_str(";")?;
            let cp = parse_numeric_ref(&digits, hex).ok_or_else(|| self.err(SyntaxError::invalid_charref(&digits), pos))?;
            Ok(XmlEvent::XmlCharRef { codepoint: cp, pos })
        } else {
            let name = read_ncname(&mut self.queue)?;
            self.expect_str(";")?;
            Ok(XmlEvent::XmlEntityRef { name, pos })
        }
    }
}
