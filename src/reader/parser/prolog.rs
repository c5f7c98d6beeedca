//! Prolog states (`spec.md` §4.4): `Prolog0` (before the XML declaration),
//! `Prolog1` (after it, before DOCTYPE), and `Prolog2` (after DOCTYPE,
//! before the root element).

use crate::common::{is_whitespace_char, TextPosition};
use crate::reader::error::{Error, SyntaxError};
use crate::reader::events::XmlEvent;
use crate::reader::lexer::{self, Token};

use super::{DocPosition, PullParser, Result};

impl PullParser {
    pub(super) fn prolog0(&mut self) -> Result {
        self.skip_whitespace()?;
        let pos = self.queue.position();
        if self.at_eof()? {
            return Err(self.err(SyntaxError::no_root_element(), pos));
        }
        self.expect_lt(pos)?;
        if self.peek_xmldecl_opener()? {
            let ev = self.read_xml_decl(pos)?;
            self.position = DocPosition::Prolog1;
            return Ok(ev);
        }
        self.dispatch_prolog_token(pos, false)
    }

    pub(super) fn prolog1(&mut self) -> Result {
        self.skip_whitespace()?;
        let pos = self.queue.position();
        if self.at_eof()? {
            return Err(self.err(SyntaxError::no_root_element(), pos));
        }
        self.expect_lt(pos)?;
        self.dispatch_prolog_token(pos, true)
    }

    pub(super) fn prolog2(&mut self) -> Result {
        self.skip_whitespace()?;
        let pos = self.queue.position();
        if self.at_eof()? {
            return Err(self.err(SyntaxError::no_root_element(), pos));
        }
        self.expect_lt(pos)?;
        self.dispatch_prolog_token(pos, true)
    }

    fn dispatch_prolog_token(&mut self, pos: TextPosition, doctype_forbidden: bool) -> Result {
        match lexer::classify(&mut self.queue)? {
            Token::CommentToken => {
                self.skip_comment_body()?;
                self.next_uncached_from_same_state()
            }
            Token::PIToken(target) => self.read_pi(target, pos),
            Token::DeclToken(name) if name == "DOCTYPE" && !doctype_forbidden => {
                let ev = self.read_doctype(pos)?;
                self.position = DocPosition::Prolog2;
                Ok(ev)
            }
            Token::DeclToken(name) if name == "DOCTYPE" => {
                Err(self.err(SyntaxError::invalid_doctype("DOCTYPE not allowed here"), pos))
            }
            Token::StartToken(name) => {
                self.level = 1;
                self.seen_root = true;
                self.position = DocPosition::Body;
                self.read_start_tag(name, pos)
            }
            other => Err(self.err(SyntaxError::unexpected_token(format!("{other:?}")), pos)),
        }
    }

    /// Re-enters whichever prolog state we are still in after discarding a
    /// comment, without re-consuming a second `<`.
    fn next_uncached_from_same_state(&mut self) -> Result {
        match self.position {
            DocPosition::Prolog0 => self.prolog0(),
            DocPosition::Prolog1 => self.prolog1(),
            DocPosition::Prolog2 => self.prolog2(),
            _ => unreachable!("comments only recur from a prolog state"),
        }
    }

    pub(super) fn skip_whitespace(&mut self) -> std::result::Result<(), Error> {
        while let Some(c) = self.queue.peek()? {
            if !is_whitespace_char(c) {
                break;
            }
            self.queue.next()?;
        }
        Ok(())
    }

    fn expect_lt(&mut self, pos: TextPosition) -> std::result::Result<(), Error> {
        match self.queue.next()? {
            '<' => Ok(()),
            _ => Err(self.err(SyntaxError::char_data_at_top_level(), pos)),
        }
    }

    /// Looks past an already-consumed `<` for `?xml` followed by
    /// whitespace — the only thing that distinguishes an XML declaration
    /// from an ordinary `<?xml-stylesheet…?>`-style processing
    /// instruction. Un-consumes what it read on a mismatch.
    fn peek_xmldecl_opener(&mut self) -> std::result::Result<bool, Error> {
        if self.queue.peek()? != Some('?') {
            return Ok(false);
        }
        self.queue.next()?;
        let mut matched = String::new();
        for expected in "xml".chars() {
            match self.queue.peek()? {
                Some(c) if c == expected => matched.push(self.queue.next()?),
                _ => return self.unmatch_xmldecl_opener(matched),
            }
        }
        match self.queue.peek()? {
            Some(c) if is_whitespace_char(c) => Ok(true),
            _ => self.unmatch_xmldecl_opener(matched),
        }
    }

    fn unmatch_xmldecl_opener(&mut self, matched: String) -> std::result::Result<bool, Error> {
        self.queue.unread(&matched);
        self.queue.unread("?");
        Ok(false)
    }
}
