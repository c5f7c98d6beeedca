//! The document body and epilog (`spec.md` §4.4): `Body` runs from the
//! root start tag to its matching end tag, interleaving chardata,
//! elements, comments, PIs, and CDATA sections; `Postlog` allows only
//! whitespace, comments and PIs until end of input.

use crate::common::TextPosition;
use crate::name::QName;
use crate::reader::error::{Error, SyntaxError};
use crate::reader::events::XmlEvent;
use crate::reader::lexer::{self, Token};

use super::{DocPosition, PullParser, Result};

impl PullParser {
    pub(super) fn body(&mut self) -> Result {
        if self.suspended_tag.is_some() {
            let ev = self.resume_start_tag()?;
            self.note_start_tag_result(&ev);
            return Ok(ev);
        }
        let pos = self.queue.position();
        match self.queue.peek()? {
            Some('<') => {
                self.queue.next()?;
                self.dispatch_body_token(pos)
            }
            None => {
                if self.partial {
                    Ok(XmlEvent::ExpectNodes { pos })
                } else {
                    Err(self.err(SyntaxError::unexpected_eof(), pos))
                }
            }
            Some(_) => match self.read_chardata()? {
                Some(ev) => Ok(ev),
                None => {
                    if self.partial {
                        Ok(XmlEvent::ExpectNodes { pos })
                    } else {
                        Err(self.err(SyntaxError::unexpected_eof(), pos))
                    }
                }
            },
        }
    }

    pub(super) fn postlog(&mut self) -> Result {
        self.skip_whitespace()?;
        let pos = self.queue.position();
        if self.at_eof()? {
            return Ok(XmlEvent::EndDocument { pos });
        }
        self.expect_lt_in_postlog(pos)?;
        match lexer::classify(&mut self.queue)? {
            Token::CommentToken => {
                self.skip_comment_body()?;
                self.postlog()
            }
            Token::PIToken(target) => self.read_pi(target, pos),
            other => Err(self.err(
                SyntaxError::unexpected_token(format!("{other:?}, only comments and PIs are allowed after the root element")),
                pos,
            )),
        }
    }

    fn dispatch_body_token(&mut self, pos: TextPosition) -> Result {
        match lexer::classify(&mut self.queue)? {
            Token::CommentToken => {
                let text = self.read_comment_body()?;
                Ok(XmlEvent::XmlComment { text, pos })
            }
            Token::PIToken(target) => self.read_pi(target, pos),
            Token::SectionToken(name) if name == "CDATA" => self.read_cdata(pos),
            Token::SectionToken(name) => Err(self.err(SyntaxError::unknown_markup_declaration(name), pos)),
            Token::DeclToken(name) => Err(self.err(SyntaxError::unknown_markup_declaration(name), pos)),
            Token::StartToken(name) => {
                let ev = self.read_start_tag(name, pos)?;
                self.note_start_tag_result(&ev);
                Ok(ev)
            }
            Token::EndToken(name) => self.read_end_tag(name, pos),
        }
    }

    /// Applies the bookkeeping that follows a fully-read `StartTag` —
    /// incrementing `level`, or queuing the paired `EndTag` for a
    /// self-closing tag — regardless of whether it was just read in one
    /// pass or arrived via `resume_start_tag` after a templating
    /// suspension. A suspension placeholder event (`ExpectAttributes`/
    /// `ExpectAttributeValue`) changes nothing yet.
    fn note_start_tag_result(&mut self, ev: &XmlEvent) {
        match ev {
            XmlEvent::StartTag { is_empty: true, name, pos, .. } => {
                self.pending.push_back(XmlEvent::EndTag { name: name.clone(), pos: *pos });
            }
            XmlEvent::StartTag { is_empty: false, .. } => {
                self.level += 1;
            }
            _ => {}
        }
    }

    fn read_end_tag(&mut self, name: QName, pos: TextPosition) -> Result {
        self.open_tags_pop_check(&name, pos)?;
        self.skip_whitespace()?;
        self.expect_str(">")?;
        self.level = self.level.saturating_sub(1);
        if self.level == 0 {
            self.position = DocPosition::Postlog;
        }
        Ok(XmlEvent::EndTag { name, pos })
    }

    /// The pull parser only tracks nesting `level`, not a stack of open
    /// element names — that stack (and the `spec.md` §4.4 WFC that an end
    /// tag's name must match its start tag) lives on the tree builder
    /// (`spec.md` §4.8), which sees every `StartTag`/`EndTag` pair. Here we
    /// can only catch the shallow case: an end tag when nothing is open.
    fn open_tags_pop_check(&mut self, name: &QName, pos: TextPosition) -> std::result::Result<(), Error> {
        if self.level == 0 {
            return Err(self.err(
                SyntaxError::invalid_tag("42", format!("unexpected closing tag '{}': no element is open", name.qualified())),
                pos,
            ));
        }
        Ok(())
    }

    fn expect_lt_in_postlog(&mut self, pos: TextPosition) -> std::result::Result<(), Error> {
        match self.queue.next()? {
            '<' => Ok(()),
            _ => Err(self.err(SyntaxError::char_data_at_top_level(), pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::reader::config::ParserConfig;
    use crate::reader::events::XmlEvent;
    use crate::reader::parser::PullParser;

    fn events(src: &str) -> Vec<XmlEvent> {
        let mut p = PullParser::new(ParserConfig::new());
        p.feed_str(src.to_owned());
        let mut out = Vec::new();
        while let Some(r) = p.next() {
            out.push(r.unwrap());
        }
        out
    }

    #[test]
    fn parses_simple_document() {
        let evs = events("<root>hello<child/></root>");
        assert!(matches!(evs.first(), Some(XmlEvent::StartDocument { .. })));
        assert!(matches!(evs.last(), Some(XmlEvent::EndDocument { .. })));
        assert!(evs.iter().any(|e| matches!(e, XmlEvent::XmlString { text, .. } if text == "hello")));
        assert!(evs.iter().any(|e| matches!(e, XmlEvent::StartTag { is_empty: true, .. })));
    }

    #[test]
    fn comments_and_pis_allowed_in_epilog() {
        let evs = events("<root/><!--c--><?pi?>");
        assert!(evs.iter().any(|e| matches!(e, XmlEvent::XmlComment { .. })));
        assert!(evs.iter().any(|e| matches!(e, XmlEvent::XmlPI { .. })));
    }

    #[test]
    fn rejects_end_tag_with_no_open_element() {
        let evs_result: Vec<_> = {
            let mut p = PullParser::new(ParserConfig::new());
            p.feed_str("<root></root></root>".to_owned());
            let mut out = Vec::new();
            while let Some(r) = p.next() {
                let is_err = r.is_err();
                out.push(r);
                if is_err {
                    break;
                }
            }
            out
        };
        assert!(evs_result.last().unwrap().is_err());
    }
}
