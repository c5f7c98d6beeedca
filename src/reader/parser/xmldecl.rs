//! The XML declaration (`spec.md` §4.4): `<?xml version="1.x" [encoding="…"] [standalone="yes"|"no"]?>`,
//! already consumed through `<?xml` plus its trailing whitespace check.

use crate::common::{parse_xml_version, TextPosition};
use crate::lexical::{read_quoted, space, space1};
use crate::reader::error::{Error, SyntaxError};
use crate::reader::events::XmlEvent;

use super::PullParser;

impl PullParser {
    pub(super) fn read_xml_decl(&mut self, pos: TextPosition) -> Result<XmlEvent, Error> {
        space1(&mut self.queue, "23", "expected whitespace before 'version'")?;
        self.expect_keyword("version")?;
        self.expect_eq()?;
        let version_str = read_quoted(&mut self.queue)?;
        let version = parse_xml_version(&version_str)
            .ok_or_else(|| self.err(SyntaxError::invalid_xml_version(&version_str), pos))?;
        self.xml11 = version.is_xml11_or_later();
        self.queue.set_xml11(self.xml11);

        let had_space = space(&mut self.queue)?;
        let mut encoding = None;
        let mut standalone = None;

        if had_space && self.peek_keyword("encoding")? {
            self.expect_eq()?;
            encoding = Some(read_quoted(&mut self.queue)?);
            space(&mut self.queue)?;
        }
        if self.peek_keyword("standalone")? {
            self.expect_eq()?;
            let value = read_quoted(&mut self.queue)?;
            standalone = Some(match value.as_str() {
                "yes" => true,
                "no" => false,
                _ => return Err(self.err(SyntaxError::invalid_standalone(&value), pos)),
            });
            space(&mut self.queue)?;
        }
        self.expect_str("?>")?;
        Ok(XmlEvent::XmlDecl { version, encoding, standalone, pos })
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), Error> {
        if self.peek_keyword(keyword)? {
            Ok(())
        } else {
            Err(self.err(SyntaxError::new("24", format!("expected '{keyword}'")), self.queue.position()))
        }
    }

    pub(super) fn peek_keyword(&mut self, keyword: &str) -> Result<bool, Error> {
        let mut matched = String::new();
        for expected in keyword.chars() {
            match self.queue.peek()? {
                Some(c) if c == expected => matched.push(self.queue.next()?),
                _ => {
                    if !matched.is_empty() {
                        self.queue.unread(&matched);
                    }
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn expect_eq(&mut self) -> Result<(), Error> {
        space(&mut self.queue)?;
        let pos = self.queue.position();
        match self.queue.next()? {
            '=' => {
                space(&mut self.queue)?;
                Ok(())
            }
            c => Err(self.err(SyntaxError::unexpected_token(format!("'{c}', expected '='")), pos)),
        }
    }

    pub(super) fn expect_str(&mut self, expected: &str) -> Result<(), Error> {
        let pos = self.queue.position();
        for expected_char in expected.chars() {
            match self.queue.next_opt()? {
                Some(c) if c == expected_char => {}
                Some(c) => {
                    return Err(self.err(
                        SyntaxError::unexpected_token(format!("'{c}', expected \"{expected}\"")),
                        pos,
                    ))
                }
                None => return Err(self.err(SyntaxError::unexpected_eof(), pos)),
            }
        }
        Ok(())
    }
}
