//! Start-tag attribute lists (`spec.md` §4.4, §4.6): after the markup
//! tokenizer has read a start tag's name, this reads zero or more
//! `Name Eq AttValue` pairs up to the closing `>` or self-closing `/>`.
//! In partial mode (`spec.md` §4.8), end-of-input here suspends the
//! parser instead of failing, surfacing `ExpectAttributes` /
//! `ExpectAttributeValue` placeholders rather than an error.

use crate::attribute::{normalize_chunk, Attr, XmlTexty};
use crate::common::TextPosition;
use crate::lexical::{read_ncname, read_qname, space};
use crate::name::QName;
use crate::reader::error::{Error, SyntaxError};
use crate::reader::events::XmlEvent;

use super::PullParser;

/// Where, inside an in-progress attribute list, a templating suspension
/// left off (`spec.md` §4.8) — resumed by `resume_start_tag` once `feed`
/// supplies more input.
#[derive(Debug)]
pub(super) enum AttrSuspension {
    /// Between attributes: about to read a name or the closing `>`/`/>`.
    BeforeNextAttr,
    /// A name and `=` have been read; about to read the quoted value.
    BeforeValue(QName),
}

/// The full state of a start tag's attribute list that was left
/// unfinished when input ran out in partial mode.
pub(super) struct SuspendedTag {
    pub name: QName,
    pub attrs: Vec<Attr>,
    pub pos: TextPosition,
    pub state: AttrSuspension,
}

impl PullParser {
    /// Reads a start tag's attribute list, beginning right after the tag
    /// name has already been consumed by the tokenizer.
    pub(super) fn read_start_tag(&mut self, name: QName, pos: TextPosition) -> super::Result {
        self.continue_start_tag(name, Vec::new(), pos, AttrSuspension::BeforeNextAttr)
    }

    /// Re-enters an attribute list suspended by a prior `ExpectAttributes`
    /// / `ExpectAttributeValue` placeholder, now that `feed` has supplied
    /// more characters.
    pub(super) fn resume_start_tag(&mut self) -> super::Result {
        let SuspendedTag { name, attrs, pos, state } =
            self.suspended_tag.take().expect("resume_start_tag called without a pending suspension");
        self.continue_start_tag(name, attrs, pos, state)
    }

    fn continue_start_tag(
        &mut self,
        name: QName,
        mut attrs: Vec<Attr>,
        pos: TextPosition,
        mut state: AttrSuspension,
    ) -> super::Result {
        if let AttrSuspension::BeforeValue(attr_name) = state {
            if self.partial && self.queue.is_exhausted()? {
                self.suspended_tag = Some(SuspendedTag {
                    name: name.clone(),
                    attrs: attrs.clone(),
                    pos,
                    state: AttrSuspension::BeforeValue(attr_name.clone()),
                });
                return Ok(XmlEvent::ExpectAttributeValue { tag: name, partial_attrs: attrs, attr_name, pos });
            }
            let value = self.read_attr_value()?;
            attrs.push(Attr::new(attr_name, value));
            state = AttrSuspension::BeforeNextAttr;
        }
        debug_assert!(matches!(state, AttrSuspension::BeforeNextAttr));

        loop {
            let had_space = space(&mut self.queue)?;
            if self.partial && self.queue.is_exhausted()? {
                self.suspended_tag = Some(SuspendedTag {
                    name: name.clone(),
                    attrs: attrs.clone(),
                    pos,
                    state: AttrSuspension::BeforeNextAttr,
                });
                return Ok(XmlEvent::ExpectAttributes { tag: name, partial_attrs: attrs, pos });
            }
            match self.queue.peek()? {
                None => return Err(self.err(SyntaxError::unexpected_eof(), self.queue.position())),
                Some('>') => {
                    self.queue.next()?;
                    return Ok(XmlEvent::StartTag { name, attrs, is_empty: false, pos });
                }
                Some('/') => {
                    self.queue.next()?;
                    self.expect_str(">")?;
                    return Ok(XmlEvent::StartTag { name, attrs, is_empty: true, pos });
                }
                Some(_) => {
                    if !had_space {
                        return Err(self.err(
                            SyntaxError::invalid_tag("41", "expected whitespace before attribute"),
                            self.queue.position(),
                        ));
                    }
                    let attr_pos = self.queue.position();
                    let attr_name = read_qname(&mut self.queue)?;
                    space(&mut self.queue)?;
                    let eq_pos = self.queue.position();
                    match self.queue.next_opt()? {
                        Some('=') => {}
                        Some(c) => {
                            return Err(self.err(SyntaxError::unexpected_token(format!("'{c}', expected '='")), eq_pos))
                        }
                        None => return Err(self.err(SyntaxError::unexpected_eof(), eq_pos)),
                    }
                    space(&mut self.queue)?;
                    if attrs.iter().any(|a: &Attr| a.name == attr_name) {
                        return Err(self.err(
                            SyntaxError::invalid_tag("41", format!("duplicate attribute '{}'", attr_name.qualified())),
                            attr_pos,
                        ));
                    }
                    if self.partial && self.queue.is_exhausted()? {
                        self.suspended_tag = Some(SuspendedTag {
                            name: name.clone(),
                            attrs: attrs.clone(),
                            pos,
                            state: AttrSuspension::BeforeValue(attr_name.clone()),
                        });
                        return Ok(XmlEvent::ExpectAttributeValue { tag: name, partial_attrs: attrs, attr_name, pos });
                    }
                    let value = self.read_attr_value()?;
                    attrs.push(Attr::new(attr_name, value));
                }
            }
        }
    }

    /// Appends template-supplied attributes into a suspended
    /// `ExpectAttributes` tag, checking them against the attributes
    /// already read for duplicates (`spec.md` §4.8, scenario 5). Called by
    /// the tree builder after consuming a template argument; the parser
    /// resumes reading the rest of the tag on the next `next()` call.
    pub(crate) fn splice_template_attrs(&mut self, extra: Vec<Attr>) -> Result<(), Error> {
        let suspended = self
            .suspended_tag
            .as_mut()
            .expect("splice_template_attrs called without a pending ExpectAttributes suspension");
        debug_assert!(matches!(suspended.state, AttrSuspension::BeforeNextAttr));
        for attr in extra {
            if suspended.attrs.iter().any(|a| a.name == attr.name) {
                return Err(Error::syntax(
                    SyntaxError::invalid_tag("41", format!("duplicate attribute '{}'", attr.name.qualified())),
                    suspended.pos,
                ));
            }
            suspended.attrs.push(attr);
        }
        Ok(())
    }

    /// Resolves a suspended `ExpectAttributeValue` placeholder with a
    /// template-supplied value: `None` drops the attribute entirely
    /// (`spec.md` §4.8, scenario 6); `Some(v)` synthesises a single-chunk
    /// string attribute.
    pub(crate) fn splice_template_attr_value(&mut self, value: Option<String>) -> Result<(), Error> {
        let suspended = self
            .suspended_tag
            .as_mut()
            .expect("splice_template_attr_value called without a pending ExpectAttributeValue suspension");
        let attr_name = match std::mem::replace(&mut suspended.state, AttrSuspension::BeforeNextAttr) {
            AttrSuspension::BeforeValue(name) => name,
            other => {
                suspended.state = other;
                panic!("splice_template_attr_value called while not awaiting an attribute value");
            }
        };
        if let Some(v) = value {
            suspended.attrs.push(Attr::from_str(attr_name, v));
        }
        Ok(())
    }

    fn read_attr_value(&mut self) -> Result<Vec<XmlTexty>, Error> {
        let start = self.queue.position();
        let delim = match self.queue.next_opt()? {
            Some(c @ ('"' | '\'')) => c,
            Some(c) => return Err(self.err(SyntaxError::unexpected_token(format!("'{c}', expected a quote")), start)),
            None => return Err(self.err(SyntaxError::unexpected_eof(), start)),
        };
        let mut chunks = Vec::new();
        let mut buf = String::new();
        loop {
            let pos = self.queue.position();
            match self.queue.next_opt()? {
                None => return Err(self.err(SyntaxError::unexpected_eof(), pos)),
                Some(c) if c == delim => break,
                Some('<') => {
                    return Err(self.err(SyntaxError::invalid_tag("10", "'<' is not allowed in an attribute value"), pos))
                }
                Some('&') => {
                    if !buf.is_empty() {
                        chunks.push(XmlTexty::XmlString(normalize_chunk(&std::mem::take(&mut buf))));
                    }
                    chunks.push(self.read_attr_reference()?);
                }
                Some('\r') => {
                    if self.queue.peek()? == Some('\n') {
                        self.queue.next()?;
                    }
                    buf.push('\n');
                }
                Some(c) => buf.push(c),
            }
        }
        if !buf.is_empty() {
            chunks.push(XmlTexty::XmlString(normalize_chunk(&buf)));
        }
        Ok(chunks)
    }

    fn read_attr_reference(&mut self) -> Result<XmlTexty, Error> {
        let pos = self.queue.position();
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
            let cp = crate::lexical::parse_numeric_ref(&digits, hex)
                .ok_or_else(|| self.err(SyntaxError::invalid_charref(&digits), pos))?;
            Ok(XmlTexty::XmlCharRef(cp))
        } else {
            let name = read_ncname(&mut self.queue)?;
            self.expect_str(";")?;
            Ok(XmlTexty::XmlEntityRef(name))
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
        std::iter::from_fn(|| p.next()).map(Result::unwrap).collect()
    }

    #[test]
    fn reads_plain_and_self_closing_tags() {
        let evs = events("<a x='1' y=\"2\"/>");
        assert!(matches!(&evs[1], XmlEvent::StartTag { is_empty: true, attrs, .. } if attrs.len() == 2));
    }

    #[test]
    fn rejects_duplicate_attribute() {
        let mut p = PullParser::new(ParserConfig::new());
        p.feed_str("<a x='1' x='2'/>".to_owned());
        assert!(p.next().unwrap().is_ok());
        assert!(p.next().unwrap().is_err());
    }
}
