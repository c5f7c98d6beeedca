//! `XmlEvent` (`spec.md` §3): the tagged union the pull parser emits, one
//! per `next()` call, each carrying the position it was produced at.

use crate::attribute::Attr;
use crate::common::{TextPosition, XmlVersion};
use crate::name::QName;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlEvent {
    StartDocument {
        pos: TextPosition,
    },
    XmlDecl {
        version: XmlVersion,
        encoding: Option<String>,
        standalone: Option<bool>,
        pos: TextPosition,
    },
    XmlDoctype {
        name: QName,
        external_id: Option<crate::dtd::ExternalId>,
        /// Markup declarations read from the internal subset, if any
        /// (`spec.md` §3's `subset?`). Empty when there was no `[ … ]`
        /// block. `docname` in `spec.md` §3 and `name` here are the same
        /// value in practice — the DOCTYPE's declared name always equals
        /// the root element's — so this carries a single field for both.
        subset: Vec<crate::dtd::DtdDecl>,
        pos: TextPosition,
    },
    StartTag {
        name: QName,
        attrs: Vec<Attr>,
        is_empty: bool,
        pos: TextPosition,
    },
    EndTag {
        name: QName,
        pos: TextPosition,
    },
    XmlString {
        text: String,
        is_cdata: bool,
        pos: TextPosition,
    },
    XmlCharRef {
        codepoint: u32,
        pos: TextPosition,
    },
    XmlEntityRef {
        name: String,
        pos: TextPosition,
    },
    XmlComment {
        text: String,
        pos: TextPosition,
    },
    XmlPI {
        target: String,
        body: String,
        pos: TextPosition,
    },
    EndDocument {
        pos: TextPosition,
    },
    /// Emitted only when `ParserConfig::partial` is set and end-of-input
    /// is reached between attributes of an open start tag.
    ExpectAttributes {
        tag: QName,
        partial_attrs: Vec<Attr>,
        pos: TextPosition,
    },
    /// Emitted only in partial mode, after an attribute name and `=` but
    /// before its value delimiter.
    ExpectAttributeValue {
        tag: QName,
        partial_attrs: Vec<Attr>,
        attr_name: QName,
        pos: TextPosition,
    },
    /// Emitted only in partial mode, while reading character data.
    ExpectNodes {
        pos: TextPosition,
    },
}

impl XmlEvent {
    #[must_use]
    pub fn position(&self) -> TextPosition {
        match self {
            XmlEvent::StartDocument { pos }
            | XmlEvent::XmlDecl { pos, .. }
            | XmlEvent::XmlDoctype { pos, .. }
            | XmlEvent::StartTag { pos, .. }
            | XmlEvent::EndTag { pos, .. }
            | XmlEvent::XmlString { pos, .. }
            | XmlEvent::XmlCharRef { pos, .. }
            | XmlEvent::XmlEntityRef { pos, .. }
            | XmlEvent::XmlComment { pos, .. }
            | XmlEvent::XmlPI { pos, .. }
            | XmlEvent::EndDocument { pos }
            | XmlEvent::ExpectAttributes { pos, .. }
            | XmlEvent::ExpectAttributeValue { pos, .. }
            | XmlEvent::ExpectNodes { pos } => *pos,
        }
    }
}
