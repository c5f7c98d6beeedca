//! The document tree (`spec.md` §3): an immutable rose tree built
//! bottom-up by the tree builder. Once `parse()` returns there is no
//! mutable API — callers get an owned, `Send`/`Sync`-able value.

use std::rc::Rc;

use crate::common::{TextPosition, XmlVersion};
use crate::name::QName;

/// An attribute after both namespace and reference resolution: a resolved
/// `QName` and its flattened text value. `spec.md` §9 consolidates the
/// source's two codepaths into one pipeline that resolves eagerly at
/// `EndTag` rather than deferring to a second pass (`SPEC_FULL.md` §4.8),
/// so by the time an `Attr` reaches the tree it is no longer the raw
/// `XmlTexty` chunk sequence `attribute::Attr` models mid-parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElemAttr {
    pub name: QName,
    pub value: String,
    pub pos: TextPosition,
}

/// One node of the parsed tree. Attribute nodes are carried inside
/// `Elem::attrs`, not as `XmlNode::Attribute` children, matching how
/// `spec.md` §3 lists `Attribute` as a node variant but the tree builder
/// (§4.8) only ever nests it under an `Elem`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlNode {
    Elem {
        name: QName,
        attrs: Vec<ElemAttr>,
        children: Vec<XmlNode>,
        pos: TextPosition,
    },
    Text {
        text: String,
        pos: TextPosition,
    },
    CData {
        text: String,
        pos: TextPosition,
    },
    Comment {
        text: String,
        pos: TextPosition,
    },
    PI {
        target: String,
        body: String,
        pos: TextPosition,
    },
}

impl XmlNode {
    #[must_use]
    pub fn position(&self) -> TextPosition {
        match self {
            XmlNode::Elem { pos, .. }
            | XmlNode::Text { pos, .. }
            | XmlNode::CData { pos, .. }
            | XmlNode::Comment { pos, .. }
            | XmlNode::PI { pos, .. } => *pos,
        }
    }

    #[must_use]
    pub fn as_elem(&self) -> Option<(&QName, &[ElemAttr], &[XmlNode])> {
        match self {
            XmlNode::Elem { name, attrs, children, .. } => Some((name, attrs, children)),
            _ => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        match self {
            XmlNode::Elem { children, .. } => children,
            _ => &[],
        }
    }
}

/// The result of a full document parse (`spec.md` §3): declaration
/// metadata plus the single root element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub version: Option<XmlVersion>,
    pub encoding: Option<Rc<str>>,
    pub standalone: Option<bool>,
    pub root: XmlNode,
}

impl Document {
    #[must_use]
    pub fn root_elem(&self) -> (&QName, &[ElemAttr], &[XmlNode]) {
        self.root.as_elem().expect("Document::root is always an Elem")
    }
}
