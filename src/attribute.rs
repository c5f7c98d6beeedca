//! Attribute values (`spec.md` §3, §4.4): kept as an ordered sequence of
//! text/reference chunks rather than a flat `String`, so that template
//! placeholders and entity references can be spliced in before anything is
//! flattened.

use crate::name::QName;
use crate::namespace::XMLNS_PREFIX;

/// One chunk of an attribute value before reference resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlTexty {
    /// Literal text, already attribute-value normalised (CR/LF/tab/space
    /// collapsed to a single space each, per `spec.md` §4.4).
    XmlString(String),
    /// `&#…;` / `&#x…;`, not yet substituted for its characters.
    XmlCharRef(u32),
    /// `&name;`, not yet substituted for its declared replacement text.
    XmlEntityRef(String),
}

/// An attribute: a resolved-or-not name plus its value as an ordered
/// sequence of chunks (`spec.md` §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: QName,
    pub value: Vec<XmlTexty>,
}

impl Attr {
    #[must_use]
    pub fn new(name: QName, value: Vec<XmlTexty>) -> Self {
        Attr { name, value }
    }

    /// A single-chunk string-valued attribute, the shape a template
    /// argument for `ExpectAttributeValue` is synthesised into
    /// (`spec.md` §4.8).
    #[must_use]
    pub fn from_str(name: QName, value: impl Into<String>) -> Self {
        Attr { name, value: vec![XmlTexty::XmlString(value.into())] }
    }

    /// Whether this attribute is an `xmlns` / `xmlns:prefix` namespace
    /// declaration rather than a regular attribute.
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        match &self.name.prefix {
            None => &*self.name.local == XMLNS_PREFIX,
            Some(p) => &**p == XMLNS_PREFIX,
        }
    }
}

/// Collapses XML attribute-value whitespace normalisation onto one chunk
/// of already-decoded literal text: `#x20 #x9 #xA #xD` each become a
/// single space (`spec.md` §4.4 — "this matches the non-CDATA
/// normalisation used uniformly here"). Line-ending pairing (`CR LF` →
/// one space) is handled by the caller, which never emits a lone `\r`
/// followed by `\n` as two separate chunks.
pub(crate) fn normalize_chunk(raw: &str) -> String {
    raw.chars()
        .map(|c| if matches!(c, '\u{20}' | '\u{9}' | '\u{A}' | '\u{D}') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_namespace_declarations() {
        let default_ns = Attr::from_str(QName::local("xmlns"), "urn:x");
        assert!(default_ns.is_namespace_declaration());
        let prefixed = Attr::from_str(QName::with_prefix("xmlns", "ns"), "urn:x");
        assert!(prefixed.is_namespace_declaration());
        let plain = Attr::from_str(QName::local("href"), "urn:x");
        assert!(!plain.is_namespace_declaration());
    }

    #[test]
    fn normalizes_whitespace_chunk() {
        assert_eq!(normalize_chunk("a\tb\nc"), "a b c");
    }
}
