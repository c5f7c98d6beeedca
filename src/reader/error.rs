//! Error types and positions (`spec.md` §3, §7): a small taxonomy of
//! failures, each carrying the originating line/column and — for syntax
//! errors — the XML grammar production it violates.

use std::borrow::Cow;
use std::fmt;

use crate::common::{Position, TextPosition};

/// A grammar violation, tagged with the XML 1.0/1.1 production number it
/// corresponds to (`spec.md` §7: "1" root, "2" forbidden character, "14"
/// CharData, "22" prolog, "28" DOCTYPE, "42"/"43"/"44" tags, "45"/"46"
/// ELEMENT decl, "66" CharRef, "75" ExternalId, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub prod: &'static str,
    pub message: Cow<'static, str>,
}

impl SyntaxError {
    #[must_use]
    pub fn new(prod: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        SyntaxError { prod, message: message.into() }
    }

    pub(crate) fn unexpected_eof() -> Self {
        Self::new("1", "unexpected end of stream")
    }

    pub(crate) fn invalid_character(cp: u32) -> Self {
        Self::new("2", format!("character U+{cp:04X} is not allowed in XML"))
    }

    pub(crate) fn no_root_element() -> Self {
        Self::new("1", "missing root element")
    }

    pub(crate) fn several_root_elements() -> Self {
        Self::new("1", "several root elements")
    }

    pub(crate) fn forbidden_cdata_close() -> Self {
        Self::new("14", "']]>' is not allowed in character data")
    }

    pub(crate) fn char_data_at_top_level() -> Self {
        Self::new("27", "non-whitespace character data is not allowed outside the root element")
    }

    pub(crate) fn unexpected_token(found: impl Into<Cow<'static, str>>) -> Self {
        Self::new("22", format!("unexpected token: {}", found.into()))
    }

    pub(crate) fn invalid_xml_version(version: impl fmt::Display) -> Self {
        Self::new("26", format!("invalid XML version: {version}"))
    }

    pub(crate) fn invalid_standalone(value: impl fmt::Display) -> Self {
        Self::new("32", format!("invalid standalone declaration value: {value}"))
    }

    pub(crate) fn invalid_doctype(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::new("28", detail)
    }

    pub(crate) fn invalid_tag(prod: &'static str, detail: impl Into<Cow<'static, str>>) -> Self {
        Self::new(prod, detail)
    }

    pub(crate) fn invalid_charref(value: impl fmt::Display) -> Self {
        Self::new("66", format!("invalid character reference: {value}"))
    }

    pub(crate) fn undeclared_charref(cp: u32) -> Self {
        Self::new("66", format!("character reference U+{cp:04X} does not denote a valid XML character"))
    }

    pub(crate) fn invalid_external_id(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::new("75", detail)
    }

    pub(crate) fn entity_too_big() -> Self {
        Self::new("9", "entity expansion exceeded configured limits")
    }

    pub(crate) fn unknown_markup_declaration(name: impl fmt::Display) -> Self {
        Self::new("29", format!("unknown markup declaration: {name}"))
    }
}

/// Well-formedness constraint violations (XML 1.0 §2.1).
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum WfcKind {
    #[error("element type mismatch")]
    ElementTypeMatch,
    #[error("entity not declared")]
    EntityDeclared,
    #[error("recursive entity reference")]
    NoRecursion,
}

/// Namespace constraint violations (XML Namespaces 1.0).
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum NscKind {
    #[error("prefix not declared")]
    PrefixDeclared,
    #[error("prefix cannot be undeclared")]
    NoPrefixUndeclaring,
    #[error("duplicate attribute after namespace resolution")]
    AttributesUnique,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("{0}: {1}")]
    Wfc(WfcKind, String),
    #[error("{0}: {1}")]
    Nsc(NscKind, String),
}

/// A parse failure: a position plus a classified cause. Fatal — there is
/// no recovery or resynchronisation (`spec.md` §4.9).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{pos} {kind}")]
pub struct Error {
    pub pos: TextPosition,
    pub kind: ErrorKind,
}

impl Error {
    #[must_use]
    pub fn syntax(e: SyntaxError, pos: TextPosition) -> Self {
        Error { pos, kind: ErrorKind::Syntax(e) }
    }

    #[must_use]
    pub fn wfc(kind: WfcKind, detail: impl Into<String>, pos: TextPosition) -> Self {
        Error { pos, kind: ErrorKind::Wfc(kind, detail.into()) }
    }

    #[must_use]
    pub fn nsc(kind: NscKind, detail: impl Into<String>, pos: TextPosition) -> Self {
        Error { pos, kind: ErrorKind::Nsc(kind, detail.into()) }
    }

    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl Position for Error {
    fn position(&self) -> TextPosition {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_position() {
        let err = Error::syntax(SyntaxError::unexpected_eof(), TextPosition { row: 2, column: 3 });
        assert_eq!(err.to_string(), "3:4 unexpected end of stream");
    }

    #[test]
    fn wfc_display() {
        let err = Error::wfc(WfcKind::ElementTypeMatch, "expected `a`, found `b`", TextPosition::new());
        assert_eq!(err.to_string(), "1:1 element type mismatch: expected `a`, found `b`");
    }
}
