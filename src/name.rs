//! `QName`: a qualified name with optional prefix and, once namespace
//! resolution has run, an optional resolved URI (`spec.md` §3).

use std::fmt;
use std::rc::Rc;

/// A qualified name. Equality compares `local`+`uri` when the name is
/// resolved, else `local`+`prefix` — so an unresolved `foo:bar` and a
/// resolved `{urn:foo}bar` are never equal to each other, but two
/// resolved names with the same URI and local part are, regardless of
/// which prefix happened to spell them.
#[derive(Clone, Debug)]
pub struct QName {
    pub prefix: Option<Rc<str>>,
    pub local: Rc<str>,
    pub uri: Option<Rc<str>>,
}

impl QName {
    #[must_use]
    pub fn local(local: impl Into<Rc<str>>) -> Self {
        QName { prefix: None, local: local.into(), uri: None }
    }

    #[must_use]
    pub fn with_prefix(prefix: impl Into<Rc<str>>, local: impl Into<Rc<str>>) -> Self {
        QName { prefix: Some(prefix.into()), local: local.into(), uri: None }
    }

    /// A name is resolved once it either has no prefix (and so falls back
    /// to the default namespace, which may be "no namespace") or has a URI
    /// attached.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.prefix.is_none() || self.uri.is_some()
    }

    #[must_use]
    pub fn with_uri(mut self, uri: Option<Rc<str>>) -> Self {
        self.uri = uri;
        self
    }

    /// The `prefix:local` spelling as it appeared (or would appear) in
    /// source text, ignoring any resolved URI.
    #[must_use]
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local),
            None => self.local.to_string(),
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        if self.is_resolved() && other.is_resolved() {
            self.local == other.local && self.uri == other.uri
        } else {
            self.local == other.local && self.prefix == other.prefix
        }
    }
}
impl Eq for QName {}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(uri) = &self.uri {
            write!(f, "{{{uri}}}{}", self.local)
        } else {
            f.write_str(&self.qualified())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_before_resolution_uses_prefix() {
        let a = QName::with_prefix("a", "x");
        let b = QName::with_prefix("b", "x");
        assert_ne!(a, b);
        assert_eq!(a, QName::with_prefix("a", "x"));
    }

    #[test]
    fn equality_after_resolution_uses_uri() {
        let uri: Rc<str> = Rc::from("urn:x");
        let a = QName::with_prefix("a", "x").with_uri(Some(uri.clone()));
        let b = QName::with_prefix("b", "x").with_uri(Some(uri));
        assert_eq!(a, b);
    }

    #[test]
    fn unprefixed_name_is_resolved_without_uri() {
        assert!(QName::local("root").is_resolved());
    }
}
