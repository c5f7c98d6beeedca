//! The namespace resolver (`spec.md` §4.6): a stack of `prefix → URI`
//! frames, one pushed per open element, sharing structure with its parent
//! the way the teacher's own design notes (`spec.md` §9) recommend for a
//! tagged-union tree.

use std::collections::HashMap;
use std::rc::Rc;

use crate::name::QName;
use crate::reader::error::NscKind;

pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XML_PREFIX: &str = "xml";
/// The `xmlns` prefix itself is never resolvable — it marks a namespace
/// declaration, not a namespaced name (`attribute.rs::is_namespace_declaration`).
pub const XMLNS_PREFIX: &str = "xmlns";

/// A namespace constraint violation without a position attached; the tree
/// builder (which knows where in the document it is) wraps this into a
/// positioned `Error::nsc` as it processes each `StartTag`/`EndTag`.
pub(crate) struct NsError(pub NscKind, pub String);

/// One element's namespace bindings layered on top of its parent's.
#[derive(Clone, Debug)]
struct Frame {
    /// `None` key = default namespace (`xmlns="..."`).
    bindings: HashMap<Option<Rc<str>>, Rc<str>>,
}

/// A stack of namespace frames. The bottom frame pre-binds `xml` to the
/// W3C XML namespace URI, per `spec.md` §4.6.
pub(crate) struct NamespaceStack {
    frames: Vec<Frame>,
}

impl NamespaceStack {
    pub(crate) fn new() -> Self {
        let mut root = HashMap::new();
        root.insert(Some(Rc::from(XML_PREFIX)), Rc::from(XML_URI));
        NamespaceStack { frames: vec![Frame { bindings: root }] }
    }

    pub(crate) fn push_scope(&mut self) {
        let top = self.frames.last().expect("namespace stack is never empty").clone();
        self.frames.push(top);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "root namespace frame must never be popped");
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("namespace stack is never empty")
    }

    /// Applies one `xmlns` / `xmlns:prefix` declaration found among an
    /// element's attributes, in the current (already-pushed) scope.
    pub(crate) fn declare(&mut self, prefix: Option<&str>, value: &str, xml11: bool) -> Result<(), NsError> {
        match prefix {
            None if value.is_empty() => {
                // xmlns="" : undeclares the default namespace.
                if !xml11 && self.default_uri().is_some() {
                    return Err(NsError(NscKind::NoPrefixUndeclaring, "xmlns=\"\" is only allowed in XML 1.1".into()));
                }
                self.top_mut().bindings.remove(&None);
                Ok(())
            }
            None => {
                self.top_mut().bindings.insert(None, Rc::from(value));
                Ok(())
            }
            Some(p) if p == XML_PREFIX => Err(NsError(
                NscKind::PrefixDeclared,
                format!("cannot redeclare reserved prefix '{XML_PREFIX}'"),
            )),
            Some(p) if value.is_empty() => {
                if !xml11 {
                    return Err(NsError(
                        NscKind::NoPrefixUndeclaring,
                        format!("xmlns:{p}=\"\" is only allowed in XML 1.1"),
                    ));
                }
                self.top_mut().bindings.remove(&Some(Rc::from(p)));
                Ok(())
            }
            Some(p) => {
                self.top_mut().bindings.insert(Some(Rc::from(p)), Rc::from(value));
                Ok(())
            }
        }
    }

    fn default_uri(&self) -> Option<&Rc<str>> {
        self.frames.last().and_then(|f| f.bindings.get(&None))
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<Rc<str>> {
        let key: Option<Rc<str>> = prefix.map(Rc::from);
        self.frames.last().and_then(|f| f.bindings.get(&key)).cloned()
    }

    /// Resolves an element name: the default namespace applies when there
    /// is no prefix.
    pub(crate) fn resolve_element(&self, name: QName) -> Result<QName, NsError> {
        match &name.prefix {
            None => {
                let uri = self.default_uri().cloned();
                Ok(name.with_uri(uri))
            }
            Some(p) => {
                let uri = self.lookup(Some(p))
                    .ok_or_else(|| NsError(NscKind::PrefixDeclared, format!("unbound prefix '{p}'")))?;
                Ok(name.with_uri(Some(uri)))
            }
        }
    }

    /// Resolves an attribute name: the default namespace never applies to
    /// unprefixed attributes.
    pub(crate) fn resolve_attribute(&self, name: QName) -> Result<QName, NsError> {
        match &name.prefix {
            None => Ok(name),
            Some(p) => {
                let uri = self.lookup(Some(p))
                    .ok_or_else(|| NsError(NscKind::PrefixDeclared, format!("unbound prefix '{p}'")))?;
                Ok(name.with_uri(Some(uri)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_prefix_preloaded() {
        let ns = NamespaceStack::new();
        let name = ns.resolve_element(QName::with_prefix("xml", "lang")).ok().unwrap();
        assert_eq!(name.uri.as_deref(), Some(XML_URI));
    }

    #[test]
    fn unbound_prefix_is_nsc_error() {
        let ns = NamespaceStack::new();
        assert!(ns.resolve_element(QName::with_prefix("foo", "bar")).is_err());
    }

    #[test]
    fn default_namespace_applies_only_to_elements() {
        let mut ns = NamespaceStack::new();
        ns.push_scope();
        ns.declare(None, "urn:x", false).unwrap();
        let elem = ns.resolve_element(QName::local("a")).ok().unwrap();
        assert_eq!(elem.uri.as_deref(), Some("urn:x"));
        let attr = ns.resolve_attribute(QName::local("a")).ok().unwrap();
        assert_eq!(attr.uri, None);
    }

    #[test]
    fn undeclaring_default_ns_in_xml10_is_error() {
        let mut ns = NamespaceStack::new();
        ns.push_scope();
        ns.declare(None, "urn:x", false).unwrap();
        ns.push_scope();
        assert!(ns.declare(None, "", false).is_err());
        assert!(ns.declare(None, "", true).is_ok());
    }
}
