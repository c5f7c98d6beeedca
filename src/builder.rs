//! The tree builder (`spec.md` §4.8): consumes the event stream from an
//! `EventReader` and reifies it into an immutable `Document`/`XmlNode`
//! tree, performing namespace resolution (§4.6) and reference resolution
//! (§4.7) inline as each element closes — one consolidated pipeline
//! rather than a parse pass followed by a separate resolution pass
//! (`SPEC_FULL.md` §4.8, §9).

use std::rc::Rc;

use crate::attribute::Attr;
use crate::common::TextPosition;
use crate::dtd::{DtdDecl, EntityDef};
use crate::entity::{EntityLimits, EntityTable};
use crate::name::QName;
use crate::namespace::NamespaceStack;
use crate::reader::{Error, ErrorKind, EventReader, NscKind, ParserConfig, SyntaxError, WfcKind, XmlEvent};
use crate::tree::{Document, ElemAttr, XmlNode};

/// One value spliced into a suspended placeholder event during templated
/// parsing (`spec.md` §4.8). The variant must match the placeholder kind
/// it is consumed by; a mismatch is a caller bug, not a document error,
/// and panics the way an out-of-bounds index would.
#[derive(Clone, Debug)]
pub enum TemplateArg {
    /// Consumed by `ExpectAttributes`: extra attributes appended after the
    /// ones already read from source.
    Attrs(Vec<Attr>),
    /// Consumed by `ExpectAttributeValue`: `None` drops the attribute,
    /// `Some(v)` supplies its string value.
    AttrValue(Option<String>),
    /// Consumed by `ExpectNodes`: nodes spliced into the current child list.
    Nodes(Vec<XmlNode>),
}

/// A start tag that has been opened but not yet closed: its raw
/// (unresolved) name and attribute list, kept around until the matching
/// `EndTag` supplies enough information — namely, that no more `xmlns`
/// declarations on this element remain to be seen — to resolve both.
struct OpenElem {
    name: QName,
    attrs: Vec<Attr>,
    pos: TextPosition,
}

/// Builds a `Document`/`XmlNode` tree from an `XmlEvent` stream
/// (`spec.md` §4.8). Holds the open-tag stack, a parallel stack of
/// in-progress child lists (the bottom frame collects the root element
/// plus any top-level comments/PIs), the namespace stack, and the entity
/// table accumulated from the DTD internal subset, if any.
pub struct TreeBuilder {
    reader: EventReader,
    entities: EntityTable,
    limits: EntityLimits,
    ns: NamespaceStack,
    open: Vec<OpenElem>,
    children_stack: Vec<Vec<XmlNode>>,
    version: Option<crate::common::XmlVersion>,
    encoding: Option<Rc<str>>,
    standalone: Option<bool>,
}

impl TreeBuilder {
    fn new_with_config(config: ParserConfig) -> Self {
        let limits = EntityLimits {
            max_depth: config.max_entity_expansion_depth,
            max_length: config.max_entity_expansion_length,
        };
        TreeBuilder {
            reader: EventReader::new_with_config(config),
            entities: EntityTable::new(),
            limits,
            ns: NamespaceStack::new(),
            open: Vec::new(),
            children_stack: vec![Vec::new()],
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// Parses a complete, non-templated document, returning just its root
    /// element (`spec.md` §6 `parse(source) → Elem`).
    pub fn parse(source: impl Into<String>) -> Result<XmlNode, Error> {
        Self::parse_document(source).map(|doc| doc.root)
    }

    /// As `parse`, with an explicit `ParserConfig` (the `partial` flag is
    /// ignored; a non-templated parse is never partial).
    pub fn parse_with_config(source: impl Into<String>, config: ParserConfig) -> Result<XmlNode, Error> {
        Self::parse_document_with_config(source, config).map(|doc| doc.root)
    }

    /// Parses a complete, non-templated document, returning the full
    /// `Document` (`spec.md` §6 `parseDocument(source) → Document`).
    pub fn parse_document(source: impl Into<String>) -> Result<Document, Error> {
        Self::parse_document_with_config(source, ParserConfig::new())
    }

    /// As `parse_document`, with an explicit `ParserConfig`.
    pub fn parse_document_with_config(source: impl Into<String>, mut config: ParserConfig) -> Result<Document, Error> {
        config.partial = false;
        let mut builder = TreeBuilder::new_with_config(config);
        builder.reader.feed_str(source.into());
        builder.drive(Vec::new(), Vec::new())?;
        builder.finish()
    }

    /// Parses a templated document: `sources` and `args` interleave (k
    /// sources, k-1 args), returning the root element. The parser runs
    /// with `partial = true` until the last source fragment is fed, per
    /// `spec.md` §6.
    pub fn parse_parts(sources: Vec<String>, args: Vec<TemplateArg>) -> Result<XmlNode, Error> {
        Self::parse_document_parts(sources, args).map(|doc| doc.root)
    }

    /// As `parse_parts`, with an explicit `ParserConfig`.
    pub fn parse_parts_with_config(
        sources: Vec<String>,
        args: Vec<TemplateArg>,
        config: ParserConfig,
    ) -> Result<XmlNode, Error> {
        Self::parse_document_parts_with_config(sources, args, config).map(|doc| doc.root)
    }

    /// As `parse_document`, for a templated document (`spec.md` §6).
    pub fn parse_document_parts(sources: Vec<String>, args: Vec<TemplateArg>) -> Result<Document, Error> {
        Self::parse_document_parts_with_config(sources, args, ParserConfig::new())
    }

    /// As `parse_document_parts`, with an explicit `ParserConfig`.
    pub fn parse_document_parts_with_config(
        mut sources: Vec<String>,
        args: Vec<TemplateArg>,
        mut config: ParserConfig,
    ) -> Result<Document, Error> {
        assert_eq!(
            sources.len(),
            args.len() + 1,
            "parse_parts requires exactly one more source fragment than template arguments"
        );
        config.partial = sources.len() > 1;
        let mut builder = TreeBuilder::new_with_config(config);
        let first = sources.remove(0);
        builder.reader.feed_str(first);
        builder.drive(sources, args)?;
        builder.finish()
    }

    /// Pulls events until `EndDocument`, reacting to templating
    /// placeholders by consuming the next argument and feeding the next
    /// source fragment.
    fn drive(&mut self, mut sources: Vec<String>, mut args: Vec<TemplateArg>) -> Result<(), Error> {
        sources.reverse();
        args.reverse();
        loop {
            match self.reader.next() {
                None => return Ok(()),
                Some(Err(e)) => return Err(e),
                Some(Ok(ev)) => {
                    if self.handle_event(ev, &mut sources, &mut args)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Returns `true` once `EndDocument` has been handled.
    fn handle_event(&mut self, ev: XmlEvent, sources: &mut Vec<String>, args: &mut Vec<TemplateArg>) -> Result<bool, Error> {
        match ev {
            XmlEvent::StartDocument { .. } => {}
            XmlEvent::XmlDecl { version, encoding, standalone, .. } => {
                self.version = Some(version);
                self.encoding = encoding.map(Rc::from);
                self.standalone = standalone;
            }
            XmlEvent::XmlDoctype { subset, .. } => {
                for decl in subset {
                    if let DtdDecl::GeneralEntity(ge) = decl {
                        match ge.def {
                            EntityDef::Value(v) => self.entities.declare(ge.name, v),
                            EntityDef::External(_, _) => self.entities.declare_external(ge.name),
                        }
                    }
                }
            }
            XmlEvent::StartTag { name, attrs, pos, .. } => self.open_element(name, attrs, pos)?,
            XmlEvent::EndTag { name, pos } => self.close_element(name, pos)?,
            XmlEvent::XmlString { text, is_cdata: true, pos } => self.push_child(XmlNode::CData { text, pos }),
            XmlEvent::XmlString { text, is_cdata: false, pos } => self.push_text(&[crate::attribute::XmlTexty::XmlString(text)], pos)?,
            XmlEvent::XmlCharRef { codepoint, pos } => self.push_text(&[crate::attribute::XmlTexty::XmlCharRef(codepoint)], pos)?,
            XmlEvent::XmlEntityRef { name, pos } => self.push_text(&[crate::attribute::XmlTexty::XmlEntityRef(name)], pos)?,
            XmlEvent::XmlComment { text, pos } => self.push_child(XmlNode::Comment { text, pos }),
            XmlEvent::XmlPI { target, body, pos } => self.push_child(XmlNode::PI { target, body, pos }),
            XmlEvent::EndDocument { .. } => return Ok(true),
            XmlEvent::ExpectAttributes { .. } => {
                let extra = match args.pop() {
                    Some(TemplateArg::Attrs(v)) => v,
                    Some(_) => panic!("template argument kind mismatch: expected TemplateArg::Attrs at ExpectAttributes"),
                    None => panic!("ran out of template arguments at ExpectAttributes"),
                };
                self.reader.splice_attrs(extra)?;
                self.feed_next(sources);
            }
            XmlEvent::ExpectAttributeValue { .. } => {
                let value = match args.pop() {
                    Some(TemplateArg::AttrValue(v)) => v,
                    Some(_) => panic!("template argument kind mismatch: expected TemplateArg::AttrValue at ExpectAttributeValue"),
                    None => panic!("ran out of template arguments at ExpectAttributeValue"),
                };
                self.reader.splice_attr_value(value)?;
                self.feed_next(sources);
            }
            XmlEvent::ExpectNodes { .. } => {
                let nodes = match args.pop() {
                    Some(TemplateArg::Nodes(v)) => v,
                    Some(_) => panic!("template argument kind mismatch: expected TemplateArg::Nodes at ExpectNodes"),
                    None => panic!("ran out of template arguments at ExpectNodes"),
                };
                for node in nodes {
                    self.push_child(node);
                }
                self.feed_next(sources);
            }
        }
        Ok(false)
    }

    fn feed_next(&mut self, sources: &mut Vec<String>) {
        let next = sources.pop().expect("ran out of source fragments at a templating placeholder");
        if sources.is_empty() {
            self.reader.set_partial(false);
        }
        self.reader.feed_str(next);
    }

    fn push_text(&mut self, chunk: &[crate::attribute::XmlTexty], pos: TextPosition) -> Result<(), Error> {
        let text = self.entities.resolve_text(chunk, pos, self.limits)?;
        self.push_child(XmlNode::Text { text, pos });
        Ok(())
    }

    fn push_child(&mut self, node: XmlNode) {
        self.children_stack.last_mut().expect("child builder stack is never empty while parsing").push(node);
    }

    /// Pushes a namespace scope, applies this element's `xmlns`/`xmlns:p`
    /// declarations, and opens a new child-list frame. Resolution of the
    /// element's own name and non-`xmlns` attributes is deferred to
    /// `close_element`, once it is known no further declarations on this
    /// element remain (`spec.md` §4.6, §4.8).
    fn open_element(&mut self, name: QName, attrs: Vec<Attr>, pos: TextPosition) -> Result<(), Error> {
        self.ns.push_scope();
        let permissive = self.reader.is_xml11() || self.reader.permissive_undeclare();
        for attr in &attrs {
            if attr.is_namespace_declaration() {
                let value = self.entities.resolve_text(&attr.value, pos, self.limits)?;
                // `xmlns:ns="…"` declares prefix "ns" (the attribute's local
                // part), not the literal "xmlns" in its own prefix slot;
                // bare `xmlns="…"` (no attribute prefix) declares the
                // default namespace.
                let prefix = attr.name.prefix.is_some().then(|| attr.name.local.as_ref());
                self.ns.declare(prefix, &value, permissive).map_err(|e| Error::nsc(e.0, e.1, pos))?;
            }
        }
        self.open.push(OpenElem { name, attrs, pos });
        self.children_stack.push(Vec::new());
        Ok(())
    }

    fn close_element(&mut self, name: QName, end_pos: TextPosition) -> Result<(), Error> {
        let open = self.open.pop().expect("end tag reached with no open element (parser already rejects unbalanced nesting)");
        if open.name != name {
            return Err(Error::wfc(
                WfcKind::ElementTypeMatch,
                format!("expected end tag '{}', found '{}'", open.name.qualified(), name.qualified()),
                end_pos,
            ));
        }
        let children = self.children_stack.pop().expect("children stack has a frame per open element");

        let resolved_name = self.ns.resolve_element(open.name).map_err(|e| Error::nsc(e.0, e.1, open.pos))?;
        let mut resolved_attrs: Vec<ElemAttr> = Vec::new();
        for attr in open.attrs {
            if attr.is_namespace_declaration() {
                continue;
            }
            let value = self.entities.resolve_text(&attr.value, open.pos, self.limits)?;
            let resolved = self.ns.resolve_attribute(attr.name).map_err(|e| Error::nsc(e.0, e.1, open.pos))?;
            if resolved_attrs.iter().any(|a| a.name == resolved) {
                return Err(Error::nsc(
                    NscKind::AttributesUnique,
                    format!("duplicate attribute '{resolved}' after namespace resolution"),
                    open.pos,
                ));
            }
            resolved_attrs.push(ElemAttr { name: resolved, value, pos: open.pos });
        }
        self.ns.pop_scope();

        self.push_child(XmlNode::Elem { name: resolved_name, attrs: resolved_attrs, children, pos: open.pos });
        Ok(())
    }

    fn finish(mut self) -> Result<Document, Error> {
        let root_children = self.children_stack.pop().expect("root child frame always exists");
        debug_assert!(self.children_stack.is_empty());
        debug_assert!(self.open.is_empty());

        let mut root = None;
        for node in root_children {
            match node {
                XmlNode::Elem { .. } if root.is_none() => root = Some(node),
                XmlNode::Elem { pos, .. } => {
                    return Err(Error::syntax(SyntaxError::several_root_elements(), pos))
                }
                _ => {}
            }
        }
        let root = root.ok_or_else(|| Error::syntax(SyntaxError::no_root_element(), TextPosition::new()))?;
        Ok(Document { version: self.version, encoding: self.encoding, standalone: self.standalone, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scenario_one_empty_element_with_attribute() {
        let root = TreeBuilder::parse(r#"<root a="1"/>"#).unwrap();
        let (name, attrs, children) = root.as_elem().unwrap();
        assert_eq!(&*name.local, "root");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, "1");
        assert!(children.is_empty());
    }

    #[test]
    fn resolves_namespaces_and_strips_xmlns_attribute() {
        let root = TreeBuilder::parse(r#"<ns:root xmlns:ns="urn:x"><ns:c/></ns:root>"#).unwrap();
        let (name, attrs, children) = root.as_elem().unwrap();
        assert_eq!(name.uri.as_deref(), Some("urn:x"));
        assert!(attrs.is_empty());
        let (child_name, ..) = children[0].as_elem().unwrap();
        assert_eq!(child_name.uri.as_deref(), Some("urn:x"));
    }

    #[test]
    fn reference_resolution_splits_into_separate_text_nodes() {
        let root = TreeBuilder::parse("<r>a&amp;b&#x41;c</r>").unwrap();
        let (_, _, children) = root.as_elem().unwrap();
        let texts: Vec<&str> = children
            .iter()
            .map(|n| match n {
                XmlNode::Text { text, .. } => text.as_str(),
                other => panic!("expected Text node, got {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["a", "&", "A", "c"]);
    }

    #[test]
    fn comments_pis_and_cdata_are_preserved() {
        let root = TreeBuilder::parse("<r><!--c--><?pi body?><![CDATA[<x>]]></r>").unwrap();
        let (_, _, children) = root.as_elem().unwrap();
        assert!(matches!(&children[0], XmlNode::Comment { text, .. } if text == "c"));
        assert!(matches!(&children[1], XmlNode::PI { target, body, .. } if target == "pi" && body == "body"));
        assert!(matches!(&children[2], XmlNode::CData { text, .. } if text == "<x>"));
    }

    #[test]
    fn template_attrs_are_spliced_in_position() {
        let sources = vec!["<root ".to_owned(), " c=\"v3\" d=\"v4\"/>".to_owned()];
        let args = vec![TemplateArg::Attrs(vec![Attr::from_str(QName::local("a"), "1"), Attr::from_str(QName::local("b"), "2")])];
        let root = TreeBuilder::parse_parts(sources, args).unwrap();
        let (_, attrs, _) = root.as_elem().unwrap();
        let names: Vec<&str> = attrs.iter().map(|a| &*a.name.local).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn template_null_attribute_value_drops_the_attribute() {
        let sources = vec!["<root a=".to_owned(), "/>".to_owned()];
        let args = vec![TemplateArg::AttrValue(None)];
        let root = TreeBuilder::parse_parts(sources, args).unwrap();
        let (_, attrs, _) = root.as_elem().unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn template_nodes_are_spliced_into_children() {
        let sources = vec!["<r><![CDATA[X]]>".to_owned(), "<s>Y</s></r>".to_owned()];
        let args = vec![TemplateArg::Nodes(vec![
            XmlNode::Comment { text: "c".into(), pos: TextPosition::new() },
            XmlNode::Elem { name: QName::local("e"), attrs: vec![], children: vec![], pos: TextPosition::new() },
        ])];
        let root = TreeBuilder::parse_parts(sources, args).unwrap();
        let (_, _, children) = root.as_elem().unwrap();
        assert!(matches!(&children[0], XmlNode::CData { text, .. } if text == "X"));
        assert!(matches!(&children[1], XmlNode::Comment { text, .. } if text == "c"));
        assert!(matches!(&children[2], XmlNode::Elem { name, .. } if &*name.local == "e"));
        assert!(matches!(&children[3], XmlNode::Elem { name, .. } if &*name.local == "s"));
    }

    #[test]
    fn mismatched_end_tag_is_a_wfc_error() {
        let err = TreeBuilder::parse("<a></b>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Wfc(WfcKind::ElementTypeMatch, _)));
    }

    #[test]
    fn undeclared_entity_reference_is_a_wfc_error() {
        let err = TreeBuilder::parse("<r>&undeclared;</r>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Wfc(WfcKind::EntityDeclared, _)));
    }

    #[test]
    fn missing_root_element_is_a_syntax_error() {
        let err = TreeBuilder::parse("<!--only a comment-->").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Syntax(_)));
    }

    #[test]
    fn duplicate_attribute_after_namespace_resolution_is_rejected() {
        let err = TreeBuilder::parse(r#"<r xmlns:a="urn:x" xmlns:b="urn:x" a:k="1" b:k="2"/>"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Nsc(NscKind::AttributesUnique, _)));
    }
}
