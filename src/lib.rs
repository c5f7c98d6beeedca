//! A pull-based XML 1.0/1.1 parser, tree builder, and templated
//! (partial) parsing front-end.
//!
//! The core type is [`reader::EventReader`], an iterator of [`XmlEvent`]
//! driven by feeding it character data with `feed`/`feed_str`. Most
//! callers instead want [`TreeBuilder`], which drives an `EventReader`
//! to completion and reifies the event stream into a [`Document`] /
//! [`XmlNode`] tree, resolving namespaces and entity references along
//! the way.
//!
//! ```
//! use pull_xml::TreeBuilder;
//!
//! let root = TreeBuilder::parse(r#"<greeting lang="en">Hello</greeting>"#).unwrap();
//! let (name, attrs, children) = root.as_elem().unwrap();
//! assert_eq!(&*name.local, "greeting");
//! assert_eq!(attrs[0].value, "en");
//! ```
//!
//! Templated parsing lets a caller interleave source fragments with
//! already-built values — attributes, attribute values, or child nodes —
//! without round-tripping them through text:
//!
//! ```
//! use pull_xml::{Attr, QName, TemplateArg, TreeBuilder};
//!
//! let sources = vec!["<item ".to_owned(), "/>".to_owned()];
//! let args = vec![TemplateArg::Attrs(vec![Attr::from_str(QName::local("id"), "42")])];
//! let root = TreeBuilder::parse_parts(sources, args).unwrap();
//! assert_eq!(root.as_elem().unwrap().1[0].value, "42");
//! ```

#[macro_use]
mod macros;

mod attribute;
mod builder;
mod common;
pub mod dtd;
mod entity;
mod lexical;
mod name;
mod namespace;
pub mod reader;
mod tree;

pub use attribute::{Attr, XmlTexty};
pub use builder::{TemplateArg, TreeBuilder};
pub use common::{parse_xml_version, Position, TextPosition, XmlVersion};
pub use name::QName;
pub use reader::{Error, ErrorKind, EventReader, Events, NscKind, ParserConfig, SyntaxError, WfcKind, XmlEvent};
pub use tree::{Document, ElemAttr, XmlNode};
