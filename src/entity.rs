//! The reference resolver (`spec.md` §4.7): substitutes character and
//! entity references to produce plain text, for both element content and
//! (fully, before normalisation — the resolved Open Question in
//! `SPEC_FULL.md` §4.7) attribute values.

use std::collections::{HashMap, HashSet};

use crate::attribute::XmlTexty;
use crate::common::TextPosition;
use crate::reader::error::{Error, SyntaxError, WfcKind};

/// Expansion guards against pathological (deep or merely huge) entity
/// chains, configurable via `ParserConfig` (`SPEC_FULL.md` §11).
#[derive(Copy, Clone, Debug)]
pub(crate) struct EntityLimits {
    pub(crate) max_depth: u32,
    pub(crate) max_length: usize,
}

/// The predefined entities, always present regardless of any DTD
/// (`spec.md` §6).
fn predefined(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

/// Declared general entities accumulated from the DTD internal subset
/// (`dtd.rs`), plus the always-present predefined set.
pub(crate) struct EntityTable {
    declared: HashMap<String, String>,
    /// Names declared via `<!ENTITY name SYSTEM "...">` / `PUBLIC`: well-formed
    /// to reference, but their replacement text lives in an external resource
    /// that decoding/fetching (out of scope, `spec.md` §1) never supplies.
    /// Tracked separately from "undeclared" so a reference to one raises a
    /// clear diagnostic instead of a misleading `WfcKind::EntityDeclared`.
    external: HashSet<String>,
}

impl EntityTable {
    pub(crate) fn new() -> Self {
        EntityTable { declared: HashMap::new(), external: HashSet::new() }
    }

    /// Records a `<!ENTITY name "value">` declaration. The first
    /// declaration for a name wins, per the XML recommendation, so a
    /// repeated `ENTITY` declaration is silently ignored.
    pub(crate) fn declare(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.declared.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Records a `<!ENTITY name SYSTEM/PUBLIC ...>` declaration: the name is
    /// declared (referencing it is well-formed) but its replacement text
    /// cannot be produced by this crate.
    pub(crate) fn declare_external(&mut self, name: impl Into<String>) {
        self.external.insert(name.into());
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        predefined(name).or_else(|| self.declared.get(name).map(String::as_str))
    }

    /// Expands one chunk sequence (element content or an attribute value)
    /// into a flat string, recursively resolving entity references to
    /// their declared replacement text. `pos` is used for errors raised
    /// while expanding, and is not advanced per-chunk since template
    /// splicing means no single position spans the whole sequence.
    pub(crate) fn resolve_text(&self, chunks: &[XmlTexty], pos: TextPosition, limits: EntityLimits) -> Result<String, Error> {
        let mut out = String::new();
        let mut in_progress = HashSet::new();
        for chunk in chunks {
            self.resolve_chunk(chunk, pos, 0, limits, &mut in_progress, &mut out)?;
        }
        Ok(out)
    }

    fn resolve_chunk(
        &self,
        chunk: &XmlTexty,
        pos: TextPosition,
        depth: u32,
        limits: EntityLimits,
        in_progress: &mut HashSet<String>,
        out: &mut String,
    ) -> Result<(), Error> {
        match chunk {
            XmlTexty::XmlString(s) => {
                check_length(out.len() + s.len(), limits, pos)?;
                out.push_str(s);
                Ok(())
            }
            XmlTexty::XmlCharRef(cp) => {
                push_codepoint(out, *cp, pos)
            }
            XmlTexty::XmlEntityRef(name) => self.expand_entity(name, pos, depth, limits, in_progress, out),
        }
    }

    fn expand_entity(
        &self,
        name: &str,
        pos: TextPosition,
        depth: u32,
        limits: EntityLimits,
        in_progress: &mut HashSet<String>,
        out: &mut String,
    ) -> Result<(), Error> {
        if depth >= limits.max_depth {
            return Err(Error::syntax(SyntaxError::entity_too_big(), pos));
        }
        let replacement = match self.lookup(name) {
            Some(v) => v.to_owned(),
            None if self.external.contains(name) => {
                return Err(Error::syntax(
                    SyntaxError::new(
                        "75",
                        format!("entity '{name}' is declared as an external entity; external entity resolution is out of scope"),
                    ),
                    pos,
                ))
            }
            None => return Err(Error::wfc(WfcKind::EntityDeclared, format!("entity '{name}' not declared"), pos)),
        };
        if !in_progress.insert(name.to_owned()) {
            return Err(Error::wfc(WfcKind::NoRecursion, format!("entity '{name}' references itself"), pos));
        }
        // Predefined/declared replacement text may itself contain
        // references (`&amp;` inside a custom entity's value, etc); these
        // are re-scanned for `&name;`/`&#…;` so nested expansion works
        // without building a second chunk-parsing pass.
        let mut rest = replacement.as_str();
        while let Some(amp) = rest.find('&') {
            check_length(out.len() + amp, limits, pos)?;
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = after.find(';').ok_or_else(|| {
                Error::wfc(WfcKind::EntityDeclared, "unterminated reference in entity replacement text", pos)
            })?;
            let token = &after[..semi];
            if let Some(digits) = token.strip_prefix('#') {
                let cp = crate::lexical::parse_numeric_ref(
                    digits.strip_prefix('x').unwrap_or(digits),
                    digits.starts_with('x'),
                )
                .ok_or_else(|| Error::wfc(WfcKind::EntityDeclared, "invalid numeric reference", pos))?;
                push_codepoint(out, cp, pos)?;
            } else {
                self.expand_entity(token, pos, depth + 1, limits, in_progress, out)?;
            }
            rest = &after[semi + 1..];
        }
        check_length(out.len() + rest.len(), limits, pos)?;
        out.push_str(rest);
        in_progress.remove(name);
        Ok(())
    }
}

fn check_length(prospective_len: usize, limits: EntityLimits, pos: TextPosition) -> Result<(), Error> {
    if prospective_len > limits.max_length {
        Err(Error::syntax(SyntaxError::entity_too_big(), pos))
    } else {
        Ok(())
    }
}

/// Encodes a numeric character reference's codepoint as UTF-8 text,
/// rejecting anything that is not itself a valid XML character
/// (`spec.md` §4.7, §8: surrogate pairs collapse to one codepoint here —
/// `char::from_u32` already rejects lone surrogates).
fn push_codepoint(out: &mut String, cp: u32, pos: TextPosition) -> Result<(), Error> {
    let c = char::from_u32(cp)
        .filter(|&c| crate::common::is_xml_char(c, true))
        .ok_or_else(|| Error::syntax(crate::reader::error::SyntaxError::undeclared_charref(cp), pos))?;
    out.push(c);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> TextPosition {
        TextPosition::new()
    }

    fn limits() -> EntityLimits {
        EntityLimits { max_depth: 32, max_length: 8 * 1024 * 1024 }
    }

    #[test]
    fn predefined_entities_resolve() {
        let table = EntityTable::new();
        let chunks = vec![
            XmlTexty::XmlString("a".into()),
            XmlTexty::XmlEntityRef("amp".into()),
            XmlTexty::XmlCharRef(0x41),
            XmlTexty::XmlString("c".into()),
        ];
        assert_eq!(table.resolve_text(&chunks, pos(), limits()).unwrap(), "a&Ac");
    }

    #[test]
    fn undeclared_entity_is_wfc_error() {
        let table = EntityTable::new();
        let chunks = vec![XmlTexty::XmlEntityRef("bogus".into())];
        let err = table.resolve_text(&chunks, pos(), limits()).unwrap_err();
        assert!(matches!(err.kind(), crate::reader::error::ErrorKind::Wfc(WfcKind::EntityDeclared, _)));
    }

    #[test]
    fn external_entity_reference_is_a_distinct_syntax_error() {
        let mut table = EntityTable::new();
        table.declare_external("logo");
        let chunks = vec![XmlTexty::XmlEntityRef("logo".into())];
        let err = table.resolve_text(&chunks, pos(), limits()).unwrap_err();
        assert!(matches!(err.kind(), crate::reader::error::ErrorKind::Syntax(_)));
    }

    #[test]
    fn recursive_entity_is_rejected() {
        let mut table = EntityTable::new();
        table.declare("a", "&b;");
        table.declare("b", "&a;");
        let chunks = vec![XmlTexty::XmlEntityRef("a".into())];
        assert!(table.resolve_text(&chunks, pos(), limits()).is_err());
    }

    #[test]
    fn declared_entity_replacement_is_rescanned() {
        let mut table = EntityTable::new();
        table.declare("greeting", "hi &amp; bye");
        let chunks = vec![XmlTexty::XmlEntityRef("greeting".into())];
        assert_eq!(table.resolve_text(&chunks, pos(), limits()).unwrap(), "hi & bye");
    }

    #[test]
    fn surrogate_range_charref_is_rejected() {
        let table = EntityTable::new();
        let chunks = vec![XmlTexty::XmlCharRef(0xD800)];
        assert!(table.resolve_text(&chunks, pos(), limits()).is_err());
    }
}
