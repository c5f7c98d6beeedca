//! The internal DTD subset parser (`spec.md` §4.5): markup declarations,
//! parameter entities, and conditional sections. Content models are
//! recorded, never enforced — validating element content against them is
//! explicitly out of scope (`spec.md` §1).

use std::collections::HashMap;

use log::debug;

use crate::lexical::{read_ncname, read_pubid_literal, read_qname, read_quoted, space, space1};
use crate::name::QName;
use crate::reader::error::{Error, SyntaxError};
use crate::reader::source::CharQueue;

/// `EMPTY | ANY | Mixed | Children(content)` (`spec.md` §3, §4.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSpec {
    Empty,
    Any,
    /// `(#PCDATA | a | b)*`; an empty `names` means pure `(#PCDATA)`.
    Mixed { names: Vec<QName> },
    Children(ContentParticle),
}

/// A node in a `Children` content model: `Choice`/`Sequence` of particles,
/// each with an optional occurrence modifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentParticle {
    Name(QName, Occurrence),
    Choice(Vec<ContentParticle>, Occurrence),
    Sequence(Vec<ContentParticle>, Occurrence),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Occurrence {
    One,
    Optional,  // ?
    ZeroOrMore, // *
    OneOrMore,  // +
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: QName,
    pub content: ContentSpec,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttType {
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    Notation(Vec<String>),
    Enumeration(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttDefault {
    Required,
    Implied,
    Fixed(String),
    Value(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttDef {
    pub name: QName,
    pub att_type: AttType,
    pub default: AttDefault,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttListDecl {
    pub name: QName,
    pub defs: Vec<AttDef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExternalId {
    System(String),
    Public(String, Option<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityDef {
    Value(String),
    External(ExternalId, Option<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GEDecl {
    pub name: String,
    pub def: EntityDef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PEDecl {
    pub name: String,
    pub def: EntityDef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotationDecl {
    pub name: String,
    pub id: ExternalId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PIDecl {
    pub target: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DtdDecl {
    Element(ElementDecl),
    AttList(AttListDecl),
    GeneralEntity(GEDecl),
    ParameterEntity(PEDecl),
    Notation(NotationDecl),
    PI(PIDecl),
}

/// Parses the entire `[ … ]` internal subset, returning every declaration
/// recognised inside it. `q` is positioned just after the opening `[`; on
/// return it is positioned just after the closing `]`. `recognize_conditional`
/// mirrors `ParserConfig::recognize_conditional_sections`: when `false`, a
/// `<![INCLUDE[`/`<![IGNORE[` section is a syntax error instead of being
/// parsed (`spec.md` §4.5, §9).
pub(crate) fn parse_internal_subset(q: &mut CharQueue, recognize_conditional: bool) -> Result<Vec<DtdDecl>, Error> {
    let mut decls = Vec::new();
    let mut params: HashMap<String, String> = HashMap::new();
    loop {
        space(q)?;
        match q.peek()? {
            Some(']') => {
                q.next()?;
                return Ok(decls);
            }
            Some('<') => {
                q.next()?;
                match q.peek()? {
                    Some('?') => {
                        q.next()?;
                        decls.push(DtdDecl::PI(parse_pi(q)?));
                    }
                    Some('!') => {
                        q.next()?;
                        parse_markup_decl(q, &mut decls, &mut params, recognize_conditional)?;
                    }
                    other => {
                        return Err(Error::syntax(
                            SyntaxError::unexpected_token(format!("{other:?}")),
                            q.position(),
                        ))
                    }
                }
            }
            Some('%') => {
                q.next()?;
                let name = read_ncname(q)?;
                expect_char(q, ';')?;
                debug!("expanding parameter entity reference %{name}; in internal subset");
                if let Some(value) = params.get(&name) {
                    q.feed_str(value.clone());
                }
            }
            Some(_) => {
                q.next()?;
            }
            None => return Err(Error::syntax(SyntaxError::unexpected_eof(), q.position())),
        }
    }
}

fn parse_markup_decl(
    q: &mut CharQueue,
    decls: &mut Vec<DtdDecl>,
    params: &mut HashMap<String, String>,
    recognize_conditional: bool,
) -> Result<(), Error> {
    if q.peek()? == Some('-') {
        skip_comment(q)?;
        return Ok(());
    }
    if q.peek()? == Some('[') {
        q.next()?;
        if !recognize_conditional {
            return Err(Error::syntax(
                SyntaxError::invalid_doctype("conditional sections are not recognised by this parser configuration"),
                q.position(),
            ));
        }
        parse_conditional_section(q, decls, params)?;
        return Ok(());
    }
    let keyword = read_ncname(q)?;
    space1(q, "51", "expected whitespace after markup declaration keyword")?;
    match keyword.as_str() {
        "ELEMENT" => decls.push(DtdDecl::Element(parse_element_decl(q)?)),
        "ATTLIST" => decls.push(DtdDecl::AttList(parse_attlist_decl(q)?)),
        "ENTITY" => match parse_entity_decl(q)? {
            EntityKind::General(g) => {
                decls.push(DtdDecl::GeneralEntity(g));
            }
            EntityKind::Parameter(p) => {
                if let EntityDef::Value(v) = &p.def {
                    params.insert(p.name.clone(), v.clone());
                }
                decls.push(DtdDecl::ParameterEntity(p));
            }
        },
        "NOTATION" => decls.push(DtdDecl::Notation(parse_notation_decl(q)?)),
        other => return Err(Error::syntax(SyntaxError::unknown_markup_declaration(other), q.position())),
    }
    space(q)?;
    expect_char(q, '>')?;
    Ok(())
}

fn skip_comment(q: &mut CharQueue) -> Result<(), Error> {
    expect_char(q, '-')?;
    expect_char(q, '-')?;
    loop {
        match q.next()? {
            '-' if q.peek()? == Some('-') => {
                q.next()?;
                expect_char(q, '>')?;
                return Ok(());
            }
            _ => {}
        }
    }
}

fn parse_pi(q: &mut CharQueue) -> Result<PIDecl, Error> {
    let target = read_ncname(q)?;
    space(q)?;
    let mut body = String::new();
    loop {
        match q.next()? {
            '?' if q.peek()? == Some('>') => {
                q.next()?;
                return Ok(PIDecl { target, body });
            }
            c => body.push(c),
        }
    }
}

fn parse_conditional_section(
    q: &mut CharQueue,
    decls: &mut Vec<DtdDecl>,
    params: &mut HashMap<String, String>,
) -> Result<(), Error> {
    space(q)?;
    let keyword = if q.peek()? == Some('%') {
        q.next()?;
        let name = read_ncname(q)?;
        expect_char(q, ';')?;
        params.get(&name).cloned().unwrap_or_default()
    } else {
        read_ncname(q)?
    };
    space(q)?;
    expect_char(q, '[')?;
    match keyword.as_str() {
        "INCLUDE" => {
            // Included content re-enters the ordinary internal-subset
            // grammar up to the matching `]]>`.
            loop {
                space(q)?;
                if q.peek()? == Some(']') {
                    q.next()?;
                    expect_char(q, ']')?;
                    expect_char(q, '>')?;
                    return Ok(());
                }
                match q.peek()? {
                    Some('<') => {
                        q.next()?;
                        match q.peek()? {
                            Some('?') => {
                                q.next()?;
                                decls.push(DtdDecl::PI(parse_pi(q)?));
                            }
                            Some('!') => {
                                q.next()?;
                                parse_markup_decl(q, decls, params, true)?;
                            }
                            other => {
                                return Err(Error::syntax(
                                    SyntaxError::unexpected_token(format!("{other:?}")),
                                    q.position(),
                                ))
                            }
                        }
                    }
                    Some(_) => {
                        q.next()?;
                    }
                    None => return Err(Error::syntax(SyntaxError::unexpected_eof(), q.position())),
                }
            }
        }
        "IGNORE" => {
            debug!("skipping IGNORE conditional section to its matching ']]>'");
            skip_ignored_section(q)?;
            Ok(())
        }
        other => Err(Error::syntax(
            SyntaxError::invalid_doctype(format!("unknown conditional section keyword '{other}'")),
            q.position(),
        )),
    }
}

/// Skips an `IGNORE` section's content up to the matching `]]>`, treating
/// nested `<![...[` sections as balanced brackets (XML 1.0 §3.4).
fn skip_ignored_section(q: &mut CharQueue) -> Result<(), Error> {
    let mut depth = 1u32;
    loop {
        match q.next()? {
            '<' if q.peek()? == Some('!') => {
                q.next()?;
                if q.peek()? == Some('[') {
                    q.next()?;
                    depth += 1;
                }
            }
            ']' if q.peek()? == Some(']') => {
                q.next()?;
                if q.peek()? == Some('>') {
                    q.next()?;
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
            }
            _ => {}
        }
    }
}

fn parse_element_decl(q: &mut CharQueue) -> Result<ElementDecl, Error> {
    let name = read_qname(q)?;
    space1(q, "45", "expected whitespace before content spec")?;
    let content = parse_content_spec(q)?;
    Ok(ElementDecl { name, content })
}

fn parse_content_spec(q: &mut CharQueue) -> Result<ContentSpec, Error> {
    if peek_keyword(q, "EMPTY")? {
        return Ok(ContentSpec::Empty);
    }
    if peek_keyword(q, "ANY")? {
        return Ok(ContentSpec::Any);
    }
    expect_char(q, '(')?;
    space(q)?;
    if peek_keyword(q, "#PCDATA")? {
        let mut names = Vec::new();
        space(q)?;
        while q.peek()? == Some('|') {
            q.next()?;
            space(q)?;
            names.push(read_qname(q)?);
            space(q)?;
        }
        expect_char(q, ')')?;
        if q.peek()? == Some('*') {
            q.next()?;
        }
        return Ok(ContentSpec::Mixed { names });
    }
    let particle = parse_content_particle_group(q)?;
    Ok(ContentSpec::Children(particle))
}

fn parse_content_particle_group(q: &mut CharQueue) -> Result<ContentParticle, Error> {
    let mut members = vec![parse_content_particle(q)?];
    space(q)?;
    let mut is_choice = false;
    loop {
        match q.peek()? {
            Some('|') => {
                is_choice = true;
                q.next()?;
                space(q)?;
                members.push(parse_content_particle(q)?);
                space(q)?;
            }
            Some(',') => {
                q.next()?;
                space(q)?;
                members.push(parse_content_particle(q)?);
                space(q)?;
            }
            _ => break,
        }
    }
    expect_char(q, ')')?;
    let occ = parse_occurrence(q)?;
    Ok(if is_choice { ContentParticle::Choice(members, occ) } else { ContentParticle::Sequence(members, occ) })
}

fn parse_content_particle(q: &mut CharQueue) -> Result<ContentParticle, Error> {
    space(q)?;
    if q.peek()? == Some('(') {
        q.next()?;
        space(q)?;
        return parse_content_particle_group(q);
    }
    let name = read_qname(q)?;
    let occ = parse_occurrence(q)?;
    Ok(ContentParticle::Name(name, occ))
}

fn parse_occurrence(q: &mut CharQueue) -> Result<Occurrence, Error> {
    Ok(match q.peek()? {
        Some('?') => {
            q.next()?;
            Occurrence::Optional
        }
        Some('*') => {
            q.next()?;
            Occurrence::ZeroOrMore
        }
        Some('+') => {
            q.next()?;
            Occurrence::OneOrMore
        }
        _ => Occurrence::One,
    })
}

fn parse_attlist_decl(q: &mut CharQueue) -> Result<AttListDecl, Error> {
    let name = read_qname(q)?;
    let mut defs = Vec::new();
    loop {
        if !space(q)? {
            break;
        }
        if q.peek()? == Some('>') {
            break;
        }
        defs.push(parse_att_def(q)?);
    }
    Ok(AttListDecl { name, defs })
}

fn parse_att_def(q: &mut CharQueue) -> Result<AttDef, Error> {
    let name = read_qname(q)?;
    space1(q, "53", "expected whitespace before attribute type")?;
    let att_type = parse_att_type(q)?;
    space1(q, "53", "expected whitespace before default declaration")?;
    let default = parse_att_default(q)?;
    Ok(AttDef { name, att_type, default })
}

fn parse_att_type(q: &mut CharQueue) -> Result<AttType, Error> {
    if q.peek()? == Some('(') {
        q.next()?;
        space(q)?;
        let mut tokens = vec![read_nmtoken(q)?];
        space(q)?;
        while q.peek()? == Some('|') {
            q.next()?;
            space(q)?;
            tokens.push(read_nmtoken(q)?);
            space(q)?;
        }
        expect_char(q, ')')?;
        return Ok(AttType::Enumeration(tokens));
    }
    if peek_keyword(q, "NOTATION")? {
        space1(q, "58", "expected whitespace after NOTATION")?;
        expect_char(q, '(')?;
        space(q)?;
        let mut names = vec![read_ncname(q)?];
        space(q)?;
        while q.peek()? == Some('|') {
            q.next()?;
            space(q)?;
            names.push(read_ncname(q)?);
            space(q)?;
        }
        expect_char(q, ')')?;
        return Ok(AttType::Notation(names));
    }
    let keyword = read_ncname(q)?;
    Ok(match keyword.as_str() {
        "CDATA" => AttType::CData,
        "ID" => AttType::Id,
        "IDREF" => AttType::IdRef,
        "IDREFS" => AttType::IdRefs,
        "ENTITY" => AttType::Entity,
        "ENTITIES" => AttType::Entities,
        "NMTOKEN" => AttType::NmToken,
        "NMTOKENS" => AttType::NmTokens,
        other => return Err(Error::syntax(SyntaxError::new("54", format!("unknown attribute type '{other}'")), q.position())),
    })
}

fn read_nmtoken(q: &mut CharQueue) -> Result<String, Error> {
    read_ncname(q)
}

fn parse_att_default(q: &mut CharQueue) -> Result<AttDefault, Error> {
    if q.peek()? == Some('#') {
        q.next()?;
        let keyword = read_ncname(q)?;
        return match keyword.as_str() {
            "REQUIRED" => Ok(AttDefault::Required),
            "IMPLIED" => Ok(AttDefault::Implied),
            "FIXED" => {
                space1(q, "60", "expected whitespace after #FIXED")?;
                Ok(AttDefault::Fixed(read_quoted(q)?))
            }
            other => Err(Error::syntax(SyntaxError::new("60", format!("unknown default keyword '{other}'")), q.position())),
        };
    }
    Ok(AttDefault::Value(read_quoted(q)?))
}

enum EntityKind {
    General(GEDecl),
    Parameter(PEDecl),
}

fn parse_entity_decl(q: &mut CharQueue) -> Result<EntityKind, Error> {
    let is_parameter = if q.peek()? == Some('%') {
        q.next()?;
        space1(q, "72", "expected whitespace after '%'")?;
        true
    } else {
        false
    };
    let name = read_ncname(q)?;
    space1(q, "71", "expected whitespace before entity definition")?;
    let def = if q.peek()? == Some('"') || q.peek()? == Some('\'') {
        EntityDef::Value(read_quoted(q)?)
    } else {
        let id = parse_external_id(q)?;
        space(q)?;
        let ndata = if peek_keyword(q, "NDATA")? {
            space1(q, "76", "expected whitespace after NDATA")?;
            Some(read_ncname(q)?)
        } else {
            None
        };
        EntityDef::External(id, ndata)
    };
    Ok(if is_parameter {
        EntityKind::Parameter(PEDecl { name, def })
    } else {
        EntityKind::General(GEDecl { name, def })
    })
}

fn parse_notation_decl(q: &mut CharQueue) -> Result<NotationDecl, Error> {
    let name = read_ncname(q)?;
    space1(q, "82", "expected whitespace before notation identifier")?;
    let id = parse_external_id_or_public_only(q)?;
    Ok(NotationDecl { name, id })
}

/// Parses an `ExternalID`, where `PUBLIC` positions require a system
/// literal (general entities and DOCTYPE), per `spec.md` §4.4.
pub(crate) fn parse_external_id(q: &mut CharQueue) -> Result<ExternalId, Error> {
    if peek_keyword(q, "SYSTEM")? {
        space1(q, "75", "expected whitespace after SYSTEM")?;
        return Ok(ExternalId::System(read_quoted(q)?));
    }
    if peek_keyword(q, "PUBLIC")? {
        space1(q, "75", "expected whitespace after PUBLIC")?;
        let pubid = read_pubid_literal(q)?;
        space1(q, "75", "expected whitespace before system literal")?;
        return Ok(ExternalId::Public(pubid, Some(read_quoted(q)?)));
    }
    Err(Error::syntax(SyntaxError::invalid_external_id("expected SYSTEM or PUBLIC"), q.position()))
}

/// `NOTATION` declarations allow a `PUBLIC` identifier with no system
/// literal, unlike every other `ExternalID` position (`spec.md` §4.4).
fn parse_external_id_or_public_only(q: &mut CharQueue) -> Result<ExternalId, Error> {
    if peek_keyword(q, "SYSTEM")? {
        space1(q, "75", "expected whitespace after SYSTEM")?;
        return Ok(ExternalId::System(read_quoted(q)?));
    }
    if peek_keyword(q, "PUBLIC")? {
        space1(q, "75", "expected whitespace after PUBLIC")?;
        let pubid = read_pubid_literal(q)?;
        let had_space = space(q)?;
        if had_space && matches!(q.peek()?, Some('"') | Some('\'')) {
            return Ok(ExternalId::Public(pubid, Some(read_quoted(q)?)));
        }
        return Ok(ExternalId::Public(pubid, None));
    }
    Err(Error::syntax(SyntaxError::invalid_external_id("expected SYSTEM or PUBLIC"), q.position()))
}

fn expect_char(q: &mut CharQueue, expected: char) -> Result<(), Error> {
    let start = q.position();
    match q.next_opt()? {
        Some(c) if c == expected => Ok(()),
        Some(c) => Err(Error::syntax(SyntaxError::unexpected_token(format!("'{c}', expected '{expected}'")), start)),
        None => Err(Error::syntax(SyntaxError::unexpected_eof(), start)),
    }
}

/// Peeks ahead for an exact ASCII keyword (e.g. `EMPTY`, `PUBLIC`);
/// consumes it only on a full match, leaving the queue untouched on a
/// mismatch so the caller can try another alternative.
fn peek_keyword(q: &mut CharQueue, keyword: &str) -> Result<bool, Error> {
    let mut matched = String::new();
    for expected in keyword.chars() {
        match q.peek()? {
            Some(c) if c == expected => {
                matched.push(q.next()?);
            }
            _ => {
                if !matched.is_empty() {
                    q.unread(&matched);
                }
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_and_any_element_decls() {
        let mut q = CharQueue::from_str("ELEMENT a EMPTY> ELEMENT b ANY>");
        // drive via parse_markup_decl-equivalent calls directly for the test
        let name = read_ncname(&mut q).unwrap();
        assert_eq!(name, "ELEMENT");
        space1(&mut q, "x", "x").unwrap();
        let decl = parse_element_decl(&mut q).unwrap();
        assert_eq!(decl.content, ContentSpec::Empty);
    }

    #[test]
    fn parses_mixed_content() {
        let mut q = CharQueue::from_str("(#PCDATA|a|b)*");
        let spec = parse_content_spec(&mut q).unwrap();
        match spec {
            ContentSpec::Mixed { names } => assert_eq!(names.len(), 2),
            other => panic!("expected Mixed, got {other:?}"),
        }
    }

    #[test]
    fn parses_children_content_with_occurrences() {
        let mut q = CharQueue::from_str("(a,b?,c+)*");
        let spec = parse_content_spec(&mut q).unwrap();
        match spec {
            ContentSpec::Children(ContentParticle::Sequence(members, Occurrence::ZeroOrMore)) => {
                assert_eq!(members.len(), 3);
            }
            other => panic!("unexpected content spec: {other:?}"),
        }
    }

    #[test]
    fn parses_attlist_with_enumeration_and_fixed_default() {
        let mut q = CharQueue::from_str("ATTLIST a type (x|y) #FIXED \"x\">");
        let name = read_ncname(&mut q).unwrap();
        assert_eq!(name, "ATTLIST");
        space1(&mut q, "x", "x").unwrap();
        let decl = parse_attlist_decl(&mut q).unwrap();
        assert_eq!(decl.defs.len(), 1);
        assert_eq!(decl.defs[0].att_type, AttType::Enumeration(vec!["x".into(), "y".into()]));
        assert_eq!(decl.defs[0].default, AttDefault::Fixed("x".into()));
    }

    #[test]
    fn ignore_section_skips_balanced_nested_brackets() {
        let mut q = CharQueue::from_str("IGNORE[ <!ELEMENT a (<![ nested ]]>) > ]]> REST");
        let mut decls = Vec::new();
        let mut params = HashMap::new();
        parse_conditional_section(&mut q, &mut decls, &mut params).unwrap();
        assert!(decls.is_empty());
        space(&mut q).unwrap();
        assert_eq!(read_ncname(&mut q).unwrap(), "REST");
    }

    #[test]
    fn parameter_entity_reference_expands_in_subset() {
        let mut q = CharQueue::from_str("<!ENTITY % name \"VALUE\"> %name;]");
        let decls = parse_internal_subset(&mut q, true).unwrap();
        assert_eq!(decls.len(), 1);
    }
}
