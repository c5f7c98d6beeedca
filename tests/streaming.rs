#![forbid(unsafe_code)]

use pretty_assertions::assert_eq;

use pull_xml::reader::ParserConfig;
use pull_xml::{EventReader, XmlEvent};

mod assert_match;

#[test]
fn reading_streamed_content() {
    let mut reader = EventReader::new();
    reader.feed_str("<root>");

    assert_match!(reader.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { ref name, .. })) if &*name.local == "root");

    reader.feed_str("<child-1>content</child-1>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { ref name, .. })) if &*name.local == "child-1");
    assert_match!(reader.next(), Some(Ok(XmlEvent::XmlString { ref text, .. })) if text == "content");
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndTag { ref name, .. })) if &*name.local == "child-1");

    reader.feed_str("<child-2/>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { ref name, is_empty: true, .. })) if &*name.local == "child-2");
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndTag { ref name, .. })) if &*name.local == "child-2");

    reader.feed_str("</root>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndTag { ref name, .. })) if &*name.local == "root");
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndDocument { .. })));
}

#[test]
fn partial_mode_suspends_between_attributes_and_resumes_on_feed() {
    let mut reader = EventReader::new_with_config(ParserConfig::new().partial(true));
    reader.feed_str("<root a='1' ");

    assert_match!(reader.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    let ev = reader.next();
    assert_match!(
        ev,
        Some(Ok(XmlEvent::ExpectAttributes { ref tag, ref partial_attrs, .. }))
            if &*tag.local == "root" && partial_attrs.len() == 1
    );

    reader.feed_str("b='2'/>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { ref name, attrs, is_empty: true, .. })) if &*name.local == "root" && attrs.len() == 2);
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndTag { .. })));
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndDocument { .. })));
}

#[test]
fn partial_mode_suspends_before_attribute_value_and_resumes_on_feed() {
    let mut reader = EventReader::new_with_config(ParserConfig::new().partial(true));
    reader.feed_str("<root a=");

    assert_match!(reader.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(reader.next(), Some(Ok(XmlEvent::ExpectAttributeValue { ref attr_name, .. })) if &*attr_name.local == "a");

    reader.feed_str("'1'/>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { is_empty: true, .. })));
}

#[test]
fn partial_mode_suspends_mid_character_data_and_resumes_on_feed() {
    let mut reader = EventReader::new_with_config(ParserConfig::new().partial(true));
    reader.feed_str("<root>partial");

    assert_match!(reader.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { .. })));
    assert_match!(reader.next(), Some(Ok(XmlEvent::XmlString { ref text, .. })) if text == "partial");
    assert_match!(reader.next(), Some(Ok(XmlEvent::ExpectNodes { .. })));

    reader.feed_str(" text</root>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::XmlString { ref text, .. })) if text == " text");
    assert_match!(reader.next(), Some(Ok(XmlEvent::EndTag { .. })));
}

#[test]
fn stylesheet_pi_after_doctype() {
    let source = r#"<?xml version="1.0" standalone="no"?>
        <!DOCTYPE svg SYSTEM "svg10.dtd">
        <?xml-stylesheet type="text/css" href="test.css" ?>
        <svg/>
        "#;

    let mut it = EventReader::from_str(source).into_iter();

    assert_match!(it.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(it.next(), Some(Ok(XmlEvent::XmlDecl { .. })));
    assert_match!(it.next(), Some(Ok(XmlEvent::XmlDoctype { .. })));
    let pi = it.next();
    assert_match!(
        pi,
        Some(Ok(XmlEvent::XmlPI { ref target, ref body, .. }))
            if target == "xml-stylesheet" && body == r#"type="text/css" href="test.css" "#,
        "{pi:#?}"
    );
}

#[test]
fn pi_as_the_first_lexeme_of_the_document_is_not_corrupted() {
    // A non-"xml" processing instruction right at the start of the
    // document exercises the same `<?` lookahead path used to detect an
    // XML declaration, with no preceding decl/DOCTYPE to have already
    // drained the backtracked characters.
    let mut it = EventReader::from_str("<?foo bar?><root/>").into_iter();

    assert_match!(it.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(
        it.next(),
        Some(Ok(XmlEvent::XmlPI { ref target, ref body, .. })) if target == "foo" && body == "bar"
    );
    assert_match!(it.next(), Some(Ok(XmlEvent::StartTag { ref name, is_empty: true, .. })) if &*name.local == "root");
}

#[test]
fn bare_stylesheet_pi_before_any_declaration_is_not_corrupted() {
    let mut it = EventReader::from_str(r#"<?xml-stylesheet type="text/css" href="test.css"?><root/>"#).into_iter();

    assert_match!(it.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(
        it.next(),
        Some(Ok(XmlEvent::XmlPI { ref target, ref body, .. }))
            if target == "xml-stylesheet" && body == r#"type="text/css" href="test.css""#
    );
    assert_match!(it.next(), Some(Ok(XmlEvent::StartTag { .. })));
}

#[test]
fn skip_consumes_a_subtree_across_fed_fragments() {
    let mut reader = EventReader::new();
    reader.feed_str("<root><a><b>");
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartDocument { .. })));
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { .. }))); // root
    assert_match!(reader.next(), Some(Ok(XmlEvent::StartTag { .. }))); // a
    reader.feed_str("text</b></a>tail</root>");
    reader.skip().unwrap();
    assert_eq!(
        format!("{:?}", reader.next()).contains("EndTag"),
        true,
    );
}
