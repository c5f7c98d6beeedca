#![forbid(unsafe_code)]

use pull_xml::{EventReader, XmlEvent, XmlVersion};

mod assert_match;

#[test]
fn accepted_xml_versions() {
    let accepted_versions_enum = [
        XmlVersion::Version10,
        XmlVersion::Version11,
        XmlVersion::Version1x("1.2".into()),
        XmlVersion::Version1x("1.7".into()),
        XmlVersion::Version1x("1.1075".into()),
        XmlVersion::Version1x("1.000".into()),
    ];

    for version in &accepted_versions_enum {
        let source = format!(r#"<?xml version="{v}"?><root/>"#, v = version.as_str());

        let mut it = EventReader::from_str(&source).into_iter();

        assert_match!(it.next(), Some(Ok(XmlEvent::StartDocument { .. })));
        assert_match!(it.next(), Some(Ok(XmlEvent::XmlDecl { version: ref v, .. })) if v == version);
    }
}

#[test]
fn rejected_xml_versions() {
    let rejected_versions = ["1", "1.", "2.0", "1.0.0", "10", "1.0-", "100", "17.0"];

    for version in rejected_versions {
        let source = format!(r#"<?xml version="{version}"?><root/>"#);

        let mut it = EventReader::from_str(&source).into_iter();

        assert_match!(it.next(), Some(Ok(XmlEvent::StartDocument { .. })));
        assert!(format!("{:?}", it.next()).contains("invalid XML version"));
    }
}
