//! Integration test: offset-addressed edits on loaded documents

use chrono::{TimeZone, Utc};
use docx_splice::document::{LeafContainer, ParagraphContent, RevisionKind};
use docx_splice::opc::{rel_types, MAIN_DOCUMENT};
use docx_splice::{BreakType, Document, EditOptions, Editor, Error, Package};
use pretty_assertions::assert_eq;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor() -> Editor {
    Editor::new("Reviewer", Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
}

/// Package holding a single main document part with `body` inside w:body
fn docx_with_body(body: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        W_NS, body
    );
    let mut pkg = Package::new();
    pkg.put_part("/word/document.xml", MAIN_DOCUMENT, xml.into_bytes())
        .unwrap();
    pkg.create_relationship(None, "/word/document.xml", rel_types::OFFICE_DOCUMENT)
        .unwrap();
    pkg.to_bytes().unwrap()
}

fn load(body: &str) -> Document {
    Document::from_bytes(&docx_with_body(body)).unwrap()
}

fn reload(doc: &Document) -> Document {
    Document::from_bytes(&doc.to_bytes().unwrap()).unwrap()
}

fn texts(doc: &Document) -> Vec<String> {
    doc.paragraphs().map(|p| p.text()).collect()
}

#[test]
fn test_split_before_tab() {
    init_logger();
    let mut doc = load("<w:p><w:r><w:t>AB</w:t><w:tab/><w:t>CD</w:t></w:r></w:p>");
    assert_eq!(doc.text(), "AB\tCD");

    doc.split_paragraph(0, 2).unwrap();
    assert_eq!(texts(&doc), vec!["AB", "\tCD"]);
    assert_eq!(doc.offset_table().unwrap().total_len(), 5);
    assert_eq!(doc.locate(2).unwrap(), (1, 0));

    let doc = reload(&doc);
    assert_eq!(texts(&doc), vec!["AB", "\tCD"]);
}

#[test]
fn test_split_keeps_properties_on_first_half() {
    init_logger();
    let mut doc = load(
        r#"<w:p w:rsidR="00AB12CD"><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title text</w:t></w:r></w:p>"#,
    );
    doc.split_paragraph(0, 5).unwrap();

    let first = doc.paragraph(0).unwrap();
    let second = doc.paragraph(1).unwrap();
    assert_eq!(first.text(), "Title");
    assert_eq!(first.style(), Some("Heading1"));
    assert_eq!(second.text(), " text");
    assert_eq!(second.style(), None);
}

#[test]
fn test_insert_text_with_newline() {
    init_logger();
    let mut doc = load("<w:p><w:r><w:t>AB</w:t></w:r></w:p>");
    doc.insert_text(0, 2, "X\nY", &EditOptions::new()).unwrap();

    let paragraph = doc.paragraph(0).unwrap();
    assert_eq!(paragraph.text(), "ABX\nY");
    assert_eq!(paragraph.flat_len(), 5);
    assert_eq!(paragraph.runs().count(), 4);

    let xml = doc.body().to_xml().unwrap();
    assert!(xml.contains("<w:br/>"));
    assert_eq!(texts(&reload(&doc)), vec!["ABX\nY"]);
}

#[test]
fn test_insert_tab_and_page_break() {
    init_logger();
    let mut doc = load("<w:p><w:r><w:t>ab</w:t></w:r></w:p>");
    doc.insert_tab(0, 1, &EditOptions::new()).unwrap();
    doc.insert_break(0, 3, BreakType::Page, &EditOptions::new())
        .unwrap();
    assert_eq!(doc.text(), "a\tb\n");

    let xml = doc.body().to_xml().unwrap();
    assert!(xml.contains(r#"<w:br w:type="page"/>"#));
}

#[test]
fn test_tracked_delete_middle() {
    init_logger();
    let mut doc = load("<w:p><w:r><w:t>ABCD</w:t></w:r></w:p>");
    doc.delete_range(0, 1, 3, Some(&editor())).unwrap();

    assert_eq!(doc.text(), "ABCD");
    assert_eq!(doc.live_text(), "AD");
    assert_eq!(doc.offset_table().unwrap().total_len(), 4);

    let xml = doc.body().to_xml().unwrap();
    assert!(xml.contains("<w:delText>BC</w:delText>"));
    assert!(xml.contains(r#"w:author="Reviewer""#));
    assert!(xml.contains(r#"w:date="2024-05-01T09:30:00Z""#));

    let doc = reload(&doc);
    assert_eq!(doc.live_text(), "AD");
}

#[test]
fn test_untracked_delete_keeps_bookmarks() {
    init_logger();
    let mut doc = load(
        r#"<w:p><w:r><w:t>AB</w:t></w:r><w:bookmarkStart w:id="0" w:name="mark"/><w:r><w:t>CD</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#,
    );
    doc.delete_range(0, 1, 4, None).unwrap();
    assert_eq!(doc.text(), "A");

    let xml = doc.body().to_xml().unwrap();
    assert!(xml.contains("w:bookmarkStart"));
    assert!(xml.contains("w:bookmarkEnd"));
}

#[test]
fn test_tracked_insert_at_document_offset() {
    init_logger();
    let mut doc = load(
        "<w:p><w:r><w:t>Hello</w:t></w:r></w:p><w:p><w:r><w:t>World</w:t></w:r></w:p>",
    );
    doc.insert_text_at(7, "-", &EditOptions::tracked(editor()))
        .unwrap();
    assert_eq!(texts(&doc), vec!["Hello", "Wo-rld"]);

    let paragraph = doc.paragraph(1).unwrap();
    let change = paragraph
        .content
        .iter()
        .find_map(|item| match item {
            ParagraphContent::TrackedChange(change) => Some(change),
            _ => None,
        })
        .unwrap();
    assert_eq!(change.kind, RevisionKind::Insertion);
    assert_eq!(change.author.as_deref(), Some("Reviewer"));
}

#[test]
fn test_new_ids_continue_after_loaded_ones() {
    init_logger();
    let mut doc = load(
        r#"<w:p><w:ins w:id="5" w:author="A"><w:r><w:t>one</w:t></w:r></w:ins><w:r><w:t> two </w:t></w:r><w:del w:id="9" w:author="B"><w:r><w:delText>three</w:delText></w:r></w:del></w:p>"#,
    );
    assert_eq!(doc.live_text(), "one two ");

    doc.insert_text(0, 4, "2", &EditOptions::tracked(editor()))
        .unwrap();
    let xml = doc.body().to_xml().unwrap();
    assert!(xml.contains(r#"w:id="10""#));

    assert_eq!(doc.renumber_revisions(), 3);
    let first = doc.body().to_xml().unwrap();
    assert!(first.contains(r#"<w:ins w:id="0""#));
    assert!(!first.contains(r#"w:id="10""#));

    assert_eq!(doc.renumber_revisions(), 3);
    assert_eq!(doc.body().to_xml().unwrap(), first);
}

#[test]
fn test_new_ids_skip_revisions_inside_tables() {
    init_logger();
    let mut doc = load(concat!(
        r#"<w:tbl><w:tr><w:tc><w:p><w:ins w:id="0" w:author="A"><w:r><w:t>cell</w:t></w:r></w:ins></w:p></w:tc></w:tr></w:tbl>"#,
        "<w:p><w:r><w:t>AB</w:t></w:r></w:p>",
    ));
    doc.insert_text(0, 1, "x", &EditOptions::tracked(editor()))
        .unwrap();

    let xml = doc.body().to_xml().unwrap();
    assert_eq!(xml.matches(r#"w:id="0""#).count(), 1);
    assert!(xml.contains(r#"<w:ins w:id="1" w:author="Reviewer""#));

    assert_eq!(doc.renumber_revisions(), 2);
    let xml = doc.body().to_xml().unwrap();
    assert_eq!(xml.matches(r#"w:id="0""#).count(), 1);
    assert_eq!(xml.matches(r#"w:id="1""#).count(), 1);
}

#[test]
fn test_tracked_delete_through_hyperlink_with_insertion() {
    init_logger();
    let mut doc = load(
        r#"<w:p><w:r><w:t>A</w:t></w:r><w:hyperlink w:anchor="top"><w:ins w:id="1" w:author="B"><w:r><w:t>BC</w:t></w:r></w:ins></w:hyperlink><w:r><w:t>D</w:t></w:r></w:p>"#,
    );
    doc.delete_range(0, 1, 3, Some(&editor())).unwrap();

    assert_eq!(doc.offset_table().unwrap().total_len(), 4);
    assert_eq!(doc.live_text(), "AD");
    let xml = doc.body().to_xml().unwrap();
    assert!(xml.contains(r#"<w:hyperlink w:anchor="top"><w:ins w:id="1" w:author="B"><w:del "#));
    assert!(xml.contains("<w:delText>BC</w:delText>"));

    let doc = reload(&doc);
    assert_eq!(doc.live_text(), "AD");
}

#[test]
fn test_text_inside_fields_and_controls() {
    init_logger();
    let mut doc = load(concat!(
        r#"<w:p><w:r><w:t>A</w:t></w:r>"#,
        r#"<w:fldSimple w:instr=" PAGE "><w:r><w:t>5</w:t></w:r></w:fldSimple>"#,
        r#"<w:sdt><w:sdtPr><w:id w:val="42"/></w:sdtPr><w:sdtContent><w:r><w:t>Z</w:t></w:r></w:sdtContent></w:sdt>"#,
        r#"<w:smartTag w:element="x"><w:r><w:t>Q</w:t></w:r></w:smartTag></w:p>"#,
    ));
    assert_eq!(doc.text(), "A5ZQ");
    assert_eq!(doc.offset_table().unwrap().total_len(), 4);

    doc.insert_text_at(3, "-", &EditOptions::new()).unwrap();
    assert_eq!(doc.text(), "A5Z-Q");
    doc.delete_range(0, 1, 3, Some(&editor())).unwrap();
    assert_eq!(doc.live_text(), "A-Q");

    let doc = reload(&doc);
    assert_eq!(doc.live_text(), "A-Q");
    assert_eq!(doc.text(), "A5Z-Q");
}

#[test]
fn test_round_trip_preserves_unknown_markup() {
    init_logger();
    let body = concat!(
        r#"<w:p w14:paraId="1A2B3C4D" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml">"#,
        r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#,
        r#"<w:proofErr w:type="spellStart"/><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Keep </w:t></w:r>"#,
        r#"<w:hyperlink r:id="rId9" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:r><w:t>link</w:t></w:r></w:hyperlink>"#,
        r#"</w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#,
    );
    let doc = load(body);
    assert_eq!(doc.text(), "Keep link");
    assert!(doc.paragraph(0).unwrap().runs().next().unwrap().bold());

    let again = reload(&doc);
    assert_eq!(again.body().to_xml().unwrap(), doc.body().to_xml().unwrap());
    assert_eq!(again.body(), doc.body());

    let xml = again.body().to_xml().unwrap();
    assert!(xml.contains("<w:tbl>"));
    assert!(xml.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
    assert!(xml.contains(r#"<w:t xml:space="preserve">Keep </w:t>"#));
}

#[test]
fn test_offsets_out_of_range() {
    init_logger();
    let mut doc = load("<w:p><w:r><w:t>abc</w:t></w:r></w:p>");
    assert!(matches!(
        doc.insert_text(0, 4, "x", &EditOptions::new()),
        Err(Error::OffsetOutOfRange { offset: 4, .. })
    ));
    assert!(doc.delete_range(0, 2, 1, None).is_err());
    assert!(doc.locate(4).is_err());

    doc.delete_range(0, 1, 1, None).unwrap();
    assert_eq!(doc.text(), "abc");
}

#[test]
fn test_missing_main_document() {
    init_logger();
    let bytes = Package::new().to_bytes().unwrap();
    assert!(matches!(
        Document::from_bytes(&bytes),
        Err(Error::MissingPart(_))
    ));
}

#[test]
fn test_malformed_document_part() {
    init_logger();
    let mut pkg = Package::new();
    pkg.put_part(
        "/word/document.xml",
        MAIN_DOCUMENT,
        format!(r#"<w:document xmlns:w="{}"/>"#, W_NS).into_bytes(),
    )
    .unwrap();
    pkg.create_relationship(None, "/word/document.xml", rel_types::OFFICE_DOCUMENT)
        .unwrap();
    let bytes = pkg.to_bytes().unwrap();

    // the error names the part the same way the package does
    match Document::from_bytes(&bytes) {
        Err(Error::MalformedPart { part, .. }) => assert_eq!(part, "/word/document.xml"),
        other => panic!("expected a malformed part, got {:?}", other.map(|_| ())),
    }
}
