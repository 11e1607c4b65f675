use docxkit::{DocxImageStripper, Error, OrphanPolicy, Package, StripOptions};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const V_NS: &str = "urn:schemas-microsoft-com:vml";
const PKG_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const IMAGE_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const HYPERLINK_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const STYLES_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

fn build_docx(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        zip.write_all(data).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

fn document_header() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}" xmlns:a="{}" xmlns:wp="{}" xmlns:pic="{}" xmlns:v="{}">"#,
        W_NS, R_NS, A_NS, WP_NS, PIC_NS, V_NS
    )
}

fn inline_image(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><a:graphic><a:graphicData uri="{}"><pic:pic><pic:blipFill><a:blip r:embed="{}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        PIC_NS, rel_id
    )
}

fn rels_part(extra: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}" Target="styles.xml"/>{}</Relationships>"#,
        PKG_RELS_NS, STYLES_TYPE, extra
    )
}

fn image_rel(id: &str, target: &str) -> String {
    format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
        id, IMAGE_TYPE, target
    )
}

fn docx_with_two_images() -> Vec<u8> {
    let document = format!(
        "{}<w:body><w:p><w:r><w:t>First paragraph</w:t></w:r>{}</w:p><w:p><w:r><w:t>Second paragraph</w:t></w:r>{}</w:p><w:p><w:r><w:t>Third paragraph</w:t></w:r></w:p></w:body></w:document>",
        document_header(),
        inline_image("rId10"),
        inline_image("rId11"),
    );
    let rels = rels_part(&format!(
        "{}{}",
        image_rel("rId10", "media/image1.png"),
        image_rel("rId11", "media/image2.png"),
    ));
    build_docx(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", rels.as_bytes()),
        ("word/styles.xml", b"<w:styles/>"),
        ("word/media/image1.png", b"\x89PNG-one"),
        ("word/media/image2.png", b"\x89PNG-two"),
    ])
}

fn temp_docx_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time must be after UNIX_EPOCH")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "docxkit_strip_{}_{}_{}.docx",
        prefix,
        std::process::id(),
        nanos
    ))
}

#[test]
fn strips_drawings_relationships_and_media() {
    let package = Package::from_bytes(&docx_with_two_images()).expect("open package");
    let (stripped, report) = DocxImageStripper::with_defaults()
        .strip_package(package)
        .expect("strip package");

    assert_eq!(report.drawing_nodes, 2);
    assert_eq!(report.image_relationships, 2);
    assert_eq!(report.media_entries, 2);

    let document =
        String::from_utf8(stripped.entry("word/document.xml").expect("document").to_vec())
            .expect("utf-8 document");
    assert!(!document.contains("drawing"));
    assert_eq!(document.matches("<w:p>").count(), 3);
    for text in ["First paragraph", "Second paragraph", "Third paragraph"] {
        assert!(document.contains(text), "missing {:?}", text);
    }

    let rels = String::from_utf8(
        stripped
            .entry("word/_rels/document.xml.rels")
            .expect("rels part")
            .to_vec(),
    )
    .expect("utf-8 rels");
    assert!(!rels.contains("relationships/image"));
    assert!(rels.contains("rId1"));

    assert!(stripped.entry("word/media/image1.png").is_none());
    assert!(stripped.entry("word/media/image2.png").is_none());
    // Untouched parts survive byte-for-byte.
    assert_eq!(stripped.entry("word/styles.xml"), Some(&b"<w:styles/>"[..]));
}

#[test]
fn stripping_is_idempotent() {
    let package = Package::from_bytes(&docx_with_two_images()).expect("open package");
    let stripper = DocxImageStripper::with_defaults();
    let (once, _) = stripper.strip_package(package).expect("first strip");
    let once_bytes = once.to_bytes().expect("serialize first pass");

    let (twice, report) = stripper
        .strip_package(Package::from_bytes(&once_bytes).expect("reopen package"))
        .expect("second strip");
    assert_eq!(report.drawing_nodes, 0);
    assert_eq!(report.image_relationships, 0);
    assert_eq!(report.media_entries, 0);
    assert_eq!(twice.to_bytes().expect("serialize second pass"), once_bytes);
}

#[test]
fn document_without_images_passes_through_unchanged() {
    let document = format!(
        "{}<w:body><w:p><w:r><w:t>Only text</w:t></w:r></w:p></w:body></w:document>",
        document_header()
    );
    let rels = rels_part("");
    let input = build_docx(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", rels.as_bytes()),
        ("word/styles.xml", b"<w:styles/>"),
    ]);

    let package = Package::from_bytes(&input).expect("open package");
    let (stripped, report) = DocxImageStripper::with_defaults()
        .strip_package(package)
        .expect("strip package");

    assert_eq!(report, Default::default());
    assert_eq!(stripped.entry("word/document.xml"), Some(document.as_bytes()));
    assert_eq!(
        stripped.entry("word/_rels/document.xml.rels"),
        Some(rels.as_bytes())
    );
    assert_eq!(stripped.entry("word/styles.xml"), Some(&b"<w:styles/>"[..]));
}

#[test]
fn corrupted_zip_fails_without_creating_output() {
    let input = temp_docx_path("corrupt");
    std::fs::write(&input, b"this is not a zip archive").expect("write input");

    let err = DocxImageStripper::with_defaults().strip(&input).unwrap_err();
    assert!(matches!(err, Error::InvalidContainer(_)));

    let expected_output = input.with_file_name(format!(
        "noimages_{}",
        input.file_name().expect("file name").to_string_lossy()
    ));
    assert!(!expected_output.exists());
    std::fs::remove_file(&input).expect("cleanup input");
}

#[test]
fn missing_document_entry_is_invalid() {
    let input = build_docx(&[("word/styles.xml", b"<w:styles/>")]);
    let package = Package::from_bytes(&input).expect("open package");
    let err = DocxImageStripper::with_defaults()
        .strip_package(package)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidContainer(_)));
}

#[test]
fn orphaned_reference_rejected_only_in_strict_mode() {
    let document = format!(
        "{}<w:body><w:p><w:hyperlink r:id=\"rId99\"><w:r><w:t>dangling</w:t></w:r></w:hyperlink></w:p></w:body></w:document>",
        document_header()
    );
    let input = build_docx(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", rels_part("").as_bytes()),
    ]);

    let lenient = DocxImageStripper::with_defaults();
    lenient
        .strip_package(Package::from_bytes(&input).expect("open package"))
        .expect("lenient mode tolerates orphans");

    let strict = DocxImageStripper::new(StripOptions {
        orphan_policy: OrphanPolicy::Strict,
    });
    let err = strict
        .strip_package(Package::from_bytes(&input).expect("open package"))
        .unwrap_err();
    match err {
        Error::RelationshipNotFound(id) => assert_eq!(id, "rId99"),
        other => panic!("expected RelationshipNotFound, got {:?}", other),
    }
}

#[test]
fn media_shared_with_surviving_relationship_is_kept() {
    let document = format!(
        "{}<w:body><w:p>{}</w:p></w:body></w:document>",
        document_header(),
        inline_image("rId10"),
    );
    let shared_rel = r#"<Relationship Id="rId20" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/oleObject" Target="media/shared.png"/>"#;
    let rels = rels_part(&format!(
        "{}{}",
        image_rel("rId10", "media/shared.png"),
        shared_rel
    ));
    let input = build_docx(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", rels.as_bytes()),
        ("word/media/shared.png", b"shared"),
    ]);

    let (stripped, report) = DocxImageStripper::with_defaults()
        .strip_package(Package::from_bytes(&input).expect("open package"))
        .expect("strip package");

    assert_eq!(report.image_relationships, 1);
    assert_eq!(report.media_entries, 0);
    assert_eq!(stripped.entry("word/media/shared.png"), Some(&b"shared"[..]));
}

#[test]
fn legacy_pict_and_object_nodes_are_removed() {
    let document = format!(
        "{}<w:body><w:p><w:r><w:pict><v:shape><v:imagedata r:id=\"rId10\"/></v:shape></w:pict></w:r><w:r><w:object><v:shape><v:imagedata r:id=\"rId11\"/></v:shape></w:object></w:r><w:r><w:t>body text</w:t></w:r></w:p></w:body></w:document>",
        document_header()
    );
    let rels = rels_part(&format!(
        "{}{}",
        image_rel("rId10", "media/image1.wmf"),
        image_rel("rId11", "media/image2.emf"),
    ));
    let input = build_docx(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", rels.as_bytes()),
        ("word/media/image1.wmf", b"wmf"),
        ("word/media/image2.emf", b"emf"),
    ]);

    let (stripped, report) = DocxImageStripper::with_defaults()
        .strip_package(Package::from_bytes(&input).expect("open package"))
        .expect("strip package");

    assert_eq!(report.drawing_nodes, 2);
    assert_eq!(report.media_entries, 2);
    let doc = String::from_utf8(stripped.entry("word/document.xml").expect("document").to_vec())
        .expect("utf-8 document");
    assert!(!doc.contains("pict"));
    assert!(!doc.contains("object"));
    assert!(doc.contains("body text"));
}

#[test]
fn hyperlink_relationships_survive_stripping() {
    let document = format!(
        "{}<w:body><w:p><w:hyperlink r:id=\"rId30\"><w:r><w:t>site</w:t></w:r></w:hyperlink>{}</w:p></w:body></w:document>",
        document_header(),
        inline_image("rId10"),
    );
    let hyperlink_rel = format!(
        r#"<Relationship Id="rId30" Type="{}" Target="https://example.com" TargetMode="External"/>"#,
        HYPERLINK_TYPE
    );
    let rels = rels_part(&format!(
        "{}{}",
        image_rel("rId10", "media/image1.png"),
        hyperlink_rel
    ));
    let input = build_docx(&[
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", rels.as_bytes()),
        ("word/media/image1.png", b"png"),
    ]);

    let (stripped, _) = DocxImageStripper::with_defaults()
        .strip_package(Package::from_bytes(&input).expect("open package"))
        .expect("strip package");

    let rels_out = String::from_utf8(
        stripped
            .entry("word/_rels/document.xml.rels")
            .expect("rels part")
            .to_vec(),
    )
    .expect("utf-8 rels");
    assert!(rels_out.contains("rId30"));
    assert!(rels_out.contains("https://example.com"));
    assert!(rels_out.contains("TargetMode=\"External\""));
    assert!(!rels_out.contains("rId10"));
}

#[test]
fn strip_writes_prefixed_output_file() {
    let input = temp_docx_path("file_level");
    std::fs::write(&input, docx_with_two_images()).expect("write input");

    let outcome = DocxImageStripper::with_defaults()
        .strip(&input)
        .expect("strip file");
    assert!(outcome
        .output_path
        .file_name()
        .expect("output file name")
        .to_string_lossy()
        .starts_with("noimages_"));
    assert!(outcome.output_path.exists());
    assert_eq!(outcome.report.drawing_nodes, 2);

    let reopened = Package::open(&outcome.output_path).expect("reopen output");
    assert!(reopened.entry("word/media/image1.png").is_none());

    std::fs::remove_file(&input).expect("cleanup input");
    std::fs::remove_file(&outcome.output_path).expect("cleanup output");
}
