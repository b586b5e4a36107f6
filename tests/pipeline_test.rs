use doc_summarizer::core::parser::{DocxParser, Parser as _};
use doc_summarizer::protobuf_converter::SummaryDocument;
use doc_summarizer::protocol_formatter::{convert_to_protocol, render_markdown};
use doc_summarizer::{DocumentProcessor, SectionNode, SummarizerConfig, SummaryError};
use prost::Message;
use std::fs;
use std::io::Write;

const POLICY: &str = "\
# Purpose
This policy sets the rules for vendors. Vendors must register before work starts. Contact the office for help.

1. SCOPE
1.1. Covered Parties
All contractors are covered. Compliance is mandatory for everyone.
1.2. Exclusions
Internal teams are excluded.

RETENTION SCHEDULE
Records are kept for seven years. Backups rotate weekly.
";

fn processor() -> DocumentProcessor {
    DocumentProcessor::new(&SummarizerConfig::default())
}

#[test]
fn text_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy.txt");
    fs::write(&path, POLICY).unwrap();

    let processed = processor().process_file(&path).unwrap();
    let summary = &processed.summary;

    let titles: Vec<_> = summary.key_points.titles().map(String::as_str).collect();
    assert_eq!(titles, vec!["Purpose", "1. scope", "Retention schedule"]);

    let purpose = summary.key_points.get("Purpose").unwrap().as_leaf().unwrap();
    assert_eq!(purpose.len(), 3);
    assert_eq!(purpose[0], "Vendors must register before work starts.");
    assert_eq!(purpose[1], "This policy sets the rules for vendors.");

    match summary.key_points.get("1. scope").unwrap() {
        SectionNode::Node(children) => {
            let keys: Vec<_> = children.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["1.1. covered parties", "1.2. exclusions"]);
            assert_eq!(
                children["1.1. covered parties"][0],
                "Compliance is mandatory for everyone."
            );
        }
        other => panic!("expected subsections, got {:?}", other),
    }

    assert!(summary.metrics.summary_words < summary.metrics.original_words);
    assert!(processed.page_count.is_none());
    assert!(processed.report.is_some());
}

#[test]
fn markdown_and_json_views_agree_on_sections() {
    let processed = processor()
        .without_report()
        .process_bytes("policy.md", POLICY.as_bytes())
        .unwrap();

    let markdown = render_markdown(&processed.summary);
    assert!(markdown.contains("### 1. scope\n#### 1.1. covered parties\n"));
    assert!(markdown.contains("• Records are kept for seven years.\n"));

    let json = serde_json::to_value(convert_to_protocol(&processed)).unwrap();
    assert_eq!(json["metadata"]["section_count"], 3);
    assert!(json["metadata"].get("report_file").is_none());
    assert_eq!(json["sections"][1]["subsections"][1]["title"], "1.2. exclusions");
    assert_eq!(json["doc_id"], processed.document_digest.as_str());
}

#[test]
fn protobuf_output_decodes() {
    let processed = processor()
        .without_report()
        .process_bytes("policy.txt", POLICY.as_bytes())
        .unwrap();
    let bytes = SummaryDocument::from(&processed).encode_to_vec();
    let decoded = SummaryDocument::decode(bytes.as_slice()).unwrap();
    assert_eq!(decoded.sections.len(), 3);
    assert_eq!(decoded.sections[1].subsections.len(), 2);
    assert_eq!(
        decoded.metrics.unwrap().original_words,
        processed.summary.metrics.original_words as u64
    );
}

#[test]
fn report_pdf_reads_back() {
    let processed = processor()
        .process_bytes("policy.txt", POLICY.as_bytes())
        .unwrap();
    let report = processed.report.unwrap();
    let doc = lopdf::Document::load_mem(&report.bytes).unwrap();
    assert!(!doc.get_pages().is_empty());
}

#[test]
fn docx_upload_is_segmented_by_heading_styles() {
    let body = r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Overview</w:t></w:r></w:p>
<w:p><w:r><w:t>The vendor shall ensure uptime. Reports are monthly.</w:t></w:r></w:p>"#;
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        zip.start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    let bytes = buf.into_inner();
    assert!(DocxParser.extract(&bytes).unwrap().text.starts_with("# Overview"));

    let processed = processor()
        .without_report()
        .process_bytes("contract.docx", &bytes)
        .unwrap();
    let points = processed.summary.key_points.get("Overview").unwrap();
    assert_eq!(
        points.as_leaf().unwrap()[0],
        "The vendor shall ensure uptime."
    );
}

#[test]
fn empty_and_unsupported_inputs_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let blank = dir.path().join("blank.txt");
    fs::write(&blank, "   \n\n").unwrap();
    assert!(matches!(
        processor().process_file(&blank),
        Err(SummaryError::ExtractionEmpty)
    ));

    let sheet = dir.path().join("numbers.xlsx");
    fs::write(&sheet, "a,b").unwrap();
    let err = processor().process_file(&sheet).unwrap_err();
    assert!(matches!(err, SummaryError::UnsupportedFormat(_)));

    let err = processor().process_bytes("broken.pdf", b"not a pdf").unwrap_err();
    assert!(matches!(err, SummaryError::Extraction { .. }));
}
