use crate::core::layout::SectionNode;
use crate::core::metrics::SummaryMetrics;
use crate::utils::document_processor::ProcessedDocument;
use crate::DocumentSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct Section {
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Serialize)]
pub struct Subsection {
    pub title: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    pub section_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_file: Option<String>,
}

/// JSON rendering of one processed document.
#[derive(Debug, Serialize)]
pub struct OutputProtocol {
    pub request_id: Uuid,
    pub doc_id: String,
    pub generated_at: DateTime<Utc>,
    pub metadata: Metadata,
    pub metrics: SummaryMetrics,
    pub sections: Vec<Section>,
}

pub fn convert_sections(summary: &DocumentSummary) -> Vec<Section> {
    summary
        .key_points
        .iter()
        .map(|(title, node)| match node {
            SectionNode::Leaf(points) => Section {
                title: title.clone(),
                key_points: points.clone(),
                subsections: Vec::new(),
            },
            SectionNode::Node(children) => Section {
                title: title.clone(),
                key_points: Vec::new(),
                subsections: children
                    .iter()
                    .map(|(sub_title, points)| Subsection {
                        title: sub_title.clone(),
                        key_points: points.clone(),
                    })
                    .collect(),
            },
        })
        .collect()
}

pub fn convert_to_protocol(processed: &ProcessedDocument) -> OutputProtocol {
    OutputProtocol {
        request_id: processed.request_id,
        doc_id: processed.document_digest.clone(),
        generated_at: processed.generated_at,
        metadata: Metadata {
            page_count: processed.page_count,
            section_count: processed.summary.key_points.len(),
            report_file: processed.report.as_ref().map(|r| r.file_name.clone()),
        },
        metrics: processed.summary.metrics,
        sections: convert_sections(&processed.summary),
    }
}

/// On-screen view: metrics, then `###` sections, `####` subsections and `•` points.
pub fn render_markdown(summary: &DocumentSummary) -> String {
    let metrics = &summary.metrics;
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "## Summary Metrics\n");
    let _ = writeln!(out, "- Original Words: {}", metrics.original_words);
    let _ = writeln!(out, "- Summary Words: {}", metrics.summary_words);
    let _ = writeln!(out, "- Reduction: {}\n", metrics.reduction_display());
    let _ = writeln!(out, "## Document Summary");

    for (title, node) in summary.key_points.iter() {
        let _ = writeln!(out, "\n### {}", title);
        match node {
            SectionNode::Leaf(points) => write_points(&mut out, points),
            SectionNode::Node(children) => {
                for (sub_title, points) in children {
                    let _ = writeln!(out, "#### {}", sub_title);
                    write_points(&mut out, points);
                }
            }
        }
    }
    out
}

fn write_points(out: &mut String, points: &[String]) {
    for point in points {
        let _ = writeln!(out, "• {}", point);
    }
}
