// src/protobuf_converter.rs
use crate::core::layout::SectionNode;
use crate::core::metrics::SummaryMetrics;
use crate::utils::document_processor::ProcessedDocument;

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryDocument {
    #[prost(string, tag = "1")]
    pub request_id: String,
    #[prost(string, tag = "2")]
    pub doc_id: String,
    #[prost(int64, tag = "3")]
    pub generated_at_unix: i64,
    #[prost(message, optional, tag = "4")]
    pub metrics: Option<SummaryMetricsMessage>,
    #[prost(message, repeated, tag = "5")]
    pub sections: Vec<SummarySection>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryMetricsMessage {
    #[prost(uint64, tag = "1")]
    pub original_words: u64,
    #[prost(uint64, tag = "2")]
    pub summary_words: u64,
    #[prost(double, optional, tag = "3")]
    pub reduction_percent: Option<f64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummarySection {
    #[prost(string, tag = "1")]
    pub title: String,
    #[prost(string, repeated, tag = "2")]
    pub key_points: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub subsections: Vec<SummarySubsection>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummarySubsection {
    #[prost(string, tag = "1")]
    pub title: String,
    #[prost(string, repeated, tag = "2")]
    pub key_points: Vec<String>,
}

impl From<SummaryMetrics> for SummaryMetricsMessage {
    fn from(metrics: SummaryMetrics) -> Self {
        SummaryMetricsMessage {
            original_words: metrics.original_words as u64,
            summary_words: metrics.summary_words as u64,
            reduction_percent: metrics.reduction_percent,
        }
    }
}

impl From<(&String, &SectionNode<Vec<String>>)> for SummarySection {
    fn from((title, node): (&String, &SectionNode<Vec<String>>)) -> Self {
        match node {
            SectionNode::Leaf(points) => SummarySection {
                title: title.clone(),
                key_points: points.clone(),
                subsections: Vec::new(),
            },
            SectionNode::Node(children) => SummarySection {
                title: title.clone(),
                key_points: Vec::new(),
                subsections: children
                    .iter()
                    .map(|(sub_title, points)| SummarySubsection {
                        title: sub_title.clone(),
                        key_points: points.clone(),
                    })
                    .collect(),
            },
        }
    }
}

impl From<&ProcessedDocument> for SummaryDocument {
    fn from(processed: &ProcessedDocument) -> Self {
        SummaryDocument {
            request_id: processed.request_id.to_string(),
            doc_id: processed.document_digest.clone(),
            generated_at_unix: processed.generated_at.timestamp(),
            metrics: Some(processed.summary.metrics.into()),
            sections: processed
                .summary
                .key_points
                .iter()
                .map(SummarySection::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn metrics_keep_missing_reduction() {
        let message: SummaryMetricsMessage = SummaryMetrics {
            original_words: 0,
            summary_words: 0,
            reduction_percent: None,
        }
        .into();
        let decoded = SummaryMetricsMessage::decode(message.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.reduction_percent, None);
    }

    #[test]
    fn nested_sections_convert() {
        let mut children = indexmap::IndexMap::new();
        children.insert("1.1. a".to_string(), vec!["A point.".to_string()]);
        let title = "1. scope".to_string();
        let section = SummarySection::from((&title, &SectionNode::Node(children)));
        assert!(section.key_points.is_empty());
        assert_eq!(section.subsections.len(), 1);
        assert_eq!(section.subsections[0].key_points, vec!["A point."]);
    }
}
