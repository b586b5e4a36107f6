pub mod core {
    pub mod layout;
    pub mod metrics;
    pub mod parser;
    pub mod pdf_parser;
    pub mod scorer;
    pub mod segmenter;
    pub mod sentence;
    pub mod writer;
}

pub mod utils {
    pub mod document_processor;
}

pub mod config;
pub mod error;
pub mod mmap_reader;
pub mod protobuf_converter;
pub mod protocol_formatter;

use serde::{Deserialize, Serialize};

pub use crate::config::SummarizerConfig;
pub use crate::core::layout::{SectionNode, SectionTree};
pub use crate::core::metrics::SummaryMetrics;
pub use crate::error::{RenderError, ScoringError, SummaryError};
pub use crate::utils::document_processor::{DocumentProcessor, ProcessedDocument};

/// Segmented sections, their key points (same shape) and the word metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    pub sections: SectionTree<String>,
    pub key_points: SectionTree<Vec<String>>,
    pub metrics: SummaryMetrics,
}
