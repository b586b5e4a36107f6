use std::path::PathBuf;

/// Request-level failures. Only these abort the processing of a document.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("No text could be extracted from the document.")]
    ExtractionEmpty,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {file_name}: {source}")]
    Extraction {
        file_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("An error occurred while processing the document: {0}. Please try again with a different file.")]
    Processing(#[from] anyhow::Error),
}

/// Failures while splitting or scoring one leaf body. Contained per leaf.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Failed to load sentence model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sentence {position} produced a non-finite score")]
    NonFiniteScore { position: usize },
}

/// Failures while assembling the downloadable report. The on-screen summary survives these.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Report layout failed: {0}")]
    Layout(String),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
