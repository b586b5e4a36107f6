use crate::config::SummarizerConfig;
use crate::core::layout::LeafRef;
use crate::core::metrics::SummaryMetrics;
use crate::core::parser::{DocumentFormat, UniversalParser};
use crate::core::scorer::KeyPointExtractor;
use crate::core::segmenter::Segmenter;
use crate::core::sentence;
use crate::core::writer::{PdfReportWriter, ReportArtifact, ReportWriter};
use crate::error::SummaryError;
use crate::mmap_reader::MmapFileReader;
use crate::DocumentSummary;
use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Everything produced for one uploaded document. Nothing outlives the request.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub request_id: Uuid,
    /// sha256 of the uploaded bytes, hex encoded
    pub document_digest: String,
    pub generated_at: DateTime<Utc>,
    pub page_count: Option<usize>,
    pub summary: DocumentSummary,
    /// `None` when the report could not be rendered
    pub report: Option<ReportArtifact>,
}

pub struct DocumentProcessor {
    parser: UniversalParser,
    extractor: KeyPointExtractor,
    writer: Box<dyn ReportWriter + Send + Sync>,
    parallel_scoring: bool,
    render_report: bool,
}

impl DocumentProcessor {
    pub fn new(config: &SummarizerConfig) -> Self {
        // The built-in model is used if the configured one cannot be loaded
        if let Err(e) = sentence::init(config.abbreviations_path.as_deref()) {
            warn!("{}; falling back to the built-in sentence model", e);
        }

        Self {
            parser: UniversalParser::new(),
            extractor: KeyPointExtractor::from_config(config),
            writer: Box::new(PdfReportWriter::new(&config.report)),
            parallel_scoring: config.parallel_scoring,
            render_report: true,
        }
    }

    /// Render reports with `writer` instead of the PDF writer.
    pub fn with_report_writer<W>(mut self, writer: W) -> Self
    where
        W: ReportWriter + Send + Sync + 'static,
    {
        self.writer = Box::new(writer);
        self
    }

    /// Skip building the downloadable report.
    pub fn without_report(mut self) -> Self {
        self.render_report = false;
        self
    }

    /// Segment, score and measure already-extracted text.
    pub fn summarize_text(&self, text: &str) -> Result<DocumentSummary, SummaryError> {
        if text.trim().is_empty() {
            return Err(SummaryError::ExtractionEmpty);
        }

        let sections = Segmenter::segment(text);
        info!("Segmented document into {} sections", sections.len());

        let score = |leaf: LeafRef<'_, String>| match self.extractor.try_extract_key_points(leaf.value) {
            Ok(points) => points,
            Err(e) => {
                warn!(
                    "No key points for {}{}: {}",
                    leaf.section,
                    leaf.subsection.map(|s| format!(" / {}", s)).unwrap_or_default(),
                    e
                );
                Vec::new()
            }
        };
        let key_points = if self.parallel_scoring {
            sections.par_map_leaves(score)
        } else {
            sections.map_leaves(score)
        };

        let metrics = SummaryMetrics::compute(text, &sections);
        debug!(
            "metrics: {} -> {} words ({})",
            metrics.original_words,
            metrics.summary_words,
            metrics.reduction_display()
        );

        Ok(DocumentSummary {
            sections,
            key_points,
            metrics,
        })
    }

    /// Process an uploaded document held in memory.
    pub fn process_bytes(&self, file_name: &str, data: &[u8]) -> Result<ProcessedDocument, SummaryError> {
        let request_id = Uuid::new_v4();
        info!("[{}] Processing {} ({} bytes)", request_id, file_name, data.len());

        let extracted = self.parser.extract(file_name, data)?;
        let summary = self.summarize_text(&extracted.text)?;
        let report = self.render(&request_id, &summary);

        Ok(ProcessedDocument {
            request_id,
            document_digest: format!("{:x}", Sha256::digest(data)),
            generated_at: Utc::now(),
            page_count: extracted.page_count,
            summary,
            report,
        })
    }

    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessedDocument, SummaryError> {
        let path = path.as_ref();
        let file_name = path.to_string_lossy().to_string();
        if DocumentFormat::from_path(path).is_none() {
            return Err(SummaryError::UnsupportedFormat(file_name));
        }
        let reader =
            MmapFileReader::new(path).with_context(|| format!("reading {}", file_name))?;
        self.process_bytes(&file_name, reader.as_slice())
    }

    fn render(&self, request_id: &Uuid, summary: &DocumentSummary) -> Option<ReportArtifact> {
        if !self.render_report {
            return None;
        }
        match self.writer.artifact(summary) {
            Ok(artifact) => {
                debug!("[{}] report rendered, {} bytes", request_id, artifact.bytes.len());
                Some(artifact)
            }
            Err(e) => {
                error!("[{}] Error creating report: {}", request_id, e);
                None
            }
        }
    }
}

/// Write the report next to other outputs, returning its path.
pub fn save_report<P: AsRef<Path>>(report: &ReportArtifact, output_dir: P) -> anyhow::Result<std::path::PathBuf> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&report.file_name);
    fs::write(&path, &report.bytes)?;
    info!("Saved report to {}", path.display());
    Ok(path)
}
