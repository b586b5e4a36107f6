use crate::core::pdf_parser::LopdfParser;
use crate::error::SummaryError;
use anyhow::Result;
use roxmltree::{Document, Node};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Plain text pulled out of an uploaded document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: Option<usize>,
}

pub trait Parser {
    /// Extract the document's text from its raw bytes
    fn extract(&self, data: &[u8]) -> Result<ExtractedText>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" | "md" => Some(DocumentFormat::PlainText),
            _ => None,
        }
    }
}

/// Picks the extractor from the file name.
pub struct UniversalParser {
    pub pdf_parser: LopdfParser,
    pub docx_parser: DocxParser,
    pub text_parser: PlainTextParser,
}

impl Default for UniversalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UniversalParser {
    pub fn new() -> Self {
        Self {
            pdf_parser: LopdfParser,
            docx_parser: DocxParser,
            text_parser: PlainTextParser,
        }
    }

    pub fn parser_for(&self, format: DocumentFormat) -> &dyn Parser {
        match format {
            DocumentFormat::Pdf => &self.pdf_parser,
            DocumentFormat::Docx => &self.docx_parser,
            DocumentFormat::PlainText => &self.text_parser,
        }
    }

    /// Extract from in-memory bytes, `file_name` only selects the format.
    pub fn extract(&self, file_name: &str, data: &[u8]) -> Result<ExtractedText, SummaryError> {
        let format = DocumentFormat::from_path(file_name)
            .ok_or_else(|| SummaryError::UnsupportedFormat(file_name.to_string()))?;
        self.parser_for(format)
            .extract(data)
            .map_err(|source| SummaryError::Extraction {
                file_name: file_name.to_string(),
                source,
            })
    }
}

/// UTF-8 text files, decoded lossily.
pub struct PlainTextParser;

impl Parser for PlainTextParser {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        Ok(ExtractedText {
            text: String::from_utf8_lossy(data).into_owned(),
            page_count: None,
        })
    }
}

/// DocxParser: one line per paragraph of `word/document.xml`. Heading paragraphs
/// become `#` header lines so the segmenter recognises them.
pub struct DocxParser;

impl Parser for DocxParser {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        let mut doc_xml = String::new();
        {
            let mut file = archive.by_name("word/document.xml")?;
            file.read_to_string(&mut doc_xml)?;
        }
        let doc = Document::parse(&doc_xml)?;

        let mut lines = Vec::new();
        for p_node in doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "p")
        {
            let text = self.extract_text_from_paragraph(p_node);
            match self.heading_level(p_node) {
                Some(level) if !text.trim().is_empty() => {
                    lines.push(format!("{} {}", "#".repeat(level as usize), text.trim()));
                }
                _ => lines.push(text),
            }
        }

        Ok(ExtractedText {
            text: lines.join("\n"),
            page_count: None,
        })
    }
}

impl DocxParser {
    /// Heading depth (1-based) from the outline level or a `HeadingN` style.
    fn heading_level(&self, p_node: Node) -> Option<u8> {
        let p_pr = p_node
            .children()
            .find(|child| child.is_element() && child.tag_name().name() == "pPr")?;

        if let Some(outline_lvl) = p_pr
            .children()
            .find(|child| child.is_element() && child.tag_name().name() == "outlineLvl")
        {
            if let Some(level) = outline_lvl
                .attribute((W_NS, "val"))
                .and_then(|v| v.parse::<u8>().ok())
            {
                return Some(level.saturating_add(1));
            }
        }

        p_pr.children()
            .find(|child| child.is_element() && child.tag_name().name() == "pStyle")
            .and_then(|style| style.attribute((W_NS, "val")))
            .and_then(|val| {
                let lower = val.to_lowercase();
                lower
                    .strip_prefix("heading")
                    .and_then(|n| n.trim().parse::<u8>().ok())
            })
    }

    fn extract_text_from_paragraph(&self, p_node: Node) -> String {
        let mut text = String::new();
        for node in p_node.descendants().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "t" => {
                    if let Some(txt) = node.text() {
                        text.push_str(txt);
                    }
                }
                "tab" => text.push('\t'),
                "br" => text.push(' '),
                _ => {}
            }
        }
        text
    }
}
