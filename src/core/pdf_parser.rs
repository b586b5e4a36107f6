use crate::core::parser::{ExtractedText, Parser};
use anyhow::Result;
use log::{debug, warn};

/// PDF text extraction using lopdf
pub struct LopdfParser;

impl Parser for LopdfParser {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        use lopdf::Document;

        let doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            anyhow::bail!("PDF is encrypted and its text cannot be extracted");
        }

        let pages = doc.get_pages();
        let mut text = String::new();

        // Pages are concatenated as-is; a page without extractable text adds nothing
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(content) => text.push_str(&content),
                Err(e) => warn!("No text extracted from page {}: {}", page_num, e),
            }
        }
        debug!("extracted {} chars from {} pages", text.len(), pages.len());

        Ok(ExtractedText {
            text,
            page_count: Some(pages.len()),
        })
    }
}
