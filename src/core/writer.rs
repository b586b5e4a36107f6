use crate::config::ReportConfig;
use crate::core::layout::SectionNode;
use crate::error::RenderError;
use crate::DocumentSummary;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const PDF_MIME_TYPE: &str = "application/pdf";

// US Letter, in points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const CONTENT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;
const MAX_PAGES: usize = 1000;

const TABLE_COLUMN_WIDTH: i64 = 150;
const TABLE_ROW_HEIGHT: i64 = 18;
const CELL_PADDING: i64 = 6;

/// Writer is responsible for turning a computed summary into a downloadable document
pub trait ReportWriter {
    fn render(&self, summary: &DocumentSummary) -> Result<Vec<u8>, RenderError>;

    /// Name the report is offered under
    fn file_name(&self) -> &str;

    fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }

    fn artifact(&self, summary: &DocumentSummary) -> Result<ReportArtifact, RenderError> {
        Ok(ReportArtifact {
            file_name: self.file_name().to_string(),
            mime_type: self.mime_type(),
            bytes: self.render(summary)?,
        })
    }
}

/// A rendered report, ready to be offered for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    face: FontFace,
    size: i64,
    leading: i64,
    space_before: i64,
}

const TITLE: TextStyle = TextStyle { face: FontFace::Bold, size: 18, leading: 22, space_before: 0 };
const HEADING: TextStyle = TextStyle { face: FontFace::Bold, size: 14, leading: 18, space_before: 6 };
const SUBHEADING: TextStyle = TextStyle { face: FontFace::Bold, size: 12, leading: 15, space_before: 4 };
const BODY: TextStyle = TextStyle { face: FontFace::Regular, size: 10, leading: 12, space_before: 0 };

/// PDF report built directly with lopdf: title, metrics table, then one block per section.
pub struct PdfReportWriter {
    title: String,
    file_name: String,
}

impl PdfReportWriter {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            file_name: config.file_name.clone(),
        }
    }

    fn layout(&self, summary: &DocumentSummary) -> Result<Vec<Vec<Operation>>, RenderError> {
        let mut flow = PageFlow::new();
        flow.paragraph(&self.title, TITLE)?;
        flow.spacer(20)?;

        let metrics = &summary.metrics;
        let rows = [
            ["Metric".to_string(), "Value".to_string()],
            [
                "Original Length".to_string(),
                format!("{} words", metrics.original_words),
            ],
            [
                "Summary Length".to_string(),
                format!("{} words", metrics.summary_words),
            ],
            ["Reduction".to_string(), metrics.reduction_display()],
        ];
        flow.table(&rows)?;
        flow.spacer(20)?;

        for (section_title, node) in summary.key_points.iter() {
            flow.paragraph(section_title, HEADING)?;
            match node {
                SectionNode::Leaf(points) => flow.bullets(points)?,
                SectionNode::Node(subsections) => {
                    for (subsection_title, points) in subsections {
                        flow.paragraph(subsection_title, SUBHEADING)?;
                        flow.bullets(points)?;
                    }
                }
            }
            flow.spacer(12)?;
        }

        Ok(flow.finish())
    }
}

impl ReportWriter for PdfReportWriter {
    fn render(&self, summary: &DocumentSummary) -> Result<Vec<u8>, RenderError> {
        let pages = self.layout(summary)?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font_dictionary("Helvetica"));
        let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FontFace::Regular.resource_name() => regular_id,
                FontFace::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![Object::from(0), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(&self.title)),
            "Producer" => Object::string_literal("doc_summarizer"),
            "CreationDate" => Object::string_literal(
                chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Top-to-bottom text flow over as many pages as needed.
struct PageFlow {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Start a new page unless `height` more points fit on this one.
    fn reserve(&mut self, height: i64) -> Result<(), RenderError> {
        if self.y - height >= MARGIN || self.current.is_empty() {
            return Ok(());
        }
        self.pages.push(std::mem::take(&mut self.current));
        if self.pages.len() >= MAX_PAGES {
            return Err(RenderError::Layout(format!(
                "report exceeds {} pages",
                MAX_PAGES
            )));
        }
        self.y = PAGE_HEIGHT - MARGIN;
        Ok(())
    }

    fn spacer(&mut self, height: i64) -> Result<(), RenderError> {
        self.reserve(height)?;
        self.y -= height;
        Ok(())
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) -> Result<(), RenderError> {
        if style.space_before > 0 {
            self.spacer(style.space_before)?;
        }
        for line in wrap_text(text, max_chars(style.size)) {
            self.reserve(style.leading)?;
            self.y -= style.leading;
            self.text_line(&line, style, MARGIN, self.y);
        }
        Ok(())
    }

    fn bullets(&mut self, points: &[String]) -> Result<(), RenderError> {
        for point in points {
            self.paragraph(&format!("• {}", point), BODY)?;
        }
        Ok(())
    }

    /// Two-column grid; the first row is a grey header with light text.
    fn table(&mut self, rows: &[[String; 2]]) -> Result<(), RenderError> {
        self.reserve(TABLE_ROW_HEIGHT * rows.len() as i64)?;
        for (index, row) in rows.iter().enumerate() {
            let top = self.y;
            let bottom = top - TABLE_ROW_HEIGHT;
            let header = index == 0;

            if header {
                self.current.push(Operation::new("g", vec![Object::Real(0.5)]));
                self.current.push(Operation::new(
                    "re",
                    vec![
                        MARGIN.into(),
                        bottom.into(),
                        (TABLE_COLUMN_WIDTH * 2).into(),
                        TABLE_ROW_HEIGHT.into(),
                    ],
                ));
                self.current.push(Operation::new("f", vec![]));
            }

            self.current.push(Operation::new("G", vec![0.into()]));
            self.current.push(Operation::new("w", vec![1.into()]));
            for column in 0..2 {
                let x = MARGIN + TABLE_COLUMN_WIDTH * column;
                self.current.push(Operation::new(
                    "re",
                    vec![
                        x.into(),
                        bottom.into(),
                        TABLE_COLUMN_WIDTH.into(),
                        TABLE_ROW_HEIGHT.into(),
                    ],
                ));
                self.current.push(Operation::new("S", vec![]));
            }

            let fill = if header { Object::Real(0.96) } else { 0.into() };
            self.current.push(Operation::new("g", vec![fill]));
            for (column, cell) in row.iter().enumerate() {
                let x = MARGIN + TABLE_COLUMN_WIDTH * column as i64 + CELL_PADDING;
                self.text_line(cell, BODY, x, bottom + CELL_PADDING);
            }
            self.current.push(Operation::new("g", vec![0.into()]));
            self.y = bottom;
        }
        Ok(())
    }

    fn text_line(&mut self, text: &str, style: TextStyle, x: i64, y: i64) {
        self.current.push(Operation::new("BT", vec![]));
        self.current.push(Operation::new(
            "Tf",
            vec![style.face.resource_name().into(), style.size.into()],
        ));
        self.current.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.current.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        self.current.push(Operation::new("ET", vec![]));
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Rough Helvetica capacity: half an em per character on average.
fn max_chars(font_size: i64) -> usize {
    ((CONTENT_WIDTH * 2) / font_size).max(1) as usize
}

/// Greedy word wrap; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Encode for the standard fonts' WinAnsiEncoding; unmappable characters become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => b' ',
            c if (c as u32) < 0x20 => b' ',
            c if (c as u32) < 0x80 => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
