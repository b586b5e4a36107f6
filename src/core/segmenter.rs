use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::layout::SectionTree;

static MARKDOWN_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s+(.+)$").unwrap());
static COLON_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z\s]+:)$").unwrap());
static NUMBERED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.(?:\d+\.)*)\s+([A-Z][A-Za-z\s]+)").unwrap());
static CAPS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][A-Z\s]{3,})$").unwrap());

static SUB_LEVEL_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+").unwrap());

/// Which header rule recognised a line. Rules are tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// `# Title`
    Markdown,
    /// `Title Case Line:`
    Colon,
    /// `1. Title` / `1.2. Title`
    Numbered,
    /// `ALL CAPS LINE`
    AllCaps,
}

/// Classify a line as a header, first matching rule wins.
pub fn classify_line(line: &str) -> Option<HeaderKind> {
    let line = line.trim();
    if MARKDOWN_HEADER.is_match(line) {
        Some(HeaderKind::Markdown)
    } else if COLON_HEADER.is_match(line) {
        Some(HeaderKind::Colon)
    } else if NUMBERED_HEADER.is_match(line) {
        Some(HeaderKind::Numbered)
    } else if CAPS_HEADER.is_match(line) {
        Some(HeaderKind::AllCaps)
    } else {
        None
    }
}

/// Title text of a header line: `#` markers stripped, then capitalized.
pub fn normalize_title(line: &str) -> String {
    capitalize(line.trim().trim_start_matches('#').trim())
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Line-oriented state machine that groups body lines under the headers preceding them.
#[derive(Debug, Default)]
pub struct Segmenter {
    tree: SectionTree,
    section: Option<String>,
    subsection: Option<String>,
    buffer: Vec<String>,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment a whole document. Empty input gives an empty tree.
    pub fn segment(text: &str) -> SectionTree {
        let mut segmenter = Self::new();
        for line in text.split('\n') {
            segmenter.push_line(line);
        }
        segmenter.finish()
    }

    pub fn push_line(&mut self, line: &str) {
        match classify_line(line) {
            Some(kind) => {
                self.flush();
                let title = normalize_title(line);
                debug!("header {:?}: {}", kind, title);
                if SUB_LEVEL_TITLE.is_match(&title) {
                    self.subsection = Some(title);
                } else {
                    self.section = Some(title);
                    self.subsection = None;
                }
                self.buffer.clear();
            }
            None => {
                if self.section.is_some() || self.subsection.is_some() {
                    self.buffer.push(line.to_string());
                }
            }
        }
    }

    pub fn finish(mut self) -> SectionTree {
        self.flush();
        self.tree
    }

    fn flush(&mut self) {
        let body = self.buffer.join("\n").trim().to_string();
        match (&self.section, &self.subsection) {
            (Some(section), Some(subsection)) => {
                self.tree.insert_subsection(section, subsection, body);
            }
            (Some(section), None) => {
                if !self.tree.insert_leaf(section, body) {
                    debug!("section {} already has subsections, body not stored", section);
                }
            }
            (None, Some(subsection)) => {
                if !body.is_empty() {
                    debug!("no open section for {}, dropping {} bytes", subsection, body.len());
                }
            }
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::SectionNode;

    #[test]
    fn header_rules_in_priority_order() {
        assert_eq!(classify_line("# Intro"), Some(HeaderKind::Markdown));
        assert_eq!(classify_line("### Deep dive"), Some(HeaderKind::Markdown));
        assert_eq!(classify_line("Requirements:"), Some(HeaderKind::Colon));
        assert_eq!(classify_line("1. Overview"), Some(HeaderKind::Numbered));
        assert_eq!(classify_line("2.3. Data Retention"), Some(HeaderKind::Numbered));
        assert_eq!(classify_line("  TERMS AND CONDITIONS  "), Some(HeaderKind::AllCaps));
        // all caps ending in a colon is caught by the colon rule first
        assert_eq!(classify_line("NOTES:"), Some(HeaderKind::Colon));
    }

    #[test]
    fn non_headers() {
        assert_eq!(classify_line("Hello world."), None);
        assert_eq!(classify_line("#hashtag"), None);
        assert_eq!(classify_line("ABC"), None);
        assert_eq!(classify_line("requirements:"), None);
        assert_eq!(classify_line("1. lowercase start"), None);
        // outline numbers need a trailing dot on every level
        assert_eq!(classify_line("1.1 Details"), None);
        assert_eq!(classify_line(""), None);
    }

    #[test]
    fn all_caps_false_positive_is_a_header() {
        let tree = Segmenter::segment("# Intro\nsome text\nNOTE WELL\nmore text");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("Note well").unwrap().as_leaf().unwrap(), "more text");
    }

    #[test]
    fn title_normalization() {
        assert_eq!(normalize_title("## GETTING started "), "Getting started");
        assert_eq!(normalize_title("Requirements:"), "Requirements:");
        assert_eq!(normalize_title("1. Overview"), "1. overview");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn scenario_two_markdown_sections() {
        let text = "# Intro\nHello world. This is critical.\n# Body\nMust comply. Nothing else matters.";
        let tree = Segmenter::segment(text);
        let sections: Vec<_> = tree
            .iter()
            .map(|(title, node)| (title.as_str(), node.as_leaf().unwrap().as_str()))
            .collect();
        assert_eq!(
            sections,
            vec![
                ("Intro", "Hello world. This is critical."),
                ("Body", "Must comply. Nothing else matters."),
            ]
        );
    }

    #[test]
    fn text_before_first_header_is_dropped() {
        let tree = Segmenter::segment("preamble line\nanother\n# Start\nbody");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("Start").unwrap().as_leaf().unwrap(), "body");
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        assert!(Segmenter::segment("").is_empty());
        assert!(Segmenter::segment("no headers here\nat all").is_empty());
    }

    #[test]
    fn numbered_outline_builds_subsections() {
        let text = "1. Overview\nintro text\n1.1. Scope Notes\nscope body\n1.2. Terms\nterms body\n2. Closing\nbye";
        let tree = Segmenter::segment(text);

        let overview = tree.get("1. overview").unwrap();
        let subs = overview.subsections().expect("nested map");
        let titles: Vec<_> = subs.keys().map(String::as_str).collect();
        assert_eq!(titles, vec!["1.1. scope notes", "1.2. terms"]);
        assert_eq!(subs["1.1. scope notes"], "scope body");
        assert_eq!(subs["1.2. terms"], "terms body");
        // the section's own text was replaced when it became a nested map
        assert!(overview.as_leaf().is_none());

        assert_eq!(tree.get("2. closing").unwrap().as_leaf().unwrap(), "bye");
    }

    #[test]
    fn markdown_header_with_sub_number_opens_subsection() {
        let tree = Segmenter::segment("# Guide\nx\n## 1.2 Install\nsteps");
        let subs = tree.get("Guide").unwrap().subsections().unwrap();
        assert_eq!(subs["1.2 install"], "steps");
    }

    #[test]
    fn orphan_subsection_body_is_dropped() {
        let text = "1.1. Details\norphan body\n1. Overview\noverview body";
        let tree = Segmenter::segment(text);
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.get("1. overview").unwrap(),
            &SectionNode::Leaf("overview body".to_string())
        );
    }

    #[test]
    fn unrecognised_sub_number_stays_body_text() {
        let text = "1.1 Details\nbefore\n1. Overview\nfirst\n1.1 Details\nsecond";
        let tree = Segmenter::segment(text);
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.get("1. overview").unwrap().as_leaf().unwrap(),
            "first\n1.1 Details\nsecond"
        );
    }

    #[test]
    fn repeated_section_overwrites_body() {
        let tree = Segmenter::segment("# A\none\n# B\ntwo\n# A\nthree");
        let titles: Vec<_> = tree.titles().map(String::as_str).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(tree.get("A").unwrap().as_leaf().unwrap(), "three");
    }

    #[test]
    fn reopened_section_keeps_its_subsections() {
        let text = "1. Scope\n1.1. Part\npart body\n2. Other\nother\n1. Scope\nlate body";
        let tree = Segmenter::segment(text);
        let scope = tree.get("1. scope").unwrap();
        assert_eq!(scope.subsections().unwrap()["1.1. part"], "part body");
    }

    #[test]
    fn body_lines_keep_indentation_inside() {
        let tree = Segmenter::segment("# Code\n\n  indented\n\tTabbed\n\n");
        assert_eq!(tree.get("Code").unwrap().as_leaf().unwrap(), "indented\n\tTabbed");
    }

    #[test]
    fn crlf_lines() {
        let tree = Segmenter::segment("# Intro\r\nbody line\r\n# Next\r\nmore\r\n");
        assert_eq!(tree.get("Intro").unwrap().as_leaf().unwrap(), "body line");
        assert_eq!(tree.get("Next").unwrap().as_leaf().unwrap(), "more");
    }

    #[test]
    fn single_leaf_round_trip() {
        let body = "Plain paragraph one.\nSecond line of it.";
        let tree = Segmenter::segment(&format!("# Only\n{}\n", body));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("Only").unwrap().as_leaf().unwrap(), body.trim());
    }

    #[test]
    fn every_section_value_is_consistent() {
        let text = "INTRO\nHello.\n1. Setup\n1.1. Install\nRun it.\n1.2. Verify\nCheck it.\nSummary:\nDone.";
        let tree = Segmenter::segment(text);
        for (_, node) in tree.iter() {
            match node {
                SectionNode::Leaf(_) => {}
                SectionNode::Node(children) => assert!(!children.is_empty()),
            }
        }
        assert!(tree.get("1. setup").unwrap().has_subsections());
        assert_eq!(tree.get("Summary:").unwrap().as_leaf().unwrap(), "Done.");
    }
}
