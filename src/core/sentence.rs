//! Sentence boundary detection.
//!
//! The model is process-wide: it is loaded at most once, on first use or by an
//! explicit [`init`] at startup, and shared read-only afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use once_cell::sync::OnceCell;

use crate::error::ScoringError;

static MODEL: OnceCell<SentenceModel> = OnceCell::new();

/// Abbreviations that may also close a sentence: a following capitalised word
/// starts a new one.
const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "inc", "ltd", "corp", "llc", "dept", "univ", "assn", "bros", "vs", "etc", "e.g", "i.e", "cf",
    "approx", "misc", "nos", "vol", "vols", "pp", "fig", "figs", "eq", "ch", "para", "u.s", "u.k",
    "a.m", "p.m", "ph.d", "b.a", "m.a", "b.sc", "m.sc",
];

/// Titles before a name. Only recognised capitalised, and never end a sentence.
const TITLE_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "rev", "gen", "gov", "sen", "rep",
    "capt", "lt", "col", "sgt",
];

/// Day and month forms. Only recognised capitalised (`Sat.` but not `sat.`).
const CALENDAR_ABBREVIATIONS: &[&str] = &[
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "mon",
    "tue", "wed", "thu", "fri", "sat", "sun",
];

/// Words that commonly open a sentence. After a single-letter initial they
/// mark a boundary (`plan B. Then`), any other capitalised word reads as a
/// name (`J. Doe`).
const SENTENCE_STARTERS: &[&str] = &[
    "a", "after", "all", "also", "an", "and", "as", "at", "but", "by", "each", "finally", "for",
    "from", "he", "her", "his", "how", "however", "i", "if", "in", "it", "its", "my", "next",
    "no", "not", "on", "our", "she", "so", "that", "the", "their", "then", "there", "these",
    "they", "this", "those", "to", "we", "what", "when", "why", "with", "you", "your",
];

const CLOSING_PUNCTUATION: &[char] = &['"', '\'', ')', ']', '}', '\u{201D}', '\u{2019}'];
const OPENING_PUNCTUATION: &[char] = &['"', '\'', '(', '[', '{', '\u{201C}', '\u{2018}'];

#[derive(Debug, Clone)]
pub struct SentenceModel {
    abbreviations: HashSet<String>,
}

impl SentenceModel {
    /// Built-in English model.
    pub fn english() -> Self {
        Self {
            abbreviations: ENGLISH_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// English model extended with one abbreviation per line from `path`.
    /// Blank lines and `#` comments are ignored; a trailing `.` is optional.
    pub fn with_abbreviations_file(path: &Path) -> Result<Self, ScoringError> {
        let content = fs::read_to_string(path).map_err(|source| ScoringError::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let mut model = Self::english();
        for line in content.lines() {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            model
                .abbreviations
                .insert(entry.trim_end_matches('.').to_lowercase());
        }
        Ok(model)
    }

    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviation_kind(word).is_some()
    }

    pub fn abbreviation_count(&self) -> usize {
        self.abbreviations.len() + TITLE_ABBREVIATIONS.len() + CALENDAR_ABBREVIATIONS.len()
    }

    fn abbreviation_kind(&self, word: &str) -> Option<AbbreviationKind> {
        let lower = word.to_lowercase();
        let capitalised = word.chars().next().map_or(false, char::is_uppercase);
        if capitalised && TITLE_ABBREVIATIONS.contains(&lower.as_str()) {
            Some(AbbreviationKind::Title)
        } else if (capitalised && CALENDAR_ABBREVIATIONS.contains(&lower.as_str()))
            || self.abbreviations.contains(&lower)
        {
            Some(AbbreviationKind::Common)
        } else {
            None
        }
    }

    /// Split text into trimmed sentences.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (_, ch) = chars[i];
            if !matches!(ch, '.' | '!' | '?') {
                i += 1;
                continue;
            }

            let run_start = i;
            while i < chars.len() && matches!(chars[i].1, '.' | '!' | '?') {
                i += 1;
            }
            let run: String = chars[run_start..i].iter().map(|(_, c)| *c).collect();
            while i < chars.len() && CLOSING_PUNCTUATION.contains(&chars[i].1) {
                i += 1;
            }
            let end = chars.get(i).map_or(text.len(), |(offset, _)| *offset);

            let at_end = i >= chars.len();
            if !at_end && !chars[i].1.is_whitespace() {
                continue;
            }

            let word_start = chars[..run_start]
                .iter()
                .rposition(|(_, c)| c.is_whitespace())
                .map_or(start, |p| chars[p + 1].0.max(start));
            let word = text[word_start..chars[run_start].0].trim_start_matches(OPENING_PUNCTUATION);
            let next_word = text[end..].trim_start();

            if !at_end && !self.is_boundary(&run, word, next_word) {
                continue;
            }

            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }

    fn is_boundary(&self, run: &str, word: &str, next_word: &str) -> bool {
        let next_upper = next_word.chars().next().map_or(false, char::is_uppercase);
        if run == "." {
            match self.abbreviation_kind(word) {
                Some(AbbreviationKind::Title) => false,
                Some(AbbreviationKind::Common) => next_upper,
                None if is_initial(word) => next_upper && starts_sentence(next_word),
                None => true,
            }
        } else if run.starts_with("..") {
            !next_word.chars().next().map_or(false, char::is_lowercase)
        } else {
            true
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbbreviationKind {
    Title,
    Common,
}

fn is_initial(word: &str) -> bool {
    let mut letters = word.chars();
    matches!((letters.next(), letters.next()), (Some(c), None) if c.is_alphabetic())
}

/// Whether the text following a `.` opens with a common sentence starter.
/// Another initial (`J. R. Smith`) never does.
fn starts_sentence(next_word: &str) -> bool {
    let token = next_word.split_whitespace().next().unwrap_or("");
    if token.ends_with('.') && is_initial(token.trim_end_matches('.')) {
        return false;
    }
    let bare = token
        .trim_start_matches(OPENING_PUNCTUATION)
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    SENTENCE_STARTERS.contains(&bare.as_str())
}

/// Load the shared model once. Later calls return the already-loaded model and
/// ignore `extra_abbreviations`. A failed load leaves nothing cached.
pub fn init(extra_abbreviations: Option<&Path>) -> Result<&'static SentenceModel, ScoringError> {
    MODEL.get_or_try_init(|| {
        let model = match extra_abbreviations {
            Some(path) => SentenceModel::with_abbreviations_file(path)?,
            None => SentenceModel::english(),
        };
        info!(
            "sentence model loaded ({} abbreviations)",
            model.abbreviation_count()
        );
        Ok(model)
    })
}

/// The shared model, loading the built-in one if nothing was initialised yet.
pub fn model() -> Result<&'static SentenceModel, ScoringError> {
    init(None)
}

pub fn is_initialized() -> bool {
    MODEL.get().is_some()
}
