//! Summarizer configuration, loaded from an optional TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keywords that raise a sentence's salience, with their weights.
pub const DEFAULT_KEYWORDS: [(&str, f64); 9] = [
    ("mandatory", 2.5),
    ("required", 2.2),
    ("must", 2.2),
    ("shall", 2.0),
    ("critical", 1.8),
    ("important", 1.8),
    ("key", 1.5),
    ("ensure", 1.4),
    ("compliance", 1.4),
];

pub const DEFAULT_MAX_KEY_POINTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Key points kept per leaf body
    pub max_key_points: usize,
    /// Salience keywords, matched as case-insensitive substrings
    pub keywords: IndexMap<String, f64>,
    /// Extra abbreviations for the sentence model, one per line
    pub abbreviations_path: Option<PathBuf>,
    /// Score leaf bodies on the rayon pool
    pub parallel_scoring: bool,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub file_name: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_key_points: DEFAULT_MAX_KEY_POINTS,
            keywords: DEFAULT_KEYWORDS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
            abbreviations_path: None,
            parallel_scoring: true,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Document Summary".to_string(),
            file_name: "document_summary.pdf".to_string(),
        }
    }
}

impl SummarizerConfig {
    /// Load from a TOML file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
