use indexmap::IndexMap;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{SummarizerConfig, DEFAULT_KEYWORDS, DEFAULT_MAX_KEY_POINTS};
use crate::core::layout::SectionTree;
use crate::core::sentence;
use crate::error::ScoringError;

static LEADING_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\-\*•]\s*").unwrap());

const FIRST_SENTENCE_SCORE: f64 = 2.5;
const LAST_SENTENCE_SCORE: f64 = 1.5;

/// A cleaned sentence and its salience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub text: String,
    pub score: f64,
    /// Index of the sentence in its body
    pub position: usize,
}

/// Positional bonus for sentence `index` of `total`.
pub fn position_score(index: usize, total: usize) -> f64 {
    if index == 0 {
        FIRST_SENTENCE_SCORE
    } else if index + 1 == total {
        LAST_SENTENCE_SCORE
    } else {
        1.0 / (index as f64 + 1.0)
    }
}

/// Strip one leading bullet marker and every `**`, then trim.
pub fn clean_sentence(sentence: &str) -> String {
    let unbulleted = LEADING_BULLET.replace(sentence, "");
    unbulleted.trim().replace("**", "")
}

/// Picks the most salient sentences of a leaf body.
#[derive(Debug, Clone)]
pub struct KeyPointExtractor {
    max_points: usize,
    keywords: Vec<(String, f64)>,
}

impl Default for KeyPointExtractor {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_KEY_POINTS,
            keywords: DEFAULT_KEYWORDS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }
}

impl KeyPointExtractor {
    pub fn new(max_points: usize, keywords: &IndexMap<String, f64>) -> Self {
        Self {
            max_points,
            keywords: keywords
                .iter()
                .map(|(k, w)| (k.to_lowercase(), *w))
                .collect(),
        }
    }

    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self::new(config.max_key_points, &config.keywords)
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Sum of the weights of every keyword present in the sentence, each counted once.
    pub fn keyword_score(&self, sentence: &str) -> f64 {
        let lower = sentence.to_lowercase();
        self.keywords
            .iter()
            .filter(|(keyword, _)| lower.contains(keyword.as_str()))
            .map(|(_, weight)| weight)
            .sum()
    }

    /// Every distinct cleaned sentence with its score, best first.
    ///
    /// Sentences that clean to the same text collapse into one entry: the
    /// later sentence's score wins, the first one's place in the body is kept.
    pub fn score_sentences(&self, text: &str) -> Result<Vec<KeyPoint>, ScoringError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let model = sentence::model()?;
        let sentences = model.split(text);
        let total = sentences.len();

        let mut scored: IndexMap<String, KeyPoint> = IndexMap::with_capacity(total);
        for (position, raw) in sentences.iter().enumerate() {
            let score = position_score(position, total) + self.keyword_score(raw);
            if !score.is_finite() {
                return Err(ScoringError::NonFiniteScore { position });
            }
            let text = clean_sentence(raw);
            scored
                .entry(text.clone())
                .and_modify(|point| point.score = score)
                .or_insert(KeyPoint {
                    text,
                    score,
                    position,
                });
        }

        let mut points: Vec<KeyPoint> = scored.into_values().collect();
        points.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(points)
    }

    /// Top key points, best first.
    pub fn try_extract_key_points(&self, text: &str) -> Result<Vec<String>, ScoringError> {
        let mut points = self.score_sentences(text)?;
        points.truncate(self.max_points);
        Ok(points.into_iter().map(|p| p.text).collect())
    }

    /// Key points for every leaf of `sections`, failing on the first leaf that
    /// cannot be scored.
    pub fn try_extract_tree(
        &self,
        sections: &SectionTree,
    ) -> Result<SectionTree<Vec<String>>, ScoringError> {
        sections.try_map_leaves(|leaf| self.try_extract_key_points(leaf.value))
    }

    /// Like [`KeyPointExtractor::try_extract_key_points`], but a failure is
    /// logged and reported as no key points.
    pub fn extract_key_points(&self, text: &str) -> Vec<String> {
        match self.try_extract_key_points(text) {
            Ok(points) => points,
            Err(e) => {
                warn!("Error in key points extraction: {}", e);
                Vec::new()
            }
        }
    }
}
