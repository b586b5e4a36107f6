use serde::{Deserialize, Serialize};

use crate::core::layout::SectionTree;

/// Word counts of the original text and of the segmented bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub original_words: usize,
    pub summary_words: usize,
    /// Percent reduction rounded to one decimal; `None` when the original has no words
    pub reduction_percent: Option<f64>,
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `(1 - summary / original) * 100`, rounded to one decimal.
///
/// Rounding works on the exact binary value and sends exact ties to the even
/// digit, so `81.25` becomes `81.2`.
pub fn reduction_percent(original_words: usize, summary_words: usize) -> Option<f64> {
    if original_words == 0 {
        return None;
    }
    let ratio = summary_words as f64 / original_words as f64;
    format!("{:.1}", (1.0 - ratio) * 100.0).parse().ok()
}

impl SummaryMetrics {
    pub fn compute(original_text: &str, tree: &SectionTree) -> Self {
        let original_words = count_words(original_text);
        let summary_words = tree.bodies().into_iter().map(count_words).sum();
        Self {
            original_words,
            summary_words,
            reduction_percent: reduction_percent(original_words, summary_words),
        }
    }

    /// `"42.5%"`, or `"n/a"` for an empty original.
    pub fn reduction_display(&self) -> String {
        match self.reduction_percent {
            Some(percent) => format!("{:.1}%", percent),
            None => "n/a".to_string(),
        }
    }
}
