//! Text statistics counting.

use crate::models::TextStatistics;

/// Counts words, characters, and paragraphs in decoded text.
pub struct StatisticsCounter;

impl StatisticsCounter {
    /// Count statistics for a text. Pure; empty input yields all zeros.
    ///
    /// Words are maximal runs of non-whitespace separated by space/CR/LF;
    /// paragraphs are non-empty segments split on a blank line.
    pub fn count(text: &str) -> TextStatistics {
        if text.is_empty() {
            return TextStatistics::default();
        }

        let word_count = text
            .split([' ', '\n', '\r'])
            .filter(|w| !w.is_empty())
            .count() as u32;
        let char_count = text.chars().count() as u32;
        let paragraph_count = text.split("\n\n").filter(|p| !p.is_empty()).count() as u32;

        TextStatistics {
            word_count,
            char_count,
            paragraph_count,
        }
    }
}
