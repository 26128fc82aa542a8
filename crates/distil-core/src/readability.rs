//! Flesch-Kincaid readability scoring.
//!
//! Pure and deterministic: the same text always yields the same metrics.
//! Used by the CLI to report clarity after each refinement pass.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DistilError, Result};

static SENTENCE_DELIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static SILENT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:[^laeiouy]es|ed|[^laeiouy]e)$").unwrap());
static VOWEL_CLUSTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiouy]{1,2}").unwrap());

/// Counts derived from a text plus its Flesch-Kincaid grade level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    pub sentence_count: usize,
    pub word_count: usize,
    pub syllable_count: usize,
    pub grade_level: f64,
}

impl ReadabilityMetrics {
    pub fn clarity(&self) -> Clarity {
        if self.grade_level <= 7.0 {
            Clarity::VeryEasy
        } else if self.grade_level <= 9.0 {
            Clarity::Clear
        } else if self.grade_level <= 12.0 {
            Clarity::Moderate
        } else {
            Clarity::Advanced
        }
    }
}

/// Reading-difficulty band of a grade level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clarity {
    VeryEasy,
    Clear,
    Moderate,
    Advanced,
}

impl Clarity {
    pub fn label(&self) -> &'static str {
        match self {
            Clarity::VeryEasy => "Very easy to read",
            Clarity::Clear => "Clear and accessible",
            Clarity::Moderate => "Moderate complexity",
            Clarity::Advanced => "Advanced reading level",
        }
    }
}

impl std::fmt::Display for Clarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Computes readability metrics for `text`.
///
/// Sentences are the non-empty segments between runs of `.`, `!` and `?`
/// (floored at one so punctuation-only text still scores); words are
/// whitespace-delimited tokens; syllables come from a vowel-cluster
/// estimator. The grade is `0.39 * (words / sentences) +
/// 11.8 * (syllables / words) - 15.59`, rounded to two decimals.
///
/// Fails with `InvalidInput` on empty or whitespace-only text, which would
/// otherwise divide by zero.
pub fn analyze(text: &str) -> Result<ReadabilityMetrics> {
    if text.trim().is_empty() {
        return Err(DistilError::InvalidInput(
            "cannot analyze empty text".to_string(),
        ));
    }

    let sentence_count = SENTENCE_DELIMS
        .split(text)
        .filter(|segment| !segment.is_empty())
        .count()
        .max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let syllable_count: usize = words.iter().map(|word| estimate_syllables(word)).sum();

    let grade = 0.39 * (word_count as f64 / sentence_count as f64)
        + 11.8 * (syllable_count as f64 / word_count as f64)
        - 15.59;

    Ok(ReadabilityMetrics {
        sentence_count,
        word_count,
        syllable_count,
        grade_level: round2(grade),
    })
}

/// Heuristic syllable count for a single word, never less than 1.
///
/// Strips one silent suffix (`-e`/`-es` after a consonant, or `-ed`) and a
/// leading `y`, then counts runs of one or two vowels (`y` included).
fn estimate_syllables(word: &str) -> usize {
    let mut w = word.to_lowercase();
    if let Some(m) = SILENT_SUFFIX.find(&w) {
        w.truncate(m.start());
    }
    if w.starts_with('y') {
        w.remove(0);
    }
    let clusters = VOWEL_CLUSTERS.find_iter(&w).count();
    clusters.max(1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_empty_and_whitespace_text() {
        assert!(matches!(analyze(""), Err(DistilError::InvalidInput(_))));
        assert!(matches!(
            analyze("   \n\t  "),
            Err(DistilError::InvalidInput(_))
        ));
    }

    #[test]
    fn counts_simple_sentence() {
        let metrics = analyze("The cat sat.").unwrap();
        assert_eq!(metrics.sentence_count, 1);
        assert_eq!(metrics.word_count, 3);
        assert_eq!(metrics.syllable_count, 3);
        // 0.39 * 3 + 11.8 * 1 - 15.59
        assert_relative_eq!(metrics.grade_level, -2.62, epsilon = 1e-9);
    }

    #[test]
    fn consecutive_delimiters_collapse() {
        let metrics = analyze("Wait... what?! Really.").unwrap();
        assert_eq!(metrics.sentence_count, 3);
        assert_eq!(metrics.word_count, 3);
    }

    #[test]
    fn punctuation_only_text_scores_as_one_sentence() {
        let metrics = analyze("?!").unwrap();
        assert_eq!(metrics.sentence_count, 1);
        assert_eq!(metrics.word_count, 1);
        assert!(metrics.grade_level.is_finite());
    }

    #[test]
    fn every_word_contributes_at_least_one_syllable() {
        let samples = [
            "Understand more by reading less",
            "A b c d e",
            "Rhythm myths crypt",
            "It works. It really works!",
        ];
        for text in samples {
            let metrics = analyze(text).unwrap();
            assert!(metrics.sentence_count >= 1, "{text}");
            assert!(metrics.word_count >= 1, "{text}");
            assert!(metrics.syllable_count >= metrics.word_count, "{text}");
        }
    }

    #[test]
    fn syllable_estimator_handles_silent_suffixes() {
        // "the" -> strip consonant+e -> "t" -> no clusters -> floor of 1
        assert_eq!(estimate_syllables("the"), 1);
        // "caves" -> strip "ves" -> "ca" -> one cluster
        assert_eq!(estimate_syllables("caves"), 1);
        // "wanted" -> strip "ed" -> "want" -> one cluster
        assert_eq!(estimate_syllables("wanted"), 1);
        // "idea" -> "i" + "ea"
        assert_eq!(estimate_syllables("idea"), 2);
        // leading y is not a vowel: "yellow" -> "ellow" -> "e" + "o"
        assert_eq!(estimate_syllables("yellow"), 2);
        // no vowels at all still counts one
        assert_eq!(estimate_syllables("xkcd"), 1);
    }

    #[test]
    fn grade_is_rounded_to_two_decimals() {
        let text = "Readability estimation involves heuristic approximations everywhere.";
        let metrics = analyze(text).unwrap();
        let scaled = metrics.grade_level * 100.0;
        assert_relative_eq!(scaled, scaled.round(), epsilon = 1e-9);
    }

    #[test]
    fn clarity_bands_follow_grade_thresholds() {
        let m = |grade_level| ReadabilityMetrics {
            sentence_count: 1,
            word_count: 1,
            syllable_count: 1,
            grade_level,
        };
        assert_eq!(m(3.2).clarity(), Clarity::VeryEasy);
        assert_eq!(m(7.0).clarity(), Clarity::VeryEasy);
        assert_eq!(m(8.5).clarity(), Clarity::Clear);
        assert_eq!(m(11.9).clarity(), Clarity::Moderate);
        assert_eq!(m(15.0).clarity(), Clarity::Advanced);
        assert_eq!(Clarity::Advanced.label(), "Advanced reading level");
    }

    #[test]
    fn deterministic_for_identical_input() {
        let text = "Complex systems exhibit emergent behavior. Simplification helps.";
        assert_eq!(analyze(text).unwrap(), analyze(text).unwrap());
    }
}
