//! Lexical sentiment scorer.

use std::sync::LazyLock;

use mwatch_core::Sentiment;
use regex::Regex;

pub(crate) const POSITIVE_TERMS: &[&str] = &[
    "great",
    "excellent",
    "amazing",
    "love",
    "fantastic",
    "best",
    "innovative",
    "powerful",
    "easy",
    "fast",
    "reliable",
    "helpful",
    "perfect",
    "outstanding",
    "brilliant",
    "awesome",
    "wonderful",
    "impressive",
    "superb",
    "terrific",
    "good",
    "nice",
    "solid",
    "strong",
    "effective",
    "efficient",
    "useful",
    "quality",
    "recommend",
    "success",
];

pub(crate) const NEGATIVE_TERMS: &[&str] = &[
    "terrible",
    "awful",
    "horrible",
    "hate",
    "worst",
    "broken",
    "slow",
    "buggy",
    "useless",
    "disappointing",
    "frustrating",
    "poor",
    "fail",
    "crash",
    "issue",
    "problem",
    "bad",
    "difficult",
    "hard",
    "confusing",
    "complicated",
    "annoying",
    "waste",
    "suck",
    "garbage",
    "trash",
    "inferior",
    "lacking",
    "unstable",
    "unreliable",
];

const NEUTRAL_SCORE: i64 = 50;
const POINTS_PER_HIT: i64 = 10;

fn word_alternation(terms: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", terms.join("|"))).expect("valid regex")
}

static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| word_alternation(POSITIVE_TERMS));
static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| word_alternation(NEGATIVE_TERMS));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentScore {
    pub label: Sentiment,
    /// 0..=100, 50 is neutral.
    pub score: u8,
}

/// Score `text` by counting whole-word lexicon hits; repeats count.
///
/// `score = clamp(50 + 10 * (positive - negative), 0, 100)`.
#[must_use]
pub fn score_sentiment(text: &str) -> SentimentScore {
    let positive = i64::try_from(POSITIVE_RE.find_iter(text).count()).unwrap_or(i64::MAX);
    let negative = i64::try_from(NEGATIVE_RE.find_iter(text).count()).unwrap_or(i64::MAX);
    let net = positive.saturating_sub(negative);

    let label = match net.signum() {
        1 => Sentiment::Positive,
        -1 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    };
    let raw = NEUTRAL_SCORE.saturating_add(net.saturating_mul(POINTS_PER_HIT));
    let score = u8::try_from(raw.clamp(0, 100)).unwrap_or(50);

    SentimentScore { label, score }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(
            score_sentiment(""),
            SentimentScore {
                label: Sentiment::Neutral,
                score: 50
            }
        );
    }

    #[test]
    fn two_positive_hits() {
        let s = score_sentiment("This product is great and amazing");
        assert_eq!(s.label, Sentiment::Positive);
        assert_eq!(s.score, 70);
    }

    #[test]
    fn four_negative_hits() {
        let s = score_sentiment("This is broken and buggy, a terrible issue");
        assert_eq!(s.label, Sentiment::Negative);
        assert_eq!(s.score, 10);
    }

    #[test]
    fn matching_is_whole_word_only() {
        // "goodness", "badge" and "slowly" must not count.
        let s = score_sentiment("goodness gracious, a badge earned slowly");
        assert_eq!(s.label, Sentiment::Neutral);
        assert_eq!(s.score, 50);
    }

    #[test]
    fn matching_is_case_insensitive_and_counts_repeats() {
        let s = score_sentiment("GREAT great Great");
        assert_eq!(s.score, 80);
    }

    #[test]
    fn balanced_hits_are_neutral() {
        let s = score_sentiment("good but slow");
        assert_eq!(s.label, Sentiment::Neutral);
        assert_eq!(s.score, 50);
    }

    #[test]
    fn score_is_clamped() {
        let glowing = "love ".repeat(12);
        assert_eq!(score_sentiment(&glowing).score, 100);
        let scathing = "awful ".repeat(12);
        assert_eq!(score_sentiment(&scathing).score, 0);
        assert_eq!(score_sentiment(&scathing).label, Sentiment::Negative);
    }

    #[test]
    fn score_always_in_range_and_label_matches_sign() {
        let samples = [
            "",
            "great",
            "bad bad",
            "excellent fast reliable crash",
            "nothing to see here",
            "hate hate hate love",
        ];
        for text in samples {
            let s = score_sentiment(text);
            assert!(s.score <= 100);
            match s.label {
                Sentiment::Positive => assert!(s.score > 50),
                Sentiment::Negative => assert!(s.score < 50),
                Sentiment::Neutral => assert_eq!(s.score, 50),
            }
        }
    }
}
