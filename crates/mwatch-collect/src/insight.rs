//! Keyword-based insight classifier for company mentions.

use mwatch_core::InsightCategory;

/// Only classifications above this confidence become stored insights.
pub const INSIGHT_CONFIDENCE_THRESHOLD: f64 = 0.3;

const CULTURE_KEYWORDS: &[&str] = &[
    "work",
    "employee",
    "culture",
    "team",
    "management",
    "office",
    "remote",
    "hiring",
    "benefits",
    "salary",
];

const OPINION_KEYWORDS: &[&str] = &[
    "think",
    "believe",
    "feel",
    "opinion",
    "view",
    "perspective",
    "seems",
    "appears",
    "consider",
];

const CHALLENGE_KEYWORDS: &[&str] = &[
    "problem",
    "issue",
    "bug",
    "error",
    "fail",
    "broken",
    "difficult",
    "struggle",
    "challenge",
    "complaint",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightScore {
    pub category: InsightCategory,
    /// Distinct keyword hits divided by three. Not clamped, so it can exceed 1.0.
    pub confidence: f64,
}

impl InsightScore {
    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.confidence > INSIGHT_CONFIDENCE_THRESHOLD
    }
}

fn distinct_hits(haystack: &str, keywords: &[&str]) -> u32 {
    let hits = keywords.iter().filter(|k| haystack.contains(*k)).count();
    u32::try_from(hits).unwrap_or(u32::MAX)
}

/// Classify `text` as culture, opinion or challenge by substring keyword hits.
///
/// Ties go to challenge, then culture, then opinion. No hits at all yields
/// `(opinion, 0.5)`.
#[must_use]
pub fn classify_insight(text: &str) -> InsightScore {
    let lower = text.to_lowercase();
    let culture = distinct_hits(&lower, CULTURE_KEYWORDS);
    let opinion = distinct_hits(&lower, OPINION_KEYWORDS);
    let challenge = distinct_hits(&lower, CHALLENGE_KEYWORDS);

    let max = culture.max(opinion).max(challenge);
    if max == 0 {
        return InsightScore {
            category: InsightCategory::Opinion,
            confidence: 0.5,
        };
    }

    let category = if challenge == max {
        InsightCategory::Challenge
    } else if culture == max {
        InsightCategory::Culture
    } else {
        InsightCategory::Opinion
    };

    InsightScore {
        category,
        confidence: f64::from(max) / 3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hits_defaults_to_opinion() {
        let s = classify_insight("lorem ipsum dolor sit amet");
        assert_eq!(s.category, InsightCategory::Opinion);
        assert!((s.confidence - 0.5).abs() < f64::EPSILON);
        assert!(s.qualifies());
    }

    #[test]
    fn challenge_wins_tie_with_culture() {
        // one culture keyword (team), one challenge keyword (bug)
        let s = classify_insight("the team found a bug");
        assert_eq!(s.category, InsightCategory::Challenge);
        assert!((s.confidence - 1.0 / 3.0).abs() < 1e-9);
        assert!(s.qualifies());
    }

    #[test]
    fn culture_wins_tie_with_opinion() {
        let s = classify_insight("I believe the office is nice");
        assert_eq!(s.category, InsightCategory::Culture);
    }

    #[test]
    fn opinion_wins_when_strictly_highest() {
        let s = classify_insight("I think it seems fine, in my opinion");
        assert_eq!(s.category, InsightCategory::Opinion);
        assert!((s.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn matching_is_substring_and_counts_each_keyword_once() {
        // "networking" contains "work"; repeated "bug" counts once.
        let s = classify_insight("Networking bug bug bug");
        assert_eq!(s.category, InsightCategory::Challenge);
        assert!((s.confidence - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_not_clamped() {
        let s = classify_insight("problem issue bug error fail broken");
        assert_eq!(s.category, InsightCategory::Challenge);
        assert!((s.confidence - 2.0).abs() < f64::EPSILON);
    }
}
