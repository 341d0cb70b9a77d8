use std::sync::LazyLock;

use mwatch_core::MAX_TAGS;
use regex::Regex;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid regex"));

const TECHNICAL_TERMS: &[&str] = &[
    "api",
    "sdk",
    "framework",
    "library",
    "platform",
    "service",
    "app",
    "software",
    "tool",
    "feature",
    "performance",
    "security",
    "scalability",
    "ui",
    "ux",
];

/// Tags for a mention: the lowercased entity name, then hashtags in order of
/// first appearance, then technical terms found as substrings. Deduplicated
/// and capped at [`MAX_TAGS`].
#[must_use]
pub fn extract_tags(text: &str, entity_name: &str) -> Vec<String> {
    let mut tags = vec![entity_name.to_lowercase()];
    let mut push = |tag: String| {
        if tags.len() < MAX_TAGS && !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    for cap in HASHTAG_RE.captures_iter(text) {
        push(cap[1].to_lowercase());
    }

    let lower = text.to_lowercase();
    for term in TECHNICAL_TERMS {
        if lower.contains(term) {
            push((*term).to_string());
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_entity_tag_only() {
        assert_eq!(extract_tags("", "Rust"), vec!["rust"]);
    }

    #[test]
    fn hashtags_precede_technical_terms() {
        let tags = extract_tags("New #Release of the #CLI tool with a better API", "Acme");
        assert_eq!(tags, vec!["acme", "release", "cli", "api", "tool"]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let tags = extract_tags("#acme #API #api api", "ACME");
        assert_eq!(tags, vec!["acme", "api"]);
    }

    #[test]
    fn technical_terms_match_as_substrings() {
        // "application" contains "app"; "guide" contains "ui".
        let tags = extract_tags("application guide", "x");
        assert_eq!(tags, vec!["x", "app", "ui"]);
    }

    #[test]
    fn output_is_capped_and_starts_with_entity() {
        let text = "#a #b #c #d #e #f #g #h #i #j #k api sdk";
        let tags = extract_tags(text, "Entity");
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags[0], "entity");
        let unique: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
    }
}
