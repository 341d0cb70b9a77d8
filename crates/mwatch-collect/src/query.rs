//! Turning entity names into source queries and matching them in text.
//!
//! Entity names may carry boolean syntax (`AND`, `OR`, `NOT`, parentheses).
//! Sources differ in what they understand, so each collector picks one of the
//! renderings below.

use std::sync::LazyLock;

use regex::Regex;

const OPERATORS: [&str; 3] = ["and", "or", "not"];

static BOOLEAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:AND|OR|NOT)\b").expect("valid regex"));

fn is_operator(token: &str) -> bool {
    OPERATORS.iter().any(|op| token.eq_ignore_ascii_case(op))
}

/// True when the name uses `AND`, `OR` or `NOT` as standalone words.
#[must_use]
pub fn has_boolean_syntax(name: &str) -> bool {
    BOOLEAN_RE.is_match(name)
}

/// The searchable terms of a name, without operators, parentheses or quotes.
#[must_use]
pub fn plain_terms(name: &str) -> Vec<String> {
    name.replace(['(', ')'], " ")
        .split_whitespace()
        .filter(|t| !is_operator(t))
        .map(|t| t.replace(['"', '\''], ""))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Terms joined by spaces, for sources without boolean support.
#[must_use]
pub fn plain_query(name: &str) -> String {
    plain_terms(name).join(" ")
}

/// Rewrite for search engines where juxtaposition means AND, `OR` is
/// understood, and negation is a `-` prefix.
///
/// `(tokio OR axum) AND NOT java` becomes `(tokio OR axum) -java`.
#[must_use]
pub fn implicit_and_query(name: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut negate = false;

    for token in name.split_whitespace() {
        if token.eq_ignore_ascii_case("and") {
            continue;
        }
        if token.eq_ignore_ascii_case("not") {
            negate = true;
            continue;
        }
        if token.eq_ignore_ascii_case("or") {
            out.push("OR".to_string());
            continue;
        }
        if negate {
            out.push(format!("-{token}"));
            negate = false;
        } else {
            out.push(token.to_string());
        }
    }

    out.join(" ")
}

/// Lowercase, dash-separated slug from the first plain term group, for
/// sources that search by tag.
#[must_use]
pub fn tag_slug(name: &str) -> String {
    let base = if has_boolean_syntax(name) {
        plain_terms(name).into_iter().next().unwrap_or_default()
    } else {
        name.to_string()
    };
    base.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Whether `text` mentions the entity as a whole word or phrase.
///
/// For boolean names any single non-operator term is enough.
#[must_use]
pub fn entity_matches_text(name: &str, text: &str) -> bool {
    if name.trim().is_empty() || text.is_empty() {
        return false;
    }

    if has_boolean_syntax(name) {
        return plain_terms(name)
            .iter()
            .any(|term| phrase_matches(term, text));
    }

    phrase_matches(&name.replace(['"', '\''], ""), text)
}

fn phrase_matches(phrase: &str, text: &str) -> bool {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return false;
    }
    // \b misbehaves around punctuation inside names such as "C++" or ".NET",
    // so delimit on explicit separator characters instead.
    let pattern = format!(
        r#"(?i)(?:^|[\s.,;:!?()\[\]{{}}'"-]){}(?:[\s.,;:!?()\[\]{{}}'"-]|$)"#,
        regex::escape(phrase)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(text))
}
