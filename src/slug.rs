/// Slug candidate generation.
///
/// Turns a free-text athlete name into an ordered list of URL slugs to try
/// against the profile site, most specific first.
use std::collections::HashSet;

/// Path segment that marks a profile URL.
const PROFILE_SEGMENT: &str = "/athletes/";

/// Generate slug candidates for a free-text name.
///
/// Emits, in order: all tokens hyphenated, the first token, first + last
/// token, and all tokens concatenated. Duplicates are dropped keeping the
/// first occurrence. Input that normalizes to nothing yields a single
/// empty candidate, which callers treat as an immediate miss.
#[must_use]
pub fn generate(query: &str) -> Vec<String> {
    let cleaned: String = query
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let Some((first, rest)) = tokens.split_first() else {
        return vec![String::new()];
    };

    let mut raw = vec![tokens.join("-"), (*first).to_string()];
    if let Some(last) = rest.last() {
        raw.push(format!("{first}-{last}"));
    }
    raw.push(tokens.concat());

    dedup_preserving_order(raw)
}

/// Extract the slug from a profile URL such as
/// `https://www.onefc.com/th/athletes/rodtang/`.
///
/// Returns `None` when the input is not a profile URL.
#[must_use]
pub fn slug_from_url(input: &str) -> Option<String> {
    let idx = input.find(PROFILE_SEGMENT)?;
    let path = &input[idx + PROFILE_SEGMENT.len()..];
    let path = path.split(['?', '#']).next().unwrap_or_default();

    path.split('/')
        .filter(|s| !s.trim().is_empty())
        .next_back()
        .map(|s| s.trim().to_lowercase())
}

/// Candidates for any query: a profile URL resolves to its own slug only.
#[must_use]
pub fn candidates_for(query: &str) -> Vec<String> {
    match slug_from_url(query) {
        Some(slug) => vec![slug],
        None => generate(query),
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.trim().to_lowercase()))
        .collect()
}
