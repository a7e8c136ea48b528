use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Strip markup tags, decode character entities, and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let stripped = strip_tags(text);
    let decoded = html_escape::decode_html_entities(&stripped);
    collapse_whitespace(&decoded)
}

/// Remove markup tags, keeping the text between them.
pub fn strip_tags(text: &str) -> String {
    text.chars()
        .fold((String::new(), false), |(mut out, in_tag), c| match c {
            '<' => (out, true),
            '>' => {
                out.push(' ');
                (out, false)
            }
            _ if !in_tag => {
                out.push(c);
                (out, in_tag)
            }
            _ => (out, in_tag),
        })
        .0
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a title for cross-source collision checks: ASCII lowercase,
/// alphanumerics only.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Lowercase alphanumeric words of length > 3, for similarity matching.
pub fn significant_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .map(|w| w.to_string())
        .collect()
}

/// Jaccard similarity of the significant word sets of two headlines.
/// Returns 0.0 when either set is empty.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let words_a = significant_words(a);
    let words_b = significant_words(b);

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();

    intersection as f64 / union as f64
}

/// Deterministic id for a raw item: hex SHA-256 prefix of "title-url".
pub fn stable_id(title: &str, url: &str) -> String {
    let digest = Sha256::digest(format!("{}-{}", title, url).as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Truncate to at most `max` bytes, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Strip ``` / ```json fence markers from an oracle reply.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
