use crate::oracle::ExtractionOracle;
use crate::utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// A realtime social post, supplied by the caller from its own feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub id: String,
    #[serde(default)]
    pub author: String,
    pub headline: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub post_count: u64,
    pub published_at: DateTime<Utc>,
}

const FILTER_PROMPT: &str = r#"You are filtering crypto news headlines for a newsletter. Return ONLY the indices (numbers) of headlines that are REAL crypto news worth reading.

KEEP: Market moves, regulation, protocol updates, exchange news, ETF news, whale activity, major predictions from known analysts, industry developments.

REMOVE: Spam, scams, shilling, random tweets/opinions, non-English, personal reactions, "DM me", pump signals, recovery scams, just hashtags, links-only, vague motivational quotes, trading signals."#;

/// Lowercase, strip non-word characters, collapse whitespace, cap at 60.
fn normalize_headline(headline: &str) -> String {
    let cleaned: String = headline
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let collapsed = utils::collapse_whitespace(&cleaned);
    utils::truncate_chars(&collapsed, 60).to_string()
}

/// Drop near-duplicate posts: same 40-char normalized prefix, or word
/// overlap above 0.5 with an already-kept headline.
pub fn dedup_posts(posts: Vec<SocialPost>) -> Vec<SocialPost> {
    let total = posts.len();
    let mut seen_normalized: Vec<String> = Vec::new();
    let mut seen_prefixes: HashSet<String> = HashSet::new();
    let mut deduped = Vec::new();

    for post in posts {
        let normalized = normalize_headline(&post.headline);
        let prefix = utils::truncate_chars(&normalized, 40).to_string();
        if seen_prefixes.contains(&prefix) {
            continue;
        }

        let words: HashSet<&str> = normalized
            .split_whitespace()
            .filter(|w| w.len() > 3)
            .collect();

        let mut is_dupe = false;
        for seen in &seen_normalized {
            let seen_words: HashSet<&str> =
                seen.split_whitespace().filter(|w| w.len() > 3).collect();
            if words.is_empty() || seen_words.is_empty() {
                continue;
            }
            let overlap = words.intersection(&seen_words).count() as f64;
            if overlap / words.len().max(seen_words.len()) as f64 > 0.5 {
                is_dupe = true;
                break;
            }
        }
        if is_dupe {
            continue;
        }

        seen_prefixes.insert(prefix);
        seen_normalized.push(normalized);
        deduped.push(post);
    }

    info!("{} social posts, {} after dedup", total, deduped.len());
    deduped
}

/// Oracle-backed spam filter for social posts.
pub struct SocialFilter {
    oracle: Arc<dyn ExtractionOracle>,
}

impl SocialFilter {
    pub fn new(oracle: Arc<dyn ExtractionOracle>) -> Self {
        Self { oracle }
    }

    /// Keep only the posts the oracle marks as real news. Any oracle or
    /// parse failure keeps every post.
    pub async fn filter(&self, posts: Vec<SocialPost>) -> Vec<SocialPost> {
        if posts.is_empty() {
            return posts;
        }

        let headlines = posts
            .iter()
            .enumerate()
            .map(|(i, post)| format!("{}. {}", i, post.headline))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "{}\n\nHeadlines:\n{}\n\nReturn ONLY a JSON array of index numbers to KEEP. Example: [0, 3, 7, 11]\nReturn ONLY valid JSON, nothing else.",
            FILTER_PROMPT, headlines
        );

        let reply = match self.oracle.complete(&prompt).await {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!("Social filter oracle failed, keeping all posts: {}", e);
                return posts;
            }
        };

        let keep: Vec<usize> = match serde_json::from_str(&utils::strip_code_fences(&reply)) {
            Ok(indices) => indices,
            Err(e) => {
                warn!("Unparseable social filter reply, keeping all posts: {}", e);
                return posts;
            }
        };

        keep.into_iter()
            .filter(|&index| index < posts.len())
            .map(|index| posts[index].clone())
            .collect()
    }
}
