use crate::types::{CuratorError, RawItem, Result, Source};
use crate::utils;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::debug;

const BLOCKED_MARKERS: [&str; 3] = ["<!DOCTYPE html>", "<html", "You've been blocked"];

/// Detect an HTML error page disguised as feed content.
pub fn is_blocked_response(body: &str) -> bool {
    BLOCKED_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Parse a syndication document (both the item-based and entry-based schema
/// variants) into normalized raw items, bounded at `max_items`.
pub fn parse_items(
    body: &str,
    source: &Source,
    fetched_at: DateTime<Utc>,
    max_items: usize,
) -> Result<Vec<RawItem>> {
    let feed = parser::parse(body.as_bytes())
        .map_err(|e| CuratorError::Parse(format!("{}: {}", source.name, e)))?;

    let mut items = Vec::new();

    for entry in feed.entries.into_iter().take(max_items) {
        let title_raw = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());
        let title = utils::clean_text(&title_raw);

        let url = match entry.links.first() {
            Some(link) => link.href.clone(),
            None => {
                debug!("Skipping entry without link in {}", source.name);
                continue;
            }
        };

        let summary_raw = entry.summary.map(|s| s.content).unwrap_or_default();
        let content_raw = entry.content.and_then(|c| c.body).unwrap_or_default();

        // Many feeds carry the full article in the content field; prefer it
        // over the short description when it is longer.
        let best = if content_raw.len() > summary_raw.len() {
            content_raw
        } else {
            summary_raw
        };
        let body_clean = utils::clean_text(&best);
        let summary = utils::truncate_chars(&body_clean, 500).to_string();

        let published_at = entry.published.or(entry.updated).unwrap_or(fetched_at);

        let image_url = entry
            .media
            .first()
            .and_then(|media| media.content.first())
            .and_then(|content| content.url.clone())
            .map(|u| u.to_string());

        let author = entry
            .authors
            .first()
            .map(|a| a.name.clone())
            .filter(|name| !name.is_empty());

        items.push(RawItem {
            id: utils::stable_id(&title, &url),
            title,
            url,
            source_name: source.name.clone(),
            published_at,
            summary,
            body_text: if body_clean.is_empty() { None } else { Some(body_clean) },
            image_url,
            author,
            tier: source.tier,
        });
    }

    Ok(items)
}
