use crate::types::{RawItem, Source};
use crate::utils;
use chrono::{DateTime, Utc};
use regex::Regex;

/// Community sources whose publisher blocks direct syndication access are
/// fetched through the reader proxy instead.
pub fn is_community_source(url: &str) -> bool {
    url.contains("reddit.com") || url.contains("/r/")
}

/// Rewrite a syndication URL into the listing URL the reader proxy renders.
pub fn listing_url(url: &str) -> String {
    url.replacen("/.rss", "", 1).replacen(".rss", "", 1)
}

/// Parses the markdown-like listing returned by the reader proxy: link
/// lines become posts, free text after a link accumulates as the synopsis
/// until the next link.
pub struct ListingParser {
    link_re: Regex,
}

impl ListingParser {
    pub fn new() -> Self {
        let link_re = Regex::new(r"^\[(.+?)\]\((https://(?:www\.)?reddit\.com/r/[^)]+)\)")
            .expect("valid listing link pattern");
        Self { link_re }
    }

    pub fn parse_posts(
        &self,
        markdown: &str,
        source: &Source,
        fetched_at: DateTime<Utc>,
        max_items: usize,
    ) -> Vec<RawItem> {
        let mut posts = Vec::new();
        let mut current: Option<PendingPost> = None;

        for line in markdown.lines() {
            if let Some(caps) = self.link_re.captures(line) {
                if let Some(pending) = current.take() {
                    posts.push(pending.into_item(source, fetched_at));
                }
                current = Some(PendingPost {
                    title: caps[1].to_string(),
                    url: caps[2].to_string(),
                    synopsis: String::new(),
                });
            } else if let Some(pending) = current.as_mut() {
                if !line.trim().is_empty() {
                    pending.synopsis.push(' ');
                    pending.synopsis.push_str(line);
                }
            }
        }

        if let Some(pending) = current.take() {
            posts.push(pending.into_item(source, fetched_at));
        }

        posts.truncate(max_items);
        posts
    }
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new()
    }
}

struct PendingPost {
    title: String,
    url: String,
    synopsis: String,
}

impl PendingPost {
    fn into_item(self, source: &Source, fetched_at: DateTime<Utc>) -> RawItem {
        let body = utils::clean_text(&self.synopsis);
        let title = utils::clean_text(&self.title);

        RawItem {
            id: utils::stable_id(&title, &self.url),
            title,
            url: self.url,
            source_name: source.name.clone(),
            published_at: fetched_at,
            summary: utils::truncate_chars(&body, 500).to_string(),
            body_text: if body.is_empty() { None } else { Some(body) },
            image_url: None,
            author: None,
            tier: source.tier,
        }
    }
}
