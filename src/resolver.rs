use crate::types::FetchConfig;
use crate::utils;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

const MAX_CONTENT_CHARS: usize = 15_000;
/// Direct extraction must clear this length to be accepted.
const MIN_DIRECT_CHARS: usize = 600;
/// Below this the container yield is discarded in favor of full-body text.
const BODY_FALLBACK_THRESHOLD: usize = 500;

const CONTAINER_SELECTORS: [&str; 6] = [
    "article",
    r#"[role="main"]"#,
    ".post-content",
    ".article-body",
    ".entry-content",
    "main",
];

/// Layered content resolution: direct retrieval with structural text
/// extraction, then the reader proxy. Unreachable or empty content yields
/// an empty string; the resolver never fails.
pub struct ContentResolver {
    client: Client,
    selectors: Vec<Selector>,
    body_selector: Selector,
    noise_re: Regex,
    reader_proxy_base: String,
}

impl ContentResolver {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        let selectors = CONTAINER_SELECTORS
            .iter()
            .map(|s| Selector::parse(s).expect("valid content selector"))
            .collect();
        let body_selector = Selector::parse("body").expect("valid body selector");

        let noise_re = Regex::new(
            r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<nav[^>]*>.*?</nav>|<footer[^>]*>.*?</footer>|<iframe[^>]*>.*?</iframe>|<form[^>]*>.*?</form>|<noscript[^>]*>.*?</noscript>",
        )
        .expect("valid noise pattern");

        Self {
            client,
            selectors,
            body_selector,
            noise_re,
            reader_proxy_base: config.reader_proxy_base.clone(),
        }
    }

    /// Best-effort plain text for a URL, capped at 15,000 chars.
    pub async fn resolve(&self, url: &str) -> String {
        if let Some(text) = self.direct(url).await {
            return text;
        }
        if let Some(text) = self.reader_proxy(url).await {
            return text;
        }
        String::new()
    }

    async fn direct(&self, url: &str) -> Option<String> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let html = response.text().await.ok()?;
        let text = self.extract_article_text(&html);

        if text.len() > MIN_DIRECT_CHARS {
            Some(utils::truncate_chars(&text, MAX_CONTENT_CHARS).to_string())
        } else {
            debug!("Direct extraction too short for {} ({} chars)", url, text.len());
            None
        }
    }

    /// Prefer semantic content containers over full-page text, discarding
    /// script/style/nav/footer/form noise.
    fn extract_article_text(&self, html: &str) -> String {
        let stripped = self.noise_re.replace_all(html, " ");
        let document = Html::parse_document(&stripped);

        let mut text = String::new();
        for selector in &self.selectors {
            if let Some(element) = document.select(selector).next() {
                text = element.text().collect::<Vec<_>>().join(" ");
                break;
            }
        }

        if text.len() < BODY_FALLBACK_THRESHOLD {
            if let Some(body) = document.select(&self.body_selector).next() {
                text = body.text().collect::<Vec<_>>().join(" ");
            }
        }

        utils::collapse_whitespace(&text)
    }

    async fn reader_proxy(&self, url: &str) -> Option<String> {
        debug!("Reader proxy fallback for {}", url);
        let proxied = format!("{}/{}", self.reader_proxy_base, url);

        let response = self
            .client
            .get(&proxied)
            .header("X-With-Generated-Alt", "true")
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }

        let text = response.text().await.ok()?;
        if text.trim().is_empty() {
            return None;
        }

        Some(utils::truncate_chars(&text, MAX_CONTENT_CHARS).to_string())
    }
}
