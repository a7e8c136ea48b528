use crate::sources::{listing, syndication};
use crate::types::{CuratorError, FetchConfig, RawItem, Result, Source, SourceHealth, Tier};
use crate::utils;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const FETCH_CONCURRENCY: usize = 8;

/// Outcome of a full fetch pass: fresh deduplicated items plus the
/// per-source health records.
pub struct FetchSummary {
    pub items: Vec<RawItem>,
    pub health: Vec<SourceHealth>,
}

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    listing_parser: listing::ListingParser,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            listing_parser: listing::ListingParser::new(),
        }
    }

    /// Fetch every source concurrently and return fresh, globally
    /// deduplicated items sorted newest-first. Order of source completion
    /// does not affect the output.
    pub async fn fetch_all(&self, sources: &[Source]) -> FetchSummary {
        let fetched_at = Utc::now();
        info!("Fetching {} sources", sources.len());

        let results: Vec<Vec<RawItem>> = stream::iter(sources)
            .map(|source| self.fetch_source(source, fetched_at))
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut items: Vec<RawItem> = results.into_iter().flatten().collect();
        let total = items.len();

        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        let items = dedupe_by_title(items);
        let deduped = items.len();
        let items = apply_freshness(items, fetched_at);

        info!(
            "{} items fetched, {} after title dedup, {} fresh",
            total,
            deduped,
            items.len()
        );

        let health = source_health(sources, &items);
        for record in &health {
            if record.found == 0 {
                warn!("Source returned no usable items: {}", record.source_name);
            } else {
                debug!("Source {}: {} items", record.source_name, record.found);
            }
        }

        FetchSummary { items, health }
    }

    /// Fetch a single source. Failures are contained: any error yields an
    /// empty result for this source only, never an aborted run.
    async fn fetch_source(&self, source: &Source, fetched_at: DateTime<Utc>) -> Vec<RawItem> {
        let outcome = if listing::is_community_source(&source.url) {
            self.fetch_listing(source, fetched_at).await
        } else {
            self.fetch_syndication(source, fetched_at).await
        };

        match outcome {
            Ok(items) => {
                info!("Pulled {} items from {}", items.len(), source.name);
                items
            }
            Err(e) => {
                warn!("Source {} failed: {}", source.name, e);
                Vec::new()
            }
        }
    }

    async fn fetch_syndication(
        &self,
        source: &Source,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<RawItem>> {
        let body = self.get_text(&source.url).await?;

        if syndication::is_blocked_response(&body) {
            warn!("Blocked response from {} (HTML instead of feed)", source.name);
            return Ok(Vec::new());
        }

        syndication::parse_items(&body, source, fetched_at, self.config.max_items_per_source)
    }

    async fn fetch_listing(
        &self,
        source: &Source,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<RawItem>> {
        let target = listing::listing_url(&source.url);
        let proxied = format!("{}/{}", self.config.reader_proxy_base, target);
        debug!("Fetching {} via reader proxy", source.name);

        let markdown = self.get_text(&proxied).await?;
        Ok(self
            .listing_parser
            .parse_posts(&markdown, source, fetched_at, self.config.max_items_per_source))
    }

    /// GET with bounded retries on transient failures.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        Url::parse(url)?;

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 8),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 30)),
            ..Default::default()
        };

        let mut last_error = CuratorError::General(format!("fetch failed: {}", url));

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.text().await?);
                }
                Ok(response) => {
                    last_error =
                        CuratorError::General(format!("HTTP {} from {}", response.status(), url));
                }
                Err(e) => {
                    last_error = CuratorError::Http(e);
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error)
    }
}

/// Keep only the first occurrence of each normalized title globally.
/// Items are expected newest-first, so the freshest copy wins.
pub fn dedupe_by_title(items: Vec<RawItem>) -> Vec<RawItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(utils::normalize_title(&item.title)))
        .collect()
}

/// Freshness window for a tier. Digest sources publish less often and get
/// a wider window.
pub fn freshness_window(tier: Tier) -> ChronoDuration {
    match tier {
        Tier::Digest => ChronoDuration::hours(48),
        _ => ChronoDuration::hours(24),
    }
}

/// Drop stale items. Future-dated timestamps are treated as fresh; items
/// with unparseable dates already carry the fetch time and pass through.
pub fn apply_freshness(items: Vec<RawItem>, now: DateTime<Utc>) -> Vec<RawItem> {
    items
        .into_iter()
        .filter(|item| {
            if item.published_at > now {
                return true;
            }
            item.published_at >= now - freshness_window(item.tier)
        })
        .collect()
}

/// Per-source item counts over the surviving set.
pub fn source_health(sources: &[Source], items: &[RawItem]) -> Vec<SourceHealth> {
    sources
        .iter()
        .map(|source| SourceHealth {
            source_name: source.name.clone(),
            found: items.iter().filter(|i| i.source_name == source.name).count(),
        })
        .collect()
}
