use crate::aggregator::StoryAggregator;
use crate::config::ScoringConfig;
use crate::extractor::StoryExtractor;
use crate::fetcher::Fetcher;
use crate::metering::{self, NullMeter, UsageEntry, UsageMeter};
use crate::oracle::ExtractionOracle;
use crate::progress::{NullSink, ProgressEvent, ProgressSink};
use crate::registry::SourceRegistry;
use crate::resolver::ContentResolver;
use crate::scorer::Scorer;
use crate::selector::{self, Selector};
use crate::types::{AggregatedStory, FetchConfig, RawItem, Result, RunStats, Tier};
use crate::utils;
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Extraction budget policy.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Total extraction budget across all sources.
    pub total_budget: usize,
    /// Items taken from each digest-tier source before filling.
    pub digest_per_source: usize,
    /// Items taken from each non-digest source while budget remains.
    pub fill_quota: usize,
    /// Courtesy delay between oracle calls.
    pub extraction_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            total_budget: 30,
            digest_per_source: 5,
            fill_quota: 2,
            extraction_delay_ms: 300,
        }
    }
}

/// Final output of a curation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationOutcome {
    pub stories: Vec<AggregatedStory>,
    pub stats: RunStats,
}

/// The full curation pass: fetch, balance, extract, aggregate, score,
/// select. Single-pass and stateless; dropping the returned future
/// abandons the run and discards partial state.
pub struct CurationPipeline {
    registry: SourceRegistry,
    fetcher: Fetcher,
    extractor: StoryExtractor,
    scorer: Scorer,
    selector: Selector,
    config: PipelineConfig,
    oracle_model: String,
    progress: Arc<dyn ProgressSink>,
    meter: Arc<dyn UsageMeter>,
}

impl CurationPipeline {
    pub fn new(registry: SourceRegistry, oracle: Arc<dyn ExtractionOracle>) -> Self {
        Self::with_configs(
            registry,
            oracle,
            FetchConfig::default(),
            ScoringConfig::default(),
            PipelineConfig::default(),
        )
    }

    pub fn with_configs(
        registry: SourceRegistry,
        oracle: Arc<dyn ExtractionOracle>,
        fetch_config: FetchConfig,
        scoring: ScoringConfig,
        config: PipelineConfig,
    ) -> Self {
        let fetcher = Fetcher::new(fetch_config.clone());
        let resolver = ContentResolver::new(&fetch_config);
        let oracle_model = oracle.model_id();
        let selector = Selector::new(scoring.min_score_to_show);

        Self {
            registry,
            fetcher,
            extractor: StoryExtractor::new(oracle, resolver),
            scorer: Scorer::new(scoring),
            selector,
            config,
            oracle_model,
            progress: Arc::new(NullSink),
            meter: Arc::new(NullMeter),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_meter(mut self, meter: Arc<dyn UsageMeter>) -> Self {
        self.meter = meter;
        self
    }

    pub async fn run(&self) -> Result<CurationOutcome> {
        let sources = self.registry.sources();
        self.progress.report(&ProgressEvent::Fetching {
            total_sources: sources.len(),
        });

        let summary = self.fetcher.fetch_all(sources).await;
        let total_found = summary.items.len();

        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for record in &summary.health {
            counts.insert(record.source_name.clone(), (record.found, 0));
        }

        let candidates = balance_candidates(&summary.items, &self.config);
        let total = candidates.len();
        info!("Processing {} of {} items under budget", total, total_found);

        // The aggregated collection is mutated only inside this sequential
        // loop; there is exactly one writer.
        let mut aggregator = StoryAggregator::new();

        for (index, item) in candidates.iter().enumerate() {
            if let Some(entry) = counts.get_mut(&item.source_name) {
                entry.1 += 1;
            }

            self.progress.report(&ProgressEvent::Extracting {
                current: index + 1,
                total,
                message: format!(
                    "Analyzing [{}] {}...",
                    item.source_name,
                    utils::truncate_chars(&item.title, 30)
                ),
            });

            let extraction = self.extractor.extract(item).await;

            if let Some(usage) = &extraction.usage {
                self.meter.record(UsageEntry {
                    label: "curate".to_string(),
                    model: self.oracle_model.clone(),
                    cost: metering::estimate_cost(
                        &self.oracle_model,
                        usage.input_tokens,
                        usage.output_tokens,
                    ),
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                    at: Utc::now(),
                });
            }

            for candidate in extraction.stories {
                aggregator.fold(item, candidate);
            }

            // Courtesy delay toward the oracle, skipped after the last item
            if index + 1 < total && self.config.extraction_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.extraction_delay_ms)).await;
            }
        }

        self.progress.report(&ProgressEvent::Scoring);
        let mut stories = aggregator.into_stories();
        self.scorer.score_all(&mut stories, Utc::now());

        let stories = self.selector.select(stories);
        self.progress.report(&ProgressEvent::Done {
            count: stories.len(),
        });

        let stats = selector::run_stats(sources.len(), total_found, total, counts);

        Ok(CurationOutcome { stories, stats })
    }
}

/// Select extraction candidates under the budget: every digest-tier source
/// contributes its most recent items first, then the remaining tiers fill
/// at a smaller per-source quota until the budget is exhausted. Digest
/// items lead the processing order, the remainder follows by publish time
/// descending.
pub fn balance_candidates(items: &[RawItem], config: &PipelineConfig) -> Vec<RawItem> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_source: HashMap<&str, Vec<&RawItem>> = HashMap::new();

    for item in items {
        let bucket = by_source.entry(item.source_name.as_str()).or_default();
        if bucket.is_empty() {
            order.push(item.source_name.as_str());
        }
        bucket.push(item);
    }

    for bucket in by_source.values_mut() {
        bucket.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }

    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<RawItem> = Vec::new();

    // Digest sources first, in full (bounded per source)
    for name in &order {
        let bucket = &by_source[name];
        if bucket.first().map(|i| i.tier) != Some(Tier::Digest) {
            continue;
        }
        for item in bucket.iter().take(config.digest_per_source) {
            if seen_urls.insert(item.url.as_str()) {
                candidates.push((*item).clone());
            }
        }
    }

    // Fill the remaining budget from the other tiers
    for name in &order {
        if candidates.len() >= config.total_budget {
            break;
        }
        let bucket = &by_source[name];
        if bucket.first().map(|i| i.tier) == Some(Tier::Digest) {
            continue;
        }
        for item in bucket.iter().take(config.fill_quota) {
            if candidates.len() >= config.total_budget {
                break;
            }
            if seen_urls.insert(item.url.as_str()) {
                candidates.push((*item).clone());
            }
        }
    }

    candidates.sort_by(|a, b| {
        let a_digest = a.tier == Tier::Digest;
        let b_digest = b.tier == Tier::Digest;
        match (a_digest, b_digest) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => b.published_at.cmp(&a.published_at),
        }
    });

    candidates.truncate(config.total_budget);
    candidates
}
