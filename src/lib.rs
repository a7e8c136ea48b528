pub mod aggregator;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod metering;
pub mod oracle;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod scorer;
pub mod selector;
pub mod social;
pub mod sources;
pub mod types;
pub mod utils;

pub use aggregator::StoryAggregator;
pub use config::{default_sources, CrossSourceBoost, ScoringConfig, CURATION_PROMPT};
pub use extractor::{parse_candidates, passthrough, Extraction, StoryExtractor};
pub use fetcher::{FetchSummary, Fetcher};
pub use metering::{estimate_cost, CostLedger, NullMeter, UsageEntry, UsageMeter};
pub use oracle::{ExtractionOracle, MockOracle, OpenRouterOracle, OracleCompletion, OracleUsage};
pub use pipeline::{balance_candidates, CurationOutcome, CurationPipeline, PipelineConfig};
pub use progress::{NullSink, ProgressEvent, ProgressSink, TracingSink};
pub use registry::SourceRegistry;
pub use resolver::ContentResolver;
pub use scorer::Scorer;
pub use selector::{run_stats, Selector};
pub use social::{dedup_posts, SocialFilter, SocialPost};
pub use types::*;
