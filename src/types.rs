use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority class of a content source. Drives the freshness window, the
/// extraction budget balancing, and the final tier-weight multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Tier {
    RealtimeSocial,
    Digest,
    News,
    Blog,
    Community,
}

impl From<u8> for Tier {
    fn from(value: u8) -> Self {
        match value {
            0 => Tier::RealtimeSocial,
            1 => Tier::Digest,
            2 => Tier::News,
            3 => Tier::Blog,
            4 => Tier::Community,
            _ => Tier::News,
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::RealtimeSocial => 0,
            Tier::Digest => 1,
            Tier::News => 2,
            Tier::Blog => 3,
            Tier::Community => 4,
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::News
    }
}

/// A configured content source. Immutable once the registry is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tier: Tier,
}

impl Source {
    pub fn new(name: &str, url: &str, category: &str, tier: Tier) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
            tier,
        }
    }
}

/// A normalized item as produced by the fetcher. Read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    /// Deterministic hash of (title, url); stable across runs.
    pub id: String,
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub published_at: DateTime<Utc>,
    pub summary: String,
    pub body_text: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub tier: Tier,
}

/// Story category as reported by the extraction oracle. Unknown values
/// decode to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    PriceMovement,
    ExchangeNews,
    DefiUpdate,
    NftNews,
    Regulation,
    SecurityBreach,
    Funding,
    Partnership,
    ProtocolUpgrade,
    MarketAnalysis,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PriceMovement => "price_movement",
            Category::ExchangeNews => "exchange_news",
            Category::DefiUpdate => "defi_update",
            Category::NftNews => "nft_news",
            Category::Regulation => "regulation",
            Category::SecurityBreach => "security_breach",
            Category::Funding => "funding",
            Category::Partnership => "partnership",
            Category::ProtocolUpgrade => "protocol_upgrade",
            Category::MarketAnalysis => "market_analysis",
            Category::Other => "other",
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "price_movement" => Category::PriceMovement,
            "exchange_news" => Category::ExchangeNews,
            "defi_update" => Category::DefiUpdate,
            "nft_news" => Category::NftNews,
            "regulation" => Category::Regulation,
            "security_breach" => Category::SecurityBreach,
            "funding" => Category::Funding,
            "partnership" => Category::Partnership,
            "protocol_upgrade" => Category::ProtocolUpgrade,
            "market_analysis" => Category::MarketAnalysis,
            _ => Category::Other,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_base_score() -> f64 {
    5.0
}

/// A single-source extraction result, before deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateStory {
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub original_url: Option<String>,
}

/// The deduplicated, cross-source-merged, scored unit of output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStory {
    pub id: Uuid,
    pub headline: String,
    pub summary: String,
    pub category: Category,
    pub base_score: f64,
    pub final_score: f64,
    pub entities: Vec<String>,
    pub original_url: Option<String>,
    /// Contributing source names in first-seen order, no duplicates.
    pub sources: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub cross_source_count: usize,
    /// Human-readable trace of every scoring adjustment, in applied order.
    pub boosts: Vec<String>,
    /// Tier of the originating item; consumed by scoring, not part of the
    /// serialized output.
    #[serde(skip)]
    pub tier: Tier,
}

/// Per-source observability record from a fetch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub source_name: String,
    pub found: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakdown {
    pub source_name: String,
    pub found: usize,
    pub kept: usize,
}

/// Aggregate statistics for a curation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub sources_analyzed: usize,
    pub total_articles_found: usize,
    pub articles_processed: usize,
    /// Sorted by kept count, descending.
    pub breakdown: Vec<SourceBreakdown>,
}

/// HTTP fetch behavior shared by the fetcher and the content resolver.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
    pub max_items_per_source: usize,
    /// Base URL of the reader proxy used for blocked publishers and as the
    /// content-resolution fallback.
    pub reader_proxy_base: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; NewsCurator/1.0)".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 2,
            max_redirects: 5,
            max_items_per_source: 10,
            reader_proxy_base: "https://r.jina.ai".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Extraction oracle error: {0}")]
    Oracle(String),

    #[error("No extraction credential configured")]
    MissingCredential,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, CuratorError>;
