use crate::types::{Category, Source, Tier};
use std::collections::HashMap;

/// Built-in source table. Callers can extend or replace it through the
/// registry; tier assignments drive balancing, freshness, and weighting.
pub fn default_sources() -> Vec<Source> {
    vec![
        // Tier 1: newsletters, multiple stories per entry
        Source::new("Milk Road", "https://rss.beehiiv.com/feeds/v3hqiCe5Vw.xml", "newsletter", Tier::Digest),
        Source::new("Bankless", "https://rss.beehiiv.com/feeds/2aeCe5g0lR.xml", "newsletter", Tier::Digest),
        Source::new("The Defiant", "https://thedefiant.io/feed", "newsletter", Tier::Digest),
        Source::new("Blockworks Daily", "https://blockworks.co/feed", "newsletter", Tier::Digest),
        Source::new("TLDR Crypto", "https://tldr.tech/crypto/rss", "newsletter", Tier::Digest),
        Source::new("The Pomp Letter", "https://pomp.substack.com/feed", "newsletter", Tier::Digest),
        // Tier 2: news sites, single story per entry
        Source::new("CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/", "news", Tier::News),
        Source::new("Cointelegraph", "https://cointelegraph.com/rss", "news", Tier::News),
        Source::new("Decrypt", "https://decrypt.co/feed", "news", Tier::News),
        Source::new("The Block", "https://www.theblock.co/rss.xml", "news", Tier::News),
        Source::new("CryptoSlate", "https://cryptoslate.com/feed/", "news", Tier::News),
        Source::new("Bitcoin Magazine", "https://bitcoinmagazine.com/.rss/full/", "news", Tier::News),
        // Tier 3: official blogs and research
        Source::new("Ethereum Blog", "https://blog.ethereum.org/feed.xml", "blog", Tier::Blog),
        Source::new("a16z Crypto", "https://a16zcrypto.com/posts/feed/", "blog", Tier::Blog),
        Source::new("Messari Research", "https://messari.io/rss", "blog", Tier::Blog),
        // Tier 4: community
        Source::new(
            "Hacker News Crypto",
            "https://hnrss.org/newest?q=Bitcoin+OR+Ethereum+OR+crypto+OR+blockchain&points=50",
            "social",
            Tier::Community,
        ),
        Source::new("r/CryptoCurrency", "https://www.reddit.com/r/CryptoCurrency/top/.rss?t=day", "social", Tier::Community),
        Source::new("r/Bitcoin", "https://www.reddit.com/r/Bitcoin/top/.rss?t=day", "social", Tier::Community),
        Source::new("r/Ethereum", "https://www.reddit.com/r/ethereum/top/.rss?t=day", "social", Tier::Community),
        Source::new("r/CryptoMarkets", "https://www.reddit.com/r/CryptoMarkets/top/.rss?t=day", "social", Tier::Community),
        Source::new("r/defi", "https://www.reddit.com/r/defi/top/.rss?t=day", "social", Tier::Community),
    ]
}

#[derive(Debug, Clone)]
pub struct CrossSourceBoost {
    pub two_sources: f64,
    pub three_plus_sources: f64,
}

/// Scoring policy, passed into the scorer as data so it stays swappable
/// and independently testable.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub min_score_to_show: f64,
    pub cross_source_boost: CrossSourceBoost,
    pub category_boost: HashMap<Category, f64>,
    /// Stories newer than this get +1.
    pub recency_boost_hours: i64,
    pub tier_weight: HashMap<Tier, f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut category_boost = HashMap::new();
        category_boost.insert(Category::PriceMovement, 1.0);
        category_boost.insert(Category::Regulation, 1.0);
        category_boost.insert(Category::ExchangeNews, 1.0);
        category_boost.insert(Category::DefiUpdate, 1.0);
        // Hacks and exploits outrank everything else
        category_boost.insert(Category::SecurityBreach, 2.0);

        let mut tier_weight = HashMap::new();
        tier_weight.insert(Tier::Digest, 1.0);
        tier_weight.insert(Tier::News, 0.9);
        tier_weight.insert(Tier::Blog, 1.1);
        tier_weight.insert(Tier::Community, 0.8);
        tier_weight.insert(Tier::RealtimeSocial, 0.8);

        Self {
            min_score_to_show: 6.0,
            cross_source_boost: CrossSourceBoost {
                two_sources: 1.0,
                three_plus_sources: 2.0,
            },
            category_boost,
            recency_boost_hours: 12,
            tier_weight,
        }
    }
}

/// Task instructions for the extraction oracle.
pub const CURATION_PROMPT: &str = r#"You are an expert crypto news curator for a daily newsletter.
Target audience: retail crypto investors. They want to know "what happened" and "why it matters to their portfolio".

TASK: Analyze this content and extract individual news stories.

For EACH distinct news story, provide:
1. headline: Clear, engaging headline (max 12 words) - specific and punchy
2. summary: A 3-4 sentence explanation covering: WHAT happened? and WHY it matters to a crypto investor? Avoid excessive jargon.
3. category: One of [price_movement, exchange_news, defi_update, nft_news, regulation, security_breach, funding, partnership, protocol_upgrade, market_analysis]
4. baseScore: Score 1-10 based on importance to the general public:
   - 9-10: Major market events (BTC ATH, major exchange collapse, landmark regulation)
   - 7-8: Significant protocol updates, major exchange news, whale movements
   - 5-6: DeFi updates, new token launches, partnership announcements
   - 3-4: Minor altcoin news, NFT drops, community governance votes
   - 1-2: Spam, irrelevant, promotional only
5. entities: List of companies/products mentioned
6. originalUrl: Source URL if mentioned

RULES:
- Extract SEPARATE stories, not the whole newsletter
- Skip: job posts, sponsor sections, "also check out" links
- Max 6 stories per source

Return ONLY valid JSON array. No other text."#;
