use chrono::{Duration, Utc};
use news_curator::{
    balance_candidates, estimate_cost, run_stats, CostLedger, PipelineConfig, RawItem, Source,
    SourceRegistry, Tier, UsageEntry, UsageMeter,
};
use std::collections::HashMap;
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

fn item(source_name: &str, tier: Tier, index: usize, age_hours: i64) -> RawItem {
    let title = format!("{} story {}", source_name, index);
    let url = format!("https://example.com/{}/{}", source_name.replace(' ', "-"), index);
    RawItem {
        id: news_curator::utils::stable_id(&title, &url),
        title,
        url,
        source_name: source_name.to_string(),
        published_at: Utc::now() - Duration::hours(age_hours),
        summary: String::new(),
        body_text: None,
        image_url: None,
        author: None,
        tier,
    }
}

#[test]
fn digest_sources_fill_the_budget_first() {
    init_tracing();

    let mut items = Vec::new();
    for i in 0..8 {
        items.push(item("Milk Road", Tier::Digest, i, i as i64 + 1));
    }
    for i in 0..4 {
        items.push(item("CoinDesk", Tier::News, i, i as i64 + 1));
    }
    for i in 0..4 {
        items.push(item("r/Bitcoin", Tier::Community, i, i as i64 + 1));
    }

    let candidates = balance_candidates(&items, &PipelineConfig::default());

    // 5 from the digest source, 2 from each of the others
    assert_eq!(candidates.len(), 9);
    let digest_count = candidates.iter().filter(|i| i.tier == Tier::Digest).count();
    assert_eq!(digest_count, 5);

    // Digest items lead the processing order
    for candidate in candidates.iter().take(digest_count) {
        assert_eq!(candidate.tier, Tier::Digest);
    }
    // The remainder is ordered by publish time, newest first
    let rest: Vec<&RawItem> = candidates.iter().skip(digest_count).collect();
    for pair in rest.windows(2) {
        assert!(pair[0].published_at >= pair[1].published_at);
    }
}

#[test]
fn total_budget_is_a_hard_cap() {
    init_tracing();

    let mut items = Vec::new();
    for source_index in 0..25 {
        let name = format!("Source {}", source_index);
        for i in 0..3 {
            items.push(item(&name, Tier::News, i, i as i64 + 1));
        }
    }

    let config = PipelineConfig::default();
    let candidates = balance_candidates(&items, &config);
    assert_eq!(candidates.len(), config.total_budget);
}

#[test]
fn duplicate_urls_are_not_selected_twice() {
    init_tracing();

    let mut first = item("Milk Road", Tier::Digest, 0, 1);
    first.url = "https://example.com/shared".to_string();
    let mut second = item("CoinDesk", Tier::News, 0, 2);
    second.url = "https://example.com/shared".to_string();

    let candidates = balance_candidates(&[first, second], &PipelineConfig::default());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].source_name, "Milk Road");
}

#[test]
fn small_budgets_still_prefer_digest_items() {
    init_tracing();

    let mut items = Vec::new();
    for i in 0..5 {
        items.push(item("Milk Road", Tier::Digest, i, i as i64 + 1));
    }
    for i in 0..5 {
        items.push(item("CoinDesk", Tier::News, i, i as i64 + 1));
    }

    let config = PipelineConfig {
        total_budget: 6,
        ..PipelineConfig::default()
    };
    let candidates = balance_candidates(&items, &config);

    assert_eq!(candidates.len(), 6);
    assert_eq!(candidates.iter().filter(|i| i.tier == Tier::Digest).count(), 5);
}

#[test]
fn run_stats_breakdown_sorts_by_kept_descending() {
    init_tracing();

    let mut counts = HashMap::new();
    counts.insert("CoinDesk".to_string(), (6, 2));
    counts.insert("Milk Road".to_string(), (5, 5));
    counts.insert("Decrypt".to_string(), (3, 0));

    let stats = run_stats(3, 14, 7, counts);

    assert_eq!(stats.sources_analyzed, 3);
    assert_eq!(stats.total_articles_found, 14);
    assert_eq!(stats.articles_processed, 7);

    let names: Vec<&str> = stats.breakdown.iter().map(|b| b.source_name.as_str()).collect();
    assert_eq!(names, vec!["Milk Road", "CoinDesk", "Decrypt"]);
}

#[test]
fn cost_ledger_accumulates_session_spend() {
    init_tracing();

    let ledger = CostLedger::new();
    assert_eq!(ledger.entry_count(), 0);

    for _ in 0..3 {
        ledger.record(UsageEntry {
            label: "curate".to_string(),
            model: "google/gemini-2.0-flash-001".to_string(),
            cost: 0.01,
            input_tokens: 2_000,
            output_tokens: 500,
            at: Utc::now(),
        });
    }
    ledger.record(UsageEntry {
        label: "social-filter".to_string(),
        model: "google/gemini-2.0-flash-001".to_string(),
        cost: 0.002,
        input_tokens: 400,
        output_tokens: 50,
        at: Utc::now(),
    });

    assert_eq!(ledger.entry_count(), 4);
    assert!((ledger.total() - 0.032).abs() < 1e-9);

    let by_label = ledger.by_label();
    assert!((by_label["curate"] - 0.03).abs() < 1e-9);
    assert!((by_label["social-filter"] - 0.002).abs() < 1e-9);

    ledger.clear();
    assert_eq!(ledger.entry_count(), 0);
}

#[test]
fn cost_estimates_use_the_pricing_table() {
    init_tracing();

    // 1M input + 1M output tokens of gemini flash
    let known = estimate_cost("google/gemini-2.0-flash-001", 1_000_000, 1_000_000);
    assert!((known - 0.5).abs() < 1e-9);

    // Unknown models fall back to moderate pricing
    let unknown = estimate_cost("mystery/model", 1_000_000, 1_000_000);
    assert!((unknown - 6.0).abs() < 1e-9);
}

#[test]
fn registry_rejects_duplicate_names_and_knows_tiers() {
    init_tracing();

    let registry = SourceRegistry::builtin().with_custom(vec![
        Source::new("My Feed", "https://example.com/feed", "news", Tier::News),
        // Clashes with a built-in source name; the existing entry wins
        Source::new("CoinDesk", "https://elsewhere.example/rss", "news", Tier::Digest),
    ]);

    let coindesk: Vec<&Source> = registry
        .sources()
        .iter()
        .filter(|s| s.name == "CoinDesk")
        .collect();
    assert_eq!(coindesk.len(), 1);
    assert_eq!(coindesk[0].tier, Tier::News);

    assert_eq!(registry.tier_of("Milk Road"), Tier::Digest);
    assert_eq!(registry.tier_of("My Feed"), Tier::News);
    assert_eq!(registry.tier_of("Unknown Source"), Tier::News);

    info!("registry holds {} sources", registry.len());
}
