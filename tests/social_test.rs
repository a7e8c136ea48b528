use chrono::Utc;
use news_curator::{dedup_posts, MockOracle, SocialFilter, SocialPost};
use std::sync::Arc;
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

fn post(id: &str, headline: &str) -> SocialPost {
    SocialPost {
        id: id.to_string(),
        author: "X_Trending".to_string(),
        headline: headline.to_string(),
        url: String::new(),
        post_count: 0,
        published_at: Utc::now(),
    }
}

#[test]
fn near_duplicate_headlines_are_dropped() {
    init_tracing();

    let posts = vec![
        post("1", "Bitcoin breaks above 100k resistance today 🚀"),
        // Same normalized prefix once emoji and punctuation are stripped
        post("2", "Bitcoin breaks above 100k resistance today!!!"),
        // High word overlap with the first
        post("3", "Bitcoin breaks above 100k resistance level now"),
        post("4", "Ethereum gas fees drop sharply after upgrade"),
    ];

    let deduped = dedup_posts(posts);
    let ids: Vec<&str> = deduped.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
}

#[test]
fn distinct_headlines_survive_dedup() {
    init_tracing();

    let posts = vec![
        post("1", "SEC delays spot Solana ETF decision again"),
        post("2", "Major bank launches crypto custody service"),
        post("3", "DeFi protocol reports record weekly volume"),
    ];

    assert_eq!(dedup_posts(posts).len(), 3);
}

#[tokio::test]
async fn filter_keeps_only_the_indices_the_oracle_returns() {
    init_tracing();

    let posts = vec![
        post("keep-a", "Bitcoin ETF inflows hit weekly record"),
        post("spam", "DM me for guaranteed 100x gems 🚀🚀🚀"),
        post("keep-b", "EU parliament passes stablecoin framework"),
    ];

    let filter = SocialFilter::new(Arc::new(MockOracle::new("```json\n[0, 2]\n```")));
    let kept = filter.filter(posts).await;

    let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["keep-a", "keep-b"]);
}

#[tokio::test]
async fn out_of_range_indices_are_discarded() {
    init_tracing();

    let posts = vec![post("only", "Exchange announces proof of reserves audit")];

    let filter = SocialFilter::new(Arc::new(MockOracle::new("[0, 7, 12]")));
    let kept = filter.filter(posts).await;

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "only");
}

#[tokio::test]
async fn oracle_failure_keeps_every_post() {
    init_tracing();

    let posts = vec![
        post("1", "Bitcoin ETF inflows hit weekly record"),
        post("2", "EU parliament passes stablecoin framework"),
    ];

    let filter = SocialFilter::new(Arc::new(MockOracle::failing()));
    let kept = filter.filter(posts).await;
    assert_eq!(kept.len(), 2, "filtering fails open");

    let garbled = SocialFilter::new(Arc::new(MockOracle::new("no json here")));
    let posts = vec![post("1", "Bitcoin ETF inflows hit weekly record")];
    let kept = garbled.filter(posts).await;
    assert_eq!(kept.len(), 1);
    info!("fail-open filter kept {} posts", kept.len());
}
