use chrono::{Duration, Utc};
use news_curator::fetcher::{apply_freshness, dedupe_by_title, freshness_window, source_health};
use news_curator::sources::listing::{is_community_source, listing_url, ListingParser};
use news_curator::sources::syndication::{is_blocked_response, parse_items};
use news_curator::types::{RawItem, Source, Tier};
use news_curator::utils;
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

const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Crypto Wire</title>
    <item>
      <title>Bitcoin hits new high &amp; markets react</title>
      <link>https://example.com/btc-high</link>
      <description><![CDATA[<p>Bitcoin rallied past its previous peak as &quot;institutional&quot; buyers stepped in.</p>]]></description>
      <pubDate>Mon, 03 Aug 2026 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/second</link>
      <description>Short note.</description>
      <pubDate>Mon, 03 Aug 2026 11:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Protocol Updates</title>
  <id>urn:uuid:feed</id>
  <updated>2026-08-03T00:00:00Z</updated>
  <entry>
    <title>Ethereum upgrade ships on mainnet</title>
    <id>urn:uuid:entry-1</id>
    <link href="https://example.com/eth-upgrade"/>
    <updated>2026-08-03T00:00:00Z</updated>
    <summary>The long-awaited upgrade is live.</summary>
  </entry>
</feed>"#;

fn test_source(name: &str, url: &str, tier: Tier) -> Source {
    Source::new(name, url, "news", tier)
}

fn item_with(title: &str, url: &str, source_name: &str, tier: Tier, age_hours: i64) -> RawItem {
    RawItem {
        id: utils::stable_id(title, url),
        title: title.to_string(),
        url: url.to_string(),
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
fn parses_item_based_syndication() {
    init_tracing();

    let source = test_source("Crypto Wire", "https://example.com/feed", Tier::News);
    let items = parse_items(RSS_SAMPLE, &source, Utc::now(), 10).expect("feed should parse");

    assert_eq!(items.len(), 2);
    let first = &items[0];
    assert_eq!(first.title, "Bitcoin hits new high & markets react");
    assert_eq!(first.url, "https://example.com/btc-high");
    assert_eq!(first.source_name, "Crypto Wire");
    assert_eq!(first.tier, Tier::News);
    assert!(first.summary.contains("institutional"));
    assert!(!first.summary.contains('<'), "markup must be stripped");
    info!("parsed summary: {}", first.summary);
}

#[test]
fn parses_entry_based_syndication() {
    init_tracing();

    let source = test_source("Protocol Updates", "https://example.com/atom", Tier::Blog);
    let items = parse_items(ATOM_SAMPLE, &source, Utc::now(), 10).expect("feed should parse");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Ethereum upgrade ships on mainnet");
    assert_eq!(items[0].url, "https://example.com/eth-upgrade");
    assert_eq!(items[0].tier, Tier::Blog);
}

#[test]
fn entry_cap_is_enforced() {
    init_tracing();

    let source = test_source("Crypto Wire", "https://example.com/feed", Tier::News);
    let items = parse_items(RSS_SAMPLE, &source, Utc::now(), 1).expect("feed should parse");
    assert_eq!(items.len(), 1);
}

#[test]
fn blocked_html_pages_are_detected() {
    init_tracing();

    assert!(is_blocked_response("<!DOCTYPE html>\n<head></head>"));
    assert!(is_blocked_response("<html><body>You've been blocked</body></html>"));
    assert!(!is_blocked_response(RSS_SAMPLE));
    assert!(!is_blocked_response(ATOM_SAMPLE));
}

#[test]
fn raw_item_ids_are_stable() {
    init_tracing();

    let a = utils::stable_id("BTC hits 100k", "https://x/y");
    let b = utils::stable_id("BTC hits 100k", "https://x/y");
    assert_eq!(a, b);

    let c = utils::stable_id("BTC hits 100k", "https://x/z");
    assert_ne!(a, c);
}

#[test]
fn clean_text_strips_markup_and_decodes_entities() {
    init_tracing();

    assert_eq!(
        utils::clean_text("<p>Rates &amp; <b>bonds</b></p>"),
        "Rates & bonds"
    );
    assert_eq!(utils::clean_text("a\n\n  b\t c"), "a b c");
    assert_eq!(utils::clean_text("&quot;quoted&quot;"), "\"quoted\"");
}

#[test]
fn title_collisions_keep_only_the_first_occurrence() {
    init_tracing();

    let items = vec![
        item_with("Bitcoin ETF approved!", "https://a.example/1", "CoinDesk", Tier::News, 1),
        item_with("Bitcoin ETF Approved", "https://b.example/2", "Decrypt", Tier::News, 2),
        item_with("Something else entirely", "https://c.example/3", "The Block", Tier::News, 3),
    ];

    let deduped = dedupe_by_title(items);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].source_name, "CoinDesk");
}

#[test]
fn freshness_window_depends_on_tier() {
    init_tracing();

    assert_eq!(freshness_window(Tier::Digest), Duration::hours(48));
    assert_eq!(freshness_window(Tier::News), Duration::hours(24));
    assert_eq!(freshness_window(Tier::Community), Duration::hours(24));

    let now = Utc::now();
    let items = vec![
        item_with("fresh news story", "https://a/1", "CoinDesk", Tier::News, 2),
        item_with("stale news story", "https://a/2", "CoinDesk", Tier::News, 30),
        item_with("digest still fresh", "https://a/3", "Milk Road", Tier::Digest, 30),
        item_with("digest too old", "https://a/4", "Milk Road", Tier::Digest, 50),
    ];
    let mut future = item_with("future dated story", "https://a/5", "CoinDesk", Tier::News, 0);
    future.published_at = now + Duration::hours(3);
    let mut items = items;
    items.push(future);

    let fresh = apply_freshness(items, now);
    let titles: Vec<&str> = fresh.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["fresh news story", "digest still fresh", "future dated story"]
    );
}

#[test]
fn zero_count_sources_appear_in_health() {
    init_tracing();

    let sources = vec![
        test_source("CoinDesk", "https://a/feed", Tier::News),
        test_source("Decrypt", "https://b/feed", Tier::News),
    ];
    let items = vec![item_with("only one story", "https://a/1", "CoinDesk", Tier::News, 1)];

    let health = source_health(&sources, &items);
    assert_eq!(health.len(), 2);
    assert_eq!(health[0].found, 1);
    assert_eq!(health[1].found, 0, "empty sources are still reported");
}

#[test]
fn community_sources_are_routed_to_the_reader_proxy() {
    init_tracing();

    assert!(is_community_source("https://www.reddit.com/r/Bitcoin/top/.rss?t=day"));
    assert!(is_community_source("https://old.reddit.com/r/defi.rss"));
    assert!(!is_community_source("https://cointelegraph.com/rss"));

    assert_eq!(
        listing_url("https://www.reddit.com/r/CryptoCurrency/top/.rss?t=day"),
        "https://www.reddit.com/r/CryptoCurrency/top?t=day"
    );
}

#[test]
fn listing_parser_extracts_title_url_and_synopsis() {
    init_tracing();

    let markdown = "\
Community front page
[Whale moves 40k BTC to exchange](https://www.reddit.com/r/CryptoCurrency/comments/abc/whale_moves/)
Posted by u/someone 5 hours ago
Large transfer spotted on chain, discussion inside.
[ETH staking guide updated](https://reddit.com/r/ethereum/comments/def/guide/)
The community wiki got a refresh.
";

    let parser = ListingParser::new();
    let source = test_source("r/CryptoCurrency", "https://www.reddit.com/r/CryptoCurrency/top/.rss", Tier::Community);
    let posts = parser.parse_posts(markdown, &source, Utc::now(), 10);

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Whale moves 40k BTC to exchange");
    assert_eq!(
        posts[0].url,
        "https://www.reddit.com/r/CryptoCurrency/comments/abc/whale_moves/"
    );
    assert!(posts[0].summary.contains("Large transfer spotted"));
    assert_eq!(posts[1].title, "ETH staking guide updated");
    assert_eq!(posts[1].tier, Tier::Community);
}

#[test]
fn listing_parser_respects_the_item_cap() {
    init_tracing();

    let mut markdown = String::new();
    for i in 0..15 {
        markdown.push_str(&format!(
            "[Post number {}](https://www.reddit.com/r/Bitcoin/comments/p{}/)\nbody text\n",
            i, i
        ));
    }

    let parser = ListingParser::new();
    let source = test_source("r/Bitcoin", "https://www.reddit.com/r/Bitcoin/.rss", Tier::Community);
    let posts = parser.parse_posts(&markdown, &source, Utc::now(), 10);
    assert_eq!(posts.len(), 10);
}
