use crate::config;
use crate::oracle::{ExtractionOracle, OracleUsage};
use crate::resolver::ContentResolver;
use crate::types::{CandidateStory, Category, RawItem, Result};
use crate::utils;
use std::sync::Arc;
use tracing::{debug, warn};

/// Content shorter than this goes through the ungraded passthrough.
const MIN_CONTENT_CHARS: usize = 100;
/// Below this we try to resolve fuller text before extraction.
const RESOLVE_THRESHOLD: usize = 500;
const EXCERPT_CHARS: usize = 10_000;
const MAX_STORIES_PER_ITEM: usize = 6;

/// What one extraction produced: candidate stories plus the oracle usage
/// when a call was made.
pub struct Extraction {
    pub stories: Vec<CandidateStory>,
    pub usage: Option<OracleUsage>,
}

pub struct StoryExtractor {
    oracle: Arc<dyn ExtractionOracle>,
    resolver: ContentResolver,
}

impl StoryExtractor {
    pub fn new(oracle: Arc<dyn ExtractionOracle>, resolver: ContentResolver) -> Self {
        Self { oracle, resolver }
    }

    /// Turn a raw item into candidate stories. Never fails: oracle and
    /// content problems degrade to the single-story passthrough.
    pub async fn extract(&self, item: &RawItem) -> Extraction {
        let mut content = item.body_text.clone().unwrap_or_default();
        if content.is_empty() {
            content = item.summary.clone();
        }

        if content.len() < RESOLVE_THRESHOLD && !item.url.is_empty() {
            let resolved = self.resolver.resolve(&item.url).await;
            if !resolved.is_empty() {
                content = resolved;
            }
        }

        if content.len() < MIN_CONTENT_CHARS {
            debug!("Insufficient content for '{}', passing through", item.title);
            return Extraction {
                stories: vec![passthrough(item)],
                usage: None,
            };
        }

        let prompt = build_prompt(item, &content);

        match self.oracle.complete(&prompt).await {
            Ok(completion) => {
                let stories = match parse_candidates(&completion.text) {
                    Ok(mut stories) => {
                        stories.truncate(MAX_STORIES_PER_ITEM);
                        stories
                    }
                    Err(e) => {
                        warn!("Unparseable oracle reply for '{}': {}", item.title, e);
                        vec![passthrough(item)]
                    }
                };
                Extraction {
                    stories,
                    usage: Some(completion.usage),
                }
            }
            Err(e) => {
                warn!("Oracle call failed for '{}': {}", item.title, e);
                Extraction {
                    stories: vec![passthrough(item)],
                    usage: None,
                }
            }
        }
    }
}

/// Degraded single-story result built from the item's own title/summary.
pub fn passthrough(item: &RawItem) -> CandidateStory {
    CandidateStory {
        headline: item.title.clone(),
        summary: if item.summary.is_empty() {
            item.title.clone()
        } else {
            item.summary.clone()
        },
        category: Category::Other,
        base_score: 5.0,
        entities: Vec::new(),
        original_url: if item.url.is_empty() {
            None
        } else {
            Some(item.url.clone())
        },
    }
}

fn build_prompt(item: &RawItem, content: &str) -> String {
    format!(
        "{}\n\nSOURCE: {}\nTITLE: {}\nDATE: {}\n\nCONTENT:\n{}\n\nReturn JSON array only.",
        config::CURATION_PROMPT,
        item.source_name,
        item.title,
        item.published_at.to_rfc3339(),
        utils::truncate_chars(content, EXCERPT_CHARS),
    )
}

/// Defensively decode an oracle reply into candidate stories.
pub fn parse_candidates(reply: &str) -> Result<Vec<CandidateStory>> {
    let cleaned = utils::strip_code_fences(reply);
    Ok(serde_json::from_str(&cleaned)?)
}
