use crate::types::{AggregatedStory, RunStats, SourceBreakdown};
use std::collections::HashMap;
use tracing::info;

/// Filters scored stories by the configured threshold and ranks them.
pub struct Selector {
    min_score: f64,
}

impl Selector {
    pub fn new(min_score: f64) -> Self {
        Self { min_score }
    }

    /// Keep stories at or above the threshold, sorted descending by final
    /// score. The sort is stable, so equal scores keep their relative
    /// order and re-running is idempotent.
    pub fn select(&self, stories: Vec<AggregatedStory>) -> Vec<AggregatedStory> {
        let total = stories.len();

        let mut selected: Vec<AggregatedStory> = stories
            .into_iter()
            .filter(|story| story.final_score >= self.min_score)
            .collect();

        selected.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        info!(
            "Selected {}/{} stories at threshold {}",
            selected.len(),
            total,
            self.min_score
        );

        selected
    }
}

/// Assemble run statistics; the per-source breakdown is sorted by kept
/// count descending.
pub fn run_stats(
    sources_analyzed: usize,
    total_articles_found: usize,
    articles_processed: usize,
    counts: HashMap<String, (usize, usize)>,
) -> RunStats {
    let mut breakdown: Vec<SourceBreakdown> = counts
        .into_iter()
        .map(|(source_name, (found, kept))| SourceBreakdown {
            source_name,
            found,
            kept,
        })
        .collect();

    breakdown.sort_by(|a, b| b.kept.cmp(&a.kept));

    RunStats {
        sources_analyzed,
        total_articles_found,
        articles_processed,
        breakdown,
    }
}
