use crate::config::ScoringConfig;
use crate::types::AggregatedStory;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Computes final scores from the configured policy tables. Steps apply in
/// a fixed order because the tier weight multiplies the running total.
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every story in place, attaching the adjustment trace.
    pub fn score_all(&self, stories: &mut [AggregatedStory], now: DateTime<Utc>) {
        for story in stories.iter_mut() {
            self.score(story, now);
        }
    }

    fn score(&self, story: &mut AggregatedStory, now: DateTime<Utc>) {
        let mut score = story.base_score;
        let mut boosts = Vec::new();

        // Cross-source confirmation
        if story.cross_source_count >= 3 {
            score += self.config.cross_source_boost.three_plus_sources;
            boosts.push(format!(
                "+{} (3+ sources)",
                self.config.cross_source_boost.three_plus_sources
            ));
        } else if story.cross_source_count >= 2 {
            score += self.config.cross_source_boost.two_sources;
            boosts.push(format!(
                "+{} (2 sources)",
                self.config.cross_source_boost.two_sources
            ));
        }

        if let Some(&boost) = self.config.category_boost.get(&story.category) {
            score += boost;
            boosts.push(format!("+{} ({})", boost, story.category));
        }

        let hours_ago = (now - story.published_at).num_minutes() as f64 / 60.0;
        if hours_ago < self.config.recency_boost_hours as f64 {
            score += 1.0;
            boosts.push("+1 (recent)".to_string());
        }

        let weight = self
            .config
            .tier_weight
            .get(&story.tier)
            .copied()
            .unwrap_or(1.0);
        if weight != 1.0 {
            score = (score * weight * 10.0).round() / 10.0;
            boosts.push(format!("×{} (tier {})", weight, u8::from(story.tier)));
        }

        story.final_score = score.min(10.0);
        story.boosts = boosts;

        debug!(
            "Scored '{}': base {} -> final {}",
            story.headline, story.base_score, story.final_score
        );
    }
}
