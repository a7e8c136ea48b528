use crate::types::{AggregatedStory, CandidateStory, RawItem};
use crate::utils;
use tracing::debug;
use uuid::Uuid;

/// Similarity above which two headlines describe the same story.
const MERGE_THRESHOLD: f64 = 0.5;

/// Folds candidate stories into cross-source aggregated stories using
/// headline similarity. Stories are kept in creation order; the scan uses
/// a strict comparison so that ties at equal similarity resolve to the
/// earliest-created entry.
pub struct StoryAggregator {
    stories: Vec<AggregatedStory>,
}

impl StoryAggregator {
    pub fn new() -> Self {
        Self { stories: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Merge a candidate into the best-matching existing story, or create
    /// a new one when nothing exceeds the threshold.
    pub fn fold(&mut self, item: &RawItem, candidate: CandidateStory) {
        let mut matched: Option<usize> = None;
        let mut max_similarity = MERGE_THRESHOLD;

        for (index, existing) in self.stories.iter().enumerate() {
            let similarity = utils::jaccard_similarity(&candidate.headline, &existing.headline);
            if similarity > max_similarity {
                matched = Some(index);
                max_similarity = similarity;
            }
        }

        match matched {
            Some(index) => self.merge(index, item, candidate, max_similarity),
            None => self.create(item, candidate),
        }
    }

    fn merge(&mut self, index: usize, item: &RawItem, candidate: CandidateStory, similarity: f64) {
        let existing = &mut self.stories[index];
        debug!(
            "Merging '{}' into '{}' (similarity {:.2})",
            candidate.headline, existing.headline, similarity
        );

        if !existing.sources.contains(&item.source_name) {
            existing.sources.push(item.source_name.clone());
            existing.cross_source_count += 1;
        }

        // The higher-scored candidate's framing wins the display.
        if candidate.base_score > existing.base_score {
            existing.base_score = candidate.base_score;
            existing.headline = candidate.headline;
            existing.summary = candidate.summary;
        }
    }

    fn create(&mut self, item: &RawItem, candidate: CandidateStory) {
        self.stories.push(AggregatedStory {
            id: Uuid::new_v4(),
            headline: candidate.headline,
            summary: candidate.summary,
            category: candidate.category,
            base_score: candidate.base_score,
            final_score: 0.0,
            entities: candidate.entities,
            original_url: candidate.original_url,
            sources: vec![item.source_name.clone()],
            published_at: item.published_at,
            cross_source_count: 1,
            boosts: Vec::new(),
            tier: item.tier,
        });
    }

    pub fn into_stories(self) -> Vec<AggregatedStory> {
        self.stories
    }
}

impl Default for StoryAggregator {
    fn default() -> Self {
        Self::new()
    }
}
