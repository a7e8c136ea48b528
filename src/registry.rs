use crate::config;
use crate::types::{Result, Source, Tier};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Immutable list of content sources for a curation run, assembled at
/// startup from the built-in table plus any caller-supplied sources.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Source>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(sources.len());

        for source in sources {
            if !seen.insert(source.name.clone()) {
                warn!("Ignoring duplicate source name: {}", source.name);
                continue;
            }
            unique.push(source);
        }

        Self { sources: unique }
    }

    /// Registry with only the built-in source table.
    pub fn builtin() -> Self {
        Self::new(config::default_sources())
    }

    /// Merge additional sources into the registry; duplicate names keep
    /// the existing entry.
    pub fn with_custom(self, custom: Vec<Source>) -> Self {
        let mut merged = self.sources;
        merged.extend(custom);
        let registry = Self::new(merged);
        info!("Source registry holds {} sources", registry.len());
        registry
    }

    /// Load extra sources from a JSON file (array of source objects).
    pub fn load_custom(path: &Path) -> Result<Vec<Source>> {
        let raw = std::fs::read_to_string(path)?;
        let sources: Vec<Source> = serde_json::from_str(&raw)?;
        info!("Loaded {} custom sources from {}", sources.len(), path.display());
        Ok(sources)
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Tier of a source by name; unknown names fall back to the news tier.
    pub fn tier_of(&self, source_name: &str) -> Tier {
        self.sources
            .iter()
            .find(|s| s.name == source_name)
            .map(|s| s.tier)
            .unwrap_or_default()
    }
}
