use anyhow::Context;
use clap::Parser;
use news_curator::{
    CostLedger, CurationPipeline, ExtractionOracle, FetchConfig, MockOracle, OpenRouterOracle,
    PipelineConfig, ScoringConfig, SourceRegistry, TracingSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "news-curator", about = "Multi-source news curation pipeline")]
struct Args {
    /// JSON file with additional sources
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Minimum final score for a story to be shown
    #[arg(long)]
    min_score: Option<f64>,

    /// Extraction oracle model id
    #[arg(long)]
    model: Option<String>,

    /// Total extraction budget across all sources
    #[arg(long)]
    budget: Option<usize>,

    /// Run without an oracle credential; extraction degrades to passthrough
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    info!("Starting news curator");

    let mut registry = SourceRegistry::builtin();
    if let Some(path) = &args.sources {
        let custom = SourceRegistry::load_custom(path)
            .with_context(|| format!("Failed to load sources from {}", path.display()))?;
        registry = registry.with_custom(custom);
    }

    let oracle: Arc<dyn ExtractionOracle> = if args.offline {
        warn!("Offline mode: every item will pass through ungraded");
        Arc::new(MockOracle::failing())
    } else {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        Arc::new(
            OpenRouterOracle::new(api_key, args.model.clone())
                .context("OPENROUTER_API_KEY is not set")?,
        )
    };
    info!("Using extraction oracle: {}", oracle.oracle_name());

    let mut scoring = ScoringConfig::default();
    if let Some(min_score) = args.min_score {
        scoring.min_score_to_show = min_score;
    }

    let mut pipeline_config = PipelineConfig::default();
    if let Some(budget) = args.budget {
        pipeline_config.total_budget = budget;
    }

    let ledger = Arc::new(CostLedger::new());
    let pipeline = CurationPipeline::with_configs(
        registry,
        oracle,
        FetchConfig::default(),
        scoring,
        pipeline_config,
    )
    .with_progress(Arc::new(TracingSink))
    .with_meter(ledger.clone());

    let outcome = pipeline.run().await?;

    info!(
        "Curated {} stories from {} sources ({} articles found, {} processed)",
        outcome.stories.len(),
        outcome.stats.sources_analyzed,
        outcome.stats.total_articles_found,
        outcome.stats.articles_processed
    );

    for story in &outcome.stories {
        info!(
            "[{:.1}] {} — {} source(s) [{}]",
            story.final_score,
            story.headline,
            story.cross_source_count,
            story.boosts.join(", ")
        );
    }

    for entry in outcome.stats.breakdown.iter().take(10) {
        info!("  {}: found {}, kept {}", entry.source_name, entry.found, entry.kept);
    }

    info!(
        "Session oracle spend: ${:.4} across {} calls",
        ledger.total(),
        ledger.entry_count()
    );

    Ok(())
}
