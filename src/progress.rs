use serde::Serialize;
use tracing::info;

/// Stage transitions emitted while a curation run executes. Observational
/// only; sinks cannot influence the pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    Fetching { total_sources: usize },
    Extracting { current: usize, total: usize, message: String },
    Scoring,
    Done { count: usize },
}

/// Observer for pipeline progress.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

/// Sink that discards every event.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Sink that logs events through tracing.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Fetching { total_sources } => {
                info!("Fetching news from {} sources...", total_sources);
            }
            ProgressEvent::Extracting { current, total, message } => {
                info!("[{}/{}] {}", current, total, message);
            }
            ProgressEvent::Scoring => {
                info!("Calculating final scores...");
            }
            ProgressEvent::Done { count } => {
                info!("Found {} curated stories", count);
            }
        }
    }
}
