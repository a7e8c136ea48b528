use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// One metered oracle invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub label: String,
    pub model: String,
    pub cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub at: DateTime<Utc>,
}

/// Injected collaborator the pipeline notifies after each oracle call.
/// Session accumulation lives here, outside the pipeline's own state.
pub trait UsageMeter: Send + Sync {
    fn record(&self, entry: UsageEntry);
}

/// Meter that discards every entry.
pub struct NullMeter;

impl UsageMeter for NullMeter {
    fn record(&self, _entry: UsageEntry) {}
}

/// Per-1M-token pricing (input, output) for known models.
fn model_pricing(model: &str) -> Option<(f64, f64)> {
    match model {
        "x-ai/grok-4.1-fast" => Some((0.20, 0.50)),
        "google/gemini-2.0-flash-001" => Some((0.10, 0.40)),
        "google/gemini-2.5-flash-preview" => Some((0.15, 0.60)),
        "anthropic/claude-3.5-sonnet" => Some((3.00, 15.00)),
        "openai/gpt-4o" => Some((2.50, 10.00)),
        "deepseek/deepseek-r1" => Some((0.55, 2.19)),
        _ => None,
    }
}

/// Estimate the cost of a call from token counts; unknown models fall
/// back to moderate pricing.
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let (input_rate, output_rate) = model_pricing(model).unwrap_or((1.0, 5.0));
    (input_tokens as f64 / 1_000_000.0) * input_rate
        + (output_tokens as f64 / 1_000_000.0) * output_rate
}

/// In-memory session ledger of oracle spend.
pub struct CostLedger {
    entries: Mutex<Vec<UsageEntry>>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn total(&self) -> f64 {
        self.entries
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .map(|e| e.cost)
            .sum()
    }

    pub fn by_label(&self) -> HashMap<String, f64> {
        let mut grouped = HashMap::new();
        for entry in self.entries.lock().expect("ledger lock poisoned").iter() {
            *grouped.entry(entry.label.clone()).or_insert(0.0) += entry.cost;
        }
        grouped
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("ledger lock poisoned").len()
    }

    pub fn clear(&self) {
        self.entries.lock().expect("ledger lock poisoned").clear();
    }
}

impl UsageMeter for CostLedger {
    fn record(&self, entry: UsageEntry) {
        self.entries.lock().expect("ledger lock poisoned").push(entry);
    }
}

impl Default for CostLedger {
    fn default() -> Self {
        Self::new()
    }
}
