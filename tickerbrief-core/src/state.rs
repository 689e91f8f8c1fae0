//! Per-run workflow state threaded through every plan step.
//!
//! One `WorkflowState` is owned exclusively by a single orchestration run and
//! discarded when the run ends. Steps mutate only the fields they own and the
//! supervisor mutates only `plan`.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::SanitizedConfig;
use crate::plan::Step;

/// One ticker's resolved price data.
///
/// A snapshot only exists when both price points resolved; there is no
/// partial or null-filled snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub price_now: f64,
    pub prev_close: f64,
    /// Signed percent change versus previous close; `0.0` when indeterminate.
    pub change_pct: f64,
}

/// A single headline. `title` is never empty; `link` may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
}

/// The mutable record threaded through every step of one run.
///
/// `snapshots` and `news_by_ticker` are `Option` because the initial-plan
/// rule keys on whether a field was ever populated, not on whether the
/// populated value is empty — a collector run that found nothing still
/// satisfies its prerequisite.
#[derive(Debug, Default)]
pub struct WorkflowState {
    /// Original user text; set once at construction, immutable thereafter.
    pub requirement: String,
    pub configuration: Option<SanitizedConfig>,
    /// One entry per ticker with usable data; missing-data tickers are omitted.
    pub snapshots: Option<Vec<TickerSnapshot>>,
    /// Per-ticker headlines, provider order after de-duplication, capped at top-K.
    pub news_by_ticker: Option<BTreeMap<String, Vec<NewsItem>>>,
    /// Rendered alert lines, following `snapshots` order.
    pub alerts: Vec<String>,
    /// Composed report text; empty until the brief step runs.
    pub brief: String,
    /// Remaining work queue; mutated by the supervisor only.
    pub plan: VecDeque<Step>,
}

impl WorkflowState {
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            ..Self::default()
        }
    }
}
