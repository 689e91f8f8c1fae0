//! Plan supervisor: the ordered work queue and its routing rule.
//!
//! The plan is the single source of truth for "what happens next". The
//! supervisor is re-entered after every step, so a step that rewrites
//! `state.plan` changes the rest of the run; none does so in the default
//! flow, but the dispatch loop must not cache the queue.

use std::collections::VecDeque;
use std::fmt;

use crate::state::WorkflowState;

/// Closed set of step identifiers the supervisor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Interpret the free-text requirement into a `SanitizedConfig`.
    Parse,
    /// Collect per-ticker price snapshots.
    Price,
    /// Collect per-ticker headlines.
    News,
    /// Evaluate alert lines against the configured threshold.
    Judge,
    /// Compose the narrative brief.
    Brief,
    /// Deliver alerts and brief to the configured channel.
    Notify,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Parse => "parse",
            Step::Price => "price",
            Step::News => "news",
            Step::Judge => "judge",
            Step::Brief => "brief",
            Step::Notify => "notify",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the initial plan from which state fields are already populated.
///
/// Each of `parse`/`price`/`news` whose corresponding field is absent is
/// appended in that fixed relative order. The `judge` → `brief` → `notify`
/// tail always runs: alert evaluation and report composition are treated as
/// recomputable-on-demand, not cached results.
pub fn compute_initial_plan(state: &WorkflowState) -> VecDeque<Step> {
    let mut plan = VecDeque::new();
    if state.configuration.is_none() {
        plan.push_back(Step::Parse);
    }
    if state.snapshots.is_none() {
        plan.push_back(Step::Price);
    }
    if state.news_by_ticker.is_none() {
        plan.push_back(Step::News);
    }
    plan.extend([Step::Judge, Step::Brief, Step::Notify]);
    plan
}

/// Pop the next step off the plan.
///
/// `None` is the terminal sentinel; an empty plan is the sole termination
/// condition of a run.
pub fn next_step(state: &mut WorkflowState) -> Option<Step> {
    state.plan.pop_front()
}
