//! Tickerbrief Core — plan supervisor, configuration sanitization,
//! collectors, and provider interfaces.
//!
//! This crate contains the heart of the monitoring agent:
//! - Workflow state threaded through one run
//! - Plan supervisor (initial-plan rule and step dispatch queue)
//! - Configuration sanitization over untrusted extraction output
//! - Requirement interpretation with best-effort JSON recovery
//! - Snapshot/news collectors with degrade-to-skip semantics
//! - Alert evaluation and report context composition
//! - Provider traits plus the Yahoo Finance, chat-completion, and Discord
//!   implementations

pub mod alert;
pub mod collect;
pub mod config;
pub mod interpret;
pub mod plan;
pub mod providers;
pub mod report;
pub mod state;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types shared across the run boundary are
    /// Send + Sync, so a future scheduler can move runs onto worker threads
    /// without a retrofit.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<state::WorkflowState>();
        require_send::<state::TickerSnapshot>();
        require_sync::<state::TickerSnapshot>();
        require_send::<state::NewsItem>();
        require_sync::<state::NewsItem>();
        require_send::<config::SanitizedConfig>();
        require_sync::<config::SanitizedConfig>();
        require_send::<plan::Step>();
        require_sync::<plan::Step>();
        require_send::<providers::Notifier>();
        require_sync::<providers::Notifier>();
    }
}
