//! Tickerbrief Runner — run orchestration on top of `tickerbrief-core`.
//!
//! This crate wires real providers to the plan supervisor:
//! - Operator settings (notification channel credentials, provider knobs)
//! - The step dispatch loop driving one run to completion

pub mod runner;
pub mod settings;

pub use runner::{resume, run, RunContext, RunError};
pub use settings::{CompletionSettings, DiscordSettings, MarketSettings, Settings, SettingsError};
