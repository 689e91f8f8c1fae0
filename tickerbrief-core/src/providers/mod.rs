//! External collaborator interfaces and their HTTP implementations.
//!
//! The traits abstract over the four external services (market data, news,
//! completion, notification) so the orchestration loop can be exercised with
//! mocks. Implementations handle the specifics of each upstream; collectors
//! catch `ProviderError` at their boundary and degrade, so the orchestration
//! core never observes a raw transport error.

pub mod notify;
pub mod openai;
pub mod yahoo;

use thiserror::Error;

use crate::state::NewsItem;

pub use notify::{ConsoleSink, DiscordSink, Notifier};
pub use openai::ChatCompletionClient;
pub use yahoo::{YahooMarketData, YahooNews};

/// Structured error for provider I/O.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("http status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("unexpected response shape: {0}")]
    ResponseFormat(String),

    #[error("provider rejected request: {code}: {description}")]
    Upstream { code: String, description: String },

    #[error("missing credentials: {0}")]
    Credentials(String),
}

/// Market-data provider: point-in-time price plus previous close.
///
/// `Ok(None)` means "unavailable" — the caller skips the ticker rather than
/// treating it as an error.
pub trait MarketData: Send + Sync {
    /// Last traded price at/near the given local wall-clock time.
    fn price_near(
        &self,
        ticker: &str,
        local_time_hhmm: &str,
        timezone: &str,
    ) -> Result<Option<f64>, ProviderError>;

    /// Previous session's closing price.
    fn previous_close(&self, ticker: &str) -> Result<Option<f64>, ProviderError>;
}

/// News provider: bounded, de-duplicated headlines per ticker.
pub trait NewsFeed: Send + Sync {
    fn headlines(&self, ticker: &str, top_k: usize) -> Result<Vec<NewsItem>, ProviderError>;
}

/// Language-model completion service.
///
/// An empty string signals failure; implementations never surface an error
/// to the caller.
pub trait Completion: Send + Sync {
    fn complete(&self, prompt: &str) -> String;
}

/// A notification channel endpoint. Returns delivery success.
pub trait NotifySink: Send + Sync {
    fn post(&self, text: &str) -> bool;
}
