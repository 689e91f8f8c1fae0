//! Snapshot and news collectors.
//!
//! Both collectors are total: a ticker whose data cannot be resolved is
//! skipped (prices) or mapped to an empty list (news), and provider errors
//! never escape past this boundary.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, warn};

use crate::providers::{MarketData, NewsFeed};
use crate::state::{NewsItem, TickerSnapshot};

/// Pause between per-ticker fetches, to stay friendly with the upstream
/// rate limits.
pub const FETCH_PAUSE: Duration = Duration::from_millis(300);

/// Collect one snapshot per ticker with usable data.
///
/// A ticker missing either price point is silently excluded — no error, no
/// placeholder. Percent change degrades to `0.0` when the previous close is
/// zero.
pub fn collect_snapshots(
    market: &dyn MarketData,
    tickers: &[String],
    timezone: &str,
    pause: Duration,
) -> Vec<TickerSnapshot> {
    let now_hhmm = Local::now().format("%H:%M").to_string();
    let mut snapshots = Vec::new();

    for (i, ticker) in tickers.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            thread::sleep(pause);
        }

        let price_now = match market.price_near(ticker, &now_hhmm, timezone) {
            Ok(Some(price)) => price,
            Ok(None) => {
                debug!(ticker = %ticker, "no intraday price; skipping");
                continue;
            }
            Err(error) => {
                warn!(ticker = %ticker, error = %error, "price fetch failed; skipping");
                continue;
            }
        };
        let prev_close = match market.previous_close(ticker) {
            Ok(Some(price)) => price,
            Ok(None) => {
                debug!(ticker = %ticker, "no previous close; skipping");
                continue;
            }
            Err(error) => {
                warn!(ticker = %ticker, error = %error, "previous close fetch failed; skipping");
                continue;
            }
        };

        let change_pct = if prev_close == 0.0 {
            0.0
        } else {
            (price_now - prev_close) / prev_close * 100.0
        };
        snapshots.push(TickerSnapshot {
            ticker: ticker.clone(),
            price_now,
            prev_close,
            change_pct,
        });
    }
    snapshots
}

/// Collect up to `top_k` de-duplicated headlines per ticker.
///
/// A failed fetch degrades to an empty list for that ticker.
pub fn collect_news(
    feed: &dyn NewsFeed,
    tickers: &[String],
    top_k: usize,
) -> BTreeMap<String, Vec<NewsItem>> {
    let mut news = BTreeMap::new();
    for ticker in tickers {
        let items = match feed.headlines(ticker, top_k) {
            Ok(items) => items,
            Err(error) => {
                warn!(ticker = %ticker, error = %error, "news fetch failed; continuing without headlines");
                Vec::new()
            }
        };
        news.insert(ticker.clone(), items);
    }
    news
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;

    /// Market stub: per-ticker canned price points.
    struct StubMarket {
        quotes: Vec<(&'static str, Option<f64>, Option<f64>)>,
        failing: Vec<&'static str>,
    }

    impl MarketData for StubMarket {
        fn price_near(
            &self,
            ticker: &str,
            _hhmm: &str,
            _tz: &str,
        ) -> Result<Option<f64>, ProviderError> {
            if self.failing.iter().any(|t| *t == ticker) {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok(self
                .quotes
                .iter()
                .find(|(t, _, _)| *t == ticker)
                .and_then(|(_, now, _)| *now))
        }

        fn previous_close(&self, ticker: &str) -> Result<Option<f64>, ProviderError> {
            Ok(self
                .quotes
                .iter()
                .find(|(t, _, _)| *t == ticker)
                .and_then(|(_, _, prev)| *prev))
        }
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn tickers_with_both_price_points_produce_snapshots() {
        let market = StubMarket {
            quotes: vec![("MSFT", Some(110.0), Some(100.0))],
            failing: vec![],
        };
        let snaps = collect_snapshots(&market, &tickers(&["MSFT"]), "UTC", Duration::ZERO);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].ticker, "MSFT");
        assert!((snaps[0].change_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_data_skips_the_ticker_without_error() {
        let market = StubMarket {
            quotes: vec![
                ("AAA", None, Some(100.0)),
                ("BBB", Some(50.0), None),
                ("CCC", Some(60.0), Some(50.0)),
            ],
            failing: vec![],
        };
        let snaps = collect_snapshots(
            &market,
            &tickers(&["AAA", "BBB", "CCC"]),
            "UTC",
            Duration::ZERO,
        );
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].ticker, "CCC");
    }

    #[test]
    fn provider_errors_degrade_to_skip() {
        let market = StubMarket {
            quotes: vec![("OK", Some(10.0), Some(10.0))],
            failing: vec!["BAD"],
        };
        let snaps = collect_snapshots(&market, &tickers(&["BAD", "OK"]), "UTC", Duration::ZERO);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].ticker, "OK");
    }

    #[test]
    fn zero_previous_close_yields_zero_change() {
        let market = StubMarket {
            quotes: vec![("XYZ", Some(10.0), Some(0.0))],
            failing: vec![],
        };
        let snaps = collect_snapshots(&market, &tickers(&["XYZ"]), "UTC", Duration::ZERO);
        assert_eq!(snaps[0].change_pct, 0.0);
    }

    #[test]
    fn snapshot_order_follows_input_ticker_order() {
        let market = StubMarket {
            quotes: vec![
                ("BBB", Some(1.0), Some(1.0)),
                ("AAA", Some(2.0), Some(2.0)),
            ],
            failing: vec![],
        };
        let snaps = collect_snapshots(&market, &tickers(&["BBB", "AAA"]), "UTC", Duration::ZERO);
        assert_eq!(snaps[0].ticker, "BBB");
        assert_eq!(snaps[1].ticker, "AAA");
    }

    struct StubFeed;

    impl NewsFeed for StubFeed {
        fn headlines(&self, ticker: &str, _top_k: usize) -> Result<Vec<NewsItem>, ProviderError> {
            if ticker == "ERR" {
                return Err(ProviderError::Network("timeout".into()));
            }
            Ok(vec![NewsItem {
                title: format!("{ticker} update"),
                link: String::new(),
            }])
        }
    }

    #[test]
    fn news_errors_degrade_to_empty_lists() {
        let news = collect_news(&StubFeed, &tickers(&["ERR", "MSFT"]), 5);
        assert_eq!(news["ERR"], Vec::<NewsItem>::new());
        assert_eq!(news["MSFT"].len(), 1);
    }
}
