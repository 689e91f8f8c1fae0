//! Yahoo Finance providers: intraday/daily prices from the v8 chart API and
//! headlines from the v1 search API.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; response parsing is deliberately tolerant and a ticker whose
//! data cannot be resolved degrades to "unavailable" upstream.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use super::{MarketData, NewsFeed, ProviderError};
use crate::state::NewsItem;

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_BASE: &str = "https://query1.finance.yahoo.com/v1/finance/search";

fn build_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .expect("failed to build HTTP client")
}

// ── chart API ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    timestamp: Option<Vec<i64>>,
    indicators: SeriesIndicators,
}

#[derive(Debug, Deserialize)]
struct SeriesIndicators {
    quote: Vec<SeriesQuote>,
}

#[derive(Debug, Deserialize)]
struct SeriesQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Timestamped closes in provider (ascending) order.
fn parse_chart(resp: ChartResponse) -> Result<Vec<(i64, f64)>, ProviderError> {
    let result = resp.chart.result.ok_or_else(|| {
        if let Some(err) = resp.chart.error {
            ProviderError::Upstream {
                code: err.code,
                description: err.description,
            }
        } else {
            ProviderError::ResponseFormat("empty chart result with no error".into())
        }
    })?;

    let series = match result.into_iter().next() {
        Some(series) => series,
        None => return Ok(Vec::new()),
    };
    let timestamps = series.timestamp.unwrap_or_default();
    let closes = series
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    Ok(timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| close.filter(|c| c.is_finite()).map(|c| (ts, c)))
        .collect())
}

/// Latest close on the target's local date, at or before the target instant.
fn last_close_at_or_before(bars: &[(i64, f64)], tz: Tz, target: DateTime<Tz>) -> Option<f64> {
    let target_date = target.date_naive();
    let target_ts = target.timestamp();
    bars.iter()
        .rev()
        .find(|(ts, _)| {
            *ts <= target_ts
                && DateTime::<Utc>::from_timestamp(*ts, 0)
                    .map(|dt| dt.with_timezone(&tz).date_naive())
                    == Some(target_date)
        })
        .map(|(_, close)| *close)
}

/// Market-data provider backed by the Yahoo v8 chart API.
pub struct YahooMarketData {
    client: reqwest::blocking::Client,
}

impl YahooMarketData {
    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }

    fn fetch_closes(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<(i64, f64)>, ProviderError> {
        let url = format!("{CHART_BASE}/{ticker}?range={range}&interval={interval}");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: url,
            });
        }
        let chart: ChartResponse = resp
            .json()
            .map_err(|e| ProviderError::ResponseFormat(format!("chart for {ticker}: {e}")))?;
        parse_chart(chart)
    }
}

impl Default for YahooMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketData for YahooMarketData {
    /// Today's intraday close at/near the given wall-clock time.
    ///
    /// Minute bars for the current session first; when that range comes back
    /// empty, one fallback attempt with five-minute bars over five days,
    /// still filtered to the target date.
    fn price_near(
        &self,
        ticker: &str,
        local_time_hhmm: &str,
        timezone: &str,
    ) -> Result<Option<f64>, ProviderError> {
        let Ok(tz) = timezone.parse::<Tz>() else {
            return Ok(None);
        };
        let Ok(time) = NaiveTime::parse_from_str(local_time_hhmm, "%H:%M") else {
            return Ok(None);
        };
        let Some(target) = Utc::now()
            .with_timezone(&tz)
            .date_naive()
            .and_time(time)
            .and_local_timezone(tz)
            .earliest()
        else {
            return Ok(None);
        };

        let mut bars = self.fetch_closes(ticker, "1d", "1m")?;
        if bars.is_empty() {
            bars = self.fetch_closes(ticker, "5d", "5m")?;
        }
        Ok(last_close_at_or_before(&bars, tz, target))
    }

    /// Close of the next-to-last daily bar; with a single bar, that bar's
    /// close.
    fn previous_close(&self, ticker: &str) -> Result<Option<f64>, ProviderError> {
        let closes = self.fetch_closes(ticker, "2d", "1d")?;
        Ok(match closes.len() {
            0 => None,
            1 => Some(closes[0].1),
            n => Some(closes[n - 2].1),
        })
    }
}

// ── search API ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Debug, Deserialize)]
struct SearchNewsItem {
    title: Option<String>,
    link: Option<String>,
}

/// Drop untitled items, de-duplicate by trimmed title keeping the first
/// occurrence, cap at `top_k`.
fn dedupe_headlines(items: Vec<SearchNewsItem>, top_k: usize) -> Vec<NewsItem> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for item in items {
        let Some(title) = item.title.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let key = title.trim().to_string();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(NewsItem {
            title,
            link: item.link.unwrap_or_default(),
        });
        if out.len() == top_k {
            break;
        }
    }
    out
}

/// News provider backed by the Yahoo v1 search API.
pub struct YahooNews {
    client: reqwest::blocking::Client,
}

impl YahooNews {
    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }
}

impl Default for YahooNews {
    fn default() -> Self {
        Self::new()
    }
}

impl NewsFeed for YahooNews {
    fn headlines(&self, ticker: &str, top_k: usize) -> Result<Vec<NewsItem>, ProviderError> {
        let url = format!("{SEARCH_BASE}?q={ticker}&quotesCount=0&newsCount={top_k}");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: url,
            });
        }
        let search: SearchResponse = resp
            .json()
            .map_err(|e| ProviderError::ResponseFormat(format!("news for {ticker}: {e}")))?;
        Ok(dedupe_headlines(search.news, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn chart_json(payload: &str) -> ChartResponse {
        serde_json::from_str(payload).expect("chart fixture parses")
    }

    #[test]
    fn parse_chart_pairs_timestamps_with_closes() {
        let resp = chart_json(
            r#"{"chart":{"result":[{"timestamp":[100,160,220],
                "indicators":{"quote":[{"close":[1.0,null,3.0]}]}}],"error":null}}"#,
        );
        assert_eq!(parse_chart(resp).unwrap(), vec![(100, 1.0), (220, 3.0)]);
    }

    #[test]
    fn parse_chart_surfaces_upstream_errors() {
        let resp = chart_json(
            r#"{"chart":{"result":null,
                "error":{"code":"Not Found","description":"No data found"}}}"#,
        );
        let err = parse_chart(resp).unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { .. }));
    }

    #[test]
    fn last_close_respects_target_date_and_time() {
        let tz: Tz = "America/Toronto".parse().unwrap();
        let target = tz.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap();
        let morning = tz.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap().timestamp();
        let late = tz.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap().timestamp();
        let yesterday = tz.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap().timestamp();

        let bars = vec![(yesterday, 90.0), (morning, 100.0), (late, 110.0)];
        assert_eq!(last_close_at_or_before(&bars, tz, target), Some(100.0));

        // Bars only from a previous date resolve to nothing.
        let stale = vec![(yesterday, 90.0)];
        assert_eq!(last_close_at_or_before(&stale, tz, target), None);
    }

    #[test]
    fn headlines_are_deduplicated_and_capped() {
        let items = vec![
            SearchNewsItem {
                title: Some("Earnings beat".to_string()),
                link: Some("https://a".to_string()),
            },
            SearchNewsItem {
                title: Some("Earnings beat ".to_string()),
                link: Some("https://b".to_string()),
            },
            SearchNewsItem {
                title: None,
                link: Some("https://c".to_string()),
            },
            SearchNewsItem {
                title: Some("Guidance raised".to_string()),
                link: None,
            },
            SearchNewsItem {
                title: Some("Third story".to_string()),
                link: Some("https://d".to_string()),
            },
        ];
        let news = dedupe_headlines(items, 2);
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].title, "Earnings beat");
        assert_eq!(news[0].link, "https://a");
        assert_eq!(news[1].title, "Guidance raised");
        assert_eq!(news[1].link, "");
    }
}
