//! Report composition: deterministic context block, completion prompt, and
//! the fallback rendering used when the completion service returns nothing.
//!
//! Everything here is pure. The narrative text itself is the only
//! non-deterministic part of a report, and it comes from the completion
//! service; the structured context it is built from is reproducible from the
//! same snapshots and news.

use std::collections::BTreeMap;

use crate::config::ReportLanguage;
use crate::state::{NewsItem, TickerSnapshot};

pub const EMPTY_CONTEXT: &str = "No price snapshot.";
const FALLBACK_TRAILER: &str = "No price snapshot provided, cannot generate summary.";

/// One line per snapshot, each followed by that ticker's indented headlines.
pub fn context_lines(
    snapshots: &[TickerSnapshot],
    news_by_ticker: &BTreeMap<String, Vec<NewsItem>>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for snap in snapshots {
        lines.push(format!(
            "{}: now={:.2}, prev_close={:.2}, change={:.2}%",
            snap.ticker, snap.price_now, snap.prev_close, snap.change_pct
        ));
        if let Some(items) = news_by_ticker.get(&snap.ticker) {
            for item in items {
                lines.push(format!("  - {} ({})", item.title, item.link));
            }
        }
    }
    lines
}

/// Join the context lines, or the fixed empty-context marker.
pub fn build_context(lines: &[String]) -> String {
    if lines.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        lines.join("\n")
    }
}

/// Prompt asking the completion service for a factual, advice-free narrative
/// emphasizing moves beyond the alert threshold, in the configured language.
pub fn build_report_prompt(context: &str, threshold: f64, language: ReportLanguage) -> String {
    format!(
        "Write a concise end-of-day style report for the following tickers.\n\
         For each ticker, summarize news briefs with corresponding links.\n\
         Emphasize any move beyond ±{threshold:.1}%. Be neutral and factual. Avoid investment advice.\n\
         \n\
         DATA:\n\
         {context}\n\
         \n\
         Output in {lang}, use clear bullets and a one-line summary at the end.\n",
        lang = language.code(),
    )
}

/// Deterministic rendering used when the completion service returns an
/// empty or whitespace-only reply. The composed report is never empty.
pub fn fallback_brief(lines: &[String]) -> String {
    let bullets = if lines.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        lines
            .iter()
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{bullets}\n{FALLBACK_TRAILER}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> (Vec<TickerSnapshot>, BTreeMap<String, Vec<NewsItem>>) {
        let snapshots = vec![
            TickerSnapshot {
                ticker: "MSFT".to_string(),
                price_now: 420.5,
                prev_close: 400.0,
                change_pct: 5.125,
            },
            TickerSnapshot {
                ticker: "META".to_string(),
                price_now: 500.0,
                prev_close: 510.0,
                change_pct: -1.9608,
            },
        ];
        let mut news = BTreeMap::new();
        news.insert(
            "MSFT".to_string(),
            vec![NewsItem {
                title: "Quarterly results beat estimates".to_string(),
                link: "https://example.com/msft".to_string(),
            }],
        );
        (snapshots, news)
    }

    #[test]
    fn context_interleaves_snapshots_and_headlines() {
        let (snapshots, news) = sample_inputs();
        let lines = context_lines(&snapshots, &news);
        assert_eq!(
            lines,
            [
                "MSFT: now=420.50, prev_close=400.00, change=5.13%",
                "  - Quarterly results beat estimates (https://example.com/msft)",
                "META: now=500.00, prev_close=510.00, change=-1.96%",
            ]
        );
    }

    #[test]
    fn empty_inputs_render_the_fixed_marker() {
        assert_eq!(build_context(&[]), EMPTY_CONTEXT);
    }

    #[test]
    fn prompt_carries_threshold_language_and_context() {
        let prompt = build_report_prompt("MSFT: now=1.00", 4.0, ReportLanguage::En);
        assert!(prompt.contains("±4.0%"));
        assert!(prompt.contains("Output in en"));
        assert!(prompt.contains("MSFT: now=1.00"));
    }

    #[test]
    fn fallback_is_never_empty() {
        let (snapshots, news) = sample_inputs();
        let lines = context_lines(&snapshots, &news);
        let brief = fallback_brief(&lines);
        assert!(brief.starts_with("- MSFT: now=420.50"));
        assert!(brief.ends_with(FALLBACK_TRAILER));

        let empty = fallback_brief(&[]);
        assert!(!empty.trim().is_empty());
        assert!(empty.contains(EMPTY_CONTEXT));
    }

    #[test]
    fn context_is_reproducible_from_the_same_inputs() {
        let (snapshots, news) = sample_inputs();
        let first = build_context(&context_lines(&snapshots, &news));
        let second = build_context(&context_lines(&snapshots, &news));
        assert_eq!(first, second);
    }
}
