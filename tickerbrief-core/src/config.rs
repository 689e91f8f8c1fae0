//! Configuration sanitization: untrusted key-value record → `SanitizedConfig`.
//!
//! Input records originate from a language-model extraction step, so every
//! field arrives loosely typed (numbers as strings, booleans as anything).
//! Each normalizer is a total function: it never fails, it falls back to the
//! field's default instead. The one exception is `tickers` — a record that
//! yields zero usable tickers cannot be sanitized and building it is a hard
//! failure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Normalized ticker symbol: alphanumerics plus a single-letter dot suffix
/// (e.g. `BRK.B`).
static TICKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+(\.[A-Z])?$").expect("ticker pattern"));

/// 24-hour wall-clock time, `HH:MM`.
static HHMM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").expect("time pattern"));

pub const MAX_TICKERS: usize = 50;

pub const DEFAULT_ALERT_THRESHOLD: f64 = 5.0;
pub const DEFAULT_SCHEDULE_TIME: &str = "16:10";
pub const DEFAULT_LOOKBACK_DAYS: u32 = 5;
pub const DEFAULT_INTERVAL_MINUTES: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no valid ticker symbols after normalization; specify at least one ticker")]
    NoValidTickers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMethod {
    Console,
    Discord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    Summary,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLanguage {
    En,
    Zh,
    Jp,
}

impl ReportLanguage {
    pub fn code(self) -> &'static str {
        match self {
            ReportLanguage::En => "en",
            ReportLanguage::Zh => "zh",
            ReportLanguage::Jp => "jp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Daily,
    Interval,
}

/// Fully-defaulted, range-checked monitoring configuration.
///
/// Immutable once built; `tickers` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedConfig {
    /// Normalized symbols, duplicates collapsed, first-appearance order.
    pub tickers: Vec<String>,
    /// Percent, in `(0, 50]`.
    pub alert_threshold: f64,
    pub notify_method: NotifyMethod,
    /// 24-hour `HH:MM`.
    pub schedule_time: String,
    pub report_style: ReportStyle,
    pub news_enabled: bool,
    /// Days, in `[1, 60]`.
    pub lookback_days: u32,
    pub report_language: ReportLanguage,
    pub schedule_mode: ScheduleMode,
    /// Minutes in `(0, 1440]` when `schedule_mode` is interval, `0` otherwise.
    pub interval_minutes: u32,
}

impl SanitizedConfig {
    /// Build a configuration from an untrusted record, applying the per-field
    /// normalization and defaulting rules.
    pub fn from_untrusted(raw: &Map<String, Value>) -> Result<Self, ConfigError> {
        let tickers = normalize_tickers_value(raw.get("tickers"));
        if tickers.is_empty() {
            return Err(ConfigError::NoValidTickers);
        }

        let schedule_mode = normalize_schedule_mode(raw.get("schedule_mode"));

        Ok(Self {
            tickers,
            alert_threshold: normalize_threshold(raw.get("alert_threshold")),
            notify_method: normalize_notify_method(raw.get("notify_method")),
            schedule_time: normalize_schedule_time(raw.get("schedule_time")),
            report_style: normalize_report_style(raw.get("report_style")),
            news_enabled: normalize_news_enabled(raw.get("news_enabled")),
            lookback_days: normalize_lookback_days(raw.get("lookback_days")),
            report_language: normalize_report_language(raw.get("report_language")),
            schedule_mode,
            interval_minutes: normalize_interval_minutes(raw.get("interval_minutes"), schedule_mode),
        })
    }

    /// All defaults plus an explicit ticker list. Test and wiring helper.
    pub fn defaults_with_tickers(tickers: Vec<String>) -> Self {
        Self {
            tickers,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            notify_method: NotifyMethod::Console,
            schedule_time: DEFAULT_SCHEDULE_TIME.to_string(),
            report_style: ReportStyle::Summary,
            news_enabled: true,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            report_language: ReportLanguage::Zh,
            schedule_mode: ScheduleMode::Daily,
            interval_minutes: 0,
        }
    }
}

/// Uppercase, trim, pattern-check (stripping stray characters when the raw
/// entry does not match), drop empties, deduplicate preserving first
/// occurrence, cap at [`MAX_TICKERS`].
pub fn normalize_tickers(raw: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for entry in raw {
        let mut t = entry.trim().to_uppercase();
        if !TICKER_RE.is_match(&t) {
            t.retain(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.');
        }
        if !t.is_empty() && !seen.contains(&t) {
            seen.push(t);
        }
        if seen.len() == MAX_TICKERS {
            break;
        }
    }
    seen
}

fn normalize_tickers_value(value: Option<&Value>) -> Vec<String> {
    let entries = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    normalize_tickers(&entries)
}

fn normalize_threshold(value: Option<&Value>) -> f64 {
    let parsed = match value {
        // "4%" → 4.0; a bare numeric string goes through the plain parse below.
        Some(Value::String(s)) if s.trim().ends_with('%') => {
            s.trim().trim_end_matches('%').trim().parse::<f64>().ok()
        }
        Some(v) => coerce_f64(v),
        None => None,
    };
    match parsed {
        Some(t) if t > 0.0 && t <= 50.0 => t,
        _ => DEFAULT_ALERT_THRESHOLD,
    }
}

fn normalize_notify_method(value: Option<&Value>) -> NotifyMethod {
    match value.and_then(Value::as_str).map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "discord" => NotifyMethod::Discord,
        Some(s) if s == "console" => NotifyMethod::Console,
        _ => NotifyMethod::Console,
    }
}

fn normalize_schedule_time(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(s) if HHMM_RE.is_match(s) => s.to_string(),
        _ => DEFAULT_SCHEDULE_TIME.to_string(),
    }
}

fn normalize_report_style(value: Option<&Value>) -> ReportStyle {
    match value.and_then(Value::as_str).map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "detailed" => ReportStyle::Detailed,
        _ => ReportStyle::Summary,
    }
}

/// Truthiness coercion: absent → `true`; otherwise null/false/0/empty are
/// `false` and everything else is `true`.
fn normalize_news_enabled(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn normalize_lookback_days(value: Option<&Value>) -> u32 {
    match value.and_then(coerce_i64) {
        Some(d) if (1..=60).contains(&d) => d as u32,
        _ => DEFAULT_LOOKBACK_DAYS,
    }
}

fn normalize_report_language(value: Option<&Value>) -> ReportLanguage {
    match value.and_then(Value::as_str).map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "en" => ReportLanguage::En,
        Some(s) if s == "jp" => ReportLanguage::Jp,
        Some(s) if s == "zh" => ReportLanguage::Zh,
        _ => ReportLanguage::Zh,
    }
}

fn normalize_schedule_mode(value: Option<&Value>) -> ScheduleMode {
    match value.and_then(Value::as_str).map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "interval" => ScheduleMode::Interval,
        _ => ScheduleMode::Daily,
    }
}

fn normalize_interval_minutes(value: Option<&Value>, mode: ScheduleMode) -> u32 {
    match mode {
        ScheduleMode::Daily => 0,
        ScheduleMode::Interval => match value.and_then(coerce_i64) {
            Some(m) if (1..=24 * 60).contains(&m) => m as u32,
            _ => DEFAULT_INTERVAL_MINUTES,
        },
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}
