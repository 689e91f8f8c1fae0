//! Requirement interpretation: free-text user intent → `SanitizedConfig`.
//!
//! The completion service is asked to emit a bare JSON object matching the
//! configuration schema. Replies are recovered with a deliberately simple
//! heuristic — a single trailing `{...}` span, not a JSON-in-text scanner —
//! whose behavior on malformed input is part of the contract and must not be
//! "improved".

use serde_json::Value;
use thiserror::Error;

use crate::config::{ConfigError, SanitizedConfig};
use crate::providers::Completion;

/// Maximum length of the raw-reply sample carried in an error.
const ERROR_SAMPLE_LEN: usize = 300;

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("failed to parse completion reply as JSON: {detail}; raw output: {sample}")]
    Malformed { detail: String, sample: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Schema-describing prompt for the configuration extractor.
const EXTRACTOR_PROMPT_HEADER: &str = r#"You are a strict configuration extractor for a stock-tracking agent.
User will describe monitoring requirements in natural language (possibly Chinese/English mixed).
You MUST return ONLY a valid JSON object (no extra text, no code fences) matching this schema:

{
  "tickers": "string[]",                 // REQUIRED, 1..50 uppercase tickers, e.g., ["TSLA","AAPL"]
  "alert_threshold": "number",           // OPTIONAL, percent like 4.0 means ±4%
  "notify_method": "discord|console",    // OPTIONAL
  "schedule_time": "HH:MM",              // OPTIONAL, 24h format, e.g., "16:30"
  "report_style": "summary|detailed",    // OPTIONAL
  "news_enabled": "boolean",             // OPTIONAL
  "lookback_days": "integer",            // OPTIONAL, days to look back for trends (1..60)
  "report_language": "zh|en|jp",         // OPTIONAL, language in the report
  "schedule_mode": "daily|interval",     // OPTIONAL, default "daily"
  "interval_minutes": "integer"          // OPTIONAL, required when schedule_mode="interval"
}

Rules:
- Normalize tickers to UPPERCASE, strip spaces, deduplicate.
- If user mentions threshold in %, convert to number (e.g., "4%" -> 4.0).
- If notify method is unclear, choose "console".
- If schedule is like "after market close", use "16:30".
- If user mentions daily, assume one run per day at "16:30".
- If user says "every N minutes", set schedule_mode="interval".
- If schedule_mode is "interval" and N <= 0 or missing, omit it and let system default.
- If missing values, omit them so the system can apply defaults.
- Return ONLY the JSON object, nothing else.

User requirement:"#;

pub fn build_extractor_prompt(requirement: &str) -> String {
    format!("{EXTRACTOR_PROMPT_HEADER}\n<<<\n{requirement}\n>>>")
}

/// Best-effort recovery of a JSON object span from a free-text reply.
///
/// The candidate runs from the first `{` to the last `}`, and only when
/// nothing but whitespace follows that `}`. One candidate is tried; a reply
/// with prose after the object is unrecoverable by design.
fn recover_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start || !raw[end + 1..].trim().is_empty() {
        return None;
    }
    Some(&raw[start..=end])
}

fn sample(raw: &str) -> String {
    let mut end = ERROR_SAMPLE_LEN.min(raw.len());
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}

/// Interpret a free-text requirement into a sanitized configuration.
///
/// Fails when the completion reply contains no recoverable JSON object, or
/// when the recovered object yields zero tickers after normalization. Every
/// other field defect is normalized away.
pub fn interpret(
    requirement: &str,
    completion: &dyn Completion,
) -> Result<SanitizedConfig, InterpretError> {
    let prompt = build_extractor_prompt(requirement);
    let raw = completion.complete(&prompt);
    let raw = raw.trim();

    let candidate = if raw.starts_with('{') {
        raw
    } else {
        recover_object_span(raw).ok_or_else(|| InterpretError::Malformed {
            detail: "no JSON object found in reply".to_string(),
            sample: sample(raw),
        })?
    };

    let value: Value = serde_json::from_str(candidate).map_err(|e| InterpretError::Malformed {
        detail: e.to_string(),
        sample: sample(raw),
    })?;
    let record = value.as_object().ok_or_else(|| InterpretError::Malformed {
        detail: "reply is not a JSON object".to_string(),
        sample: sample(raw),
    })?;

    Ok(SanitizedConfig::from_untrusted(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifyMethod;

    /// Completion stub returning a fixed reply.
    struct Canned(&'static str);

    impl Completion for Canned {
        fn complete(&self, _prompt: &str) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn clean_json_reply_is_used_verbatim() {
        let reply = Canned(r#"{"tickers": ["MSFT", "META"], "notify_method": "discord"}"#);
        let cfg = interpret("Check MSFT and META price and tell me in discord", &reply).unwrap();
        assert_eq!(cfg.tickers, ["MSFT", "META"]);
        assert_eq!(cfg.notify_method, NotifyMethod::Discord);
    }

    #[test]
    fn trailing_object_is_recovered_from_prose() {
        let reply = Canned("Sure! Here is the configuration:\n{\"tickers\": [\"TSLA\"]}\n");
        let cfg = interpret("watch tesla", &reply).unwrap();
        assert_eq!(cfg.tickers, ["TSLA"]);
    }

    #[test]
    fn object_followed_by_prose_is_not_recovered() {
        let reply = Canned("note {\"tickers\": [\"TSLA\"]} hope that helps");
        let err = interpret("watch tesla", &reply).unwrap_err();
        assert!(matches!(err, InterpretError::Malformed { .. }));
    }

    #[test]
    fn empty_reply_fails_loudly() {
        let err = interpret("watch tesla", &Canned("")).unwrap_err();
        assert!(matches!(err, InterpretError::Malformed { .. }));
    }

    #[test]
    fn non_object_json_fails() {
        let err = interpret("watch tesla", &Canned("[1, 2, 3]")).unwrap_err();
        assert!(matches!(err, InterpretError::Malformed { .. }));
    }

    #[test]
    fn ill_formed_candidate_span_fails() {
        let reply = Canned("prefix { not json }");
        let err = interpret("watch tesla", &reply).unwrap_err();
        assert!(matches!(err, InterpretError::Malformed { .. }));
    }

    #[test]
    fn zero_surviving_tickers_abort_interpretation() {
        let reply = Canned(r#"{"tickers": ["$$", ""]}"#);
        let err = interpret("watch something", &reply).unwrap_err();
        assert!(matches!(
            err,
            InterpretError::Config(ConfigError::NoValidTickers)
        ));
    }

    #[test]
    fn prompt_embeds_the_requirement_between_markers() {
        let prompt = build_extractor_prompt("watch AAPL");
        assert!(prompt.contains("<<<\nwatch AAPL\n>>>"));
        assert!(prompt.contains("configuration extractor"));
    }
}
