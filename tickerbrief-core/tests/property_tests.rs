//! Property-based tests for the configuration normalizers.

use proptest::prelude::*;
use tickerbrief_core::config::{normalize_tickers, MAX_TICKERS};

proptest! {
    /// Every normalized ticker is non-empty, uses only allowed characters,
    /// and the list is bounded and duplicate-free.
    #[test]
    fn normalized_tickers_are_clean(raw in proptest::collection::vec(".{0,12}", 0..80)) {
        let normalized = normalize_tickers(&raw);

        prop_assert!(normalized.len() <= MAX_TICKERS);
        for ticker in &normalized {
            prop_assert!(!ticker.is_empty());
            prop_assert!(ticker
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.'));
        }
        let mut deduped = normalized.clone();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), normalized.len());
        let mut sorted = normalized.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), normalized.len());
    }

    /// Normalization is idempotent: feeding its own output back in changes
    /// nothing.
    #[test]
    fn normalization_is_idempotent(raw in proptest::collection::vec("[a-zA-Z0-9 .$-]{0,10}", 0..60)) {
        let once = normalize_tickers(&raw);
        let twice = normalize_tickers(&once);
        prop_assert_eq!(once, twice);
    }
}
