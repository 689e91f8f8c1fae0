//! Alert evaluation over collected snapshots.

use crate::state::TickerSnapshot;

/// Render alert lines for every snapshot whose percent change strictly
/// exceeds the threshold.
///
/// Only the positive direction is checked; a large drop does not alert.
/// Output order follows snapshot order, and each line captures the
/// snapshot's `change_pct` and `price_now` at the moment of evaluation.
pub fn evaluate_alerts(snapshots: &[TickerSnapshot], threshold: f64) -> Vec<String> {
    snapshots
        .iter()
        .filter(|snap| snap.change_pct > threshold)
        .map(|snap| {
            format!(
                "{} moved {:.2}% (now {:.2})",
                snap.ticker, snap.change_pct, snap.price_now
            )
        })
        .collect()
}
