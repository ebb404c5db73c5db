use analysis_core::precision::round_price;
use serde::{Deserialize, Serialize};

use crate::horizon::TimeHorizon;

/// Buy at support instead of market when support is at most this far below price
pub const PULLBACK_WINDOW: f64 = 0.03;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    /// Enter at the current price
    #[default]
    Market,
    /// Wait for a pullback to nearby support when one exists
    SupportPullback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    /// Percent gain from entry to target
    pub expected_return: f64,
}

fn highest_below(levels: &[f64], price: f64) -> Option<f64> {
    levels
        .iter()
        .copied()
        .filter(|&l| l.is_finite() && l > 0.0 && l < price)
        .reduce(f64::max)
}

/// Entry, target and stop for a call made with `confidence` over `horizon`.
///
/// `supports` may be in any order; levels at or above the reference price are ignored.
pub fn derive_targets(
    current_price: f64,
    supports: &[f64],
    confidence: u8,
    horizon: TimeHorizon,
    policy: EntryPolicy,
) -> PriceTargets {
    let entry = match policy {
        EntryPolicy::Market => current_price,
        EntryPolicy::SupportPullback => match highest_below(supports, current_price) {
            Some(s) if (current_price - s) / current_price <= PULLBACK_WINDOW => s,
            _ => current_price,
        },
    };

    let factor = horizon.max_expected_return() * f64::from(confidence) / 100.0;
    let target = entry * (1.0 + factor);

    let stop = highest_below(supports, entry).unwrap_or(entry * (1.0 - horizon.stop_loss_floor()));

    let entry_price = round_price(entry);
    let target_price = round_price(target);
    let expected_return = if entry_price > 0.0 {
        round_price((target_price - entry_price) / entry_price * 100.0)
    } else {
        0.0
    };

    PriceTargets {
        entry_price,
        target_price,
        stop_loss: round_price(stop),
        expected_return,
    }
}
