//! Rounding of order sizes and limit prices to venue-legal values.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Which way a limit price is snapped onto the tick grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    /// Next tick at or above the mark (buys).
    Up,
    /// Next tick at or below the mark (sells).
    Down,
}

impl PriceDirection {
    /// Marketable direction for an order moving a position by `delta`.
    #[must_use]
    pub fn for_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Rounds `value` to `precision` decimal places, half away from zero.
#[must_use]
pub fn round_size(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Snaps `mark_price` to a multiple of `tick_size`, rounding in `direction`.
///
/// Returns `None` when `tick_size` is not strictly positive.
#[must_use]
pub fn round_price_away(
    mark_price: Decimal,
    tick_size: Decimal,
    direction: PriceDirection,
) -> Option<Decimal> {
    if tick_size <= Decimal::ZERO {
        return None;
    }

    let ticks = mark_price.checked_div(tick_size)?;
    let ticks = match direction {
        PriceDirection::Up => ticks.ceil(),
        PriceDirection::Down => ticks.floor(),
    };

    ticks.checked_mul(tick_size)
}
