//! Reconciliation of a target account against a scaled source account.
//!
//! The engine is a pure function of four snapshots. It never talks to the
//! venue; the resulting [`MirrorPlan`] is handed to the dispatcher.
//!
//! # Plan layout
//!
//! 1. One `CancelAll`, always first.
//! 2. One reduce-only `ClosePosition` per orphan target position.
//! 3. One `AdjustPosition` per source position whose rounded delta is nonzero.
//!
//! Steps 2 and 3 follow the ascending symbol order of their snapshot.

use crate::error::{AccountRole, MirrorError, Result};
use crate::market::{InstrumentCatalog, MarketSnapshot};
use crate::normalize::{round_price_away, round_size, PriceDirection};
use crate::order::{LimitOrder, OrderIntent};
use crate::position::AccountSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum equity each account must exceed before a plan is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityFloors {
    /// Target equity at or below this is unusable.
    pub min_target_equity: Decimal,
    /// Source equity at or below this is unusable as a divisor.
    pub min_source_equity: Decimal,
}

impl Default for EquityFloors {
    fn default() -> Self {
        Self {
            min_target_equity: Decimal::ONE_HUNDRED,
            min_source_equity: Decimal::from(500),
        }
    }
}

impl EquityFloors {
    /// Checks both accounts, target first.
    ///
    /// # Errors
    /// Returns `UnsafeEquity` for the first account at or below its floor.
    pub fn validate(&self, source_equity: Decimal, target_equity: Decimal) -> Result<()> {
        if target_equity <= self.min_target_equity {
            return Err(MirrorError::unsafe_equity(
                AccountRole::Target,
                target_equity,
                self.min_target_equity,
            ));
        }
        if source_equity <= self.min_source_equity {
            return Err(MirrorError::unsafe_equity(
                AccountRole::Source,
                source_equity,
                self.min_source_equity,
            ));
        }
        Ok(())
    }
}

/// Equity ratio between target and source, fixed for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioContext {
    pub source_equity: Decimal,
    pub target_equity: Decimal,
    pub ratio: Decimal,
}

impl RatioContext {
    /// Validates both equities against `floors` and computes the ratio.
    ///
    /// # Errors
    /// Returns `UnsafeEquity` if either account is at or below its floor.
    pub fn new(source_equity: Decimal, target_equity: Decimal, floors: &EquityFloors) -> Result<Self> {
        floors.validate(source_equity, target_equity)?;

        // Only reachable with a floor configured below zero.
        let ratio = target_equity.checked_div(source_equity).ok_or_else(|| {
            MirrorError::unsafe_equity(AccountRole::Source, source_equity, floors.min_source_equity)
        })?;

        Ok(Self {
            source_equity,
            target_equity,
            ratio,
        })
    }
}

/// Ordered intents produced for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorPlan {
    pub ratio: RatioContext,
    pub intents: Vec<OrderIntent>,
}

impl MirrorPlan {
    /// Number of limit orders (closes and adjustments) in the plan.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.intents.iter().filter(|i| i.order().is_some()).count()
    }

    #[must_use]
    pub fn closes(&self) -> Vec<&LimitOrder> {
        self.intents
            .iter()
            .filter_map(|i| match i {
                OrderIntent::ClosePosition(order) => Some(order),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn adjustments(&self) -> Vec<&LimitOrder> {
        self.intents
            .iter()
            .filter_map(|i| match i {
                OrderIntent::AdjustPosition(order) => Some(order),
                _ => None,
            })
            .collect()
    }
}

/// Computes mirror plans under a fixed set of equity floors.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    floors: EquityFloors,
}

impl Reconciler {
    #[must_use]
    pub const fn new(floors: EquityFloors) -> Self {
        Self { floors }
    }

    #[must_use]
    pub const fn floors(&self) -> &EquityFloors {
        &self.floors
    }

    /// Builds the plan that moves `target` toward the scaled mirror of `source`.
    ///
    /// # Errors
    /// - `UnsafeEquity` if either account fails its floor; nothing is computed.
    /// - `InstrumentNotFound` / `TickerNotFound` on a catalog or market miss.
    /// - `InvalidTickSize` if an instrument that needs pricing has a non-positive tick.
    /// - `SizeOverflow` if a scaled size or delta leaves the `Decimal` range.
    pub fn plan(
        &self,
        source: &AccountSnapshot,
        target: &AccountSnapshot,
        instruments: &InstrumentCatalog,
        market: &MarketSnapshot,
    ) -> Result<MirrorPlan> {
        let ratio = RatioContext::new(source.equity(), target.equity(), &self.floors)?;
        debug!(
            "equity ratio {} (target {} / source {})",
            ratio.ratio, ratio.target_equity, ratio.source_equity
        );

        let mut intents = vec![OrderIntent::CancelAll];

        for orphan in target.positions().filter(|p| !source.contains(&p.symbol)) {
            let instrument = instruments.get(&orphan.symbol)?;
            let delta = round_size(-orphan.signed_size(), instrument.size_precision);
            if delta.is_zero() {
                debug!("orphan {} rounds to zero, nothing to close", orphan.symbol);
                continue;
            }

            let order = limit_order(&orphan.symbol, delta, true, instruments, market)?;
            intents.push(OrderIntent::ClosePosition(order));
        }

        for wanted in source.positions() {
            let instrument = instruments.get(&wanted.symbol)?;
            let overflow = || MirrorError::SizeOverflow {
                symbol: wanted.symbol.clone(),
            };
            let desired = ratio
                .ratio
                .checked_mul(wanted.signed_size())
                .ok_or_else(overflow)?;
            let current = target.signed_size(&wanted.symbol);
            let delta = round_size(
                desired.checked_sub(current).ok_or_else(overflow)?,
                instrument.size_precision,
            );
            if delta.is_zero() {
                debug!(
                    "{} already at {} (desired {}), no adjustment",
                    wanted.symbol, current, desired
                );
                continue;
            }

            let order = limit_order(&wanted.symbol, delta, false, instruments, market)?;
            intents.push(OrderIntent::AdjustPosition(order));
        }

        Ok(MirrorPlan { ratio, intents })
    }
}

/// Prices a rounded, nonzero `delta` at the marketable tick next to the mark.
fn limit_order(
    symbol: &str,
    delta: Decimal,
    reduce_only: bool,
    instruments: &InstrumentCatalog,
    market: &MarketSnapshot,
) -> Result<LimitOrder> {
    let instrument = instruments.get(symbol)?;
    let mark_price = market.mark_price(symbol)?;
    let limit_price = round_price_away(
        mark_price,
        instrument.tick_size,
        PriceDirection::for_delta(delta),
    )
    .ok_or_else(|| MirrorError::InvalidTickSize {
        symbol: symbol.to_string(),
        tick_size: instrument.tick_size,
    })?;

    Ok(LimitOrder {
        symbol: symbol.to_string(),
        delta,
        limit_price,
        reduce_only,
    })
}

/// Reconciles with the default equity floors (100 target, 500 source).
///
/// # Errors
/// See [`Reconciler::plan`].
pub fn reconcile(
    source: &AccountSnapshot,
    target: &AccountSnapshot,
    instruments: &InstrumentCatalog,
    market: &MarketSnapshot,
) -> Result<Vec<OrderIntent>> {
    Reconciler::default()
        .plan(source, target, instruments, market)
        .map(|plan| plan.intents)
}
