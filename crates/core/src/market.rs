//! Instrument catalog and mark-price snapshot.
//!
//! Both are symbol-keyed so that a missing entry surfaces as an explicit
//! lookup failure instead of an empty search result.

use crate::error::{MirrorError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric formatting rules for one tradable contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Venue symbol (e.g., "PF_XBTUSD").
    pub symbol: String,

    /// Decimal digits legal for order and position size.
    pub size_precision: u32,

    /// Minimum legal price increment.
    pub tick_size: Decimal,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, size_precision: u32, tick_size: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            size_precision,
            tick_size,
        }
    }
}

/// Mark price of one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub mark_price: Decimal,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, mark_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            mark_price,
        }
    }
}

/// Instruments available in this run, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InstrumentCatalog {
    instruments: HashMap<String, Instrument>,
}

impl InstrumentCatalog {
    /// Builds the catalog. A later entry for the same symbol replaces an earlier one.
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        Self {
            instruments: instruments
                .into_iter()
                .map(|i| (i.symbol.clone(), i))
                .collect(),
        }
    }

    /// Looks up an instrument.
    ///
    /// # Errors
    /// Returns `InstrumentNotFound` if the symbol is not in the catalog.
    pub fn get(&self, symbol: &str) -> Result<&Instrument> {
        self.instruments
            .get(symbol)
            .ok_or_else(|| MirrorError::instrument_not_found(symbol))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl FromIterator<Instrument> for InstrumentCatalog {
    fn from_iter<I: IntoIterator<Item = Instrument>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Mark prices in this run, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    tickers: HashMap<String, Ticker>,
}

impl MarketSnapshot {
    pub fn new(tickers: impl IntoIterator<Item = Ticker>) -> Self {
        Self {
            tickers: tickers
                .into_iter()
                .map(|t| (t.symbol.clone(), t))
                .collect(),
        }
    }

    /// Returns the mark price for a symbol.
    ///
    /// # Errors
    /// Returns `TickerNotFound` if the symbol has no ticker.
    pub fn mark_price(&self, symbol: &str) -> Result<Decimal> {
        self.tickers
            .get(symbol)
            .map(|t| t.mark_price)
            .ok_or_else(|| MirrorError::ticker_not_found(symbol))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl FromIterator<Ticker> for MarketSnapshot {
    fn from_iter<I: IntoIterator<Item = Ticker>>(iter: I) -> Self {
        Self::new(iter)
    }
}
