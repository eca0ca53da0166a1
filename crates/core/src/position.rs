use crate::error::{MirrorError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short.
    #[must_use]
    pub fn sign(self) -> Decimal {
        match self {
            Self::Long => Decimal::ONE,
            Self::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Unsigned magnitude.
    pub size: Decimal,
    pub side: PositionSide,
}

impl Position {
    pub fn new(symbol: impl Into<String>, size: Decimal, side: PositionSide) -> Self {
        Self {
            symbol: symbol.into(),
            size: size.abs(),
            side,
        }
    }

    pub fn long(symbol: impl Into<String>, size: Decimal) -> Self {
        Self::new(symbol, size, PositionSide::Long)
    }

    pub fn short(symbol: impl Into<String>, size: Decimal) -> Self {
        Self::new(symbol, size, PositionSide::Short)
    }

    #[must_use]
    pub fn signed_size(&self) -> Decimal {
        self.size * self.side.sign()
    }
}

/// Equity and open positions of one account, captured once per run.
///
/// Positions are keyed by symbol and iterate in ascending symbol order, which
/// keeps the order of generated intents reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    equity: Decimal,
    positions: BTreeMap<String, Position>,
}

impl AccountSnapshot {
    /// Builds a snapshot, rejecting duplicate symbols.
    ///
    /// # Errors
    /// Returns `DuplicatePosition` if two positions share a symbol.
    pub fn new(equity: Decimal, positions: impl IntoIterator<Item = Position>) -> Result<Self> {
        let mut by_symbol = BTreeMap::new();
        for position in positions {
            if by_symbol.contains_key(&position.symbol) {
                return Err(MirrorError::DuplicatePosition {
                    symbol: position.symbol,
                });
            }
            by_symbol.insert(position.symbol.clone(), position);
        }

        Ok(Self {
            equity,
            positions: by_symbol,
        })
    }

    #[must_use]
    pub const fn equity(&self) -> Decimal {
        self.equity
    }

    #[must_use]
    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Signed size held in `symbol`, zero when flat.
    #[must_use]
    pub fn signed_size(&self, symbol: &str) -> Decimal {
        self.positions
            .get(symbol)
            .map_or(Decimal::ZERO, Position::signed_size)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
