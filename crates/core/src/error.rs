//! Error types for a mirror run.
//!
//! Every variant is fatal for the run it occurs in. Nothing here is retried;
//! rescheduling belongs to whatever invokes the binary.

use rust_decimal::Decimal;
use thiserror::Error;

/// Which account an equity check or snapshot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    /// The account being copied.
    Source,
    /// The account that follows.
    Target,
}

impl AccountRole {
    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Missing credentials or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An instrument carries a tick size that cannot form a price grid.
    #[error("configuration error: invalid tick size {tick_size} for {symbol}")]
    InvalidTickSize {
        /// Instrument symbol.
        symbol: String,
        /// Offending tick size.
        tick_size: Decimal,
    },

    /// Account equity is at or below its safety floor.
    #[error("{role} equity {equity} is at or below the floor of {floor}")]
    UnsafeEquity {
        /// Which account failed the check.
        role: AccountRole,
        /// Reported equity.
        equity: Decimal,
        /// Configured floor.
        floor: Decimal,
    },

    /// A position symbol has no entry in the instrument catalog.
    #[error("lookup failure: no instrument for {symbol}")]
    InstrumentNotFound {
        /// Missing symbol.
        symbol: String,
    },

    /// A symbol that needs pricing has no ticker.
    #[error("lookup failure: no ticker for {symbol}")]
    TickerNotFound {
        /// Missing symbol.
        symbol: String,
    },

    /// The same symbol appears twice in one account snapshot.
    #[error("duplicate position for {symbol} in account snapshot")]
    DuplicatePosition {
        /// Duplicated symbol.
        symbol: String,
    },

    /// Scaling or differencing a position size left the decimal range.
    #[error("size arithmetic overflowed for {symbol}")]
    SizeOverflow {
        /// Symbol whose size could not be computed.
        symbol: String,
    },

    /// The venue rejected a submitted order.
    #[error("order rejected for {symbol} (delta {delta} @ {limit_price}): {reason}")]
    OrderRejected {
        /// Order symbol.
        symbol: String,
        /// Signed size delta that was submitted.
        delta: Decimal,
        /// Limit price that was submitted.
        limit_price: Decimal,
        /// Rejection reason reported by the venue.
        reason: String,
    },

    /// Transport or decoding failure inside a venue collaborator.
    #[error(transparent)]
    Venue(#[from] anyhow::Error),
}

impl MirrorError {
    /// Creates an unsafe equity error.
    pub fn unsafe_equity(role: AccountRole, equity: Decimal, floor: Decimal) -> Self {
        Self::UnsafeEquity {
            role,
            equity,
            floor,
        }
    }

    /// Creates an instrument lookup failure.
    pub fn instrument_not_found(symbol: impl Into<String>) -> Self {
        Self::InstrumentNotFound {
            symbol: symbol.into(),
        }
    }

    /// Creates a ticker lookup failure.
    pub fn ticker_not_found(symbol: impl Into<String>) -> Self {
        Self::TickerNotFound {
            symbol: symbol.into(),
        }
    }

    /// Returns true for catalog or market snapshot misses.
    #[must_use]
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::InstrumentNotFound { .. } | Self::TickerNotFound { .. }
        )
    }

    /// Process exit status for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) | Self::InvalidTickSize { .. } => 2,
            Self::UnsafeEquity { .. } => 3,
            Self::InstrumentNotFound { .. } | Self::TickerNotFound { .. } => 4,
            Self::OrderRejected { .. } => 5,
            Self::DuplicatePosition { .. } | Self::SizeOverflow { .. } | Self::Venue(_) => 1,
        }
    }
}

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
