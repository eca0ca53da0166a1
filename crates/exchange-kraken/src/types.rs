//! Wire types for the Kraken Futures v3 REST API.
//!
//! Response structs mirror the JSON the venue sends (camelCase, floats).
//! Conversions into `mirror-core` types happen here so the client only
//! hands out decimal, validated values.

use crate::error::{KrakenError, Result};
use mirror_core::{Instrument, LimitOrder, Position, PositionSide, SubmissionResult, Ticker};
use rust_decimal::Decimal;
use serde::Deserialize;

/// `sendStatus.status` of an accepted order.
pub const STATUS_PLACED: &str = "placed";

pub(crate) fn decimal(value: f64, field: &str) -> Result<Decimal> {
    Decimal::try_from(value).map_err(|_| KrakenError::missing_field(field))
}

// =============================================================================
// Instruments
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawInstrumentsResponse {
    #[serde(default)]
    pub instruments: Vec<RawInstrument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInstrument {
    pub symbol: String,
    pub tick_size: Option<f64>,
    pub contract_value_trade_precision: Option<i64>,
}

impl RawInstrument {
    /// Converts a catalog entry, or says why it cannot be mirrored.
    ///
    /// Indices carry no tick size or precision. Contracts quoted with a
    /// negative trade precision (sizes in tens or hundreds) are not supported.
    pub fn into_instrument(self) -> std::result::Result<Instrument, String> {
        let (Some(precision), Some(tick_size)) =
            (self.contract_value_trade_precision, self.tick_size)
        else {
            return Err(format!("{}: no tick size or trade precision", self.symbol));
        };
        let precision = u32::try_from(precision).map_err(|_| {
            format!("{}: unsupported trade precision {precision}", self.symbol)
        })?;
        let tick_size = Decimal::try_from(tick_size)
            .map_err(|_| format!("{}: tick size {tick_size} is not a decimal", self.symbol))?;
        Ok(Instrument::new(self.symbol, precision, tick_size))
    }
}

// =============================================================================
// Tickers
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawTickersResponse {
    #[serde(default)]
    pub tickers: Vec<RawTicker>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTicker {
    pub symbol: String,
    pub mark_price: Option<f64>,
}

impl RawTicker {
    pub fn into_ticker(self) -> Option<Ticker> {
        let mark_price = Decimal::try_from(self.mark_price?).ok()?;
        Some(Ticker::new(self.symbol, mark_price))
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawAccountsResponse {
    pub accounts: Option<RawAccounts>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawAccounts {
    pub flex: Option<RawFlexAccount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFlexAccount {
    pub portfolio_value: Option<f64>,
}

impl RawAccountsResponse {
    /// Multi-collateral portfolio value including unrealized PnL.
    pub fn portfolio_value(&self) -> Result<Decimal> {
        let field = "accounts.flex.portfolioValue";
        let value = self
            .accounts
            .as_ref()
            .and_then(|a| a.flex.as_ref())
            .and_then(|f| f.portfolio_value)
            .ok_or_else(|| KrakenError::missing_field(field))?;
        decimal(value, field)
    }
}

// =============================================================================
// Open Positions
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOpenPositionsResponse {
    #[serde(default)]
    pub open_positions: Vec<RawOpenPosition>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawOpenPosition {
    pub symbol: String,
    pub side: String,
    pub size: f64,
}

impl TryFrom<RawOpenPosition> for Position {
    type Error = KrakenError;

    fn try_from(raw: RawOpenPosition) -> Result<Self> {
        let side = match raw.side.as_str() {
            "long" => PositionSide::Long,
            "short" => PositionSide::Short,
            other => {
                return Err(KrakenError::Serialization(format!(
                    "unknown position side {other:?} for {}",
                    raw.symbol
                )))
            }
        };
        let size = decimal(raw.size, "openPositions.size")?.abs();
        Ok(Position::new(raw.symbol, size, side))
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCancelAllResponse {
    pub cancel_status: Option<RawCancelStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCancelStatus {
    #[serde(default)]
    pub cancelled_orders: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSendOrderResponse {
    pub send_status: Option<RawSendStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSendStatus {
    pub order_id: Option<String>,
    pub status: String,
}

impl From<RawSendStatus> for SubmissionResult {
    fn from(raw: RawSendStatus) -> Self {
        if raw.status == STATUS_PLACED {
            Self {
                accepted: true,
                order_id: raw.order_id,
                status: raw.status,
                reason: None,
            }
        } else {
            Self::rejected(raw.status.clone(), raw.status)
        }
    }
}

/// Body of `POST /derivatives/api/v3/sendorder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOrderRequest {
    pub symbol: String,
    pub side: &'static str,
    pub size: Decimal,
    pub limit_price: Decimal,
    pub reduce_only: bool,
}

impl SendOrderRequest {
    pub const ORDER_TYPE: &'static str = "lmt";

    /// Form-encoded body. This exact string is also the signed `postData`.
    #[must_use]
    pub fn to_form(&self) -> String {
        let mut form = format!(
            "orderType={}&symbol={}&side={}&size={}&limitPrice={}",
            Self::ORDER_TYPE,
            urlencoding::encode(&self.symbol),
            self.side,
            self.size.normalize(),
            self.limit_price.normalize()
        );
        if self.reduce_only {
            form.push_str("&reduceOnly=true");
        }
        form
    }
}

impl From<&LimitOrder> for SendOrderRequest {
    fn from(order: &LimitOrder) -> Self {
        Self {
            symbol: order.symbol.clone(),
            side: order.side().as_api_str(),
            size: order.size(),
            limit_price: order.limit_price,
            reduce_only: order.reduce_only,
        }
    }
}
