use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Side that moves a position by `delta`.
    #[must_use]
    pub fn from_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    #[must_use]
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// A limit order the engine wants placed on the target account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub symbol: String,
    /// Signed change in position, already rounded to the instrument's size precision.
    pub delta: Decimal,
    /// Limit price, already snapped to the instrument's tick grid.
    pub limit_price: Decimal,
    pub reduce_only: bool,
}

impl LimitOrder {
    #[must_use]
    pub fn side(&self) -> OrderSide {
        OrderSide::from_delta(self.delta)
    }

    #[must_use]
    pub fn size(&self) -> Decimal {
        self.delta.abs()
    }
}

impl std::fmt::Display for LimitOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} @ {}",
            self.side(),
            self.size().normalize(),
            self.symbol,
            self.limit_price.normalize()
        )?;
        if self.reduce_only {
            f.write_str(" (reduce-only)")?;
        }
        Ok(())
    }
}

/// One step of a mirror plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderIntent {
    /// Cancel every resting order on the target account.
    CancelAll,
    /// Flatten a target position the source no longer holds.
    ClosePosition(LimitOrder),
    /// Move a target position toward the scaled source position.
    AdjustPosition(LimitOrder),
}

impl OrderIntent {
    /// The order carried by position-affecting intents.
    #[must_use]
    pub fn order(&self) -> Option<&LimitOrder> {
        match self {
            Self::CancelAll => None,
            Self::ClosePosition(order) | Self::AdjustPosition(order) => Some(order),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.order().map(|o| o.symbol.as_str())
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CancelAll => "cancel all orders",
            Self::ClosePosition(_) => "closing position",
            Self::AdjustPosition(_) => "adjusting position",
        }
    }
}

impl std::fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.order() {
            Some(order) => write!(f, "{}: {}", self.label(), order),
            None => f.write_str(self.label()),
        }
    }
}

/// Venue response to a limit order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub accepted: bool,
    pub order_id: Option<String>,
    /// Raw venue status (e.g., "placed", "invalidSize").
    pub status: String,
    pub reason: Option<String>,
}

impl SubmissionResult {
    pub fn accepted(order_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            accepted: true,
            order_id: Some(order_id.into()),
            status: status.into(),
            reason: None,
        }
    }

    pub fn rejected(status: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            order_id: None,
            status: status.into(),
            reason: Some(reason.into()),
        }
    }

    /// Rejection reason, falling back to the raw status.
    #[must_use]
    pub fn rejection_reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(delta: Decimal) -> LimitOrder {
        LimitOrder {
            symbol: "PF_XBTUSD".to_string(),
            delta,
            limit_price: dec!(20000.5),
            reduce_only: false,
        }
    }

    #[test]
    fn test_side_from_delta() {
        assert_eq!(order(dec!(0.2)).side(), OrderSide::Buy);
        assert_eq!(order(dec!(-0.2)).side(), OrderSide::Sell);
        assert_eq!(order(dec!(-0.2)).size(), dec!(0.2));
    }

    #[test]
    fn test_order_display() {
        let mut close = order(dec!(-1.50));
        close.reduce_only = true;
        assert_eq!(
            close.to_string(),
            "sell 1.5 PF_XBTUSD @ 20000.5 (reduce-only)"
        );
    }

    #[test]
    fn test_intent_accessors() {
        assert_eq!(OrderIntent::CancelAll.order(), None);
        let intent = OrderIntent::AdjustPosition(order(dec!(0.2)));
        assert_eq!(intent.symbol(), Some("PF_XBTUSD"));
        assert!(intent.to_string().starts_with("adjusting position: buy 0.2"));
    }

    #[test]
    fn test_intent_json_shape() {
        let json = serde_json::to_value(OrderIntent::ClosePosition(order(dec!(-1)))).unwrap();
        assert_eq!(json["kind"], "close_position");
        assert_eq!(json["symbol"], "PF_XBTUSD");
        assert_eq!(json["reduce_only"], false);

        let cancel = serde_json::to_value(OrderIntent::CancelAll).unwrap();
        assert_eq!(cancel["kind"], "cancel_all");
    }

    #[test]
    fn test_rejection_reason_falls_back_to_status() {
        let mut result = SubmissionResult::rejected("invalidPrice", "price off tick grid");
        assert_eq!(result.rejection_reason(), "price off tick grid");
        result.reason = None;
        assert_eq!(result.rejection_reason(), "invalidPrice");
    }
}
