//! Sequential submission of a mirror plan.
//!
//! Intents go out one at a time in plan order. The first rejection or
//! transport failure stops the run; whatever was already accepted stays live.

use crate::error::{MirrorError, Result};
use crate::order::{LimitOrder, OrderIntent};
use crate::reconcile::MirrorPlan;
use crate::report::{DispatchedOrder, RunReport};
use crate::traits::TradingAccount;
use chrono::Utc;
use tracing::{info, warn};

pub struct Dispatcher<'a, T: TradingAccount + ?Sized> {
    account: &'a T,
}

impl<'a, T: TradingAccount + ?Sized> Dispatcher<'a, T> {
    pub fn new(account: &'a T) -> Self {
        Self { account }
    }

    /// Executes every intent of `plan` against the target account.
    ///
    /// # Errors
    /// - `OrderRejected` when the venue refuses an order.
    /// - `Venue` when a call fails in transport.
    pub async fn execute(&self, plan: &MirrorPlan) -> Result<RunReport> {
        let mut report = RunReport::new(plan.ratio);

        for intent in &plan.intents {
            match intent {
                OrderIntent::CancelAll => {
                    let cancelled = self.account.cancel_all_orders().await?;
                    if cancelled > 0 {
                        info!("cancel_all_orders: cancelled {} orders", cancelled);
                    }
                    report.cancelled_orders += cancelled;
                }
                OrderIntent::ClosePosition(order) | OrderIntent::AdjustPosition(order) => {
                    let dispatched = self.submit(intent, order).await?;
                    report.submitted.push(dispatched);
                }
            }
        }

        report.finished_at = Utc::now();
        Ok(report)
    }

    async fn submit(&self, intent: &OrderIntent, order: &LimitOrder) -> Result<DispatchedOrder> {
        let result = self.account.submit_limit_order(order).await?;

        if !result.accepted {
            warn!(
                "{} rejected: {} status={} reason={}",
                intent.label(),
                order,
                result.status,
                result.rejection_reason()
            );
            return Err(MirrorError::OrderRejected {
                symbol: order.symbol.clone(),
                delta: order.delta,
                limit_price: order.limit_price,
                reason: result.rejection_reason().to_string(),
            });
        }

        info!(
            "{}: {} -> {} ({})",
            intent.label(),
            order,
            result.status,
            result.order_id.as_deref().unwrap_or("no order id")
        );

        Ok(DispatchedOrder {
            intent: intent.clone(),
            order_id: result.order_id,
            status: result.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::SubmissionResult;
    use crate::position::AccountSnapshot;
    use crate::reconcile::{EquityFloors, RatioContext};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Records calls and rejects orders for one symbol.
    #[derive(Default)]
    struct RecordingAccount {
        calls: Mutex<Vec<String>>,
        reject_symbol: Option<String>,
        cancelled: usize,
    }

    #[async_trait]
    impl TradingAccount for RecordingAccount {
        async fn fetch_account_snapshot(&self) -> anyhow::Result<AccountSnapshot> {
            Ok(AccountSnapshot::new(dec!(1000), Vec::new())?)
        }

        async fn cancel_all_orders(&self) -> anyhow::Result<usize> {
            self.calls.lock().unwrap().push("cancel_all".to_string());
            Ok(self.cancelled)
        }

        async fn submit_limit_order(&self, order: &LimitOrder) -> anyhow::Result<SubmissionResult> {
            self.calls.lock().unwrap().push(order.symbol.clone());
            if self.reject_symbol.as_deref() == Some(order.symbol.as_str()) {
                return Ok(SubmissionResult::rejected("invalidSize", "invalidSize"));
            }
            Ok(SubmissionResult::accepted(
                format!("id-{}", order.symbol),
                "placed",
            ))
        }
    }

    fn order(symbol: &str, delta: Decimal) -> LimitOrder {
        LimitOrder {
            symbol: symbol.to_string(),
            delta,
            limit_price: dec!(100),
            reduce_only: false,
        }
    }

    fn plan() -> MirrorPlan {
        MirrorPlan {
            ratio: RatioContext::new(dec!(1000), dec!(1000), &EquityFloors::default()).unwrap(),
            intents: vec![
                OrderIntent::CancelAll,
                OrderIntent::ClosePosition(order("AAA", dec!(-1))),
                OrderIntent::AdjustPosition(order("BBB", dec!(2))),
                OrderIntent::AdjustPosition(order("CCC", dec!(-3))),
            ],
        }
    }

    #[tokio::test]
    async fn test_executes_in_plan_order() {
        let account = RecordingAccount {
            cancelled: 4,
            ..Default::default()
        };

        let report = Dispatcher::new(&account).execute(&plan()).await.unwrap();

        assert_eq!(
            *account.calls.lock().unwrap(),
            vec!["cancel_all", "AAA", "BBB", "CCC"]
        );
        assert_eq!(report.cancelled_orders, 4);
        assert_eq!(report.submitted.len(), 3);
        assert_eq!(report.submitted[0].order_id.as_deref(), Some("id-AAA"));
    }

    #[tokio::test]
    async fn test_stops_at_first_rejection() {
        let account = RecordingAccount {
            reject_symbol: Some("BBB".to_string()),
            ..Default::default()
        };

        let err = Dispatcher::new(&account).execute(&plan()).await.unwrap_err();

        assert!(matches!(
            err,
            MirrorError::OrderRejected { ref symbol, ref reason, .. }
                if symbol == "BBB" && reason == "invalidSize"
        ));
        assert_eq!(
            *account.calls.lock().unwrap(),
            vec!["cancel_all", "AAA", "BBB"]
        );
    }
}
