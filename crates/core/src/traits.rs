use crate::market::{Instrument, Ticker};
use crate::order::{LimitOrder, SubmissionResult};
use crate::position::AccountSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Public market data shared by both accounts.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_instruments(&self) -> Result<Vec<Instrument>>;
    async fn fetch_tickers(&self) -> Result<Vec<Ticker>>;
}

/// An authenticated account handle. Credentials are bound at construction.
#[async_trait]
pub trait TradingAccount: Send + Sync {
    async fn fetch_account_snapshot(&self) -> Result<AccountSnapshot>;

    /// Cancels every resting order and returns how many were cancelled.
    async fn cancel_all_orders(&self) -> Result<usize>;

    /// Places a limit order. A venue rejection is `Ok` with `accepted == false`.
    async fn submit_limit_order(&self, order: &LimitOrder) -> Result<SubmissionResult>;
}
