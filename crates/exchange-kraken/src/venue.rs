//! `mirror-core` collaborator traits backed by the Kraken Futures client.

use crate::client::KrakenFuturesClient;
use crate::error::KrakenError;
use crate::types::SendOrderRequest;
use anyhow::Result;
use async_trait::async_trait;
use mirror_core::{
    AccountSnapshot, Instrument, LimitOrder, MarketDataSource, SubmissionResult, Ticker,
    TradingAccount,
};

/// Wraps a client error for the engine, marking failures a later run may not hit.
fn venue_error(err: KrakenError, action: impl Into<String>) -> anyhow::Error {
    let action = action.into();
    if err.is_transient() {
        anyhow::Error::new(err).context(format!("{action} (transient, a later run may succeed)"))
    } else {
        anyhow::Error::new(err).context(action)
    }
}

#[async_trait]
impl MarketDataSource for KrakenFuturesClient {
    async fn fetch_instruments(&self) -> Result<Vec<Instrument>> {
        self.get_instruments()
            .await
            .map_err(|e| venue_error(e, "failed to fetch instruments"))
    }

    async fn fetch_tickers(&self) -> Result<Vec<Ticker>> {
        self.get_tickers()
            .await
            .map_err(|e| venue_error(e, "failed to fetch tickers"))
    }
}

#[async_trait]
impl TradingAccount for KrakenFuturesClient {
    async fn fetch_account_snapshot(&self) -> Result<AccountSnapshot> {
        let equity = self
            .get_portfolio_value()
            .await
            .map_err(|e| venue_error(e, "failed to fetch account equity"))?;
        let positions = self
            .get_open_positions()
            .await
            .map_err(|e| venue_error(e, "failed to fetch open positions"))?;

        Ok(AccountSnapshot::new(equity, positions)?)
    }

    async fn cancel_all_orders(&self) -> Result<usize> {
        KrakenFuturesClient::cancel_all_orders(self)
            .await
            .map_err(|e| venue_error(e, "failed to cancel open orders"))
    }

    async fn submit_limit_order(&self, order: &LimitOrder) -> Result<SubmissionResult> {
        self.send_order(&SendOrderRequest::from(order))
            .await
            .map_err(|e| venue_error(e, format!("failed to send order {order}")))
    }
}
