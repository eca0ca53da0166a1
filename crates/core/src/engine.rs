use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::market::{InstrumentCatalog, MarketSnapshot};
use crate::reconcile::{MirrorPlan, Reconciler};
use crate::report::RunReport;
use crate::traits::{MarketDataSource, TradingAccount};
use chrono::Utc;
use tracing::info;

/// One mirror run: fetch, reconcile, dispatch.
///
/// All venue access goes through the injected handles, so the reconciler
/// only ever sees immutable snapshots.
pub struct MirrorEngine<M, S, T>
where
    M: MarketDataSource,
    S: TradingAccount,
    T: TradingAccount,
{
    market_data: M,
    source: S,
    target: T,
    reconciler: Reconciler,
}

impl<M, S, T> MirrorEngine<M, S, T>
where
    M: MarketDataSource,
    S: TradingAccount,
    T: TradingAccount,
{
    pub fn new(market_data: M, source: S, target: T, reconciler: Reconciler) -> Self {
        Self {
            market_data,
            source,
            target,
            reconciler,
        }
    }

    /// Fetches the four snapshots and computes the plan without submitting it.
    pub async fn plan(&self) -> Result<MirrorPlan> {
        let instruments = InstrumentCatalog::new(self.market_data.fetch_instruments().await?);
        let market = MarketSnapshot::new(self.market_data.fetch_tickers().await?);
        let source = self.source.fetch_account_snapshot().await?;
        let target = self.target.fetch_account_snapshot().await?;

        info!(
            "snapshots: {} instruments, {} tickers, source {} positions (equity {}), target {} positions (equity {})",
            instruments.len(),
            market.len(),
            source.len(),
            source.equity(),
            target.len(),
            target.equity()
        );

        let plan = self
            .reconciler
            .plan(&source, &target, &instruments, &market)?;

        info!(
            "plan: ratio {}, {} closes, {} adjustments",
            plan.ratio.ratio,
            plan.closes().len(),
            plan.adjustments().len()
        );

        Ok(plan)
    }

    /// Computes the plan and submits it to the target account in order.
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let plan = self.plan().await?;

        let mut report = Dispatcher::new(&self.target).execute(&plan).await?;
        report.started_at = started_at;

        info!(
            "mirror run complete: {} cancelled, {} submitted",
            report.cancelled_orders,
            report.submitted.len()
        );
        Ok(report)
    }
}
