pub mod config;
pub mod config_loader;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod market;
pub mod normalize;
pub mod order;
pub mod position;
pub mod reconcile;
pub mod report;
pub mod traits;

pub use config::{AppConfig, CredentialsConfig, KrakenConfig};
pub use config_loader::ConfigLoader;
pub use dispatch::Dispatcher;
pub use engine::MirrorEngine;
pub use error::{AccountRole, MirrorError, Result};
pub use market::{Instrument, InstrumentCatalog, MarketSnapshot, Ticker};
pub use normalize::{round_price_away, round_size, PriceDirection};
pub use order::{LimitOrder, OrderIntent, OrderSide, SubmissionResult};
pub use position::{AccountSnapshot, Position, PositionSide};
pub use reconcile::{reconcile, EquityFloors, MirrorPlan, RatioContext, Reconciler};
pub use report::{DispatchedOrder, ReportFormatter, RunReport};
pub use traits::{MarketDataSource, TradingAccount};
