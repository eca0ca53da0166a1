//! Kraken Futures integration for the position mirror.
//!
//! This crate provides:
//! - REST client with rate limiting for the Kraken Futures v3 API
//! - HMAC-SHA512 request signing with optional nonces
//! - Implementations of the `mirror-core` market-data and trading-account traits
//!
//! # Authentication
//!
//! Each account needs a public key and a base64 secret, read from
//! environment variables. By default:
//!
//! - `SOURCE_KRAKEN_FUTURES_KEY` / `SOURCE_KRAKEN_FUTURES_SECRET`: the account being copied
//! - `TARGET_KRAKEN_FUTURES_KEY` / `TARGET_KRAKEN_FUTURES_SECRET`: the follower account
//!
//! # API Endpoints
//!
//! - `GET /derivatives/api/v3/instruments` - Contract specifications
//! - `GET /derivatives/api/v3/tickers` - Mark prices
//! - `GET /derivatives/api/v3/accounts` - Portfolio value
//! - `GET /derivatives/api/v3/openpositions` - Open positions
//! - `POST /derivatives/api/v3/cancelallorders` - Cancel every open order
//! - `POST /derivatives/api/v3/sendorder` - Place a limit order

pub mod auth;
pub mod client;
pub mod error;
pub mod types;
pub mod venue;

pub use auth::{KrakenAuth, KrakenAuthConfig, NonceGenerator, SignedHeaders};
pub use client::{KrakenClientConfig, KrakenFuturesClient, KRAKEN_FUTURES_URL};
pub use error::{KrakenError, Result};
pub use types::SendOrderRequest;
