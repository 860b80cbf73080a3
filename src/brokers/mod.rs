//! Broker adapters
//!
//! Each adapter wraps one provider's API and produces the canonical
//! `Holding` / `RawTrade` lists; pagination, authentication headers and
//! rate-limit backoff are entirely the adapter's concern. The engine
//! never sees a provider response shape.

pub mod indmoney;
pub mod kite;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::model::{Holding, RawTrade};

pub use indmoney::IndmoneyAdapter;
pub use kite::KiteAdapter;

/// Everything the engine needs from one brokerage account.
#[derive(Debug, Clone)]
pub struct BrokerSnapshot {
    pub holdings: Vec<Holding>,
    pub trades: Vec<RawTrade>,
}

/// Bounded retry for provider endpoints that answer before their data
/// is ready (e.g. a tradebook page with no pagination block yet).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(500),
        }
    }
}

#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_holdings(&self) -> Result<Vec<Holding>>;

    async fn fetch_trades(&self) -> Result<Vec<RawTrade>>;
}

/// Fetch holdings and trades concurrently and join the results. Empty
/// lists are valid; a failed fetch is fatal to the run.
pub async fn fetch_snapshot(adapter: &dyn BrokerAdapter) -> Result<BrokerSnapshot> {
    info!(broker = adapter.name(), "fetching holdings and trades");
    let (holdings, trades) = tokio::try_join!(adapter.fetch_holdings(), adapter.fetch_trades())?;
    info!(
        broker = adapter.name(),
        holdings = holdings.len(),
        trades = trades.len(),
        "fetch complete"
    );
    Ok(BrokerSnapshot { holdings, trades })
}
