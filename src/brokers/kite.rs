//! Zerodha Kite adapter
//!
//! Holdings come from the Kite portfolio endpoint; the trade history
//! comes from the Console tradebook, which is paginated per calendar
//! year. The tradebook occasionally answers before its pagination block
//! is ready; those responses are retried under a bounded policy instead
//! of looping forever.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::KiteConfig;
use crate::error::EngineError;
use crate::model::{Holding, RawTrade, TradeSide};

use super::{BrokerAdapter, RetryPolicy};

const HOLDINGS_ENDPOINT: &str = "https://kite.zerodha.com/api/portfolio/holdings/kite";
const CSRF_TOKEN_HEADER: &str = "X-Csrftoken";

fn tradebook_url(year: i32, page: u32) -> String {
    format!(
        "https://console.zerodha.com/api/reports/tradebook?segment=EQ\
         &from_date={year}-01-01&to_date={year}-12-31&page={page}\
         &sort_by=order_execution_time&sort_desc=false"
    )
}

#[derive(Debug, Deserialize)]
struct HoldingsResponse {
    data: Vec<KiteHolding>,
}

#[derive(Debug, Deserialize)]
struct KiteHolding {
    tradingsymbol: String,
    last_price: f64,
    opening_quantity: f64,
}

#[derive(Debug, Deserialize)]
struct TradebookResponse {
    data: TradebookData,
}

#[derive(Debug, Deserialize)]
struct TradebookData {
    result: Vec<KiteTrade>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    page: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct KiteTrade {
    tradingsymbol: String,
    trade_type: String,
    quantity: f64,
    price: f64,
    trade_date: String,
}

pub struct KiteAdapter {
    client: Client,
    config: KiteConfig,
    retry: RetryPolicy,
}

impl KiteAdapter {
    pub fn new(config: KiteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            retry: RetryPolicy::default(),
        }
    }

    /// Fetch one tradebook page, retrying while the pagination block is
    /// missing from the response.
    async fn fetch_page(&self, year: i32, page: u32) -> Result<(Vec<KiteTrade>, Pagination)> {
        for attempt in 1..=self.retry.max_attempts {
            let response: TradebookResponse = self
                .client
                .get(tradebook_url(year, page))
                .header("Cookie", &self.config.cookie_trades)
                .header(CSRF_TOKEN_HEADER, &self.config.csrf_token)
                .send()
                .await
                .with_context(|| format!("tradebook request failed for {year} page {page}"))?
                .error_for_status()
                .context("tradebook request rejected")?
                .json()
                .await
                .context("failed to decode tradebook response")?;

            match response.data.pagination {
                Some(pagination) => return Ok((response.data.result, pagination)),
                None => {
                    debug!(year, page, attempt, "tradebook pagination not ready, retrying");
                    tokio::time::sleep(self.retry.backoff).await;
                }
            }
        }
        Err(EngineError::AdapterError(format!(
            "tradebook pagination missing after {} attempts (year {year}, page {page})",
            self.retry.max_attempts
        ))
        .into())
    }

    async fn fetch_year(&self, year: i32) -> Result<Vec<KiteTrade>> {
        let mut trades = Vec::new();
        let mut page = 1;
        loop {
            let (mut result, pagination) = self.fetch_page(year, page).await?;
            trades.append(&mut result);
            if pagination.total_pages == 0 || pagination.page >= pagination.total_pages {
                break;
            }
            page += 1;
        }
        info!(year, trades = trades.len(), "fetched tradebook year");
        Ok(trades)
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_raw_trade(trade: KiteTrade) -> Result<RawTrade> {
    let side: TradeSide = trade
        .trade_type
        .parse()
        .map_err(|_| EngineError::AdapterError(format!("unknown trade type {}", trade.trade_type)))?;
    let date = NaiveDate::parse_from_str(&trade.trade_date, "%Y-%m-%d")
        .with_context(|| format!("bad trade date {}", trade.trade_date))?;
    let quantity = to_decimal(trade.quantity);
    Ok(RawTrade {
        security_id: trade.tradingsymbol,
        side,
        quantity,
        amount: Some(quantity * to_decimal(trade.price)),
        date,
    })
}

#[async_trait]
impl BrokerAdapter for KiteAdapter {
    fn name(&self) -> &'static str {
        "kite"
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>> {
        let response: HoldingsResponse = self
            .client
            .get(HOLDINGS_ENDPOINT)
            .header("Cookie", &self.config.cookie_holdings)
            .header(CSRF_TOKEN_HEADER, &self.config.csrf_token)
            .send()
            .await
            .context("holdings request failed")?
            .error_for_status()
            .context("holdings request rejected")?
            .json()
            .await
            .context("failed to decode holdings response")?;

        Ok(response
            .data
            .into_iter()
            .map(|h| Holding {
                security_id: h.tradingsymbol,
                current_value: to_decimal(h.last_price) * to_decimal(h.opening_quantity),
            })
            .collect())
    }

    async fn fetch_trades(&self) -> Result<Vec<RawTrade>> {
        let current_year = Local::now().year();
        let mut trades = Vec::new();
        for year in self.config.start_year..=current_year {
            for trade in self.fetch_year(year).await? {
                trades.push(to_raw_trade(trade)?);
            }
        }
        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_raw_trade_maps_fields() {
        let trade = KiteTrade {
            tradingsymbol: "INFY".to_string(),
            trade_type: "buy".to_string(),
            quantity: 10.0,
            price: 1500.5,
            trade_date: "2023-04-17".to_string(),
        };
        let raw = to_raw_trade(trade).unwrap();
        assert_eq!(raw.security_id, "INFY");
        assert_eq!(raw.side, TradeSide::Buy);
        assert_eq!(raw.quantity, dec!(10));
        assert_eq!(raw.amount, Some(dec!(15005)));
        assert_eq!(raw.date, NaiveDate::from_ymd_opt(2023, 4, 17).unwrap());
    }

    #[test]
    fn test_to_raw_trade_rejects_unknown_side() {
        let trade = KiteTrade {
            tradingsymbol: "INFY".to_string(),
            trade_type: "short".to_string(),
            quantity: 1.0,
            price: 1.0,
            trade_date: "2023-04-17".to_string(),
        };
        assert!(to_raw_trade(trade).is_err());
    }

    #[test]
    fn test_tradebook_url_shape() {
        let url = tradebook_url(2021, 3);
        assert!(url.contains("from_date=2021-01-01"));
        assert!(url.contains("to_date=2021-12-31"));
        assert!(url.contains("page=3"));
    }
}
