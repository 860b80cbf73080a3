//! INDmoney adapter
//!
//! Bearer-token authenticated; both endpoints answer in a single page.
//! Transaction rows sometimes carry no amount (corporate credits,
//! pending settlements); those map to `RawTrade.amount = None` and are
//! dropped by the normalizer downstream.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::IndmoneyConfig;
use crate::error::EngineError;
use crate::model::{Holding, RawTrade, TradeSide};

use super::BrokerAdapter;

const HOLDINGS_ENDPOINT: &str = "https://apixt-fz.indmoney.com/us-stocks-ext/api/v1/stocks/dw/user/account/holdings/?page=1&limit=30";
const TRADES_ENDPOINT: &str = "https://apixt-fz.indmoney.com/us-stocks-ext/api/v3/getTransactionsPageWidget/?identifier=CT&page=1&limit=1000";

#[derive(Debug, Deserialize)]
struct HoldingsResponse {
    data: Vec<IndHolding>,
}

#[derive(Debug, Deserialize)]
struct IndHolding {
    ticker: String,
    current_value: f64,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    data: TransactionsData,
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
    widget_properties: WidgetProperties,
}

#[derive(Debug, Deserialize)]
struct WidgetProperties {
    list: Vec<IndTransaction>,
}

#[derive(Debug, Deserialize)]
struct IndTransaction {
    #[serde(rename = "stockId")]
    stock_id: String,
    #[serde(rename = "type")]
    side: String,
    quantity: f64,
    amount: Option<f64>,
    #[serde(rename = "sectionStart")]
    section_start: SectionStart,
}

#[derive(Debug, Deserialize)]
struct SectionStart {
    /// Transaction date, e.g. "17 Apr 2023".
    subtitle: String,
}

pub struct IndmoneyAdapter {
    client: Client,
    config: IndmoneyConfig,
}

impl IndmoneyAdapter {
    pub fn new(config: IndmoneyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .with_context(|| format!("bad transaction date {:?}", raw))
}

fn to_raw_trade(tx: IndTransaction) -> Result<RawTrade> {
    let side: TradeSide = tx
        .side
        .parse()
        .map_err(|_| EngineError::AdapterError(format!("unknown transaction type {}", tx.side)))?;
    Ok(RawTrade {
        security_id: tx.stock_id,
        side,
        quantity: Decimal::try_from(tx.quantity).unwrap_or(Decimal::ZERO),
        amount: tx
            .amount
            .map(|a| Decimal::try_from(a).unwrap_or(Decimal::ZERO)),
        date: parse_date(&tx.section_start.subtitle)?,
    })
}

#[async_trait]
impl BrokerAdapter for IndmoneyAdapter {
    fn name(&self) -> &'static str {
        "indmoney"
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>> {
        let response: HoldingsResponse = self
            .client
            .get(HOLDINGS_ENDPOINT)
            .header("platform", "web")
            .bearer_auth(&self.config.auth_token)
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
                security_id: h.ticker,
                current_value: Decimal::try_from(h.current_value).unwrap_or(Decimal::ZERO),
            })
            .collect())
    }

    async fn fetch_trades(&self) -> Result<Vec<RawTrade>> {
        let response: TransactionsResponse = self
            .client
            .get(TRADES_ENDPOINT)
            .header("platform", "web")
            .bearer_auth(&self.config.auth_token)
            .send()
            .await
            .context("transactions request failed")?
            .error_for_status()
            .context("transactions request rejected")?
            .json()
            .await
            .context("failed to decode transactions response")?;

        response
            .data
            .widget_properties
            .list
            .into_iter()
            .map(to_raw_trade)
            .collect()
    }
}
