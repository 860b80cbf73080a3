//! Canonical data model shared by the adapters and the return engine.
//!
//! Adapters produce `Holding` and `RawTrade`; the normalizer turns raw
//! trades into `Trade`; everything downstream (`Lot`, `CashFlow`,
//! `ReturnResult`) is derived within a single run and never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trade direction. Sign of the cash flow is derived from this,
/// never from the amount itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl FromStr for TradeSide {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeSide::Buy),
            "SELL" => Ok(TradeSide::Sell),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Present mark-to-market value of an open position.
/// One entry per security actually held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub security_id: String,
    pub current_value: Decimal,
}

/// A trade as reported by an adapter, before normalization.
/// `amount` is the gross cash value (quantity x price); some providers
/// omit it for certain row types, in which case the trade is dropped.
#[derive(Debug, Clone)]
pub struct RawTrade {
    pub security_id: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub amount: Option<Decimal>,
    pub date: NaiveDate,
}

/// A normalized trade. `amount` is always non-negative; directionality
/// lives in `side`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub security_id: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// A trade or trade fragment produced by the FIFO matcher. Quantity and
/// amount may be a fraction of the original trade after splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub security_id: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl Lot {
    pub fn from_trade(trade: &Trade) -> Self {
        Self {
            security_id: trade.security_id.clone(),
            side: trade.side,
            quantity: trade.quantity,
            amount: trade.amount,
            date: trade.date,
        }
    }

    /// Split this lot into a fragment sized to `quantity` and the
    /// remainder. The fragment's amount is pro rata; the remainder
    /// takes whatever is left, so the two amounts always sum exactly
    /// to this lot's amount even when the division is non-terminating.
    pub fn split_at(&self, quantity: Decimal) -> (Self, Self) {
        let fragment_amount = if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.amount * quantity / self.quantity
        };
        let fragment = Self {
            security_id: self.security_id.clone(),
            side: self.side,
            quantity,
            amount: fragment_amount,
            date: self.date,
        };
        let remainder = Self {
            security_id: self.security_id.clone(),
            side: self.side,
            quantity: self.quantity - quantity,
            amount: self.amount - fragment_amount,
            date: self.date,
        };
        (fragment, remainder)
    }
}

/// A signed, dated cash flow. Outflows (buys) are negative, inflows
/// (sells, terminal valuations) are positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    pub amount: Decimal,
    pub when: NaiveDate,
}

/// Annualized money-weighted return for one security.
/// `None` means the solver could not produce a rate for its series.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnResult {
    pub security_id: String,
    /// Annualized rate as a fraction (0.10 = 10%), or None when the
    /// cash-flow series had no solution.
    pub annualized: Option<Decimal>,
}
