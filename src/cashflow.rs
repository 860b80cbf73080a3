//! Cash-flow aggregator
//!
//! Turns matched lots into signed, dated cash-flow series. Buys are
//! cash out (negative), sells are cash in (positive). Open positions
//! get one synthetic terminal inflow equal to the holding's current
//! market value, dated `as_of`: the "what if you sold everything
//! today" valuation. Fully-closed (realized) series carry no terminal
//! entry.
//!
//! Grouping by security is done once into ordered maps; the result is
//! treated as read-only by the solver stage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::matcher::MatchOutcome;
use crate::model::{CashFlow, Holding, Lot, TradeSide};

/// All cash-flow series derived from one run of the matcher.
#[derive(Debug, Clone, Default)]
pub struct CashFlowSeries {
    /// Per-security open-position series: open buy lots plus the
    /// terminal valuation. Only securities that are actually held and
    /// have at least one open lot appear here.
    pub open_by_security: BTreeMap<String, Vec<CashFlow>>,
    /// Per-security realized series: matched buy/sell lot pairs, no
    /// terminal entry. Only securities with at least one realized lot.
    pub realized_by_security: BTreeMap<String, Vec<CashFlow>>,
    /// Every held security's open buy-lot flows plus a single terminal
    /// inflow equal to the sum of all holdings' current values.
    pub portfolio_open: Vec<CashFlow>,
    /// Every security's realized flows, concatenated.
    pub portfolio_realized: Vec<CashFlow>,
}

/// Sign a lot's amount by its side.
fn signed(lot: &Lot) -> CashFlow {
    let amount = match lot.side {
        TradeSide::Buy => -lot.amount,
        TradeSide::Sell => lot.amount,
    };
    CashFlow {
        amount,
        when: lot.date,
    }
}

/// Assemble per-security and portfolio-level series from the match
/// outcomes and current holdings.
pub fn aggregate(
    outcomes: &BTreeMap<String, MatchOutcome>,
    holdings: &[Holding],
    as_of: NaiveDate,
) -> CashFlowSeries {
    let mut series = CashFlowSeries::default();

    let held: BTreeMap<&str, Decimal> = holdings
        .iter()
        .map(|h| (h.security_id.as_str(), h.current_value))
        .collect();

    let mut total_holding_value = Decimal::ZERO;

    for holding in holdings {
        total_holding_value += holding.current_value;
    }

    for (security, outcome) in outcomes {
        if !outcome.realized.is_empty() {
            let flows: Vec<CashFlow> = outcome.realized.iter().map(signed).collect();
            series.portfolio_realized.extend(flows.iter().copied());
            series.realized_by_security.insert(security.clone(), flows);
        }

        let current_value = match held.get(security.as_str()) {
            Some(v) => *v,
            None => continue,
        };
        if outcome.open.is_empty() {
            continue;
        }

        let mut flows: Vec<CashFlow> = outcome.open.iter().map(signed).collect();
        series.portfolio_open.extend(flows.iter().copied());
        flows.push(CashFlow {
            amount: current_value,
            when: as_of,
        });
        series.open_by_security.insert(security.clone(), flows);
    }

    if !series.portfolio_open.is_empty() || !held.is_empty() {
        series.portfolio_open.push(CashFlow {
            amount: total_holding_value,
            when: as_of,
        });
    }

    series
}
