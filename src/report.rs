//! Return report assembly
//!
//! Wires the pipeline end to end: normalize trades, FIFO-match each
//! security, aggregate cash flows, solve XIRR per series, and rank the
//! results. A solver failure on one security is logged and reported as
//! not-available; it never aborts the other securities.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::cashflow::aggregate;
use crate::matcher::{match_lots, MatchOutcome};
use crate::model::{CashFlow, Holding, RawTrade, ReturnResult, Trade};
use crate::normalize::normalize_trades;
use crate::xirr::xirr;

/// The terminal output of a run: ranked per-security returns plus the
/// summary counters the report writer prints.
#[derive(Debug, Clone)]
pub struct ReturnReport {
    pub as_of: NaiveDate,
    /// Trades that survived normalization.
    pub total_trades: usize,
    /// Realized lots across all securities (matched buy fragments plus
    /// the sells that consumed them).
    pub total_realized_lots: usize,
    /// Cash flows in the portfolio open-position series, the terminal
    /// valuation included.
    pub total_holdings_flows: usize,
    /// Per-security annualized return on open positions, ranked
    /// descending. Includes the terminal mark-to-market inflow.
    pub holdings_returns: Vec<ReturnResult>,
    /// Per-security annualized return on closed round-trips, ranked
    /// descending.
    pub realized_returns: Vec<ReturnResult>,
    /// Whole-portfolio annualized return on open positions.
    pub portfolio_unrealized: Option<Decimal>,
    /// Whole-portfolio annualized return on closed round-trips.
    pub portfolio_realized: Option<Decimal>,
    /// Total sell quantity that found no buy lot. Non-zero flags an
    /// incomplete trade history.
    pub unmatched_sell_quantity: Decimal,
}

/// Sort results descending by rate; not-available entries sort after
/// all numeric ones, keeping their relative order (the sort is stable).
pub fn rank_results(mut results: Vec<ReturnResult>) -> Vec<ReturnResult> {
    results.sort_by(|a, b| match (a.annualized, b.annualized) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    results
}

/// Run the full return-reconciliation pipeline.
///
/// `as_of` dates the terminal valuation flows; production passes
/// today's date, tests pass a fixed one.
pub fn build_report(
    holdings: &[Holding],
    raw_trades: Vec<RawTrade>,
    as_of: NaiveDate,
) -> ReturnReport {
    let trades = normalize_trades(raw_trades);
    let total_trades = trades.len();

    let mut by_security: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        by_security
            .entry(trade.security_id.clone())
            .or_default()
            .push(trade);
    }

    let outcomes: BTreeMap<String, MatchOutcome> = by_security
        .into_iter()
        .map(|(security, trades)| (security, match_lots(&trades)))
        .collect();

    let total_realized_lots = outcomes.values().map(|o| o.realized.len()).sum();
    let unmatched_sell_quantity = outcomes
        .values()
        .map(|o| o.unmatched_sell_quantity)
        .sum::<Decimal>();

    let series = aggregate(&outcomes, holdings, as_of);

    let report = ReturnReport {
        as_of,
        total_trades,
        total_realized_lots,
        total_holdings_flows: series.portfolio_open.len(),
        holdings_returns: rank_results(solve_all(&series.open_by_security)),
        realized_returns: rank_results(solve_all(&series.realized_by_security)),
        portfolio_unrealized: solve_one("portfolio open positions", &series.portfolio_open),
        portfolio_realized: solve_one("portfolio realized", &series.portfolio_realized),
        unmatched_sell_quantity,
    };

    info!(
        trades = report.total_trades,
        realized_lots = report.total_realized_lots,
        held_securities = report.holdings_returns.len(),
        "return report built"
    );
    report
}

fn solve_all(by_security: &BTreeMap<String, Vec<CashFlow>>) -> Vec<ReturnResult> {
    by_security
        .iter()
        .map(|(security, flows)| ReturnResult {
            security_id: security.clone(),
            annualized: solve_one(security, flows),
        })
        .collect()
}

fn solve_one(label: &str, flows: &[CashFlow]) -> Option<Decimal> {
    if flows.is_empty() {
        return None;
    }
    match xirr(flows) {
        Ok(rate) => Some(rate),
        Err(err) => {
            warn!(series = label, error = %err, "failed to calculate XIRR");
            None
        }
    }
}
