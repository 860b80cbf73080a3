//! XIRR solver
//!
//! Finds the annualized rate `r` that zeroes the net present value of
//! an irregular, dated cash-flow series:
//!
//! ```text
//! sum_i amount_i / (1 + r)^((date_i - date_0) / 365) = 0
//! ```
//!
//! Newton-Raphson from a 10% initial guess, with a bisection fallback
//! when the derivative degenerates or Newton oscillates. The iteration
//! runs in f64 because it needs fractional powers; amounts enter and
//! the rate leaves as `Decimal` so no float arithmetic touches the
//! engine's money math.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::EngineError;
use crate::model::CashFlow;

const MAX_ITERATIONS: usize = 100;
const NPV_TOLERANCE: f64 = 1e-6;
/// Rates at or below -100% make the discount factor undefined.
const MIN_RATE: f64 = -0.999_999;
const MAX_RATE: f64 = 100.0;

/// Solve for the annualized money-weighted return of `flows`.
///
/// Requires at least one inflow and one outflow; a series without a
/// sign change has no real root and yields `InvalidCashFlowSet`.
pub fn xirr(flows: &[CashFlow]) -> Result<Decimal, EngineError> {
    if flows.len() < 2 {
        return Err(EngineError::InvalidCashFlowSet(format!(
            "need at least 2 cash flows, got {}",
            flows.len()
        )));
    }
    let has_outflow = flows.iter().any(|f| f.amount < Decimal::ZERO);
    let has_inflow = flows.iter().any(|f| f.amount > Decimal::ZERO);
    if !has_outflow || !has_inflow {
        return Err(EngineError::InvalidCashFlowSet(
            "series has no sign change".to_string(),
        ));
    }

    // Earliest date anchors the day count.
    let base = flows
        .iter()
        .map(|f| f.when)
        .min()
        .ok_or_else(|| EngineError::InvalidCashFlowSet("empty series".to_string()))?;

    let terms: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| {
            let years = (f.when - base).num_days() as f64 / 365.0;
            (f.amount.to_f64().unwrap_or_default(), years)
        })
        .collect();

    let rate = newton(&terms)
        .or_else(|| bisect(&terms))
        .ok_or(EngineError::NoConvergence(MAX_ITERATIONS))?;

    Decimal::from_f64(rate).ok_or(EngineError::NoConvergence(MAX_ITERATIONS))
}

fn npv_and_derivative(terms: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut derivative = 0.0;
    for &(amount, years) in terms {
        npv += amount * (1.0 + rate).powf(-years);
        derivative -= years * amount * (1.0 + rate).powf(-years - 1.0);
    }
    (npv, derivative)
}

fn newton(terms: &[(f64, f64)]) -> Option<f64> {
    let mut rate = 0.1;
    for _ in 0..MAX_ITERATIONS {
        let (npv, derivative) = npv_and_derivative(terms, rate);
        if npv.abs() < NPV_TOLERANCE {
            return Some(rate);
        }
        if derivative.abs() < 1e-12 {
            return None;
        }
        let next = (rate - npv / derivative).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < 1e-10 {
            let (npv, _) = npv_and_derivative(terms, next);
            return (npv.abs() < NPV_TOLERANCE).then_some(next);
        }
        rate = next;
    }
    None
}

/// Fallback: walk a coarse grid over the valid rate range looking for a
/// sign change of the NPV, then bisect it down to tolerance.
fn bisect(terms: &[(f64, f64)]) -> Option<f64> {
    let mut prev_rate = MIN_RATE;
    let (mut prev_npv, _) = npv_and_derivative(terms, prev_rate);

    let mut bracket = None;
    let steps = 1000;
    for i in 1..=steps {
        let rate = MIN_RATE + (MAX_RATE - MIN_RATE) * i as f64 / steps as f64;
        let (npv, _) = npv_and_derivative(terms, rate);
        if npv == 0.0 {
            return Some(rate);
        }
        if prev_npv.is_finite() && npv.is_finite() && prev_npv * npv < 0.0 {
            bracket = Some((prev_rate, rate));
            break;
        }
        prev_rate = rate;
        prev_npv = npv;
    }

    let (mut lo, mut hi) = bracket?;
    let (mut lo_npv, _) = npv_and_derivative(terms, lo);
    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        let (mid_npv, _) = npv_and_derivative(terms, mid);
        if mid_npv.abs() < NPV_TOLERANCE {
            return Some(mid);
        }
        if lo_npv * mid_npv < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            lo_npv = mid_npv;
        }
    }
    None
}
