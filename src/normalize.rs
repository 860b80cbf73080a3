//! Trade normalizer
//!
//! Coerces raw adapter trades into the canonical [`Trade`] shape.
//! The only rule applied here: a trade with no resolvable cash amount
//! is excluded from all downstream computation, including the reported
//! trade total. Anything else wrong with an adapter payload (bad dates,
//! non-positive quantities) is an adapter contract violation and should
//! have failed at the adapter boundary.

use tracing::debug;

use crate::model::{RawTrade, Trade};

/// Normalize raw trades, dropping the ones without a usable amount.
pub fn normalize_trades(raw: Vec<RawTrade>) -> Vec<Trade> {
    let mut trades = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;

    for rt in raw {
        match rt.amount {
            Some(amount) => trades.push(Trade {
                security_id: rt.security_id,
                side: rt.side,
                quantity: rt.quantity,
                amount,
                date: rt.date,
            }),
            None => {
                dropped += 1;
                debug!(
                    security = %rt.security_id,
                    date = %rt.date,
                    "dropping trade without a cash amount"
                );
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = trades.len(), "trade normalization complete");
    }

    trades
}
