//! FIFO lot matcher
//!
//! Converts the full trade history of a single security into two
//! partitions: realized lots (completed round-trips: consumed buy
//! fragments plus the sells that consumed them) and open lots (the buy
//! lots still backing the current holding).
//!
//! Sells are processed in date order against a queue of buy lots,
//! oldest first. A partial match replaces the head of the queue with a
//! new, smaller lot instead of mutating a shared record, so no lot is
//! ever aliased between the realized and open partitions.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use tracing::warn;

use crate::model::{Lot, Trade, TradeSide};

/// Result of matching one security's trade history.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Buy fragments consumed by sells, interleaved with the sells
    /// themselves, in match order.
    pub realized: Vec<Lot>,
    /// Buy lots (or fragments) never consumed by a sell.
    pub open: Vec<Lot>,
    /// Sell quantity that found no buy lot to match against. Non-zero
    /// means the trade history is incomplete for this security.
    pub unmatched_sell_quantity: Decimal,
}

/// Match all trades of one security, FIFO.
///
/// Trades may arrive in any order; they are sorted by date here (stable,
/// ties keep input order). A sell larger than the remaining bought
/// quantity is a data-integrity problem in the input: the unmatched
/// remainder is logged and reported on the outcome, the sell's cash
/// flow still enters the realized partition in full.
pub fn match_lots(trades: &[Trade]) -> MatchOutcome {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut open: VecDeque<Lot> = ordered
        .iter()
        .filter(|t| t.side == TradeSide::Buy)
        .map(|t| Lot::from_trade(t))
        .collect();

    let mut realized = Vec::new();
    let mut unmatched_sell_quantity = Decimal::ZERO;

    for sell in ordered.iter().filter(|t| t.side == TradeSide::Sell) {
        let mut remaining = sell.quantity;

        while remaining > Decimal::ZERO {
            match open.front_mut() {
                None => break,
                Some(head) if head.quantity <= remaining => {
                    remaining -= head.quantity;
                    if let Some(lot) = open.pop_front() {
                        realized.push(lot);
                    }
                }
                Some(head) => {
                    // Split the head: the consumed fragment is realized,
                    // the remainder stays at the front of the queue.
                    let (consumed, kept) = head.split_at(remaining);
                    realized.push(consumed);
                    *head = kept;
                    remaining = Decimal::ZERO;
                }
            }
        }

        if remaining > Decimal::ZERO {
            warn!(
                security = %sell.security_id,
                sell_date = %sell.date,
                unmatched = %remaining,
                "sell exceeds available bought quantity; ignoring unmatched remainder"
            );
            unmatched_sell_quantity += remaining;
        }

        realized.push(Lot::from_trade(sell));
    }

    MatchOutcome {
        realized,
        open: open.into_iter().collect(),
        unmatched_sell_quantity,
    }
}
