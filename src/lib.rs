//! xirr-report - brokerage money-weighted return tracker
//!
//! This library ingests a brokerage account's holdings and trade
//! history, reconciles them with FIFO lot matching, and computes
//! annualized money-weighted returns (XIRR) per security and for the
//! portfolio as a whole, split into realized and unrealized partitions.

pub mod brokers;
pub mod cashflow;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;
pub mod xirr;
