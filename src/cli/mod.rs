use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "xirr-report")]
#[command(version, about = "Brokerage XIRR report tool")]
#[command(
    long_about = "Fetch holdings and trade history from a brokerage account, reconcile them \
with FIFO lot matching, and compute annualized money-weighted returns (XIRR) per security \
and for the portfolio as a whole."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output the report in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the XIRR report for one broker account
    Report {
        /// Broker to fetch from
        #[arg(value_enum)]
        broker: Broker,

        /// Path to the TOML config file with credentials
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Override the output directory from the config
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the report without writing the CSV file
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Broker {
    /// Zerodha Kite (Indian equities)
    Kite,
    /// INDmoney (US stocks)
    Indmoney,
}
