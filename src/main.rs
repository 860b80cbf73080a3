use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::info;

use xirr_report::brokers::{fetch_snapshot, BrokerAdapter, IndmoneyAdapter, KiteAdapter};
use xirr_report::cli::{formatters, Broker, Cli, Commands};
use xirr_report::config::Config;
use xirr_report::export::write_csv_report;
use xirr_report::report::build_report;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let json_output = cli.json;

    match cli.command {
        Commands::Report {
            broker,
            config,
            output_dir,
            dry_run,
        } => {
            let config = Config::load(&config)?;

            let adapter: Box<dyn BrokerAdapter> = match broker {
                Broker::Kite => Box::new(KiteAdapter::new(config.kite()?.clone())),
                Broker::Indmoney => Box::new(IndmoneyAdapter::new(config.indmoney()?.clone())),
            };

            let snapshot = fetch_snapshot(adapter.as_ref()).await?;
            let report = build_report(
                &snapshot.holdings,
                snapshot.trades,
                Local::now().date_naive(),
            );

            if json_output {
                println!("{}", formatters::format_report_json(&report));
            } else {
                println!("{}", formatters::format_report(&report));
            }

            if dry_run {
                info!("dry run, skipping CSV output");
            } else {
                let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
                let label = format!("{}-{}", adapter.name(), config.username);
                let path = write_csv_report(&report, &dir, &label)?;
                println!("Report written to {}", path.display());
            }

            Ok(())
        }
    }
}
