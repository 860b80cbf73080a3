//! CSV report writer
//!
//! Serializes a [`ReturnReport`] into the two-column layout the report
//! consumers expect: summary counters and per-security XIRR rows for
//! the holdings partition, a separator, then the same for the realized
//! partition. Rates are printed as percentages with two decimals; a
//! series without a solution prints as `NA`.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::model::ReturnResult;
use crate::report::ReturnReport;

/// Format a rate fraction as a percentage string, `NA` when absent.
pub fn format_rate(rate: Option<Decimal>) -> String {
    match rate {
        Some(r) => format!("{:.2}", r * Decimal::from(100)),
        None => "NA".to_string(),
    }
}

fn push_results(rows: &mut Vec<(String, String)>, results: &[ReturnResult]) {
    for r in results {
        rows.push((r.security_id.clone(), format_rate(r.annualized)));
    }
}

/// The report rows in output order, before serialization.
pub fn report_rows(report: &ReturnReport) -> Vec<(String, String)> {
    let mut rows = Vec::new();

    rows.push(("Total Trades".to_string(), report.total_trades.to_string()));
    rows.push((
        "Total Holdings Trades".to_string(),
        report.total_holdings_flows.to_string(),
    ));
    push_results(&mut rows, &report.holdings_returns);
    rows.push((
        "Holdings XIRR".to_string(),
        format_rate(report.portfolio_unrealized),
    ));

    rows.push(("------------".to_string(), "-------------".to_string()));

    rows.push((
        "Total Realized Lots".to_string(),
        report.total_realized_lots.to_string(),
    ));
    push_results(&mut rows, &report.realized_returns);
    rows.push((
        "Realized XIRR".to_string(),
        format_rate(report.portfolio_realized),
    ));

    if !report.unmatched_sell_quantity.is_zero() {
        rows.push((
            "Unmatched Sell Quantity".to_string(),
            report.unmatched_sell_quantity.to_string(),
        ));
    }

    rows
}

/// Write the CSV report as `<label>-<D Mon YYYY>.csv` under
/// `output_dir`, creating the directory if needed. Returns the path of
/// the written file.
pub fn write_csv_report(report: &ReturnReport, output_dir: &Path, label: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {:?}", output_dir))?;

    let file_name = format!("{}-{}.csv", label, report.as_of.format("%-d %b %Y"));
    let path = output_dir.join(file_name);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create report file {:?}", path))?;

    writer.write_record(["Stock Symbol", "XIRR"])?;
    for (name, value) in report_rows(report) {
        writer.write_record([name.as_str(), value.as_str()])?;
    }
    writer.flush().context("failed to flush report file")?;

    info!(path = %path.display(), "report successfully generated");
    Ok(path)
}
