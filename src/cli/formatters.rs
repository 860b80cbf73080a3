//! Output formatting module for CLI display
//!
//! Renders a computed return report as terminal tables, separating the
//! concerns of calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::export::format_rate;
use crate::model::ReturnResult;
use crate::report::ReturnReport;

#[derive(Tabled)]
struct ReturnRow {
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "XIRR %")]
    rate: String,
}

fn results_table(results: &[ReturnResult]) -> String {
    let rows: Vec<ReturnRow> = results
        .iter()
        .map(|r| ReturnRow {
            security: r.security_id.clone(),
            rate: match r.annualized {
                Some(rate) if rate >= Decimal::ZERO => format_rate(r.annualized).green().to_string(),
                Some(_) => format_rate(r.annualized).red().to_string(),
                None => "NA".dimmed().to_string(),
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Format the full report for JSON output
pub fn format_report_json(report: &ReturnReport) -> String {
    #[derive(Serialize)]
    struct JsonReturn {
        security: String,
        xirr_pct: Option<String>,
    }

    #[derive(Serialize)]
    struct JsonReport {
        as_of: String,
        total_trades: usize,
        total_holdings_flows: usize,
        total_realized_lots: usize,
        holdings: Vec<JsonReturn>,
        realized: Vec<JsonReturn>,
        holdings_xirr_pct: Option<String>,
        realized_xirr_pct: Option<String>,
        unmatched_sell_quantity: String,
    }

    fn to_json_returns(results: &[ReturnResult]) -> Vec<JsonReturn> {
        results
            .iter()
            .map(|r| JsonReturn {
                security: r.security_id.clone(),
                xirr_pct: r.annualized.map(|_| format_rate(r.annualized)),
            })
            .collect()
    }

    let json_report = JsonReport {
        as_of: report.as_of.to_string(),
        total_trades: report.total_trades,
        total_holdings_flows: report.total_holdings_flows,
        total_realized_lots: report.total_realized_lots,
        holdings: to_json_returns(&report.holdings_returns),
        realized: to_json_returns(&report.realized_returns),
        holdings_xirr_pct: report.portfolio_unrealized.map(|_| format_rate(report.portfolio_unrealized)),
        realized_xirr_pct: report.portfolio_realized.map(|_| format_rate(report.portfolio_realized)),
        unmatched_sell_quantity: report.unmatched_sell_quantity.to_string(),
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the full report for terminal output.
pub fn format_report(report: &ReturnReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} XIRR report as of {} ({} trades)\n",
        "Summary:".cyan().bold(),
        report.as_of,
        report.total_trades
    ));

    if !report.holdings_returns.is_empty() {
        output.push_str(&format!("\n{}\n", "Open positions".bold()));
        output.push_str(&results_table(&report.holdings_returns));
        output.push_str(&format!(
            "\nHoldings XIRR: {}%\n",
            format_rate(report.portfolio_unrealized).bold()
        ));
    }

    if !report.realized_returns.is_empty() {
        output.push_str(&format!(
            "\n{} ({} lots)\n",
            "Realized positions".bold(),
            report.total_realized_lots
        ));
        output.push_str(&results_table(&report.realized_returns));
        output.push_str(&format!(
            "\nRealized XIRR: {}%\n",
            format_rate(report.portfolio_realized).bold()
        ));
    }

    if !report.unmatched_sell_quantity.is_zero() {
        output.push_str(&format!(
            "\n{} {} units sold without a matching buy lot; trade history may be incomplete\n",
            "warning:".yellow().bold(),
            report.unmatched_sell_quantity
        ));
    }

    output
}
