//! Plain-text report adapter.
//!
//! Mirrors the trade-log report format: final value, profit, ROI, Sharpe,
//! drawdown, loss streak, VaR/CVaR, then the fill list.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MatraderError;
use crate::domain::metrics::RiskReport;
use crate::domain::portfolio::TradeSide;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "undefined".to_string(),
    }
}

pub fn render(result: &BacktestResult, report: &RiskReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Backtest Report ===");
    let _ = writeln!(out, "Initial Capital: {:.2}", result.initial_capital);
    let _ = writeln!(out, "Final Portfolio Value: {:.2}", report.final_value);
    let _ = writeln!(out, "Profit: {:.2}", report.profit);
    let _ = writeln!(out, "ROI: {:.2} %", report.roi);
    let _ = writeln!(out, "Sharpe Ratio: {}", format_optional(report.sharpe_ratio));
    let _ = writeln!(out, "Max Drawdown: {:.6}", report.max_drawdown);
    let _ = writeln!(
        out,
        "Max Consecutive Losses: {}",
        report.max_consecutive_losses
    );
    let _ = writeln!(out, "VaR: {:.6}", report.var);
    let _ = writeln!(out, "CVaR: {}", format_optional(report.cvar));
    let _ = writeln!(out);
    let _ = writeln!(out, "Trades ({}):", result.trades.len());
    for trade in &result.trades {
        let side = match trade.side {
            TradeSide::Buy => "BUY ",
            TradeSide::Sell => "SELL",
        };
        let _ = writeln!(
            out,
            "  {} {} {:.4} shares @ {:.2}, cash {:.2}",
            trade.date, side, trade.shares, trade.price, trade.cash_after
        );
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        report: &RiskReport,
        output_path: &Path,
    ) -> Result<(), MatraderError> {
        fs::write(output_path, render(result, report))?;
        Ok(())
    }
}
