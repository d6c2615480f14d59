//! JSON report adapter.
//!
//! Machine-readable export of the risk report plus trades and equity curve;
//! `None` sentinels serialize as null.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MatraderError;
use crate::domain::metrics::RiskReport;
use crate::domain::portfolio::{EquityPoint, Trade};
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

#[derive(Serialize)]
struct JsonReport<'a> {
    initial_capital: f64,
    report: &'a RiskReport,
    trades: &'a [Trade],
    equity_curve: &'a [EquityPoint],
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        report: &RiskReport,
        output_path: &Path,
    ) -> Result<(), MatraderError> {
        let body = JsonReport {
            initial_capital: result.initial_capital,
            report,
            trades: &result.trades,
            equity_curve: &result.equity_curve,
        };
        let json = serde_json::to_string_pretty(&body).map_err(|e| MatraderError::Data {
            reason: format!("JSON serialization failed: {e}"),
        })?;
        fs::write(output_path, json)?;
        Ok(())
    }
}
