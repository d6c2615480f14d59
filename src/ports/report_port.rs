//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MatraderError;
use crate::domain::metrics::RiskReport;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        report: &RiskReport,
        output_path: &Path,
    ) -> Result<(), MatraderError>;
}
