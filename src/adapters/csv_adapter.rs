//! CSV file data adapter.
//!
//! One `{code}.csv` per symbol under the base path with `date,close` rows.
//! Also reads an assets-as-columns returns matrix for the optimizer and
//! exports equity curves.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::MatraderError;
use crate::domain::montecarlo::ReturnsMatrix;
use crate::domain::portfolio::EquityPoint;
use crate::domain::series::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}.csv"))
    }
}

fn data_error(reason: impl Into<String>) -> MatraderError {
    MatraderError::Data {
        reason: reason.into(),
    }
}

impl DataPort for CsvDataAdapter {
    fn fetch_closes(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MatraderError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {e}", path.display())))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {e}")))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| data_error("missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| data_error(format!("invalid date format: {e}")))?;

            if date < start_date || date > end_date {
                continue;
            }

            let close: f64 = record
                .get(1)
                .ok_or_else(|| data_error("missing close column"))?
                .parse()
                .map_err(|e| data_error(format!("invalid close value: {e}")))?;

            bars.push(PriceBar { date, close });
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::new(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MatraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {e}",
                self.base_path.display()
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {e}")))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Read a returns matrix from a CSV with one column per asset (header row
/// names the assets) and one row per observation. Returns the asset names
/// with rows transposed to assets x observations.
pub fn read_returns_matrix(path: &Path) -> Result<(Vec<String>, ReturnsMatrix), MatraderError> {
    let content = fs::read_to_string(path)
        .map_err(|e| data_error(format!("failed to read {}: {e}", path.display())))?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| data_error(format!("CSV parse error: {e}")))?;
    let codes: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    if codes.is_empty() {
        return Err(data_error("returns matrix has no columns"));
    }

    let mut rows: Vec<Vec<f64>> = vec![Vec::new(); codes.len()];
    for result in rdr.records() {
        let record = result.map_err(|e| data_error(format!("CSV parse error: {e}")))?;
        if record.len() != codes.len() {
            return Err(data_error(format!(
                "expected {} columns, got {}",
                codes.len(),
                record.len()
            )));
        }
        for (asset, field) in record.iter().enumerate() {
            let value: f64 = field
                .trim()
                .parse()
                .map_err(|e| data_error(format!("invalid return value {field:?}: {e}")))?;
            rows[asset].push(value);
        }
    }

    Ok((codes, ReturnsMatrix::new(rows)?))
}

/// Export an equity curve as `date,value` rows.
pub fn write_equity_curve(path: &Path, curve: &[EquityPoint]) -> Result<(), MatraderError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| data_error(format!("failed to open {}: {e}", path.display())))?;
    wtr.write_record(["date", "value"])
        .map_err(|e| data_error(format!("CSV write error: {e}")))?;
    for point in curve {
        wtr.write_record([point.date.to_string(), point.value.to_string()])
            .map_err(|e| data_error(format!("CSV write error: {e}")))?;
    }
    wtr.flush()?;
    Ok(())
}
