//! Shared helpers for integration tests.

use chrono::NaiveDate;
use std::collections::HashMap;

use matrader::domain::error::MatraderError;
use matrader::domain::series::{PriceBar, PriceSeries};
use matrader::ports::data_port::DataPort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily bars starting 2024-01-01.
pub fn make_series(prices: &[f64]) -> PriceSeries {
    let start = date(2024, 1, 1);
    let bars = prices
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            close,
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

/// In-memory data port for pipeline tests.
pub struct MockDataPort {
    series: HashMap<String, PriceSeries>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    pub fn with_series(mut self, code: &str, series: PriceSeries) -> Self {
        self.series.insert(code.to_string(), series);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MatraderError> {
        let series = self.series.get(code).ok_or_else(|| MatraderError::Data {
            reason: format!("no data for {code}"),
        })?;
        let bars = series
            .bars()
            .iter()
            .copied()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        PriceSeries::new(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MatraderError> {
        let mut codes: Vec<String> = self.series.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}
