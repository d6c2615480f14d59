//! Moving-average calculators.
//!
//! Both averages produce one [`MaPoint`] per input bar. Points emitted before
//! enough history exists carry `valid: false` and must be ignored by
//! consumers; the simple variant needs `period` bars, the exponential variant
//! is valid from the first bar.

pub mod sma;
pub mod ema;

use chrono::NaiveDate;
use std::fmt;

use super::series::PriceSeries;

/// Which moving-average formula to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaKind {
    Simple,
    Exponential,
}

/// A single point in a moving-average series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

/// A moving-average series aligned to the input bar index.
#[derive(Debug, Clone, PartialEq)]
pub struct MaSeries {
    pub kind: MaKind,
    pub period: usize,
    pub values: Vec<MaPoint>,
}

impl MaSeries {
    /// Value at `index`, or `None` while the average is still warming up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for MaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaKind::Simple => write!(f, "SMA"),
            MaKind::Exponential => write!(f, "EMA"),
        }
    }
}

/// Dispatch on the configured kind.
pub fn calculate(kind: MaKind, series: &PriceSeries, period: usize) -> MaSeries {
    match kind {
        MaKind::Simple => sma::calculate_sma(series, period),
        MaKind::Exponential => ema::calculate_ema(series, period),
    }
}
