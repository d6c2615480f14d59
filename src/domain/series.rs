//! Close-price series representation.

use chrono::NaiveDate;

use super::error::MatraderError;

/// A single trading-day observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered close-price series with strictly ascending, unique dates.
///
/// Calendar gaps (weekends, holidays, missing days) pass through unmodified;
/// only the ordering is enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate dates and
    /// non-finite closes.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, MatraderError> {
        for window in bars.windows(2) {
            if window[1].date <= window[0].date {
                return Err(MatraderError::Data {
                    reason: format!(
                        "dates must be strictly ascending: {} followed by {}",
                        window[0].date, window[1].date
                    ),
                });
            }
        }
        if let Some(bar) = bars.iter().find(|b| !b.close.is_finite()) {
            return Err(MatraderError::Data {
                reason: format!("non-finite close on {}", bar.date),
            });
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }
}
