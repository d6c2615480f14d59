//! Market-data access port trait.

use chrono::NaiveDate;

use crate::domain::error::MatraderError;
use crate::domain::series::PriceSeries;

pub trait DataPort {
    /// Close-price series for one symbol over a date range, ascending.
    fn fetch_closes(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MatraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, MatraderError>;
}
