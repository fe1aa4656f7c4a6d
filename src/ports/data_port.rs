//! Price data access port trait.

use crate::domain::error::FoliostatError;
use crate::domain::series::PricePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch an instrument's full normalized price history, sorted by date.
    fn fetch_prices(&self, id: &str) -> Result<Vec<PricePoint>, FoliostatError>;

    fn list_instruments(&self) -> Result<Vec<String>, FoliostatError>;

    /// First date, last date and row count, or `None` when no data exists.
    fn get_data_range(
        &self,
        id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FoliostatError>;
}
