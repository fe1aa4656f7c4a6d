//! Per-instrument price series store.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A single instrument's price history. Dates are strictly increasing with no
/// duplicates once constructed; the series is replaced wholesale on reload,
/// never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    pub id: String,
    pub points: Vec<PricePoint>,
}

impl InstrumentSeries {
    /// Build a series from raw ingestion rows. Rows are sorted by date and
    /// duplicate dates collapse to the last value seen.
    pub fn from_points(id: String, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by(|next, prev| {
            if next.date == prev.date {
                prev.price = next.price;
                true
            } else {
                false
            }
        });
        Self { id, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].price)
    }

    /// Restrict to `[start, end]` inclusive. The original series is untouched.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> InstrumentSeries {
        let points = self
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        InstrumentSeries {
            id: self.id.clone(),
            points,
        }
    }
}
