//! Alignment of instrument series onto a unified date axis.
//!
//! The axis is the sorted union of every instrument's dates. A date an
//! instrument never traded is an explicit `None`, never a filled-forward or
//! interpolated price: silent fills would bias drawdown and volatility, and
//! an explicit gap forces each consumer to decide skip versus fail.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use super::series::InstrumentSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct MergedDataset {
    pub dates: Vec<NaiveDate>,
    pub ids: Vec<String>,
    /// One column per id, parallel to `dates`. `None` marks a missing price.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl MergedDataset {
    pub fn instrument_count(&self) -> usize {
        self.ids.len()
    }

    pub fn date_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column(&self, id: &str) -> Option<&[Option<f64>]> {
        self.ids
            .iter()
            .position(|i| i == id)
            .map(|i| self.columns[i].as_slice())
    }
}

pub fn merge(series: &[InstrumentSeries]) -> MergedDataset {
    let axis: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect();
    let dates: Vec<NaiveDate> = axis.into_iter().collect();

    let mut ids = Vec::with_capacity(series.len());
    let mut columns = Vec::with_capacity(series.len());

    for s in series {
        // Both the axis and the series are sorted, so one forward cursor
        // fills the column in a single pass.
        let mut column = Vec::with_capacity(dates.len());
        let mut cursor = s.points.iter().peekable();

        for &date in &dates {
            match cursor.peek() {
                Some(p) if p.date == date => {
                    column.push(Some(p.price));
                    cursor.next();
                }
                _ => column.push(None),
            }
        }

        ids.push(s.id.clone());
        columns.push(column);
    }

    MergedDataset { dates, ids, columns }
}
