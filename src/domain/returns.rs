//! Simple/log returns and equity curves over an aligned price column.
//!
//! A return exists only between two adjacent axis dates where both prices are
//! present and positive; gaps are skipped, never bridged or filled. The
//! equity curve compounds the defined simple returns from a base of 1.0 at
//! the first usable price, so it holds its level across a gap rather than
//! inventing a flat segment at the missing date.

use chrono::NaiveDate;

use super::error::FoliostatError;
use super::merge::MergedDataset;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub id: String,
    /// The aligned date axis. All vectors below are parallel to it.
    pub dates: Vec<NaiveDate>,
    /// Simple return `p1/p0 - 1`. Index 0 is always `None`.
    pub simple: Vec<Option<f64>>,
    /// Log return `ln(p1/p0)`, defined exactly where `simple` is.
    pub log: Vec<Option<f64>>,
    /// Compounded equity, `None` where the price is missing or non-positive.
    pub equity: Vec<Option<f64>>,
}

impl ReturnSeries {
    pub fn defined_return_count(&self) -> usize {
        self.simple.iter().filter(|r| r.is_some()).count()
    }

    pub fn defined_simple(&self) -> impl Iterator<Item = f64> + '_ {
        self.simple.iter().filter_map(|r| *r)
    }

    pub fn first_equity(&self) -> Option<f64> {
        self.equity.iter().find_map(|e| *e)
    }

    pub fn last_equity(&self) -> Option<f64> {
        self.equity.iter().rev().find_map(|e| *e)
    }
}

fn usable(price: Option<f64>) -> Option<f64> {
    price.filter(|p| *p > 0.0)
}

/// Compute returns for one price column aligned to `dates`.
///
/// Non-positive prices are absorbed as undefined points; the call only fails
/// when the column has prices but not a single usable one.
pub fn compute(
    id: &str,
    dates: &[NaiveDate],
    prices: &[Option<f64>],
) -> Result<ReturnSeries, FoliostatError> {
    let observed = prices.iter().filter(|p| p.is_some()).count();
    let positive = prices.iter().filter_map(|p| usable(*p)).count();
    if observed > 0 && positive == 0 {
        return Err(FoliostatError::NonPositivePrice { id: id.into() });
    }

    let mut simple = vec![None; prices.len()];
    let mut log = vec![None; prices.len()];
    let mut equity = vec![None; prices.len()];

    let mut level: Option<f64> = None;
    for t in 0..prices.len() {
        let Some(price) = usable(prices[t]) else {
            continue;
        };

        if let (Some(prev), Some(current_level)) =
            (t.checked_sub(1).and_then(|p| usable(prices[p])), level)
        {
            let ratio = price / prev;
            simple[t] = Some(ratio - 1.0);
            log[t] = Some(ratio.ln());
            level = Some(current_level * ratio);
        } else if level.is_none() {
            level = Some(1.0);
        }
        equity[t] = level;
    }

    Ok(ReturnSeries {
        id: id.into(),
        dates: dates.to_vec(),
        simple,
        log,
        equity,
    })
}

/// Compute a [`ReturnSeries`] for every column of a merged dataset.
pub fn from_merged(merged: &MergedDataset) -> Result<Vec<ReturnSeries>, FoliostatError> {
    merged
        .ids
        .iter()
        .zip(&merged.columns)
        .map(|(id, column)| compute(id, &merged.dates, column))
        .collect()
}
