//! Sampling-frequency inference for annualization.
//!
//! The median gap in days between consecutive axis dates buckets into the
//! nearest standard calendar frequency. Must be re-run whenever the date
//! range changes: a shorter window can change the inferred frequency.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Periodicity {
    pub fn periods_per_year(self) -> f64 {
        match self {
            Periodicity::Daily => 252.0,
            Periodicity::Weekly => 52.0,
            Periodicity::Monthly => 12.0,
            Periodicity::Quarterly => 4.0,
            Periodicity::Annual => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
            Periodicity::Monthly => "monthly",
            Periodicity::Quarterly => "quarterly",
            Periodicity::Annual => "annual",
        }
    }
}

/// Infer the sampling frequency of a sorted date axis. Fewer than two dates
/// default to daily, the most common input.
pub fn detect(dates: &[NaiveDate]) -> Periodicity {
    if dates.len() < 2 {
        return Periodicity::Daily;
    }

    let mut gaps: Vec<i64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();
    gaps.sort_unstable();

    let mid = gaps.len() / 2;
    let median = if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) as f64 / 2.0
    } else {
        gaps[mid] as f64
    };

    if median <= 4.0 {
        Periodicity::Daily
    } else if median <= 10.0 {
        Periodicity::Weekly
    } else if median <= 45.0 {
        Periodicity::Monthly
    } else if median <= 135.0 {
        Periodicity::Quarterly
    } else {
        Periodicity::Annual
    }
}
