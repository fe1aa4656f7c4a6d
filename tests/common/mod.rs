#![allow(dead_code)]

use chrono::NaiveDate;
use foliostat::domain::error::FoliostatError;
pub use foliostat::domain::series::{InstrumentSeries, PricePoint};
use foliostat::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, id: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(id.to_string(), points);
        self
    }

    pub fn with_error(mut self, id: &str, reason: &str) -> Self {
        self.errors.insert(id.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, id: &str) -> Result<Vec<PricePoint>, FoliostatError> {
        if let Some(reason) = self.errors.get(id) {
            return Err(FoliostatError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(id) {
            Some(points) => Ok(points.clone()),
            None => Err(FoliostatError::NoData { id: id.to_string() }),
        }
    }

    fn list_instruments(&self) -> Result<Vec<String>, FoliostatError> {
        let mut ids: Vec<String> = self.data.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn get_data_range(
        &self,
        id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FoliostatError> {
        match self.data.get(id) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn point(y: i32, m: u32, d: u32, price: f64) -> PricePoint {
    PricePoint {
        date: date(y, m, d),
        price,
    }
}

/// Monthly points starting January 2024, one per entry; `None` skips the month.
pub fn monthly_points(prices: &[Option<f64>]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .filter_map(|(i, price)| price.map(|price| point(2024, 1 + i as u32, 1, price)))
        .collect()
}

pub fn monthly_series(id: &str, prices: &[Option<f64>]) -> InstrumentSeries {
    InstrumentSeries::from_points(id.to_string(), monthly_points(prices))
}
