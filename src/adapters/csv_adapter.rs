//! CSV price file data adapter.
//!
//! One file per instrument, `<ID>.csv`, with a `date,price` header. A row
//! with an unparseable date or a non-numeric/non-finite price is dropped
//! with a warning; the rest of the file still loads.

use crate::domain::error::FoliostatError;
use crate::domain::series::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", id))
    }
}

fn parse_row(record: &csv::StringRecord) -> Option<PricePoint> {
    let date = NaiveDate::parse_from_str(record.get(0)?, "%Y-%m-%d").ok()?;
    let price: f64 = record.get(1)?.trim().parse().ok()?;
    if !price.is_finite() {
        return None;
    }
    Some(PricePoint { date, price })
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, id: &str) -> Result<Vec<PricePoint>, FoliostatError> {
        let path = self.csv_path(id);
        let content = fs::read_to_string(&path).map_err(|_| FoliostatError::NoData {
            id: id.to_string(),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| FoliostatError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            match parse_row(&record) {
                Some(point) => points.push(point),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            eprintln!(
                "Warning: dropped {} malformed row(s) from {}",
                dropped,
                path.display()
            );
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn list_instruments(&self) -> Result<Vec<String>, FoliostatError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| FoliostatError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FoliostatError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(id) = name_str.strip_suffix(".csv") {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn get_data_range(
        &self,
        id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FoliostatError> {
        let points = match self.fetch_prices(id) {
            Ok(p) => p,
            Err(FoliostatError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if points.is_empty() {
            return Ok(None);
        }
        Ok(Some((
            points.first().map(|p| p.date).unwrap_or_default(),
            points.last().map(|p| p.date).unwrap_or_default(),
            points.len(),
        )))
    }
}
