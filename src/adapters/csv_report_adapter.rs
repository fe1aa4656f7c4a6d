//! Delimited table export adapter.
//!
//! Writes the three output tables of a snapshot as plain CSV: per-date
//! series values, per-series statistics, and the correlation matrix.
//! Numbers use plain decimal notation; an undefined or missing value is an
//! empty field, never zero.

use crate::domain::analysis::Snapshot;
use crate::domain::error::FoliostatError;
use crate::domain::stats::Metric;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn metric(value: Metric) -> String {
    match value {
        Metric::Defined(v) if v.is_infinite() && v > 0.0 => "inf".to_string(),
        Metric::Defined(v) => v.to_string(),
        Metric::Undefined => String::new(),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_series_table(&self, snapshot: &Snapshot, path: &Path) -> Result<(), FoliostatError> {
        let mut wtr = csv::Writer::from_path(path)?;
        let all = snapshot.all_series();

        let mut header = vec!["date".to_string()];
        for rs in &all {
            header.push(format!("{}_simple", rs.id));
            header.push(format!("{}_log", rs.id));
            header.push(format!("{}_equity", rs.id));
        }
        wtr.write_record(&header)?;

        for (t, date) in snapshot.merged.dates.iter().enumerate() {
            let mut row = vec![date.format("%Y-%m-%d").to_string()];
            for rs in &all {
                row.push(number(rs.simple[t]));
                row.push(number(rs.log[t]));
                row.push(number(rs.equity[t]));
            }
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_stats_table(&self, snapshot: &Snapshot, path: &Path) -> Result<(), FoliostatError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record([
            "id",
            "cagr",
            "volatility",
            "sharpe",
            "sortino",
            "max_drawdown",
            "ulcer_index",
            "calmar",
            "profit_factor",
        ])?;

        for record in &snapshot.stats {
            wtr.write_record([
                record.id.clone(),
                metric(record.cagr),
                metric(record.volatility),
                metric(record.sharpe),
                metric(record.sortino),
                metric(record.max_drawdown),
                metric(record.ulcer_index),
                metric(record.calmar),
                metric(record.profit_factor),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_correlation_table(
        &self,
        snapshot: &Snapshot,
        path: &Path,
    ) -> Result<(), FoliostatError> {
        let mut wtr = csv::Writer::from_path(path)?;

        let Some(matrix) = &snapshot.correlation else {
            wtr.write_record(["id"])?;
            wtr.flush()?;
            return Ok(());
        };

        let mut header = vec!["id".to_string()];
        header.extend(matrix.ids.iter().cloned());
        wtr.write_record(&header)?;

        for (i, id) in matrix.ids.iter().enumerate() {
            let mut row = vec![id.clone()];
            for j in 0..matrix.size() {
                row.push(number(matrix.get(i, j)));
            }
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
