//! Analysis settings assembled from configuration.
//!
//! Maps INI sections onto the orchestrator's inputs: `[data]` for the price
//! file location, `[analysis]` for instruments / date range / risk-free
//! rate, `[combo]` for composite weights.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use super::analysis::DateRange;
use super::combo::{ComboDefinition, DEFAULT_COMBO_LABEL};
use super::error::FoliostatError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub csv_path: PathBuf,
    pub instruments: Vec<String>,
    pub range: DateRange,
    pub risk_free_rate: f64,
    pub combo: Option<ComboDefinition>,
}

/// Parse a comma-separated instrument list: trimmed, uppercased, no empties,
/// no duplicates.
pub fn parse_instruments(input: &str) -> Result<Vec<String>, FoliostatError> {
    let mut ids = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("analysis", "instruments", "empty token in list"));
        }
        let id = trimmed.to_uppercase();
        if !seen.insert(id.clone()) {
            return Err(invalid(
                "analysis",
                "instruments",
                &format!("duplicate instrument {id}"),
            ));
        }
        ids.push(id);
    }

    Ok(ids)
}

/// Parse a weight list like `SPY:0.6, AGG:0.4`. Weights may be any real
/// number; normalization happens at combination time.
pub fn parse_weights(input: &str) -> Result<BTreeMap<String, f64>, FoliostatError> {
    let mut weights = BTreeMap::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("combo", "weights", "empty token in list"));
        }
        let Some((id, weight)) = trimmed.split_once(':') else {
            return Err(invalid(
                "combo",
                "weights",
                &format!("expected ID:WEIGHT, got {trimmed}"),
            ));
        };
        let id = id.trim().to_uppercase();
        let weight: f64 = weight.trim().parse().map_err(|_| {
            invalid("combo", "weights", &format!("non-numeric weight for {id}"))
        })?;
        if !weight.is_finite() {
            return Err(invalid("combo", "weights", &format!("non-finite weight for {id}")));
        }
        if weights.insert(id.clone(), weight).is_some() {
            return Err(invalid("combo", "weights", &format!("duplicate instrument {id}")));
        }
    }

    Ok(weights)
}

pub fn build_settings(adapter: &dyn ConfigPort) -> Result<AnalysisSettings, FoliostatError> {
    let csv_path = adapter
        .get_string("data", "csv_path")
        .ok_or_else(|| missing("data", "csv_path"))?;

    let instruments_str = adapter
        .get_string("analysis", "instruments")
        .ok_or_else(|| missing("analysis", "instruments"))?;
    let instruments = parse_instruments(&instruments_str)?;

    let range = build_range(
        adapter.get_string("analysis", "start_date").as_deref(),
        adapter.get_string("analysis", "end_date").as_deref(),
    )?;

    let risk_free_rate = adapter.get_double("analysis", "risk_free_rate", 0.0);

    let combo = match adapter.get_string("combo", "weights") {
        Some(weights_str) => {
            let weights = parse_weights(&weights_str)?;
            let enabled: BTreeSet<String> = match adapter.get_string("combo", "enabled") {
                Some(list) => parse_instruments(&list)?.into_iter().collect(),
                None => weights.keys().cloned().collect(),
            };
            let label = adapter
                .get_string("combo", "label")
                .unwrap_or_else(|| DEFAULT_COMBO_LABEL.to_string());
            Some(ComboDefinition::new(weights, enabled).with_label(&label))
        }
        None => None,
    };

    Ok(AnalysisSettings {
        csv_path: PathBuf::from(csv_path),
        instruments,
        range,
        risk_free_rate,
        combo,
    })
}

/// Both dates present gives a window, neither gives the full range; one
/// without the other is a configuration mistake.
pub fn build_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, FoliostatError> {
    match (start, end) {
        (None, None) => Ok(DateRange::All),
        (Some(start), Some(end)) => {
            let start = parse_date("start_date", start)?;
            let end = parse_date("end_date", end)?;
            if start > end {
                return Err(FoliostatError::EmptyRange { start, end });
            }
            Ok(DateRange::Between { start, end })
        }
        (Some(_), None) => Err(missing("analysis", "end_date")),
        (None, Some(_)) => Err(missing("analysis", "start_date")),
    }
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, FoliostatError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        invalid("analysis", key, "invalid date format (expected YYYY-MM-DD)")
    })
}

fn missing(section: &str, key: &str) -> FoliostatError {
    FoliostatError::ConfigMissing {
        section: section.into(),
        key: key.into(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> FoliostatError {
    FoliostatError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}
