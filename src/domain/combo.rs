//! Weighted composite ("combo") synthesis from constituent return series.
//!
//! Policy: fixed target weights with periodic rebalance. At each date the
//! weights renormalize over the enabled constituents that actually have a
//! defined return, so a missing constituent drops out for that date only.
//! This is a rebalance-to-target assumption, not buy-and-hold drift.

use std::collections::{BTreeMap, BTreeSet};

use super::error::FoliostatError;
use super::returns::ReturnSeries;

pub const DEFAULT_COMBO_LABEL: &str = "COMBO";

#[derive(Debug, Clone, PartialEq)]
pub struct ComboDefinition {
    /// Instrument id → target weight. Weights may be any real number and are
    /// normalized over the enabled set at combination time, not at input time.
    pub weights: BTreeMap<String, f64>,
    pub enabled: BTreeSet<String>,
    pub label: String,
}

impl ComboDefinition {
    pub fn new(weights: BTreeMap<String, f64>, enabled: BTreeSet<String>) -> Self {
        Self {
            weights,
            enabled,
            label: DEFAULT_COMBO_LABEL.to_string(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// The constituents that actually contribute: enabled and non-zero weight.
    pub fn active(&self) -> Vec<(&str, f64)> {
        self.weights
            .iter()
            .filter(|(id, w)| self.enabled.contains(*id) && **w != 0.0)
            .map(|(id, w)| (id.as_str(), *w))
            .collect()
    }

    /// Active ids with no matching series in `available`. These drop out of
    /// synthesis entirely, so callers should warn before computing.
    pub fn unmatched(&self, available: &[&str]) -> Vec<String> {
        self.active()
            .into_iter()
            .filter(|(id, _)| !available.contains(id))
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

/// Synthesize the combo return series from constituents aligned to one axis.
///
/// The result is a plain [`ReturnSeries`] and flows through stats and
/// correlation exactly like an instrument.
pub fn synthesize(
    definition: &ComboDefinition,
    constituents: &[ReturnSeries],
) -> Result<ReturnSeries, FoliostatError> {
    let active = definition.active();
    if active.is_empty() {
        return Err(FoliostatError::NoActiveConstituents);
    }

    let members: Vec<(&ReturnSeries, f64)> = active
        .iter()
        .filter_map(|(id, w)| constituents.iter().find(|rs| rs.id == *id).map(|rs| (rs, *w)))
        .collect();
    if members.is_empty() {
        return Err(FoliostatError::NoActiveConstituents);
    }

    let dates = members[0].0.dates.clone();
    let n = dates.len();

    let mut simple = vec![None; n];
    let mut log = vec![None; n];
    let mut equity = vec![None; n];
    let mut level: Option<f64> = None;

    for t in 0..n {
        let mut weight_sum = 0.0;
        let mut weighted = 0.0;
        let mut present = false;

        for (rs, w) in &members {
            if let Some(r) = rs.simple[t] {
                weight_sum += w;
                weighted += w * r;
                present = true;
            }
        }

        if present && weight_sum != 0.0 {
            let r = weighted / weight_sum;
            simple[t] = Some(r);
            if r > -1.0 {
                log[t] = Some((1.0 + r).ln());
            }
            level = Some(level.unwrap_or(1.0) * (1.0 + r));
            equity[t] = level;
        } else if members.iter().any(|(rs, _)| rs.equity[t].is_some()) {
            // Constituents have prices here even without a combo return, so
            // the curve anchors (or holds) rather than staying undefined.
            level = level.or(Some(1.0));
            equity[t] = level;
        }
    }

    Ok(ReturnSeries {
        id: definition.label.clone(),
        dates,
        simple,
        log,
        equity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn axis(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2024, 1 + i as u32, 1).unwrap())
            .collect()
    }

    fn series(id: &str, prices: &[Option<f64>]) -> ReturnSeries {
        returns::compute(id, &axis(prices.len()), prices).unwrap()
    }

    fn definition(pairs: &[(&str, f64)]) -> ComboDefinition {
        let weights = pairs
            .iter()
            .map(|(id, w)| (id.to_string(), *w))
            .collect::<BTreeMap<_, _>>();
        let enabled = pairs.iter().map(|(id, _)| id.to_string()).collect();
        ComboDefinition::new(weights, enabled)
    }

    #[test]
    fn equal_weights_give_arithmetic_mean() {
        let a = series("A", &[Some(100.0), Some(110.0), Some(99.0)]);
        let b = series("B", &[Some(50.0), Some(51.0), Some(56.1)]);

        let combo = synthesize(&definition(&[("A", 1.0), ("B", 1.0)]), &[a.clone(), b.clone()])
            .unwrap();

        for t in 1..3 {
            let expected = (a.simple[t].unwrap() + b.simple[t].unwrap()) / 2.0;
            assert_relative_eq!(combo.simple[t].unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn weights_normalize_at_combination_time() {
        // 3:1 weights need no pre-normalized input.
        let a = series("A", &[Some(100.0), Some(110.0)]);
        let b = series("B", &[Some(100.0), Some(90.0)]);

        let combo = synthesize(&definition(&[("A", 3.0), ("B", 1.0)]), &[a, b]).unwrap();
        assert_relative_eq!(
            combo.simple[1].unwrap(),
            (3.0 * 0.10 + 1.0 * -0.10) / 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn missing_constituent_renormalizes_for_that_date_only() {
        let a = series("A", &[Some(100.0), Some(110.0), Some(121.0)]);
        let b = series("B", &[Some(50.0), None, Some(51.0)]);

        let combo = synthesize(&definition(&[("A", 1.0), ("B", 1.0)]), &[a, b]).unwrap();

        // Feb: only A has a return, so the combo is A's return outright.
        assert_relative_eq!(combo.simple[1].unwrap(), 0.10, epsilon = 1e-12);
        // Mar: B's Feb→Mar return is undefined (gap), A's is 0.10.
        assert_relative_eq!(combo.simple[2].unwrap(), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn disabled_constituent_does_not_contribute() {
        let a = series("A", &[Some(100.0), Some(110.0)]);
        let b = series("B", &[Some(100.0), Some(90.0)]);

        let mut def = definition(&[("A", 1.0), ("B", 1.0)]);
        def.enabled.remove("B");

        let combo = synthesize(&def, &[a, b]).unwrap();
        assert_relative_eq!(combo.simple[1].unwrap(), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn unmatched_reports_active_ids_without_series() {
        let def = definition(&[("A", 1.0), ("B", 1.0), ("C", 0.0)]);
        assert_eq!(def.unmatched(&["A"]), vec!["B".to_string()]);
        assert!(def.unmatched(&["A", "B"]).is_empty());
    }

    #[test]
    fn unmatched_constituent_drops_out_of_synthesis() {
        let a = series("A", &[Some(100.0), Some(110.0)]);
        let combo = synthesize(&definition(&[("A", 1.0), ("Z", 1.0)]), &[a]).unwrap();
        assert_relative_eq!(combo.simple[1].unwrap(), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn zero_weight_is_not_active() {
        let def = definition(&[("A", 0.0), ("B", 0.0)]);
        assert!(def.active().is_empty());
    }

    #[test]
    fn empty_enabled_set_fails() {
        let a = series("A", &[Some(100.0), Some(110.0)]);
        let mut def = definition(&[("A", 1.0)]);
        def.enabled.clear();

        let err = synthesize(&def, &[a]).unwrap_err();
        assert!(matches!(err, FoliostatError::NoActiveConstituents));
    }

    #[test]
    fn all_zero_weights_fail() {
        let a = series("A", &[Some(100.0), Some(110.0)]);
        let err = synthesize(&definition(&[("A", 0.0)]), &[a]).unwrap_err();
        assert!(matches!(err, FoliostatError::NoActiveConstituents));
    }

    #[test]
    fn combo_equity_compounds_combo_returns() {
        let a = series("A", &[Some(100.0), Some(110.0), Some(99.0)]);
        let b = series("B", &[Some(100.0), Some(110.0), Some(99.0)]);

        let combo = synthesize(&definition(&[("A", 1.0), ("B", 1.0)]), &[a, b]).unwrap();
        assert_relative_eq!(combo.equity[0].unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(combo.equity[1].unwrap(), 1.10, epsilon = 1e-12);
        assert_relative_eq!(combo.equity[2].unwrap(), 0.99, epsilon = 1e-12);
    }

    #[test]
    fn combo_label_flows_to_series_id() {
        let a = series("A", &[Some(100.0), Some(110.0)]);
        let def = definition(&[("A", 1.0)]).with_label("60/40");
        let combo = synthesize(&def, &[a]).unwrap();
        assert_eq!(combo.id, "60/40");
    }
}
