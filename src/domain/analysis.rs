//! Range filter and recompute orchestration.
//!
//! The [`Analyzer`] owns the mutable inputs (raw series, date range, combo
//! definition, risk-free rate). Everything derived lives in an immutable
//! [`Snapshot`] rebuilt wholesale by every transition, in a fixed order:
//! slice → merge → periodicity → returns → combo → stats → correlation.
//! No partial or incremental update exists; a transition whose recompute
//! fails leaves the previous snapshot and state untouched.

use chrono::NaiveDate;

use super::combo::{self, ComboDefinition};
use super::correlation::{self, CorrelationMatrix};
use super::error::FoliostatError;
use super::merge::{self, MergedDataset};
use super::periodicity::{self, Periodicity};
use super::returns::{self, ReturnSeries};
use super::series::InstrumentSeries;
use super::stats::StatsRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    All,
    Between { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Empty,
    Loaded,
    Filtered,
}

/// One immutable result of a full recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub merged: MergedDataset,
    pub periodicity: Periodicity,
    pub returns: Vec<ReturnSeries>,
    pub combo: Option<ReturnSeries>,
    /// One record per constituent, plus the combo's record last if present.
    pub stats: Vec<StatsRecord>,
    /// `None` with fewer than two series (nothing to correlate).
    pub correlation: Option<CorrelationMatrix>,
}

impl Snapshot {
    /// Constituent series followed by the combo, the order stats and
    /// correlation use.
    pub fn all_series(&self) -> Vec<&ReturnSeries> {
        let mut all: Vec<&ReturnSeries> = self.returns.iter().collect();
        if let Some(c) = &self.combo {
            all.push(c);
        }
        all
    }
}

#[derive(Debug)]
pub struct Analyzer {
    series: Vec<InstrumentSeries>,
    range: DateRange,
    combo: Option<ComboDefinition>,
    risk_free_rate: f64,
    state: AnalysisState,
    snapshot: Option<Snapshot>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            range: DateRange::All,
            combo: None,
            risk_free_rate: 0.0,
            state: AnalysisState::Empty,
            snapshot: None,
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Replace the whole dataset. Resets the range to full and drops any
    /// combo, since its constituent ids belong to the old dataset.
    pub fn load_series(&mut self, series: Vec<InstrumentSeries>) -> Result<(), FoliostatError> {
        if series.is_empty() {
            self.series.clear();
            self.range = DateRange::All;
            self.combo = None;
            self.state = AnalysisState::Empty;
            self.snapshot = None;
            return Ok(());
        }

        let snapshot = recompute(&series, DateRange::All, None, self.risk_free_rate)?;
        self.series = series;
        self.range = DateRange::All;
        self.combo = None;
        self.state = AnalysisState::Loaded;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), FoliostatError> {
        self.require_loaded()?;
        if start > end {
            return Err(FoliostatError::EmptyRange { start, end });
        }
        let range = DateRange::Between { start, end };
        let snapshot = recompute(&self.series, range, self.combo.as_ref(), self.risk_free_rate)?;
        self.range = range;
        self.state = AnalysisState::Filtered;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    pub fn clear_range(&mut self) -> Result<(), FoliostatError> {
        self.require_loaded()?;
        let snapshot = recompute(
            &self.series,
            DateRange::All,
            self.combo.as_ref(),
            self.risk_free_rate,
        )?;
        self.range = DateRange::All;
        self.state = AnalysisState::Loaded;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Install or edit the combo. The range state is unchanged; the whole
    /// pipeline still reruns.
    pub fn set_combo(&mut self, definition: ComboDefinition) -> Result<(), FoliostatError> {
        self.require_loaded()?;
        let snapshot = recompute(
            &self.series,
            self.range,
            Some(&definition),
            self.risk_free_rate,
        )?;
        self.combo = Some(definition);
        self.snapshot = Some(snapshot);
        Ok(())
    }

    pub fn clear_combo(&mut self) -> Result<(), FoliostatError> {
        self.require_loaded()?;
        let snapshot = recompute(&self.series, self.range, None, self.risk_free_rate)?;
        self.combo = None;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    pub fn set_risk_free_rate(&mut self, rate: f64) -> Result<(), FoliostatError> {
        if self.state == AnalysisState::Empty {
            self.risk_free_rate = rate;
            return Ok(());
        }
        let snapshot = recompute(&self.series, self.range, self.combo.as_ref(), rate)?;
        self.risk_free_rate = rate;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn require_loaded(&self) -> Result<(), FoliostatError> {
        if self.state == AnalysisState::Empty {
            return Err(FoliostatError::Data {
                reason: "no series loaded".into(),
            });
        }
        Ok(())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// The full pipeline, a pure function of its inputs.
pub fn recompute(
    series: &[InstrumentSeries],
    range: DateRange,
    combo: Option<&ComboDefinition>,
    risk_free_rate: f64,
) -> Result<Snapshot, FoliostatError> {
    let sliced: Vec<InstrumentSeries> = match range {
        DateRange::All => series.to_vec(),
        DateRange::Between { start, end } => {
            series.iter().map(|s| s.slice(start, end)).collect()
        }
    };

    let merged = merge::merge(&sliced);
    let detected = periodicity::detect(&merged.dates);
    let constituent_returns = returns::from_merged(&merged)?;

    // Disjointness is judged over the instruments alone: the synthetic combo
    // always overlaps its constituents and must not mask a dataset where no
    // two instruments ever coexist.
    if constituent_returns.len() >= 2 {
        let refs: Vec<&ReturnSeries> = constituent_returns.iter().collect();
        if !correlation::any_overlap(&refs) {
            return Err(FoliostatError::EmptyIntersection);
        }
    }

    let combo_series = combo
        .map(|definition| combo::synthesize(definition, &constituent_returns))
        .transpose()?;

    let mut stats = Vec::with_capacity(constituent_returns.len() + 1);
    for rs in &constituent_returns {
        stats.push(StatsRecord::compute(rs, detected, risk_free_rate));
    }
    if let Some(c) = &combo_series {
        stats.push(StatsRecord::compute(c, detected, risk_free_rate));
    }

    let mut correlated: Vec<&ReturnSeries> = constituent_returns.iter().collect();
    if let Some(c) = &combo_series {
        correlated.push(c);
    }
    let correlation = if correlated.len() >= 2 {
        Some(correlation::compute(&correlated)?)
    } else {
        None
    };

    Ok(Snapshot {
        merged,
        periodicity: detected,
        returns: constituent_returns,
        combo: combo_series,
        stats,
        correlation,
    })
}
