//! Performance and risk statistics over one return series.
//!
//! Every degenerate case (no data, zero variance, no drawdown, no losses) is
//! an explicit [`Metric::Undefined`], never a silent zero. Profit factor with
//! gains and no losses is the one infinity the engine reports on purpose.

use super::periodicity::Periodicity;
use super::returns::ReturnSeries;

/// A named statistic: a real value or explicitly undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Defined(f64),
    Undefined,
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(v),
            Metric::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Defined(_))
    }

    fn from_option(value: Option<f64>) -> Self {
        value.map_or(Metric::Undefined, Metric::Defined)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Defined(v) if v.is_infinite() && *v > 0.0 => write!(f, "inf"),
            Metric::Defined(v) => write!(f, "{v:.6}"),
            Metric::Undefined => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsRecord {
    pub id: String,
    pub cagr: Metric,
    pub volatility: Metric,
    pub sharpe: Metric,
    pub sortino: Metric,
    pub max_drawdown: Metric,
    pub ulcer_index: Metric,
    pub calmar: Metric,
    pub profit_factor: Metric,
}

impl StatsRecord {
    /// Compute the full record. `risk_free_rate` is annual and is scaled to
    /// one period before entering Sharpe/Sortino.
    pub fn compute(series: &ReturnSeries, periodicity: Periodicity, risk_free_rate: f64) -> Self {
        let ppy = periodicity.periods_per_year();
        let rf_per_period = risk_free_rate / ppy;
        let returns: Vec<f64> = series.defined_simple().collect();
        let drawdowns = drawdown_curve(&series.equity);

        let max_drawdown = drawdowns
            .iter()
            .filter_map(|d| *d)
            .fold(None, |acc: Option<f64>, d| {
                Some(acc.map_or(d, |a| a.min(d)))
            });

        StatsRecord {
            id: series.id.clone(),
            cagr: Metric::from_option(cagr(series, ppy)),
            volatility: Metric::from_option(volatility(&returns, ppy)),
            sharpe: Metric::from_option(sharpe(&returns, rf_per_period, ppy)),
            sortino: Metric::from_option(sortino(&returns, rf_per_period, ppy)),
            max_drawdown: Metric::from_option(max_drawdown),
            ulcer_index: Metric::from_option(ulcer_index(&drawdowns)),
            calmar: Metric::from_option(calmar(series, ppy, max_drawdown)),
            profit_factor: Metric::from_option(profit_factor(&returns)),
        }
    }
}

/// Drawdown at each axis date: `equity / running_max - 1`, always <= 0.
/// Undefined exactly where the equity curve is.
pub fn drawdown_curve(equity: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut peak: Option<f64> = None;
    equity
        .iter()
        .map(|e| {
            let e = (*e)?;
            let p = peak.map_or(e, |p: f64| p.max(e));
            peak = Some(p);
            Some(e / p - 1.0)
        })
        .collect()
}

fn cagr(series: &ReturnSeries, ppy: f64) -> Option<f64> {
    let first = series.first_equity()?;
    let last = series.last_equity()?;
    let periods = series.defined_return_count();
    if periods == 0 || first <= 0.0 {
        return None;
    }
    Some((last / first).powf(ppy / periods as f64) - 1.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn stddev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

fn volatility(returns: &[f64], ppy: f64) -> Option<f64> {
    Some(stddev(returns)? * ppy.sqrt())
}

fn sharpe(returns: &[f64], rf_per_period: f64, ppy: f64) -> Option<f64> {
    let sd = stddev(returns)?;
    if sd == 0.0 {
        return None;
    }
    Some((mean(returns)? - rf_per_period) / sd * ppy.sqrt())
}

fn sortino(returns: &[f64], rf_per_period: f64, ppy: f64) -> Option<f64> {
    let negative: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if negative.is_empty() {
        return None;
    }
    let sd = stddev(&negative)?;
    if sd == 0.0 {
        return None;
    }
    Some((mean(returns)? - rf_per_period) / sd * ppy.sqrt())
}

fn ulcer_index(drawdowns: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = drawdowns.iter().filter_map(|d| *d).collect();
    let mean_sq = mean(&defined.iter().map(|d| d * d).collect::<Vec<f64>>())?;
    Some(mean_sq.sqrt())
}

fn calmar(series: &ReturnSeries, ppy: f64, max_drawdown: Option<f64>) -> Option<f64> {
    let mdd = max_drawdown?;
    if mdd == 0.0 {
        return None;
    }
    Some(cagr(series, ppy)? / mdd.abs())
}

fn profit_factor(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let gains: f64 = returns.iter().filter(|r| **r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|r| **r < 0.0).sum();
    if losses != 0.0 {
        Some(gains / losses.abs())
    } else if gains > 0.0 {
        Some(f64::INFINITY)
    } else {
        // All returns exactly zero: no profit, no loss.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn axis(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| {
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
            })
            .collect()
    }

    fn series(prices: &[f64]) -> ReturnSeries {
        let column: Vec<Option<f64>> = prices.iter().map(|p| Some(*p)).collect();
        returns::compute("T", &axis(prices.len()), &column).unwrap()
    }

    #[test]
    fn drawdown_is_never_positive() {
        let rs = series(&[100.0, 110.0, 90.0, 95.0, 120.0, 80.0]);
        for d in drawdown_curve(&rs.equity).iter().flatten() {
            assert!(*d <= 0.0);
        }
    }

    #[test]
    fn drawdown_monthly_scenario() {
        let rs = series(&[100.0, 110.0, 99.0]);
        let dd = drawdown_curve(&rs.equity);

        assert_relative_eq!(dd[0].unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dd[1].unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dd[2].unwrap(), 0.99 / 1.10 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_is_min_of_curve() {
        let rs = series(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Daily, 0.0);

        let expected = drawdown_curve(&rs.equity)
            .iter()
            .flatten()
            .fold(f64::INFINITY, |a, d| a.min(*d));
        assert_relative_eq!(record.max_drawdown.value().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn cagr_monthly_scenario() {
        // ppy=12 over 2 periods: 0.99^6 - 1.
        let rs = series(&[100.0, 110.0, 99.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Monthly, 0.0);

        let expected = 0.99_f64.powf(12.0 / 2.0) - 1.0;
        assert_relative_eq!(record.cagr.value().unwrap(), expected, epsilon = 1e-12);
        assert!((expected - (-0.0582)).abs() < 1e-3);
    }

    #[test]
    fn volatility_annualizes_stddev() {
        let rs = series(&[100.0, 101.0, 100.0, 102.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Monthly, 0.0);

        let rets: Vec<f64> = rs.defined_simple().collect();
        let m = rets.iter().sum::<f64>() / rets.len() as f64;
        let sd = (rets.iter().map(|r| (r - m).powi(2)).sum::<f64>() / rets.len() as f64).sqrt();
        assert_relative_eq!(
            record.volatility.value().unwrap(),
            sd * 12.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn sharpe_undefined_on_zero_stddev() {
        let rs = series(&[100.0, 110.0, 121.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Daily, 0.0);
        assert_eq!(record.sharpe, Metric::Undefined);
    }

    #[test]
    fn sortino_undefined_without_negative_returns() {
        let rs = series(&[100.0, 101.0, 103.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Daily, 0.0);
        assert_eq!(record.sortino, Metric::Undefined);
    }

    #[test]
    fn sortino_defined_with_downside() {
        let rs = series(&[100.0, 105.0, 99.0, 104.0, 101.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Daily, 0.0);
        assert!(record.sortino.is_defined());
    }

    #[test]
    fn ulcer_index_is_rms_of_drawdown() {
        let rs = series(&[100.0, 110.0, 99.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Monthly, 0.0);

        let dd = 0.99_f64 / 1.10 - 1.0;
        let expected = ((0.0 + 0.0 + dd * dd) / 3.0_f64).sqrt();
        assert_relative_eq!(record.ulcer_index.value().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn calmar_undefined_without_drawdown() {
        let rs = series(&[100.0, 101.0, 103.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Daily, 0.0);
        assert_eq!(record.calmar, Metric::Undefined);
    }

    #[test]
    fn calmar_is_cagr_over_abs_max_drawdown() {
        let rs = series(&[100.0, 110.0, 99.0]);
        let record = StatsRecord::compute(&rs, Periodicity::Monthly, 0.0);

        let cagr = record.cagr.value().unwrap();
        let mdd = record.max_drawdown.value().unwrap();
        assert_relative_eq!(
            record.calmar.value().unwrap(),
            cagr / mdd.abs(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn profit_factor_mixed_returns() {
        // returns 0.05, 0.03, -0.02 → (0.05+0.03)/0.02 = 4.
        assert_relative_eq!(
            profit_factor(&[0.05, 0.03, -0.02]).unwrap(),
            4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn profit_factor_no_losses_is_infinite() {
        assert_eq!(profit_factor(&[0.05, 0.03]), Some(f64::INFINITY));
    }

    #[test]
    fn profit_factor_no_data_is_undefined() {
        assert_eq!(profit_factor(&[]), None);
    }

    #[test]
    fn empty_series_is_all_undefined() {
        let rs = returns::compute("T", &axis(3), &[None, None, None]).unwrap();
        let record = StatsRecord::compute(&rs, Periodicity::Daily, 0.0);

        assert_eq!(record.cagr, Metric::Undefined);
        assert_eq!(record.volatility, Metric::Undefined);
        assert_eq!(record.sharpe, Metric::Undefined);
        assert_eq!(record.sortino, Metric::Undefined);
        assert_eq!(record.max_drawdown, Metric::Undefined);
        assert_eq!(record.ulcer_index, Metric::Undefined);
        assert_eq!(record.calmar, Metric::Undefined);
        assert_eq!(record.profit_factor, Metric::Undefined);
    }

    #[test]
    fn metric_display() {
        assert_eq!(Metric::Undefined.to_string(), "");
        assert_eq!(Metric::Defined(f64::INFINITY).to_string(), "inf");
        assert_eq!(Metric::Defined(0.25).to_string(), "0.250000");
    }
}
