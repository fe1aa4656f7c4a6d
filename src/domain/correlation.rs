//! Pairwise Pearson correlation of return series.
//!
//! Each pair is computed over the dates where both series have a defined
//! simple return (pairwise-complete). A pair with no overlap, or with zero
//! variance on either side, is an undefined cell rather than an error;
//! [`FoliostatError::EmptyIntersection`] fires only when no pair at all
//! overlaps, which makes the whole matrix meaningless.

use super::error::FoliostatError;
use super::returns::ReturnSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub ids: Vec<String>,
    /// Row-major square matrix. Diagonal is `Some(1.0)` by construction.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values[i][j]
    }

    pub fn get_by_id(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.ids.iter().position(|id| id == a)?;
        let j = self.ids.iter().position(|id| id == b)?;
        self.values[i][j]
    }

    /// Display filter for diversification screening: unordered pairs with
    /// negative correlation. Not a different computation.
    pub fn negative_pairs(&self) -> Vec<(String, String, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                if let Some(c) = self.values[i][j] {
                    if c < 0.0 {
                        pairs.push((self.ids[i].clone(), self.ids[j].clone(), c));
                    }
                }
            }
        }
        pairs
    }
}

/// True when at least one unordered pair shares a defined return date.
pub fn any_overlap(series: &[&ReturnSeries]) -> bool {
    for i in 0..series.len() {
        for j in (i + 1)..series.len() {
            let shared = series[i]
                .simple
                .iter()
                .zip(&series[j].simple)
                .any(|(a, b)| a.is_some() && b.is_some());
            if shared {
                return true;
            }
        }
    }
    false
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(cov / denominator)
}

fn pairwise(a: &ReturnSeries, b: &ReturnSeries) -> Option<f64> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (ra, rb) in a.simple.iter().zip(&b.simple) {
        if let (Some(ra), Some(rb)) = (ra, rb) {
            x.push(*ra);
            y.push(*rb);
        }
    }
    pearson(&x, &y)
}

/// Build the matrix over constituents and (if present) the combo. Each
/// unordered pair is computed once and mirrored.
pub fn compute(series: &[&ReturnSeries]) -> Result<CorrelationMatrix, FoliostatError> {
    let n = series.len();
    if n >= 2 && !any_overlap(series) {
        return Err(FoliostatError::EmptyIntersection);
    }

    let ids: Vec<String> = series.iter().map(|s| s.id.clone()).collect();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let c = pairwise(series[i], series[j]);
            values[i][j] = c;
            values[j][i] = c;
        }
    }

    Ok(CorrelationMatrix { ids, values })
}
