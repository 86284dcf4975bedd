//! Skill statistics for matched series

use serde::{Deserialize, Serialize};

use super::matcher::MatchedSeries;

/// Standard skill table for one track (model minus observation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillMetrics {
    pub n: usize,
    pub bias: f64,
    pub rmse: f64,
    /// RMSE after removing the bias
    pub urmse: f64,
    pub mae: f64,
    /// Pearson correlation, NaN when either series is constant
    pub cc: f64,
    /// Scatter index: urmse over mean absolute observation
    pub si: f64,
}

impl SkillMetrics {
    /// Compute the table; `None` for an empty series
    pub fn compute(series: &MatchedSeries) -> Option<Self> {
        let n = series.len();
        if n == 0 {
            return None;
        }
        let nf = n as f64;
        let residuals: Vec<f64> = series
            .modelled
            .iter()
            .zip(&series.observed)
            .map(|(m, o)| m - o)
            .collect();

        let bias = residuals.iter().sum::<f64>() / nf;
        let rmse = rmse(&residuals);
        let urmse = (residuals.iter().map(|r| (r - bias).powi(2)).sum::<f64>() / nf).sqrt();
        let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / nf;

        let mean_obs = series.observed.iter().sum::<f64>() / nf;
        let mean_mod = series.modelled.iter().sum::<f64>() / nf;
        let (mut cov, mut var_o, mut var_m) = (0.0, 0.0, 0.0);
        for (m, o) in series.modelled.iter().zip(&series.observed) {
            cov += (m - mean_mod) * (o - mean_obs);
            var_o += (o - mean_obs).powi(2);
            var_m += (m - mean_mod).powi(2);
        }
        let cc = if var_o > 0.0 && var_m > 0.0 {
            cov / (var_o.sqrt() * var_m.sqrt())
        } else {
            f64::NAN
        };

        let mean_abs_obs = series.observed.iter().map(|o| o.abs()).sum::<f64>() / nf;
        let si = if mean_abs_obs > 0.0 {
            urmse / mean_abs_obs
        } else {
            f64::NAN
        };

        Some(Self {
            n,
            bias,
            rmse,
            urmse,
            mae,
            cc,
            si,
        })
    }
}

/// Root-mean-square of residuals
pub fn rmse(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return f64::NAN;
    }
    (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt()
}

/// Unweighted arithmetic mean of per-track scores
///
/// Every track counts once regardless of how many points it matched.
pub fn aggregate(per_track: &[f64]) -> Option<f64> {
    if per_track.is_empty() {
        return None;
    }
    Some(per_track.iter().sum::<f64>() / per_track.len() as f64)
}
