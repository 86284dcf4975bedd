//! Gaussian-process regression on unit-cube inputs

use ndarray::{Array1, Array2, ArrayView1};

use crate::optim::error::{OptimError, Result};

/// Observation noise added to the kernel diagonal (standardised units)
const NOISE: f64 = 1e-6;
/// Extra jitter tried when the kernel matrix is numerically singular
const JITTER_STEPS: [f64; 4] = [0.0, 1e-8, 1e-6, 1e-4];

/// Squared-exponential kernel with unit signal variance
fn rbf(a: ArrayView1<f64>, b: ArrayView1<f64>, length_scale: f64) -> f64 {
    let sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
    (-sq / (2.0 * length_scale * length_scale)).exp()
}

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix
pub(crate) fn cholesky(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solve `L z = b` for lower-triangular `L`
fn forward_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }
    z
}

/// Solve `L^T x = z` for lower-triangular `L`
fn backward_substitute(l: &Array2<f64>, z: &Array1<f64>) -> Array1<f64> {
    let n = z.len();
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    x
}

/// Fitted GP posterior
#[derive(Debug, Clone)]
pub struct GaussianProcess {
    x: Array2<f64>,
    chol: Array2<f64>,
    alpha: Array1<f64>,
    length_scale: f64,
    y_mean: f64,
    y_std: f64,
    log_marginal_likelihood: f64,
}

impl GaussianProcess {
    /// Fit with a fixed length scale
    ///
    /// `x` holds one unit-cube point per row, `y` the matching losses.
    pub fn fit(x: Array2<f64>, y: &[f64], length_scale: f64) -> Result<Self> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(OptimError::Surrogate(format!(
                "need matching non-empty inputs, got {n} points and {} targets",
                y.len()
            )));
        }

        let y_mean = y.iter().sum::<f64>() / n as f64;
        let var = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / n as f64;
        let y_std = if var.sqrt() > 1e-12 { var.sqrt() } else { 1.0 };
        let y_norm: Array1<f64> = y.iter().map(|v| (v - y_mean) / y_std).collect();

        let mut kernel = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let k = rbf(x.row(i), x.row(j), length_scale);
                kernel[[i, j]] = k;
                kernel[[j, i]] = k;
            }
        }

        let chol = JITTER_STEPS
            .iter()
            .find_map(|jitter| {
                let mut k = kernel.clone();
                for i in 0..n {
                    k[[i, i]] += NOISE + jitter;
                }
                cholesky(&k)
            })
            .ok_or_else(|| {
                OptimError::Surrogate("kernel matrix is not positive definite".to_string())
            })?;

        let z = forward_substitute(&chol, &y_norm);
        let alpha = backward_substitute(&chol, &z);

        let data_fit = -0.5 * y_norm.dot(&alpha);
        let complexity: f64 = (0..n).map(|i| chol[[i, i]].ln()).sum();
        let log_marginal_likelihood =
            data_fit - complexity - 0.5 * n as f64 * (2.0 * std::f64::consts::PI).ln();

        Ok(Self {
            x,
            chol,
            alpha,
            length_scale,
            y_mean,
            y_std,
            log_marginal_likelihood,
        })
    }

    /// Fit each candidate length scale and keep the most likely model
    pub fn fit_best(x: Array2<f64>, y: &[f64], length_scales: &[f64]) -> Result<Self> {
        let mut best: Option<Self> = None;
        let mut last_err = None;
        for &ls in length_scales {
            match Self::fit(x.clone(), y, ls) {
                Ok(gp) => {
                    let better = best
                        .as_ref()
                        .map_or(true, |b| gp.log_marginal_likelihood > b.log_marginal_likelihood);
                    if better {
                        best = Some(gp);
                    }
                }
                Err(e) => last_err = Some(e),
            }
        }
        best.ok_or_else(|| {
            last_err.unwrap_or_else(|| OptimError::Surrogate("no length scales given".to_string()))
        })
    }

    /// Posterior mean and standard deviation in target units
    pub fn predict(&self, point: ArrayView1<f64>) -> (f64, f64) {
        let k_star: Array1<f64> = self
            .x
            .rows()
            .into_iter()
            .map(|row| rbf(row, point, self.length_scale))
            .collect();
        let mean = k_star.dot(&self.alpha);
        let v = forward_substitute(&self.chol, &k_star);
        let var = (1.0 + NOISE - v.dot(&v)).max(1e-12);
        (mean * self.y_std + self.y_mean, var.sqrt() * self.y_std)
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn log_marginal_likelihood(&self) -> f64 {
        self.log_marginal_likelihood
    }
}
