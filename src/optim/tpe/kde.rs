//! KDE and EI-ratio helpers

use rand::Rng;

/// Number of candidates drawn from the "good" density per parameter
const N_CANDIDATES: usize = 24;

/// Sample a unit-cube coordinate maximising l(x) / g(x)
///
/// `good` and `bad` are unit-interval coordinates of the good and bad
/// trial groups.
pub fn sample_ei_ratio<R: Rng>(good: &[f64], bad: &[f64], bandwidth: f64, rng: &mut R) -> f64 {
    if good.is_empty() {
        return rng.random::<f64>();
    }

    let mut best_value = 0.0;
    let mut best_ei = f64::NEG_INFINITY;

    for _ in 0..N_CANDIDATES {
        let idx = ((rng.random::<f64>() * good.len() as f64).floor() as usize).min(good.len() - 1);
        let candidate = (good[idx] + gaussian(rng) * bandwidth).clamp(0.0, 1.0);

        let l_score = kde_score(candidate, good, bandwidth);
        let g_score = kde_score(candidate, bad, bandwidth);
        let ei = l_score / (g_score + 1e-10);

        if ei > best_ei {
            best_ei = ei;
            best_value = candidate;
        }
    }

    best_value
}

/// Gaussian KDE density (unnormalised)
pub fn kde_score(x: f64, values: &[f64], bandwidth: f64) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    values
        .iter()
        .map(|&v| (-(x - v).powi(2) / (2.0 * bandwidth.powi(2))).exp())
        .sum::<f64>()
        / values.len() as f64
}

/// Standard normal draw (Box-Muller)
pub fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
