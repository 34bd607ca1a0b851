//! Hann analysis window
//!
//! Used by the Welch noise estimator and the overlap-add Wiener filter.

use std::f64::consts::PI;

/// Generate a Hann window: `w[n] = 0.5 - 0.5*cos(2πn/(N-1))`.
pub fn hann_window(length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }
    let m = length as f64;
    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / (m - 1.0);
            0.5 - 0.5 * angle.cos()
        })
        .collect()
}

/// Window energy `Ew = Σ w[n]`, the normalizer in the a posteriori SNR.
pub fn window_energy(window: &[f64]) -> f64 {
    window.iter().sum()
}
