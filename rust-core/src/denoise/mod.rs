//! Statistical noise suppression
//!
//! Welch-periodogram noise PSD estimation plus framed overlap-add Wiener
//! filtering, after Plapous, Marro and Scalart, "Improved Signal-to-Noise
//! Ratio Estimation for Speech Enhancement" (IEEE TASLP, 2006).

pub mod welch;
pub mod wiener;

pub use welch::{NoiseProfile, NoiseProfileEstimator, WelchConfig};
pub use wiener::WienerFilterEngine;
