//! Frequency-domain multiband equalizer

pub mod bands;
pub mod spectral;

pub use bands::{EqualizerMode, FrequencyBand, GAIN_MAX, GAIN_MIN, UNITY_GAIN};
pub use spectral::SpectralEqualizer;
