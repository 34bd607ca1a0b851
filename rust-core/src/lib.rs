//! Signal Equalizer - Audio DSP Core
//!
//! Frequency-domain multiband equalization, Wiener noise reduction and
//! real-time playback engine with Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod denoise;
pub mod equalizer;
pub mod error;
pub mod playback;
pub mod signal;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use denoise::{NoiseProfile, NoiseProfileEstimator, WelchConfig, WienerFilterEngine};
pub use equalizer::{EqualizerMode, FrequencyBand, SpectralEqualizer};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use playback::{PlaybackState, PlaybackStreamer};
pub use signal::SignalBuffer;
pub use spectrum::FftEngine;
