//! Error taxonomy for the DSP core
//!
//! Every fallible boundary the UI calls into returns `CoreError`. Errors are
//! classified into four kinds so the embedding layer can decide how to
//! surface them without matching on individual variants.

use thiserror::Error;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or empty input data (bad file, no signal loaded).
    InvalidInput,

    /// A parameter combination the core refuses to run with.
    Configuration,

    /// The audio device failed to open or play.
    Device,

    /// Unstable numeric condition that had to be clamped.
    Degeneracy,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no signal loaded")]
    NoSignalLoaded,

    #[error("signal is empty")]
    EmptySignal,

    #[error("sample rate must be positive")]
    InvalidSampleRate,

    #[error("failed to read {path}: {reason}")]
    MalformedFile { path: String, reason: String },

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("noise window [{start_s}, {end_s}] s is invalid for a {duration_s} s signal")]
    BadNoiseWindow {
        start_s: f64,
        end_s: f64,
        duration_s: f64,
    },

    #[error("noise window is shorter than one analysis frame ({frame_len} samples)")]
    NoiseWindowTooShort { frame_len: usize },

    #[error("invalid analysis configuration: {0}")]
    InvalidAnalysisConfig(String),

    #[error("estimated noise spectrum is silent (all-zero PSD)")]
    SilentNoiseProfile,

    #[error("expected {expected} gains for this mode, got {got}")]
    GainCountMismatch { expected: usize, got: usize },

    #[error("gain {gain} for band {band} is outside [{min}, {max}]")]
    GainOutOfRange {
        band: usize,
        gain: f64,
        min: f64,
        max: f64,
    },

    #[error("frequency bands {a} and {b} overlap")]
    OverlappingBands { a: usize, b: usize },

    #[error("cannot {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },

    #[error("playback speed must be positive, got {0}")]
    InvalidSpeed(f64),

    #[error("no audio output device found")]
    NoDevice,

    #[error("failed to build audio stream: {0}")]
    BuildStream(String),

    #[error("failed to start audio stream: {0}")]
    PlayStream(String),
}

impl CoreError {
    /// Classify this error for the UI boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NoSignalLoaded
            | CoreError::EmptySignal
            | CoreError::InvalidSampleRate
            | CoreError::MalformedFile { .. }
            | CoreError::UnsupportedFormat(_) => ErrorKind::InvalidInput,

            CoreError::BadNoiseWindow { .. }
            | CoreError::NoiseWindowTooShort { .. }
            | CoreError::InvalidAnalysisConfig(_)
            | CoreError::GainCountMismatch { .. }
            | CoreError::GainOutOfRange { .. }
            | CoreError::OverlappingBands { .. }
            | CoreError::InvalidTransition { .. }
            | CoreError::InvalidSpeed(_) => ErrorKind::Configuration,

            CoreError::NoDevice | CoreError::BuildStream(_) | CoreError::PlayStream(_) => {
                ErrorKind::Device
            }

            CoreError::SilentNoiseProfile => ErrorKind::Degeneracy,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
