//! Frequency bands and equalizer modes
//!
//! Each mode carries its band table, labels and default gain vector as data.
//! Bands are half-open `[low, high)` so adjacent bands never claim the same
//! FFT bin.

use crate::error::{CoreError, CoreResult};

/// Lowest allowed band gain (full mute).
pub const GAIN_MIN: f64 = 0.0;

/// Highest allowed band gain (2x boost).
pub const GAIN_MAX: f64 = 2.0;

/// Gain that leaves a band untouched.
pub const UNITY_GAIN: f64 = 1.0;

/// A contiguous frequency interval `[low_hz, high_hz)` with an associated gain slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        debug_assert!(low_hz < high_hz);
        Self { low_hz, high_hz }
    }

    /// Whether `freq_hz` falls inside this band.
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz < self.high_hz
    }

    /// Whether two bands share any frequency.
    pub fn overlaps(&self, other: &FrequencyBand) -> bool {
        self.low_hz < other.high_hz && other.low_hz < self.high_hz
    }
}

/// Equalizer mode, selecting the active band table and default gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualizerMode {
    /// Ten equal 50 Hz bands spanning 0-500 Hz.
    UniformRange,

    /// Curated animal/instrument sound bands.
    HybridSounds,

    /// Curated bands targeting vowel formant regions.
    VowelElimination,

    /// Noise reduction mode; no equalizer bands.
    WienerFilter,
}

impl EqualizerMode {
    /// All modes, in UI cycling order.
    pub fn all() -> [EqualizerMode; 4] {
        [
            EqualizerMode::UniformRange,
            EqualizerMode::HybridSounds,
            EqualizerMode::VowelElimination,
            EqualizerMode::WienerFilter,
        ]
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            EqualizerMode::UniformRange => "Uniform Range",
            EqualizerMode::HybridSounds => "Hybrid Sounds",
            EqualizerMode::VowelElimination => "Eliminates Vowels",
            EqualizerMode::WienerFilter => "Wiener Filter",
        }
    }

    /// The band table for this mode.
    pub fn bands(&self) -> Vec<FrequencyBand> {
        match self {
            EqualizerMode::UniformRange => (0..10)
                .map(|i| FrequencyBand::new(i as f64 * 50.0, (i + 1) as f64 * 50.0))
                .collect(),
            EqualizerMode::HybridSounds => vec![
                FrequencyBand::new(0.0, 600.0),
                FrequencyBand::new(600.0, 800.0),
                FrequencyBand::new(1800.0, 5500.0),
                FrequencyBand::new(1200.0, 1800.0),
                FrequencyBand::new(5500.0, 20000.0),
            ],
            EqualizerMode::VowelElimination => vec![
                FrequencyBand::new(0.0, 50.0),
                FrequencyBand::new(6000.0, 7000.0),
                FrequencyBand::new(2000.0, 5000.0),
                FrequencyBand::new(600.0, 800.0),
            ],
            EqualizerMode::WienerFilter => vec![],
        }
    }

    /// Per-band slider labels, matching `bands()` order.
    pub fn labels(&self) -> Vec<&'static str> {
        match self {
            EqualizerMode::UniformRange => vec![
                "Slider 1", "Slider 2", "Slider 3", "Slider 4", "Slider 5", "Slider 6",
                "Slider 7", "Slider 8", "Slider 9", "Slider 10",
            ],
            EqualizerMode::HybridSounds => {
                vec!["Wolf", "Owl", "Birds", "Studio", "80s sine synth"]
            }
            EqualizerMode::VowelElimination => vec!["Keyboard", "Synth", "C", "C+A"],
            EqualizerMode::WienerFilter => vec![],
        }
    }

    /// Default (unity) gain vector for this mode.
    pub fn default_gains(&self) -> Vec<f64> {
        vec![UNITY_GAIN; self.bands().len()]
    }
}

/// Validate a gain vector against a band table.
///
/// Checks count, the `[GAIN_MIN, GAIN_MAX]` range per gain, and that the
/// bands are pairwise disjoint.
pub fn validate_gains(bands: &[FrequencyBand], gains: &[f64]) -> CoreResult<()> {
    if gains.len() != bands.len() {
        return Err(CoreError::GainCountMismatch {
            expected: bands.len(),
            got: gains.len(),
        });
    }

    for (i, &gain) in gains.iter().enumerate() {
        if !gain.is_finite() || !(GAIN_MIN..=GAIN_MAX).contains(&gain) {
            return Err(CoreError::GainOutOfRange {
                band: i,
                gain,
                min: GAIN_MIN,
                max: GAIN_MAX,
            });
        }
    }

    for a in 0..bands.len() {
        for b in (a + 1)..bands.len() {
            if bands[a].overlaps(&bands[b]) {
                return Err(CoreError::OverlappingBands { a, b });
            }
        }
    }

    Ok(())
}
