//! Python bindings for the multiband equalizer

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::equalizer::{EqualizerMode, SpectralEqualizer};

use super::signal_bindings::PySignalBuffer;
use super::to_py_err;

/// Equalizer mode enum exposed to Python
#[pyclass(name = "EqualizerMode")]
#[derive(Clone, Copy)]
pub enum PyEqualizerMode {
    UniformRange,
    HybridSounds,
    VowelElimination,
    WienerFilter,
}

impl From<PyEqualizerMode> for EqualizerMode {
    fn from(py_mode: PyEqualizerMode) -> Self {
        match py_mode {
            PyEqualizerMode::UniformRange => EqualizerMode::UniformRange,
            PyEqualizerMode::HybridSounds => EqualizerMode::HybridSounds,
            PyEqualizerMode::VowelElimination => EqualizerMode::VowelElimination,
            PyEqualizerMode::WienerFilter => EqualizerMode::WienerFilter,
        }
    }
}

#[pymethods]
impl PyEqualizerMode {
    /// Display name of the mode
    fn display_name(&self) -> &'static str {
        EqualizerMode::from(*self).name()
    }

    /// Per-band slider labels
    fn labels(&self) -> Vec<&'static str> {
        EqualizerMode::from(*self).labels()
    }

    /// Band edges as a list of (low_hz, high_hz) pairs
    fn band_edges(&self) -> Vec<(f64, f64)> {
        EqualizerMode::from(*self)
            .bands()
            .iter()
            .map(|b| (b.low_hz, b.high_hz))
            .collect()
    }

    /// Default (unity) gain vector
    fn default_gains(&self) -> Vec<f64> {
        EqualizerMode::from(*self).default_gains()
    }
}

/// Spectral equalizer exposed to Python
#[pyclass(name = "Equalizer")]
pub struct PyEqualizer {
    equalizer: SpectralEqualizer,
    mode: EqualizerMode,
}

#[pymethods]
impl PyEqualizer {
    /// Create an equalizer for the given mode
    ///
    /// Args:
    ///     mode: Equalizer mode (default: UniformRange)
    #[new]
    #[pyo3(signature = (mode=PyEqualizerMode::UniformRange))]
    fn new(mode: PyEqualizerMode) -> Self {
        Self {
            equalizer: SpectralEqualizer::new(),
            mode: mode.into(),
        }
    }

    /// Equalize a whole signal with the mode's band table
    ///
    /// Args:
    ///     buffer: Input signal
    ///     gains: One gain per band, each in [0, 2]
    ///
    /// Returns:
    ///     New SignalBuffer with the equalized signal
    fn apply(&mut self, buffer: &PySignalBuffer, gains: Vec<f64>) -> PyResult<PySignalBuffer> {
        let bands = self.mode.bands();
        let out = self
            .equalizer
            .apply_to_buffer(&buffer.inner, &bands, &gains)
            .map_err(to_py_err)?;
        Ok(PySignalBuffer {
            inner: std::sync::Arc::new(out),
        })
    }

    /// Magnitude spectrum of a signal with its frequency axis
    ///
    /// Args:
    ///     samples: Input signal as numpy array
    ///     sample_rate: Sample rate in Hz
    ///
    /// Returns:
    ///     Tuple of (magnitudes, frequencies_hz) numpy arrays
    fn magnitude_spectrum<'py>(
        &mut self,
        py: Python<'py>,
        samples: PyReadonlyArray1<f64>,
        sample_rate: u32,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let samples = samples.as_slice()?;
        let (magnitude, freqs) = self.equalizer.magnitude_spectrum(samples, sample_rate);
        Ok((PyArray1::from_vec(py, magnitude), PyArray1::from_vec(py, freqs)))
    }

    /// Frequency axis in Hz for a length-`len` transform
    ///
    /// Args:
    ///     len: Transform length in samples
    ///     sample_rate: Sample rate in Hz
    ///
    /// Returns:
    ///     Frequency bins as numpy array
    #[staticmethod]
    fn frequency_axis(py: Python<'_>, len: usize, sample_rate: u32) -> &PyArray1<f64> {
        PyArray1::from_vec(py, crate::spectrum::FftEngine::frequency_axis_hz(len, sample_rate))
    }

    /// Switch the band table to another mode
    fn set_mode(&mut self, mode: PyEqualizerMode) {
        self.mode = mode.into();
    }

    /// Number of bands in the current mode
    fn num_bands(&self) -> usize {
        self.mode.bands().len()
    }
}
