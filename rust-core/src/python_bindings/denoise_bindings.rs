//! Python bindings for Wiener noise reduction

use numpy::PyArray1;
use pyo3::prelude::*;

use crate::denoise::{NoiseProfile, NoiseProfileEstimator, WelchConfig, WienerFilterEngine};

use super::signal_bindings::PySignalBuffer;
use super::to_py_err;

/// Noise reducer exposed to Python: Welch profile estimation followed by
/// a priori Wiener filtering.
#[pyclass(name = "NoiseReducer")]
pub struct PyNoiseReducer {
    estimator: NoiseProfileEstimator,
    engine: WienerFilterEngine,
    config: WelchConfig,
    profile: Option<NoiseProfile>,
}

#[pymethods]
impl PyNoiseReducer {
    /// Create a noise reducer
    ///
    /// Args:
    ///     frame_ms: Analysis frame length in milliseconds (default: 20)
    ///     overlap: Frame overlap fraction in (0, 1) (default: 0.5)
    ///     nfft: FFT length for the analysis frames (default: 1024)
    #[new]
    #[pyo3(signature = (frame_ms=20.0, overlap=0.5, nfft=1024))]
    fn new(frame_ms: f64, overlap: f64, nfft: usize) -> Self {
        Self {
            estimator: NoiseProfileEstimator::new(),
            engine: WienerFilterEngine::new(),
            config: WelchConfig {
                frame_ms,
                overlap,
                nfft,
            },
            profile: None,
        }
    }

    /// Estimate the noise profile from a noise-only stretch of the signal
    ///
    /// Args:
    ///     buffer: Input signal
    ///     noise_start_s: Start of the noise-only window in seconds
    ///     noise_end_s: End of the noise-only window in seconds
    fn estimate_profile(
        &mut self,
        buffer: &PySignalBuffer,
        noise_start_s: f64,
        noise_end_s: f64,
    ) -> PyResult<()> {
        let profile = self
            .estimator
            .estimate(&buffer.inner, noise_start_s, noise_end_s, &self.config)
            .map_err(to_py_err)?;
        self.profile = Some(profile);
        Ok(())
    }

    /// Filter a signal against the estimated profile
    ///
    /// Args:
    ///     buffer: Input signal (same sample rate as the profiled one)
    ///
    /// Returns:
    ///     New SignalBuffer with the denoised, peak-normalized signal
    fn filter(&mut self, buffer: &PySignalBuffer) -> PyResult<PySignalBuffer> {
        let profile = self.profile.as_ref().ok_or_else(|| {
            pyo3::exceptions::PyValueError::new_err(
                "no noise profile estimated; call estimate_profile first",
            )
        })?;
        let out = self
            .engine
            .filter(&buffer.inner, profile, &self.config)
            .map_err(to_py_err)?;
        Ok(PySignalBuffer {
            inner: std::sync::Arc::new(out),
        })
    }

    /// Get the estimated noise power spectral density
    ///
    /// Returns:
    ///     Tuple of (psd, frequencies_hz) numpy arrays
    fn profile_psd<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let profile = self.profile.as_ref().ok_or_else(|| {
            pyo3::exceptions::PyValueError::new_err("no noise profile estimated")
        })?;
        Ok((
            PyArray1::from_slice(py, profile.psd()),
            PyArray1::from_vec(py, profile.frequency_axis_hz()),
        ))
    }

    /// Whether a profile has been estimated
    fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    /// Discard the current profile
    fn clear_profile(&mut self) {
        self.profile = None;
    }
}
