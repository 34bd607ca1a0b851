//! Python bindings for signal loading and persistence

use std::sync::Arc;

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::signal::{load_csv, load_wav, write_wav, SignalBuffer};

use super::to_py_err;

/// Loaded signal exposed to Python
#[pyclass(name = "SignalBuffer")]
pub struct PySignalBuffer {
    pub(crate) inner: Arc<SignalBuffer>,
}

#[pymethods]
impl PySignalBuffer {
    /// Create a buffer from raw samples
    ///
    /// Args:
    ///     samples: Signal samples as numpy array
    ///     sample_rate: Sample rate in Hz
    #[new]
    fn new(samples: PyReadonlyArray1<f64>, sample_rate: u32) -> PyResult<Self> {
        let samples = samples.as_slice()?.to_vec();
        let buffer = SignalBuffer::new(samples, sample_rate).map_err(to_py_err)?;
        Ok(Self {
            inner: Arc::new(buffer),
        })
    }

    /// Load a WAV file (mixed down to mono)
    ///
    /// Args:
    ///     path: Path to the WAV file
    ///
    /// Returns:
    ///     New SignalBuffer instance
    #[staticmethod]
    fn load_wav(path: &str) -> PyResult<Self> {
        let buffer = load_wav(path).map_err(to_py_err)?;
        Ok(Self {
            inner: Arc::new(buffer),
        })
    }

    /// Load a two-column `time,amplitude` CSV file
    ///
    /// Args:
    ///     path: Path to the CSV file
    ///
    /// Returns:
    ///     New SignalBuffer instance
    #[staticmethod]
    fn load_csv(path: &str) -> PyResult<Self> {
        let buffer = load_csv(path).map_err(to_py_err)?;
        Ok(Self {
            inner: Arc::new(buffer),
        })
    }

    /// Write the buffer as a 32-bit float WAV file
    ///
    /// Args:
    ///     path: Destination path
    fn save_wav(&self, path: &str) -> PyResult<()> {
        write_wav(&self.inner, path).map_err(to_py_err)
    }

    /// Get the samples
    ///
    /// Returns:
    ///     Signal samples as numpy array
    fn samples<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.inner.samples())
    }

    /// Get the time axis in seconds
    ///
    /// Returns:
    ///     Time stamps as numpy array
    fn time_axis<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.inner.time_axis())
    }

    /// Get the sample rate in Hz
    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    /// Get the number of samples
    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Get the duration in seconds
    fn duration(&self) -> f64 {
        self.inner.duration_secs()
    }

    /// Get the peak absolute amplitude
    fn peak(&self) -> f64 {
        self.inner.peak()
    }
}
