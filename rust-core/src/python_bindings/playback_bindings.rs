//! Python bindings for real-time playback

use std::sync::Arc;

use numpy::PyArray1;
use pyo3::prelude::*;

use crate::playback::PlaybackStreamer;

use super::equalizer_bindings::PyEqualizerMode;
use super::signal_bindings::PySignalBuffer;
use super::to_py_err;

/// Playback engine exposed to Python. Owns the audio stream, so the object
/// must stay on the thread that created it.
#[pyclass(name = "Player", unsendable)]
pub struct PyPlayer {
    streamer: PlaybackStreamer,
}

#[pymethods]
impl PyPlayer {
    #[new]
    fn new() -> Self {
        Self {
            streamer: PlaybackStreamer::new(),
        }
    }

    /// Load a signal for playback; stops any current playback
    fn set_signal(&mut self, buffer: &PySignalBuffer) {
        self.streamer.set_signal(Arc::clone(&buffer.inner));
    }

    /// Switch equalizer mode; gains reset to the mode's defaults
    fn set_mode(&mut self, mode: PyEqualizerMode) {
        self.streamer.set_mode(mode.into());
    }

    /// Commit a new gain vector; audible from the next audio callback
    ///
    /// Args:
    ///     gains: One gain per band of the active mode, each in [0, 2]
    fn set_gains(&mut self, gains: Vec<f64>) -> PyResult<()> {
        self.streamer.set_gains(gains).map_err(to_py_err)
    }

    /// Start playback from the beginning, or resume from a pause
    fn play(&mut self) -> PyResult<()> {
        self.streamer.play().map_err(to_py_err)
    }

    /// Pause, holding the playback position
    fn pause(&mut self) -> PyResult<()> {
        self.streamer.pause().map_err(to_py_err)
    }

    /// Stop and rewind to the beginning
    fn stop(&mut self) {
        self.streamer.stop();
    }

    /// Change playback speed (1.0 = normal)
    fn set_speed(&mut self, factor: f64) -> PyResult<()> {
        self.streamer.set_speed(factor).map_err(to_py_err)
    }

    /// Move the playback position to a sample index (clamped)
    fn seek(&mut self, sample_index: usize) -> PyResult<()> {
        self.streamer.seek(sample_index).map_err(to_py_err)
    }

    /// Current playback position in samples
    fn position(&self) -> usize {
        self.streamer.position()
    }

    /// Current transport state name: "stopped", "playing" or "paused"
    fn state(&self) -> &'static str {
        self.streamer.state().name()
    }

    /// Current speed factor
    fn speed(&self) -> f64 {
        self.streamer.speed_factor()
    }

    /// Drain processed samples tapped from the audio callback, for the
    /// live cine plot
    ///
    /// Args:
    ///     max_samples: Maximum number of samples to read
    ///
    /// Returns:
    ///     Processed samples as numpy array (may be shorter than requested)
    fn drain_processed<'py>(
        &mut self,
        py: Python<'py>,
        max_samples: usize,
    ) -> PyResult<&'py PyArray1<f64>> {
        let mut out = vec![0.0; max_samples];
        let n = self.streamer.drain_processed(&mut out);
        out.truncate(n);
        Ok(PyArray1::from_vec(py, out))
    }
}
