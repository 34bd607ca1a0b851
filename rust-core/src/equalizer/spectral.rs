//! Frequency-domain band-gain equalization
//!
//! Pure transform: forward real FFT, per-bin gain by band membership,
//! inverse transform back to the original length. The offline whole-buffer
//! path and the live per-chunk path both call `apply`; the live path simply
//! passes shorter slices. Chunk-by-chunk processing carries no cross-chunk
//! overlap or windowing, so a gain step can produce an audible click at a
//! chunk boundary; that is an accepted approximation of the streaming path,
//! not something this routine masks.

use crate::equalizer::bands::{validate_gains, FrequencyBand};
use crate::error::CoreResult;
use crate::signal::SignalBuffer;
use crate::spectrum::FftEngine;

/// Multiband spectral equalizer.
///
/// Stateless between calls apart from cached FFT plans; the output is a
/// deterministic function of the inputs.
pub struct SpectralEqualizer {
    fft: FftEngine,
}

impl Default for SpectralEqualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralEqualizer {
    pub fn new() -> Self {
        Self {
            fft: FftEngine::new(),
        }
    }

    /// Equalize a buffer or chunk.
    ///
    /// Every FFT bin whose frequency `k*fs/N` lies inside one of the
    /// (disjoint, half-open) `bands` is scaled by that band's gain; all other
    /// bins pass through at unity. The result has the input's length.
    ///
    /// An empty band set is the identity transform.
    pub fn apply(
        &mut self,
        samples: &[f64],
        sample_rate: u32,
        bands: &[FrequencyBand],
        gains: &[f64],
    ) -> CoreResult<Vec<f64>> {
        validate_gains(bands, gains)?;

        if bands.is_empty() || samples.is_empty() {
            return Ok(samples.to_vec());
        }

        let n = samples.len();
        let mut spectrum = self.fft.forward(samples);
        let bin_hz = sample_rate as f64 / n as f64;

        for (k, bin) in spectrum.iter_mut().enumerate() {
            let freq = k as f64 * bin_hz;
            // Bands are disjoint, so at most one can match
            if let Some(i) = bands.iter().position(|b| b.contains(freq)) {
                *bin *= gains[i];
            }
        }

        Ok(self.fft.inverse(&spectrum, n))
    }

    /// Equalize a whole signal, producing the derived processed buffer the UI
    /// plots and plays back.
    pub fn apply_to_buffer(
        &mut self,
        buffer: &SignalBuffer,
        bands: &[FrequencyBand],
        gains: &[f64],
    ) -> CoreResult<SignalBuffer> {
        let samples = self.apply(buffer.samples(), buffer.sample_rate(), bands, gains)?;
        SignalBuffer::new(samples, buffer.sample_rate())
    }

    /// Magnitude spectrum and matching Hz axis for plotting.
    pub fn magnitude_spectrum(
        &mut self,
        samples: &[f64],
        sample_rate: u32,
    ) -> (Vec<f64>, Vec<f64>) {
        let magnitude = self.fft.magnitude(samples);
        let freqs = FftEngine::frequency_axis_hz(samples.len(), sample_rate);
        (magnitude, freqs)
    }
}
