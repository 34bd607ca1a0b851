//! Welch-periodogram noise PSD estimation
//!
//! Estimates the power spectral density of stationary noise from a
//! designated noise-only time window. Frames are Hann-windowed, zero-padded
//! to `nfft` and accumulated as a running mean, so memory stays at one
//! accumulator regardless of frame count.

use crate::error::{CoreError, CoreResult};
use crate::signal::SignalBuffer;
use crate::spectrum::{hann_window, FftEngine};

/// Framing parameters shared by the estimator and the Wiener filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchConfig {
    /// Analysis frame length in milliseconds.
    pub frame_ms: f64,

    /// Hop as a fraction of the frame length (0 < overlap < 1).
    pub overlap: f64,

    /// FFT size frames are zero-padded to.
    pub nfft: usize,
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self {
            frame_ms: 20.0,
            overlap: 0.5,
            nfft: 1024,
        }
    }
}

impl WelchConfig {
    /// Frame length in samples at the given rate.
    pub fn frame_len(&self, sample_rate: u32) -> usize {
        (self.frame_ms * sample_rate as f64 / 1000.0) as usize
    }

    /// Hop (frame stride) in samples at the given rate.
    pub fn hop(&self, sample_rate: u32) -> usize {
        (self.overlap * self.frame_len(sample_rate) as f64) as usize
    }

    pub(crate) fn validate(&self, sample_rate: u32) -> CoreResult<()> {
        if !(self.frame_ms > 0.0) {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "frame length {} ms must be positive",
                self.frame_ms
            )));
        }
        if !(self.overlap > 0.0 && self.overlap < 1.0) {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "overlap {} must be in (0, 1)",
                self.overlap
            )));
        }
        let frame_len = self.frame_len(sample_rate);
        if frame_len < 2 || self.hop(sample_rate) == 0 {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "frame of {} ms at {} Hz is too short",
                self.frame_ms, sample_rate
            )));
        }
        if self.nfft < frame_len {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "nfft {} is smaller than the frame length {}",
                self.nfft, frame_len
            )));
        }
        Ok(())
    }
}

/// Noise power spectral density, immutable once estimated.
#[derive(Debug, Clone)]
pub struct NoiseProfile {
    psd: Vec<f64>,
    nfft: usize,
    sample_rate: u32,
}

impl NoiseProfile {
    pub(crate) fn from_psd(psd: Vec<f64>, nfft: usize, sample_rate: u32) -> Self {
        Self {
            psd,
            nfft,
            sample_rate,
        }
    }

    /// PSD per positive-frequency bin (`nfft/2 + 1` values).
    pub fn psd(&self) -> &[f64] {
        &self.psd
    }

    /// FFT size the profile was estimated at.
    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// Sample rate of the signal the profile was estimated from.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frequency axis in Hz matching `psd()`.
    pub fn frequency_axis_hz(&self) -> Vec<f64> {
        FftEngine::frequency_axis_hz(self.nfft, self.sample_rate)
    }
}

/// Welch-periodogram estimator.
pub struct NoiseProfileEstimator {
    fft: FftEngine,
}

impl Default for NoiseProfileEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseProfileEstimator {
    pub fn new() -> Self {
        Self {
            fft: FftEngine::new(),
        }
    }

    /// Estimate the noise PSD from `[noise_start_s, noise_end_s]` of `buffer`.
    ///
    /// Identical inputs always yield an identical profile.
    ///
    /// # Errors
    /// * `BadNoiseWindow` when the window is empty, reversed or outside the
    ///   signal's duration
    /// * `NoiseWindowTooShort` when it holds less than one frame
    /// * `SilentNoiseProfile` when the window is all zeros
    pub fn estimate(
        &mut self,
        buffer: &SignalBuffer,
        noise_start_s: f64,
        noise_end_s: f64,
        config: &WelchConfig,
    ) -> CoreResult<NoiseProfile> {
        let sample_rate = buffer.sample_rate();
        config.validate(sample_rate)?;

        let duration = buffer.duration_secs();
        if noise_end_s <= noise_start_s || noise_start_s < 0.0 || noise_end_s > duration {
            return Err(CoreError::BadNoiseWindow {
                start_s: noise_start_s,
                end_s: noise_end_s,
                duration_s: duration,
            });
        }

        let start = (noise_start_s * sample_rate as f64).round() as usize;
        let end = ((noise_end_s * sample_rate as f64).round() as usize).min(buffer.len());
        let segment = &buffer.samples()[start..end];

        let frame_len = config.frame_len(sample_rate);
        let hop = config.hop(sample_rate);
        if segment.len() < frame_len {
            return Err(CoreError::NoiseWindowTooShort { frame_len });
        }

        let window = hann_window(frame_len);
        let num_frames = (segment.len() - frame_len) / hop + 1;
        let num_bins = config.nfft / 2 + 1;

        let mut psd = vec![0.0; num_bins];
        let mut framed = vec![0.0; frame_len];

        for k in 0..num_frames {
            let offset = k * hop;
            for (i, w) in window.iter().enumerate() {
                framed[i] = segment[offset + i] * w;
            }
            let spectrum = self.fft.forward_padded(&framed, config.nfft);

            // Running mean: Sbb <- Sbb*k/(k+1) + |X|^2/(k+1)
            let kf = k as f64;
            for (bin, x) in psd.iter_mut().zip(spectrum.iter()) {
                *bin = *bin * kf / (kf + 1.0) + x.norm_sqr() / (kf + 1.0);
            }
        }

        if psd.iter().all(|&p| p <= 0.0) {
            return Err(CoreError::SilentNoiseProfile);
        }

        Ok(NoiseProfile::from_psd(psd, config.nfft, sample_rate))
    }
}
