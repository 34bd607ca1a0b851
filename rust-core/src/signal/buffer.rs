//! Immutable mono signal buffer
//!
//! Loaded once, then shared read-only by the equalizer, the denoiser and the
//! playback callback. A new load replaces the buffer wholesale; processing
//! always produces a derived copy.

use crate::error::{CoreError, CoreResult};

/// Mono sample buffer with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBuffer {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl SignalBuffer {
    /// Create a buffer, validating the loaded-buffer invariants.
    ///
    /// # Arguments
    /// * `samples` - Mono samples, must be non-empty
    /// * `sample_rate` - Sample rate in Hz, must be positive
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> CoreResult<Self> {
        if samples.is_empty() {
            return Err(CoreError::EmptySignal);
        }
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate);
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Samples as a read-only slice.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed buffer, kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Time axis in seconds, one entry per sample (for waveform plots).
    pub fn time_axis(&self) -> Vec<f64> {
        let dt = 1.0 / self.sample_rate as f64;
        (0..self.samples.len()).map(|n| n as f64 * dt).collect()
    }

    /// Peak absolute sample value.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0_f64, |acc, &s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_basic() {
        let buf = SignalBuffer::new(vec![0.0; 1000], 1000).unwrap();
        assert_eq!(buf.len(), 1000);
        assert_eq!(buf.sample_rate(), 1000);
        assert!((buf.duration_secs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_samples_rejected() {
        let err = SignalBuffer::new(vec![], 44100).unwrap_err();
        assert!(matches!(err, CoreError::EmptySignal));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = SignalBuffer::new(vec![1.0], 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSampleRate));
    }

    #[test]
    fn test_time_axis() {
        let buf = SignalBuffer::new(vec![0.0; 4], 2).unwrap();
        let t = buf.time_axis();
        assert_eq!(t.len(), 4);
        assert!((t[1] - 0.5).abs() < 1e-12);
        assert!((t[3] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_peak() {
        let buf = SignalBuffer::new(vec![0.25, -0.75, 0.5], 100).unwrap();
        assert!((buf.peak() - 0.75).abs() < 1e-12);
    }
}
