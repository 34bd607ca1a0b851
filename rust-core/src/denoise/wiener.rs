//! Overlap-add Wiener filtering
//!
//! Suppresses stationary noise using the a priori Wiener gain
//! `G = SNR / (SNR + 1)` per frequency bin, with the a posteriori SNR taken
//! against a precomputed Welch noise PSD. Offline only; the output is a
//! first-class `SignalBuffer` the caller persists and reloads like any other
//! signal, never something run inside the real-time playback path.

use log::warn;

use crate::denoise::welch::{NoiseProfile, WelchConfig};
use crate::error::{CoreError, CoreResult};
use crate::signal::SignalBuffer;
use crate::spectrum::{hann_window, window_energy, FftEngine};

/// Floor substituted for zero noise-PSD bins so the SNR stays finite.
const PSD_FLOOR: f64 = 1e-12;

/// Framed overlap-add Wiener filter.
pub struct WienerFilterEngine {
    fft: FftEngine,
}

impl Default for WienerFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WienerFilterEngine {
    pub fn new() -> Self {
        Self {
            fft: FftEngine::new(),
        }
    }

    /// Filter `buffer` against an estimated noise profile.
    ///
    /// The output has the input's length and sample rate and is normalized by
    /// its own peak so it fits the representable range of the persisted WAV.
    pub fn filter(
        &mut self,
        buffer: &SignalBuffer,
        profile: &NoiseProfile,
        config: &WelchConfig,
    ) -> CoreResult<SignalBuffer> {
        let sample_rate = buffer.sample_rate();
        config.validate(sample_rate)?;

        if profile.nfft() != config.nfft {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "profile was estimated at nfft {}, filter configured for {}",
                profile.nfft(),
                config.nfft
            )));
        }
        if profile.sample_rate() != sample_rate {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "profile sample rate {} Hz does not match signal rate {} Hz",
                profile.sample_rate(),
                sample_rate
            )));
        }
        if profile.psd().iter().all(|&p| p <= 0.0) {
            return Err(CoreError::SilentNoiseProfile);
        }

        let frame_len = config.frame_len(sample_rate);
        let hop = config.hop(sample_rate);
        let samples = buffer.samples();
        if samples.len() < frame_len {
            return Err(CoreError::InvalidAnalysisConfig(format!(
                "signal of {} samples is shorter than one {} sample frame",
                samples.len(),
                frame_len
            )));
        }

        let window = hann_window(frame_len);
        let ew = window_energy(&window);
        let num_frames = (samples.len() - frame_len) / hop + 1;

        let mut output = vec![0.0; samples.len()];
        let mut framed = vec![0.0; frame_len];
        let mut floored_bins: usize = 0;

        for frame in 0..num_frames {
            let offset = frame * hop;
            for (i, w) in window.iter().enumerate() {
                framed[i] = samples[offset + i] * w;
            }

            let mut spectrum = self.fft.forward_padded(&framed, config.nfft);

            for (x, &sbb) in spectrum.iter_mut().zip(profile.psd().iter()) {
                let sbb = if sbb > PSD_FLOOR {
                    sbb
                } else {
                    floored_bins += 1;
                    PSD_FLOOR
                };
                let snr = (x.norm_sqr() / ew) / sbb;
                let gain = snr / (snr + 1.0);
                *x *= gain;
            }

            let estimate = self.fft.inverse(&spectrum, config.nfft);

            // Overlap-add, truncating the zero-padding tail
            for i in 0..frame_len {
                output[offset + i] += estimate[i] * config.overlap;
            }
        }

        if floored_bins > 0 {
            warn!(
                "noise PSD had zero bins; floored {} bin evaluations at {:e}",
                floored_bins, PSD_FLOOR
            );
        }

        let peak = output.iter().fold(0.0_f64, |acc, &s| acc.max(s.abs()));
        if peak > 0.0 {
            for s in output.iter_mut() {
                *s /= peak;
            }
        }

        SignalBuffer::new(output, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denoise::welch::test_support::pseudo_noise;
    use crate::denoise::NoiseProfileEstimator;
    use std::f64::consts::PI;

    const FS: u32 = 8000;

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
    }

    /// 2 s buffer: first second noise only, second second noise plus a
    /// strong 500 Hz tone.
    fn noisy_tone() -> SignalBuffer {
        let len = (FS * 2) as usize;
        let mut samples = pseudo_noise(len, 0.05, 1234);
        for (i, s) in samples.iter_mut().enumerate().skip(FS as usize) {
            let t = i as f64 / FS as f64;
            *s += (2.0 * PI * 500.0 * t).sin();
        }
        SignalBuffer::new(samples, FS).unwrap()
    }

    #[test]
    fn test_noise_region_suppressed_relative_to_tone() {
        let config = WelchConfig::default();
        let buffer = noisy_tone();

        let profile = NoiseProfileEstimator::new()
            .estimate(&buffer, 0.0, 0.9, &config)
            .unwrap();
        let filtered = WienerFilterEngine::new()
            .filter(&buffer, &profile, &config)
            .unwrap();

        // Ratio of noise-region RMS to tone-region RMS, away from the region
        // edges; peak normalization cancels in the ratio.
        let noise_span = (FS as usize / 10)..(FS as usize * 8 / 10);
        let tone_span = (FS as usize * 11 / 10)..(FS as usize * 18 / 10);

        let input_ratio =
            rms(&buffer.samples()[noise_span.clone()]) / rms(&buffer.samples()[tone_span.clone()]);
        let output_ratio =
            rms(&filtered.samples()[noise_span]) / rms(&filtered.samples()[tone_span]);

        assert!(
            output_ratio < input_ratio * 0.3,
            "input ratio {input_ratio}, output ratio {output_ratio}"
        );
    }

    #[test]
    fn test_output_shape_and_normalization() {
        let config = WelchConfig::default();
        let buffer = noisy_tone();

        let profile = NoiseProfileEstimator::new()
            .estimate(&buffer, 0.0, 0.9, &config)
            .unwrap();
        let filtered = WienerFilterEngine::new()
            .filter(&buffer, &profile, &config)
            .unwrap();

        assert_eq!(filtered.len(), buffer.len());
        assert_eq!(filtered.sample_rate(), buffer.sample_rate());
        assert!((filtered.peak() - 1.0).abs() < 1e-12);
        assert!(filtered.samples().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_sparse_psd_is_floored_not_nan() {
        // A pure-sine "noise" estimate leaves most PSD bins at numerical
        // zero; filtering must still produce finite output.
        let config = WelchConfig::default();
        let sine: Vec<f64> = (0..(FS * 2) as usize)
            .map(|i| (2.0 * PI * 1000.0 * i as f64 / FS as f64).sin() * 0.1)
            .collect();
        let buffer = SignalBuffer::new(sine, FS).unwrap();

        let profile = NoiseProfileEstimator::new()
            .estimate(&buffer, 0.0, 1.0, &config)
            .unwrap();
        let filtered = WienerFilterEngine::new()
            .filter(&buffer, &profile, &config)
            .unwrap();

        assert!(filtered.samples().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_all_zero_profile_rejected() {
        let config = WelchConfig::default();
        let buffer = noisy_tone();
        let profile = NoiseProfile::from_psd(vec![0.0; config.nfft / 2 + 1], config.nfft, FS);

        let err = WienerFilterEngine::new()
            .filter(&buffer, &profile, &config)
            .unwrap_err();
        assert!(matches!(err, CoreError::SilentNoiseProfile));
    }

    #[test]
    fn test_mismatched_profile_rejected() {
        let config = WelchConfig::default();
        let buffer = noisy_tone();
        let profile = NoiseProfile::from_psd(vec![1.0; 257], 512, FS);

        let err = WienerFilterEngine::new()
            .filter(&buffer, &profile, &config)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAnalysisConfig(_)));
    }
}
