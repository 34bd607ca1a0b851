//! FFT engine using realfft for real-valued signals
//!
//! One engine instance serves every transform length; realfft caches a plan
//! per length internally. Both the offline whole-buffer path and the
//! per-chunk streaming path go through this same routine, which is what makes
//! their results consistent with each other.

use num_complex::Complex;
use realfft::RealFftPlanner;

/// Forward/inverse real FFT engine.
pub struct FftEngine {
    planner: RealFftPlanner<f64>,
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FftEngine {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
        }
    }

    /// Forward transform of a real signal.
    ///
    /// # Returns
    /// `len/2 + 1` complex bins for the positive frequencies.
    pub fn forward(&mut self, signal: &[f64]) -> Vec<Complex<f64>> {
        let r2c = self.planner.plan_fft_forward(signal.len());
        let mut input = signal.to_vec();
        let mut output = r2c.make_output_vec();
        r2c.process(&mut input, &mut output)
            .expect("FFT processing failed");
        output
    }

    /// Forward transform after zero-padding the signal to `nfft` samples.
    pub fn forward_padded(&mut self, signal: &[f64], nfft: usize) -> Vec<Complex<f64>> {
        let r2c = self.planner.plan_fft_forward(nfft);
        let mut input = vec![0.0; nfft];
        let copy_len = signal.len().min(nfft);
        input[..copy_len].copy_from_slice(&signal[..copy_len]);
        let mut output = r2c.make_output_vec();
        r2c.process(&mut input, &mut output)
            .expect("FFT processing failed");
        output
    }

    /// Inverse transform back to a real signal of `len` samples.
    ///
    /// The result is scaled by `1/len`, so `inverse(forward(x))` reproduces
    /// `x` to floating-point tolerance.
    pub fn inverse(&mut self, spectrum: &[Complex<f64>], len: usize) -> Vec<f64> {
        let c2r = self.planner.plan_fft_inverse(len);
        let mut input = spectrum.to_vec();

        // realfft requires purely real DC and Nyquist bins
        input[0].im = 0.0;
        if len % 2 == 0 {
            if let Some(last) = input.last_mut() {
                last.im = 0.0;
            }
        }

        let mut output = c2r.make_output_vec();
        c2r.process(&mut input, &mut output)
            .expect("inverse FFT processing failed");

        let scale = 1.0 / len as f64;
        for s in output.iter_mut() {
            *s *= scale;
        }
        output
    }

    /// Magnitude spectrum |X[k]| for the positive frequencies.
    pub fn magnitude(&mut self, signal: &[f64]) -> Vec<f64> {
        self.forward(signal).iter().map(|c| c.norm()).collect()
    }

    /// Frequency axis in Hz for a length-`len` transform: `freq[k] = k*fs/len`.
    pub fn frequency_axis_hz(len: usize, sample_rate: u32) -> Vec<f64> {
        let num_bins = len / 2 + 1;
        (0..num_bins)
            .map(|k| k as f64 * sample_rate as f64 / len as f64)
            .collect()
    }
}
