//! Real-valued FFT plumbing shared by the equalizer and the denoiser

pub mod fft;
pub mod window;

pub use fft::FftEngine;
pub use window::{hann_window, window_energy};
