//! WAV and CSV loading, WAV persistence
//!
//! WAV files are mixed down to mono on load. CSV is the two-column
//! `time,amplitude` format used for generated test signals; the sample rate
//! is recovered from the time column spacing.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{CoreError, CoreResult};
use crate::signal::SignalBuffer;

fn malformed(path: &Path, reason: impl ToString) -> CoreError {
    CoreError::MalformedFile {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Load a WAV file as a mono `SignalBuffer`.
///
/// Supports 16/32-bit integer and 32-bit float PCM. Multi-channel files are
/// averaged down to mono.
pub fn load_wav<P: AsRef<Path>>(path: P) -> CoreResult<SignalBuffer> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path).map_err(|e| malformed(path, e))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<_, _>>()
            .map_err(|e| malformed(path, e))?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f64 / i16::MAX as f64))
            .collect::<Result<_, _>>()
            .map_err(|e| malformed(path, e))?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f64 / i32::MAX as f64))
            .collect::<Result<_, _>>()
            .map_err(|e| malformed(path, e))?,
        (format, bits) => {
            return Err(CoreError::UnsupportedFormat(format!(
                "{bits}-bit {format:?} PCM"
            )))
        }
    };

    let samples: Vec<f64> = if channels <= 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect()
    };

    SignalBuffer::new(samples, spec.sample_rate)
}

/// Write a buffer as 32-bit float WAV tagged with the buffer's sample rate.
///
/// Samples exceeding unit range are scaled down by the peak so the file is
/// playable everywhere.
pub fn write_wav<P: AsRef<Path>>(buffer: &SignalBuffer, path: P) -> CoreResult<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let peak = buffer.peak();
    let scale = if peak > 1.0 { 1.0 / peak } else { 1.0 };

    let mut writer = WavWriter::create(path, spec).map_err(|e| malformed(path, e))?;
    for &s in buffer.samples() {
        writer
            .write_sample((s * scale) as f32)
            .map_err(|e| malformed(path, e))?;
    }
    writer.finalize().map_err(|e| malformed(path, e))?;

    Ok(())
}

/// Load a two-column `time,amplitude` CSV (header row expected).
///
/// The sample rate is derived from the spacing of the first two time stamps.
pub fn load_csv<P: AsRef<Path>>(path: P) -> CoreResult<SignalBuffer> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| malformed(path, e))?;

    let mut times = Vec::new();
    let mut amplitudes = Vec::new();

    // First line is the header
    for (line_no, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(',');
        let (t, a) = match (fields.next(), fields.next()) {
            (Some(t), Some(a)) => (t, a),
            _ => {
                return Err(malformed(
                    path,
                    format!("line {}: expected `time,amplitude`", line_no + 1),
                ))
            }
        };
        let t: f64 = t
            .trim()
            .parse()
            .map_err(|e| malformed(path, format!("line {}: {e}", line_no + 1)))?;
        let a: f64 = a
            .trim()
            .parse()
            .map_err(|e| malformed(path, format!("line {}: {e}", line_no + 1)))?;
        times.push(t);
        amplitudes.push(a);
    }

    if times.len() < 2 {
        return Err(malformed(path, "need at least two samples"));
    }

    for (i, w) in times.windows(2).enumerate() {
        if w[1] - w[0] <= 0.0 {
            return Err(malformed(
                path,
                format!("time column is not strictly increasing at row {}", i + 2),
            ));
        }
    }

    // Mean spacing over the whole span, so one jittered stamp cannot skew
    // the recovered rate
    let dt = (times[times.len() - 1] - times[0]) / (times.len() - 1) as f64;
    let sample_rate = (1.0 / dt).round() as u32;
    if sample_rate == 0 {
        return Err(malformed(path, "time spacing is too coarse for a sample rate"));
    }

    SignalBuffer::new(amplitudes, sample_rate)
}
