//! Pull-callback body
//!
//! `ChunkPuller::fill` is the code the audio sink invokes once per hardware
//! period. It is a plain struct, not a closure, so the end-of-buffer and
//! gain-commit behavior can be tested without opening a device. Work per
//! invocation is bounded by the chunk length; the only lock taken is the
//! snapshot pointer clone.

use std::sync::{Arc, Mutex};

use crate::equalizer::SpectralEqualizer;
use crate::playback::chunks::ChunkProducer;
use crate::playback::session::{PlaybackState, SharedSession};

pub(crate) struct ChunkPuller {
    shared: Arc<SharedSession>,
    tap: Arc<Mutex<ChunkProducer>>,
    equalizer: SpectralEqualizer,
}

impl ChunkPuller {
    pub fn new(shared: Arc<SharedSession>, tap: Arc<Mutex<ChunkProducer>>) -> Self {
        Self {
            shared,
            tap,
            equalizer: SpectralEqualizer::new(),
        }
    }

    /// Fill one output chunk.
    ///
    /// Slices `[position, position + out.len())` from the active buffer,
    /// equalizes it with the committed gain vector and advances the
    /// position. At the end of the buffer the final partial chunk is
    /// silence-padded and the state flips to `Stopped`; every later call
    /// emits silence.
    pub fn fill(&mut self, out: &mut [f32]) {
        if self.shared.state() != PlaybackState::Playing {
            out.fill(0.0);
            return;
        }

        let snapshot = self.shared.snapshot();
        let buffer = match snapshot.buffer.as_ref() {
            Some(buffer) => buffer,
            None => {
                out.fill(0.0);
                return;
            }
        };

        let samples = buffer.samples();

        // A seek made from the control thread during playback is staged and
        // applied here, so this callback stays the only position writer.
        if let Some(seek) = self.shared.take_pending_seek() {
            self.shared.set_position(seek.min(samples.len()));
        }

        let position = self.shared.position();
        if position >= samples.len() {
            out.fill(0.0);
            self.shared.set_state(PlaybackState::Stopped);
            return;
        }

        let end = (position + out.len()).min(samples.len());
        let chunk = &samples[position..end];

        // Gains were validated at publish time; if a bad snapshot slips
        // through anyway the chunk passes through unprocessed rather than
        // glitching the stream.
        let processed = self
            .equalizer
            .apply(chunk, buffer.sample_rate(), &snapshot.bands, &snapshot.gains)
            .unwrap_or_else(|_| chunk.to_vec());

        for (o, &s) in out.iter_mut().zip(processed.iter()) {
            *o = s as f32;
        }
        out[processed.len()..].fill(0.0);

        // Best effort: a full tap drops samples instead of blocking
        if let Ok(mut tap) = self.tap.try_lock() {
            tap.offer(&processed);
        }

        self.shared.set_position(end);
        if end == samples.len() {
            self.shared.set_state(PlaybackState::Stopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equalizer::EqualizerMode;
    use crate::playback::chunks::ChunkRing;
    use crate::playback::session::Snapshot;
    use crate::signal::SignalBuffer;

    fn playing_session(samples: Vec<f64>, gains: Vec<f64>) -> Arc<SharedSession> {
        let shared = Arc::new(SharedSession::new());
        let mode = EqualizerMode::UniformRange;
        shared.publish(Snapshot {
            buffer: Some(Arc::new(SignalBuffer::new(samples, 1000).unwrap())),
            bands: mode.bands(),
            gains,
        });
        shared.set_state(PlaybackState::Playing);
        shared
    }

    fn puller(shared: &Arc<SharedSession>) -> (ChunkPuller, crate::playback::chunks::ChunkConsumer)
    {
        let (producer, consumer) = ChunkRing::new(4096);
        (
            ChunkPuller::new(Arc::clone(shared), Arc::new(Mutex::new(producer))),
            consumer,
        )
    }

    #[test]
    fn test_fill_advances_position() {
        let shared = playing_session(vec![0.5; 100], EqualizerMode::UniformRange.default_gains());
        let (mut puller, _consumer) = puller(&shared);

        let mut out = [0.0f32; 64];
        puller.fill(&mut out);

        assert_eq!(shared.position(), 64);
        assert_eq!(shared.state(), PlaybackState::Playing);
        // Unity gains: the chunk passes through
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_final_partial_chunk_is_padded_and_stops() {
        let shared = playing_session(vec![0.5; 100], EqualizerMode::UniformRange.default_gains());
        let (mut puller, _consumer) = puller(&shared);

        let mut out = [0.0f32; 64];
        puller.fill(&mut out);
        puller.fill(&mut out);

        assert_eq!(shared.position(), 100);
        assert_eq!(shared.state(), PlaybackState::Stopped);
        // 36 real samples, then silence padding
        for &s in &out[..36] {
            assert!((s - 0.5).abs() < 1e-6);
        }
        for &s in &out[36..] {
            assert_eq!(s, 0.0);
        }

        // Stopped: further fills emit silence and hold position
        puller.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(shared.position(), 100);
    }

    #[test]
    fn test_gain_commit_visible_next_fill() {
        // A constant signal lives at DC, inside band 1 (0-50 Hz)
        let mode = EqualizerMode::UniformRange;
        let shared = playing_session(vec![0.5; 256], mode.default_gains());
        let (mut puller, _consumer) = puller(&shared);

        let mut out = [0.0f32; 64];
        puller.fill(&mut out);
        assert!((out[10] - 0.5).abs() < 1e-6);

        let mut gains = mode.default_gains();
        gains[0] = 0.0;
        let snap = shared.snapshot();
        shared.publish(Snapshot {
            buffer: snap.buffer.clone(),
            bands: mode.bands(),
            gains,
        });

        puller.fill(&mut out);
        for &s in &out {
            assert!(s.abs() < 1e-6);
        }
    }

    #[test]
    fn test_staged_seek_applied_before_slicing() {
        // Ramp signal so the output reveals which offset was read
        let samples: Vec<f64> = (0..256).map(|i| i as f64 / 1000.0).collect();
        let shared = playing_session(samples.clone(), EqualizerMode::UniformRange.default_gains());
        let (mut puller, _consumer) = puller(&shared);

        let mut out = [0.0f32; 64];
        puller.fill(&mut out);
        assert_eq!(shared.position(), 64);

        shared.request_seek(100);
        puller.fill(&mut out);

        // The fill consumed the staged seek: chunk read from 100, not 64
        assert_eq!(shared.position(), 164);
        assert!((out[0] as f64 - samples[100]).abs() < 1e-4);
        assert_eq!(shared.take_pending_seek(), None);
    }

    #[test]
    fn test_staged_seek_clamped_to_buffer() {
        let shared = playing_session(vec![0.5; 100], EqualizerMode::UniformRange.default_gains());
        let (mut puller, _consumer) = puller(&shared);

        shared.request_seek(5000);
        let mut out = [1.0f32; 32];
        puller.fill(&mut out);

        // Clamped to the end: the fill emits silence and stops
        assert_eq!(shared.position(), 100);
        assert_eq!(shared.state(), PlaybackState::Stopped);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_tap_receives_processed_chunk() {
        let shared = playing_session(vec![0.25; 64], EqualizerMode::UniformRange.default_gains());
        let (mut puller, mut consumer) = puller(&shared);

        let mut out = [0.0f32; 64];
        puller.fill(&mut out);

        let mut tapped = vec![0.0; 64];
        assert_eq!(consumer.drain(&mut tapped), 64);
        for &s in &tapped {
            assert!((s - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn test_not_playing_emits_silence() {
        let shared = Arc::new(SharedSession::new());
        let (mut puller, _consumer) = puller(&shared);

        let mut out = [1.0f32; 32];
        puller.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
