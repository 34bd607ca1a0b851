//! Audio playback streamer using cpal
//!
//! Owns the output stream and the transport state machine. All control
//! entry points run on the UI/control thread; the audio callback only ever
//! sees the published snapshot (see `session`).

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, Stream, StreamConfig};
use log::{debug, error};

use crate::equalizer::{bands::validate_gains, EqualizerMode};
use crate::error::{CoreError, CoreResult};
use crate::playback::chunks::{ChunkConsumer, ChunkProducer, ChunkRing};
use crate::playback::puller::ChunkPuller;
use crate::playback::session::{PlaybackState, SharedSession, Snapshot};
use crate::signal::SignalBuffer;

/// Capacity of the processed-chunk tap in samples (about one second at
/// typical rates; overflow drops, it never blocks the callback).
const TAP_CAPACITY: usize = 48000;

/// Real-time playback engine.
///
/// `Stopped` is the initial state; `play()` from `Stopped` starts at sample
/// zero, from `Paused` it resumes. The cpal stream is torn down
/// synchronously by `stop()`, so no callback runs after `stop()` returns.
pub struct PlaybackStreamer {
    shared: Arc<SharedSession>,
    stream: Option<Stream>,
    tap_producer: Arc<Mutex<ChunkProducer>>,
    tap_consumer: ChunkConsumer,
    mode: EqualizerMode,
    speed_factor: f64,
}

impl Default for PlaybackStreamer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStreamer {
    pub fn new() -> Self {
        let (producer, consumer) = ChunkRing::new(TAP_CAPACITY);
        Self {
            shared: Arc::new(SharedSession::new()),
            stream: None,
            tap_producer: Arc::new(Mutex::new(producer)),
            tap_consumer: consumer,
            mode: EqualizerMode::UniformRange,
            speed_factor: 1.0,
        }
    }

    /// Commit a newly loaded signal. Playback stops; the snapshot is
    /// replaced wholesale with the mode's default gains.
    pub fn set_signal(&mut self, buffer: Arc<SignalBuffer>) {
        self.stop();
        self.shared.publish(Snapshot {
            buffer: Some(buffer),
            bands: self.mode.bands(),
            gains: self.mode.default_gains(),
        });
    }

    /// Switch equalizer mode; band table and gains reset to the mode's
    /// defaults.
    pub fn set_mode(&mut self, mode: EqualizerMode) {
        self.mode = mode;
        let buffer = self.shared.snapshot().buffer.clone();
        self.shared.publish(Snapshot {
            buffer,
            bands: mode.bands(),
            gains: mode.default_gains(),
        });
    }

    /// Commit a new gain vector. Validated against the current band table
    /// before publication, so the callback never sees a torn or invalid
    /// snapshot.
    pub fn set_gains(&mut self, gains: Vec<f64>) -> CoreResult<()> {
        let snapshot = self.shared.snapshot();
        validate_gains(&snapshot.bands, &gains)?;
        self.shared.publish(Snapshot {
            buffer: snapshot.buffer.clone(),
            bands: snapshot.bands.clone(),
            gains,
        });
        Ok(())
    }

    /// Start or resume playback.
    pub fn play(&mut self) -> CoreResult<()> {
        match self.shared.state() {
            PlaybackState::Playing => {
                return Err(CoreError::InvalidTransition {
                    op: "play",
                    state: "playing",
                })
            }
            PlaybackState::Stopped => {
                if self.shared.snapshot().buffer.is_none() {
                    return Err(CoreError::NoSignalLoaded);
                }
                self.shared.set_position(0);
                self.open_stream()?;
            }
            PlaybackState::Paused => {
                // Resume the existing stream at the held position
                if self.stream.is_none() {
                    self.open_stream()?;
                }
            }
        }

        self.start_stream()?;
        self.shared.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Pause, holding the playback position.
    pub fn pause(&mut self) -> CoreResult<()> {
        let state = self.shared.state();
        if state != PlaybackState::Playing {
            return Err(CoreError::InvalidTransition {
                op: "pause",
                state: state.name(),
            });
        }

        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                let err = CoreError::PlayStream(e.to_string());
                self.force_stopped();
                return Err(err);
            }
        }
        self.shared.set_state(PlaybackState::Paused);
        Ok(())
    }

    /// Stop playback and reset the position. Valid from any state; dropping
    /// the cpal stream closes it synchronously, so no callback runs after
    /// this returns.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("playback stream closed");
        }
        self.shared.take_pending_seek();
        self.shared.set_position(0);
        self.shared.set_state(PlaybackState::Stopped);
    }

    /// Change the playback speed factor.
    ///
    /// Speed is implemented by retagging the output stream's sample rate, so
    /// the position bookkeeping (sample-index based) is unaffected. Takes
    /// effect immediately when playing by rebuilding the stream.
    pub fn set_speed(&mut self, factor: f64) -> CoreResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CoreError::InvalidSpeed(factor));
        }
        self.speed_factor = factor;

        match self.shared.state() {
            PlaybackState::Playing => {
                self.stream = None;
                self.open_stream()?;
                self.start_stream()?;
            }
            // Resume rebuilds the stream at the new effective rate
            PlaybackState::Paused => {
                self.stream = None;
            }
            PlaybackState::Stopped => {}
        }
        Ok(())
    }

    /// Move the playback position (sample index, clamped to the buffer).
    ///
    /// While playing the seek is staged and the audio callback applies it at
    /// the top of its next invocation; otherwise it takes effect immediately.
    pub fn seek(&mut self, sample_index: usize) -> CoreResult<()> {
        let snapshot = self.shared.snapshot();
        let buffer = snapshot.buffer.as_ref().ok_or(CoreError::NoSignalLoaded)?;
        let clamped = sample_index.min(buffer.len());
        if self.shared.state() == PlaybackState::Playing {
            self.shared.request_seek(clamped);
        } else {
            self.shared.set_position(clamped);
        }
        Ok(())
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state()
    }

    /// Current playback position in samples (advanced by the callback).
    pub fn position(&self) -> usize {
        self.shared.position()
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn mode(&self) -> EqualizerMode {
        self.mode
    }

    /// Drain processed samples tapped from the callback, for the live cine
    /// plot. Best effort; returns how many samples were read.
    pub fn drain_processed(&mut self, out: &mut [f64]) -> usize {
        self.tap_consumer.drain(out)
    }

    fn open_stream(&mut self) -> CoreResult<()> {
        let snapshot = self.shared.snapshot();
        let buffer = snapshot.buffer.as_ref().ok_or(CoreError::NoSignalLoaded)?;
        let effective_rate =
            (buffer.sample_rate() as f64 * self.speed_factor).round().max(1.0) as u32;

        let host = cpal::default_host();
        let device = match host.default_output_device() {
            Some(device) => device,
            None => {
                self.force_stopped();
                return Err(CoreError::NoDevice);
            }
        };

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(effective_rate),
            buffer_size: BufferSize::Default,
        };

        let mut puller = ChunkPuller::new(Arc::clone(&self.shared), Arc::clone(&self.tap_producer));
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                puller.fill(data);
            },
            move |err| {
                error!("audio output error: {err}");
            },
            None,
        );

        match stream {
            Ok(stream) => {
                debug!(
                    "opened output stream on {} at {} Hz (speed {}x)",
                    device.name().unwrap_or_else(|_| "unknown device".into()),
                    effective_rate,
                    self.speed_factor
                );
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                self.force_stopped();
                Err(CoreError::BuildStream(e.to_string()))
            }
        }
    }

    /// Start the open stream; a device failure forces `Stopped`.
    fn start_stream(&mut self) -> CoreResult<()> {
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.play() {
                let err = CoreError::PlayStream(e.to_string());
                self.force_stopped();
                return Err(err);
            }
        }
        Ok(())
    }

    /// A device failure aborts the playback attempt.
    fn force_stopped(&mut self) {
        self.stream = None;
        self.shared.take_pending_seek();
        self.shared.set_position(0);
        self.shared.set_state(PlaybackState::Stopped);
    }
}

impl Drop for PlaybackStreamer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_without_signal_fails_stopped() {
        let mut streamer = PlaybackStreamer::new();
        let err = streamer.play().unwrap_err();
        assert!(matches!(err, CoreError::NoSignalLoaded));
        assert_eq!(streamer.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_pause_from_stopped_rejected() {
        let mut streamer = PlaybackStreamer::new();
        let err = streamer.pause().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                op: "pause",
                state: "stopped"
            }
        ));
        assert_eq!(streamer.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_stop_is_valid_from_stopped() {
        let mut streamer = PlaybackStreamer::new();
        streamer.stop();
        assert_eq!(streamer.state(), PlaybackState::Stopped);
        assert_eq!(streamer.position(), 0);
    }

    #[test]
    fn test_set_signal_commits_snapshot() {
        let mut streamer = PlaybackStreamer::new();
        let buffer = Arc::new(SignalBuffer::new(vec![0.1; 500], 1000).unwrap());
        streamer.set_signal(buffer);
        // Seek works once a signal is loaded, and clamps to the buffer
        streamer.seek(200).unwrap();
        assert_eq!(streamer.position(), 200);
        streamer.seek(9999).unwrap();
        assert_eq!(streamer.position(), 500);
    }

    #[test]
    fn test_seek_without_signal_fails() {
        let mut streamer = PlaybackStreamer::new();
        assert!(matches!(
            streamer.seek(0).unwrap_err(),
            CoreError::NoSignalLoaded
        ));
    }

    #[test]
    fn test_set_gains_validated_against_mode() {
        let mut streamer = PlaybackStreamer::new();
        assert!(streamer.set_gains(vec![1.0; 10]).is_ok());
        assert!(matches!(
            streamer.set_gains(vec![1.0; 3]).unwrap_err(),
            CoreError::GainCountMismatch { .. }
        ));
        assert!(matches!(
            streamer.set_gains(vec![3.0; 10]).unwrap_err(),
            CoreError::GainOutOfRange { .. }
        ));

        streamer.set_mode(EqualizerMode::HybridSounds);
        assert!(streamer.set_gains(vec![0.5; 5]).is_ok());
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let mut streamer = PlaybackStreamer::new();
        assert!(matches!(
            streamer.set_speed(0.0).unwrap_err(),
            CoreError::InvalidSpeed(_)
        ));
        assert!(matches!(
            streamer.set_speed(f64::NAN).unwrap_err(),
            CoreError::InvalidSpeed(_)
        ));
        // Valid factors are accepted while stopped
        streamer.set_speed(2.0).unwrap();
        assert_eq!(streamer.speed_factor(), 2.0);
    }

    #[test]
    fn test_set_speed_while_paused_forces_stream_rebuild() {
        let mut streamer = PlaybackStreamer::new();
        let buffer = Arc::new(SignalBuffer::new(vec![0.1; 500], 1000).unwrap());
        streamer.set_signal(buffer);
        streamer.shared.set_position(250);
        streamer.shared.set_state(PlaybackState::Paused);

        streamer.set_speed(1.5).unwrap();

        // The held stream (built at the old rate) is gone, so resume goes
        // through open_stream and picks up the new effective rate; the
        // paused position is untouched.
        assert!(streamer.stream.is_none());
        assert_eq!(streamer.state(), PlaybackState::Paused);
        assert_eq!(streamer.position(), 250);
        assert_eq!(streamer.speed_factor(), 1.5);
    }

    #[test]
    fn test_seek_while_playing_is_staged() {
        let mut streamer = PlaybackStreamer::new();
        let buffer = Arc::new(SignalBuffer::new(vec![0.1; 500], 1000).unwrap());
        streamer.set_signal(buffer);
        streamer.shared.set_position(64);
        streamer.shared.set_state(PlaybackState::Playing);

        streamer.seek(300).unwrap();

        // Not applied directly: the callback owns position during playback
        assert_eq!(streamer.position(), 64);
        assert_eq!(streamer.shared.take_pending_seek(), Some(300));
    }

    #[test]
    fn test_stop_discards_staged_seek() {
        let mut streamer = PlaybackStreamer::new();
        let buffer = Arc::new(SignalBuffer::new(vec![0.1; 500], 1000).unwrap());
        streamer.set_signal(buffer);
        streamer.shared.set_state(PlaybackState::Playing);
        streamer.seek(300).unwrap();

        streamer.stop();

        assert_eq!(streamer.position(), 0);
        assert_eq!(streamer.shared.take_pending_seek(), None);
    }

    #[test]
    fn test_mode_switch_resets_bands() {
        let mut streamer = PlaybackStreamer::new();
        assert_eq!(streamer.mode(), EqualizerMode::UniformRange);
        streamer.set_mode(EqualizerMode::WienerFilter);
        // Wiener mode carries no bands, so only the empty gain vector fits
        assert!(streamer.set_gains(vec![]).is_ok());
        assert!(streamer.set_gains(vec![1.0]).is_err());
    }
}
