//! Transport state shared between the control thread and the audio callback
//!
//! The control side publishes an immutable `Snapshot` (active buffer, band
//! table, committed gains) by swapping an `Arc` under a mutex; the callback
//! clones that `Arc` under the same short lock at the top of each invocation,
//! so it always observes a complete commit and a gain change becomes audible
//! no later than the next callback. Position and state are plain atomics:
//! the callback is the only writer of `position` while playing.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::equalizer::{EqualizerMode, FrequencyBand};
use crate::signal::SignalBuffer;

/// Transport state machine: `Stopped -> Playing <-> Paused -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaybackState {
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl PlaybackState {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

/// The immutable view the audio callback reads.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub buffer: Option<Arc<SignalBuffer>>,
    pub bands: Vec<FrequencyBand>,
    pub gains: Vec<f64>,
}

impl Snapshot {
    fn initial() -> Self {
        let mode = EqualizerMode::UniformRange;
        Self {
            buffer: None,
            bands: mode.bands(),
            gains: mode.default_gains(),
        }
    }
}

/// Sentinel for "no seek requested"; a buffer can never hold this many samples.
const NO_SEEK: usize = usize::MAX;

/// State crossing the control/audio boundary.
pub(crate) struct SharedSession {
    snapshot: Mutex<Arc<Snapshot>>,
    position: AtomicUsize,
    pending_seek: AtomicUsize,
    state: AtomicU8,
}

impl SharedSession {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(Arc::new(Snapshot::initial())),
            position: AtomicUsize::new(0),
            pending_seek: AtomicUsize::new(NO_SEEK),
            state: AtomicU8::new(PlaybackState::Stopped as u8),
        }
    }

    /// Publish a new snapshot, all-or-nothing.
    pub fn publish(&self, snapshot: Snapshot) {
        let mut guard = self.snapshot.lock().expect("snapshot lock poisoned");
        *guard = Arc::new(snapshot);
    }

    /// Latest fully-published snapshot. The lock is held only for the
    /// pointer clone, so the audio callback never waits on a long write.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.lock().expect("snapshot lock poisoned").clone()
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn position(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    pub fn set_position(&self, position: usize) {
        self.position.store(position, Ordering::Release);
    }

    /// Stage a seek while the callback is running. The callback is the only
    /// position writer during playback, so a direct store here could race a
    /// concurrent fill; instead the callback applies the request at the top
    /// of its next invocation.
    pub fn request_seek(&self, position: usize) {
        self.pending_seek.store(position, Ordering::Release);
    }

    /// Consume a staged seek, if any.
    pub fn take_pending_seek(&self) -> Option<usize> {
        let v = self.pending_seek.swap(NO_SEEK, Ordering::AcqRel);
        (v != NO_SEEK).then_some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_session() {
        let session = SharedSession::new();
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert_eq!(session.position(), 0);
        let snap = session.snapshot();
        assert!(snap.buffer.is_none());
        assert_eq!(snap.bands.len(), 10);
    }

    #[test]
    fn test_publish_replaces_whole_snapshot() {
        let session = SharedSession::new();
        let mode = EqualizerMode::HybridSounds;
        session.publish(Snapshot {
            buffer: Some(Arc::new(
                SignalBuffer::new(vec![0.5; 100], 1000).unwrap(),
            )),
            bands: mode.bands(),
            gains: mode.default_gains(),
        });

        let snap = session.snapshot();
        assert_eq!(snap.bands.len(), 5);
        assert!(snap.buffer.is_some());
    }

    #[test]
    fn test_pending_seek_consumed_once() {
        let session = SharedSession::new();
        assert_eq!(session.take_pending_seek(), None);

        session.request_seek(1234);
        assert_eq!(session.take_pending_seek(), Some(1234));
        assert_eq!(session.take_pending_seek(), None);

        // Later request replaces an unconsumed one
        session.request_seek(10);
        session.request_seek(20);
        assert_eq!(session.take_pending_seek(), Some(20));
    }

    #[test]
    fn test_state_round_trip() {
        let session = SharedSession::new();
        session.set_state(PlaybackState::Playing);
        assert_eq!(session.state(), PlaybackState::Playing);
        session.set_state(PlaybackState::Paused);
        assert_eq!(session.state(), PlaybackState::Paused);
    }
}
