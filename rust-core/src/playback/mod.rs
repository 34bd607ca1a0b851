//! Real-time playback of the active signal through the equalizer

pub mod chunks;
pub mod puller;
pub mod session;
pub mod streamer;

pub use chunks::ChunkRing;
pub use session::PlaybackState;
pub use streamer::PlaybackStreamer;
