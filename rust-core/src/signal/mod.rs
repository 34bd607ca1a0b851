//! Signal containers and file I/O

pub mod buffer;
pub mod io;

pub use buffer::SignalBuffer;
pub use io::{load_csv, load_wav, write_wav};
