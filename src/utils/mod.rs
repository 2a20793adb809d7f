//! Shared low-level helpers: big-endian IO and progress synchronization.

mod io;
mod synchronization;

pub use io::{read_be, read_be_at, write_be, write_be_at, RomIO};
pub use synchronization::Progress;
