//! Sample playback and music
//!
//! - [`AudioChunk`]: a decoded sample played on mixing channels.
//! - [`AudioChannels`]: the mixer's channel table (allocation, groups, fades).
//! - [`Music`]: a streamed track; only one plays at a time.
//! - [`MusicPlayback`]: controls for whichever track is playing.
//!
//! Channel numbers are native indices; `-1` means "any free channel" when
//! playing and "all channels" for queries and controls.

mod channels;
mod chunk;
mod music;

pub use channels::AudioChannels;
pub use chunk::AudioChunk;
pub use music::{Music, MusicPlayback};

/// Volume ceiling used by the mixer
pub const MAX_VOLUME: i32 = 128;
