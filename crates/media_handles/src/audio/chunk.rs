//! Decoded audio samples

use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::stream::{load_from, Stream};
use crate::system::{log_creation, MixerSystem};
use std::rc::Rc;

/// Owned audio chunk
pub struct AudioChunk<M: MixerSystem> {
    handle: SystemHandle<M, M::Chunk>,
}

impl<M: MixerSystem> AudioChunk<M> {
    /// Decode a WAVE file
    pub fn from_file(mixer: &Rc<M>, path: &str) -> HandleResult<Self> {
        Self::from_wav(&Stream::from_file(mixer, path, "rb")?)
    }

    /// Decode a WAVE file from a stream; the stream stays open
    pub fn from_wav(wav: &Stream<M>) -> HandleResult<Self> {
        let mixer = wav.system();
        let handle = load_from(
            wav,
            |source, free_source| mixer.load_wav(source, free_source),
            "Loading audio chunk from file failed",
            SystemRelease::new(Rc::clone(mixer), M::free_chunk),
        );
        log_creation(mixer.as_ref(), "audio chunk", handle).map(|handle| Self { handle })
    }

    /// Wrap an in-memory WAVE file already in the output format
    pub fn quick_load_wav(mixer: &Rc<M>, mem: Vec<u8>) -> HandleResult<Self> {
        let handle = acquire(
            |mem| mixer.quick_load_wav(mem),
            "Quickloading audio chunk from memory failed",
            mem,
            SystemRelease::new(Rc::clone(mixer), M::free_chunk),
        );
        log_creation(mixer.as_ref(), "quick-loaded audio chunk", handle).map(|handle| Self { handle })
    }

    /// Wrap raw samples already in the output format
    pub fn quick_load_raw(mixer: &Rc<M>, mem: Vec<u8>) -> HandleResult<Self> {
        let handle = acquire(
            |mem| mixer.quick_load_raw(mem),
            "Quickloading raw audio chunk from memory failed",
            mem,
            SystemRelease::new(Rc::clone(mixer), M::free_chunk),
        );
        log_creation(mixer.as_ref(), "raw audio chunk", handle).map(|handle| Self { handle })
    }

    /// The native chunk handle
    pub fn raw(&self) -> M::Chunk {
        self.handle.get()
    }

    fn mixer(&self) -> &M {
        self.handle.releaser().system()
    }

    /// Play on `channel` (-1 for the first free one), repeating `loops`
    /// extra times, for at most `ticks` ms (-1 for no limit)
    ///
    /// Returns the channel used, or -1 on failure.
    pub fn play(&self, channel: i32, loops: i32, ticks: i32) -> i32 {
        self.mixer().play_channel_timed(channel, self.raw(), loops, ticks)
    }

    /// Like [`play`](Self::play), fading in over `ms` milliseconds
    pub fn fade_in(&self, channel: i32, loops: i32, ms: i32, ticks: i32) -> i32 {
        self.mixer().fade_in_channel_timed(channel, self.raw(), loops, ms, ticks)
    }

    /// Set the volume (0 to [`MAX_VOLUME`](super::MAX_VOLUME)); returns the
    /// previous volume
    pub fn set_volume(&self, volume: i32) -> i32 {
        self.mixer().volume_chunk(self.raw(), volume)
    }

    /// Current volume
    pub fn volume(&self) -> i32 {
        self.mixer().volume_chunk(self.raw(), -1)
    }
}

impl<M: MixerSystem> std::fmt::Debug for AudioChunk<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChunk").field("handle", &self.raw()).finish()
    }
}
