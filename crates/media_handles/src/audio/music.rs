//! Streamed music tracks

use crate::error::HandleResult;
use crate::handle::{SystemHandle, SystemRelease};
use crate::stream::{load_from, Stream};
use crate::system::{log_creation, MixerSystem, MusicType};
use std::rc::Rc;

/// Owned music track
pub struct Music<M: MixerSystem> {
    handle: SystemHandle<M, M::Music>,
}

impl<M: MixerSystem> Music<M> {
    /// Decode a music file (WAVE, Ogg, MP3 or FLAC)
    pub fn from_file(mixer: &Rc<M>, path: &str) -> HandleResult<Self> {
        Self::from_stream(&Stream::from_file(mixer, path, "rb")?)
    }

    /// Decode music from a stream; the stream stays open
    ///
    /// Streaming decoders may keep reading from the stream during playback;
    /// with those, keep the stream alive as long as the track.
    pub fn from_stream(file: &Stream<M>) -> HandleResult<Self> {
        let mixer = file.system();
        let handle = load_from(
            file,
            |source, free_source| mixer.load_music(source, free_source),
            "Loading music from file failed",
            SystemRelease::new(Rc::clone(mixer), M::free_music),
        );
        log_creation(mixer.as_ref(), "music", handle).map(|handle| Self { handle })
    }

    /// The native music handle
    pub fn raw(&self) -> M::Music {
        self.handle.get()
    }

    fn mixer(&self) -> &M {
        self.handle.releaser().system()
    }

    /// Start playing, repeating `loops` times (-1 forever)
    pub fn play(&self, loops: i32) -> i32 {
        self.mixer().play_music(self.raw(), loops)
    }

    /// Start playing with a fade-in over `ms`
    pub fn fade_in(&self, loops: i32, ms: i32) -> i32 {
        self.mixer().fade_in_music(self.raw(), loops, ms)
    }

    /// Start playing at `position` seconds with a fade-in over `ms`
    pub fn fade_in_pos(&self, loops: i32, ms: i32, position: f64) -> i32 {
        self.mixer().fade_in_music_pos(self.raw(), loops, ms, position)
    }

    /// Decoder used by this track
    pub fn music_type(&self) -> MusicType {
        self.mixer().music_type(self.raw())
    }
}

impl<M: MixerSystem> std::fmt::Debug for Music<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Music").field("handle", &self.raw()).finish()
    }
}

/// Controls for the music stream
///
/// The mixer plays at most one [`Music`] at a time; these calls act on
/// whichever track is currently playing.
pub struct MusicPlayback<M: MixerSystem> {
    mixer: Rc<M>,
}

impl<M: MixerSystem> MusicPlayback<M> {
    /// Music controls for `mixer`
    pub fn new(mixer: &Rc<M>) -> Self {
        Self { mixer: Rc::clone(mixer) }
    }

    /// Fade the music out over `ms`; returns 1 if music was playing
    pub fn fade_out(&self, ms: i32) -> i32 {
        self.mixer.fade_out_music(ms)
    }

    /// Stop the music
    pub fn halt(&self) -> i32 {
        self.mixer.halt_music()
    }

    /// Pause the music
    pub fn pause(&self) {
        self.mixer.pause_music();
    }

    /// Resume paused music
    pub fn resume(&self) {
        self.mixer.resume_music();
    }

    /// Restart the music from the beginning
    pub fn rewind(&self) {
        self.mixer.rewind_music();
    }

    /// Whether the music is paused
    pub fn is_paused(&self) -> bool {
        self.mixer.paused_music()
    }

    /// Whether music is playing (paused music still counts)
    pub fn is_playing(&self) -> bool {
        self.mixer.playing_music()
    }

    /// Set the music volume; returns the previous volume
    pub fn set_volume(&self, volume: i32) -> i32 {
        self.mixer.volume_music(volume)
    }

    /// Current music volume
    pub fn volume(&self) -> i32 {
        self.mixer.volume_music(-1)
    }

    /// Jump to `position` seconds in the playing track
    pub fn set_position(&self, position: f64) -> i32 {
        self.mixer.set_music_position(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MAX_VOLUME;
    use crate::headless::{HeadlessSystem, ResourceKind};
    use crate::HandleError;
    use approx::assert_relative_eq;

    fn load(mixer: &Rc<HeadlessSystem>, bytes: &'static [u8]) -> HandleResult<Music<HeadlessSystem>> {
        let stream = Stream::from_const_mem(mixer, bytes)?;
        Music::from_stream(&stream)
    }

    #[test]
    fn test_music_type_detection() {
        let mixer = Rc::new(HeadlessSystem::new());
        assert_eq!(load(&mixer, b"OggS....").unwrap().music_type(), MusicType::Ogg);
        assert_eq!(load(&mixer, b"fLaC....").unwrap().music_type(), MusicType::Flac);
        assert_eq!(load(&mixer, b"ID3\x04....").unwrap().music_type(), MusicType::Mp3);
        assert_eq!(load(&mixer, &[0xff, 0xfb, 0x90, 0x00]).unwrap().music_type(), MusicType::Mp3);
        assert_eq!(load(&mixer, b"RIFF....WAVE").unwrap().music_type(), MusicType::Wav);
        assert_eq!(mixer.last_free_source(), Some(0));
    }

    #[test]
    fn test_unknown_format_fails() {
        let mixer = Rc::new(HeadlessSystem::new());
        let result = load(&mixer, b"MThd midi");
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Loading music from file failed"));
        assert_eq!(mixer.live(ResourceKind::Music), 0);
    }

    #[test]
    fn test_playback_controls() {
        let mixer = Rc::new(HeadlessSystem::new());
        let playback = MusicPlayback::new(&mixer);
        let music = load(&mixer, b"OggS....").unwrap();

        assert!(!playback.is_playing());
        assert!(playback.set_position(1.0) < 0);

        assert_eq!(music.play(-1), 0);
        assert!(playback.is_playing());
        assert_eq!(playback.set_position(12.5), 0);
        assert_relative_eq!(mixer.music_position(), 12.5);

        playback.pause();
        assert!(playback.is_paused());
        assert!(playback.is_playing());
        playback.resume();
        assert!(!playback.is_paused());

        playback.rewind();
        assert_relative_eq!(mixer.music_position(), 0.0);

        assert_eq!(playback.fade_out(250), 1);
        assert_eq!(playback.halt(), 0);
        assert!(!playback.is_playing());
        assert_eq!(playback.fade_out(250), 0);
    }

    #[test]
    fn test_fade_in_at_position() {
        let mixer = Rc::new(HeadlessSystem::new());
        let playback = MusicPlayback::new(&mixer);
        let music = load(&mixer, b"fLaC....").unwrap();
        assert_eq!(music.fade_in_pos(1, 500, 30.0), 0);
        assert!(playback.is_playing());
        assert_relative_eq!(mixer.music_position(), 30.0);
        assert_eq!(music.fade_in(0, 100), 0);
        assert_relative_eq!(mixer.music_position(), 0.0);
    }

    #[test]
    fn test_music_volume() {
        let mixer = Rc::new(HeadlessSystem::new());
        let playback = MusicPlayback::new(&mixer);
        assert_eq!(playback.volume(), MAX_VOLUME);
        assert_eq!(playback.set_volume(32), MAX_VOLUME);
        assert_eq!(playback.volume(), 32);
        assert_eq!(playback.set_volume(-5), 32);
        assert_eq!(playback.volume(), 32);
    }

    #[test]
    fn test_freeing_playing_music_halts_it() {
        let mixer = Rc::new(HeadlessSystem::new());
        let playback = MusicPlayback::new(&mixer);
        let music = load(&mixer, b"OggS....").unwrap();
        music.play(0);
        drop(music);
        assert!(!playback.is_playing());
    }
}
