//! Channel and music bookkeeping without an audio device
//!
//! Nothing is ever mixed, so sounds play until halted: fades and expiry
//! timers are recorded but never run out.

use super::resources::{ChunkEntry, MusicEntry, Resource};
use super::{HeadlessSystem, ResourceKind};
use crate::handle::RawHandle;
use crate::system::{MixerSystem, MusicType};

/// Channels available before any allocation
pub const DEFAULT_CHANNELS: usize = 8;

/// Loudest chunk or music volume
pub const MAX_VOLUME: i32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Fade {
    #[default]
    None,
    In,
    Out,
}

#[derive(Debug, Clone)]
struct Channel {
    chunk: Option<u64>,
    tag: i32,
    paused: bool,
    fade: Fade,
    /// Start order, larger is newer
    started: u64,
    expire_ms: Option<i32>,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            chunk: None,
            tag: -1,
            paused: false,
            fade: Fade::None,
            started: 0,
            expire_ms: None,
        }
    }
}

impl Channel {
    const fn is_playing(&self) -> bool {
        self.chunk.is_some()
    }

    fn halt(&mut self) {
        let tag = self.tag;
        *self = Self { tag, ..Self::default() };
    }
}

#[derive(Debug)]
struct MusicState {
    playing: Option<u64>,
    paused: bool,
    fading: Fade,
    position: f64,
    volume: i32,
}

impl Default for MusicState {
    fn default() -> Self {
        Self {
            playing: None,
            paused: false,
            fading: Fade::None,
            position: 0.0,
            volume: MAX_VOLUME,
        }
    }
}

#[derive(Debug)]
pub(super) struct MixerState {
    channels: Vec<Channel>,
    reserved: usize,
    sequence: u64,
    music: MusicState,
}

impl Default for MixerState {
    fn default() -> Self {
        Self {
            channels: vec![Channel::default(); DEFAULT_CHANNELS],
            reserved: 0,
            sequence: 0,
            music: MusicState::default(),
        }
    }
}

impl MixerState {
    fn channel_mut(&mut self, which: i32) -> Option<&mut Channel> {
        usize::try_from(which).ok().and_then(|index| self.channels.get_mut(index))
    }

    /// Channels addressed by `which`, where -1 means all of them
    fn selected(&mut self, which: i32) -> impl Iterator<Item = &mut Channel> {
        let all = which == -1;
        let index = usize::try_from(which).ok();
        self.channels
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| all || Some(*i) == index)
            .map(|(_, channel)| channel)
    }

    fn tagged(&mut self, tag: i32) -> impl Iterator<Item = (usize, &mut Channel)> {
        self.channels
            .iter_mut()
            .enumerate()
            .filter(move |(_, channel)| tag == -1 || channel.tag == tag)
    }

    fn start(&mut self, which: i32, chunk: u64, fade: Fade, ticks: i32) -> Result<i32, &'static str> {
        let index = if which == -1 {
            self.channels
                .iter()
                .enumerate()
                .skip(self.reserved)
                .find(|(_, channel)| !channel.is_playing())
                .map(|(index, _)| index)
                .ok_or("No free channels available")?
        } else {
            usize::try_from(which)
                .ok()
                .filter(|&index| index < self.channels.len())
                .ok_or("Invalid channel")?
        };
        self.sequence += 1;
        let channel = &mut self.channels[index];
        *channel = Channel {
            chunk: Some(chunk),
            tag: channel.tag,
            paused: false,
            fade,
            started: self.sequence,
            expire_ms: (ticks >= 0).then_some(ticks),
        };
        Ok(i32::try_from(index).unwrap_or(-1))
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Identify a music format from its first bytes
fn detect_music(data: &[u8]) -> MusicType {
    match data {
        [b'O', b'g', b'g', b'S', ..] => MusicType::Ogg,
        [b'f', b'L', b'a', b'C', ..] => MusicType::Flac,
        [b'I', b'D', b'3', ..] | [0xff, 0xfb | 0xfa | 0xf3 | 0xf2, ..] => MusicType::Mp3,
        _ if is_wave(data) => MusicType::Wav,
        _ => MusicType::None,
    }
}

fn is_wave(data: &[u8]) -> bool {
    data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WAVE"
}

impl HeadlessSystem {
    /// Position of the music stream in seconds
    pub fn music_position(&self) -> f64 {
        self.mixer.borrow().music.position
    }

    fn insert_chunk(&self, samples: usize) -> u64 {
        if self.injected_failure(ResourceKind::Chunk) {
            return u64::SENTINEL;
        }
        self.insert(Resource::Chunk(ChunkEntry {
            samples,
            volume: MAX_VOLUME,
        }))
    }

    fn play(&self, which: i32, chunk: u64, fade: Fade, ticks: i32) -> i32 {
        if self.with_chunk(chunk, |_| ()).is_none() {
            return -1;
        }
        let started = self.mixer.borrow_mut().start(which, chunk, fade, ticks);
        started.unwrap_or_else(|message| {
            self.set_error(message);
            -1
        })
    }

    fn start_music(&self, music: u64, fading: Fade, position: f64) -> i32 {
        if self.with_music(music, |_| ()).is_none() {
            return -1;
        }
        let mut mixer = self.mixer.borrow_mut();
        mixer.music = MusicState {
            playing: Some(music),
            fading,
            position,
            volume: mixer.music.volume,
            paused: false,
        };
        0
    }
}

impl MixerSystem for HeadlessSystem {
    type Chunk = u64;
    type Music = u64;

    fn load_wav(&self, stream: u64, free_source: i32) -> u64 {
        let Some(data) = self.read_source(stream, free_source) else {
            return u64::SENTINEL;
        };
        if !is_wave(&data) {
            return self.fail("Unrecognized audio format");
        }
        self.insert_chunk(data.len() - 12)
    }

    fn quick_load_wav(&self, mem: Vec<u8>) -> u64 {
        if !mem.starts_with(b"RIFF") {
            return self.fail("Not a RIFF file");
        }
        self.insert_chunk(mem.len())
    }

    fn quick_load_raw(&self, mem: Vec<u8>) -> u64 {
        if mem.is_empty() {
            return self.fail("No sample data");
        }
        self.insert_chunk(mem.len())
    }

    fn free_chunk(&self, chunk: u64) {
        if let Some(Resource::Chunk(entry)) = self.remove(chunk, ResourceKind::Chunk) {
            log::trace!("Freed chunk of {} bytes", entry.samples);
            for channel in &mut self.mixer.borrow_mut().channels {
                if channel.chunk == Some(chunk) {
                    channel.halt();
                }
            }
        }
    }

    fn play_channel_timed(&self, channel: i32, chunk: u64, _loops: i32, ticks: i32) -> i32 {
        self.play(channel, chunk, Fade::None, ticks)
    }

    fn fade_in_channel_timed(&self, channel: i32, chunk: u64, _loops: i32, _ms: i32, ticks: i32) -> i32 {
        self.play(channel, chunk, Fade::In, ticks)
    }

    fn volume_chunk(&self, chunk: u64, volume: i32) -> i32 {
        self.with_chunk(chunk, |entry| {
            let previous = entry.volume;
            if volume >= 0 {
                entry.volume = volume.min(MAX_VOLUME);
            }
            previous
        })
        .unwrap_or(-1)
    }

    fn allocate_channels(&self, count: i32) -> i32 {
        let mut mixer = self.mixer.borrow_mut();
        if let Ok(count) = usize::try_from(count) {
            mixer.channels.resize(count, Channel::default());
            mixer.reserved = mixer.reserved.min(count);
        }
        self::count(mixer.channels.len())
    }

    fn reserve_channels(&self, count: i32) -> i32 {
        let mut mixer = self.mixer.borrow_mut();
        let reserved = usize::try_from(count).unwrap_or(0).min(mixer.channels.len());
        mixer.reserved = reserved;
        self::count(reserved)
    }

    fn group_channel(&self, which: i32, tag: i32) -> i32 {
        self.mixer
            .borrow_mut()
            .channel_mut(which)
            .map_or(0, |channel| {
                channel.tag = tag;
                1
            })
    }

    fn group_channels(&self, from: i32, to: i32, tag: i32) -> i32 {
        (from..=to).map(|which| self.group_channel(which, tag)).sum()
    }

    fn group_available(&self, tag: i32) -> i32 {
        self.mixer
            .borrow_mut()
            .tagged(tag)
            .find(|(_, channel)| !channel.is_playing())
            .map_or(-1, |(index, _)| count(index))
    }

    fn group_count(&self, tag: i32) -> i32 {
        count(self.mixer.borrow_mut().tagged(tag).count())
    }

    fn group_oldest(&self, tag: i32) -> i32 {
        self.mixer
            .borrow_mut()
            .tagged(tag)
            .filter(|(_, channel)| channel.is_playing())
            .min_by_key(|(_, channel)| channel.started)
            .map_or(-1, |(index, _)| count(index))
    }

    fn group_newer(&self, tag: i32) -> i32 {
        self.mixer
            .borrow_mut()
            .tagged(tag)
            .filter(|(_, channel)| channel.is_playing())
            .max_by_key(|(_, channel)| channel.started)
            .map_or(-1, |(index, _)| count(index))
    }

    fn halt_channel(&self, which: i32) -> i32 {
        self.mixer.borrow_mut().selected(which).for_each(Channel::halt);
        0
    }

    fn halt_group(&self, tag: i32) -> i32 {
        self.mixer.borrow_mut().tagged(tag).for_each(|(_, channel)| channel.halt());
        0
    }

    fn expire_channel(&self, which: i32, ticks: i32) -> i32 {
        let expire = (ticks > 0).then_some(ticks);
        let mut expired = 0;
        for channel in self.mixer.borrow_mut().selected(which).filter(|channel| channel.is_playing()) {
            channel.expire_ms = expire;
            expired += 1;
        }
        count(expired)
    }

    fn fade_out_channel(&self, which: i32, _ms: i32) -> i32 {
        let mut faded = 0;
        for channel in self
            .mixer
            .borrow_mut()
            .selected(which)
            .filter(|channel| channel.is_playing() && channel.fade != Fade::Out)
        {
            channel.fade = Fade::Out;
            faded += 1;
        }
        count(faded)
    }

    fn fade_out_group(&self, tag: i32, _ms: i32) -> i32 {
        let mut faded = 0;
        for (_, channel) in self
            .mixer
            .borrow_mut()
            .tagged(tag)
            .filter(|(_, channel)| channel.is_playing() && channel.fade != Fade::Out)
        {
            channel.fade = Fade::Out;
            faded += 1;
        }
        count(faded)
    }

    fn fading_channel(&self, which: i32) -> bool {
        self.mixer
            .borrow_mut()
            .channel_mut(which)
            .is_some_and(|channel| channel.is_playing() && channel.fade != Fade::None)
    }

    fn pause_channel(&self, which: i32) {
        for channel in self.mixer.borrow_mut().selected(which).filter(|channel| channel.is_playing()) {
            channel.paused = true;
        }
    }

    fn resume_channel(&self, which: i32) {
        for channel in self.mixer.borrow_mut().selected(which) {
            channel.paused = false;
        }
    }

    fn paused_channels(&self, which: i32) -> i32 {
        let paused = self
            .mixer
            .borrow_mut()
            .selected(which)
            .filter(|channel| channel.is_playing() && channel.paused)
            .count();
        count(paused)
    }

    fn playing_channels(&self, which: i32) -> i32 {
        let playing = self
            .mixer
            .borrow_mut()
            .selected(which)
            .filter(|channel| channel.is_playing())
            .count();
        count(playing)
    }

    fn load_music(&self, stream: u64, free_source: i32) -> u64 {
        let Some(data) = self.read_source(stream, free_source) else {
            return u64::SENTINEL;
        };
        let kind = detect_music(&data);
        if kind == MusicType::None {
            return self.fail("Unrecognized audio format");
        }
        if self.injected_failure(ResourceKind::Music) {
            return u64::SENTINEL;
        }
        self.insert(Resource::Music(MusicEntry { kind }))
    }

    fn free_music(&self, music: u64) {
        if self.remove(music, ResourceKind::Music).is_some() {
            let mut mixer = self.mixer.borrow_mut();
            if mixer.music.playing == Some(music) {
                let volume = mixer.music.volume;
                mixer.music = MusicState { volume, ..MusicState::default() };
            }
        }
    }

    fn play_music(&self, music: u64, _loops: i32) -> i32 {
        self.start_music(music, Fade::None, 0.0)
    }

    fn fade_in_music(&self, music: u64, _loops: i32, _ms: i32) -> i32 {
        self.start_music(music, Fade::In, 0.0)
    }

    fn fade_in_music_pos(&self, music: u64, _loops: i32, _ms: i32, position: f64) -> i32 {
        self.start_music(music, Fade::In, position)
    }

    fn music_type(&self, music: u64) -> MusicType {
        self.with_music(music, |entry| entry.kind).unwrap_or(MusicType::None)
    }

    fn fade_out_music(&self, _ms: i32) -> i32 {
        let mut mixer = self.mixer.borrow_mut();
        if mixer.music.playing.is_none() {
            return 0;
        }
        mixer.music.fading = Fade::Out;
        1
    }

    fn halt_music(&self) -> i32 {
        let mut mixer = self.mixer.borrow_mut();
        let volume = mixer.music.volume;
        mixer.music = MusicState { volume, ..MusicState::default() };
        0
    }

    fn pause_music(&self) {
        let mut mixer = self.mixer.borrow_mut();
        mixer.music.paused = mixer.music.playing.is_some();
    }

    fn resume_music(&self) {
        self.mixer.borrow_mut().music.paused = false;
    }

    fn rewind_music(&self) {
        self.mixer.borrow_mut().music.position = 0.0;
    }

    fn paused_music(&self) -> bool {
        let mixer = self.mixer.borrow();
        mixer.music.playing.is_some() && mixer.music.paused
    }

    fn playing_music(&self) -> bool {
        self.mixer.borrow().music.playing.is_some()
    }

    fn volume_music(&self, volume: i32) -> i32 {
        let mut mixer = self.mixer.borrow_mut();
        let previous = mixer.music.volume;
        if volume >= 0 {
            mixer.music.volume = volume.min(MAX_VOLUME);
        }
        previous
    }

    fn set_music_position(&self, position: f64) -> i32 {
        let mut mixer = self.mixer.borrow_mut();
        if mixer.music.playing.is_none() {
            drop(mixer);
            self.set_error("Music isn't playing");
            return -1;
        }
        mixer.music.position = position;
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_detection() {
        assert_eq!(detect_music(b"OggS"), MusicType::Ogg);
        assert_eq!(detect_music(&[0xff, 0xf3, 0x00]), MusicType::Mp3);
        assert_eq!(detect_music(b"RIFF\0\0\0\0WAVE"), MusicType::Wav);
        assert_eq!(detect_music(b"RIFF\0\0\0\0AVI "), MusicType::None);
        assert_eq!(detect_music(b""), MusicType::None);
    }

    #[test]
    fn test_shrinking_channels_drops_sounds() {
        let mixer = HeadlessSystem::new();
        let chunk = mixer.quick_load_raw(vec![0; 8]);
        assert_eq!(mixer.play_channel_timed(7, chunk, 0, -1), 7);
        assert_eq!(mixer.allocate_channels(4), 4);
        assert_eq!(mixer.playing_channels(-1), 0);
        assert_eq!(mixer.play_channel_timed(7, chunk, 0, -1), -1);
        assert_eq!(mixer.allocate_channels(-1), 4);
        mixer.free_chunk(chunk);
    }

    #[test]
    fn test_expire_records_timer() {
        let mixer = HeadlessSystem::new();
        let chunk = mixer.quick_load_raw(vec![0; 8]);
        let channel = mixer.play_channel_timed(-1, chunk, 0, 250);
        assert_eq!(mixer.mixer.borrow().channels[0].expire_ms, Some(250));
        assert_eq!(mixer.expire_channel(channel, 0), 1);
        assert_eq!(mixer.mixer.borrow().channels[0].expire_ms, None);
        mixer.free_chunk(chunk);
    }

    #[test]
    fn test_halting_music_keeps_volume() {
        let mixer = HeadlessSystem::new();
        mixer.volume_music(20);
        mixer.halt_music();
        assert_eq!(mixer.volume_music(-1), 20);
    }
}
