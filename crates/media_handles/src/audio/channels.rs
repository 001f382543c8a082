//! Mixing channel controls

use crate::system::MixerSystem;
use std::rc::Rc;

/// The mixer's channel table
///
/// Owns nothing native; it only forwards channel and group calls. Group
/// tags are arbitrary integers, with `-1` meaning every channel.
pub struct AudioChannels<M: MixerSystem> {
    mixer: Rc<M>,
}

impl<M: MixerSystem> AudioChannels<M> {
    /// Controls for `mixer`'s channels
    pub fn new(mixer: &Rc<M>) -> Self {
        Self { mixer: Rc::clone(mixer) }
    }

    /// Set the number of channels; returns the new count
    pub fn allocate(&self, count: i32) -> i32 {
        self.mixer.allocate_channels(count)
    }

    /// Keep the first `count` channels out of automatic selection
    pub fn reserve(&self, count: i32) -> i32 {
        self.mixer.reserve_channels(count)
    }

    /// Tag one channel; returns 1 on success
    pub fn group(&self, which: i32, tag: i32) -> i32 {
        self.mixer.group_channel(which, tag)
    }

    /// Tag the channels `from..=to`; returns how many were tagged
    pub fn group_range(&self, from: i32, to: i32, tag: i32) -> i32 {
        self.mixer.group_channels(from, to, tag)
    }

    /// First idle channel in a group, or -1
    pub fn group_available(&self, tag: i32) -> i32 {
        self.mixer.group_available(tag)
    }

    /// Number of channels in a group
    pub fn group_count(&self, tag: i32) -> i32 {
        self.mixer.group_count(tag)
    }

    /// Channel in a group that has been playing the longest, or -1
    pub fn group_oldest(&self, tag: i32) -> i32 {
        self.mixer.group_oldest(tag)
    }

    /// Channel in a group that started playing most recently, or -1
    pub fn group_newer(&self, tag: i32) -> i32 {
        self.mixer.group_newer(tag)
    }

    /// Total number of channels
    pub fn total(&self) -> i32 {
        self.group_count(-1)
    }

    /// Stop a channel, or all with -1
    pub fn halt(&self, which: i32) -> i32 {
        self.mixer.halt_channel(which)
    }

    /// Stop every channel in a group
    pub fn halt_group(&self, tag: i32) -> i32 {
        self.mixer.halt_group(tag)
    }

    /// Stop a channel after `ticks` ms; returns how many channels expire
    pub fn expire(&self, which: i32, ticks: i32) -> i32 {
        self.mixer.expire_channel(which, ticks)
    }

    /// Fade a channel out over `ms`; returns how many channels fade
    pub fn fade_out(&self, which: i32, ms: i32) -> i32 {
        self.mixer.fade_out_channel(which, ms)
    }

    /// Fade a group out over `ms`
    pub fn fade_out_group(&self, tag: i32, ms: i32) -> i32 {
        self.mixer.fade_out_group(tag, ms)
    }

    /// Whether a channel is fading in or out
    pub fn is_fading(&self, which: i32) -> bool {
        self.mixer.fading_channel(which)
    }

    /// Pause a channel, or all with -1
    pub fn pause(&self, which: i32) {
        self.mixer.pause_channel(which);
    }

    /// Resume a channel, or all with -1
    pub fn resume(&self, which: i32) {
        self.mixer.resume_channel(which);
    }

    /// Whether a channel is paused (any channel with -1)
    pub fn is_paused(&self, which: i32) -> bool {
        self.mixer.paused_channels(which) != 0
    }

    /// Whether a channel is playing (any channel with -1)
    pub fn is_playing(&self, which: i32) -> bool {
        self.mixer.playing_channels(which) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioChunk;
    use crate::headless::HeadlessSystem;

    fn setup() -> (Rc<HeadlessSystem>, AudioChannels<HeadlessSystem>, AudioChunk<HeadlessSystem>) {
        let mixer = Rc::new(HeadlessSystem::new());
        let channels = AudioChannels::new(&mixer);
        let chunk = AudioChunk::quick_load_raw(&mixer, vec![0; 32]).unwrap();
        (mixer, channels, chunk)
    }

    #[test]
    fn test_default_channel_count() {
        let (_mixer, channels, _chunk) = setup();
        assert_eq!(channels.total(), 8);
        assert_eq!(channels.allocate(4), 4);
        assert_eq!(channels.total(), 4);
    }

    #[test]
    fn test_reserved_channels_are_skipped() {
        let (_mixer, channels, chunk) = setup();
        assert_eq!(channels.reserve(2), 2);
        assert_eq!(chunk.play(-1, 0, -1), 2);
        assert_eq!(chunk.play(0, 0, -1), 0);
    }

    #[test]
    fn test_groups() {
        let (_mixer, channels, chunk) = setup();
        assert_eq!(channels.group_range(0, 2, 7), 3);
        assert_eq!(channels.group(5, 7), 1);
        assert_eq!(channels.group(42, 7), 0);
        assert_eq!(channels.group_count(7), 4);

        assert_eq!(channels.group_available(7), 0);
        assert_eq!(chunk.play(0, 0, -1), 0);
        assert_eq!(chunk.play(2, 0, -1), 2);
        assert_eq!(channels.group_available(7), 1);
        assert_eq!(channels.group_oldest(7), 0);
        assert_eq!(channels.group_newer(7), 2);

        assert_eq!(channels.halt_group(7), 0);
        assert!(!channels.is_playing(-1));
        assert_eq!(channels.group_oldest(7), -1);
    }

    #[test]
    fn test_pause_resume_and_halt() {
        let (_mixer, channels, chunk) = setup();
        let channel = chunk.play(-1, 0, -1);
        channels.pause(-1);
        assert!(channels.is_paused(channel));
        assert!(channels.is_playing(channel));
        channels.resume(channel);
        assert!(!channels.is_paused(-1));

        assert_eq!(channels.halt(channel), 0);
        assert!(!channels.is_playing(channel));
    }

    #[test]
    fn test_fades_and_expiry() {
        let (_mixer, channels, chunk) = setup();
        assert_eq!(channels.group(1, 3), 1);
        let first = chunk.play(0, 0, -1);
        let second = chunk.play(1, 0, -1);

        assert_eq!(channels.fade_out(first, 500), 1);
        assert!(channels.is_fading(first));
        assert_eq!(channels.fade_out_group(3, 500), 1);
        assert!(channels.is_fading(second));

        assert_eq!(channels.expire(-1, 1000), 2);
        assert_eq!(channels.fade_out(7, 100), 0);
    }
}
