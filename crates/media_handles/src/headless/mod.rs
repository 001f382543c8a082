//! In-memory native backend
//!
//! [`HeadlessSystem`] implements every native interface without a display,
//! audio device or GPU. Objects live in a slot map and raw handles are the
//! slot keys exported as `u64`, so a stale or forged handle is detected
//! rather than dereferenced.
//!
//! Besides acting as a backend for tools and tests, it keeps per-kind
//! creation and destruction counts plus a tally of invalid releases. That
//! makes ownership bugs (double frees, leaks) directly observable:
//!
//! ```
//! use media_handles::headless::{HeadlessSystem, ResourceKind};
//! use media_handles::video::Window;
//! use std::rc::Rc;
//!
//! let video = Rc::new(HeadlessSystem::new());
//! {
//!     let _window = Window::with_defaults(&video, "demo").unwrap();
//!     assert_eq!(video.live(ResourceKind::Window), 1);
//! }
//! assert_eq!(video.live(ResourceKind::Window), 0);
//! assert_eq!(video.invalid_releases(), 0);
//! ```

#[cfg(feature = "image")]
mod decode;
#[cfg(feature = "ttf")]
mod font;
#[cfg(feature = "gl")]
mod gl;
#[cfg(feature = "mixer")]
mod mixer;
mod resources;
mod video;

#[cfg(feature = "gl")]
pub use gl::GlTextureUpload;

use crate::handle::RawHandle;
use resources::Resource;
use slotmap::{DefaultKey, Key, KeyData, SlotMap};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Every kind of object the headless backend hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Byte stream
    Stream,
    /// Window
    Window,
    /// GL context
    GlContext,
    /// 2D renderer
    Renderer,
    /// Renderer texture
    Texture,
    /// Software surface
    Surface,
    /// TrueType font
    Font,
    /// Audio chunk
    Chunk,
    /// Music track
    Music,
    /// GL buffer object
    GlBuffer,
    /// GL shader object
    GlShader,
    /// GL program object
    GlProgram,
    /// GL vertex array object
    GlVertexArray,
    /// GL texture object
    GlTexture,
}

impl ResourceKind {
    /// All kinds, in declaration order
    pub const ALL: [Self; 14] = [
        Self::Stream,
        Self::Window,
        Self::GlContext,
        Self::Renderer,
        Self::Texture,
        Self::Surface,
        Self::Font,
        Self::Chunk,
        Self::Music,
        Self::GlBuffer,
        Self::GlShader,
        Self::GlProgram,
        Self::GlVertexArray,
        Self::GlTexture,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stream => "stream",
            Self::Window => "window",
            Self::GlContext => "GL context",
            Self::Renderer => "renderer",
            Self::Texture => "texture",
            Self::Surface => "surface",
            Self::Font => "font",
            Self::Chunk => "audio chunk",
            Self::Music => "music",
            Self::GlBuffer => "GL buffer",
            Self::GlShader => "GL shader",
            Self::GlProgram => "GL program",
            Self::GlVertexArray => "GL vertex array",
            Self::GlTexture => "GL texture",
        };
        f.write_str(name)
    }
}

/// Creation and destruction counts for one [`ResourceKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceStats {
    /// Successful creations
    pub created: usize,
    /// Successful destructions
    pub destroyed: usize,
}

impl ResourceStats {
    /// Objects created and not yet destroyed
    pub const fn live(&self) -> usize {
        self.created.saturating_sub(self.destroyed)
    }
}

/// Bookkeeping shared by every subsystem
#[derive(Default)]
struct Tracker {
    stats: HashMap<ResourceKind, ResourceStats>,
    pending_failures: HashSet<ResourceKind>,
    invalid_releases: usize,
}

/// Native backend that keeps everything in memory
///
/// Not thread-safe; share it through `Rc` like any other native system.
pub struct HeadlessSystem {
    tracker: RefCell<Tracker>,
    last_error: RefCell<String>,
    last_free_source: Cell<Option<i32>>,
    objects: RefCell<SlotMap<DefaultKey, Resource>>,
    next_window_id: Cell<u32>,
    #[cfg(feature = "mixer")]
    mixer: RefCell<mixer::MixerState>,
    #[cfg(feature = "gl")]
    gl: RefCell<gl::GlState>,
}

impl Default for HeadlessSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSystem {
    /// Create an empty system
    pub fn new() -> Self {
        Self {
            tracker: RefCell::default(),
            last_error: RefCell::default(),
            last_free_source: Cell::new(None),
            objects: RefCell::new(SlotMap::new()),
            next_window_id: Cell::new(1),
            #[cfg(feature = "mixer")]
            mixer: RefCell::default(),
            #[cfg(feature = "gl")]
            gl: RefCell::default(),
        }
    }

    /// Counts for one kind of object
    pub fn stats(&self, kind: ResourceKind) -> ResourceStats {
        self.tracker.borrow().stats.get(&kind).copied().unwrap_or_default()
    }

    /// Objects of `kind` currently alive
    pub fn live(&self, kind: ResourceKind) -> usize {
        self.stats(kind).live()
    }

    /// Destroy calls that named no live object of the expected kind
    pub fn invalid_releases(&self) -> usize {
        self.tracker.borrow().invalid_releases
    }

    /// Every kind with live objects, and how many
    pub fn leaks(&self) -> Vec<(ResourceKind, usize)> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.live(kind)))
            .filter(|&(_, live)| live > 0)
            .collect()
    }

    /// Make the next creation of `kind` fail
    pub fn fail_next(&self, kind: ResourceKind) {
        self.tracker.borrow_mut().pending_failures.insert(kind);
    }

    /// The `free_source` flag passed to the most recent stream loader
    pub fn last_free_source(&self) -> Option<i32> {
        self.last_free_source.get()
    }

    /// Record a failure message and return the sentinel
    fn fail<H: RawHandle>(&self, message: impl Into<String>) -> H {
        self.set_error(message);
        H::SENTINEL
    }

    fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        log::trace!("headless error: {message}");
        *self.last_error.borrow_mut() = message;
    }

    /// Consume a pending injected failure for `kind`
    fn injected_failure(&self, kind: ResourceKind) -> bool {
        let failed = self.tracker.borrow_mut().pending_failures.remove(&kind);
        if failed {
            self.set_error(format!("Injected {kind} creation failure"));
        }
        failed
    }

    fn record_created(&self, kind: ResourceKind) {
        self.tracker.borrow_mut().stats.entry(kind).or_default().created += 1;
    }

    fn record_destroyed(&self, kind: ResourceKind) {
        self.tracker.borrow_mut().stats.entry(kind).or_default().destroyed += 1;
    }

    fn record_invalid_release(&self, kind: ResourceKind, raw: impl fmt::Debug) {
        log::error!("Invalid release of {kind} {raw:?}");
        self.tracker.borrow_mut().invalid_releases += 1;
    }

    /// Store a new object and return its raw handle
    fn insert(&self, resource: Resource) -> u64 {
        let kind = resource.kind();
        let key = self.objects.borrow_mut().insert(resource);
        self.record_created(kind);
        key.data().as_ffi()
    }

    /// Remove an object of `kind`, counting a mismatch as an invalid release
    fn remove(&self, raw: u64, kind: ResourceKind) -> Option<Resource> {
        let key = DefaultKey::from(KeyData::from_ffi(raw));
        let mut objects = self.objects.borrow_mut();
        if objects.get(key).map(Resource::kind) == Some(kind) {
            let removed = objects.remove(key);
            drop(objects);
            self.record_destroyed(kind);
            removed
        } else {
            drop(objects);
            self.record_invalid_release(kind, raw);
            None
        }
    }

    /// Run `f` on a live object, or record an error naming `kind`
    fn with_object<T>(&self, raw: u64, kind: ResourceKind, f: impl FnOnce(&mut Resource) -> T) -> Option<T> {
        let key = DefaultKey::from(KeyData::from_ffi(raw));
        let result = self
            .objects
            .borrow_mut()
            .get_mut(key)
            .filter(|resource| resource.kind() == kind)
            .map(f);
        if result.is_none() {
            self.set_error(format!("Invalid {kind}"));
        }
        result
    }
}

impl Drop for HeadlessSystem {
    fn drop(&mut self) {
        for (kind, live) in self.leaks() {
            log::warn!("{live} {kind} object(s) never released");
        }
    }
}

impl fmt::Debug for HeadlessSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessSystem")
            .field("objects", &self.objects.borrow().len())
            .field("invalid_releases", &self.invalid_releases())
            .finish_non_exhaustive()
    }
}
