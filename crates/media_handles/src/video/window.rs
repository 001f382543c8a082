//! Top-level windows

use super::{GlContext, Renderer};
use crate::core::config::WindowConfig;
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::system::{log_creation, RendererFlags, VideoSystem, WindowFlags, WindowPos};
use std::rc::{Rc, Weak};

/// Owned native window
///
/// A window can hand out one renderer at a time. The window only observes
/// that renderer through a [`Weak`] reference: it never keeps it alive, and
/// callers must upgrade before each use.
pub struct Window<V: VideoSystem> {
    handle: SystemHandle<V, V::Window>,
    renderer: Weak<Renderer<V>>,
}

impl<V: VideoSystem> Window<V> {
    /// Width used by [`Window::with_defaults`]
    pub const DEFAULT_WIDTH: i32 = 800;
    /// Height used by [`Window::with_defaults`]
    pub const DEFAULT_HEIGHT: i32 = 600;

    /// Create a window
    pub fn new(
        video: &Rc<V>,
        title: &str,
        width: i32,
        height: i32,
        x: WindowPos,
        y: WindowPos,
        flags: WindowFlags,
    ) -> HandleResult<Self> {
        let handle = acquire(
            |(title, x, y, width, height, flags)| video.create_window(title, x, y, width, height, flags),
            "Making window failed",
            (title, x, y, width, height, flags),
            SystemRelease::new(Rc::clone(video), V::destroy_window),
        );
        log_creation(video.as_ref(), "window", handle).map(|handle| Self {
            handle,
            renderer: Weak::new(),
        })
    }

    /// 800x600 window at an undefined position with no flags
    pub fn with_defaults(video: &Rc<V>, title: &str) -> HandleResult<Self> {
        Self::new(
            video,
            title,
            Self::DEFAULT_WIDTH,
            Self::DEFAULT_HEIGHT,
            WindowPos::Undefined,
            WindowPos::Undefined,
            WindowFlags::empty(),
        )
    }

    /// Create a window described by a configuration section
    pub fn from_config(video: &Rc<V>, config: &WindowConfig) -> HandleResult<Self> {
        Self::new(video, &config.title, config.width, config.height, config.x, config.y, config.flags)
    }

    /// The native window handle
    pub fn raw(&self) -> V::Window {
        self.handle.get()
    }

    /// The native system owning this window
    pub fn system(&self) -> &Rc<V> {
        self.handle.releaser().system_rc()
    }

    /// Client area size
    pub fn size(&self) -> (i32, i32) {
        self.system().window_size(self.raw())
    }

    /// Client area width
    pub fn width(&self) -> i32 {
        self.size().0
    }

    /// Client area height
    pub fn height(&self) -> i32 {
        self.size().1
    }

    /// Resize the client area
    pub fn set_size(&self, width: i32, height: i32) {
        self.system().set_window_size(self.raw(), width, height);
    }

    /// Numeric window id, as used by window events
    pub fn id(&self) -> u32 {
        self.system().window_id(self.raw())
    }

    /// Current window flags
    pub fn flags(&self) -> WindowFlags {
        self.system().window_flags(self.raw())
    }

    /// Change the title
    pub fn set_title(&self, title: &str) {
        self.system().set_window_title(self.raw(), title);
    }

    /// Current title
    pub fn title(&self) -> String {
        self.system().window_title(self.raw())
    }

    /// Make the window visible
    pub fn show(&self) {
        self.system().show_window(self.raw());
    }

    /// Hide the window
    pub fn hide(&self) {
        self.system().hide_window(self.raw());
    }

    /// Raise above other windows and take input focus
    pub fn raise(&self) {
        self.system().raise_window(self.raw());
    }

    /// Maximize
    pub fn maximize(&self) {
        self.system().maximize_window(self.raw());
    }

    /// Minimize
    pub fn minimize(&self) {
        self.system().minimize_window(self.raw());
    }

    /// Restore from minimized or maximized state
    pub fn restore(&self) {
        self.system().restore_window(self.raw());
    }

    /// Enter fullscreen with `flags`, or leave it with empty flags
    ///
    /// Returns whether the native call succeeded.
    pub fn set_fullscreen(&self, flags: WindowFlags) -> bool {
        self.system().set_window_fullscreen(self.raw(), flags) >= 0
    }

    /// Swap the GL buffers of an OpenGL window
    pub fn swap_window(&self) {
        self.system().gl_swap_window(self.raw());
    }

    /// Create the window's renderer
    ///
    /// The caller holds the only strong reference; the window keeps a weak
    /// one, replacing any previous observation.
    pub fn make_renderer(&mut self, flags: RendererFlags) -> HandleResult<Rc<Renderer<V>>> {
        let renderer = Rc::new(Renderer::new(self.system(), self.raw(), flags)?);
        self.renderer = Rc::downgrade(&renderer);
        Ok(renderer)
    }

    /// Whether the last renderer made by this window is still alive
    pub fn has_renderer(&self) -> bool {
        self.renderer.strong_count() > 0
    }

    /// Weak observer of the last renderer made by this window
    pub fn renderer(&self) -> Weak<Renderer<V>> {
        Weak::clone(&self.renderer)
    }

    /// Create an OpenGL context for this window
    pub fn make_gl_context(&self) -> HandleResult<GlContext<V>> {
        GlContext::new(self)
    }
}

impl<V: VideoSystem> Drop for Window<V> {
    fn drop(&mut self) {
        if self.has_renderer() {
            log::warn!("Window {:?} destroyed while its renderer is still alive", self.raw());
        }
    }
}

impl<V: VideoSystem> std::fmt::Debug for Window<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("handle", &self.raw())
            .field("has_renderer", &self.has_renderer())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSystem, ResourceKind};
    use crate::HandleError;

    fn video() -> Rc<HeadlessSystem> {
        Rc::new(HeadlessSystem::new())
    }

    #[test]
    fn test_default_window() {
        let video = video();
        let window = Window::with_defaults(&video, "defaults").unwrap();
        assert_eq!(window.size(), (800, 600));
        assert_eq!(window.title(), "defaults");
        assert!(window.flags().contains(WindowFlags::SHOWN));
    }

    #[test]
    fn test_window_state_changes() {
        let video = video();
        let window = Window::new(
            &video,
            "state",
            320,
            240,
            WindowPos::Centered,
            WindowPos::At(10),
            WindowFlags::RESIZABLE,
        )
        .unwrap();

        window.set_size(640, 480);
        assert_eq!((window.width(), window.height()), (640, 480));

        window.set_title("renamed");
        assert_eq!(window.title(), "renamed");

        window.hide();
        assert!(window.flags().contains(WindowFlags::HIDDEN));
        window.show();
        assert!(window.flags().contains(WindowFlags::SHOWN));

        window.maximize();
        assert!(window.flags().contains(WindowFlags::MAXIMIZED));
        window.minimize();
        assert!(window.flags().contains(WindowFlags::MINIMIZED));
        window.restore();
        assert!(!window.flags().intersects(WindowFlags::MINIMIZED | WindowFlags::MAXIMIZED));

        window.raise();
        assert!(window.flags().contains(WindowFlags::INPUT_FOCUS));
    }

    #[test]
    fn test_fullscreen_toggle() {
        let video = video();
        let window = Window::with_defaults(&video, "fullscreen").unwrap();
        assert!(window.set_fullscreen(WindowFlags::FULLSCREEN_DESKTOP));
        assert!(window.flags().contains(WindowFlags::FULLSCREEN));
        assert!(window.set_fullscreen(WindowFlags::empty()));
        assert!(!window.flags().contains(WindowFlags::FULLSCREEN));
        assert!(!window.set_fullscreen(WindowFlags::RESIZABLE));
    }

    #[test]
    fn test_window_ids_are_distinct() {
        let video = video();
        let windows: Vec<_> = (0..4)
            .map(|i| Window::with_defaults(&video, &format!("window {i}")).unwrap())
            .collect();
        let mut ids: Vec<u32> = windows.iter().map(Window::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(video.live(ResourceKind::Window), 4);
        drop(windows);
        assert_eq!(video.live(ResourceKind::Window), 0);
    }

    #[test]
    fn test_failed_window_creation() {
        let video = video();
        video.fail_next(ResourceKind::Window);
        let result = Window::with_defaults(&video, "doomed");
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Making window failed"));
        assert_eq!(video.stats(ResourceKind::Window).destroyed, 0);
    }

    #[test]
    fn test_renderer_observer_never_keeps_renderer_alive() {
        let video = video();
        let mut window = Window::with_defaults(&video, "observer").unwrap();
        assert!(!window.has_renderer());
        assert!(window.renderer().upgrade().is_none());

        let renderer = window.make_renderer(RendererFlags::default()).unwrap();
        assert!(window.has_renderer());
        assert!(Rc::ptr_eq(&window.renderer().upgrade().unwrap(), &renderer));

        drop(renderer);
        assert!(!window.has_renderer());
        assert!(window.renderer().upgrade().is_none());
        assert_eq!(video.live(ResourceKind::Renderer), 0);
    }

    #[test]
    fn test_window_dropped_before_renderer() {
        let video = video();
        let mut window = Window::with_defaults(&video, "early drop").unwrap();
        let renderer = window.make_renderer(RendererFlags::default()).unwrap();
        drop(window);
        assert_eq!(video.live(ResourceKind::Window), 0);
        assert_eq!(video.live(ResourceKind::Renderer), 1);
        drop(renderer);
        assert_eq!(video.live(ResourceKind::Renderer), 0);
        assert_eq!(video.invalid_releases(), 0);
    }

    #[test]
    fn test_window_from_config() {
        let video = video();
        let config = WindowConfig {
            title: "configured".to_string(),
            width: 1024,
            height: 768,
            ..WindowConfig::default()
        };
        let window = Window::from_config(&video, &config).unwrap();
        assert_eq!(window.size(), (1024, 768));
        assert_eq!(window.title(), "configured");
    }
}
