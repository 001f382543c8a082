//! OpenGL contexts bound to a window

use super::Window;
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::system::{log_creation, VideoSystem};
use std::rc::Rc;

/// Owned OpenGL context
///
/// The window must have been created with
/// [`WindowFlags::OPENGL`](crate::system::WindowFlags::OPENGL) and must
/// outlive the context.
pub struct GlContext<V: VideoSystem> {
    handle: SystemHandle<V, V::GlContext>,
}

impl<V: VideoSystem> GlContext<V> {
    /// Create a context for `window`
    pub fn new(window: &Window<V>) -> HandleResult<Self> {
        let video = window.system();
        let handle = acquire(
            |window| video.gl_create_context(window),
            "Making GL context failed",
            window.raw(),
            SystemRelease::new(Rc::clone(video), V::gl_delete_context),
        );
        log_creation(video.as_ref(), "GL context", handle).map(|handle| Self { handle })
    }

    /// The native context handle
    pub fn raw(&self) -> V::GlContext {
        self.handle.get()
    }

    /// Make this context current on `window`
    pub fn make_current(&self, window: &Window<V>) -> bool {
        self.handle.releaser().system().gl_make_current(window.raw(), self.raw()) >= 0
    }
}

impl<V: VideoSystem> std::fmt::Debug for GlContext<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext").field("handle", &self.raw()).finish()
    }
}
