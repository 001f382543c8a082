//! Buffer objects

use super::{log_gl_creation, Bindable, GlApi};
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use bytemuck::Pod;
use std::rc::Rc;

/// Owned buffer object name
pub struct Buffer<G: GlApi> {
    handle: SystemHandle<G, u32>,
}

impl<G: GlApi> Buffer<G> {
    /// Generate a buffer name
    pub fn new(gl: &Rc<G>) -> HandleResult<Self> {
        let handle = acquire(
            |()| gl.gen_buffer(),
            "Making GL buffer failed",
            (),
            SystemRelease::new(Rc::clone(gl), G::delete_buffer),
        );
        log_gl_creation(gl.as_ref(), "buffer", handle).map(|handle| Self { handle })
    }

    /// The buffer name
    pub fn raw(&self) -> u32 {
        self.handle.get()
    }

    /// Upload `data` to the buffer bound to `target`
    pub fn data<T: Pod>(gl: &G, target: u32, data: &[T], usage: u32) {
        gl.buffer_data(target, bytemuck::cast_slice(data), usage);
    }

    /// Query a parameter of the buffer bound to `target`
    pub fn parameter_i(gl: &G, target: u32, pname: u32) -> i32 {
        gl.get_buffer_parameter_iv(target, pname)
    }

    /// 64-bit variant of [`parameter_i`](Self::parameter_i)
    pub fn parameter_i64(gl: &G, target: u32, pname: u32) -> i64 {
        gl.get_buffer_parameter_i64v(target, pname)
    }
}

impl<G: GlApi> Bindable for Buffer<G> {
    fn bind(&self, target: u32) {
        self.handle.releaser().system().bind_buffer(target, self.raw());
    }

    fn unbind(&self, target: u32) {
        self.handle.releaser().system().bind_buffer(target, 0);
    }
}

impl<G: GlApi> std::fmt::Debug for Buffer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("name", &self.raw()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::consts::{ARRAY_BUFFER, BUFFER_SIZE, BUFFER_USAGE, INVALID_OPERATION, NO_ERROR, STATIC_DRAW};
    use crate::headless::{HeadlessSystem, ResourceKind};

    #[test]
    fn test_names_are_distinct_and_deleted() {
        let gl = Rc::new(HeadlessSystem::new());
        let a = Buffer::new(&gl).unwrap();
        let b = Buffer::new(&gl).unwrap();
        assert_ne!(a.raw(), b.raw());
        assert_ne!(a.raw(), 0);
        drop(a);
        drop(b);
        let stats = gl.stats(ResourceKind::GlBuffer);
        assert_eq!((stats.created, stats.destroyed), (2, 2));
    }

    #[test]
    fn test_data_upload_to_bound_buffer() {
        let gl = Rc::new(HeadlessSystem::new());
        let buffer = Buffer::new(&gl).unwrap();
        buffer.bind(ARRAY_BUFFER);

        let vertices: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];
        Buffer::data(gl.as_ref(), ARRAY_BUFFER, &vertices, STATIC_DRAW);

        assert_eq!(Buffer::parameter_i(gl.as_ref(), ARRAY_BUFFER, BUFFER_SIZE), 24);
        assert_eq!(Buffer::parameter_i64(gl.as_ref(), ARRAY_BUFFER, BUFFER_SIZE), 24);
        assert_eq!(
            Buffer::parameter_i(gl.as_ref(), ARRAY_BUFFER, BUFFER_USAGE),
            i32::try_from(STATIC_DRAW).unwrap()
        );
        assert_eq!(gl.get_error(), NO_ERROR);
    }

    #[test]
    fn test_data_without_bound_buffer_is_an_error() {
        let gl = Rc::new(HeadlessSystem::new());
        let buffer = Buffer::new(&gl).unwrap();
        buffer.bind(ARRAY_BUFFER);
        buffer.unbind(ARRAY_BUFFER);
        Buffer::data(gl.as_ref(), ARRAY_BUFFER, &[1u8, 2, 3], STATIC_DRAW);
        assert_eq!(gl.get_error(), INVALID_OPERATION);
        assert_eq!(gl.get_error(), NO_ERROR);
    }
}
