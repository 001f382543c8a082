//! Vertex array objects

use super::{log_gl_creation, Bindable, GlApi};
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use std::rc::Rc;

/// Owned vertex array object
///
/// Attribute calls act on whichever vertex array is bound, so bind this one
/// first.
pub struct VertexArray<G: GlApi> {
    handle: SystemHandle<G, u32>,
}

impl<G: GlApi> VertexArray<G> {
    /// Generate a vertex array name
    pub fn new(gl: &Rc<G>) -> HandleResult<Self> {
        let handle = acquire(
            |()| gl.gen_vertex_array(),
            "Making GL vertex array failed",
            (),
            SystemRelease::new(Rc::clone(gl), G::delete_vertex_array),
        );
        log_gl_creation(gl.as_ref(), "vertex array", handle).map(|handle| Self { handle })
    }

    /// The vertex array name
    pub fn raw(&self) -> u32 {
        self.handle.get()
    }

    fn gl(&self) -> &G {
        self.handle.releaser().system()
    }

    /// Enable attribute `index` of the bound vertex array
    pub fn enable_attrib(&self, index: u32) {
        self.gl().enable_vertex_attrib_array(index);
    }

    /// Disable attribute `index` of the bound vertex array
    pub fn disable_attrib(&self, index: u32) {
        self.gl().disable_vertex_attrib_array(index);
    }

    /// Describe a float attribute sourced from the bound array buffer
    pub fn attrib_pointer(gl: &G, index: u32, size: i32, kind: u32, normalized: bool, stride: i32, offset: usize) {
        gl.vertex_attrib_pointer(index, size, kind, normalized, stride, offset);
    }

    /// Describe an integer attribute sourced from the bound array buffer
    pub fn attrib_i_pointer(gl: &G, index: u32, size: i32, kind: u32, stride: i32, offset: usize) {
        gl.vertex_attrib_i_pointer(index, size, kind, stride, offset);
    }

    /// Query attribute `index` of the bound vertex array
    pub fn get_iv(&self, index: u32, pname: u32) -> i32 {
        self.gl().get_vertex_attrib_iv(index, pname)
    }

    /// Float variant of [`get_iv`](Self::get_iv)
    pub fn get_fv(&self, index: u32, pname: u32) -> f32 {
        self.gl().get_vertex_attrib_fv(index, pname)
    }
}

/// Vertex arrays have a single binding point; `target` is ignored
impl<G: GlApi> Bindable for VertexArray<G> {
    fn bind(&self, _target: u32) {
        self.gl().bind_vertex_array(self.raw());
    }

    fn unbind(&self, _target: u32) {
        self.gl().bind_vertex_array(0);
    }
}

impl<G: GlApi> std::fmt::Debug for VertexArray<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexArray").field("name", &self.raw()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::consts::{
        ARRAY_BUFFER, FLOAT, INT, STATIC_DRAW, TRUE, VERTEX_ATTRIB_ARRAY_ENABLED, VERTEX_ATTRIB_ARRAY_INTEGER,
        VERTEX_ATTRIB_ARRAY_SIZE, VERTEX_ATTRIB_ARRAY_STRIDE, VERTEX_ATTRIB_ARRAY_TYPE,
    };
    use crate::gl::Buffer;
    use crate::headless::HeadlessSystem;
    use approx::assert_relative_eq;

    #[test]
    fn test_attribute_state_follows_bound_array() {
        let gl = Rc::new(HeadlessSystem::new());
        let vao = VertexArray::new(&gl).unwrap();
        let vbo = Buffer::new(&gl).unwrap();

        vao.bind(0);
        vbo.bind(ARRAY_BUFFER);
        Buffer::data(gl.as_ref(), ARRAY_BUFFER, &[0.0f32; 9], STATIC_DRAW);

        vao.enable_attrib(0);
        VertexArray::attrib_pointer(gl.as_ref(), 0, 3, FLOAT, false, 12, 0);
        assert_eq!(vao.get_iv(0, VERTEX_ATTRIB_ARRAY_ENABLED), TRUE);
        assert_eq!(vao.get_iv(0, VERTEX_ATTRIB_ARRAY_SIZE), 3);
        assert_eq!(vao.get_iv(0, VERTEX_ATTRIB_ARRAY_STRIDE), 12);
        assert_relative_eq!(vao.get_fv(0, VERTEX_ATTRIB_ARRAY_SIZE), 3.0);

        VertexArray::attrib_i_pointer(gl.as_ref(), 1, 1, INT, 0, 0);
        assert_eq!(vao.get_iv(1, VERTEX_ATTRIB_ARRAY_INTEGER), TRUE);
        assert_eq!(vao.get_iv(1, VERTEX_ATTRIB_ARRAY_TYPE), i32::try_from(INT).unwrap());

        vao.disable_attrib(0);
        assert_eq!(vao.get_iv(0, VERTEX_ATTRIB_ARRAY_ENABLED), 0);
    }

    #[test]
    fn test_state_is_per_vertex_array() {
        let gl = Rc::new(HeadlessSystem::new());
        let first = VertexArray::new(&gl).unwrap();
        let second = VertexArray::new(&gl).unwrap();

        first.bind(0);
        first.enable_attrib(2);
        second.bind(0);
        assert_eq!(second.get_iv(2, VERTEX_ATTRIB_ARRAY_ENABLED), 0);
        first.bind(0);
        assert_eq!(first.get_iv(2, VERTEX_ATTRIB_ARRAY_ENABLED), TRUE);
        first.unbind(0);
    }
}
