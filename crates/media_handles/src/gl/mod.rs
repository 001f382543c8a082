//! Raw OpenGL object wrappers
//!
//! GL objects are plain `u32` names with `0` as the invalid value. Each
//! wrapper owns exactly one name and deletes it on drop. Calls are not
//! error checked; query [`GlApi::get_error`] or install a debug callback.
//!
//! A GL context must be current (see
//! [`GlContext::make_current`](crate::video::GlContext::make_current)) for
//! any of these calls to reach a driver.

mod buffer;
mod program;
mod shader;
mod texture;
mod vertex_array;

pub use buffer::Buffer;
pub use program::Program;
pub use shader::Shader;
pub use texture::{gl_format, GlTexture};
pub use vertex_array::VertexArray;

use crate::error::HandleResult;

/// Enumerants used by the wrappers and their callers
pub mod consts {
    #![allow(missing_docs)]

    pub const FALSE: i32 = 0;
    pub const TRUE: i32 = 1;

    pub const NO_ERROR: u32 = 0;
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;

    pub const BYTE: u32 = 0x1400;
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const INT: u32 = 0x1404;
    pub const UNSIGNED_INT: u32 = 0x1405;
    pub const FLOAT: u32 = 0x1406;

    pub const ARRAY_BUFFER: u32 = 0x8892;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
    pub const STREAM_DRAW: u32 = 0x88E0;
    pub const STATIC_DRAW: u32 = 0x88E4;
    pub const DYNAMIC_DRAW: u32 = 0x88E8;
    pub const BUFFER_SIZE: u32 = 0x8764;
    pub const BUFFER_USAGE: u32 = 0x8765;

    pub const FRAGMENT_SHADER: u32 = 0x8B30;
    pub const VERTEX_SHADER: u32 = 0x8B31;
    pub const SHADER_TYPE: u32 = 0x8B4F;
    pub const DELETE_STATUS: u32 = 0x8B80;
    pub const COMPILE_STATUS: u32 = 0x8B81;
    pub const LINK_STATUS: u32 = 0x8B82;
    pub const INFO_LOG_LENGTH: u32 = 0x8B84;
    pub const ATTACHED_SHADERS: u32 = 0x8B85;
    pub const SHADER_SOURCE_LENGTH: u32 = 0x8B88;

    pub const VERTEX_ATTRIB_ARRAY_ENABLED: u32 = 0x8622;
    pub const VERTEX_ATTRIB_ARRAY_SIZE: u32 = 0x8623;
    pub const VERTEX_ATTRIB_ARRAY_STRIDE: u32 = 0x8624;
    pub const VERTEX_ATTRIB_ARRAY_TYPE: u32 = 0x8625;
    pub const VERTEX_ATTRIB_ARRAY_NORMALIZED: u32 = 0x886A;
    pub const VERTEX_ATTRIB_ARRAY_INTEGER: u32 = 0x88FD;

    pub const TEXTURE_2D: u32 = 0x0DE1;
    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    pub const NEAREST: i32 = 0x2600;
    pub const LINEAR: i32 = 0x2601;
    pub const CLAMP_TO_EDGE: i32 = 0x812F;

    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const BGR: u32 = 0x80E0;
    pub const BGRA: u32 = 0x80E1;
    pub const RGBA8: i32 = 0x8058;
}

/// The OpenGL entry points the wrappers forward to
///
/// Object names are `u32`; creation functions return `0` on failure.
pub trait GlApi {
    /// Oldest recorded error flag, cleared by the call
    fn get_error(&self) -> u32;

    /// `glGenBuffers` for a single name
    fn gen_buffer(&self) -> u32;
    /// `glDeleteBuffers` for a single name
    fn delete_buffer(&self, name: u32);
    /// `glBindBuffer`
    fn bind_buffer(&self, target: u32, name: u32);
    /// `glBufferData`
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    /// `glGetBufferParameteriv`
    fn get_buffer_parameter_iv(&self, target: u32, pname: u32) -> i32;
    /// `glGetBufferParameteri64v`
    fn get_buffer_parameter_i64v(&self, target: u32, pname: u32) -> i64;

    /// `glCreateShader`
    fn create_shader(&self, kind: u32) -> u32;
    /// `glIsShader`
    fn is_shader(&self, name: u32) -> bool;
    /// `glDeleteShader`
    fn delete_shader(&self, name: u32);
    /// `glShaderSource`; the strings are concatenated
    fn shader_source(&self, name: u32, sources: &[&str]);
    /// `glCompileShader`
    fn compile_shader(&self, name: u32);
    /// `glGetShaderSource`
    fn get_shader_source(&self, name: u32) -> String;
    /// `glGetShaderiv`
    fn get_shader_iv(&self, name: u32, pname: u32) -> i32;
    /// `glGetShaderInfoLog`
    fn get_shader_info_log(&self, name: u32) -> String;

    /// `glCreateProgram`
    fn create_program(&self) -> u32;
    /// `glIsProgram`
    fn is_program(&self, name: u32) -> bool;
    /// `glDeleteProgram`
    fn delete_program(&self, name: u32);
    /// `glAttachShader`
    fn attach_shader(&self, program: u32, shader: u32);
    /// `glDetachShader`
    fn detach_shader(&self, program: u32, shader: u32);
    /// `glLinkProgram`
    fn link_program(&self, program: u32);
    /// `glUseProgram`; `0` unbinds
    fn use_program(&self, program: u32);
    /// `glGetProgramiv`
    fn get_program_iv(&self, program: u32, pname: u32) -> i32;
    /// `glGetProgramInfoLog`
    fn get_program_info_log(&self, program: u32) -> String;

    /// `glGenVertexArrays` for a single name
    fn gen_vertex_array(&self) -> u32;
    /// `glDeleteVertexArrays` for a single name
    fn delete_vertex_array(&self, name: u32);
    /// `glBindVertexArray`; `0` unbinds
    fn bind_vertex_array(&self, name: u32);
    /// `glEnableVertexAttribArray` on the bound vertex array
    fn enable_vertex_attrib_array(&self, index: u32);
    /// `glDisableVertexAttribArray` on the bound vertex array
    fn disable_vertex_attrib_array(&self, index: u32);
    /// `glVertexAttribPointer` with a byte offset into the bound buffer
    fn vertex_attrib_pointer(&self, index: u32, size: i32, kind: u32, normalized: bool, stride: i32, offset: usize);
    /// `glVertexAttribIPointer` with a byte offset into the bound buffer
    fn vertex_attrib_i_pointer(&self, index: u32, size: i32, kind: u32, stride: i32, offset: usize);
    /// `glGetVertexAttribiv`
    fn get_vertex_attrib_iv(&self, index: u32, pname: u32) -> i32;
    /// `glGetVertexAttribfv`
    fn get_vertex_attrib_fv(&self, index: u32, pname: u32) -> f32;

    /// `glGenTextures` for a single name
    fn gen_texture(&self) -> u32;
    /// `glDeleteTextures` for a single name
    fn delete_texture(&self, name: u32);
    /// `glBindTexture`; `0` unbinds
    fn bind_texture(&self, target: u32, name: u32);
    /// `glTexImage2D` with no border
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        kind: u32,
        pixels: Option<&[u8]>,
    );
    /// `glTexParameteri`
    fn tex_parameter_i(&self, target: u32, pname: u32, param: i32);
}

/// GL objects that attach to a binding point
pub trait Bindable {
    /// Bind to `target`
    fn bind(&self, target: u32);
    /// Bind name `0` to `target`
    fn unbind(&self, target: u32);
}

fn log_gl_creation<G: GlApi + ?Sized, T>(gl: &G, what: &str, result: HandleResult<T>) -> HandleResult<T> {
    match &result {
        Ok(_) => log::debug!("Created GL {what}"),
        Err(err) => log::warn!("{err}: GL error {:#06x}", gl.get_error()),
    }
    result
}
