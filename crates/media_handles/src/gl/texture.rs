//! Texture objects

use super::consts::{BGR, BGRA, RGB, RGBA};
use super::{log_gl_creation, Bindable, GlApi};
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::system::{PixelFormat, VideoSystem};
use crate::video::Surface;
use std::rc::Rc;

/// Owned texture object name
///
/// Unrelated to [`crate::video::Texture`], which belongs to a 2D renderer.
pub struct GlTexture<G: GlApi> {
    handle: SystemHandle<G, u32>,
}

/// The client pixel format matching a surface layout
///
/// Formats without a direct GL counterpart map to `RGBA`.
pub const fn gl_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Bgra8888 => BGRA,
        PixelFormat::Rgb888 | PixelFormat::Rgb24 => RGB,
        PixelFormat::Bgr888 | PixelFormat::Bgr24 => BGR,
        PixelFormat::Rgba8888 | PixelFormat::Argb8888 | PixelFormat::Other(_) => RGBA,
    }
}

impl<G: GlApi> GlTexture<G> {
    /// Generate a texture name
    pub fn new(gl: &Rc<G>) -> HandleResult<Self> {
        let handle = acquire(
            |()| gl.gen_texture(),
            "Making GL texture failed",
            (),
            SystemRelease::new(Rc::clone(gl), G::delete_texture),
        );
        log_gl_creation(gl.as_ref(), "texture", handle).map(|handle| Self { handle })
    }

    /// The texture name
    pub fn raw(&self) -> u32 {
        self.handle.get()
    }

    /// Specify the image of the texture bound to `target`
    #[allow(clippy::too_many_arguments)]
    pub fn image_2d(
        gl: &G,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        kind: u32,
        pixels: Option<&[u8]>,
    ) {
        gl.tex_image_2d(target, level, internal_format, width, height, format, kind, pixels);
    }

    /// Upload a surface to the texture bound to `target`
    ///
    /// Padded rows are packed tightly before upload. Returns `false` if the
    /// surface exposes no pixels.
    pub fn image_2d_from_surface<V: VideoSystem>(
        gl: &G,
        target: u32,
        surface: &Surface<V>,
        internal_format: i32,
        kind: u32,
        level: i32,
    ) -> bool {
        let Some(info) = surface.info() else {
            return false;
        };
        let row = usize::try_from(info.width).unwrap_or(0) * info.format.bytes_per_pixel();
        let pitch = usize::try_from(info.pitch).unwrap_or(0);
        surface
            .with_pixels(|pixels| {
                let format = gl_format(info.format);
                if pitch == row {
                    gl.tex_image_2d(target, level, internal_format, info.width, info.height, format, kind, Some(pixels));
                } else {
                    let packed: Vec<u8> = pixels
                        .chunks(pitch.max(1))
                        .flat_map(|line| &line[..row.min(line.len())])
                        .copied()
                        .collect();
                    gl.tex_image_2d(target, level, internal_format, info.width, info.height, format, kind, Some(&packed));
                }
            })
            .is_some()
    }

    /// `glTexParameteri` on the texture bound to `target`
    pub fn set_parameter_i(gl: &G, target: u32, pname: u32, param: i32) {
        gl.tex_parameter_i(target, pname, param);
    }
}

impl<G: GlApi> Bindable for GlTexture<G> {
    fn bind(&self, target: u32) {
        self.handle.releaser().system().bind_texture(target, self.raw());
    }

    fn unbind(&self, target: u32) {
        self.handle.releaser().system().bind_texture(target, 0);
    }
}

impl<G: GlApi> std::fmt::Debug for GlTexture<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlTexture").field("name", &self.raw()).finish()
    }
}
