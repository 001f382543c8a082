//! Hardware-accelerated 2D renderer

use super::{Surface, Texture};
use crate::error::HandleResult;
use crate::handle::{acquire, RawHandle, SystemHandle, SystemRelease};
use crate::system::{
    log_creation, BlendMode, Color, Flip, PixelFormat, Point, Rect, RendererFlags, RendererInfo, TextureAccess,
    VideoSystem,
};
use std::rc::Rc;

#[cfg(feature = "image")]
use crate::stream::Stream;
#[cfg(feature = "image")]
use crate::system::ImageSystem;

#[cfg(feature = "ttf")]
use crate::font::TrueTypeFont;
#[cfg(feature = "ttf")]
use crate::system::FontSystem;

/// Owned native renderer
///
/// Made by [`Window::make_renderer`](super::Window::make_renderer). Drawing
/// calls return the native status: `0` on success, negative on failure.
pub struct Renderer<V: VideoSystem> {
    handle: SystemHandle<V, V::Renderer>,
}

impl<V: VideoSystem> Renderer<V> {
    pub(crate) fn new(video: &Rc<V>, window: V::Window, flags: RendererFlags) -> HandleResult<Self> {
        let handle = acquire(
            |(window, index, flags)| video.create_renderer(window, index, flags),
            "Making renderer failed",
            (window, -1, flags),
            SystemRelease::new(Rc::clone(video), V::destroy_renderer),
        );
        log_creation(video.as_ref(), "renderer", handle).map(|handle| Self { handle })
    }

    /// The native renderer handle
    pub fn raw(&self) -> V::Renderer {
        self.handle.get()
    }

    /// The native system owning this renderer
    pub fn system(&self) -> &Rc<V> {
        self.handle.releaser().system_rc()
    }

    /// Driver name and capabilities
    pub fn info(&self) -> Option<RendererInfo> {
        self.system().renderer_info(self.raw())
    }

    /// Show everything drawn since the last present
    pub fn present(&self) {
        self.system().render_present(self.raw());
    }

    /// Fill the current target with the draw color
    pub fn clear(&self) -> i32 {
        self.system().render_clear(self.raw())
    }

    /// Color used by clear and primitive drawing
    pub fn set_draw_color(&self, color: Color) -> i32 {
        self.system().set_render_draw_color(self.raw(), color)
    }

    /// Current draw color
    pub fn draw_color(&self) -> Option<Color> {
        self.system().render_draw_color(self.raw())
    }

    /// Blend mode used by primitive drawing
    pub fn set_draw_blend_mode(&self, mode: BlendMode) -> i32 {
        self.system().set_render_draw_blend_mode(self.raw(), mode)
    }

    /// Current draw blend mode
    pub fn draw_blend_mode(&self) -> Option<BlendMode> {
        self.system().render_draw_blend_mode(self.raw())
    }

    /// Copy (part of) a texture to (part of) the target
    pub fn render(&self, texture: &Texture<V>, src: Option<Rect>, dst: Option<Rect>) -> i32 {
        self.system().render_copy(self.raw(), texture.raw(), src, dst)
    }

    /// Copy a whole texture with its top-left corner at `(x, y)`
    pub fn render_at(&self, texture: &Texture<V>, x: i32, y: i32) -> i32 {
        let dst = Rect::new(x, y, texture.width(), texture.height());
        self.render(texture, None, Some(dst))
    }

    /// Copy with rotation (degrees, clockwise) about `center` and mirroring
    ///
    /// A `None` center rotates about the middle of `dst`.
    pub fn render_ex(
        &self,
        texture: &Texture<V>,
        src: Option<Rect>,
        dst: Option<Rect>,
        angle: f64,
        center: Option<Point>,
        flip: Flip,
    ) -> i32 {
        self.system()
            .render_copy_ex(self.raw(), texture.raw(), src, dst, angle, center, flip)
    }

    /// Draw a single point
    pub fn draw_point(&self, point: Point) -> i32 {
        self.draw_points(&[point])
    }

    /// Draw points
    pub fn draw_points(&self, points: &[Point]) -> i32 {
        self.system().render_draw_points(self.raw(), points)
    }

    /// Draw a line segment
    pub fn draw_line(&self, from: Point, to: Point) -> i32 {
        self.draw_lines(&[from, to])
    }

    /// Draw a connected polyline
    pub fn draw_lines(&self, points: &[Point]) -> i32 {
        self.system().render_draw_lines(self.raw(), points)
    }

    /// Outline a rectangle
    pub fn draw_rect(&self, rect: Rect) -> i32 {
        self.draw_rects(&[rect])
    }

    /// Outline rectangles
    pub fn draw_rects(&self, rects: &[Rect]) -> i32 {
        self.system().render_draw_rects(self.raw(), rects)
    }

    /// Fill a rectangle, or the whole target with `None`
    pub fn fill_rect(&self, rect: Option<Rect>) -> i32 {
        self.system().render_fill_rect(self.raw(), rect)
    }

    /// Fill rectangles
    pub fn fill_rects(&self, rects: &[Rect]) -> i32 {
        self.system().render_fill_rects(self.raw(), rects)
    }

    /// Draw into `texture`, or back into the window with `None`
    ///
    /// The texture must have been created with [`TextureAccess::Target`].
    pub fn set_target(&self, texture: Option<&Texture<V>>) -> i32 {
        let target = texture.map_or(<V::Texture as RawHandle>::SENTINEL, Texture::raw);
        self.system().set_render_target(self.raw(), target)
    }

    /// Restrict drawing to `rect`, or the whole target with `None`
    pub fn set_viewport(&self, rect: Option<Rect>) -> i32 {
        self.system().set_render_viewport(self.raw(), rect)
    }

    /// Current drawing area
    pub fn viewport(&self) -> Rect {
        self.system().render_viewport(self.raw())
    }

    /// Resolution-independent drawing size; `(0, 0)` disables scaling
    pub fn set_logical_size(&self, width: i32, height: i32) -> i32 {
        self.system().set_render_logical_size(self.raw(), width, height)
    }

    /// Current logical size
    pub fn logical_size(&self) -> (i32, i32) {
        self.system().render_logical_size(self.raw())
    }

    /// Drawing scale factors
    pub fn set_scale(&self, scale_x: f32, scale_y: f32) -> i32 {
        self.system().set_render_scale(self.raw(), scale_x, scale_y)
    }

    /// Current scale factors
    pub fn scale(&self) -> (f32, f32) {
        self.system().render_scale(self.raw())
    }

    /// Create an empty texture
    ///
    /// Use [`TextureAccess::Streaming`] for lockable textures and
    /// [`TextureAccess::Target`] for render targets.
    pub fn make_texture(
        &self,
        format: PixelFormat,
        access: TextureAccess,
        width: i32,
        height: i32,
    ) -> HandleResult<Texture<V>> {
        Texture::new(self, format, access, width, height)
    }

    /// Upload a surface into a new static texture
    pub fn texture_from_surface(&self, surface: &Surface<V>) -> HandleResult<Texture<V>> {
        Texture::from_surface(self, surface)
    }
}

#[cfg(feature = "image")]
impl<V: ImageSystem> Renderer<V> {
    /// Decode an image from a stream straight into a texture
    ///
    /// Bitmaps are better loaded as a [`Surface`] first.
    pub fn texture_from_image(&self, image: &Stream<V>) -> HandleResult<Texture<V>> {
        Texture::from_image(self, image)
    }

    /// Decode an image file into a texture
    pub fn texture_from_image_file(&self, path: &str) -> HandleResult<Texture<V>> {
        let image = Stream::from_file(self.system(), path, "rb")?;
        self.texture_from_image(&image)
    }
}

#[cfg(feature = "ttf")]
impl<V: FontSystem> Renderer<V> {
    /// Rasterize `text` and upload it into a texture
    pub fn texture_from_text(&self, text: &str, font: &TrueTypeFont<V>, color: Color) -> HandleResult<Texture<V>> {
        let surface = Surface::from_text(text, font, color)?;
        self.texture_from_surface(&surface)
    }
}

impl<V: VideoSystem> std::fmt::Debug for Renderer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").field("handle", &self.raw()).finish()
    }
}
