//! GPU textures owned by a renderer

use super::{Renderer, Surface};
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::system::{log_creation, BlendMode, PixelFormat, Rect, TextureAccess, TextureQuery, VideoSystem};
use std::rc::Rc;

#[cfg(feature = "image")]
use crate::stream::{load_from, Stream};
#[cfg(feature = "image")]
use crate::system::ImageSystem;

/// Owned native texture
///
/// Textures are made through a [`Renderer`] and can only be drawn by it.
pub struct Texture<V: VideoSystem> {
    handle: SystemHandle<V, V::Texture>,
}

impl<V: VideoSystem> Texture<V> {
    pub(crate) fn new(
        renderer: &Renderer<V>,
        format: PixelFormat,
        access: TextureAccess,
        width: i32,
        height: i32,
    ) -> HandleResult<Self> {
        let video = renderer.system();
        let handle = acquire(
            |(renderer, format, access, width, height)| video.create_texture(renderer, format, access, width, height),
            "Making texture failed",
            (renderer.raw(), format, access, width, height),
            SystemRelease::new(Rc::clone(video), V::destroy_texture),
        );
        log_creation(video.as_ref(), "texture", handle).map(|handle| Self { handle })
    }

    pub(crate) fn from_surface(renderer: &Renderer<V>, surface: &Surface<V>) -> HandleResult<Self> {
        let video = renderer.system();
        let handle = acquire(
            |(renderer, surface)| video.create_texture_from_surface(renderer, surface),
            "Making texture from surface failed",
            (renderer.raw(), surface.raw()),
            SystemRelease::new(Rc::clone(video), V::destroy_texture),
        );
        log_creation(video.as_ref(), "texture from surface", handle).map(|handle| Self { handle })
    }

    /// The native texture handle
    pub fn raw(&self) -> V::Texture {
        self.handle.get()
    }

    /// The native system owning this texture
    pub fn system(&self) -> &Rc<V> {
        self.handle.releaser().system_rc()
    }

    /// Format, access and size
    pub fn query(&self) -> Option<TextureQuery> {
        self.system().query_texture(self.raw())
    }

    /// Width in pixels, 0 if the query fails
    pub fn width(&self) -> i32 {
        self.query().map_or(0, |query| query.width)
    }

    /// Height in pixels, 0 if the query fails
    pub fn height(&self) -> i32 {
        self.query().map_or(0, |query| query.height)
    }

    /// Lock a streaming texture and write its pixels
    ///
    /// `write` receives the locked pixels (starting at the top-left corner
    /// of `rect`) and the row pitch in bytes. The texture is unlocked when
    /// `write` returns. Returns `false` if locking failed, in which case
    /// `write` is never called.
    pub fn with_lock<F>(&self, rect: Option<Rect>, write: F) -> bool
    where
        F: FnOnce(&mut [u8], usize),
    {
        let mut write = Some(write);
        let status = self.system().lock_texture(self.raw(), rect, &mut |pixels, pitch| {
            if let Some(write) = write.take() {
                write(pixels, pitch);
            }
        });
        status >= 0
    }

    /// Multiply copied pixels by `(r, g, b) / 255`
    pub fn set_color_mod(&self, r: u8, g: u8, b: u8) -> bool {
        self.system().set_texture_color_mod(self.raw(), r, g, b) >= 0
    }

    /// Current color modulation
    pub fn color_mod(&self) -> Option<(u8, u8, u8)> {
        self.system().texture_color_mod(self.raw())
    }

    /// Multiply copied alpha by `alpha / 255`
    pub fn set_alpha_mod(&self, alpha: u8) -> bool {
        self.system().set_texture_alpha_mod(self.raw(), alpha) >= 0
    }

    /// Current alpha modulation
    pub fn alpha_mod(&self) -> Option<u8> {
        self.system().texture_alpha_mod(self.raw())
    }

    /// Blend mode used when copying
    pub fn set_blend_mode(&self, mode: BlendMode) -> bool {
        self.system().set_texture_blend_mode(self.raw(), mode) >= 0
    }

    /// Current blend mode
    pub fn blend_mode(&self) -> Option<BlendMode> {
        self.system().texture_blend_mode(self.raw())
    }
}

#[cfg(feature = "image")]
impl<V: ImageSystem> Texture<V> {
    pub(crate) fn from_image(renderer: &Renderer<V>, image: &Stream<V>) -> HandleResult<Self> {
        let video = renderer.system();
        let target = renderer.raw();
        let handle = load_from(
            image,
            |source, free_source| video.load_image_texture(target, source, free_source),
            "Making texture from image failed",
            SystemRelease::new(Rc::clone(video), V::destroy_texture),
        );
        log_creation(video.as_ref(), "texture from image", handle).map(|handle| Self { handle })
    }
}

impl<V: VideoSystem> std::fmt::Debug for Texture<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture").field("handle", &self.raw()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSystem, ResourceKind};
    use crate::system::RendererFlags;
    use crate::video::Window;
    use crate::HandleError;

    fn setup() -> (Rc<HeadlessSystem>, Window<HeadlessSystem>, Rc<Renderer<HeadlessSystem>>) {
        let video = Rc::new(HeadlessSystem::new());
        let mut window = Window::with_defaults(&video, "texture test").unwrap();
        let renderer = window.make_renderer(RendererFlags::default()).unwrap();
        (video, window, renderer)
    }

    #[test]
    fn test_query_reports_creation_parameters() {
        let (_video, _window, renderer) = setup();
        let texture = renderer
            .make_texture(PixelFormat::Argb8888, TextureAccess::Streaming, 32, 16)
            .unwrap();
        let query = texture.query().unwrap();
        assert_eq!(query.format, PixelFormat::Argb8888);
        assert_eq!(query.access, TextureAccess::Streaming);
        assert_eq!((texture.width(), texture.height()), (32, 16));
    }

    #[test]
    fn test_invalid_size_fails() {
        let (video, _window, renderer) = setup();
        let result = renderer.make_texture(PixelFormat::Rgba8888, TextureAccess::Static, 0, 16);
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Making texture failed"));
        assert_eq!(video.live(ResourceKind::Texture), 0);
    }

    #[test]
    fn test_streaming_lock_writes_pixels() {
        let (video, _window, renderer) = setup();
        let texture = renderer
            .make_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();

        let locked = texture.with_lock(None, |pixels, pitch| {
            assert_eq!(pitch, 16);
            assert_eq!(pixels.len(), 64);
            pixels.fill(0xab);
        });
        assert!(locked);
        assert!(video.texture_pixels(texture.raw()).unwrap().iter().all(|&b| b == 0xab));
    }

    #[test]
    fn test_lock_far_outside_texture_fails() {
        let (video, _window, renderer) = setup();
        let texture = renderer
            .make_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();

        let mut called = false;
        assert!(!texture.with_lock(Some(Rect::new(i32::MAX, 0, 1, 1)), |_, _| called = true));
        assert!(!texture.with_lock(Some(Rect::new(0, i32::MAX, i32::MAX, i32::MAX)), |_, _| called = true));
        assert!(!called);
        assert!(video.last_error().contains("outside"));
        assert!(texture.with_lock(Some(Rect::new(1, 1, 2, 2)), |_, pitch| assert_eq!(pitch, 16)));
    }

    #[test]
    fn test_lock_sub_rectangle() {
        let (video, _window, renderer) = setup();
        let texture = renderer
            .make_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();

        assert!(texture.with_lock(Some(Rect::new(1, 1, 2, 2)), |pixels, pitch| {
            pixels[..4].fill(0xff);
            pixels[pitch..pitch + 4].fill(0xff);
        }));

        let pixels = video.texture_pixels(texture.raw()).unwrap();
        assert_eq!(pixels[16 + 4], 0xff);
        assert_eq!(pixels[32 + 4], 0xff);
        assert_eq!(pixels[0], 0);
    }

    #[test]
    fn test_static_texture_cannot_be_locked() {
        let (_video, _window, renderer) = setup();
        let texture = renderer
            .make_texture(PixelFormat::Rgba8888, TextureAccess::Static, 4, 4)
            .unwrap();
        let mut called = false;
        assert!(!texture.with_lock(None, |_, _| called = true));
        assert!(!called);
    }

    #[test]
    fn test_color_alpha_and_blend_modulation() {
        let (_video, _window, renderer) = setup();
        let texture = renderer
            .make_texture(PixelFormat::Rgba8888, TextureAccess::Static, 8, 8)
            .unwrap();

        assert_eq!(texture.color_mod(), Some((255, 255, 255)));
        assert!(texture.set_color_mod(255, 128, 0));
        assert_eq!(texture.color_mod(), Some((255, 128, 0)));

        assert_eq!(texture.alpha_mod(), Some(255));
        assert!(texture.set_alpha_mod(64));
        assert_eq!(texture.alpha_mod(), Some(64));

        assert!(texture.set_blend_mode(BlendMode::Add));
        assert_eq!(texture.blend_mode(), Some(BlendMode::Add));
    }

    #[test]
    fn test_textures_released_on_drop() {
        let (video, _window, renderer) = setup();
        {
            let _a = renderer
                .make_texture(PixelFormat::Rgba8888, TextureAccess::Static, 8, 8)
                .unwrap();
            let _b = renderer
                .make_texture(PixelFormat::Rgba8888, TextureAccess::Target, 8, 8)
                .unwrap();
            assert_eq!(video.live(ResourceKind::Texture), 2);
        }
        let stats = video.stats(ResourceKind::Texture);
        assert_eq!((stats.created, stats.destroyed), (2, 2));
    }
}
