//! TrueType fonts

use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::system::{log_creation, FontSystem};
use std::rc::Rc;

/// Owned font at a fixed point size
///
/// Text is rasterized with
/// [`Surface::from_text`](crate::video::Surface::from_text) or
/// [`Renderer::texture_from_text`](crate::video::Renderer::texture_from_text).
pub struct TrueTypeFont<F: FontSystem> {
    handle: SystemHandle<F, F::Font>,
}

impl<F: FontSystem> TrueTypeFont<F> {
    /// Open the font file at `path` with `point_size`
    pub fn open(fonts: &Rc<F>, path: &str, point_size: i32) -> HandleResult<Self> {
        let handle = acquire(
            |(path, point_size)| fonts.open_font(path, point_size),
            "Making TrueTypeFont failed",
            (path, point_size),
            SystemRelease::new(Rc::clone(fonts), F::close_font),
        );
        log_creation(fonts.as_ref(), "font", handle).map(|handle| Self { handle })
    }

    /// The native font handle
    pub fn raw(&self) -> F::Font {
        self.handle.get()
    }

    /// The native system owning this font
    pub fn system(&self) -> &Rc<F> {
        self.handle.releaser().system_rc()
    }

    /// Maximum glyph height in pixels
    pub fn height(&self) -> i32 {
        self.system().font_height(self.raw())
    }

    /// Size of `text` once rendered, if it can be measured
    pub fn size_text(&self, text: &str) -> Option<(i32, i32)> {
        self.system().size_text(self.raw(), text)
    }
}

impl<F: FontSystem> std::fmt::Debug for TrueTypeFont<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeFont").field("handle", &self.raw()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSystem, ResourceKind};
    use crate::system::{Color, PixelFormat, RendererFlags};
    use crate::video::{Surface, Window};
    use crate::HandleError;

    /// Any existing file works as a font for the headless backend
    fn font_path() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml").to_string()
    }

    #[test]
    fn test_open_and_measure() {
        let fonts = Rc::new(HeadlessSystem::new());
        let font = TrueTypeFont::open(&fonts, &font_path(), 20).unwrap();
        assert_eq!(font.height(), 20);
        assert_eq!(font.size_text("abcd"), Some((40, 20)));
    }

    #[test]
    fn test_missing_font_fails() {
        let fonts = Rc::new(HeadlessSystem::new());
        let result = TrueTypeFont::open(&fonts, "missing.ttf", 12);
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Making TrueTypeFont failed"));
        assert_eq!(fonts.live(ResourceKind::Font), 0);
    }

    #[test]
    fn test_text_surface_and_texture() {
        let video = Rc::new(HeadlessSystem::new());
        let font = TrueTypeFont::open(&video, &font_path(), 16).unwrap();

        let surface = Surface::from_text("hello", &font, Color::WHITE).unwrap();
        assert_eq!((surface.width(), surface.height()), (40, 16));
        assert_eq!(surface.pixel_format(), Some(PixelFormat::Rgba8888));

        let mut window = Window::with_defaults(&video, "text").unwrap();
        let renderer = window.make_renderer(RendererFlags::default()).unwrap();
        let texture = renderer.texture_from_text("hi", &font, Color::rgb(255, 0, 0)).unwrap();
        assert_eq!((texture.width(), texture.height()), (16, 16));

        // The intermediate surface is freed once the texture exists
        assert_eq!(video.live(ResourceKind::Surface), 1);
    }

    #[test]
    fn test_empty_text_fails() {
        let video = Rc::new(HeadlessSystem::new());
        let font = TrueTypeFont::open(&video, &font_path(), 16).unwrap();
        let result = Surface::from_text("", &font, Color::WHITE);
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Making surface from text failed"));
    }
}
