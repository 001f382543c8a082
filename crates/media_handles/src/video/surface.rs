//! Software pixel buffers

use crate::error::HandleResult;
use crate::handle::{SystemHandle, SystemRelease};
use crate::stream::{load_from, Stream};
use crate::system::{log_creation, PixelFormat, Rect, SurfaceInfo, VideoSystem};
use std::rc::Rc;

#[cfg(feature = "image")]
use crate::system::ImageSystem;

#[cfg(feature = "ttf")]
use crate::font::TrueTypeFont;
#[cfg(feature = "ttf")]
use crate::handle::acquire;
#[cfg(feature = "ttf")]
use crate::system::{Color, FontSystem};

/// Owned native surface
pub struct Surface<V: VideoSystem> {
    handle: SystemHandle<V, V::Surface>,
}

impl<V: VideoSystem> Surface<V> {
    /// Decode a bitmap from a stream; the stream stays open
    pub fn from_bitmap(bitmap: &Stream<V>) -> HandleResult<Self> {
        let video = bitmap.system();
        let handle = load_from(
            bitmap,
            |source, free_source| video.load_bmp(source, free_source),
            "Making surface from bitmap failed",
            SystemRelease::new(Rc::clone(video), V::free_surface),
        );
        log_creation(video.as_ref(), "surface from bitmap", handle).map(|handle| Self { handle })
    }

    /// Decode a bitmap file
    pub fn from_bitmap_file(video: &Rc<V>, path: &str) -> HandleResult<Self> {
        Self::from_bitmap(&Stream::from_file(video, path, "rb")?)
    }

    /// The native surface handle
    pub fn raw(&self) -> V::Surface {
        self.handle.get()
    }

    /// The native system owning this surface
    pub fn system(&self) -> &Rc<V> {
        self.handle.releaser().system_rc()
    }

    /// Copy pixels from `src` to `dst`
    ///
    /// `None` rectangles cover the whole surface. Returns the native status.
    pub fn blit(src: &Self, src_rect: Option<Rect>, dst: &Self, dst_rect: Option<Rect>) -> i32 {
        src.system().blit_surface(src.raw(), src_rect, dst.raw(), dst_rect)
    }

    /// Size, pitch and pixel format
    pub fn info(&self) -> Option<SurfaceInfo> {
        self.system().surface_info(self.raw())
    }

    /// Width in pixels, 0 if the query fails
    pub fn width(&self) -> i32 {
        self.info().map_or(0, |info| info.width)
    }

    /// Height in pixels, 0 if the query fails
    pub fn height(&self) -> i32 {
        self.info().map_or(0, |info| info.height)
    }

    /// Pixel format, if the query succeeds
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.info().map(|info| info.format)
    }

    /// Read the raw pixel rows
    ///
    /// Rows are [`SurfaceInfo::pitch`] bytes apart. Returns `None` if the
    /// native system handed out no pixels.
    pub fn with_pixels<T, F>(&self, read: F) -> Option<T>
    where
        F: FnOnce(&[u8]) -> T,
    {
        let mut read = Some(read);
        let mut output = None;
        self.system().surface_pixels(self.raw(), &mut |pixels| {
            if let Some(read) = read.take() {
                output = Some(read(pixels));
            }
        });
        output
    }
}

#[cfg(feature = "image")]
impl<V: ImageSystem> Surface<V> {
    /// Decode any supported image from a stream; the stream stays open
    pub fn from_image(image: &Stream<V>) -> HandleResult<Self> {
        let video = image.system();
        let handle = load_from(
            image,
            |source, free_source| video.load_image(source, free_source),
            "Making surface from image failed",
            SystemRelease::new(Rc::clone(video), V::free_surface),
        );
        log_creation(video.as_ref(), "surface from image", handle).map(|handle| Self { handle })
    }

    /// Decode an image file
    pub fn from_image_file(video: &Rc<V>, path: &str) -> HandleResult<Self> {
        Self::from_image(&Stream::from_file(video, path, "rb")?)
    }
}

#[cfg(feature = "ttf")]
impl<V: FontSystem> Surface<V> {
    /// Rasterize `text` without antialiasing
    pub fn from_text(text: &str, font: &TrueTypeFont<V>, color: Color) -> HandleResult<Self> {
        let video = font.system();
        let handle = acquire(
            |(font, text, color)| video.render_text_solid(font, text, color),
            "Making surface from text failed",
            (font.raw(), text, color),
            SystemRelease::new(Rc::clone(video), V::free_surface),
        );
        log_creation(video.as_ref(), "surface from text", handle).map(|handle| Self { handle })
    }
}

impl<V: VideoSystem> std::fmt::Debug for Surface<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("handle", &self.raw()).finish()
    }
}

#[cfg(all(test, feature = "image"))]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSystem, ResourceKind};
    use crate::HandleError;

    fn bitmap_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Bmp)
            .unwrap();
        bytes
    }

    #[test]
    fn test_bitmap_from_stream_keeps_stream_open() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::from_mem(&video, bitmap_bytes(3, 2, [1, 2, 3])).unwrap();
        let surface = Surface::from_bitmap(&stream).unwrap();

        assert_eq!((surface.width(), surface.height()), (3, 2));
        assert_eq!(surface.pixel_format(), Some(PixelFormat::Rgb24));
        assert_eq!(video.last_free_source(), Some(0));
        assert_eq!(video.live(ResourceKind::Stream), 1);
        assert!(stream.size() > 0);
    }

    #[test]
    fn test_bitmap_pixels_are_readable() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::from_mem(&video, bitmap_bytes(2, 2, [9, 8, 7])).unwrap();
        let surface = Surface::from_bitmap(&stream).unwrap();
        let first = surface.with_pixels(|pixels| [pixels[0], pixels[1], pixels[2]]);
        assert_eq!(first, Some([9, 8, 7]));
    }

    #[test]
    fn test_garbage_bitmap_fails() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::from_const_mem(&video, &b"BMnot really"[..]).unwrap();
        let result = Surface::from_bitmap(&stream);
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Making surface from bitmap failed"));
        assert_eq!(video.live(ResourceKind::Surface), 0);
    }

    #[test]
    fn test_missing_bitmap_file_reports_stream_failure() {
        let video = Rc::new(HeadlessSystem::new());
        let result = Surface::from_bitmap_file(&video, "no/such/file.bmp");
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Failed to open file stream"));
    }

    #[test]
    fn test_blit_copies_pixels() {
        let video = Rc::new(HeadlessSystem::new());
        let red = Surface::from_bitmap(&Stream::from_mem(&video, bitmap_bytes(2, 2, [255, 0, 0])).unwrap()).unwrap();
        let blue = Surface::from_bitmap(&Stream::from_mem(&video, bitmap_bytes(4, 4, [0, 0, 255])).unwrap()).unwrap();

        assert_eq!(Surface::blit(&red, None, &blue, Some(Rect::new(2, 2, 2, 2))), 0);
        let pitch = blue.info().unwrap().pitch as usize;
        let (top_left, bottom_right) = blue
            .with_pixels(|pixels| (pixels[0..3].to_vec(), pixels[2 * pitch + 6..2 * pitch + 9].to_vec()))
            .unwrap();
        assert_eq!(top_left, vec![0, 0, 255]);
        assert_eq!(bottom_right, vec![255, 0, 0]);
    }

    #[test]
    fn test_blit_far_rectangles_copy_nothing() {
        let video = Rc::new(HeadlessSystem::new());
        let red = Surface::from_bitmap(&Stream::from_mem(&video, bitmap_bytes(2, 2, [255, 0, 0])).unwrap()).unwrap();
        let blue = Surface::from_bitmap(&Stream::from_mem(&video, bitmap_bytes(4, 4, [0, 0, 255])).unwrap()).unwrap();

        let far = Rect::new(i32::MAX, 0, 1, 1);
        assert_eq!(Surface::blit(&red, Some(far), &blue, None), 0);
        assert_eq!(Surface::blit(&red, None, &blue, Some(far)), 0);
        assert_eq!(Surface::blit(&red, None, &blue, Some(Rect::new(i32::MIN, i32::MIN, 1, 1))), 0);
        let untouched = blue.with_pixels(|pixels| pixels.chunks(3).all(|pixel| pixel == [0, 0, 255]));
        assert_eq!(untouched, Some(true));
    }

    #[test]
    fn test_image_from_png_stream() {
        let video = Rc::new(HeadlessSystem::new());
        let image = image::RgbaImage::from_pixel(5, 4, image::Rgba([1, 2, 3, 4]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let stream = Stream::from_mem(&video, bytes).unwrap();
        let surface = Surface::from_image(&stream).unwrap();
        assert_eq!((surface.width(), surface.height()), (5, 4));
        assert_eq!(surface.pixel_format(), Some(PixelFormat::Rgba8888));
        assert_eq!(video.last_free_source(), Some(0));
    }
}
