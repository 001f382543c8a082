//! Image decoding through the `image` crate

use super::resources::SurfaceEntry;
use super::HeadlessSystem;
use crate::handle::RawHandle;
use crate::system::{ImageSystem, PixelFormat};
use image::{DynamicImage, ImageFormat};

/// Convert a decoded image into surface pixels
///
/// Images with an alpha channel become `Rgba8888`, everything else `Rgb24`.
fn to_surface(image: &DynamicImage) -> Option<SurfaceEntry> {
    let width = i32::try_from(image.width()).ok()?;
    let height = i32::try_from(image.height()).ok()?;
    let (format, pixels) = if image.color().has_alpha() {
        (PixelFormat::Rgba8888, image.to_rgba8().into_raw())
    } else {
        (PixelFormat::Rgb24, image.to_rgb8().into_raw())
    };
    Some(SurfaceEntry::from_packed(width, height, format, &pixels))
}

impl HeadlessSystem {
    fn decode(&self, data: &[u8], format: Option<ImageFormat>) -> Option<SurfaceEntry> {
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(data, format),
            None => image::load_from_memory(data),
        };
        match decoded {
            Ok(image) => to_surface(&image).or_else(|| {
                self.set_error("Image is too large");
                None
            }),
            Err(err) => {
                self.set_error(format!("Couldn't decode image: {err}"));
                None
            }
        }
    }

    pub(super) fn decode_bitmap(&self, data: &[u8]) -> u64 {
        self.decode(data, Some(ImageFormat::Bmp))
            .map_or(u64::SENTINEL, |surface| self.insert_surface(surface))
    }
}

impl ImageSystem for HeadlessSystem {
    fn load_image(&self, stream: u64, free_source: i32) -> u64 {
        self.read_source(stream, free_source)
            .and_then(|data| self.decode(&data, None))
            .map_or(u64::SENTINEL, |surface| self.insert_surface(surface))
    }

    fn load_image_texture(&self, renderer: u64, stream: u64, free_source: i32) -> u64 {
        self.read_source(stream, free_source)
            .and_then(|data| self.decode(&data, None))
            .map_or(u64::SENTINEL, |surface| self.insert_texture_from(renderer, &surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::ResourceKind;
    use crate::system::VideoSystem;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = image::GrayImage::from_pixel(3, 3, image::Luma([200]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_grayscale_decodes_to_rgb() {
        let video = HeadlessSystem::new();
        let stream = video.stream_from_mem(png_bytes());
        let surface = video.load_image(stream, 0);
        let info = video.surface_info(surface).unwrap();
        assert_eq!(info.format, PixelFormat::Rgb24);
        assert_eq!(info.pitch, 12);
        video.free_surface(surface);
        video.close_stream(stream);
    }

    #[test]
    fn test_free_source_closes_stream() {
        let video = HeadlessSystem::new();
        let stream = video.stream_from_mem(png_bytes());
        let surface = video.load_image(stream, 1);
        assert!(!surface.is_sentinel());
        assert_eq!(video.live(ResourceKind::Stream), 0);
        video.free_surface(surface);
    }

    #[test]
    fn test_png_is_not_a_bitmap() {
        let video = HeadlessSystem::new();
        let stream = video.stream_from_mem(png_bytes());
        assert!(video.load_bmp(stream, 0).is_sentinel());
        assert!(video.last_error().contains("BMP"));
        video.close_stream(stream);
    }
}
