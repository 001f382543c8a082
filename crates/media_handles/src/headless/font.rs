//! Fixed-advance text layout
//!
//! Any readable file opens as a font. Every glyph is half the point size
//! wide and exactly the point size high; rendered text is a solid block of
//! the requested color.

use super::resources::{FontEntry, Resource, SurfaceEntry};
use super::{HeadlessSystem, ResourceKind};
use crate::handle::RawHandle;
use crate::system::{Color, FontSystem, PixelFormat};
use std::path::Path;

fn text_size(point_size: i32, text: &str) -> (i32, i32) {
    let glyphs = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    (glyphs.saturating_mul(point_size) / 2, point_size)
}

impl FontSystem for HeadlessSystem {
    type Font = u64;

    fn open_font(&self, path: &str, point_size: i32) -> u64 {
        if point_size <= 0 {
            return self.fail("Font point size must be positive");
        }
        if !Path::new(path).is_file() {
            return self.fail(format!("Couldn't open {path}"));
        }
        if self.injected_failure(ResourceKind::Font) {
            return u64::SENTINEL;
        }
        self.insert(Resource::Font(FontEntry { point_size }))
    }

    fn close_font(&self, font: u64) {
        self.remove(font, ResourceKind::Font);
    }

    fn font_height(&self, font: u64) -> i32 {
        self.with_font(font, |entry| entry.point_size).unwrap_or(0)
    }

    fn size_text(&self, font: u64, text: &str) -> Option<(i32, i32)> {
        self.with_font(font, |entry| text_size(entry.point_size, text))
    }

    fn render_text_solid(&self, font: u64, text: &str, color: Color) -> u64 {
        let Some((width, height)) = self.size_text(font, text) else {
            return u64::SENTINEL;
        };
        if width == 0 {
            return self.fail("Text has zero width");
        }
        let fill = [color.r, color.g, color.b, color.a];
        self.insert_surface(SurfaceEntry::filled(width, height, PixelFormat::Rgba8888, &fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::VideoSystem;

    #[test]
    fn test_text_size_uses_half_width_glyphs() {
        assert_eq!(text_size(10, "abc"), (15, 10));
        assert_eq!(text_size(12, "héllo"), (30, 12));
        assert_eq!(text_size(12, ""), (0, 12));
    }

    #[test]
    fn test_rendered_text_is_solid_color() {
        let fonts = HeadlessSystem::new();
        let font = fonts.open_font(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"), 4);
        let surface = fonts.render_text_solid(font, "ab", Color::rgba(1, 2, 3, 4));
        let mut seen = Vec::new();
        fonts.surface_pixels(surface, &mut |pixels| seen.extend_from_slice(pixels));
        assert_eq!(seen.len(), 4 * 4 * 4);
        assert!(seen.chunks(4).all(|pixel| pixel == [1, 2, 3, 4]));
        fonts.free_surface(surface);
        fonts.close_font(font);
    }
}
