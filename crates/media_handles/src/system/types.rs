//! Plain value types passed across the native interfaces

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Integer rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the rectangle has no area
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Intersection with `other`, or `None` if they do not overlap
    ///
    /// Edges are computed in `i64`, so rectangles reaching past the `i32`
    /// range clip instead of overflowing.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let w = i32::try_from(right - i64::from(left)).ok()?;
        let h = i32::try_from(bottom - i64::from(top)).ok()?;
        let rect = Self::new(left, top, w, h);
        (!rect.is_empty()).then_some(rect)
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.w)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.h)
    }
}

/// Integer point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Color with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
}

/// Blend mode for drawing and texture copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// No blending
    #[default]
    None,
    /// Alpha blending
    Blend,
    /// Additive blending
    Add,
    /// Color modulate
    Mod,
}

/// Pixel layouts understood by surfaces and textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 32-bit RGBA, 8 bits per channel
    Rgba8888,
    /// 32-bit BGRA
    Bgra8888,
    /// 32-bit ARGB
    Argb8888,
    /// 32-bit RGB with an unused byte
    Rgb888,
    /// 32-bit BGR with an unused byte
    Bgr888,
    /// Packed 24-bit RGB
    Rgb24,
    /// Packed 24-bit BGR
    Bgr24,
    /// A native format with no named variant
    Other(u32),
}

impl PixelFormat {
    /// Bytes used by a single pixel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb24 | Self::Bgr24 => 3,
            _ => 4,
        }
    }
}

/// How a texture's pixels may be accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureAccess {
    /// Changes rarely, not lockable
    #[default]
    Static,
    /// Changes frequently, lockable
    Streaming,
    /// Usable as a render target
    Target,
}

/// Window placement on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowPos {
    /// Let the window system decide
    #[default]
    Undefined,
    /// Center on the display
    Centered,
    /// Explicit screen coordinate
    At(i32),
}

bitflags! {
    /// Window creation and state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WindowFlags: u32 {
        /// Fullscreen window
        const FULLSCREEN = 0x0000_0001;
        /// Usable with an OpenGL context
        const OPENGL = 0x0000_0002;
        /// Visible
        const SHOWN = 0x0000_0004;
        /// Not visible
        const HIDDEN = 0x0000_0008;
        /// No decorations
        const BORDERLESS = 0x0000_0010;
        /// User-resizable
        const RESIZABLE = 0x0000_0020;
        /// Minimized
        const MINIMIZED = 0x0000_0040;
        /// Maximized
        const MAXIMIZED = 0x0000_0080;
        /// Has input focus
        const INPUT_FOCUS = 0x0000_0200;
        /// Fullscreen at desktop resolution
        const FULLSCREEN_DESKTOP = Self::FULLSCREEN.bits() | 0x0000_1000;
    }
}

bitflags! {
    /// Renderer creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RendererFlags: u32 {
        /// Software fallback
        const SOFTWARE = 0x0000_0001;
        /// Hardware accelerated
        const ACCELERATED = 0x0000_0002;
        /// Present synchronized with refresh rate
        const PRESENT_VSYNC = 0x0000_0004;
        /// Supports rendering to texture
        const TARGET_TEXTURE = 0x0000_0008;
    }
}

impl Default for RendererFlags {
    fn default() -> Self {
        Self::ACCELERATED | Self::PRESENT_VSYNC | Self::TARGET_TEXTURE
    }
}

bitflags! {
    /// Mirroring applied by an extended texture copy
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flip: u32 {
        /// Mirror horizontally
        const HORIZONTAL = 0x1;
        /// Mirror vertically
        const VERTICAL = 0x2;
    }
}

/// Capabilities reported by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererInfo {
    /// Backend name
    pub name: String,
    /// Flags the renderer was created with
    pub flags: RendererFlags,
    /// Supported texture formats, preferred first
    pub texture_formats: Vec<PixelFormat>,
    /// Largest texture width
    pub max_texture_width: i32,
    /// Largest texture height
    pub max_texture_height: i32,
}

/// Attributes reported by a texture query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureQuery {
    /// Pixel layout
    pub format: PixelFormat,
    /// Access pattern
    pub access: TextureAccess,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

/// Layout of a surface's pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Bytes per row
    pub pitch: i32,
    /// Pixel layout
    pub format: PixelFormat,
}

/// Origin of a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Caller-supplied callbacks
    Unknown,
    /// Standard file
    File,
    /// Read-write memory
    Memory,
    /// Read-only memory
    MemoryReadOnly,
}

/// Decoder used by a music track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicType {
    /// No music or undetected
    None,
    /// RIFF WAVE
    Wav,
    /// Ogg Vorbis
    Ogg,
    /// MPEG layer 3
    Mp3,
    /// FLAC
    Flac,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersection(&Rect::new(20, 20, 2, 2)), None);
    }

    #[test]
    fn test_rect_intersection_near_i32_limits() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersection(&Rect::new(i32::MAX, 0, 1, 1)), None);
        assert_eq!(Rect::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX).intersection(&a), None);

        let huge = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(huge.intersection(&a), None);

        let wide = Rect::new(i32::MAX - 5, 0, i32::MAX, 4);
        let tail = Rect::new(i32::MAX - 2, 0, 10, 10);
        assert_eq!(wide.intersection(&tail), Some(Rect::new(i32::MAX - 2, 0, 10, 4)));
    }

    #[test]
    fn test_default_renderer_flags() {
        let flags = RendererFlags::default();
        assert!(flags.contains(RendererFlags::ACCELERATED));
        assert!(flags.contains(RendererFlags::PRESENT_VSYNC));
        assert!(flags.contains(RendererFlags::TARGET_TEXTURE));
        assert!(!flags.contains(RendererFlags::SOFTWARE));
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Rgb24.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Rgba8888.bytes_per_pixel(), 4);
    }
}
