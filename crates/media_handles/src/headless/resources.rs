//! Object records kept by the headless backend

use super::ResourceKind;
use crate::stream::StreamOps;
use crate::system::{BlendMode, Color, PixelFormat, Rect, RendererFlags, StreamKind, TextureAccess, WindowFlags};
use std::borrow::Cow;
use std::io::{Cursor, Read, Seek, SeekFrom};

pub(super) enum Resource {
    Stream(StreamEntry),
    Window(WindowEntry),
    GlContext(GlContextEntry),
    Renderer(RendererEntry),
    Texture(TextureEntry),
    Surface(SurfaceEntry),
    #[cfg(feature = "ttf")]
    Font(FontEntry),
    #[cfg(feature = "mixer")]
    Chunk(ChunkEntry),
    #[cfg(feature = "mixer")]
    Music(MusicEntry),
}

impl Resource {
    pub(super) const fn kind(&self) -> ResourceKind {
        match self {
            Self::Stream(_) => ResourceKind::Stream,
            Self::Window(_) => ResourceKind::Window,
            Self::GlContext(_) => ResourceKind::GlContext,
            Self::Renderer(_) => ResourceKind::Renderer,
            Self::Texture(_) => ResourceKind::Texture,
            Self::Surface(_) => ResourceKind::Surface,
            #[cfg(feature = "ttf")]
            Self::Font(_) => ResourceKind::Font,
            #[cfg(feature = "mixer")]
            Self::Chunk(_) => ResourceKind::Chunk,
            #[cfg(feature = "mixer")]
            Self::Music(_) => ResourceKind::Music,
        }
    }
}

/// Generates a typed accessor over [`Resource`] for one variant
macro_rules! resource_accessor {
    ($name:ident, $variant:ident, $entry:ty) => {
        impl super::HeadlessSystem {
            pub(super) fn $name<T>(&self, raw: u64, f: impl FnOnce(&mut $entry) -> T) -> Option<T> {
                self.with_object(raw, ResourceKind::$variant, |resource| match resource {
                    Resource::$variant(entry) => Some(f(entry)),
                    #[allow(unreachable_patterns)]
                    _ => None,
                })
                .flatten()
            }
        }
    };
}

resource_accessor!(with_stream, Stream, StreamEntry);
resource_accessor!(with_window, Window, WindowEntry);
resource_accessor!(with_gl_context, GlContext, GlContextEntry);
resource_accessor!(with_renderer, Renderer, RendererEntry);
resource_accessor!(with_texture, Texture, TextureEntry);
resource_accessor!(with_surface, Surface, SurfaceEntry);
#[cfg(feature = "ttf")]
resource_accessor!(with_font, Font, FontEntry);
#[cfg(feature = "mixer")]
resource_accessor!(with_chunk, Chunk, ChunkEntry);
#[cfg(feature = "mixer")]
resource_accessor!(with_music, Music, MusicEntry);

pub(super) struct StreamEntry {
    pub kind: StreamKind,
    pub data: StreamData,
}

pub(super) enum StreamData {
    /// Files, writable memory and custom callbacks
    Ops(Box<dyn StreamOps>),
    ReadOnly(Cursor<Cow<'static, [u8]>>),
}

impl StreamEntry {
    pub fn size(&mut self) -> i64 {
        match &mut self.data {
            StreamData::Ops(ops) => ops.size(),
            StreamData::ReadOnly(cursor) => i64::try_from(cursor.get_ref().len()).unwrap_or(-1),
        }
    }

    pub fn seek(&mut self, pos: SeekFrom) -> i64 {
        match &mut self.data {
            StreamData::Ops(ops) => ops.seek(pos),
            StreamData::ReadOnly(cursor) => Seek::seek(cursor, pos)
                .ok()
                .and_then(|offset| i64::try_from(offset).ok())
                .unwrap_or(-1),
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        match &mut self.data {
            StreamData::Ops(ops) => ops.read(buf),
            StreamData::ReadOnly(cursor) => Read::read(cursor, buf).unwrap_or(0),
        }
    }

    /// Returns `None` for read-only streams
    pub fn write(&mut self, buf: &[u8]) -> Option<usize> {
        match &mut self.data {
            StreamData::Ops(ops) => Some(ops.write(buf)),
            StreamData::ReadOnly(_) => None,
        }
    }

    /// Everything from the cursor to the end
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = self.read(&mut chunk);
            if read == 0 {
                break data;
            }
            data.extend_from_slice(&chunk[..read]);
        }
    }

    pub fn close(mut self) -> i32 {
        match &mut self.data {
            StreamData::Ops(ops) => ops.close(),
            StreamData::ReadOnly(_) => 0,
        }
    }
}

pub(super) struct WindowEntry {
    pub id: u32,
    pub title: String,
    pub size: (i32, i32),
    pub flags: WindowFlags,
    /// Renderer created for this window, if any
    pub renderer: Option<u64>,
    pub swaps: usize,
}

pub(super) struct GlContextEntry {
    pub window: u64,
}

pub(super) struct RendererEntry {
    pub window: u64,
    /// Window size when the renderer was created
    pub output: (i32, i32),
    pub flags: RendererFlags,
    pub draw_color: Color,
    pub draw_blend: BlendMode,
    pub target: Option<u64>,
    pub viewport: Option<Rect>,
    pub logical_size: (i32, i32),
    pub scale: (f32, f32),
    pub presents: usize,
}

impl RendererEntry {
    pub const fn new(window: u64, output: (i32, i32), flags: RendererFlags) -> Self {
        Self {
            window,
            output,
            flags,
            draw_color: Color::BLACK,
            draw_blend: BlendMode::None,
            target: None,
            viewport: None,
            logical_size: (0, 0),
            scale: (1.0, 1.0),
            presents: 0,
        }
    }
}

pub(super) struct TextureEntry {
    pub renderer: u64,
    pub format: PixelFormat,
    pub access: TextureAccess,
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u8>,
    pub color_mod: (u8, u8, u8),
    pub alpha_mod: u8,
    pub blend: BlendMode,
}

impl TextureEntry {
    pub fn pitch(&self) -> usize {
        usize::try_from(self.width).unwrap_or(0) * self.format.bytes_per_pixel()
    }
}

/// Tightly packed pixel rows
#[derive(Clone)]
pub(super) struct SurfaceEntry {
    pub width: i32,
    pub height: i32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Surface rows start on 4-byte boundaries, like native software surfaces
const SURFACE_ROW_ALIGN: usize = 4;

impl SurfaceEntry {
    /// A surface built from tightly packed rows, padded out to its pitch
    pub fn from_packed(width: i32, height: i32, format: PixelFormat, packed: &[u8]) -> Self {
        let mut entry = Self {
            width,
            height,
            format,
            pixels: Vec::new(),
        };
        let (row, pitch) = (entry.row_len(), entry.pitch());
        entry.pixels = vec![0; pitch * usize::try_from(height).unwrap_or(0)];
        for (line, source) in entry.pixels.chunks_mut(pitch.max(1)).zip(packed.chunks(row.max(1))) {
            line[..source.len()].copy_from_slice(source);
        }
        entry
    }

    /// A surface of `format` with every pixel set to `fill`
    pub fn filled(width: i32, height: i32, format: PixelFormat, fill: &[u8]) -> Self {
        let count = usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0);
        let packed: Vec<u8> = fill.iter().copied().cycle().take(count * fill.len()).collect();
        Self::from_packed(width, height, format, &packed)
    }

    /// Bytes of pixel data in one row
    pub fn row_len(&self) -> usize {
        usize::try_from(self.width).unwrap_or(0) * self.format.bytes_per_pixel()
    }

    pub fn pitch(&self) -> usize {
        self.row_len().next_multiple_of(SURFACE_ROW_ALIGN)
    }

    /// The pixel rows with their padding removed
    pub fn packed(&self) -> Vec<u8> {
        let row = self.row_len();
        self.pixels
            .chunks(self.pitch().max(1))
            .flat_map(|line| &line[..row.min(line.len())])
            .copied()
            .collect()
    }

    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

#[cfg(feature = "ttf")]
pub(super) struct FontEntry {
    pub point_size: i32,
}

#[cfg(feature = "mixer")]
pub(super) struct ChunkEntry {
    pub samples: usize,
    pub volume: i32,
}

#[cfg(feature = "mixer")]
pub(super) struct MusicEntry {
    pub kind: crate::system::MusicType,
}
