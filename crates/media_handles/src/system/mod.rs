//! Native system interfaces
//!
//! The wrappers in this crate never talk to a concrete library directly; they
//! call through these traits. Each trait is the narrow surface consumed from
//! one native subsystem:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Window, Renderer, Texture... │ ← owning wrappers (video, audio, font, gl)
//! └──────────────┬───────────────┘
//!                │ create / forward / destroy
//!   ┌────────────▼─────────────┐
//!   │ VideoSystem, MixerSystem │ ← these traits
//!   │ FontSystem, ImageSystem  │
//!   └────────────┬─────────────┘
//!                │ implemented by
//!   ┌────────────▼─────────────┐
//!   │ HeadlessSystem           │ ← in-memory backend (headless)
//!   │ native bindings          │
//!   └──────────────────────────┘
//! ```
//!
//! Conventions shared by every trait:
//! - "create" functions return the associated raw handle type, or its
//!   sentinel on failure (details via [`VideoSystem::last_error`]).
//! - Status codes are returned unchanged: `0` success, negative failure.
//! - Loaders that read from a stream take a `free_source` flag; `0` means the
//!   stream must be left open.
//!
//! Implementations assume single-threaded use per system instance.

pub mod types;

pub use types::*;

use crate::error::HandleResult;
use crate::handle::RawHandle;
use crate::stream::StreamOps;
use std::borrow::Cow;
use std::io::SeekFrom;

/// Windowing, 2D rendering, surfaces and byte streams
pub trait VideoSystem {
    /// Raw window handle
    type Window: RawHandle;
    /// Raw renderer handle
    type Renderer: RawHandle;
    /// Raw texture handle
    type Texture: RawHandle;
    /// Raw surface handle
    type Surface: RawHandle;
    /// Raw stream handle
    type Stream: RawHandle;
    /// Raw GL context handle
    type GlContext: RawHandle;

    /// Message describing the most recent native failure
    fn last_error(&self) -> String;

    // Streams

    /// Open a file stream; `mode` uses `fopen` syntax
    fn stream_from_file(&self, path: &str, mode: &str) -> Self::Stream;
    /// Read-write stream over a fixed-size buffer
    fn stream_from_mem(&self, mem: Vec<u8>) -> Self::Stream;
    /// Read-only stream over a buffer
    fn stream_from_const_mem(&self, mem: Cow<'static, [u8]>) -> Self::Stream;
    /// Stream backed by caller callbacks
    fn stream_from_ops(&self, ops: Box<dyn StreamOps>) -> Self::Stream;
    /// Close and free a stream
    fn close_stream(&self, stream: Self::Stream);
    /// Total size in bytes, negative if unknown
    fn stream_size(&self, stream: Self::Stream) -> i64;
    /// Move the cursor; returns the new offset or a negative error
    fn stream_seek(&self, stream: Self::Stream, pos: SeekFrom) -> i64;
    /// Current offset
    fn stream_tell(&self, stream: Self::Stream) -> i64 {
        self.stream_seek(stream, SeekFrom::Current(0))
    }
    /// Read into `buf`; returns bytes read (0 on error or end)
    fn stream_read(&self, stream: Self::Stream, buf: &mut [u8]) -> usize;
    /// Write `buf`; returns bytes written
    fn stream_write(&self, stream: Self::Stream, buf: &[u8]) -> usize;
    /// What the stream reads from
    fn stream_kind(&self, stream: Self::Stream) -> StreamKind;

    // Windows

    /// Create a window
    fn create_window(
        &self,
        title: &str,
        x: WindowPos,
        y: WindowPos,
        width: i32,
        height: i32,
        flags: WindowFlags,
    ) -> Self::Window;
    /// Destroy a window
    fn destroy_window(&self, window: Self::Window);
    /// Client area size
    fn window_size(&self, window: Self::Window) -> (i32, i32);
    /// Resize the client area
    fn set_window_size(&self, window: Self::Window, width: i32, height: i32);
    /// Numeric window id
    fn window_id(&self, window: Self::Window) -> u32;
    /// Current window flags
    fn window_flags(&self, window: Self::Window) -> WindowFlags;
    /// Change the title
    fn set_window_title(&self, window: Self::Window, title: &str);
    /// Current title
    fn window_title(&self, window: Self::Window) -> String;
    /// Make visible
    fn show_window(&self, window: Self::Window);
    /// Make invisible
    fn hide_window(&self, window: Self::Window);
    /// Raise above other windows and focus
    fn raise_window(&self, window: Self::Window);
    /// Maximize
    fn maximize_window(&self, window: Self::Window);
    /// Minimize
    fn minimize_window(&self, window: Self::Window);
    /// Restore from minimized or maximized
    fn restore_window(&self, window: Self::Window);
    /// Enter or leave fullscreen; empty flags means windowed
    fn set_window_fullscreen(&self, window: Self::Window, flags: WindowFlags) -> i32;

    // GL contexts

    /// Create a GL context for `window`
    fn gl_create_context(&self, window: Self::Window) -> Self::GlContext;
    /// Delete a GL context
    fn gl_delete_context(&self, context: Self::GlContext);
    /// Make `context` current on `window`
    fn gl_make_current(&self, window: Self::Window, context: Self::GlContext) -> i32;
    /// Swap the window's GL buffers
    fn gl_swap_window(&self, window: Self::Window);

    // Renderers

    /// Create a renderer; `index` -1 picks the first driver supporting `flags`
    fn create_renderer(&self, window: Self::Window, index: i32, flags: RendererFlags) -> Self::Renderer;
    /// Destroy a renderer
    fn destroy_renderer(&self, renderer: Self::Renderer);
    /// Driver capabilities
    fn renderer_info(&self, renderer: Self::Renderer) -> Option<RendererInfo>;
    /// Show everything rendered since the last present
    fn render_present(&self, renderer: Self::Renderer);
    /// Fill the target with the draw color
    fn render_clear(&self, renderer: Self::Renderer) -> i32;
    /// Set the draw color
    fn set_render_draw_color(&self, renderer: Self::Renderer, color: Color) -> i32;
    /// Current draw color
    fn render_draw_color(&self, renderer: Self::Renderer) -> Option<Color>;
    /// Set the blend mode used by draw calls
    fn set_render_draw_blend_mode(&self, renderer: Self::Renderer, mode: BlendMode) -> i32;
    /// Current draw blend mode
    fn render_draw_blend_mode(&self, renderer: Self::Renderer) -> Option<BlendMode>;
    /// Copy a texture; `None` rectangles mean the whole texture / target
    fn render_copy(
        &self,
        renderer: Self::Renderer,
        texture: Self::Texture,
        src: Option<Rect>,
        dst: Option<Rect>,
    ) -> i32;
    /// Copy a texture with rotation about `center` and mirroring
    fn render_copy_ex(
        &self,
        renderer: Self::Renderer,
        texture: Self::Texture,
        src: Option<Rect>,
        dst: Option<Rect>,
        angle: f64,
        center: Option<Point>,
        flip: Flip,
    ) -> i32;
    /// Draw points
    fn render_draw_points(&self, renderer: Self::Renderer, points: &[Point]) -> i32;
    /// Draw a connected polyline
    fn render_draw_lines(&self, renderer: Self::Renderer, points: &[Point]) -> i32;
    /// Draw rectangle outlines
    fn render_draw_rects(&self, renderer: Self::Renderer, rects: &[Rect]) -> i32;
    /// Fill rectangles
    fn render_fill_rects(&self, renderer: Self::Renderer, rects: &[Rect]) -> i32;
    /// Fill one rectangle; `None` fills the whole target
    fn render_fill_rect(&self, renderer: Self::Renderer, rect: Option<Rect>) -> i32;
    /// Redirect drawing to `texture`; the sentinel restores the default target
    fn set_render_target(&self, renderer: Self::Renderer, texture: Self::Texture) -> i32;
    /// Set the drawing area; `None` uses the whole target
    fn set_render_viewport(&self, renderer: Self::Renderer, rect: Option<Rect>) -> i32;
    /// Current drawing area
    fn render_viewport(&self, renderer: Self::Renderer) -> Rect;
    /// Device-independent resolution
    fn set_render_logical_size(&self, renderer: Self::Renderer, width: i32, height: i32) -> i32;
    /// Current logical size, `(0, 0)` if unset
    fn render_logical_size(&self, renderer: Self::Renderer) -> (i32, i32);
    /// Drawing scale factors
    fn set_render_scale(&self, renderer: Self::Renderer, scale_x: f32, scale_y: f32) -> i32;
    /// Current scale factors
    fn render_scale(&self, renderer: Self::Renderer) -> (f32, f32);

    // Textures

    /// Create an empty texture
    fn create_texture(
        &self,
        renderer: Self::Renderer,
        format: PixelFormat,
        access: TextureAccess,
        width: i32,
        height: i32,
    ) -> Self::Texture;
    /// Upload a surface into a new static texture
    fn create_texture_from_surface(&self, renderer: Self::Renderer, surface: Self::Surface) -> Self::Texture;
    /// Destroy a texture
    fn destroy_texture(&self, texture: Self::Texture);
    /// Texture attributes
    fn query_texture(&self, texture: Self::Texture) -> Option<TextureQuery>;
    /// Lock a streaming texture, hand its pixels and pitch to `write`, then unlock
    fn lock_texture(
        &self,
        texture: Self::Texture,
        rect: Option<Rect>,
        write: &mut dyn FnMut(&mut [u8], usize),
    ) -> i32;
    /// Set the color modulation
    fn set_texture_color_mod(&self, texture: Self::Texture, r: u8, g: u8, b: u8) -> i32;
    /// Current color modulation
    fn texture_color_mod(&self, texture: Self::Texture) -> Option<(u8, u8, u8)>;
    /// Set the alpha modulation
    fn set_texture_alpha_mod(&self, texture: Self::Texture, alpha: u8) -> i32;
    /// Current alpha modulation
    fn texture_alpha_mod(&self, texture: Self::Texture) -> Option<u8>;
    /// Set the blend mode used by copies
    fn set_texture_blend_mode(&self, texture: Self::Texture, mode: BlendMode) -> i32;
    /// Current texture blend mode
    fn texture_blend_mode(&self, texture: Self::Texture) -> Option<BlendMode>;

    // Surfaces

    /// Decode a bitmap from a stream
    fn load_bmp(&self, stream: Self::Stream, free_source: i32) -> Self::Surface;
    /// Free a surface
    fn free_surface(&self, surface: Self::Surface);
    /// Copy pixels between surfaces
    fn blit_surface(
        &self,
        src: Self::Surface,
        src_rect: Option<Rect>,
        dst: Self::Surface,
        dst_rect: Option<Rect>,
    ) -> i32;
    /// Pixel buffer layout
    fn surface_info(&self, surface: Self::Surface) -> Option<SurfaceInfo>;
    /// Hand the raw pixel rows to `read`
    fn surface_pixels(&self, surface: Self::Surface, read: &mut dyn FnMut(&[u8]));
}

/// Image decoding beyond plain bitmaps
#[cfg(feature = "image")]
pub trait ImageSystem: VideoSystem {
    /// Decode any supported image from a stream
    fn load_image(&self, stream: Self::Stream, free_source: i32) -> Self::Surface;
    /// Decode an image straight into a texture
    fn load_image_texture(&self, renderer: Self::Renderer, stream: Self::Stream, free_source: i32) -> Self::Texture;
}

/// TrueType font loading and rasterization
#[cfg(feature = "ttf")]
pub trait FontSystem: VideoSystem {
    /// Raw font handle
    type Font: RawHandle;

    /// Open a font file at a point size
    fn open_font(&self, path: &str, point_size: i32) -> Self::Font;
    /// Close a font
    fn close_font(&self, font: Self::Font);
    /// Maximum glyph height
    fn font_height(&self, font: Self::Font) -> i32;
    /// Size of `text` once rendered
    fn size_text(&self, font: Self::Font, text: &str) -> Option<(i32, i32)>;
    /// Rasterize `text` into a new surface without antialiasing
    fn render_text_solid(&self, font: Self::Font, text: &str, color: Color) -> Self::Surface;
}

/// Sample chunks, mixing channels and the music stream
#[cfg(feature = "mixer")]
pub trait MixerSystem: VideoSystem {
    /// Raw chunk handle
    type Chunk: RawHandle;
    /// Raw music handle
    type Music: RawHandle;

    /// Decode a WAVE chunk from a stream
    fn load_wav(&self, stream: Self::Stream, free_source: i32) -> Self::Chunk;
    /// Wrap an in-memory WAVE file without decoding checks
    fn quick_load_wav(&self, mem: Vec<u8>) -> Self::Chunk;
    /// Wrap raw samples in the output format
    fn quick_load_raw(&self, mem: Vec<u8>) -> Self::Chunk;
    /// Free a chunk
    fn free_chunk(&self, chunk: Self::Chunk);
    /// Play on `channel` (-1 = first free); `ticks` -1 = no time limit
    fn play_channel_timed(&self, channel: i32, chunk: Self::Chunk, loops: i32, ticks: i32) -> i32;
    /// Like [`play_channel_timed`](Self::play_channel_timed) with a fade-in
    fn fade_in_channel_timed(&self, channel: i32, chunk: Self::Chunk, loops: i32, ms: i32, ticks: i32) -> i32;
    /// Set the chunk volume; -1 only queries. Returns the previous volume
    fn volume_chunk(&self, chunk: Self::Chunk, volume: i32) -> i32;

    /// Set the number of mixing channels
    fn allocate_channels(&self, count: i32) -> i32;
    /// Reserve the first `count` channels from automatic selection
    fn reserve_channels(&self, count: i32) -> i32;
    /// Tag a channel
    fn group_channel(&self, which: i32, tag: i32) -> i32;
    /// Tag a channel range
    fn group_channels(&self, from: i32, to: i32, tag: i32) -> i32;
    /// First free channel in a group
    fn group_available(&self, tag: i32) -> i32;
    /// Channels in a group (-1 = all channels)
    fn group_count(&self, tag: i32) -> i32;
    /// Longest-playing channel in a group
    fn group_oldest(&self, tag: i32) -> i32;
    /// Most recently started channel in a group
    fn group_newer(&self, tag: i32) -> i32;
    /// Stop a channel (-1 = all)
    fn halt_channel(&self, which: i32) -> i32;
    /// Stop a group
    fn halt_group(&self, tag: i32) -> i32;
    /// Stop a channel after `ticks` milliseconds
    fn expire_channel(&self, which: i32, ticks: i32) -> i32;
    /// Fade a channel out
    fn fade_out_channel(&self, which: i32, ms: i32) -> i32;
    /// Fade a group out
    fn fade_out_group(&self, tag: i32, ms: i32) -> i32;
    /// Whether a channel is fading
    fn fading_channel(&self, which: i32) -> bool;
    /// Pause a channel (-1 = all)
    fn pause_channel(&self, which: i32);
    /// Resume a channel (-1 = all)
    fn resume_channel(&self, which: i32);
    /// Paused count, or 1/0 for a single channel
    fn paused_channels(&self, which: i32) -> i32;
    /// Playing count, or 1/0 for a single channel
    fn playing_channels(&self, which: i32) -> i32;

    /// Decode music from a stream
    fn load_music(&self, stream: Self::Stream, free_source: i32) -> Self::Music;
    /// Free music
    fn free_music(&self, music: Self::Music);
    /// Start music; `loops` -1 = forever
    fn play_music(&self, music: Self::Music, loops: i32) -> i32;
    /// Start music with a fade-in
    fn fade_in_music(&self, music: Self::Music, loops: i32, ms: i32) -> i32;
    /// Start music at `position` seconds with a fade-in
    fn fade_in_music_pos(&self, music: Self::Music, loops: i32, ms: i32, position: f64) -> i32;
    /// Decoder used by `music`
    fn music_type(&self, music: Self::Music) -> MusicType;
    /// Fade the music stream out
    fn fade_out_music(&self, ms: i32) -> i32;
    /// Stop the music stream
    fn halt_music(&self) -> i32;
    /// Pause the music stream
    fn pause_music(&self);
    /// Resume the music stream
    fn resume_music(&self);
    /// Restart the music stream from the beginning
    fn rewind_music(&self);
    /// Whether the music stream is paused
    fn paused_music(&self) -> bool;
    /// Whether the music stream is playing
    fn playing_music(&self) -> bool;
    /// Set the music volume; -1 only queries. Returns the previous volume
    fn volume_music(&self, volume: i32) -> i32;
    /// Seek the music stream to `position` seconds
    fn set_music_position(&self, position: f64) -> i32;
}

/// Log the outcome of a wrapper constructor
///
/// Success is logged at `debug`, failure at `warn` with the native error.
pub(crate) fn log_creation<V, T>(video: &V, what: &str, result: HandleResult<T>) -> HandleResult<T>
where
    V: VideoSystem + ?Sized,
{
    match &result {
        Ok(_) => log::debug!("Created {what}"),
        Err(err) => log::warn!("{err}: {}", video.last_error()),
    }
    result
}
