//! Streams, windows, renderers, textures and surfaces

use super::resources::{
    GlContextEntry, RendererEntry, Resource, StreamData, StreamEntry, SurfaceEntry, TextureEntry, WindowEntry,
};
use super::{HeadlessSystem, ResourceKind};
use crate::handle::RawHandle;
use crate::stream::StreamOps;
use crate::system::{
    BlendMode, Color, Flip, PixelFormat, Point, Rect, RendererFlags, RendererInfo, StreamKind, SurfaceInfo,
    TextureAccess, TextureQuery, VideoSystem, WindowFlags, WindowPos,
};
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{Cursor, SeekFrom};

/// Largest texture side accepted by the headless renderer
pub const MAX_TEXTURE_SIZE: i32 = 16384;

const TEXTURE_FORMATS: [PixelFormat; 5] = [
    PixelFormat::Rgba8888,
    PixelFormat::Argb8888,
    PixelFormat::Bgra8888,
    PixelFormat::Rgb888,
    PixelFormat::Bgr888,
];

/// Translate an `fopen` mode string
fn open_options(mode: &str) -> Option<OpenOptions> {
    let mut options = OpenOptions::new();
    let mode: String = mode.chars().filter(|c| !matches!(c, 'b' | 't')).collect();
    match mode.as_str() {
        "r" => options.read(true),
        "w" => options.write(true).create(true).truncate(true),
        "a" => options.append(true).create(true),
        "r+" => options.read(true).write(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "a+" => options.read(true).append(true).create(true),
        _ => return None,
    };
    Some(options)
}

const fn has_alpha(format: PixelFormat) -> bool {
    matches!(format, PixelFormat::Rgba8888 | PixelFormat::Bgra8888 | PixelFormat::Argb8888)
}

fn to_usize(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl HeadlessSystem {
    /// The texture a renderer currently draws into, `None` for the window
    pub fn render_target(&self, renderer: u64) -> Option<u64> {
        self.with_renderer(renderer, |entry| entry.target).flatten()
    }

    /// Number of presents on a renderer
    pub fn present_count(&self, renderer: u64) -> usize {
        self.with_renderer(renderer, |entry| entry.presents).unwrap_or(0)
    }

    /// Copy of a texture's pixel rows
    pub fn texture_pixels(&self, texture: u64) -> Option<Vec<u8>> {
        self.with_texture(texture, |entry| entry.pixels.clone())
    }

    /// Number of GL buffer swaps on a window
    pub fn swap_count(&self, window: u64) -> usize {
        self.with_window(window, |entry| entry.swaps).unwrap_or(0)
    }

    fn insert_stream(&self, kind: StreamKind, data: StreamData) -> u64 {
        if self.injected_failure(ResourceKind::Stream) {
            return u64::SENTINEL;
        }
        self.insert(Resource::Stream(StreamEntry { kind, data }))
    }

    /// Read the rest of a stream for a loader, honoring `free_source`
    pub(super) fn read_source(&self, stream: u64, free_source: i32) -> Option<Vec<u8>> {
        self.last_free_source.set(Some(free_source));
        let data = self.with_stream(stream, StreamEntry::read_remaining);
        if free_source != 0 && data.is_some() {
            self.close_stream(stream);
        }
        data
    }

    pub(super) fn insert_surface(&self, surface: SurfaceEntry) -> u64 {
        if self.injected_failure(ResourceKind::Surface) {
            return u64::SENTINEL;
        }
        self.insert(Resource::Surface(surface))
    }

    /// Create a static texture holding a copy of `surface`
    pub(super) fn insert_texture_from(&self, renderer: u64, surface: &SurfaceEntry) -> u64 {
        if self.with_renderer(renderer, |_| ()).is_none() {
            return u64::SENTINEL;
        }
        if surface.width > MAX_TEXTURE_SIZE || surface.height > MAX_TEXTURE_SIZE {
            return self.fail(format!("Texture dimensions are limited to {MAX_TEXTURE_SIZE}"));
        }
        if self.injected_failure(ResourceKind::Texture) {
            return u64::SENTINEL;
        }
        self.insert(Resource::Texture(TextureEntry {
            renderer,
            format: surface.format,
            access: TextureAccess::Static,
            width: surface.width,
            height: surface.height,
            pixels: surface.packed(),
            color_mod: (255, 255, 255),
            alpha_mod: 255,
            blend: if has_alpha(surface.format) { BlendMode::Blend } else { BlendMode::None },
        }))
    }

    /// Status of a renderer-and-texture pair used by copies
    fn check_copy(&self, renderer: u64, texture: u64) -> i32 {
        let Some(owner) = self.with_texture(texture, |entry| entry.renderer) else {
            return -1;
        };
        if owner != renderer {
            self.set_error("Texture was not created with this renderer");
            return -1;
        }
        self.with_renderer(renderer, |_| 0).unwrap_or(-1)
    }

    fn renderer_status(&self, renderer: u64) -> i32 {
        self.with_renderer(renderer, |_| 0).unwrap_or(-1)
    }
}

impl VideoSystem for HeadlessSystem {
    type Window = u64;
    type Renderer = u64;
    type Texture = u64;
    type Surface = u64;
    type Stream = u64;
    type GlContext = u64;

    fn last_error(&self) -> String {
        self.last_error.borrow().clone()
    }

    fn stream_from_file(&self, path: &str, mode: &str) -> u64 {
        let Some(options) = open_options(mode) else {
            return self.fail(format!("Unknown open mode '{mode}'"));
        };
        match options.open(path) {
            Ok(file) => self.insert_stream(StreamKind::File, StreamData::Ops(Box::new(file))),
            Err(err) => self.fail(format!("Couldn't open {path}: {err}")),
        }
    }

    fn stream_from_mem(&self, mem: Vec<u8>) -> u64 {
        let cursor = Cursor::new(mem.into_boxed_slice());
        self.insert_stream(StreamKind::Memory, StreamData::Ops(Box::new(cursor)))
    }

    fn stream_from_const_mem(&self, mem: Cow<'static, [u8]>) -> u64 {
        self.insert_stream(StreamKind::MemoryReadOnly, StreamData::ReadOnly(Cursor::new(mem)))
    }

    fn stream_from_ops(&self, ops: Box<dyn StreamOps>) -> u64 {
        self.insert_stream(StreamKind::Unknown, StreamData::Ops(ops))
    }

    fn close_stream(&self, stream: u64) {
        if let Some(Resource::Stream(entry)) = self.remove(stream, ResourceKind::Stream) {
            if entry.close() < 0 {
                log::warn!("Custom stream reported an error on close");
            }
        }
    }

    fn stream_size(&self, stream: u64) -> i64 {
        self.with_stream(stream, StreamEntry::size).unwrap_or(-1)
    }

    fn stream_seek(&self, stream: u64, pos: SeekFrom) -> i64 {
        let offset = self.with_stream(stream, |entry| entry.seek(pos)).unwrap_or(-1);
        if offset < 0 {
            self.set_error("Seek outside the stream");
        }
        offset
    }

    fn stream_read(&self, stream: u64, buf: &mut [u8]) -> usize {
        self.with_stream(stream, |entry| entry.read(buf)).unwrap_or(0)
    }

    fn stream_write(&self, stream: u64, buf: &[u8]) -> usize {
        match self.with_stream(stream, |entry| entry.write(buf)) {
            Some(Some(written)) => written,
            Some(None) => {
                self.set_error("Stream is read-only");
                0
            }
            None => 0,
        }
    }

    fn stream_kind(&self, stream: u64) -> StreamKind {
        self.with_stream(stream, |entry| entry.kind).unwrap_or(StreamKind::Unknown)
    }

    fn create_window(&self, title: &str, _x: WindowPos, _y: WindowPos, width: i32, height: i32, flags: WindowFlags) -> u64 {
        if width <= 0 || height <= 0 {
            return self.fail("Window size must be positive");
        }
        if self.injected_failure(ResourceKind::Window) {
            return u64::SENTINEL;
        }
        let mut flags = flags;
        if !flags.contains(WindowFlags::HIDDEN) {
            flags.insert(WindowFlags::SHOWN);
        }
        let id = self.next_window_id.get();
        self.next_window_id.set(id + 1);
        self.insert(Resource::Window(WindowEntry {
            id,
            title: title.to_string(),
            size: (width, height),
            flags,
            renderer: None,
            swaps: 0,
        }))
    }

    fn destroy_window(&self, window: u64) {
        if let Some(Resource::Window(entry)) = self.remove(window, ResourceKind::Window) {
            log::trace!("Destroyed window {} '{}'", entry.id, entry.title);
        }
    }

    fn window_size(&self, window: u64) -> (i32, i32) {
        self.with_window(window, |entry| entry.size).unwrap_or((0, 0))
    }

    fn set_window_size(&self, window: u64, width: i32, height: i32) {
        self.with_window(window, |entry| entry.size = (width.max(1), height.max(1)));
    }

    fn window_id(&self, window: u64) -> u32 {
        self.with_window(window, |entry| entry.id).unwrap_or(0)
    }

    fn window_flags(&self, window: u64) -> WindowFlags {
        self.with_window(window, |entry| entry.flags).unwrap_or_default()
    }

    fn set_window_title(&self, window: u64, title: &str) {
        self.with_window(window, |entry| entry.title = title.to_string());
    }

    fn window_title(&self, window: u64) -> String {
        self.with_window(window, |entry| entry.title.clone()).unwrap_or_default()
    }

    fn show_window(&self, window: u64) {
        self.with_window(window, |entry| {
            entry.flags.remove(WindowFlags::HIDDEN);
            entry.flags.insert(WindowFlags::SHOWN);
        });
    }

    fn hide_window(&self, window: u64) {
        self.with_window(window, |entry| {
            entry.flags.remove(WindowFlags::SHOWN);
            entry.flags.insert(WindowFlags::HIDDEN);
        });
    }

    fn raise_window(&self, window: u64) {
        self.with_window(window, |entry| entry.flags.insert(WindowFlags::INPUT_FOCUS));
    }

    fn maximize_window(&self, window: u64) {
        self.with_window(window, |entry| {
            entry.flags.remove(WindowFlags::MINIMIZED);
            entry.flags.insert(WindowFlags::MAXIMIZED);
        });
    }

    fn minimize_window(&self, window: u64) {
        self.with_window(window, |entry| {
            entry.flags.remove(WindowFlags::MAXIMIZED);
            entry.flags.insert(WindowFlags::MINIMIZED);
        });
    }

    fn restore_window(&self, window: u64) {
        self.with_window(window, |entry| entry.flags.remove(WindowFlags::MINIMIZED | WindowFlags::MAXIMIZED));
    }

    fn set_window_fullscreen(&self, window: u64, flags: WindowFlags) -> i32 {
        if !flags.is_empty() && flags != WindowFlags::FULLSCREEN && flags != WindowFlags::FULLSCREEN_DESKTOP {
            self.set_error("Fullscreen flags must be FULLSCREEN, FULLSCREEN_DESKTOP or empty");
            return -1;
        }
        self.with_window(window, |entry| {
            entry.flags.remove(WindowFlags::FULLSCREEN_DESKTOP);
            entry.flags.insert(flags);
            0
        })
        .unwrap_or(-1)
    }

    fn gl_create_context(&self, window: u64) -> u64 {
        let Some(flags) = self.with_window(window, |entry| entry.flags) else {
            return u64::SENTINEL;
        };
        if !flags.contains(WindowFlags::OPENGL) {
            return self.fail("The specified window isn't an OpenGL window");
        }
        if self.injected_failure(ResourceKind::GlContext) {
            return u64::SENTINEL;
        }
        self.insert(Resource::GlContext(GlContextEntry { window }))
    }

    fn gl_delete_context(&self, context: u64) {
        self.remove(context, ResourceKind::GlContext);
    }

    fn gl_make_current(&self, window: u64, context: u64) -> i32 {
        let Some(owner) = self.with_gl_context(context, |entry| entry.window) else {
            return -1;
        };
        if self.with_window(window, |_| ()).is_none() {
            return -1;
        }
        if owner != window {
            self.set_error("GL context was created for another window");
            return -1;
        }
        0
    }

    fn gl_swap_window(&self, window: u64) {
        self.with_window(window, |entry| entry.swaps += 1);
    }

    fn create_renderer(&self, window: u64, index: i32, flags: RendererFlags) -> u64 {
        if index != -1 && index != 0 {
            return self.fail(format!("Invalid render driver index {index}"));
        }
        let Some((existing, output)) = self.with_window(window, |entry| (entry.renderer, entry.size)) else {
            return u64::SENTINEL;
        };
        if existing.is_some() {
            return self.fail("Renderer already associated with window");
        }
        if self.injected_failure(ResourceKind::Renderer) {
            return u64::SENTINEL;
        }
        let renderer = self.insert(Resource::Renderer(RendererEntry::new(window, output, flags)));
        self.with_window(window, |entry| entry.renderer = Some(renderer));
        renderer
    }

    fn destroy_renderer(&self, renderer: u64) {
        if let Some(Resource::Renderer(entry)) = self.remove(renderer, ResourceKind::Renderer) {
            // The window may already be gone; that is not an error
            let key = slotmap::DefaultKey::from(slotmap::KeyData::from_ffi(entry.window));
            if let Some(Resource::Window(window)) = self.objects.borrow_mut().get_mut(key) {
                window.renderer = None;
            }
        }
    }

    fn renderer_info(&self, renderer: u64) -> Option<RendererInfo> {
        self.with_renderer(renderer, |entry| RendererInfo {
            name: "headless".to_string(),
            flags: entry.flags,
            texture_formats: TEXTURE_FORMATS.to_vec(),
            max_texture_width: MAX_TEXTURE_SIZE,
            max_texture_height: MAX_TEXTURE_SIZE,
        })
    }

    fn render_present(&self, renderer: u64) {
        self.with_renderer(renderer, |entry| entry.presents += 1);
    }

    fn render_clear(&self, renderer: u64) -> i32 {
        self.renderer_status(renderer)
    }

    fn set_render_draw_color(&self, renderer: u64, color: Color) -> i32 {
        self.with_renderer(renderer, |entry| {
            entry.draw_color = color;
            0
        })
        .unwrap_or(-1)
    }

    fn render_draw_color(&self, renderer: u64) -> Option<Color> {
        self.with_renderer(renderer, |entry| entry.draw_color)
    }

    fn set_render_draw_blend_mode(&self, renderer: u64, mode: BlendMode) -> i32 {
        self.with_renderer(renderer, |entry| {
            entry.draw_blend = mode;
            0
        })
        .unwrap_or(-1)
    }

    fn render_draw_blend_mode(&self, renderer: u64) -> Option<BlendMode> {
        self.with_renderer(renderer, |entry| entry.draw_blend)
    }

    fn render_copy(&self, renderer: u64, texture: u64, _src: Option<Rect>, _dst: Option<Rect>) -> i32 {
        self.check_copy(renderer, texture)
    }

    fn render_copy_ex(
        &self,
        renderer: u64,
        texture: u64,
        _src: Option<Rect>,
        _dst: Option<Rect>,
        _angle: f64,
        _center: Option<Point>,
        _flip: Flip,
    ) -> i32 {
        self.check_copy(renderer, texture)
    }

    fn render_draw_points(&self, renderer: u64, _points: &[Point]) -> i32 {
        self.renderer_status(renderer)
    }

    fn render_draw_lines(&self, renderer: u64, _points: &[Point]) -> i32 {
        self.renderer_status(renderer)
    }

    fn render_draw_rects(&self, renderer: u64, _rects: &[Rect]) -> i32 {
        self.renderer_status(renderer)
    }

    fn render_fill_rects(&self, renderer: u64, _rects: &[Rect]) -> i32 {
        self.renderer_status(renderer)
    }

    fn render_fill_rect(&self, renderer: u64, _rect: Option<Rect>) -> i32 {
        self.renderer_status(renderer)
    }

    fn set_render_target(&self, renderer: u64, texture: u64) -> i32 {
        if texture.is_sentinel() {
            return self
                .with_renderer(renderer, |entry| {
                    entry.target = None;
                    entry.viewport = None;
                    0
                })
                .unwrap_or(-1);
        }
        let Some((owner, access)) = self.with_texture(texture, |entry| (entry.renderer, entry.access)) else {
            return -1;
        };
        if owner != renderer || access != TextureAccess::Target {
            self.set_error("Texture not created with TextureAccess::Target by this renderer");
            return -1;
        }
        self.with_renderer(renderer, |entry| {
            entry.target = Some(texture);
            entry.viewport = None;
            0
        })
        .unwrap_or(-1)
    }

    fn set_render_viewport(&self, renderer: u64, rect: Option<Rect>) -> i32 {
        self.with_renderer(renderer, |entry| {
            entry.viewport = rect;
            0
        })
        .unwrap_or(-1)
    }

    fn render_viewport(&self, renderer: u64) -> Rect {
        let Some((viewport, logical, output, target)) = self.with_renderer(renderer, |entry| {
            (entry.viewport, entry.logical_size, entry.output, entry.target)
        }) else {
            return Rect::default();
        };
        if let Some(viewport) = viewport {
            return viewport;
        }
        if logical != (0, 0) {
            return Rect::new(0, 0, logical.0, logical.1);
        }
        let (width, height) = target
            .and_then(|texture| self.with_texture(texture, |entry| (entry.width, entry.height)))
            .unwrap_or(output);
        Rect::new(0, 0, width, height)
    }

    fn set_render_logical_size(&self, renderer: u64, width: i32, height: i32) -> i32 {
        if width < 0 || height < 0 {
            self.set_error("Logical size must not be negative");
            return -1;
        }
        self.with_renderer(renderer, |entry| {
            entry.logical_size = (width, height);
            entry.viewport = None;
            0
        })
        .unwrap_or(-1)
    }

    fn render_logical_size(&self, renderer: u64) -> (i32, i32) {
        self.with_renderer(renderer, |entry| entry.logical_size).unwrap_or((0, 0))
    }

    fn set_render_scale(&self, renderer: u64, scale_x: f32, scale_y: f32) -> i32 {
        if scale_x <= 0.0 || scale_y <= 0.0 || !scale_x.is_finite() || !scale_y.is_finite() {
            self.set_error("Scale factors must be positive");
            return -1;
        }
        self.with_renderer(renderer, |entry| {
            entry.scale = (scale_x, scale_y);
            0
        })
        .unwrap_or(-1)
    }

    fn render_scale(&self, renderer: u64) -> (f32, f32) {
        self.with_renderer(renderer, |entry| entry.scale).unwrap_or((1.0, 1.0))
    }

    fn create_texture(&self, renderer: u64, format: PixelFormat, access: TextureAccess, width: i32, height: i32) -> u64 {
        if self.with_renderer(renderer, |_| ()).is_none() {
            return u64::SENTINEL;
        }
        if !(1..=MAX_TEXTURE_SIZE).contains(&width) || !(1..=MAX_TEXTURE_SIZE).contains(&height) {
            return self.fail(format!("Texture dimensions must be within 1..={MAX_TEXTURE_SIZE}"));
        }
        if matches!(format, PixelFormat::Other(_)) {
            return self.fail("Unsupported texture format");
        }
        if self.injected_failure(ResourceKind::Texture) {
            return u64::SENTINEL;
        }
        let len = to_usize(width) * to_usize(height) * format.bytes_per_pixel();
        self.insert(Resource::Texture(TextureEntry {
            renderer,
            format,
            access,
            width,
            height,
            pixels: vec![0; len],
            color_mod: (255, 255, 255),
            alpha_mod: 255,
            blend: BlendMode::None,
        }))
    }

    fn create_texture_from_surface(&self, renderer: u64, surface: u64) -> u64 {
        match self.with_surface(surface, |entry| entry.clone()) {
            Some(surface) => self.insert_texture_from(renderer, &surface),
            None => u64::SENTINEL,
        }
    }

    fn destroy_texture(&self, texture: u64) {
        if let Some(Resource::Texture(entry)) = self.remove(texture, ResourceKind::Texture) {
            let key = slotmap::DefaultKey::from(slotmap::KeyData::from_ffi(entry.renderer));
            if let Some(Resource::Renderer(renderer)) = self.objects.borrow_mut().get_mut(key) {
                if renderer.target == Some(texture) {
                    renderer.target = None;
                }
            }
        }
    }

    fn query_texture(&self, texture: u64) -> Option<TextureQuery> {
        self.with_texture(texture, |entry| TextureQuery {
            format: entry.format,
            access: entry.access,
            width: entry.width,
            height: entry.height,
        })
    }

    fn lock_texture(&self, texture: u64, rect: Option<Rect>, write: &mut dyn FnMut(&mut [u8], usize)) -> i32 {
        let Some(locked) = self.with_texture(texture, |entry| {
            if entry.access != TextureAccess::Streaming {
                return Err("Texture is not streaming");
            }
            let bounds = Rect::new(0, 0, entry.width, entry.height);
            let area = rect.unwrap_or(bounds);
            if area.intersection(&bounds) != Some(area) {
                return Err("Lock rectangle is outside the texture");
            }
            let pitch = entry.pitch();
            let bpp = entry.format.bytes_per_pixel();
            let start = to_usize(area.y) * pitch + to_usize(area.x) * bpp;
            let len = (to_usize(area.h) - 1) * pitch + to_usize(area.w) * bpp;
            Ok((std::mem::take(&mut entry.pixels), start, len, pitch))
        }) else {
            return -1;
        };
        let (mut pixels, start, len, pitch) = match locked {
            Ok(locked) => locked,
            Err(message) => {
                self.set_error(message);
                return -1;
            }
        };
        // Pixels are moved out while the caller writes so the callback may
        // query this system freely
        write(&mut pixels[start..start + len], pitch);
        self.with_texture(texture, |entry| entry.pixels = pixels);
        0
    }

    fn set_texture_color_mod(&self, texture: u64, r: u8, g: u8, b: u8) -> i32 {
        self.with_texture(texture, |entry| {
            entry.color_mod = (r, g, b);
            0
        })
        .unwrap_or(-1)
    }

    fn texture_color_mod(&self, texture: u64) -> Option<(u8, u8, u8)> {
        self.with_texture(texture, |entry| entry.color_mod)
    }

    fn set_texture_alpha_mod(&self, texture: u64, alpha: u8) -> i32 {
        self.with_texture(texture, |entry| {
            entry.alpha_mod = alpha;
            0
        })
        .unwrap_or(-1)
    }

    fn texture_alpha_mod(&self, texture: u64) -> Option<u8> {
        self.with_texture(texture, |entry| entry.alpha_mod)
    }

    fn set_texture_blend_mode(&self, texture: u64, mode: BlendMode) -> i32 {
        self.with_texture(texture, |entry| {
            entry.blend = mode;
            0
        })
        .unwrap_or(-1)
    }

    fn texture_blend_mode(&self, texture: u64) -> Option<BlendMode> {
        self.with_texture(texture, |entry| entry.blend)
    }

    fn load_bmp(&self, stream: u64, free_source: i32) -> u64 {
        let Some(data) = self.read_source(stream, free_source) else {
            return u64::SENTINEL;
        };
        if !data.starts_with(b"BM") {
            return self.fail("File is not a Windows BMP file");
        }
        self.decode_bitmap(&data)
    }

    fn free_surface(&self, surface: u64) {
        self.remove(surface, ResourceKind::Surface);
    }

    fn blit_surface(&self, src: u64, src_rect: Option<Rect>, dst: u64, dst_rect: Option<Rect>) -> i32 {
        let Some(source) = self.with_surface(src, |entry| entry.clone()) else {
            return -1;
        };
        let Some(dst_format) = self.with_surface(dst, |entry| entry.format) else {
            return -1;
        };
        if source.format != dst_format {
            self.set_error("Blit between different pixel formats is not supported");
            return -1;
        }
        let Some(area) = src_rect.unwrap_or_else(|| source.bounds()).intersection(&source.bounds()) else {
            return 0;
        };
        let origin = dst_rect.map_or(Point::new(0, 0), |rect| Point::new(rect.x, rect.y));
        self.with_surface(dst, |target| {
            let Some(clipped) = Rect::new(origin.x, origin.y, area.w, area.h).intersection(&target.bounds()) else {
                return;
            };
            let bpp = target.format.bytes_per_pixel();
            let (src_pitch, dst_pitch) = (source.pitch(), target.pitch());
            let src_x = to_usize(area.x + (clipped.x - origin.x));
            let src_y = to_usize(area.y + (clipped.y - origin.y));
            let row = to_usize(clipped.w) * bpp;
            for line in 0..to_usize(clipped.h) {
                let from = (src_y + line) * src_pitch + src_x * bpp;
                let to = (to_usize(clipped.y) + line) * dst_pitch + to_usize(clipped.x) * bpp;
                target.pixels[to..to + row].copy_from_slice(&source.pixels[from..from + row]);
            }
        })
        .map_or(-1, |()| 0)
    }

    fn surface_info(&self, surface: u64) -> Option<SurfaceInfo> {
        self.with_surface(surface, |entry| SurfaceInfo {
            width: entry.width,
            height: entry.height,
            pitch: i32::try_from(entry.pitch()).unwrap_or(i32::MAX),
            format: entry.format,
        })
    }

    fn surface_pixels(&self, surface: u64, read: &mut dyn FnMut(&[u8])) {
        if let Some(pixels) = self.with_surface(surface, |entry| entry.pixels.clone()) {
            read(&pixels);
        }
    }
}

#[cfg(not(feature = "image"))]
impl HeadlessSystem {
    fn decode_bitmap(&self, _data: &[u8]) -> u64 {
        self.fail("BMP decoding requires the image feature")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_modes() {
        assert!(open_options("rb").is_some());
        assert!(open_options("w+").is_some());
        assert!(open_options("a+b").is_some());
        assert!(open_options("x").is_none());
    }

    #[test]
    fn test_surface_fill_pattern() {
        let surface = SurfaceEntry::filled(2, 1, PixelFormat::Rgb24, &[1, 2, 3]);
        assert_eq!(surface.pixels, vec![1, 2, 3, 1, 2, 3, 0, 0]);
        assert_eq!(surface.pitch(), 8);
        assert_eq!(surface.packed(), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_texture_from_padded_surface_is_packed() {
        let video = HeadlessSystem::new();
        let window = video.create_window("w", WindowPos::Undefined, WindowPos::Undefined, 10, 10, WindowFlags::empty());
        let renderer = video.create_renderer(window, -1, RendererFlags::default());
        let surface = SurfaceEntry::filled(3, 2, PixelFormat::Rgb24, &[4, 5, 6]);
        assert_eq!(surface.pixels.len(), 24);

        let texture = video.insert_texture_from(renderer, &surface);
        let pixels = video.texture_pixels(texture).unwrap();
        assert_eq!(pixels.len(), 18);
        assert!(pixels.chunks(3).all(|pixel| pixel == [4, 5, 6]));

        video.destroy_texture(texture);
        video.destroy_renderer(renderer);
        video.destroy_window(window);
    }

    #[test]
    fn test_destroying_window_detaches_nothing_else() {
        let video = HeadlessSystem::new();
        let window = video.create_window("w", WindowPos::Undefined, WindowPos::Undefined, 10, 10, WindowFlags::empty());
        let renderer = video.create_renderer(window, -1, RendererFlags::default());
        video.destroy_window(window);
        assert_eq!(video.render_clear(renderer), 0);
        video.destroy_renderer(renderer);
        assert_eq!(video.invalid_releases(), 0);
    }

    #[test]
    fn test_destroyed_renderer_frees_window_slot() {
        let video = HeadlessSystem::new();
        let window = video.create_window("w", WindowPos::Undefined, WindowPos::Undefined, 10, 10, WindowFlags::empty());
        let first = video.create_renderer(window, -1, RendererFlags::default());
        video.destroy_renderer(first);
        let second = video.create_renderer(window, 0, RendererFlags::SOFTWARE);
        assert!(!second.is_sentinel());
        assert!(video.create_renderer(window, 3, RendererFlags::default()).is_sentinel());
        video.render_present(second);
        assert_eq!(video.present_count(second), 1);
    }

    #[test]
    fn test_bad_handles_report_errors() {
        let video = HeadlessSystem::new();
        assert_eq!(video.render_clear(12345), -1);
        assert!(video.last_error().contains("renderer"));
        assert_eq!(video.stream_size(7), -1);
    }
}
