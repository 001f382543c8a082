//! Exercise every handle wrapper on the headless backend
//!
//! Usage: `handles_demo [config.toml|config.ron]`
//!
//! Each scenario creates its resources, uses them and drops them. The
//! backend's statistics are printed at the end; any live resource left
//! over is a leak and makes the demo exit with an error.

use log::{info, warn};
use media_handles::foundation::logging;
use media_handles::gl::consts as gl;
use media_handles::prelude::*;
use std::error::Error;
use std::rc::Rc;

const VERTEX_SOURCE: &str = "#version 330 core
layout(location = 0) in vec2 position;
void main() { gl_Position = vec4(position, 0.0, 1.0); }
";

const FRAGMENT_SOURCE: &str = "#version 330 core
out vec4 color;
void main() { color = vec4(1.0, 0.5, 0.2, 1.0); }
";

fn load_config() -> Result<LibraryConfig, Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => LibraryConfig::load_from_file(&path)?,
        None => LibraryConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn video_scenario(system: &Rc<HeadlessSystem>, config: &LibraryConfig) -> Result<(), Box<dyn Error>> {
    let mut window = Window::from_config(system, &config.window)?;
    let renderer = window.make_renderer(config.renderer.flags)?;
    info!("Window {} is {}x{}", window.id(), window.width(), window.height());

    let streaming = renderer.make_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 64, 64)?;
    let locked = streaming.with_lock(None, |pixels, pitch| {
        for (row, line) in pixels.chunks_mut(pitch).enumerate() {
            line.fill(u8::try_from(row * 4).unwrap_or(u8::MAX));
        }
    });
    if !locked {
        warn!("Locking the streaming texture failed: {}", system.last_error());
    }

    let target = renderer.make_texture(PixelFormat::Rgba8888, TextureAccess::Target, 128, 128)?;
    renderer.set_target(Some(&target));
    renderer.set_draw_color(Color::rgb(20, 20, 40));
    renderer.clear();
    renderer.render_at(&streaming, 32, 32);
    renderer.set_target(None);

    renderer.set_draw_color(Color::rgb(0, 0, 0));
    renderer.clear();
    renderer.render(&target, None, Some(Rect::new(0, 0, 256, 256)));
    renderer.draw_line(Point::new(0, 0), Point::new(window.width(), window.height()));
    renderer.present();

    drop(target);
    drop(streaming);
    // The window only observes its renderer
    drop(renderer);
    if window.renderer().upgrade().is_none() {
        info!("Renderer released, window {} keeps running", window.id());
    }
    Ok(())
}

fn text_scenario(system: &Rc<HeadlessSystem>, font_path: &str) -> Result<(), Box<dyn Error>> {
    let mut window = Window::with_defaults(system, "text")?;
    let renderer = window.make_renderer(RendererFlags::default())?;
    let font = TrueTypeFont::open(system, font_path, 18)?;

    let surface = Surface::from_text("media handles", &font, Color::rgb(255, 255, 255))?;
    let texture = renderer.texture_from_surface(&surface)?;
    info!("Rendered text into a {}x{} texture", texture.width(), texture.height());
    renderer.render_at(&texture, 10, 10);
    renderer.present();
    Ok(())
}

fn stream_scenario(system: &Rc<HeadlessSystem>) -> Result<(), Box<dyn Error>> {
    let stream = Stream::from_mem(system, b"not an image".to_vec())?;
    match Surface::from_bitmap(&stream) {
        Ok(_) => warn!("Garbage decoded as a bitmap"),
        Err(err) => info!("{err}: {}", system.last_error()),
    }
    // Loaders never close the caller's stream
    info!("Stream still open, {} bytes", stream.size());
    Ok(())
}

fn audio_scenario(system: &Rc<HeadlessSystem>, config: &LibraryConfig) -> Result<(), Box<dyn Error>> {
    let channels = AudioChannels::new(system);
    channels.allocate(config.audio.channels);
    channels.reserve(config.audio.reserved);

    let mut wav = b"RIFF\x24\0\0\0WAVEfmt ".to_vec();
    wav.resize(64, 0);
    let chunk = AudioChunk::quick_load_wav(system, wav)?;
    chunk.set_volume(config.audio.volume);
    let channel = chunk.play(-1, 0, -1);
    info!("Chunk playing on channel {channel} of {}", channels.total());

    let music_stream = Stream::from_const_mem(system, &b"OggS\0\x02music"[..])?;
    let music = Music::from_stream(&music_stream)?;
    let playback = MusicPlayback::new(system);
    music.play(-1);
    info!("Music ({:?}) playing: {}", music.music_type(), playback.is_playing());
    playback.halt();
    channels.halt(-1);
    Ok(())
}

fn gl_scenario(system: &Rc<HeadlessSystem>) -> Result<(), Box<dyn Error>> {
    let window = Window::new(
        system,
        "gl",
        640,
        480,
        WindowPos::Centered,
        WindowPos::Centered,
        WindowFlags::OPENGL,
    )?;
    let context = window.make_gl_context()?;
    context.make_current(&window);

    let vertex = Shader::with_source(system, gl::VERTEX_SHADER, VERTEX_SOURCE)?;
    let fragment = Shader::with_source(system, gl::FRAGMENT_SHADER, FRAGMENT_SOURCE)?;
    let program = Program::with_shaders(system, &[&vertex, &fragment])?;
    if !program.is_linked() {
        return Err(format!("Program failed to link: {}", program.info_log()).into());
    }
    program.use_program();

    let vertices: [f32; 6] = [-0.5, -0.5, 0.5, -0.5, 0.0, 0.5];
    let vertex_array = VertexArray::new(system)?;
    let buffer = Buffer::new(system)?;
    vertex_array.bind(0);
    buffer.bind(gl::ARRAY_BUFFER);
    Buffer::data(system.as_ref(), gl::ARRAY_BUFFER, &vertices, gl::STATIC_DRAW);
    VertexArray::attrib_pointer(system.as_ref(), 0, 2, gl::FLOAT, false, 0, 0);
    vertex_array.enable_attrib(0);
    info!(
        "Uploaded {} bytes of vertices",
        Buffer::parameter_i(system.as_ref(), gl::ARRAY_BUFFER, gl::BUFFER_SIZE)
    );

    let texture = GlTexture::new(system)?;
    texture.bind(gl::TEXTURE_2D);
    GlTexture::set_parameter_i(system.as_ref(), gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR);
    GlTexture::image_2d(system.as_ref(), gl::TEXTURE_2D, 0, gl::RGBA8, 2, 2, gl::RGBA, gl::UNSIGNED_BYTE, Some(&[255u8; 16][..]));

    Program::disuse(system.as_ref());
    window.swap_window();

    let error = system.get_error();
    if error != gl::NO_ERROR {
        warn!("GL error {error:#06x}");
    }
    Ok(())
}

fn report(system: &HeadlessSystem) -> Result<(), Box<dyn Error>> {
    for kind in ResourceKind::ALL {
        let stats = system.stats(kind);
        if stats.created > 0 {
            info!("{kind}: {} created, {} destroyed", stats.created, stats.destroyed);
        }
    }
    if system.invalid_releases() > 0 {
        return Err(format!("{} invalid releases", system.invalid_releases()).into());
    }
    let leaks = system.leaks();
    if !leaks.is_empty() {
        return Err(format!("Leaked resources: {leaks:?}").into());
    }
    info!("Every handle was released exactly once");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.logging.level);
    info!("Starting handles demo");

    let system = Rc::new(HeadlessSystem::new());
    let font_path = std::env::current_exe()?;

    video_scenario(&system, &config)?;
    text_scenario(&system, &font_path.to_string_lossy())?;
    stream_scenario(&system)?;
    audio_scenario(&system, &config)?;
    gl_scenario(&system)?;

    report(&system)
}
