//! # Media Handles
//!
//! Move-only owners for native multimedia handles: windows, renderers,
//! textures, surfaces, GL contexts, fonts, audio chunks, music and raw
//! OpenGL objects.
//!
//! Every wrapper holds exactly one native handle and releases it exactly
//! once, when the wrapper is dropped. Wrappers can be moved but never
//! copied. A failed native "create" call never produces a wrapper; it
//! produces a [`HandleError`] naming the operation instead.
//!
//! ## Features
//!
//! - **`image`**: decode image files into surfaces and textures
//! - **`ttf`**: TrueType fonts and text rendering
//! - **`mixer`**: audio chunks, channels and music
//! - **`gl`**: OpenGL buffers, shaders, programs, vertex arrays, textures
//!
//! ## Quick Start
//!
//! ```rust
//! use media_handles::prelude::*;
//! use std::rc::Rc;
//!
//! fn main() -> Result<(), HandleError> {
//!     let video = Rc::new(HeadlessSystem::new());
//!     let mut window = Window::with_defaults(&video, "hello")?;
//!     let renderer = window.make_renderer(RendererFlags::default())?;
//!     renderer.set_draw_color(Color::rgb(30, 30, 60));
//!     renderer.clear();
//!     renderer.present();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod error;
pub mod handle;
pub mod system;
pub mod stream;
pub mod video;

#[cfg(feature = "ttf")]
pub mod font;
#[cfg(feature = "mixer")]
pub mod audio;
#[cfg(feature = "gl")]
pub mod gl;

pub mod headless;

// Configuration and utilities
pub mod config;
pub mod core;
pub mod foundation;

pub use error::{HandleError, HandleResult};

/// Commonly used types
pub mod prelude {
    pub use crate::core::config::{AudioConfig, LibraryConfig, RendererConfig, WindowConfig};
    pub use crate::config::{Config, ConfigError};
    pub use crate::error::{HandleError, HandleResult};
    pub use crate::handle::{acquire, OwnedHandle, RawHandle, Release, SystemHandle, SystemRelease};
    pub use crate::headless::{HeadlessSystem, ResourceKind};
    pub use crate::stream::{Stream, StreamOps};
    pub use crate::system::*;
    pub use crate::video::{GlContext, Renderer, Surface, Texture, Window};

    #[cfg(feature = "mixer")]
    pub use crate::audio::{AudioChannels, AudioChunk, Music, MusicPlayback};
    #[cfg(feature = "ttf")]
    pub use crate::font::TrueTypeFont;
    #[cfg(feature = "gl")]
    pub use crate::gl::{Bindable, Buffer, GlApi, GlTexture, Program, Shader, VertexArray};
}
