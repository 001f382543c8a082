//! Windows, 2D rendering and software surfaces
//!
//! Ownership map:
//!
//! ```text
//! Window ──make_renderer──▶ Rc<Renderer> ──make_texture──▶ Texture
//!   │  (keeps a Weak)            ▲
//!   │                             └── texture_from_surface ◀── Surface
//!   └──make_gl_context──▶ GlContext
//! ```
//!
//! Every arrow is a plain constructor: the product owns its own native
//! handle and is dropped independently. Destroying a parent before its
//! products is the caller's responsibility.

mod gl_context;
mod renderer;
mod surface;
mod texture;
mod window;

pub use gl_context::GlContext;
pub use renderer::Renderer;
pub use surface::Surface;
pub use texture::Texture;
pub use window::Window;
