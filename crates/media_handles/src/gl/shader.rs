//! Shader objects

use super::consts::{COMPILE_STATUS, TRUE};
use super::{log_gl_creation, GlApi};
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use std::path::Path;
use std::rc::Rc;

/// Owned shader object
pub struct Shader<G: GlApi> {
    handle: SystemHandle<G, u32>,
}

impl<G: GlApi> Shader<G> {
    /// Create an empty shader of `kind` (e.g. [`VERTEX_SHADER`](super::consts::VERTEX_SHADER))
    ///
    /// Fails if the driver returns `0` or a name that is not a shader.
    pub fn new(gl: &Rc<G>, kind: u32) -> HandleResult<Self> {
        let handle = acquire(
            |kind| {
                // glGetError is not consulted: earlier calls may have left errors behind
                let name = gl.create_shader(kind);
                if gl.is_shader(name) {
                    name
                } else {
                    0
                }
            },
            "Making GL shader failed",
            kind,
            SystemRelease::new(Rc::clone(gl), G::delete_shader),
        );
        log_gl_creation(gl.as_ref(), "shader", handle).map(|handle| Self { handle })
    }

    /// Create a shader, set its source and compile it
    ///
    /// Compilation errors do not fail construction; check
    /// [`is_compiled`](Self::is_compiled) and [`info_log`](Self::info_log).
    pub fn with_source(gl: &Rc<G>, kind: u32, source: &str) -> HandleResult<Self> {
        let shader = Self::new(gl, kind)?;
        shader.source(source);
        shader.compile();
        Ok(shader)
    }

    /// The shader name
    pub fn raw(&self) -> u32 {
        self.handle.get()
    }

    fn gl(&self) -> &G {
        self.handle.releaser().system()
    }

    /// Replace the source code
    pub fn source(&self, source: &str) {
        self.gl().shader_source(self.raw(), &[source]);
    }

    /// Replace the source code with the concatenation of `lines`
    pub fn source_lines<S: AsRef<str>>(&self, lines: &[S]) {
        let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        self.gl().shader_source(self.raw(), &lines);
    }

    /// Replace the source code with the contents of a file
    pub fn source_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let source = std::fs::read_to_string(path)?;
        self.source(&source);
        Ok(())
    }

    /// Compile the current source
    pub fn compile(&self) {
        self.gl().compile_shader(self.raw());
    }

    /// Whether the last compilation succeeded
    pub fn is_compiled(&self) -> bool {
        self.get_iv(COMPILE_STATUS) == TRUE
    }

    /// The current source code
    pub fn get_source(&self) -> String {
        self.gl().get_shader_source(self.raw())
    }

    /// Query a shader parameter
    pub fn get_iv(&self, pname: u32) -> i32 {
        self.gl().get_shader_iv(self.raw(), pname)
    }

    /// Compiler output from the last compilation
    pub fn info_log(&self) -> String {
        self.gl().get_shader_info_log(self.raw())
    }
}

impl<G: GlApi> std::fmt::Debug for Shader<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader").field("name", &self.raw()).finish()
    }
}
