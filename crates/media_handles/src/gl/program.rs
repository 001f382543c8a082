//! Program objects

use super::consts::{LINK_STATUS, TRUE};
use super::{log_gl_creation, GlApi, Shader};
use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use std::rc::Rc;

/// Owned program object
pub struct Program<G: GlApi> {
    handle: SystemHandle<G, u32>,
}

impl<G: GlApi> Program<G> {
    /// Create an empty program
    ///
    /// Fails if the driver returns `0` or a name that is not a program.
    pub fn new(gl: &Rc<G>) -> HandleResult<Self> {
        let handle = acquire(
            |()| {
                let name = gl.create_program();
                if gl.is_program(name) {
                    name
                } else {
                    0
                }
            },
            "Making GL program failed",
            (),
            SystemRelease::new(Rc::clone(gl), G::delete_program),
        );
        log_gl_creation(gl.as_ref(), "program", handle).map(|handle| Self { handle })
    }

    /// Attach `shaders`, link, then detach them again
    ///
    /// Link errors do not fail construction; check
    /// [`is_linked`](Self::is_linked) and [`info_log`](Self::info_log).
    pub fn with_shaders(gl: &Rc<G>, shaders: &[&Shader<G>]) -> HandleResult<Self> {
        let program = Self::new(gl)?;
        for shader in shaders {
            program.attach(shader);
        }
        program.link();
        for shader in shaders {
            program.detach(shader);
        }
        Ok(program)
    }

    /// The program name
    pub fn raw(&self) -> u32 {
        self.handle.get()
    }

    fn gl(&self) -> &G {
        self.handle.releaser().system()
    }

    /// Attach a shader
    pub fn attach(&self, shader: &Shader<G>) {
        self.gl().attach_shader(self.raw(), shader.raw());
    }

    /// Detach a shader
    pub fn detach(&self, shader: &Shader<G>) {
        self.gl().detach_shader(self.raw(), shader.raw());
    }

    /// Link the attached shaders
    pub fn link(&self) {
        self.gl().link_program(self.raw());
    }

    /// Whether the last link succeeded
    pub fn is_linked(&self) -> bool {
        self.get_iv(LINK_STATUS) == TRUE
    }

    /// Install as part of the current rendering state
    pub fn use_program(&self) {
        self.gl().use_program(self.raw());
    }

    /// Uninstall whatever program is current
    pub fn disuse(gl: &G) {
        gl.use_program(0);
    }

    /// Query a program parameter
    pub fn get_iv(&self, pname: u32) -> i32 {
        self.gl().get_program_iv(self.raw(), pname)
    }

    /// Linker output from the last link
    pub fn info_log(&self) -> String {
        self.gl().get_program_info_log(self.raw())
    }
}

impl<G: GlApi> std::fmt::Debug for Program<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("name", &self.raw()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::consts::{ATTACHED_SHADERS, FRAGMENT_SHADER, VERTEX_SHADER};
    use crate::headless::{HeadlessSystem, ResourceKind};

    fn shaders(gl: &Rc<HeadlessSystem>) -> (Shader<HeadlessSystem>, Shader<HeadlessSystem>) {
        let vertex = Shader::with_source(gl, VERTEX_SHADER, "void main() { gl_Position = vec4(1.0); }").unwrap();
        let fragment = Shader::with_source(gl, FRAGMENT_SHADER, "void main() {}").unwrap();
        (vertex, fragment)
    }

    #[test]
    fn test_with_shaders_links_and_detaches() {
        let gl = Rc::new(HeadlessSystem::new());
        let (vertex, fragment) = shaders(&gl);
        let program = Program::with_shaders(&gl, &[&vertex, &fragment]).unwrap();
        assert!(program.is_linked());
        assert_eq!(program.get_iv(ATTACHED_SHADERS), 0);
        assert!(program.info_log().is_empty());
    }

    #[test]
    fn test_manual_attach_and_link() {
        let gl = Rc::new(HeadlessSystem::new());
        let (vertex, fragment) = shaders(&gl);
        let program = Program::new(&gl).unwrap();
        program.attach(&vertex);
        program.attach(&fragment);
        assert_eq!(program.get_iv(ATTACHED_SHADERS), 2);
        program.link();
        assert!(program.is_linked());

        program.use_program();
        assert_eq!(gl.current_program(), program.raw());
        Program::disuse(gl.as_ref());
        assert_eq!(gl.current_program(), 0);
    }

    #[test]
    fn test_link_fails_with_uncompiled_shader() {
        let gl = Rc::new(HeadlessSystem::new());
        let broken = Shader::with_source(&gl, VERTEX_SHADER, "garbage").unwrap();
        let program = Program::with_shaders(&gl, &[&broken]).unwrap();
        assert!(!program.is_linked());
        assert!(!program.info_log().is_empty());
    }

    #[test]
    fn test_program_deleted_on_drop() {
        let gl = Rc::new(HeadlessSystem::new());
        drop(Program::new(&gl).unwrap());
        let stats = gl.stats(ResourceKind::GlProgram);
        assert_eq!((stats.created, stats.destroyed), (1, 1));
    }
}
