//! A small OpenGL state machine
//!
//! Tracks object names, bindings and the error queue closely enough for the
//! wrappers to be exercised. Shaders "compile" when their source defines
//! `main`; programs link when every attached shader compiled.

use super::{HeadlessSystem, ResourceKind};
use crate::gl::consts::{
    ARRAY_BUFFER, ATTACHED_SHADERS, BUFFER_SIZE, BUFFER_USAGE, COMPILE_STATUS, DELETE_STATUS, ELEMENT_ARRAY_BUFFER,
    FALSE, FLOAT, FRAGMENT_SHADER, INFO_LOG_LENGTH, INVALID_ENUM, INVALID_OPERATION, INVALID_VALUE, LINK_STATUS,
    NO_ERROR, SHADER_SOURCE_LENGTH, SHADER_TYPE, TEXTURE_2D, TRUE, VERTEX_ATTRIB_ARRAY_ENABLED,
    VERTEX_ATTRIB_ARRAY_INTEGER, VERTEX_ATTRIB_ARRAY_NORMALIZED, VERTEX_ATTRIB_ARRAY_SIZE, VERTEX_ATTRIB_ARRAY_STRIDE,
    VERTEX_ATTRIB_ARRAY_TYPE, VERTEX_SHADER,
};
use crate::gl::GlApi;
use std::collections::{HashMap, VecDeque};

/// Vertex attribute slots per vertex array
pub const MAX_VERTEX_ATTRIBS: usize = 16;

/// Parameters of the last `glTexImage2D` on a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlTextureUpload {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Client pixel format
    pub format: u32,
    /// Internal storage format
    pub internal_format: i32,
    /// Client bytes passed with the upload, if any
    pub pixels: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy)]
struct Attrib {
    enabled: bool,
    size: i32,
    stride: i32,
    kind: u32,
    normalized: bool,
    integer: bool,
}

impl Default for Attrib {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 4,
            stride: 0,
            kind: FLOAT,
            normalized: false,
            integer: false,
        }
    }
}

#[derive(Debug, Default)]
struct ShaderObject {
    kind: u32,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

#[derive(Debug)]
enum GlObject {
    Buffer { size: usize, usage: u32 },
    Shader(ShaderObject),
    Program(ProgramObject),
    VertexArray(Vec<Attrib>),
    Texture {
        upload: Option<GlTextureUpload>,
        parameters: HashMap<u32, i32>,
    },
}

impl GlObject {
    const fn kind(&self) -> ResourceKind {
        match self {
            Self::Buffer { .. } => ResourceKind::GlBuffer,
            Self::Shader(_) => ResourceKind::GlShader,
            Self::Program(_) => ResourceKind::GlProgram,
            Self::VertexArray(_) => ResourceKind::GlVertexArray,
            Self::Texture { .. } => ResourceKind::GlTexture,
        }
    }
}

#[derive(Debug)]
pub(super) struct GlState {
    next_name: u32,
    objects: HashMap<u32, GlObject>,
    errors: VecDeque<u32>,
    buffers: HashMap<u32, u32>,
    textures: HashMap<u32, u32>,
    vertex_array: u32,
    /// Attribute state of vertex array `0`
    default_attribs: Vec<Attrib>,
    program: u32,
}

impl Default for GlState {
    fn default() -> Self {
        Self {
            next_name: 1,
            objects: HashMap::new(),
            errors: VecDeque::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            vertex_array: 0,
            default_attribs: vec![Attrib::default(); MAX_VERTEX_ATTRIBS],
            program: 0,
        }
    }
}

impl GlState {
    /// Raise an error flag; a flag is only queued once until read
    fn error(&mut self, code: u32) {
        if !self.errors.contains(&code) {
            self.errors.push_back(code);
        }
    }

    /// Whether `name` is an object of `kind`
    fn is(&self, name: u32, kind: ResourceKind) -> bool {
        self.objects.get(&name).map(GlObject::kind) == Some(kind)
    }

    fn shader(&mut self, name: u32) -> Option<&mut ShaderObject> {
        if !self.is(name, ResourceKind::GlShader) {
            self.error(INVALID_VALUE);
            return None;
        }
        match self.objects.get_mut(&name) {
            Some(GlObject::Shader(shader)) => Some(shader),
            _ => None,
        }
    }

    fn program(&mut self, name: u32) -> Option<&mut ProgramObject> {
        if !self.is(name, ResourceKind::GlProgram) {
            self.error(INVALID_VALUE);
            return None;
        }
        match self.objects.get_mut(&name) {
            Some(GlObject::Program(program)) => Some(program),
            _ => None,
        }
    }

    fn bound_buffer(&mut self, target: u32) -> Option<(&mut usize, &mut u32)> {
        if target != ARRAY_BUFFER && target != ELEMENT_ARRAY_BUFFER {
            self.error(INVALID_ENUM);
            return None;
        }
        let name = self.buffers.get(&target).copied().unwrap_or(0);
        if !self.is(name, ResourceKind::GlBuffer) {
            self.error(INVALID_OPERATION);
            return None;
        }
        match self.objects.get_mut(&name) {
            Some(GlObject::Buffer { size, usage }) => Some((size, usage)),
            _ => None,
        }
    }

    fn bound_texture(&mut self, target: u32) -> Option<(&mut Option<GlTextureUpload>, &mut HashMap<u32, i32>)> {
        if target != TEXTURE_2D {
            self.error(INVALID_ENUM);
            return None;
        }
        let name = self.textures.get(&target).copied().unwrap_or(0);
        if !self.is(name, ResourceKind::GlTexture) {
            self.error(INVALID_OPERATION);
            return None;
        }
        match self.objects.get_mut(&name) {
            Some(GlObject::Texture { upload, parameters }) => Some((upload, parameters)),
            _ => None,
        }
    }

    /// Attribute `index` of the bound vertex array
    fn attrib(&mut self, index: u32) -> Option<&mut Attrib> {
        let Ok(index) = usize::try_from(index) else {
            self.error(INVALID_VALUE);
            return None;
        };
        if index >= MAX_VERTEX_ATTRIBS {
            self.error(INVALID_VALUE);
            return None;
        }
        let attribs = if self.vertex_array == 0 {
            &mut self.default_attribs
        } else {
            match self.objects.get_mut(&self.vertex_array) {
                Some(GlObject::VertexArray(attribs)) => attribs,
                _ => return None,
            }
        };
        attribs.get_mut(index)
    }

    /// Forget every binding of `name` after deletion
    fn unbind_everywhere(&mut self, name: u32) {
        self.buffers.retain(|_, bound| *bound != name);
        self.textures.retain(|_, bound| *bound != name);
        if self.vertex_array == name {
            self.vertex_array = 0;
        }
        if self.program == name {
            self.program = 0;
        }
        for object in self.objects.values_mut() {
            if let GlObject::Program(program) = object {
                program.attached.retain(|&shader| shader != name);
            }
        }
    }
}

fn log_length(log: &str) -> i32 {
    if log.is_empty() {
        0
    } else {
        i32::try_from(log.len() + 1).unwrap_or(i32::MAX)
    }
}

const fn gl_bool(value: bool) -> i32 {
    if value {
        TRUE
    } else {
        FALSE
    }
}

fn as_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl HeadlessSystem {
    /// Program installed by the last successful `use_program`
    pub fn current_program(&self) -> u32 {
        self.gl.borrow().program
    }

    /// Details of the last image upload to a GL texture
    pub fn gl_texture_upload(&self, name: u32) -> Option<GlTextureUpload> {
        match self.gl.borrow().objects.get(&name) {
            Some(GlObject::Texture { upload, .. }) => upload.clone(),
            _ => None,
        }
    }

    /// A texture parameter set through `tex_parameter_i`
    pub fn gl_texture_parameter(&self, name: u32, pname: u32) -> Option<i32> {
        match self.gl.borrow().objects.get(&name) {
            Some(GlObject::Texture { parameters, .. }) => parameters.get(&pname).copied(),
            _ => None,
        }
    }

    fn set_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        kind: u32,
        normalized: bool,
        integer: bool,
        stride: i32,
        offset: usize,
    ) {
        let mut gl = self.gl.borrow_mut();
        if !(1..=4).contains(&size) || stride < 0 {
            gl.error(INVALID_VALUE);
            return;
        }
        if offset != 0 && !gl.buffers.contains_key(&ARRAY_BUFFER) {
            gl.error(INVALID_OPERATION);
            return;
        }
        if let Some(attrib) = gl.attrib(index) {
            *attrib = Attrib {
                enabled: attrib.enabled,
                size,
                stride,
                kind,
                normalized,
                integer,
            };
        }
    }

    fn gl_create(&self, object: GlObject) -> u32 {
        let kind = object.kind();
        if self.injected_failure(kind) {
            return 0;
        }
        let mut gl = self.gl.borrow_mut();
        let name = gl.next_name;
        gl.next_name += 1;
        gl.objects.insert(name, object);
        drop(gl);
        self.record_created(kind);
        name
    }

    fn gl_delete(&self, name: u32, kind: ResourceKind) {
        if name == 0 {
            return;
        }
        let mut gl = self.gl.borrow_mut();
        if gl.is(name, kind) {
            gl.objects.remove(&name);
            gl.unbind_everywhere(name);
            drop(gl);
            self.record_destroyed(kind);
        } else {
            drop(gl);
            self.record_invalid_release(kind, name);
        }
    }

    /// Bind `name` after checking it names an object of `kind`
    fn gl_bind(&self, name: u32, kind: ResourceKind, bind: impl FnOnce(&mut GlState)) {
        let mut gl = self.gl.borrow_mut();
        let valid = name == 0 || gl.is(name, kind);
        if valid {
            bind(&mut gl);
        } else {
            gl.error(INVALID_OPERATION);
        }
    }
}

impl GlApi for HeadlessSystem {
    fn get_error(&self) -> u32 {
        self.gl.borrow_mut().errors.pop_front().unwrap_or(NO_ERROR)
    }

    fn gen_buffer(&self) -> u32 {
        self.gl_create(GlObject::Buffer { size: 0, usage: 0 })
    }

    fn delete_buffer(&self, name: u32) {
        self.gl_delete(name, ResourceKind::GlBuffer);
    }

    fn bind_buffer(&self, target: u32, name: u32) {
        if target != ARRAY_BUFFER && target != ELEMENT_ARRAY_BUFFER {
            self.gl.borrow_mut().error(INVALID_ENUM);
            return;
        }
        self.gl_bind(name, ResourceKind::GlBuffer, |gl| {
            if name == 0 {
                gl.buffers.remove(&target);
            } else {
                gl.buffers.insert(target, name);
            }
        });
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        if let Some((size, stored_usage)) = self.gl.borrow_mut().bound_buffer(target) {
            *size = data.len();
            *stored_usage = usage;
        }
    }

    fn get_buffer_parameter_iv(&self, target: u32, pname: u32) -> i32 {
        i32::try_from(self.get_buffer_parameter_i64v(target, pname)).unwrap_or(i32::MAX)
    }

    fn get_buffer_parameter_i64v(&self, target: u32, pname: u32) -> i64 {
        let mut gl = self.gl.borrow_mut();
        let Some((size, usage)) = gl.bound_buffer(target) else {
            return 0;
        };
        let (size, usage) = (*size, *usage);
        match pname {
            BUFFER_SIZE => i64::try_from(size).unwrap_or(i64::MAX),
            BUFFER_USAGE => i64::from(usage),
            _ => {
                gl.error(INVALID_ENUM);
                0
            }
        }
    }

    fn create_shader(&self, kind: u32) -> u32 {
        if kind != VERTEX_SHADER && kind != FRAGMENT_SHADER {
            self.gl.borrow_mut().error(INVALID_ENUM);
            return 0;
        }
        self.gl_create(GlObject::Shader(ShaderObject {
            kind,
            ..ShaderObject::default()
        }))
    }

    fn is_shader(&self, name: u32) -> bool {
        matches!(self.gl.borrow().objects.get(&name), Some(GlObject::Shader(_)))
    }

    fn delete_shader(&self, name: u32) {
        self.gl_delete(name, ResourceKind::GlShader);
    }

    fn shader_source(&self, name: u32, sources: &[&str]) {
        if let Some(shader) = self.gl.borrow_mut().shader(name) {
            shader.source = sources.concat();
        }
    }

    fn compile_shader(&self, name: u32) {
        if let Some(shader) = self.gl.borrow_mut().shader(name) {
            shader.compiled = shader.source.contains("main");
            shader.log = if shader.compiled {
                String::new()
            } else {
                "0:1(1): error: no function with name 'main'".to_string()
            };
        }
    }

    fn get_shader_source(&self, name: u32) -> String {
        self.gl
            .borrow_mut()
            .shader(name)
            .map(|shader| shader.source.clone())
            .unwrap_or_default()
    }

    fn get_shader_iv(&self, name: u32, pname: u32) -> i32 {
        let mut gl = self.gl.borrow_mut();
        let Some(shader) = gl.shader(name) else {
            return 0;
        };
        let value = match pname {
            SHADER_TYPE => Some(as_int(shader.kind)),
            DELETE_STATUS => Some(FALSE),
            COMPILE_STATUS => Some(gl_bool(shader.compiled)),
            INFO_LOG_LENGTH => Some(log_length(&shader.log)),
            SHADER_SOURCE_LENGTH => Some(log_length(&shader.source)),
            _ => None,
        };
        value.unwrap_or_else(|| {
            gl.error(INVALID_ENUM);
            0
        })
    }

    fn get_shader_info_log(&self, name: u32) -> String {
        self.gl
            .borrow_mut()
            .shader(name)
            .map(|shader| shader.log.clone())
            .unwrap_or_default()
    }

    fn create_program(&self) -> u32 {
        self.gl_create(GlObject::Program(ProgramObject::default()))
    }

    fn is_program(&self, name: u32) -> bool {
        matches!(self.gl.borrow().objects.get(&name), Some(GlObject::Program(_)))
    }

    fn delete_program(&self, name: u32) {
        self.gl_delete(name, ResourceKind::GlProgram);
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut gl = self.gl.borrow_mut();
        if gl.shader(shader).is_none() {
            return;
        }
        let Some(target) = gl.program(program) else {
            return;
        };
        if target.attached.contains(&shader) {
            gl.error(INVALID_OPERATION);
        } else {
            target.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut gl = self.gl.borrow_mut();
        let Some(target) = gl.program(program) else {
            return;
        };
        let before = target.attached.len();
        target.attached.retain(|&attached| attached != shader);
        if target.attached.len() == before {
            gl.error(INVALID_OPERATION);
        }
    }

    fn link_program(&self, program: u32) {
        let mut gl = self.gl.borrow_mut();
        let Some(attached) = gl.program(program).map(|target| target.attached.clone()) else {
            return;
        };
        let all_compiled = attached
            .iter()
            .all(|name| matches!(gl.objects.get(name), Some(GlObject::Shader(shader)) if shader.compiled));
        let log = if attached.is_empty() {
            "error: no shaders attached to the program"
        } else if all_compiled {
            ""
        } else {
            "error: linking with uncompiled shader"
        };
        if let Some(target) = gl.program(program) {
            target.linked = log.is_empty();
            target.log = log.to_string();
        }
    }

    fn use_program(&self, program: u32) {
        let mut gl = self.gl.borrow_mut();
        if program == 0 {
            gl.program = 0;
            return;
        }
        match gl.program(program).map(|target| target.linked) {
            Some(true) => gl.program = program,
            Some(false) => gl.error(INVALID_OPERATION),
            None => {}
        }
    }

    fn get_program_iv(&self, program: u32, pname: u32) -> i32 {
        let mut gl = self.gl.borrow_mut();
        let Some(target) = gl.program(program) else {
            return 0;
        };
        let value = match pname {
            DELETE_STATUS => Some(FALSE),
            LINK_STATUS => Some(gl_bool(target.linked)),
            INFO_LOG_LENGTH => Some(log_length(&target.log)),
            ATTACHED_SHADERS => Some(i32::try_from(target.attached.len()).unwrap_or(i32::MAX)),
            _ => None,
        };
        value.unwrap_or_else(|| {
            gl.error(INVALID_ENUM);
            0
        })
    }

    fn get_program_info_log(&self, program: u32) -> String {
        self.gl
            .borrow_mut()
            .program(program)
            .map(|target| target.log.clone())
            .unwrap_or_default()
    }

    fn gen_vertex_array(&self) -> u32 {
        self.gl_create(GlObject::VertexArray(vec![Attrib::default(); MAX_VERTEX_ATTRIBS]))
    }

    fn delete_vertex_array(&self, name: u32) {
        self.gl_delete(name, ResourceKind::GlVertexArray);
    }

    fn bind_vertex_array(&self, name: u32) {
        self.gl_bind(name, ResourceKind::GlVertexArray, |gl| gl.vertex_array = name);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        if let Some(attrib) = self.gl.borrow_mut().attrib(index) {
            attrib.enabled = true;
        }
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        if let Some(attrib) = self.gl.borrow_mut().attrib(index) {
            attrib.enabled = false;
        }
    }

    fn vertex_attrib_pointer(&self, index: u32, size: i32, kind: u32, normalized: bool, stride: i32, offset: usize) {
        self.set_attrib_pointer(index, size, kind, normalized, false, stride, offset);
    }

    fn vertex_attrib_i_pointer(&self, index: u32, size: i32, kind: u32, stride: i32, offset: usize) {
        self.set_attrib_pointer(index, size, kind, false, true, stride, offset);
    }

    fn get_vertex_attrib_iv(&self, index: u32, pname: u32) -> i32 {
        let mut gl = self.gl.borrow_mut();
        let Some(attrib) = gl.attrib(index).copied() else {
            return 0;
        };
        match pname {
            VERTEX_ATTRIB_ARRAY_ENABLED => gl_bool(attrib.enabled),
            VERTEX_ATTRIB_ARRAY_SIZE => attrib.size,
            VERTEX_ATTRIB_ARRAY_STRIDE => attrib.stride,
            VERTEX_ATTRIB_ARRAY_TYPE => as_int(attrib.kind),
            VERTEX_ATTRIB_ARRAY_NORMALIZED => gl_bool(attrib.normalized),
            VERTEX_ATTRIB_ARRAY_INTEGER => gl_bool(attrib.integer),
            _ => {
                gl.error(INVALID_ENUM);
                0
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn get_vertex_attrib_fv(&self, index: u32, pname: u32) -> f32 {
        self.get_vertex_attrib_iv(index, pname) as f32
    }

    fn gen_texture(&self) -> u32 {
        self.gl_create(GlObject::Texture {
            upload: None,
            parameters: HashMap::new(),
        })
    }

    fn delete_texture(&self, name: u32) {
        self.gl_delete(name, ResourceKind::GlTexture);
    }

    fn bind_texture(&self, target: u32, name: u32) {
        if target != TEXTURE_2D {
            self.gl.borrow_mut().error(INVALID_ENUM);
            return;
        }
        self.gl_bind(name, ResourceKind::GlTexture, |gl| {
            if name == 0 {
                gl.textures.remove(&target);
            } else {
                gl.textures.insert(target, name);
            }
        });
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        _kind: u32,
        pixels: Option<&[u8]>,
    ) {
        let mut gl = self.gl.borrow_mut();
        if level < 0 || width < 0 || height < 0 {
            gl.error(INVALID_VALUE);
            return;
        }
        if let Some((upload, _)) = gl.bound_texture(target) {
            if level == 0 {
                *upload = Some(GlTextureUpload {
                    width,
                    height,
                    format,
                    internal_format,
                    pixels: pixels.map(<[u8]>::to_vec),
                });
            }
        }
    }

    fn tex_parameter_i(&self, target: u32, pname: u32, param: i32) {
        if let Some((_, parameters)) = self.gl.borrow_mut().bound_texture(target) {
            parameters.insert(pname, param);
        }
    }
}
