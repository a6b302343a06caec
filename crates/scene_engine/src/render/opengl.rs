//! OpenGL 3.3 core render backend
//!
//! Maps every [`RenderBackend`] call onto the GL context owned by a
//! [`GlfwWindow`]. Entry points are loaded once through the window's
//! `get_proc_address`; after that all calls must stay on the thread the
//! context is current on.
//!
//! Our handles are small counters, not GL object names, so a released
//! resource can never alias a freshly generated GL name in a caller's eyes.

use crate::render::api::{
    BackendError, BackendResult, ClearFlags, CubeFaces, FramebufferHandle, GeometryData,
    GeometryHandle, PolygonMode, RenderBackend, ShaderHandle, ShaderSource, TextureHandle,
    TextureImage, UniformBufferHandle, UniformValue, VertexLayout,
};
use crate::render::window::GlfwWindow;
use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};
use std::collections::HashMap;
use std::ffi::{c_void, CStr, CString};
use std::ptr;

/// One vertex attribute: location, float components, float offset
type Attribute = (GLuint, GLint, usize);

const POSITION_ATTRIBUTES: &[Attribute] = &[(0, 3, 0)];
const POSITION_NORMAL_UV_ATTRIBUTES: &[Attribute] = &[(0, 3, 0), (1, 3, 3), (2, 2, 6)];
const SCREEN_QUAD_ATTRIBUTES: &[Attribute] = &[(0, 2, 0), (1, 2, 2)];

fn attributes(layout: VertexLayout) -> &'static [Attribute] {
    match layout {
        VertexLayout::Position => POSITION_ATTRIBUTES,
        VertexLayout::PositionNormalUv => POSITION_NORMAL_UV_ATTRIBUTES,
        VertexLayout::ScreenQuad => SCREEN_QUAD_ATTRIBUTES,
    }
}

/// GL target of cube face `index`, following [`CubeFaces`] order
fn cube_face_target(index: usize) -> GLenum {
    gl::TEXTURE_CUBE_MAP_POSITIVE_X + index as GLenum
}

fn gl_size(value: u32, what: &str) -> Result<GLsizei, String> {
    GLsizei::try_from(value).map_err(|_| format!("{what} {value} exceeds the GL size range"))
}

fn byte_len<T>(items: &[T]) -> Result<GLsizeiptr, String> {
    GLsizeiptr::try_from(std::mem::size_of_val(items))
        .map_err(|_| format!("{} bytes exceed the GL buffer range", std::mem::size_of_val(items)))
}

#[derive(Debug)]
struct GlGeometry {
    vao: GLuint,
    vbo: GLuint,
    ebo: Option<GLuint>,
}

#[derive(Debug)]
struct GlProgram {
    id: GLuint,
    locations: HashMap<String, GLint>,
}

#[derive(Debug, Clone, Copy)]
struct GlTexture {
    id: GLuint,
    target: GLenum,
}

#[derive(Debug)]
struct GlUniformBuffer {
    id: GLuint,
    size: usize,
}

#[derive(Debug)]
struct GlFramebuffer {
    fbo: GLuint,
    color: TextureHandle,
    depth_stencil: GLuint,
}

/// Backend driving a live OpenGL context
#[derive(Debug, Default)]
pub struct GlBackend {
    next_id: u32,
    geometries: HashMap<GeometryHandle, GlGeometry>,
    programs: HashMap<ShaderHandle, GlProgram>,
    textures: HashMap<TextureHandle, GlTexture>,
    uniform_buffers: HashMap<UniformBufferHandle, GlUniformBuffer>,
    framebuffers: HashMap<FramebufferHandle, GlFramebuffer>,
    current_program: Option<ShaderHandle>,
}

impl GlBackend {
    /// Load GL entry points from the window's current context
    pub fn load(window: &mut GlfwWindow) -> BackendResult<Self> {
        gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);
        if !gl::Viewport::is_loaded() || !gl::GenVertexArrays::is_loaded() {
            return Err(BackendError::Context(
                "OpenGL 3.3 entry points could not be loaded".to_string(),
            ));
        }

        // SAFETY: entry points were just loaded for the current context
        let version = unsafe {
            let raw = gl::GetString(gl::VERSION);
            if raw.is_null() {
                "unknown".to_string()
            } else {
                CStr::from_ptr(raw.cast()).to_string_lossy().into_owned()
            }
        };
        log::info!("OpenGL context: {}", version);

        unsafe {
            gl::Enable(gl::DEPTH_TEST);
        }
        Ok(Self::default())
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn uniform_location(&mut self, shader: ShaderHandle, name: &str) -> Option<GLint> {
        let program = self.programs.get_mut(&shader)?;
        if let Some(&location) = program.locations.get(name) {
            return Some(location);
        }
        let c_name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program.id, c_name.as_ptr()) };
        if location < 0 {
            log::trace!("Uniform '{}' is not active in program {}", name, program.id);
        }
        program.locations.insert(name.to_string(), location);
        Some(location)
    }

    fn make_current(&mut self, shader: ShaderHandle) -> bool {
        if self.current_program == Some(shader) {
            return true;
        }
        let Some(program) = self.programs.get(&shader) else {
            return false;
        };
        unsafe {
            gl::UseProgram(program.id);
        }
        self.current_program = Some(shader);
        true
    }
}

fn info_log(object: GLuint, program: bool) -> String {
    let mut length: GLint = 0;
    unsafe {
        if program {
            gl::GetProgramiv(object, gl::INFO_LOG_LENGTH, &mut length);
        } else {
            gl::GetShaderiv(object, gl::INFO_LOG_LENGTH, &mut length);
        }
    }
    let mut buffer = vec![0u8; usize::try_from(length).unwrap_or(0).max(1)];
    let mut written: GLsizei = 0;
    unsafe {
        if program {
            gl::GetProgramInfoLog(object, length, &mut written, buffer.as_mut_ptr().cast::<GLchar>());
        } else {
            gl::GetShaderInfoLog(object, length, &mut written, buffer.as_mut_ptr().cast::<GLchar>());
        }
    }
    buffer.truncate(usize::try_from(written).unwrap_or(0));
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

fn compile_stage(kind: GLenum, source: &str, label: &str) -> BackendResult<GLuint> {
    let source = CString::new(source).map_err(|_| BackendError::ShaderBuild {
        label: label.to_string(),
        log: "source contains a NUL byte".to_string(),
    })?;
    let stage = unsafe {
        let stage = gl::CreateShader(kind);
        gl::ShaderSource(stage, 1, &source.as_ptr(), ptr::null());
        gl::CompileShader(stage);
        stage
    };
    let mut status: GLint = 0;
    unsafe {
        gl::GetShaderiv(stage, gl::COMPILE_STATUS, &mut status);
    }
    if status == GLint::from(gl::FALSE) {
        let log = info_log(stage, false);
        unsafe {
            gl::DeleteShader(stage);
        }
        return Err(BackendError::ShaderBuild {
            label: label.to_string(),
            log,
        });
    }
    Ok(stage)
}

fn upload_rgba(target: GLenum, image: &TextureImage) -> Result<(), String> {
    if !image.is_consistent() {
        return Err(format!(
            "{} bytes for a {}x{} RGBA8 image",
            image.pixels.len(),
            image.width,
            image.height
        ));
    }
    let width = gl_size(image.width, "width")?;
    let height = gl_size(image.height, "height")?;
    unsafe {
        gl::TexImage2D(
            target,
            0,
            gl::RGBA8 as GLint,
            width,
            height,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            image.pixels.as_ptr().cast::<c_void>(),
        );
    }
    Ok(())
}

impl RenderBackend for GlBackend {
    fn create_geometry(&mut self, data: &GeometryData) -> BackendResult<GeometryHandle> {
        let floats = data.layout.floats_per_vertex();
        if data.vertices.is_empty() || data.vertices.len() % floats != 0 {
            return Err(BackendError::GeometryUpload(format!(
                "{} floats do not form whole {:?} vertices",
                data.vertices.len(),
                data.layout
            )));
        }
        let vertex_bytes = byte_len(&data.vertices).map_err(BackendError::GeometryUpload)?;
        let index_bytes = data
            .indices
            .as_deref()
            .map(byte_len)
            .transpose()
            .map_err(BackendError::GeometryUpload)?;
        let stride = (floats * std::mem::size_of::<f32>()) as GLsizei;

        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = None;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);
            gl::BindVertexArray(vao);

            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                vertex_bytes,
                data.vertices.as_ptr().cast::<c_void>(),
                gl::STATIC_DRAW,
            );

            if let (Some(indices), Some(bytes)) = (&data.indices, index_bytes) {
                let mut id = 0;
                gl::GenBuffers(1, &mut id);
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id);
                gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    bytes,
                    indices.as_ptr().cast::<c_void>(),
                    gl::STATIC_DRAW,
                );
                ebo = Some(id);
            }

            for &(location, components, offset) in attributes(data.layout) {
                gl::VertexAttribPointer(
                    location,
                    components,
                    gl::FLOAT,
                    gl::FALSE,
                    stride,
                    (offset * std::mem::size_of::<f32>()) as *const c_void,
                );
                gl::EnableVertexAttribArray(location);
            }
            gl::BindVertexArray(0);
        }

        let handle = GeometryHandle(self.allocate());
        self.geometries.insert(handle, GlGeometry { vao, vbo, ebo });
        Ok(handle)
    }

    fn bind_geometry(&mut self, geometry: GeometryHandle) {
        match self.geometries.get(&geometry) {
            Some(gpu) => unsafe { gl::BindVertexArray(gpu.vao) },
            None => log::warn!("Bind of unknown geometry {:?}", geometry),
        }
    }

    fn release_geometry(&mut self, geometry: GeometryHandle) {
        if let Some(gpu) = self.geometries.remove(&geometry) {
            unsafe {
                gl::DeleteVertexArrays(1, &gpu.vao);
                gl::DeleteBuffers(1, &gpu.vbo);
                if let Some(ebo) = gpu.ebo {
                    gl::DeleteBuffers(1, &ebo);
                }
            }
        }
    }

    fn create_shader(&mut self, source: &ShaderSource) -> BackendResult<ShaderHandle> {
        let label = source.label.as_str();
        let mut stages = vec![compile_stage(gl::VERTEX_SHADER, &source.vertex, label)?];
        let mut compile_rest = || -> BackendResult<()> {
            stages.push(compile_stage(gl::FRAGMENT_SHADER, &source.fragment, label)?);
            if let Some(geometry) = &source.geometry {
                stages.push(compile_stage(gl::GEOMETRY_SHADER, geometry, label)?);
            }
            Ok(())
        };
        let compiled = compile_rest();

        let linked = compiled.and_then(|()| {
            let program = unsafe {
                let program = gl::CreateProgram();
                for &stage in &stages {
                    gl::AttachShader(program, stage);
                }
                gl::LinkProgram(program);
                program
            };
            let mut status: GLint = 0;
            unsafe {
                gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
            }
            if status == GLint::from(gl::FALSE) {
                let log = info_log(program, true);
                unsafe {
                    gl::DeleteProgram(program);
                }
                return Err(BackendError::ShaderBuild {
                    label: label.to_string(),
                    log,
                });
            }
            Ok(program)
        });

        unsafe {
            for &stage in &stages {
                gl::DeleteShader(stage);
            }
        }

        let program = linked?;
        let handle = ShaderHandle(self.allocate());
        self.programs.insert(
            handle,
            GlProgram {
                id: program,
                locations: HashMap::new(),
            },
        );
        log::debug!("Linked program '{}' as GL object {}", label, program);
        Ok(handle)
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        if !self.make_current(shader) {
            log::warn!("Use of unknown shader {:?}", shader);
        }
    }

    fn set_uniform(&mut self, shader: ShaderHandle, name: &str, value: UniformValue) {
        let Some(location) = self.uniform_location(shader, name) else {
            return;
        };
        if location < 0 || !self.make_current(shader) {
            return;
        }
        unsafe {
            match value {
                UniformValue::Int(v) => gl::Uniform1i(location, v),
                UniformValue::Float(v) => gl::Uniform1f(location, v),
                UniformValue::Vec3(v) => gl::Uniform3f(location, v.x, v.y, v.z),
                // nalgebra storage is column-major, as GL expects
                UniformValue::Mat3(m) => gl::UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr()),
                UniformValue::Mat4(m) => gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr()),
            }
        }
    }

    fn bind_uniform_block(&mut self, shader: ShaderHandle, block: &str, binding: u32) {
        let Some(program) = self.programs.get(&shader) else {
            return;
        };
        let Ok(c_block) = CString::new(block) else {
            return;
        };
        unsafe {
            let index = gl::GetUniformBlockIndex(program.id, c_block.as_ptr());
            if index == gl::INVALID_INDEX {
                log::trace!("Program {} has no uniform block '{}'", program.id, block);
                return;
            }
            gl::UniformBlockBinding(program.id, index, binding);
        }
    }

    fn create_texture(&mut self, image: &TextureImage) -> BackendResult<TextureHandle> {
        let mut id = 0;
        unsafe {
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_2D, id);
        }
        if let Err(reason) = upload_rgba(gl::TEXTURE_2D, image) {
            unsafe {
                gl::DeleteTextures(1, &id);
            }
            return Err(BackendError::TextureUpload(reason));
        }
        unsafe {
            gl::GenerateMipmap(gl::TEXTURE_2D);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
            gl::TexParameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_MIN_FILTER,
                gl::LINEAR_MIPMAP_LINEAR as GLint,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
        }

        let handle = TextureHandle(self.allocate());
        self.textures.insert(
            handle,
            GlTexture {
                id,
                target: gl::TEXTURE_2D,
            },
        );
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        if let Some(gpu) = self.textures.get(&texture) {
            unsafe {
                gl::ActiveTexture(gl::TEXTURE0 + unit);
                gl::BindTexture(gpu.target, gpu.id);
            }
        }
    }

    fn create_cubemap(&mut self, faces: &CubeFaces) -> BackendResult<TextureHandle> {
        let size = faces[0].width;
        if faces
            .iter()
            .any(|face| face.width != size || face.height != size)
        {
            return Err(BackendError::TextureUpload(
                "cube map faces must be square and equally sized".to_string(),
            ));
        }

        let mut id = 0;
        unsafe {
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_CUBE_MAP, id);
        }
        for (index, face) in faces.iter().enumerate() {
            if let Err(reason) = upload_rgba(cube_face_target(index), face) {
                unsafe {
                    gl::DeleteTextures(1, &id);
                }
                return Err(BackendError::TextureUpload(reason));
            }
        }
        unsafe {
            for (parameter, value) in [
                (gl::TEXTURE_MIN_FILTER, gl::LINEAR),
                (gl::TEXTURE_MAG_FILTER, gl::LINEAR),
                (gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE),
                (gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE),
                (gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE),
            ] {
                gl::TexParameteri(gl::TEXTURE_CUBE_MAP, parameter, value as GLint);
            }
        }

        let handle = TextureHandle(self.allocate());
        self.textures.insert(
            handle,
            GlTexture {
                id,
                target: gl::TEXTURE_CUBE_MAP,
            },
        );
        Ok(handle)
    }

    fn bind_cubemap(&mut self, unit: u32, texture: TextureHandle) {
        self.bind_texture(unit, texture);
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if let Some(gpu) = self.textures.remove(&texture) {
            unsafe {
                gl::DeleteTextures(1, &gpu.id);
            }
        }
    }

    fn create_uniform_buffer(
        &mut self,
        binding: u32,
        size: usize,
    ) -> BackendResult<UniformBufferHandle> {
        let bytes = GLsizeiptr::try_from(size)
            .map_err(|_| BackendError::UniformBuffer(format!("{size} bytes is too large")))?;
        let mut id = 0;
        unsafe {
            gl::GenBuffers(1, &mut id);
            gl::BindBuffer(gl::UNIFORM_BUFFER, id);
            gl::BufferData(gl::UNIFORM_BUFFER, bytes, ptr::null(), gl::DYNAMIC_DRAW);
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
            gl::BindBufferBase(gl::UNIFORM_BUFFER, binding, id);
        }
        let handle = UniformBufferHandle(self.allocate());
        self.uniform_buffers
            .insert(handle, GlUniformBuffer { id, size });
        Ok(handle)
    }

    fn update_uniform_buffer(
        &mut self,
        buffer: UniformBufferHandle,
        bytes: &[u8],
    ) -> BackendResult<()> {
        let gpu = self
            .uniform_buffers
            .get(&buffer)
            .ok_or(BackendError::UnknownHandle {
                kind: "uniform buffer",
                id: buffer.0,
            })?;
        if bytes.len() > gpu.size {
            return Err(BackendError::UniformBuffer(format!(
                "{} bytes written to a {} byte buffer",
                bytes.len(),
                gpu.size
            )));
        }
        let length = byte_len(bytes).map_err(BackendError::UniformBuffer)?;
        unsafe {
            gl::BindBuffer(gl::UNIFORM_BUFFER, gpu.id);
            gl::BufferSubData(gl::UNIFORM_BUFFER, 0, length, bytes.as_ptr().cast::<c_void>());
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
        }
        Ok(())
    }

    fn release_uniform_buffer(&mut self, buffer: UniformBufferHandle) {
        if let Some(gpu) = self.uniform_buffers.remove(&buffer) {
            unsafe {
                gl::DeleteBuffers(1, &gpu.id);
            }
        }
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> BackendResult<(FramebufferHandle, TextureHandle)> {
        let gl_width = gl_size(width, "width").map_err(BackendError::Framebuffer)?;
        let gl_height = gl_size(height, "height").map_err(BackendError::Framebuffer)?;

        let mut fbo = 0;
        let mut color = 0;
        let mut depth_stencil = 0;
        let status = unsafe {
            gl::GenFramebuffers(1, &mut fbo);
            gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);

            gl::GenTextures(1, &mut color);
            gl::BindTexture(gl::TEXTURE_2D, color);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGB as GLint,
                gl_width,
                gl_height,
                0,
                gl::RGB,
                gl::UNSIGNED_BYTE,
                ptr::null(),
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                color,
                0,
            );

            gl::GenRenderbuffers(1, &mut depth_stencil);
            gl::BindRenderbuffer(gl::RENDERBUFFER, depth_stencil);
            gl::RenderbufferStorage(gl::RENDERBUFFER, gl::DEPTH24_STENCIL8, gl_width, gl_height);
            gl::FramebufferRenderbuffer(
                gl::FRAMEBUFFER,
                gl::DEPTH_STENCIL_ATTACHMENT,
                gl::RENDERBUFFER,
                depth_stencil,
            );

            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            status
        };

        if status != gl::FRAMEBUFFER_COMPLETE {
            unsafe {
                gl::DeleteFramebuffers(1, &fbo);
                gl::DeleteTextures(1, &color);
                gl::DeleteRenderbuffers(1, &depth_stencil);
            }
            return Err(BackendError::Framebuffer(format!(
                "status 0x{status:X} for {width}x{height}"
            )));
        }

        let texture = TextureHandle(self.allocate());
        self.textures.insert(
            texture,
            GlTexture {
                id: color,
                target: gl::TEXTURE_2D,
            },
        );
        let handle = FramebufferHandle(self.allocate());
        self.framebuffers.insert(
            handle,
            GlFramebuffer {
                fbo,
                color: texture,
                depth_stencil,
            },
        );
        Ok((handle, texture))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        let fbo = framebuffer
            .and_then(|handle| self.framebuffers.get(&handle))
            .map_or(0, |gpu| gpu.fbo);
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
        }
    }

    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if let Some(gpu) = self.framebuffers.remove(&framebuffer) {
            self.release_texture(gpu.color);
            unsafe {
                gl::DeleteRenderbuffers(1, &gpu.depth_stencil);
                gl::DeleteFramebuffers(1, &gpu.fbo);
            }
        }
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => gl::FILL,
            PolygonMode::Line => gl::LINE,
        };
        unsafe {
            gl::PolygonMode(gl::FRONT_AND_BACK, mode);
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                gl::Enable(gl::DEPTH_TEST);
            } else {
                gl::Disable(gl::DEPTH_TEST);
            }
        }
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        unsafe {
            gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]);
        }
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        unsafe {
            gl::Clear(mask);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let width = GLsizei::try_from(width).unwrap_or(GLsizei::MAX);
        let height = GLsizei::try_from(height).unwrap_or(GLsizei::MAX);
        unsafe {
            gl::Viewport(0, 0, width, height);
        }
    }

    fn draw_elements(&mut self, count: u32) {
        let count = GLsizei::try_from(count).unwrap_or(GLsizei::MAX);
        unsafe {
            gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, ptr::null());
        }
    }

    fn draw_arrays(&mut self, count: u32) {
        let count = GLsizei::try_from(count).unwrap_or(GLsizei::MAX);
        unsafe {
            gl::DrawArrays(gl::TRIANGLES, 0, count);
        }
    }
}
