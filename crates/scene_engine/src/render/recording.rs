//! Command-recording render backend
//!
//! Implements [`RenderBackend`] without a GPU by appending every call to a
//! command log. Used for headless runs and as the observation point in
//! tests: draw counts, uniform uploads and the exact uniform-block bytes
//! can all be inspected after a frame.

use crate::render::api::{
    BackendError, BackendResult, ClearFlags, CubeFaces, FramebufferHandle, GeometryData, GeometryHandle,
    PolygonMode, RenderBackend, ShaderHandle, ShaderSource, TextureHandle, TextureImage,
    UniformBufferHandle, UniformValue,
};
use std::collections::HashMap;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Geometry uploaded
    CreateGeometry {
        /// Assigned handle
        handle: GeometryHandle,
        /// Elements a draw of it submits
        element_count: usize,
    },
    /// Geometry bound
    BindGeometry(GeometryHandle),
    /// Geometry released
    ReleaseGeometry(GeometryHandle),
    /// Program built
    CreateShader {
        /// Assigned handle
        handle: ShaderHandle,
        /// Diagnostic label
        label: String,
    },
    /// Program made current
    UseShader(ShaderHandle),
    /// Uniform set
    SetUniform {
        /// Target program
        shader: ShaderHandle,
        /// Uniform name
        name: String,
        /// Value written
        value: UniformValue,
    },
    /// Uniform block pointed at a binding
    BindUniformBlock {
        /// Target program
        shader: ShaderHandle,
        /// Block name
        block: String,
        /// Binding index
        binding: u32,
    },
    /// Texture uploaded
    CreateTexture(TextureHandle),
    /// Texture bound to a unit
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Bound texture
        texture: TextureHandle,
    },
    /// Cube map uploaded
    CreateCubemap(TextureHandle),
    /// Cube map bound to a unit
    BindCubemap {
        /// Texture unit
        unit: u32,
        /// Bound cube map
        texture: TextureHandle,
    },
    /// Texture or cube map released
    ReleaseTexture(TextureHandle),
    /// Uniform buffer created
    CreateUniformBuffer {
        /// Assigned handle
        handle: UniformBufferHandle,
        /// Binding index
        binding: u32,
        /// Size in bytes
        size: usize,
    },
    /// Uniform buffer contents replaced
    UpdateUniformBuffer {
        /// Target buffer
        handle: UniformBufferHandle,
        /// Uploaded bytes
        bytes: Vec<u8>,
    },
    /// Uniform buffer released
    ReleaseUniformBuffer(UniformBufferHandle),
    /// Framebuffer created
    CreateFramebuffer(FramebufferHandle),
    /// Framebuffer bound (`None` = default)
    BindFramebuffer(Option<FramebufferHandle>),
    /// Framebuffer released
    ReleaseFramebuffer(FramebufferHandle),
    /// Fill mode changed
    PolygonMode(PolygonMode),
    /// Depth test toggled
    DepthTest(bool),
    /// Clear color changed
    ClearColor([f32; 4]),
    /// Buffers cleared
    Clear(ClearFlags),
    /// Viewport resized
    Viewport(u32, u32),
    /// Indexed draw
    DrawElements(u32),
    /// Array draw
    DrawArrays(u32),
}

/// Backend that records instead of rendering
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    next_id: u32,
    uniform_buffers: HashMap<UniformBufferHandle, (u32, usize)>,
    fail_geometry: bool,
    fail_shaders: bool,
}

impl RecordingBackend {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent geometry upload fail
    pub fn fail_geometry_uploads(&mut self, fail: bool) {
        self.fail_geometry = fail;
    }

    /// Make every subsequent shader build fail
    pub fn fail_shader_builds(&mut self, fail: bool) {
        self.fail_shaders = fail;
    }

    /// Everything recorded so far
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain the log
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Forget the log but keep handle allocation state
    pub fn clear_log(&mut self) {
        self.commands.clear();
    }

    /// Number of draw calls of either kind
    pub fn draw_call_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawElements(_) | Command::DrawArrays(_)))
            .count()
    }

    /// Most recent bytes uploaded to the buffer at `binding`
    pub fn last_upload_to_binding(&self, binding: u32) -> Option<&[u8]> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::UpdateUniformBuffer { handle, bytes }
                if self.uniform_buffers.get(handle).map(|(b, _)| *b) == Some(binding) =>
            {
                Some(bytes.as_slice())
            }
            _ => None,
        })
    }

    /// Last value written to a named uniform of any program
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::SetUniform { name: n, value, .. } if n == name => Some(*value),
            _ => None,
        })
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for RecordingBackend {
    fn create_geometry(&mut self, data: &GeometryData) -> BackendResult<GeometryHandle> {
        if self.fail_geometry {
            return Err(BackendError::GeometryUpload("injected failure".to_string()));
        }
        if data.vertices.is_empty() {
            return Err(BackendError::GeometryUpload("empty vertex buffer".to_string()));
        }
        let handle = GeometryHandle(self.allocate());
        self.commands.push(Command::CreateGeometry {
            handle,
            element_count: data.element_count(),
        });
        Ok(handle)
    }

    fn bind_geometry(&mut self, geometry: GeometryHandle) {
        self.commands.push(Command::BindGeometry(geometry));
    }

    fn release_geometry(&mut self, geometry: GeometryHandle) {
        self.commands.push(Command::ReleaseGeometry(geometry));
    }

    fn create_shader(&mut self, source: &ShaderSource) -> BackendResult<ShaderHandle> {
        if self.fail_shaders {
            return Err(BackendError::ShaderBuild {
                label: source.label.clone(),
                log: "injected failure".to_string(),
            });
        }
        let handle = ShaderHandle(self.allocate());
        self.commands.push(Command::CreateShader {
            handle,
            label: source.label.clone(),
        });
        Ok(handle)
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        self.commands.push(Command::UseShader(shader));
    }

    fn set_uniform(&mut self, shader: ShaderHandle, name: &str, value: UniformValue) {
        self.commands.push(Command::SetUniform {
            shader,
            name: name.to_string(),
            value,
        });
    }

    fn bind_uniform_block(&mut self, shader: ShaderHandle, block: &str, binding: u32) {
        self.commands.push(Command::BindUniformBlock {
            shader,
            block: block.to_string(),
            binding,
        });
    }

    fn create_texture(&mut self, image: &TextureImage) -> BackendResult<TextureHandle> {
        if !image.is_consistent() {
            return Err(BackendError::TextureUpload(format!(
                "{}x{} image with {} bytes",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }
        let handle = TextureHandle(self.allocate());
        self.commands.push(Command::CreateTexture(handle));
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.commands.push(Command::BindTexture { unit, texture });
    }

    fn create_cubemap(&mut self, faces: &CubeFaces) -> BackendResult<TextureHandle> {
        let size = faces[0].width;
        if let Some(face) = faces
            .iter()
            .position(|f| !f.is_consistent() || f.width != size || f.height != size)
        {
            return Err(BackendError::TextureUpload(format!(
                "cube face {face} is not a consistent {size}x{size} image"
            )));
        }
        let handle = TextureHandle(self.allocate());
        self.commands.push(Command::CreateCubemap(handle));
        Ok(handle)
    }

    fn bind_cubemap(&mut self, unit: u32, texture: TextureHandle) {
        self.commands.push(Command::BindCubemap { unit, texture });
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.commands.push(Command::ReleaseTexture(texture));
    }

    fn create_uniform_buffer(
        &mut self,
        binding: u32,
        size: usize,
    ) -> BackendResult<UniformBufferHandle> {
        let handle = UniformBufferHandle(self.allocate());
        self.uniform_buffers.insert(handle, (binding, size));
        self.commands.push(Command::CreateUniformBuffer {
            handle,
            binding,
            size,
        });
        Ok(handle)
    }

    fn update_uniform_buffer(
        &mut self,
        buffer: UniformBufferHandle,
        bytes: &[u8],
    ) -> BackendResult<()> {
        let (_, size) = self
            .uniform_buffers
            .get(&buffer)
            .copied()
            .ok_or(BackendError::UnknownHandle {
                kind: "uniform buffer",
                id: buffer.0,
            })?;
        if bytes.len() > size {
            return Err(BackendError::UniformBuffer(format!(
                "{} bytes do not fit a {size} byte buffer",
                bytes.len()
            )));
        }
        self.commands.push(Command::UpdateUniformBuffer {
            handle: buffer,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn release_uniform_buffer(&mut self, buffer: UniformBufferHandle) {
        self.uniform_buffers.remove(&buffer);
        self.commands.push(Command::ReleaseUniformBuffer(buffer));
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> BackendResult<(FramebufferHandle, TextureHandle)> {
        if width == 0 || height == 0 {
            return Err(BackendError::Framebuffer(format!("{width}x{height}")));
        }
        let framebuffer = FramebufferHandle(self.allocate());
        let color = TextureHandle(self.allocate());
        self.commands.push(Command::CreateFramebuffer(framebuffer));
        Ok((framebuffer, color))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.commands.push(Command::BindFramebuffer(framebuffer));
    }

    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.commands.push(Command::ReleaseFramebuffer(framebuffer));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.commands.push(Command::PolygonMode(mode));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.commands.push(Command::DepthTest(enabled));
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.commands.push(Command::ClearColor(rgba));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.commands.push(Command::Clear(flags));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.commands.push(Command::Viewport(width, height));
    }

    fn draw_elements(&mut self, count: u32) {
        self.commands.push(Command::DrawElements(count));
    }

    fn draw_arrays(&mut self, count: u32) {
        self.commands.push(Command::DrawArrays(count));
    }
}
