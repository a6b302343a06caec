//! Backend abstraction traits for the rendering system
//!
//! The scene graph never talks to a graphics API directly. Everything it
//! needs from the GPU goes through [`RenderBackend`]: a small, immediate-mode
//! command sink shaped after a classic OpenGL 3.3 core context (programs with
//! named uniforms, vertex arrays, uniform blocks bound to fixed indices,
//! polygon mode, indexed/array draws).
//!
//! Handles are opaque non-zero integers. Zero is never handed out, so a
//! zeroed handle doubles as the "not uploaded" sentinel.

use crate::foundation::math::{Mat3, Mat4, Vec3};
use bitflags::bitflags;
use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a rendering backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Shader compilation or linking failed
    #[error("Shader '{label}' failed to build: {log}")]
    ShaderBuild {
        /// Human readable shader name
        label: String,
        /// Compiler/linker output
        log: String,
    },

    /// Geometry upload was rejected
    #[error("Geometry upload failed: {0}")]
    GeometryUpload(String),

    /// Texture upload was rejected
    #[error("Texture upload failed: {0}")]
    TextureUpload(String),

    /// Uniform buffer creation or update failed
    #[error("Uniform buffer error: {0}")]
    UniformBuffer(String),

    /// Offscreen framebuffer could not be completed
    #[error("Framebuffer incomplete: {0}")]
    Framebuffer(String),

    /// The graphics context is missing or lacks required entry points
    #[error("Graphics context error: {0}")]
    Context(String),

    /// A handle that the backend does not know about
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle {
        /// Resource kind
        kind: &'static str,
        /// Raw handle value
        id: u32,
    },
}

macro_rules! backend_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// The "nothing uploaded" sentinel
            pub const NONE: Self = Self(0);

            /// Whether this handle refers to an uploaded resource
            pub fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

backend_handle!(
    /// Vertex array plus its vertex/index buffers
    GeometryHandle
);
backend_handle!(
    /// Linked shader program
    ShaderHandle
);
backend_handle!(
    /// 2D or cube map texture object
    TextureHandle
);
backend_handle!(
    /// Uniform buffer bound to a fixed binding index
    UniformBufferHandle
);
backend_handle!(
    /// Offscreen framebuffer with color and depth attachments
    FramebufferHandle
);

/// Vertex attribute layouts understood by backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `vec3 position` at location 0
    Position,
    /// `vec3 position`, `vec3 normal`, `vec2 uv` at locations 0..=2
    PositionNormalUv,
    /// `vec2 position`, `vec2 uv` for screen-space quads
    ScreenQuad,
}

impl VertexLayout {
    /// Number of floats per vertex
    pub const fn floats_per_vertex(self) -> usize {
        match self {
            Self::Position => 3,
            Self::PositionNormalUv => 8,
            Self::ScreenQuad => 4,
        }
    }
}

/// CPU-side geometry ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Interleaved vertex floats
    pub vertices: Vec<f32>,
    /// Layout of `vertices`
    pub layout: VertexLayout,
    /// Optional triangle index list
    pub indices: Option<Vec<u32>>,
}

impl GeometryData {
    /// Number of whole vertices in the buffer
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.floats_per_vertex()
    }

    /// Number of elements a draw call must submit
    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or_else(|| self.vertex_count(), Vec::len)
    }
}

/// Shader stage sources for one program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Name used in diagnostics
    pub label: String,
    /// Vertex stage
    pub vertex: String,
    /// Fragment stage
    pub fragment: String,
    /// Optional geometry stage
    pub geometry: Option<String>,
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Tightly packed RGBA8 rows
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Whether `pixels` holds exactly `width * height` RGBA8 texels
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

/// Cube map faces in GL order: +X, -X, +Y, -Y, +Z, -Z
pub type CubeFaces = [TextureImage; 6];

/// Value for a named shader uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` or sampler slot
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3(Vec3),
    /// `mat3`
    Mat3(Mat3),
    /// `mat4`
    Mat4(Mat4),
}

/// Rasterizer fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    /// Filled triangles
    Fill,
    /// Triangle edges only
    Line,
}

/// How a geometry is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Index buffer driven draw
    Indexed,
    /// Plain vertex array draw
    Arrays,
}

bitflags! {
    /// Buffers to clear at the start of a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color attachment
        const COLOR = 0b0001;
        /// Depth attachment
        const DEPTH = 0b0010;
    }
}

/// Immediate-mode GPU command sink
///
/// All calls happen on the thread that owns the graphics context.
pub trait RenderBackend {
    /// Upload geometry and return its vertex-array handle
    fn create_geometry(&mut self, data: &GeometryData) -> BackendResult<GeometryHandle>;

    /// Make a geometry current for subsequent draws
    fn bind_geometry(&mut self, geometry: GeometryHandle);

    /// Free a geometry's buffers
    fn release_geometry(&mut self, geometry: GeometryHandle);

    /// Compile and link a program
    fn create_shader(&mut self, source: &ShaderSource) -> BackendResult<ShaderHandle>;

    /// Make a program current
    fn use_shader(&mut self, shader: ShaderHandle);

    /// Set a named uniform on a program
    fn set_uniform(&mut self, shader: ShaderHandle, name: &str, value: UniformValue);

    /// Point a named uniform block of a program at a binding index
    fn bind_uniform_block(&mut self, shader: ShaderHandle, block: &str, binding: u32);

    /// Upload an RGBA8 texture
    fn create_texture(&mut self, image: &TextureImage) -> BackendResult<TextureHandle>;

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Upload six square RGBA8 faces as a cube map
    fn create_cubemap(&mut self, faces: &CubeFaces) -> BackendResult<TextureHandle>;

    /// Bind a cube map to a texture unit
    fn bind_cubemap(&mut self, unit: u32, texture: TextureHandle);

    /// Free a texture or cube map
    fn release_texture(&mut self, texture: TextureHandle);

    /// Allocate a uniform buffer of `size` bytes bound at `binding`
    fn create_uniform_buffer(&mut self, binding: u32, size: usize)
        -> BackendResult<UniformBufferHandle>;

    /// Replace the contents of a uniform buffer starting at offset zero
    fn update_uniform_buffer(&mut self, buffer: UniformBufferHandle, bytes: &[u8])
        -> BackendResult<()>;

    /// Free a uniform buffer
    fn release_uniform_buffer(&mut self, buffer: UniformBufferHandle);

    /// Create an offscreen color+depth target
    fn create_framebuffer(&mut self, width: u32, height: u32)
        -> BackendResult<(FramebufferHandle, TextureHandle)>;

    /// Redirect rendering to a framebuffer, or the default one for `None`
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    /// Free a framebuffer and its attachments
    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Set the rasterizer fill mode
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Toggle depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Set the clear color used by [`RenderBackend::clear`]
    fn set_clear_color(&mut self, rgba: [f32; 4]);

    /// Clear the selected buffers of the current framebuffer
    fn clear(&mut self, flags: ClearFlags);

    /// Resize the viewport
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draw `count` indices of the bound geometry
    fn draw_elements(&mut self, count: u32);

    /// Draw `count` vertices of the bound geometry
    fn draw_arrays(&mut self, count: u32);
}
