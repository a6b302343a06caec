//! Public rendering API
//!
//! The backend trait and the plain data types that cross it.

pub mod render_backend;

pub use render_backend::{
    BackendError, BackendResult, ClearFlags, CubeFaces, DrawMode, FramebufferHandle, GeometryData,
    GeometryHandle, PolygonMode, RenderBackend, ShaderHandle, ShaderSource, TextureHandle,
    TextureImage, UniformBufferHandle, UniformValue, VertexLayout,
};
