//! # Rendering System
//!
//! Everything between the scene graph and the GPU.
//!
//! ## Architecture
//!
//! - **api**: the [`RenderBackend`] command sink and the data that crosses it
//! - **recording**: a backend that logs commands instead of drawing
//! - **shader / material**: shared program and texture resources
//! - **lighting / uniform_buffer**: std140 blocks uploaded once per frame
//! - **camera**: first-person camera with an optional flashlight
//! - **window**: presentation surfaces (GLFW and headless)
//! - **post_processor**: optional offscreen pass
//! - **skybox**: optional cube map background
//! - **opengl**: the [`RenderBackend`] that drives a real GL 3.3 context
//!
//! Two uniform blocks are shared by every program: `Transformation` at
//! binding 0 and `LightSet` at binding 1.

pub mod api;
pub mod camera;
pub mod lighting;
pub mod material;
pub mod opengl;
pub mod post_processor;
pub mod recording;
pub mod shader;
pub mod skybox;
pub mod uniform_buffer;
pub mod window;

pub use api::{BackendError, BackendResult, RenderBackend};
pub use camera::Camera;
pub use lighting::{
    Attenuation, DirectionalLight, DirectionalLightId, LightColor, LightSet, PointLight,
    PointLightId, SpotLight, SpotLightId,
};
pub use material::{Material, Texture, TextureError};
pub use opengl::GlBackend;
pub use post_processor::PostProcessor;
pub use recording::{Command, RecordingBackend};
pub use shader::{BuiltinShader, Shader, ShaderError};
pub use skybox::{Skybox, SkyboxError};
pub use uniform_buffer::{TransformationBlock, UniformBuffer};
pub use window::{GlfwWindow, HeadlessSurface, PresentationSurface, WindowError};
