//! # Scene Engine
//!
//! A small real-time 3D scene graph on top of an OpenGL-style render
//! backend.
//!
//! ## Features
//!
//! - **Scene graph**: nodes with transforms that propagate to their children
//!   as additive offsets, shared shaders and materials, wireframe mode
//! - **Lighting**: fixed-capacity light set serialized to a std140 block
//!   every frame
//! - **Frame loop**: slot table of root nodes, first-person camera,
//!   data-driven input bindings, optional post-processing
//! - **OpenGL backend**: `GlBackend` drives a GLFW window's GL 3.3 context;
//!   an optional cube map skybox is drawn behind the nodes
//! - **Headless operation**: a recording backend and a scripted surface
//!   run the whole loop without a GPU
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let surface = HeadlessSurface::new(800, 600).with_frame_limit(60);
//!     let mut scene = SceneManager::new(RecordingBackend::new(), surface)?;
//!
//!     let mut cache = ResourceCache::new();
//!     let shader = cache.shader(
//!         scene.backend_mut(),
//!         &ShaderDescriptor::Builtin(BuiltinShader::LightMarker),
//!     )?;
//!     let wireframe = cache.wireframe_shader(scene.backend_mut());
//!
//!     let node = SceneNode::new(shader, wireframe).with_drawable(DrawableSource::ProceduralBox);
//!     let handle = scene.add_node(node);
//!     scene.input_mut().bind(KeyCode::Tab, TriggerMode::Pressed, Action::ToggleWireframe(handle));
//!
//!     scene.run(&mut ())?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod assets;
pub mod config;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{EngineError, FrameState, SceneManager};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{
            MaterialDescriptor, ModelDescriptor, ResourceCache, ShaderDescriptor, TextureDescriptor,
        },
        core::config::{Config, ViewerConfig},
        foundation::{
            math::{Mat4, Vec3},
            time::Timer,
        },
        input::{Action, CameraMovement, KeyCode, MouseButton, MouseTarget, TriggerMode},
        render::{
            Attenuation, BuiltinShader, Camera, DirectionalLight, GlBackend, GlfwWindow,
            HeadlessSurface, LightColor, LightSet, Material, PointLight, PresentationSurface,
            RecordingBackend, RenderBackend, Skybox, SpotLight,
        },
        scene::{DrawableSource, NodeHandle, SceneNode},
        AppError, Application, EngineError, FrameState, SceneManager,
    };
}
