//! Scene graph
//!
//! Root nodes live in the [`SceneManager`](crate::SceneManager)
//! slot table and are addressed by [`NodeHandle`]. Each root owns a tree of
//! [`SceneNode`]s that share shaders and materials through `Rc`.

pub mod drawable;
pub mod geometry;
pub mod node;
pub mod transform;

pub use drawable::{Drawable, DrawableError, DrawableSource, GpuGeometry};
pub use geometry::{MeshData, ModelData, Vertex};
pub use node::{NodeLoadError, SceneNode, MAX_MATERIALS};
pub use transform::Transform;

use crate::foundation::math::Vec3;

/// Slot index of a root node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub usize);

/// Per-frame values shared by every node render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Camera position in world space
    pub view_position: Vec3,
    /// Seconds since the previous frame
    pub delta_time: f32,
}
