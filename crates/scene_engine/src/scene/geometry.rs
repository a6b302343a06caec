//! CPU-side geometry
//!
//! Vertex and mesh types plus the procedural shapes the engine builds
//! itself.

use crate::render::api::{GeometryData, VertexLayout};
use bytemuck::{Pod, Zeroable};

/// Interleaved vertex with position, normal and texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Triangle mesh with optional index list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    /// Vertex list
    pub vertices: Vec<Vertex>,
    /// Triangle indices; `None` draws vertices in order
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    /// Indexed mesh
    pub fn indexed(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    /// Non-indexed mesh
    pub fn arrays(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    /// Upload form of this mesh
    pub fn to_geometry(&self) -> GeometryData {
        GeometryData {
            vertices: bytemuck::cast_slice(&self.vertices).to_vec(),
            layout: VertexLayout::PositionNormalUv,
            indices: self.indices.clone(),
        }
    }
}

/// Pre-parsed multi-mesh model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelData {
    /// Meshes, drawn in order
    pub meshes: Vec<MeshData>,
}

/// Unit box centred on the origin, positions only, indexed
pub fn unit_box() -> GeometryData {
    #[rustfmt::skip]
    let vertices = vec![
         0.5,  0.5,  0.5,
        -0.5,  0.5,  0.5,
        -0.5,  0.5, -0.5,
         0.5,  0.5, -0.5,
         0.5, -0.5,  0.5,
        -0.5, -0.5,  0.5,
        -0.5, -0.5, -0.5,
         0.5, -0.5, -0.5,
    ];
    #[rustfmt::skip]
    let indices = vec![
        1, 3, 0,  1, 2, 3,
        2, 7, 3,  2, 6, 7,
        6, 4, 7,  6, 5, 4,
        5, 0, 4,  5, 1, 0,
        3, 4, 0,  3, 7, 4,
        1, 6, 2,  1, 5, 6,
    ];
    GeometryData {
        vertices,
        layout: VertexLayout::Position,
        indices: Some(indices),
    }
}

/// Unit cube with per-face normals and texture coordinates, 36 vertices
pub fn textured_cube() -> MeshData {
    // (normal, tangent u, tangent v) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];
    const CORNERS: [[f32; 2]; 6] = [
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [0.0, 0.0],
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u_axis, v_axis) in FACES {
        for [u, v] in CORNERS {
            let position = std::array::from_fn(|i| {
                0.5 * normal[i] + (u - 0.5) * u_axis[i] + (v - 0.5) * v_axis[i]
            });
            vertices.push(Vertex::new(position, normal, [u, v]));
        }
    }
    MeshData::arrays(vertices)
}

/// Two-triangle quad covering clip space
pub fn screen_quad() -> GeometryData {
    #[rustfmt::skip]
    let vertices = vec![
        -1.0,  1.0,  0.0, 1.0,
        -1.0, -1.0,  0.0, 0.0,
         1.0, -1.0,  1.0, 0.0,
        -1.0,  1.0,  0.0, 1.0,
         1.0, -1.0,  1.0, 0.0,
         1.0,  1.0,  1.0, 1.0,
    ];
    GeometryData {
        vertices,
        layout: VertexLayout::ScreenQuad,
        indices: None,
    }
}
