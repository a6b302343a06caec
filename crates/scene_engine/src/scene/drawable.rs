//! Renderable geometry attached to a scene node
//!
//! A [`Drawable`] pairs what should be drawn ([`DrawableSource`]) with the
//! backend geometry it was uploaded as. Until [`Drawable::load`] succeeds it
//! holds no GPU handles and the owning node is skipped during rendering.

use super::geometry::{self, MeshData, ModelData};
use crate::foundation::math::Vec3;
use crate::render::api::{BackendError, DrawMode, GeometryData, GeometryHandle, RenderBackend};
use std::rc::Rc;
use thiserror::Error;

/// Geometry upload errors
#[derive(Debug, Error)]
pub enum DrawableError {
    /// The backend rejected an upload
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An imported model had no meshes to upload
    #[error("Model has no meshes")]
    EmptyModel,

    /// Element count does not fit a draw call
    #[error("Mesh with {0} elements is too large to draw")]
    TooLarge(usize),
}

/// What a drawable draws
#[derive(Debug, Clone)]
pub enum DrawableSource {
    /// A single mesh shared between nodes
    StaticMesh(Rc<MeshData>),
    /// The built-in indexed unit box
    ProceduralBox,
    /// A pre-parsed model with one or more meshes
    ImportedModel(Rc<ModelData>),
    /// A unit box drawn in a flat color at a light's position
    LightVisualization {
        /// Marker color
        color: Vec3,
    },
}

impl DrawableSource {
    /// Marker color for light visualizations
    pub fn marker_color(&self) -> Option<Vec3> {
        match self {
            Self::LightVisualization { color } => Some(*color),
            _ => None,
        }
    }

    fn geometry(&self) -> Result<Vec<GeometryData>, DrawableError> {
        Ok(match self {
            Self::StaticMesh(mesh) => vec![mesh.to_geometry()],
            Self::ProceduralBox | Self::LightVisualization { .. } => vec![geometry::unit_box()],
            Self::ImportedModel(model) => {
                if model.meshes.is_empty() {
                    return Err(DrawableError::EmptyModel);
                }
                model.meshes.iter().map(MeshData::to_geometry).collect()
            }
        })
    }
}

/// One uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuGeometry {
    /// Backend vertex array
    pub handle: GeometryHandle,
    /// Indices or vertices submitted per draw
    pub element_count: u32,
    /// Indexed or array draw
    pub mode: DrawMode,
}

/// Drawable source plus its uploaded geometry
#[derive(Debug, Clone)]
pub struct Drawable {
    source: DrawableSource,
    geometry: Vec<GpuGeometry>,
}

impl Drawable {
    /// Create an unloaded drawable
    pub fn new(source: DrawableSource) -> Self {
        Self {
            source,
            geometry: Vec::new(),
        }
    }

    /// What this drawable draws
    pub fn source(&self) -> &DrawableSource {
        &self.source
    }

    /// Upload the source's geometry
    ///
    /// Previously uploaded geometry is released first. If any mesh fails,
    /// the meshes uploaded so far are released and the drawable stays
    /// unloaded.
    pub fn load(&mut self, backend: &mut dyn RenderBackend) -> Result<(), DrawableError> {
        self.release(backend);

        let mut uploaded = Vec::new();
        for data in self.source.geometry()? {
            match upload(backend, &data) {
                Ok(gpu) => uploaded.push(gpu),
                Err(err) => {
                    for gpu in uploaded {
                        backend.release_geometry(gpu.handle);
                    }
                    return Err(err);
                }
            }
        }

        self.geometry = uploaded;
        Ok(())
    }

    /// Whether geometry has been uploaded
    pub fn is_loaded(&self) -> bool {
        !self.geometry.is_empty()
    }

    /// Uploaded meshes
    pub fn geometry(&self) -> &[GpuGeometry] {
        &self.geometry
    }

    /// Draw mode of the first mesh
    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.geometry.first().map(|gpu| gpu.mode)
    }

    /// Bind and draw every mesh
    pub fn draw(&self, backend: &mut dyn RenderBackend) {
        for gpu in &self.geometry {
            backend.bind_geometry(gpu.handle);
            match gpu.mode {
                DrawMode::Indexed => backend.draw_elements(gpu.element_count),
                DrawMode::Arrays => backend.draw_arrays(gpu.element_count),
            }
        }
    }

    /// Free uploaded geometry
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        for gpu in self.geometry.drain(..) {
            backend.release_geometry(gpu.handle);
        }
    }
}

fn upload(backend: &mut dyn RenderBackend, data: &GeometryData) -> Result<GpuGeometry, DrawableError> {
    let count = data.element_count();
    let element_count = u32::try_from(count).map_err(|_| DrawableError::TooLarge(count))?;
    let handle = backend.create_geometry(data)?;
    let mode = if data.indices.is_some() {
        DrawMode::Indexed
    } else {
        DrawMode::Arrays
    };
    Ok(GpuGeometry {
        handle,
        element_count,
        mode,
    })
}
