//! Cube map background
//!
//! Six images (right, left, top, bottom, front, back) are uploaded as one
//! cube map and drawn around the camera before any scene node. The pass
//! runs with depth testing off, so it never occludes geometry and leaves
//! the depth buffer clear for the nodes.

use crate::render::api::{
    BackendError, CubeFaces, GeometryHandle, PolygonMode, RenderBackend, TextureHandle,
    TextureImage,
};
use crate::render::material::TextureError;
use crate::render::shader::Shader;
use crate::scene::geometry;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Face file stems in upload order
pub const FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Texture unit the cube map is bound to
const SKYBOX_TEXTURE_UNIT: u32 = 0;

/// Skybox loading errors
#[derive(Debug, Error)]
pub enum SkyboxError {
    /// No file named after a face was found
    #[error("No '{face}' face in {dir:?}")]
    MissingFace {
        /// Searched directory
        dir: PathBuf,
        /// Face stem
        face: &'static str,
    },

    /// The directory could not be listed
    #[error("Failed to read skybox directory {dir:?}: {source}")]
    Io {
        /// Directory
        dir: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A face could not be decoded
    #[error(transparent)]
    Texture(#[from] TextureError),

    /// The backend rejected the cube map or the cube geometry
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The skybox program is a failed-build placeholder
    #[error("Skybox shader '{0}' is not loaded")]
    ShaderNotLoaded(String),
}

/// Cube map plus the cube it is drawn on
#[derive(Debug)]
pub struct Skybox {
    cubemap: TextureHandle,
    cube: GeometryHandle,
    cube_elements: u32,
    shader: Rc<Shader>,
}

impl Skybox {
    /// Upload decoded faces, in [`FACE_NAMES`] order
    pub fn new(
        backend: &mut dyn RenderBackend,
        shader: Rc<Shader>,
        faces: &CubeFaces,
    ) -> Result<Self, SkyboxError> {
        if !shader.is_loaded() {
            return Err(SkyboxError::ShaderNotLoaded(shader.label().to_string()));
        }
        let cube_data = geometry::unit_box();
        let cube_elements = u32::try_from(cube_data.element_count()).unwrap_or(36);
        let cubemap = backend.create_cubemap(faces)?;
        let cube = match backend.create_geometry(&cube_data) {
            Ok(cube) => cube,
            Err(err) => {
                backend.release_texture(cubemap);
                return Err(err.into());
            }
        };
        log::info!("Skybox loaded ({0}x{0} faces)", faces[0].width);
        Ok(Self {
            cubemap,
            cube,
            cube_elements,
            shader,
        })
    }

    /// Decode and upload six face files, in [`FACE_NAMES`] order
    pub fn from_files(
        backend: &mut dyn RenderBackend,
        shader: Rc<Shader>,
        paths: &[PathBuf; 6],
    ) -> Result<Self, SkyboxError> {
        let mut faces = Vec::with_capacity(6);
        for path in paths {
            faces.push(decode_face(path)?);
        }
        let faces: CubeFaces = faces
            .try_into()
            .map_err(|_| BackendError::TextureUpload("expected six cube faces".to_string()))?;
        Self::new(backend, shader, &faces)
    }

    /// Load the faces from a directory holding `right.*`, `left.*`, `top.*`,
    /// `bottom.*`, `front.*` and `back.*`
    pub fn from_directory(
        backend: &mut dyn RenderBackend,
        shader: Rc<Shader>,
        dir: &Path,
    ) -> Result<Self, SkyboxError> {
        let paths = face_paths(dir)?;
        Self::from_files(backend, shader, &paths)
    }

    /// Cube map handle
    pub fn cubemap(&self) -> TextureHandle {
        self.cubemap
    }

    /// Draw the background; call after clearing and before scene nodes
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        backend.set_depth_test(false);
        self.shader.use_program(backend);
        self.shader
            .set_int(backend, "skybox", SKYBOX_TEXTURE_UNIT as i32);
        backend.bind_cubemap(SKYBOX_TEXTURE_UNIT, self.cubemap);
        backend.set_polygon_mode(PolygonMode::Fill);
        backend.bind_geometry(self.cube);
        backend.draw_elements(self.cube_elements);
        backend.set_depth_test(true);
    }

    /// Free the cube map and the cube
    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.release_geometry(self.cube);
        backend.release_texture(self.cubemap);
    }
}

/// Resolve the six face files of a skybox directory
pub fn face_paths(dir: &Path) -> Result<[PathBuf; 6], SkyboxError> {
    let io_error = |source| SkyboxError::Io {
        dir: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut paths: [PathBuf; 6] = Default::default();
    for (slot, face) in paths.iter_mut().zip(FACE_NAMES) {
        *slot = files
            .iter()
            .find(|path| path.file_stem().and_then(|stem| stem.to_str()) == Some(face))
            .cloned()
            .ok_or_else(|| SkyboxError::MissingFace {
                dir: dir.to_path_buf(),
                face,
            })?;
    }
    Ok(paths)
}

// Cube map faces keep their top-left origin.
fn decode_face(path: &Path) -> Result<TextureImage, TextureError> {
    let decoded = image::open(path)
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    Ok(TextureImage {
        width: decoded.width(),
        height: decoded.height(),
        pixels: decoded.into_raw(),
    })
}
