//! Material system for rendering
//!
//! A material is a diffuse map, a specular map and a shininess exponent.
//! Material `i` of a node occupies texture units `2i` (diffuse) and
//! `2i + 1` (specular).

use crate::render::api::{BackendError, RenderBackend, TextureHandle, TextureImage};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Texture loading errors
#[derive(Debug, Error)]
pub enum TextureError {
    /// File missing or undecodable
    #[error("Failed to decode texture {path:?}: {source}")]
    Decode {
        /// Source file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// The backend rejected the upload
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// 2D texture living on the backend
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
}

impl Texture {
    /// Upload already decoded pixels
    pub fn from_image(
        backend: &mut dyn RenderBackend,
        image: &TextureImage,
    ) -> Result<Self, TextureError> {
        let handle = backend.create_texture(image)?;
        Ok(Self {
            handle,
            width: image.width,
            height: image.height,
        })
    }

    /// Decode a file, flip it to bottom-left origin and upload it
    pub fn from_file(backend: &mut dyn RenderBackend, path: &Path) -> Result<Self, TextureError> {
        let decoded = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .flipv()
            .to_rgba8();
        let image = TextureImage {
            width: decoded.width(),
            height: decoded.height(),
            pixels: decoded.into_raw(),
        };
        log::debug!("Decoded texture {:?} ({}x{})", path, image.width, image.height);
        Self::from_image(backend, &image)
    }

    /// Placeholder for a texture that failed to load
    pub fn unloaded() -> Self {
        Self {
            handle: TextureHandle::NONE,
            width: 0,
            height: 0,
        }
    }

    /// Whether the texture exists on the backend
    pub fn is_loaded(&self) -> bool {
        self.handle.is_valid()
    }

    /// Backend handle
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Pixel dimensions
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bind to a texture unit; unloaded textures bind nothing
    pub fn bind_at(&self, backend: &mut dyn RenderBackend, unit: u32) {
        if self.is_loaded() {
            backend.bind_texture(unit, self.handle);
        }
    }
}

/// Surface properties of a mesh
#[derive(Debug, Clone)]
pub struct Material {
    /// Diffuse color map
    pub diffuse: Rc<Texture>,
    /// Specular intensity map
    pub specular: Rc<Texture>,
    /// Specular exponent
    pub shininess: f32,
}

impl Material {
    /// Create a new material
    pub fn new(diffuse: Rc<Texture>, specular: Rc<Texture>, shininess: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
        }
    }

    /// Texture unit of this material's diffuse map at list position `index`
    pub const fn diffuse_unit(index: u32) -> u32 {
        index * 2
    }

    /// Texture unit of this material's specular map at list position `index`
    pub const fn specular_unit(index: u32) -> u32 {
        index * 2 + 1
    }

    /// Bind both maps for list position `index`
    pub fn bind(&self, backend: &mut dyn RenderBackend, index: u32) {
        self.diffuse.bind_at(backend, Self::diffuse_unit(index));
        self.specular.bind_at(backend, Self::specular_unit(index));
    }
}
