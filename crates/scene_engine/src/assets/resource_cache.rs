//! Resource cache - shared shader, texture, material and model instances
//!
//! Resources are keyed by typed descriptors and handed out as `Rc<T>`.
//! Asking twice for the same descriptor returns the same `Rc`, so many
//! nodes can share one program or texture while the cache keeps them
//! alive.
//!
//! Loads that fail return a [`ResourceError`]. The `*_or_unloaded`
//! variants log the failure instead and cache an unloaded placeholder,
//! which keeps dependent nodes from ever being drawn.

use crate::render::api::RenderBackend;
use crate::render::material::{Material, Texture, TextureError};
use crate::render::shader::{BuiltinShader, Shader, ShaderError};
use crate::scene::geometry::ModelData;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

/// Resource cache errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Shader could not be read or built
    #[error("Shader {descriptor:?} failed: {source}")]
    Shader {
        /// Requested shader
        descriptor: ShaderDescriptor,
        /// Cause
        #[source]
        source: ShaderError,
    },

    /// Texture could not be decoded or uploaded
    #[error("Texture {path:?} failed: {source}")]
    Texture {
        /// Requested file
        path: PathBuf,
        /// Cause
        #[source]
        source: TextureError,
    },
}

/// Identifies a shader program
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShaderDescriptor {
    /// Program built from stage files
    Files {
        /// Vertex stage
        vertex: PathBuf,
        /// Fragment stage
        fragment: PathBuf,
        /// Optional geometry stage
        geometry: Option<PathBuf>,
    },
    /// Program shipped with the engine
    Builtin(BuiltinShader),
}

impl ShaderDescriptor {
    /// Vertex and fragment stage files
    pub fn files(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self::Files {
            vertex: vertex.into(),
            fragment: fragment.into(),
            geometry: None,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Files { vertex, .. } => vertex.display().to_string(),
            Self::Builtin(builtin) => format!("{builtin:?}"),
        }
    }
}

/// Identifies a texture file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Image file
    pub path: PathBuf,
}

impl TextureDescriptor {
    /// Texture at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Identifies a material by its maps and exponent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialDescriptor {
    /// Diffuse map
    pub diffuse: TextureDescriptor,
    /// Specular map
    pub specular: TextureDescriptor,
    shininess_bits: u32,
}

impl MaterialDescriptor {
    /// Material from two map files and a specular exponent
    pub fn new(diffuse: impl Into<PathBuf>, specular: impl Into<PathBuf>, shininess: f32) -> Self {
        Self {
            diffuse: TextureDescriptor::new(diffuse),
            specular: TextureDescriptor::new(specular),
            shininess_bits: shininess.to_bits(),
        }
    }

    /// Specular exponent
    pub fn shininess(&self) -> f32 {
        f32::from_bits(self.shininess_bits)
    }
}

/// Identifies a registered model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    /// Registration name
    pub name: String,
}

impl ModelDescriptor {
    /// Model registered as `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Shared resource store
#[derive(Debug, Default)]
pub struct ResourceCache {
    shaders: HashMap<ShaderDescriptor, Rc<Shader>>,
    textures: HashMap<TextureDescriptor, Rc<Texture>>,
    materials: HashMap<MaterialDescriptor, Rc<Material>>,
    models: HashMap<ModelDescriptor, Rc<ModelData>>,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Build or fetch a shader
    pub fn shader(
        &mut self,
        backend: &mut dyn RenderBackend,
        descriptor: &ShaderDescriptor,
    ) -> Result<Rc<Shader>, ResourceError> {
        if let Some(shader) = self.shaders.get(descriptor) {
            return Ok(Rc::clone(shader));
        }

        let built = match descriptor {
            ShaderDescriptor::Files {
                vertex,
                fragment,
                geometry,
            } => Shader::from_files(backend, vertex, fragment, geometry.as_deref()),
            ShaderDescriptor::Builtin(builtin) => Shader::from_source(backend, &builtin.source()),
        }
        .map_err(|source| ResourceError::Shader {
            descriptor: descriptor.clone(),
            source,
        })?;

        log::info!("Cached shader '{}'", built.label());
        let shader = Rc::new(built);
        self.shaders.insert(descriptor.clone(), Rc::clone(&shader));
        Ok(shader)
    }

    /// Like [`Self::shader`], caching an unloaded placeholder on failure
    pub fn shader_or_unloaded(
        &mut self,
        backend: &mut dyn RenderBackend,
        descriptor: &ShaderDescriptor,
    ) -> Rc<Shader> {
        self.shader(backend, descriptor).unwrap_or_else(|err| {
            log::error!("{err}");
            let placeholder = Rc::new(Shader::unloaded(descriptor.label()));
            self.shaders.insert(descriptor.clone(), Rc::clone(&placeholder));
            placeholder
        })
    }

    /// The built-in wireframe program
    pub fn wireframe_shader(&mut self, backend: &mut dyn RenderBackend) -> Rc<Shader> {
        self.shader_or_unloaded(backend, &ShaderDescriptor::Builtin(BuiltinShader::Wireframe))
    }

    /// Decode and upload, or fetch, a texture
    pub fn texture(
        &mut self,
        backend: &mut dyn RenderBackend,
        descriptor: &TextureDescriptor,
    ) -> Result<Rc<Texture>, ResourceError> {
        if let Some(texture) = self.textures.get(descriptor) {
            return Ok(Rc::clone(texture));
        }

        let texture = Texture::from_file(backend, &descriptor.path).map_err(|source| {
            ResourceError::Texture {
                path: descriptor.path.clone(),
                source,
            }
        })?;
        log::info!("Cached texture {:?}", descriptor.path);
        let texture = Rc::new(texture);
        self.textures.insert(descriptor.clone(), Rc::clone(&texture));
        Ok(texture)
    }

    /// Like [`Self::texture`], caching an unloaded placeholder on failure
    pub fn texture_or_unloaded(
        &mut self,
        backend: &mut dyn RenderBackend,
        descriptor: &TextureDescriptor,
    ) -> Rc<Texture> {
        self.texture(backend, descriptor).unwrap_or_else(|err| {
            log::error!("{err}");
            let placeholder = Rc::new(Texture::unloaded());
            self.textures.insert(descriptor.clone(), Rc::clone(&placeholder));
            placeholder
        })
    }

    /// Build or fetch a material, loading its maps through the cache
    pub fn material(
        &mut self,
        backend: &mut dyn RenderBackend,
        descriptor: &MaterialDescriptor,
    ) -> Result<Rc<Material>, ResourceError> {
        if let Some(material) = self.materials.get(descriptor) {
            return Ok(Rc::clone(material));
        }

        let diffuse = self.texture(backend, &descriptor.diffuse)?;
        let specular = self.texture(backend, &descriptor.specular)?;
        let material = Rc::new(Material::new(diffuse, specular, descriptor.shininess()));
        self.materials.insert(descriptor.clone(), Rc::clone(&material));
        Ok(material)
    }

    /// Like [`Self::material`], with unloaded maps standing in for failed ones
    pub fn material_or_unloaded(
        &mut self,
        backend: &mut dyn RenderBackend,
        descriptor: &MaterialDescriptor,
    ) -> Rc<Material> {
        if let Some(material) = self.materials.get(descriptor) {
            return Rc::clone(material);
        }

        let diffuse = self.texture_or_unloaded(backend, &descriptor.diffuse);
        let specular = self.texture_or_unloaded(backend, &descriptor.specular);
        let material = Rc::new(Material::new(diffuse, specular, descriptor.shininess()));
        self.materials.insert(descriptor.clone(), Rc::clone(&material));
        material
    }

    /// Register a pre-parsed model, replacing any previous one
    pub fn insert_model(&mut self, descriptor: ModelDescriptor, model: ModelData) -> Rc<ModelData> {
        let model = Rc::new(model);
        log::info!("Registered model '{}' ({} meshes)", descriptor.name, model.meshes.len());
        self.models.insert(descriptor, Rc::clone(&model));
        model
    }

    /// Registered model
    pub fn model(&self, descriptor: &ModelDescriptor) -> Option<Rc<ModelData>> {
        self.models.get(descriptor).cloned()
    }

    /// Number of cached shaders, textures and materials
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.shaders.len(), self.textures.len(), self.materials.len())
    }
}
