//! Shader program resource
//!
//! A [`Shader`] wraps a backend program handle and acts as a named-uniform
//! sink. A shader whose build failed keeps a `NONE` handle; nodes using it
//! refuse to load and are therefore never drawn.

use crate::foundation::math::{Mat3, Mat4, Vec3};
use crate::render::api::{RenderBackend, ShaderHandle, ShaderSource, UniformValue};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Uniform block holding `{ mat4 projection; mat4 view; }`
pub const TRANSFORMATION_BLOCK: &str = "Transformation";

/// Uniform block holding the serialized light set
pub const LIGHT_SET_BLOCK: &str = "LightSet";

/// Binding index of [`TRANSFORMATION_BLOCK`]
pub const TRANSFORMATION_BINDING: u32 = 0;

/// Binding index of [`LIGHT_SET_BLOCK`]
pub const LIGHT_SET_BINDING: u32 = 1;

/// Shader loading errors
#[derive(Debug, Error)]
pub enum ShaderError {
    /// A stage file could not be read
    #[error("Failed to read shader stage {path:?}: {source}")]
    Read {
        /// Stage path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The backend rejected the program
    #[error(transparent)]
    Backend(#[from] crate::render::api::BackendError),
}

/// Programs the engine ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinShader {
    /// Flat-colored edges, used by wireframe rendering
    Wireframe,
    /// Unlit solid color, used for light markers
    LightMarker,
    /// Full-screen textured quad for post-processing
    ScreenQuad,
    /// Cube map sampled by view direction, for the skybox
    Skybox,
}

impl BuiltinShader {
    /// Stage sources of the built-in program
    pub fn source(self) -> ShaderSource {
        let (label, vertex, fragment) = match self {
            Self::Wireframe => ("builtin/wireframe", builtin::SCENE_VERTEX, builtin::WIREFRAME_FRAGMENT),
            Self::LightMarker => ("builtin/light_marker", builtin::SCENE_VERTEX, builtin::MARKER_FRAGMENT),
            Self::ScreenQuad => ("builtin/screen_quad", builtin::QUAD_VERTEX, builtin::QUAD_FRAGMENT),
            Self::Skybox => ("builtin/skybox", builtin::SKYBOX_VERTEX, builtin::SKYBOX_FRAGMENT),
        };
        ShaderSource {
            label: label.to_string(),
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
            geometry: None,
        }
    }
}

/// Linked shader program shared between scene nodes
#[derive(Debug)]
pub struct Shader {
    handle: ShaderHandle,
    label: String,
}

impl Shader {
    /// Build a program from in-memory sources and bind the engine's
    /// uniform blocks to their fixed indices
    pub fn from_source(
        backend: &mut dyn RenderBackend,
        source: &ShaderSource,
    ) -> Result<Self, ShaderError> {
        let handle = backend.create_shader(source)?;
        backend.bind_uniform_block(handle, TRANSFORMATION_BLOCK, TRANSFORMATION_BINDING);
        backend.bind_uniform_block(handle, LIGHT_SET_BLOCK, LIGHT_SET_BINDING);
        log::debug!("Built shader '{}' as {:?}", source.label, handle);
        Ok(Self {
            handle,
            label: source.label.clone(),
        })
    }

    /// Read stage files and build the program
    pub fn from_files(
        backend: &mut dyn RenderBackend,
        vertex: &Path,
        fragment: &Path,
        geometry: Option<&Path>,
    ) -> Result<Self, ShaderError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
                path: path.to_path_buf(),
                source,
            })
        };
        let source = ShaderSource {
            label: vertex.with_extension("").display().to_string(),
            vertex: read(vertex)?,
            fragment: read(fragment)?,
            geometry: geometry.map(read).transpose()?,
        };
        Self::from_source(backend, &source)
    }

    /// Placeholder for a program that failed to build
    pub fn unloaded(label: impl Into<String>) -> Self {
        Self {
            handle: ShaderHandle::NONE,
            label: label.into(),
        }
    }

    /// Whether the program exists on the backend
    pub fn is_loaded(&self) -> bool {
        self.handle.is_valid()
    }

    /// Backend handle
    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    /// Diagnostic name
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Make the program current
    pub fn use_program(&self, backend: &mut dyn RenderBackend) {
        backend.use_shader(self.handle);
    }

    /// Point a named block at a binding index
    pub fn bind_uniform_block(&self, backend: &mut dyn RenderBackend, block: &str, binding: u32) {
        backend.bind_uniform_block(self.handle, block, binding);
    }

    /// Set an `int` uniform
    pub fn set_int(&self, backend: &mut dyn RenderBackend, name: &str, value: i32) {
        backend.set_uniform(self.handle, name, UniformValue::Int(value));
    }

    /// Set a `float` uniform
    pub fn set_float(&self, backend: &mut dyn RenderBackend, name: &str, value: f32) {
        backend.set_uniform(self.handle, name, UniformValue::Float(value));
    }

    /// Set a `vec3` uniform
    pub fn set_vec3(&self, backend: &mut dyn RenderBackend, name: &str, value: Vec3) {
        backend.set_uniform(self.handle, name, UniformValue::Vec3(value));
    }

    /// Set a `mat3` uniform
    pub fn set_mat3(&self, backend: &mut dyn RenderBackend, name: &str, value: Mat3) {
        backend.set_uniform(self.handle, name, UniformValue::Mat3(value));
    }

    /// Set a `mat4` uniform
    pub fn set_mat4(&self, backend: &mut dyn RenderBackend, name: &str, value: Mat4) {
        backend.set_uniform(self.handle, name, UniformValue::Mat4(value));
    }
}

mod builtin {
    pub const SCENE_VERTEX: &str = r"#version 330 core
layout (location = 0) in vec3 aPos;
layout (std140) uniform Transformation {
    mat4 projection;
    mat4 view;
};
uniform mat4 model;
void main() {
    gl_Position = projection * view * model * vec4(aPos, 1.0);
}
";

    pub const WIREFRAME_FRAGMENT: &str = r"#version 330 core
out vec4 FragColor;
void main() {
    FragColor = vec4(0.1, 1.0, 0.1, 1.0);
}
";

    pub const MARKER_FRAGMENT: &str = r"#version 330 core
out vec4 FragColor;
uniform vec3 color;
void main() {
    FragColor = vec4(color, 1.0);
}
";

    pub const QUAD_VERTEX: &str = r"#version 330 core
layout (location = 0) in vec2 aPos;
layout (location = 1) in vec2 aTexCoords;
out vec2 TexCoords;
void main() {
    TexCoords = aTexCoords;
    gl_Position = vec4(aPos, 0.0, 1.0);
}
";

    pub const QUAD_FRAGMENT: &str = r"#version 330 core
in vec2 TexCoords;
out vec4 FragColor;
uniform sampler2D screenTexture;
void main() {
    FragColor = texture(screenTexture, TexCoords);
}
";

    // Translation is dropped from the view so the cube stays centred on
    // the camera.
    pub const SKYBOX_VERTEX: &str = r"#version 330 core
layout (location = 0) in vec3 aPos;
layout (std140) uniform Transformation {
    mat4 projection;
    mat4 view;
};
out vec3 TexCoords;
void main() {
    TexCoords = aPos;
    gl_Position = projection * mat4(mat3(view)) * vec4(aPos, 1.0);
}
";

    pub const SKYBOX_FRAGMENT: &str = r"#version 330 core
in vec3 TexCoords;
out vec4 FragColor;
uniform samplerCube skybox;
void main() {
    FragColor = texture(skybox, TexCoords);
}
";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{Command, RecordingBackend};

    #[test]
    fn test_builtin_binds_engine_blocks() {
        let mut backend = RecordingBackend::new();
        let shader = Shader::from_source(&mut backend, &BuiltinShader::Wireframe.source()).unwrap();
        assert!(shader.is_loaded());

        let bindings: Vec<(String, u32)> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::BindUniformBlock { block, binding, .. } => Some((block.clone(), *binding)),
                _ => None,
            })
            .collect();
        assert_eq!(
            bindings,
            vec![
                (TRANSFORMATION_BLOCK.to_string(), TRANSFORMATION_BINDING),
                (LIGHT_SET_BLOCK.to_string(), LIGHT_SET_BINDING),
            ]
        );
    }

    #[test]
    fn test_missing_stage_file_is_read_error() {
        let mut backend = RecordingBackend::new();
        let result = Shader::from_files(
            &mut backend,
            Path::new("does/not/exist.vert"),
            Path::new("does/not/exist.frag"),
            None,
        );
        assert!(matches!(result, Err(ShaderError::Read { .. })));
        assert!(!Shader::unloaded("x").is_loaded());
    }
}
