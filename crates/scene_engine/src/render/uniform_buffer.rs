//! Uniform buffer objects
//!
//! A [`UniformBuffer`] is a fixed-size byte buffer bound to one binding
//! index for its whole life. Updates always replace the full contents.

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::api::{BackendError, BackendResult, RenderBackend, UniformBufferHandle};
use bytemuck::{Pod, Zeroable};

/// `{ mat4 projection; mat4 view; }`, column-major
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformationBlock {
    /// Clip-from-view matrix
    pub projection: [[f32; 4]; 4],
    /// View-from-world matrix
    pub view: [[f32; 4]; 4],
}

impl TransformationBlock {
    /// Size of the block in bytes
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Pack both matrices
    pub fn new(projection: &Mat4, view: &Mat4) -> Self {
        Self {
            projection: projection.to_cols_array(),
            view: view.to_cols_array(),
        }
    }
}

/// Uniform buffer bound at a fixed index
#[derive(Debug)]
pub struct UniformBuffer {
    handle: UniformBufferHandle,
    binding: u32,
    size: usize,
}

impl UniformBuffer {
    /// Allocate `size` bytes at `binding`
    pub fn new(backend: &mut dyn RenderBackend, binding: u32, size: usize) -> BackendResult<Self> {
        let handle = backend.create_uniform_buffer(binding, size)?;
        log::debug!("Created uniform buffer {:?} ({} bytes) at binding {}", handle, size, binding);
        Ok(Self {
            handle,
            binding,
            size,
        })
    }

    /// Replace the contents; `bytes` must be exactly the buffer size
    pub fn update(&self, backend: &mut dyn RenderBackend, bytes: &[u8]) -> BackendResult<()> {
        if bytes.len() != self.size {
            return Err(BackendError::UniformBuffer(format!(
                "binding {} expects {} bytes, got {}",
                self.binding,
                self.size,
                bytes.len()
            )));
        }
        backend.update_uniform_buffer(self.handle, bytes)
    }

    /// Upload a plain-old-data value
    pub fn update_pod<T: Pod>(&self, backend: &mut dyn RenderBackend, value: &T) -> BackendResult<()> {
        self.update(backend, bytemuck::bytes_of(value))
    }

    /// Binding index
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Free the backend buffer
    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.release_uniform_buffer(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::recording::RecordingBackend;

    #[test]
    fn test_transformation_block_is_128_bytes() {
        assert_eq!(TransformationBlock::SIZE, 128);
    }

    #[test]
    fn test_transformation_block_layout_is_column_major() {
        let view = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let block = TransformationBlock::new(&Mat4::identity(), &view);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&block));
        // translation sits in the fourth column of the view matrix
        assert_eq!(&floats[16 + 12..16 + 15], &[1.0, 2.0, 3.0]);
        assert_eq!(floats[0], 1.0);
    }

    #[test]
    fn test_update_rejects_wrong_size() {
        let mut backend = RecordingBackend::new();
        let buffer = UniformBuffer::new(&mut backend, 0, TransformationBlock::SIZE).unwrap();
        assert!(buffer.update(&mut backend, &[0; 64]).is_err());
        let block = TransformationBlock::new(&Mat4::identity(), &Mat4::identity());
        buffer.update_pod(&mut backend, &block).unwrap();
        assert_eq!(backend.last_upload_to_binding(0).map(<[u8]>::len), Some(128));
    }
}
