//! Offscreen post-processing pass
//!
//! Scene nodes render into an offscreen framebuffer the size of the
//! window. The color attachment is then drawn to the default framebuffer
//! as a full-screen quad through a fragment shader.

use crate::render::api::{
    BackendResult, ClearFlags, FramebufferHandle, GeometryHandle, PolygonMode, RenderBackend,
    TextureHandle,
};
use crate::render::shader::Shader;
use crate::scene::geometry;
use std::rc::Rc;

/// Texture unit the screen texture is bound to
const SCREEN_TEXTURE_UNIT: u32 = 0;

/// Offscreen target plus the quad that presents it
#[derive(Debug)]
pub struct PostProcessor {
    framebuffer: FramebufferHandle,
    color: TextureHandle,
    quad: GeometryHandle,
    quad_vertices: u32,
    shader: Rc<Shader>,
    size: (u32, u32),
}

impl PostProcessor {
    /// Create a `width` x `height` target drawn through `shader`
    pub fn new(
        backend: &mut dyn RenderBackend,
        shader: Rc<Shader>,
        width: u32,
        height: u32,
    ) -> BackendResult<Self> {
        let quad_data = geometry::screen_quad();
        let quad_vertices = u32::try_from(quad_data.element_count()).unwrap_or(6);
        let (framebuffer, color) = backend.create_framebuffer(width, height)?;
        let quad = match backend.create_geometry(&quad_data) {
            Ok(quad) => quad,
            Err(err) => {
                backend.release_framebuffer(framebuffer);
                return Err(err);
            }
        };
        log::info!("Post-processing enabled ({}x{}, shader '{}')", width, height, shader.label());
        Ok(Self {
            framebuffer,
            color,
            quad,
            quad_vertices,
            shader,
            size: (width, height),
        })
    }

    /// Target size
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Recreate the target for a new window size
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, width: u32, height: u32) -> BackendResult<()> {
        if (width, height) == self.size {
            return Ok(());
        }
        let (framebuffer, color) = backend.create_framebuffer(width, height)?;
        backend.release_framebuffer(self.framebuffer);
        self.framebuffer = framebuffer;
        self.color = color;
        self.size = (width, height);
        Ok(())
    }

    /// Redirect rendering into the offscreen target
    pub fn bind(&self, backend: &mut dyn RenderBackend) {
        backend.bind_framebuffer(Some(self.framebuffer));
        backend.set_depth_test(true);
    }

    /// Clear the offscreen target
    pub fn clear(&self, backend: &mut dyn RenderBackend) {
        backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
    }

    /// Draw the offscreen color to the default framebuffer
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        backend.bind_framebuffer(None);
        backend.set_depth_test(false);
        backend.clear(ClearFlags::COLOR);

        self.shader.use_program(backend);
        self.shader
            .set_int(backend, "screenTexture", SCREEN_TEXTURE_UNIT as i32);
        backend.bind_texture(SCREEN_TEXTURE_UNIT, self.color);
        backend.set_polygon_mode(PolygonMode::Fill);
        backend.bind_geometry(self.quad);
        backend.draw_arrays(self.quad_vertices);

        backend.set_depth_test(true);
    }

    /// Free the target and the quad
    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.release_geometry(self.quad);
        backend.release_framebuffer(self.framebuffer);
    }
}
