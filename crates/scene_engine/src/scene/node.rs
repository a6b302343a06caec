//! # Scene Node
//!
//! Tree node combining a [`Transform`], an optional [`Drawable`], up to
//! [`MAX_MATERIALS`] materials, shared shaders and owned children.
//!
//! ## Transform propagation
//!
//! Every transform mutation is passed to the children as an additive
//! offset. `set_*` computes `new - old` and adds that to each child,
//! `add_*` adds the raw delta. Children therefore keep their own absolute
//! values and move in lockstep with their parent.
//!
//! ## Rendering
//!
//! A node draws nothing, and neither do its children, until [`SceneNode::load`]
//! has uploaded its geometry. Loaded nodes draw themselves first and then
//! their children in insertion order.

use super::drawable::{Drawable, DrawableError, DrawableSource};
use super::transform::Transform;
use super::FrameContext;
use crate::foundation::math::{Mat4Ext, Vec3};
use crate::render::api::{PolygonMode, RenderBackend};
use crate::render::material::Material;
use crate::render::shader::Shader;
use std::rc::Rc;
use thiserror::Error;

/// Materials a node can hold
pub const MAX_MATERIALS: usize = 16;

/// Reasons a node could not become renderable
#[derive(Debug, Error)]
pub enum NodeLoadError {
    /// The node has nothing to draw
    #[error("Node '{0}' has no drawable")]
    NoDrawable(String),

    /// The node's shader failed to build earlier
    #[error("Shader '{0}' is not loaded")]
    ShaderUnavailable(String),

    /// Geometry upload failed
    #[error(transparent)]
    Drawable(#[from] DrawableError),
}

/// Node of the scene tree
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    transform: Transform,
    drawable: Option<Drawable>,
    materials: Vec<Rc<Material>>,
    shader: Rc<Shader>,
    wireframe_shader: Rc<Shader>,
    wireframe: bool,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty node at the origin
    pub fn new(shader: Rc<Shader>, wireframe_shader: Rc<Shader>) -> Self {
        Self {
            name: String::from("node"),
            transform: Transform::identity(),
            drawable: None,
            materials: Vec::new(),
            shader,
            wireframe_shader,
            wireframe: false,
            children: Vec::new(),
        }
    }

    /// Attach something to draw
    pub fn with_drawable(mut self, source: DrawableSource) -> Self {
        self.drawable = Some(Drawable::new(source));
        self
    }

    /// Set the diagnostic name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Diagnostic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Translation shortcut
    pub fn translation(&self) -> Vec3 {
        self.transform.translation()
    }

    /// Rotation shortcut, degrees
    pub fn rotation(&self) -> Vec3 {
        self.transform.rotation()
    }

    /// Scale shortcut
    pub fn scale(&self) -> Vec3 {
        self.transform.scale()
    }

    /// Drawable, if any
    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    /// Move to `translation`; children move by the same offset
    pub fn set_translation(&mut self, translation: Vec3) {
        let delta = self.transform.set_translation(translation);
        log::trace!("{}: translation -> {:?}", self.name, translation);
        for child in &mut self.children {
            child.add_translation(delta);
        }
    }

    /// Move by `delta`, children included
    pub fn add_translation(&mut self, delta: Vec3) {
        self.transform.add_translation(delta);
        for child in &mut self.children {
            child.add_translation(delta);
        }
    }

    /// Rotate to `rotation` degrees; children rotate by the same offset
    pub fn set_rotation(&mut self, rotation: Vec3) {
        let delta = self.transform.set_rotation(rotation);
        log::trace!("{}: rotation -> {:?}", self.name, rotation);
        for child in &mut self.children {
            child.add_rotation(delta);
        }
    }

    /// Rotate by `delta` degrees, children included
    pub fn add_rotation(&mut self, delta: Vec3) {
        self.transform.add_rotation(delta);
        for child in &mut self.children {
            child.add_rotation(delta);
        }
    }

    /// Scale to `scale`; children scale by the same offset
    pub fn set_scale(&mut self, scale: Vec3) {
        let delta = self.transform.set_scale(scale);
        log::trace!("{}: scale -> {:?}", self.name, scale);
        for child in &mut self.children {
            child.add_scale(delta);
        }
    }

    /// Grow the scale by `delta`, children included
    pub fn add_scale(&mut self, delta: Vec3) {
        self.transform.add_scale(delta);
        for child in &mut self.children {
            child.add_scale(delta);
        }
    }

    /// [`Self::set_scale`] with the same factor on every axis
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vec3::repeat(scale));
    }

    /// [`Self::add_scale`] with the same delta on every axis
    pub fn add_uniform_scale(&mut self, delta: f32) {
        self.add_scale(Vec3::repeat(delta));
    }

    /// Append a child, give it this node's absolute transform and load it
    ///
    /// A child that fails to load is kept, unloaded.
    pub fn add_child(&mut self, mut child: SceneNode, backend: &mut dyn RenderBackend) {
        child.set_translation(self.transform.translation());
        child.set_rotation(self.transform.rotation());
        child.set_scale(self.transform.scale());
        if let Err(err) = child.load(backend) {
            log::error!("Failed to load child '{}' of '{}': {}", child.name, self.name, err);
        }
        self.children.push(child);
    }

    /// Child at insertion index `index`
    pub fn child(&self, index: usize) -> Option<&SceneNode> {
        self.children.get(index)
    }

    /// Mutable child at insertion index `index`
    pub fn child_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.children.get_mut(index)
    }

    /// Children in render order
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Append a material; ignored with a warning once the node is full
    pub fn add_material(&mut self, material: Rc<Material>) {
        if self.materials.len() >= MAX_MATERIALS {
            log::warn!(
                "Node '{}' already has {} materials, ignoring another",
                self.name,
                MAX_MATERIALS
            );
            return;
        }
        self.materials.push(material);
    }

    /// Attached materials
    pub fn materials(&self) -> &[Rc<Material>] {
        &self.materials
    }

    /// Choose between the default and the wireframe path
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    /// Whether the wireframe path is active
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Whether geometry is on the backend
    pub fn is_loaded(&self) -> bool {
        self.drawable.as_ref().is_some_and(Drawable::is_loaded)
    }

    /// Upload this node's geometry
    ///
    /// On error the node is left unloaded and render skips it.
    pub fn load(&mut self, backend: &mut dyn RenderBackend) -> Result<(), NodeLoadError> {
        let Some(drawable) = self.drawable.as_mut() else {
            return Err(NodeLoadError::NoDrawable(self.name.clone()));
        };
        if !self.shader.is_loaded() {
            drawable.release(backend);
            return Err(NodeLoadError::ShaderUnavailable(self.shader.label().to_string()));
        }
        drawable.load(backend)?;
        log::debug!("Loaded node '{}' ({:?})", self.name, drawable.draw_mode());
        Ok(())
    }

    /// Free this node's geometry and its children's
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(drawable) = self.drawable.as_mut() {
            drawable.release(backend);
        }
        for child in &mut self.children {
            child.release(backend);
        }
    }

    /// Draw this node, then its children
    pub fn render(&self, ctx: &FrameContext, backend: &mut dyn RenderBackend) {
        let Some(drawable) = self.drawable.as_ref().filter(|d| d.is_loaded()) else {
            return;
        };

        if self.wireframe {
            self.render_wireframe(drawable, backend);
        } else {
            self.render_default(drawable, ctx, backend);
        }

        for child in &self.children {
            child.render(ctx, backend);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn render_default(&self, drawable: &Drawable, ctx: &FrameContext, backend: &mut dyn RenderBackend) {
        let shader = &self.shader;
        let model = self.transform.model_matrix();

        shader.use_program(backend);
        shader.set_mat4(backend, "model", model);
        shader.set_mat3(backend, "normalModel", model.normal_matrix());
        shader.set_vec3(backend, "viewPos", ctx.view_position);
        if let Some(color) = drawable.source().marker_color() {
            shader.set_vec3(backend, "color", color);
        }

        shader.set_int(backend, "numTextures", self.materials.len() as i32);
        for (index, material) in (0u32..).zip(&self.materials) {
            shader.set_int(
                backend,
                &format!("materials[{index}].diffuse"),
                Material::diffuse_unit(index) as i32,
            );
            shader.set_int(
                backend,
                &format!("materials[{index}].specular"),
                Material::specular_unit(index) as i32,
            );
            shader.set_float(backend, &format!("materials[{index}].shininess"), material.shininess);
            material.bind(backend, index);
        }

        backend.set_polygon_mode(PolygonMode::Fill);
        drawable.draw(backend);
    }

    fn render_wireframe(&self, drawable: &Drawable, backend: &mut dyn RenderBackend) {
        self.wireframe_shader.use_program(backend);
        self.wireframe_shader
            .set_mat4(backend, "model", self.transform.model_matrix());
        backend.set_polygon_mode(PolygonMode::Line);
        drawable.draw(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::render::api::{TextureImage, UniformValue};
    use crate::render::material::Texture;
    use crate::render::recording::{Command, RecordingBackend};
    use crate::render::shader::BuiltinShader;
    use approx::assert_relative_eq;

    fn shaders(backend: &mut RecordingBackend) -> (Rc<Shader>, Rc<Shader>) {
        let shader = Shader::from_source(backend, &BuiltinShader::LightMarker.source()).unwrap();
        let wireframe = Shader::from_source(backend, &BuiltinShader::Wireframe.source()).unwrap();
        (Rc::new(shader), Rc::new(wireframe))
    }

    fn box_node(backend: &mut RecordingBackend) -> SceneNode {
        let (shader, wireframe) = shaders(backend);
        SceneNode::new(shader, wireframe).with_drawable(DrawableSource::ProceduralBox)
    }

    fn ctx() -> FrameContext {
        FrameContext {
            view_position: Vec3::new(0.0, 0.0, 3.0),
            delta_time: 0.016,
        }
    }

    #[test]
    fn test_parent_moves_preserve_child_offsets() {
        let mut backend = RecordingBackend::new();
        let mut root = box_node(&mut backend);
        root.load(&mut backend).unwrap();
        root.add_child(box_node(&mut backend), &mut backend);
        root.add_child(box_node(&mut backend), &mut backend);
        root.child_mut(0).unwrap().add_translation(Vec3::new(1.0, 0.5, 0.0));
        root.child_mut(1).unwrap().add_translation(Vec3::new(-2.0, 0.0, 4.0));

        let offsets = |root: &SceneNode| -> Vec<Vec3> {
            root.children()
                .iter()
                .map(|c| c.translation() - root.translation())
                .collect()
        };
        let before = offsets(&root);

        root.set_translation(Vec3::new(5.0, -1.0, 2.0));
        for (a, b) in offsets(&root).iter().zip(&before) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
        root.set_translation(Vec3::new(-3.0, 7.0, 0.25));
        for (a, b) in offsets(&root).iter().zip(&before) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_absolute_set_reaches_children_as_offset() {
        let mut backend = RecordingBackend::new();
        let mut root = box_node(&mut backend);
        root.load(&mut backend).unwrap();
        root.add_child(box_node(&mut backend), &mut backend);
        root.add_child(box_node(&mut backend), &mut backend);
        root.child_mut(0).unwrap().add_translation(Vec3::new(1.0, 0.0, 0.0));
        root.child_mut(1).unwrap().add_translation(Vec3::new(0.0, 1.0, 0.0));

        root.set_translation(Vec3::new(2.0, 2.0, 2.0));

        assert_eq!(root.child(0).unwrap().translation(), Vec3::new(3.0, 2.0, 2.0));
        assert_eq!(root.child(1).unwrap().translation(), Vec3::new(2.0, 3.0, 2.0));
    }

    #[test]
    fn test_add_child_copies_parent_transform_and_loads() {
        let mut backend = RecordingBackend::new();
        let mut root = box_node(&mut backend);
        root.set_translation(Vec3::new(1.0, 2.0, 3.0));
        root.set_rotation(Vec3::new(0.0, 45.0, 0.0));
        root.set_uniform_scale(2.0);

        root.add_child(box_node(&mut backend), &mut backend);

        let child = root.child(0).unwrap();
        assert!(child.is_loaded());
        assert_eq!(child.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(child.rotation(), Vec3::new(0.0, 45.0, 0.0));
        assert_eq!(child.scale(), Vec3::repeat(2.0));
    }

    #[test]
    fn test_rotation_propagates_normalized() {
        let mut backend = RecordingBackend::new();
        let mut root = box_node(&mut backend);
        root.add_child(box_node(&mut backend), &mut backend);
        root.set_rotation(Vec3::new(300.0, 0.0, 0.0));
        root.add_rotation(Vec3::new(90.0, 0.0, 0.0));
        assert_relative_eq!(root.rotation(), Vec3::new(30.0, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(root.child(0).unwrap().rotation(), Vec3::new(30.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_scale_propagates_as_offset() {
        let mut backend = RecordingBackend::new();
        let mut root = box_node(&mut backend);
        root.add_child(box_node(&mut backend), &mut backend);
        root.child_mut(0).unwrap().add_uniform_scale(0.5);

        root.set_scale(Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(root.child(0).unwrap().scale(), Vec3::new(2.5, 3.5, 1.5));

        root.add_uniform_scale(0.5);
        assert_eq!(root.scale(), Vec3::new(2.5, 3.5, 1.5));
        assert_eq!(root.child(0).unwrap().scale(), Vec3::new(3.0, 4.0, 2.0));

        root.set_uniform_scale(1.0);
        assert_eq!(root.child(0).unwrap().scale(), Vec3::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_changes_cascade_to_grandchildren() {
        let mut backend = RecordingBackend::new();
        let mut child = box_node(&mut backend);
        child.add_child(box_node(&mut backend), &mut backend);
        let mut root = box_node(&mut backend);
        root.add_child(child, &mut backend);
        root.child_mut(0)
            .unwrap()
            .child_mut(0)
            .unwrap()
            .add_translation(Vec3::new(0.0, 1.0, 0.0));

        root.set_translation(Vec3::new(1.0, 2.0, 3.0));
        root.add_rotation(Vec3::new(10.0, 20.0, 30.0));
        root.set_uniform_scale(2.0);

        let grandchild = root.child(0).unwrap().child(0).unwrap();
        assert!(grandchild.is_loaded());
        assert_eq!(grandchild.translation(), Vec3::new(1.0, 3.0, 3.0));
        assert_relative_eq!(grandchild.rotation(), Vec3::new(10.0, 20.0, 30.0), epsilon = 1e-4);
        assert_eq!(grandchild.scale(), Vec3::repeat(2.0));
        assert_eq!(root.child(0).unwrap().translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_seventeenth_material_is_ignored() {
        let mut backend = RecordingBackend::new();
        let image = TextureImage {
            width: 1,
            height: 1,
            pixels: vec![0; 4],
        };
        let texture = Rc::new(Texture::from_image(&mut backend, &image).unwrap());
        let material = Rc::new(Material::new(texture.clone(), texture, 16.0));

        let mut node = box_node(&mut backend);
        for _ in 0..MAX_MATERIALS + 1 {
            node.add_material(material.clone());
        }
        assert_eq!(node.materials().len(), MAX_MATERIALS);
    }

    #[test]
    fn test_unloaded_node_draws_nothing() {
        let mut backend = RecordingBackend::new();
        let mut node = box_node(&mut backend);
        node.add_child(box_node(&mut backend), &mut backend);
        backend.clear_log();

        node.render(&ctx(), &mut backend);
        assert_eq!(backend.draw_call_count(), 0);
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_load_failure_leaves_node_unloaded() {
        let mut backend = RecordingBackend::new();
        let mut node = box_node(&mut backend);
        backend.fail_geometry_uploads(true);
        assert!(node.load(&mut backend).is_err());
        assert!(!node.is_loaded());

        let (_, wireframe) = shaders(&mut RecordingBackend::new());
        let mut broken = SceneNode::new(Rc::new(Shader::unloaded("missing")), wireframe)
            .with_drawable(DrawableSource::ProceduralBox);
        backend.fail_geometry_uploads(false);
        assert!(matches!(
            broken.load(&mut backend),
            Err(NodeLoadError::ShaderUnavailable(_))
        ));
        assert!(!broken.is_loaded());
    }

    #[test]
    fn test_parent_renders_before_children() {
        let mut backend = RecordingBackend::new();
        let mut root = box_node(&mut backend).with_name("root");
        root.load(&mut backend).unwrap();
        root.add_child(box_node(&mut backend), &mut backend);
        root.add_child(box_node(&mut backend), &mut backend);
        root.child_mut(1).unwrap().set_wireframe(true);

        let handles: Vec<_> = std::iter::once(&root)
            .chain(root.children())
            .map(|n| n.drawable().unwrap().geometry()[0].handle)
            .collect();
        backend.clear_log();
        root.render(&ctx(), &mut backend);

        let bound: Vec<_> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::BindGeometry(h) => Some(*h),
                _ => None,
            })
            .collect();
        assert_eq!(bound, handles);
        assert_eq!(backend.draw_call_count(), 3);
    }

    #[test]
    fn test_default_path_uniforms() {
        let mut backend = RecordingBackend::new();
        let mut node = box_node(&mut backend)
            .with_drawable(DrawableSource::LightVisualization {
                color: Vec3::new(1.0, 0.5, 0.0),
            });
        node.load(&mut backend).unwrap();
        node.set_translation(Vec3::new(1.0, 0.0, 0.0));
        backend.clear_log();

        node.render(&ctx(), &mut backend);

        let expected = Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0));
        let Some(UniformValue::Mat4(model)) = backend.last_uniform("model") else {
            panic!("model uniform not set");
        };
        assert_relative_eq!(model, expected, epsilon = 1e-6);
        assert_eq!(
            backend.last_uniform("viewPos"),
            Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 3.0)))
        );
        assert_eq!(
            backend.last_uniform("color"),
            Some(UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.0)))
        );
        assert_eq!(backend.last_uniform("numTextures"), Some(UniformValue::Int(0)));
        assert!(backend.commands().contains(&Command::PolygonMode(PolygonMode::Fill)));
        assert!(backend.last_uniform("normalModel").is_some());
    }

    #[test]
    fn test_wireframe_path_sets_only_model() {
        let mut backend = RecordingBackend::new();
        let mut node = box_node(&mut backend);
        node.load(&mut backend).unwrap();
        node.set_wireframe(true);
        backend.clear_log();

        node.render(&ctx(), &mut backend);

        let names: Vec<&str> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::SetUniform { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["model"]);
        assert!(backend.commands().contains(&Command::PolygonMode(PolygonMode::Line)));
        assert_eq!(backend.draw_call_count(), 1);
    }

    #[test]
    fn test_material_uniforms_use_paired_units() {
        let mut backend = RecordingBackend::new();
        let image = TextureImage {
            width: 1,
            height: 1,
            pixels: vec![0; 4],
        };
        let texture = Rc::new(Texture::from_image(&mut backend, &image).unwrap());
        let mut node = box_node(&mut backend);
        node.load(&mut backend).unwrap();
        node.add_material(Rc::new(Material::new(texture.clone(), texture.clone(), 8.0)));
        node.add_material(Rc::new(Material::new(texture.clone(), texture, 32.0)));
        backend.clear_log();

        node.render(&ctx(), &mut backend);

        assert_eq!(backend.last_uniform("numTextures"), Some(UniformValue::Int(2)));
        assert_eq!(backend.last_uniform("materials[1].diffuse"), Some(UniformValue::Int(2)));
        assert_eq!(backend.last_uniform("materials[1].specular"), Some(UniformValue::Int(3)));
        assert_eq!(
            backend.last_uniform("materials[1].shininess"),
            Some(UniformValue::Float(32.0))
        );
    }
}
