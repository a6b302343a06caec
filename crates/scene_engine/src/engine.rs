//! # Scene Manager
//!
//! Owns the root nodes, the camera, the lights and the collaborators
//! (render backend and presentation surface), and drives the frame loop.
//!
//! ## Slot table
//!
//! Root nodes live in a [`FreeList`]. Handles are handed out in increasing
//! order unless a removed handle is waiting for reuse; the most recently
//! removed one is reused first. Looking up a removed or never-allocated
//! handle yields `None`.
//!
//! ## Tick order
//!
//! 1. Advance the timer
//! 2. Recompute the projection if the surface was resized, then upload
//!    `{projection, view}` to binding 0
//! 3. Copy attached node positions and the camera pose into their lights,
//!    then upload the light set to binding 1
//! 4. Dispatch input bindings, then [`Application::update`]
//! 5. Clear (into the post-processing target when enabled)
//! 6. Draw the skybox, render every root in ascending handle order, then
//!    the post-processing quad
//! 7. Swap and poll; new events land in the binder's queue

use crate::application::{AppError, Application};
use crate::foundation::collections::FreeList;
use crate::foundation::math::Mat4;
use crate::foundation::time::Timer;
use crate::input::{Action, CameraMovement, Fired, InputBinder, MouseTarget};
use crate::render::api::{BackendError, ClearFlags, RenderBackend};
use crate::render::camera::Camera;
use crate::render::lighting::{LightSet, PointLightId, SpotLightId};
use crate::render::post_processor::PostProcessor;
use crate::render::shader::{Shader, LIGHT_SET_BINDING, TRANSFORMATION_BINDING};
use crate::render::skybox::Skybox;
use crate::render::uniform_buffer::{TransformationBlock, UniformBuffer};
use crate::render::window::{PresentationSurface, WindowError};
use crate::scene::{FrameContext, NodeHandle, SceneNode};
use std::rc::Rc;
use thiserror::Error;

/// Frame loop errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The window could not be created
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// An application hook failed
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Lifecycle of the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Ticking, or ready to tick
    Running,
    /// Resources released; no further ticks
    Stopped,
}

/// Root of the scene and owner of the frame loop
pub struct SceneManager<B: RenderBackend, S: PresentationSurface> {
    backend: B,
    surface: S,
    nodes: FreeList<SceneNode>,
    camera: Camera,
    lights: Option<LightSet>,
    binder: InputBinder,
    timer: Timer,
    transformation_ubo: Option<UniformBuffer>,
    light_ubo: Option<UniformBuffer>,
    projection: Mat4,
    point_attachments: Vec<(NodeHandle, PointLightId)>,
    spot_attachments: Vec<(NodeHandle, SpotLightId)>,
    post_processor: Option<PostProcessor>,
    skybox: Option<Skybox>,
    state: FrameState,
    clear_color: [f32; 4],
}

impl<B: RenderBackend, S: PresentationSurface> SceneManager<B, S> {
    /// Default clear color
    pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

    /// Take ownership of the collaborators and create the binding-0 buffer
    pub fn new(mut backend: B, surface: S) -> Result<Self, EngineError> {
        log::info!("Initializing scene manager...");

        let transformation_ubo =
            UniformBuffer::new(&mut backend, TRANSFORMATION_BINDING, TransformationBlock::SIZE)?;
        let (width, height) = surface.size();
        backend.set_viewport(width, height);
        backend.set_depth_test(true);
        backend.set_clear_color(Self::DEFAULT_CLEAR_COLOR);

        Ok(Self {
            projection: surface.projection(),
            backend,
            surface,
            nodes: FreeList::new(),
            camera: Camera::default(),
            lights: None,
            binder: InputBinder::new(),
            timer: Timer::new(),
            transformation_ubo: Some(transformation_ubo),
            light_ubo: None,
            point_attachments: Vec::new(),
            spot_attachments: Vec::new(),
            post_processor: None,
            skybox: None,
            state: FrameState::Running,
            clear_color: Self::DEFAULT_CLEAR_COLOR,
        })
    }

    /// Store a root node, load it and return its handle
    ///
    /// A node that fails to load is still stored; it is simply never drawn.
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeHandle {
        if let Err(err) = node.load(&mut self.backend) {
            log::error!("Failed to load node '{}': {}", node.name(), err);
        }
        let handle = NodeHandle(self.nodes.insert(node));
        log::debug!("Added node {:?}", handle);
        handle
    }

    /// Root node by handle
    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.0)
    }

    /// Mutable root node by handle
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(handle.0)
    }

    /// Remove a root node, free its geometry and make its handle reusable
    pub fn remove_node(&mut self, handle: NodeHandle) -> Option<SceneNode> {
        let mut node = self.nodes.remove(handle.0)?;
        node.release(&mut self.backend);
        self.point_attachments.retain(|(h, _)| *h != handle);
        self.spot_attachments.retain(|(h, _)| *h != handle);
        log::debug!("Removed node {:?}", handle);
        Some(node)
    }

    /// Number of stored root nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Install the light set and create its binding-1 buffer
    pub fn set_light_set(&mut self, lights: LightSet) -> Result<(), EngineError> {
        if self.light_ubo.is_none() {
            self.light_ubo = Some(UniformBuffer::new(
                &mut self.backend,
                LIGHT_SET_BINDING,
                LightSet::BLOCK_SIZE,
            )?);
        }
        let (directional, point, spot) = lights.counts();
        log::info!("Light set installed ({directional} directional, {point} point, {spot} spot)");
        self.lights = Some(lights);
        Ok(())
    }

    /// Installed lights
    pub fn lights(&self) -> Option<&LightSet> {
        self.lights.as_ref()
    }

    /// Mutable installed lights
    pub fn lights_mut(&mut self) -> Option<&mut LightSet> {
        self.lights.as_mut()
    }

    /// Copy a root node's translation into a point light every tick
    pub fn attach_point_light(&mut self, node: NodeHandle, light: PointLightId) {
        self.point_attachments.push((node, light));
    }

    /// Copy a root node's translation into a spot light every tick
    pub fn attach_spot_light(&mut self, node: NodeHandle, light: SpotLightId) {
        self.spot_attachments.push((node, light));
    }

    /// Render through an offscreen target drawn with `shader`
    pub fn enable_post_processor(&mut self, shader: Rc<Shader>) -> Result<(), EngineError> {
        let (width, height) = self.surface.size();
        let post = PostProcessor::new(&mut self.backend, shader, width, height)?;
        if let Some(old) = self.post_processor.replace(post) {
            old.release(&mut self.backend);
        }
        Ok(())
    }

    /// Draw `skybox` behind every node, replacing any previous one
    pub fn set_skybox(&mut self, skybox: Skybox) {
        if let Some(old) = self.skybox.replace(skybox) {
            old.release(&mut self.backend);
        }
    }

    /// Stop drawing the skybox and free it
    pub fn remove_skybox(&mut self) {
        if let Some(old) = self.skybox.take() {
            old.release(&mut self.backend);
        }
    }

    /// Active camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable active camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Input bindings
    pub fn input_mut(&mut self) -> &mut InputBinder {
        &mut self.binder
    }

    /// Render backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable render backend, for loading resources
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Presentation surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable presentation surface
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Current projection matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Loop state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Change the clear color
    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
        self.backend.set_clear_color(rgba);
    }

    /// Current clear color
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Tick until the surface asks to close, then release everything
    pub fn run(&mut self, app: &mut impl Application) -> Result<(), EngineError> {
        log::info!("Starting frame loop...");
        self.timer.reset_reference();

        while self.state == FrameState::Running && !self.surface.should_close() {
            if let Err(err) = self.tick(app) {
                log::error!("Frame {} failed: {}", self.timer.frame_count(), err);
                self.shutdown();
                return Err(err);
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Run one frame
    pub fn tick(&mut self, app: &mut impl Application) -> Result<(), EngineError> {
        let delta_time = self.timer.update();

        self.upload_transformation()?;
        self.upload_lights()?;
        self.dispatch_input(app, delta_time)?;
        app.update(self, delta_time)?;

        if let Some(post) = &self.post_processor {
            post.bind(&mut self.backend);
            post.clear(&mut self.backend);
        } else {
            self.backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        }

        if let Some(skybox) = &self.skybox {
            skybox.render(&mut self.backend);
        }
        let ctx = FrameContext {
            view_position: self.camera.position(),
            delta_time,
        };
        for (_, node) in self.nodes.iter() {
            node.render(&ctx, &mut self.backend);
        }
        if let Some(post) = &self.post_processor {
            post.render(&mut self.backend);
        }

        self.surface.swap_and_poll(self.binder.queue_mut());
        Ok(())
    }

    /// Release every GPU resource and stop the loop
    pub fn shutdown(&mut self) {
        if self.state == FrameState::Stopped {
            return;
        }
        for mut node in self.nodes.drain() {
            node.release(&mut self.backend);
        }
        if let Some(post) = self.post_processor.take() {
            post.release(&mut self.backend);
        }
        self.remove_skybox();
        if let Some(ubo) = self.transformation_ubo.take() {
            ubo.release(&mut self.backend);
        }
        if let Some(ubo) = self.light_ubo.take() {
            ubo.release(&mut self.backend);
        }
        self.point_attachments.clear();
        self.spot_attachments.clear();
        self.state = FrameState::Stopped;
        log::info!(
            "Frame loop stopped after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
    }

    fn upload_transformation(&mut self) -> Result<(), EngineError> {
        if self.surface.take_resized() {
            let (width, height) = self.surface.size();
            self.projection = self.surface.projection();
            self.backend.set_viewport(width, height);
            if let Some(post) = &mut self.post_processor {
                post.resize(&mut self.backend, width, height)?;
            }
            log::debug!("Surface resized to {width}x{height}");
        }

        if let Some(ubo) = &self.transformation_ubo {
            let block = TransformationBlock::new(&self.projection, &self.camera.view_matrix());
            ubo.update_pod(&mut self.backend, &block)?;
        }
        Ok(())
    }

    fn upload_lights(&mut self) -> Result<(), EngineError> {
        let Some(lights) = self.lights.as_mut() else {
            return Ok(());
        };

        self.camera.sync_flashlight(lights);
        for (handle, id) in &self.point_attachments {
            if let (Some(node), Some(light)) = (self.nodes.get(handle.0), lights.point_mut(*id)) {
                light.position = node.translation();
            }
        }
        for (handle, id) in &self.spot_attachments {
            if let (Some(node), Some(light)) = (self.nodes.get(handle.0), lights.spot_mut(*id)) {
                light.position = node.translation();
            }
        }

        if let Some(ubo) = &self.light_ubo {
            ubo.update(&mut self.backend, &lights.serialize())?;
        }
        Ok(())
    }

    fn dispatch_input(&mut self, app: &mut impl Application, delta_time: f32) -> Result<(), EngineError> {
        for fired in self.binder.process(&self.surface) {
            match fired {
                Fired::Action(Action::MoveCamera(direction)) => {
                    match direction {
                        CameraMovement::Forward => self.camera.move_forward(delta_time),
                        CameraMovement::Back => self.camera.move_back(delta_time),
                        CameraMovement::Left => self.camera.move_left(delta_time),
                        CameraMovement::Right => self.camera.move_right(delta_time),
                    }
                    self.sync_flashlight();
                }
                Fired::Action(Action::ToggleFlashlight) => self.toggle_flashlight(),
                Fired::Action(Action::ToggleWireframe(handle)) => {
                    if let Some(node) = self.nodes.get_mut(handle.0) {
                        let wireframe = !node.wireframe();
                        node.set_wireframe(wireframe);
                    }
                }
                Fired::Action(Action::RequestClose) => {
                    log::info!("Close requested by input binding");
                    self.surface.request_close();
                }
                Fired::Action(Action::Custom(id)) => {
                    app.on_action(self, id, delta_time)?;
                    self.sync_flashlight();
                }
                Fired::CloseRequested => {
                    log::info!("Close requested by the surface");
                    self.surface.request_close();
                }
                Fired::Cursor {
                    target: MouseTarget::CameraLook,
                    x,
                    y,
                } => {
                    self.camera.process_cursor(x, y);
                    self.sync_flashlight();
                }
                Fired::Cursor {
                    target: MouseTarget::Custom(id),
                    x,
                    y,
                } => {
                    app.on_cursor(self, id, x, y)?;
                    self.sync_flashlight();
                }
            }
        }
        Ok(())
    }

    fn sync_flashlight(&mut self) {
        if let Some(lights) = self.lights.as_mut() {
            self.camera.sync_flashlight(lights);
        }
    }

    fn toggle_flashlight(&mut self) {
        let Some(id) = self.camera.flashlight() else {
            return;
        };
        if let Some(spot) = self.lights.as_mut().and_then(|lights| lights.spot_mut(id)) {
            spot.enabled = !spot.enabled;
            log::debug!("Flashlight {}", if spot.enabled { "on" } else { "off" });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::input::{KeyCode, TriggerMode};
    use crate::render::api::UniformBufferHandle;
    use crate::render::lighting::{Attenuation, LightColor, PointLight, SpotLight};
    use crate::render::recording::{Command, RecordingBackend};
    use crate::render::shader::BuiltinShader;
    use crate::render::window::HeadlessSurface;
    use crate::scene::DrawableSource;

    type TestScene = SceneManager<RecordingBackend, HeadlessSurface>;

    fn scene(frames: u64) -> TestScene {
        SceneManager::new(
            RecordingBackend::new(),
            HeadlessSurface::new(640, 480).with_frame_limit(frames),
        )
        .unwrap()
    }

    fn box_node(scene: &mut TestScene) -> SceneNode {
        let backend = scene.backend_mut();
        let shader = Shader::from_source(backend, &BuiltinShader::LightMarker.source()).unwrap();
        let wireframe = Shader::from_source(backend, &BuiltinShader::Wireframe.source()).unwrap();
        SceneNode::new(Rc::new(shader), Rc::new(wireframe)).with_drawable(DrawableSource::ProceduralBox)
    }

    fn ubo_at(scene: &TestScene, binding: u32) -> UniformBufferHandle {
        scene
            .backend()
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::CreateUniformBuffer { handle, binding: b, .. } if *b == binding => Some(*handle),
                _ => None,
            })
            .unwrap()
    }

    fn flashlight() -> SpotLight {
        SpotLight::new(
            Vec3::zeros(),
            -Vec3::z(),
            LightColor::white(0.0, 1.0, 1.0),
            Attenuation::RANGE_50,
            12.5,
            17.5,
        )
    }

    #[derive(Default)]
    struct Recorder {
        actions: Vec<u32>,
        cursor: Vec<(u32, f64, f64)>,
        updates: usize,
    }

    impl Application for Recorder {
        fn on_action<B: RenderBackend, S: PresentationSurface>(
            &mut self,
            _scene: &mut SceneManager<B, S>,
            id: u32,
            _delta_time: f32,
        ) -> Result<(), AppError> {
            self.actions.push(id);
            Ok(())
        }

        fn on_cursor<B: RenderBackend, S: PresentationSurface>(
            &mut self,
            _scene: &mut SceneManager<B, S>,
            id: u32,
            x: f64,
            y: f64,
        ) -> Result<(), AppError> {
            self.cursor.push((id, x, y));
            Ok(())
        }

        fn update<B: RenderBackend, S: PresentationSurface>(
            &mut self,
            _scene: &mut SceneManager<B, S>,
            _delta_time: f32,
        ) -> Result<(), AppError> {
            self.updates += 1;
            Ok(())
        }
    }

    #[test]
    fn test_slot_handles_are_reused() {
        let mut scene = scene(1);
        let handles: Vec<NodeHandle> = (0..3)
            .map(|_| {
                let node = box_node(&mut scene);
                scene.add_node(node)
            })
            .collect();
        assert_eq!(handles, vec![NodeHandle(0), NodeHandle(1), NodeHandle(2)]);

        assert!(scene.remove_node(NodeHandle(1)).is_some());
        assert!(scene.node(NodeHandle(1)).is_none());
        assert!(scene.node(NodeHandle(5)).is_none());
        assert!(scene.remove_node(NodeHandle(1)).is_none());

        let node = box_node(&mut scene);
        assert_eq!(scene.add_node(node), NodeHandle(1));
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn test_render_order_follows_handles_after_reuse() {
        let mut scene = scene(10);
        for _ in 0..3 {
            let node = box_node(&mut scene);
            scene.add_node(node);
        }
        scene.remove_node(NodeHandle(0));
        let node = box_node(&mut scene);
        assert_eq!(scene.add_node(node), NodeHandle(0));

        let geometry_of = |scene: &TestScene, index: usize| {
            scene.node(NodeHandle(index)).unwrap().drawable().unwrap().geometry()[0].handle
        };
        let expected: Vec<_> = (0..3).map(|index| geometry_of(&scene, index)).collect();
        // the reused slot holds the newest geometry, yet draws first
        assert!(expected[0] > expected[2]);

        scene.backend_mut().clear_log();
        scene.tick(&mut ()).unwrap();

        let bound: Vec<_> = scene
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::BindGeometry(handle) => Some(*handle),
                _ => None,
            })
            .collect();
        assert_eq!(bound, expected);
    }

    #[test]
    fn test_removed_node_releases_geometry() {
        let mut scene = scene(1);
        let node = box_node(&mut scene);
        let handle = scene.add_node(node);
        let geometry = scene.node(handle).unwrap().drawable().unwrap().geometry()[0].handle;

        scene.remove_node(handle);
        assert!(scene
            .backend()
            .commands()
            .contains(&Command::ReleaseGeometry(geometry)));
    }

    #[test]
    fn test_tick_order() {
        let mut scene = scene(10);
        let mut lights = LightSet::new();
        lights.add_point(PointLight::new(
            Vec3::zeros(),
            LightColor::white(0.1, 0.8, 1.0),
            Attenuation::RANGE_50,
        ));
        scene.set_light_set(lights).unwrap();
        let node = box_node(&mut scene);
        scene.add_node(node);

        let transformation = ubo_at(&scene, TRANSFORMATION_BINDING);
        let light = ubo_at(&scene, LIGHT_SET_BINDING);
        scene.backend_mut().clear_log();
        scene.tick(&mut ()).unwrap();

        let commands = scene.backend().commands();
        let position = |pred: &dyn Fn(&Command) -> bool| commands.iter().position(|c| pred(c)).unwrap();
        let transform_upload = position(&|c: &Command| {
            matches!(c, Command::UpdateUniformBuffer { handle, .. } if *handle == transformation)
        });
        let light_upload =
            position(&|c: &Command| matches!(c, Command::UpdateUniformBuffer { handle, .. } if *handle == light));
        let clear = position(&|c: &Command| matches!(c, Command::Clear(_)));
        let draw = position(&|c: &Command| matches!(c, Command::DrawElements(_)));

        assert!(transform_upload < light_upload);
        assert!(light_upload < clear);
        assert!(clear < draw);
        assert_eq!(
            scene.backend().last_upload_to_binding(TRANSFORMATION_BINDING).map(<[u8]>::len),
            Some(TransformationBlock::SIZE)
        );
        assert_eq!(
            scene.backend().last_upload_to_binding(LIGHT_SET_BINDING).map(<[u8]>::len),
            Some(LightSet::BLOCK_SIZE)
        );
        assert_eq!(scene.surface().frames_presented(), 1);
    }

    #[test]
    fn test_run_stops_at_frame_limit_and_releases() {
        let mut scene = scene(3);
        let node = box_node(&mut scene);
        scene.add_node(node);
        let mut app = Recorder::default();

        scene.run(&mut app).unwrap();

        assert_eq!(scene.state(), FrameState::Stopped);
        assert_eq!(scene.surface().frames_presented(), 3);
        assert_eq!(app.updates, 3);
        assert_eq!(scene.node_count(), 0);
        assert!(scene
            .backend()
            .commands()
            .iter()
            .any(|c| matches!(c, Command::ReleaseGeometry(_))));
        assert!(scene
            .backend()
            .commands()
            .iter()
            .any(|c| matches!(c, Command::ReleaseUniformBuffer(_))));
    }

    #[test]
    fn test_unloaded_nodes_are_skipped() {
        let mut scene = scene(1);
        scene.backend_mut().fail_geometry_uploads(true);
        let node = box_node(&mut scene);
        let handle = scene.add_node(node);
        assert!(!scene.node(handle).unwrap().is_loaded());

        scene.tick(&mut ()).unwrap();
        assert_eq!(scene.backend().draw_call_count(), 0);
    }

    #[test]
    fn test_flashlight_toggle_from_scripted_key() {
        let mut scene = scene(10);
        let mut lights = LightSet::new();
        let id = lights.add_spot(flashlight()).unwrap();
        scene.set_light_set(lights).unwrap();
        scene.camera_mut().attach_flashlight(id);
        scene
            .input_mut()
            .bind(KeyCode::F, TriggerMode::Pressed, Action::ToggleFlashlight);
        scene.surface_mut().set_pressed_at(1, KeyCode::F, true);

        scene.tick(&mut ()).unwrap();
        assert!(scene.lights().unwrap().spot(id).unwrap().enabled);

        scene.tick(&mut ()).unwrap();
        assert!(!scene.lights().unwrap().spot(id).unwrap().enabled);

        // held, not a new press
        scene.tick(&mut ()).unwrap();
        assert!(!scene.lights().unwrap().spot(id).unwrap().enabled);
    }

    #[test]
    fn test_custom_actions_and_cursor_reach_application() {
        let mut scene = scene(10);
        scene
            .input_mut()
            .bind(KeyCode::Space, TriggerMode::Held, Action::Custom(7));
        scene.input_mut().subscribe_mouse(MouseTarget::Custom(2));
        scene.surface_mut().press(KeyCode::Space);
        scene
            .surface_mut()
            .push_event_at(1, crate::input::InputEvent::CursorMoved { x: 10.0, y: 20.0 });
        let mut app = Recorder::default();

        scene.tick(&mut app).unwrap();
        scene.tick(&mut app).unwrap();

        assert_eq!(app.actions, vec![7, 7]);
        assert_eq!(app.cursor, vec![(2, 10.0, 20.0)]);
    }

    #[test]
    fn test_camera_look_moves_flashlight() {
        let mut scene = scene(10);
        let mut lights = LightSet::new();
        let id = lights.add_spot(flashlight()).unwrap();
        scene.set_light_set(lights).unwrap();
        scene.camera_mut().attach_flashlight(id);
        scene.input_mut().subscribe_mouse(MouseTarget::CameraLook);
        for (frame, x) in [(1, 100.0), (2, 200.0)] {
            scene
                .surface_mut()
                .push_event_at(frame, crate::input::InputEvent::CursorMoved { x, y: 50.0 });
        }

        for _ in 0..3 {
            scene.tick(&mut ()).unwrap();
        }

        let front = scene.camera().front();
        assert!((front - (-Vec3::z())).norm() > 1e-3);
        let spot = scene.lights().unwrap().spot(id).unwrap();
        assert_eq!(spot.direction, front);
    }

    #[test]
    fn test_attached_light_follows_node() {
        let mut scene = scene(10);
        let mut lights = LightSet::new();
        let id = lights
            .add_point(PointLight::new(
                Vec3::zeros(),
                LightColor::white(0.1, 0.8, 1.0),
                Attenuation::RANGE_50,
            ))
            .unwrap();
        scene.set_light_set(lights).unwrap();
        let node = box_node(&mut scene);
        let handle = scene.add_node(node);
        scene.attach_point_light(handle, id);

        scene
            .node_mut(handle)
            .unwrap()
            .set_translation(Vec3::new(1.0, 2.0, 3.0));
        scene.tick(&mut ()).unwrap();

        assert_eq!(
            scene.lights().unwrap().point(id).unwrap().position,
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_wireframe_toggle_and_close_bindings() {
        let mut scene = scene(10);
        let node = box_node(&mut scene);
        let handle = scene.add_node(node);
        scene
            .input_mut()
            .bind(KeyCode::Tab, TriggerMode::Pressed, Action::ToggleWireframe(handle));
        scene
            .input_mut()
            .bind(KeyCode::Escape, TriggerMode::Pressed, Action::RequestClose);
        scene.surface_mut().press(KeyCode::Tab);
        scene.surface_mut().press(KeyCode::Escape);

        scene.run(&mut ()).unwrap();

        assert_eq!(scene.surface().frames_presented(), 1);
        assert_eq!(scene.state(), FrameState::Stopped);
        assert!(scene
            .backend()
            .commands()
            .contains(&Command::PolygonMode(crate::render::api::PolygonMode::Line)));
    }

    #[test]
    fn test_close_event_from_surface_stops_loop() {
        let mut scene = scene(10);
        scene
            .surface_mut()
            .push_event_at(2, crate::input::InputEvent::CloseRequested);

        scene.run(&mut ()).unwrap();

        // queued at the second present, handled by the third tick
        assert_eq!(scene.surface().frames_presented(), 3);
        assert_eq!(scene.state(), FrameState::Stopped);
    }

    struct ResetOnAction(Vec3);

    impl Application for ResetOnAction {
        fn on_action<B: RenderBackend, S: PresentationSurface>(
            &mut self,
            scene: &mut SceneManager<B, S>,
            _id: u32,
            _delta_time: f32,
        ) -> Result<(), AppError> {
            scene.camera_mut().set_position(self.0);
            Ok(())
        }
    }

    #[test]
    fn test_camera_reset_moves_flashlight_same_tick() {
        let mut scene = scene(10);
        let mut lights = LightSet::new();
        let id = lights.add_spot(flashlight()).unwrap();
        scene.set_light_set(lights).unwrap();
        scene.camera_mut().attach_flashlight(id);
        scene
            .input_mut()
            .bind(KeyCode::R, TriggerMode::Pressed, Action::Custom(1));
        scene.surface_mut().press(KeyCode::R);
        let target = Vec3::new(4.0, 5.0, 6.0);

        scene.tick(&mut ResetOnAction(target)).unwrap();

        assert_eq!(scene.lights().unwrap().spot(id).unwrap().position, target);
    }

    #[test]
    fn test_camera_moved_by_update_reaches_flashlight_upload() {
        struct Teleport;
        impl Application for Teleport {
            fn update<B: RenderBackend, S: PresentationSurface>(
                &mut self,
                scene: &mut SceneManager<B, S>,
                _delta_time: f32,
            ) -> Result<(), AppError> {
                scene.camera_mut().set_position(Vec3::new(0.0, 9.0, 0.0));
                Ok(())
            }
        }

        let mut scene = scene(10);
        let mut lights = LightSet::new();
        let id = lights.add_spot(flashlight()).unwrap();
        scene.set_light_set(lights).unwrap();
        scene.camera_mut().attach_flashlight(id);

        scene.tick(&mut Teleport).unwrap();
        scene.tick(&mut Teleport).unwrap();

        assert_eq!(
            scene.lights().unwrap().spot(id).unwrap().position,
            Vec3::new(0.0, 9.0, 0.0)
        );
    }

    #[test]
    fn test_skybox_drawn_after_clear_before_nodes() {
        let mut scene = scene(10);
        let shader = Shader::from_source(scene.backend_mut(), &BuiltinShader::Skybox.source()).unwrap();
        let faces: crate::render::api::CubeFaces = std::array::from_fn(|_| crate::render::api::TextureImage {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        });
        let skybox = Skybox::new(scene.backend_mut(), Rc::new(shader), &faces).unwrap();
        let cubemap = skybox.cubemap();
        scene.set_skybox(skybox);
        let node = box_node(&mut scene);
        scene.add_node(node);
        scene.backend_mut().clear_log();

        scene.tick(&mut ()).unwrap();

        let commands = scene.backend().commands();
        let position = |pred: &dyn Fn(&Command) -> bool| commands.iter().position(|c| pred(c)).unwrap();
        let clear = position(&|c: &Command| matches!(c, Command::Clear(_)));
        let sky = position(&|c: &Command| matches!(c, Command::BindCubemap { .. }));
        let node_model = position(&|c: &Command| matches!(c, Command::SetUniform { name, .. } if name == "model"));
        assert!(clear < sky);
        assert!(sky < node_model);
        assert_eq!(scene.backend().draw_call_count(), 2);

        scene.shutdown();
        assert!(scene.backend().commands().contains(&Command::ReleaseTexture(cubemap)));
    }

    #[test]
    fn test_post_processor_wraps_node_rendering() {
        let mut scene = scene(10);
        let shader = Shader::from_source(scene.backend_mut(), &BuiltinShader::ScreenQuad.source()).unwrap();
        scene.enable_post_processor(Rc::new(shader)).unwrap();
        let node = box_node(&mut scene);
        scene.add_node(node);
        scene.backend_mut().clear_log();

        scene.tick(&mut ()).unwrap();

        let commands = scene.backend().commands();
        let offscreen = commands
            .iter()
            .position(|c| matches!(c, Command::BindFramebuffer(Some(_))))
            .unwrap();
        let node_draw = commands
            .iter()
            .position(|c| matches!(c, Command::DrawElements(_)))
            .unwrap();
        let quad_draw = commands
            .iter()
            .position(|c| matches!(c, Command::DrawArrays(_)))
            .unwrap();
        assert!(offscreen < node_draw);
        assert!(node_draw < quad_draw);
    }
}
