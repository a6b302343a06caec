//! Demo scene
//!
//! Ten textured crates lit by a directional light, two point lights (each
//! drawn as a small white marker box) and a flashlight that follows the
//! camera.
//!
//! ```text
//! crate_scene [CONFIG] [--headless FRAMES]
//! ```
//!
//! `CONFIG` is a `.toml` or `.ron` [`ViewerConfig`]. Without `--headless`
//! a GLFW window provides input and presentation and the scene is drawn
//! through its OpenGL context. With `--headless` commands are recorded
//! instead and the draw call count is logged on exit.
//!
//! A relative `render.skybox` directory is looked up under the bundled
//! resources.
//!
//! Controls: WASD to move, mouse to look, F toggles the flashlight,
//! Tab toggles wireframe on the first crate, R returns the camera to its
//! start position and Escape quits.

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::scene::geometry::textured_cube;
use std::error::Error;
use std::path::Path;
use std::rc::Rc;

const RESOURCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources");

const RESET_CAMERA: u32 = 1;

const BOX_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

const POINT_LIGHTS: [[f32; 3]; 2] = [[-2.0, 0.3, 1.0], [0.5, 1.2, -9.0]];

/// Spins the first crate and handles the camera reset key
struct DemoApp {
    spinner: NodeHandle,
    start_position: Vec3,
}

impl Application for DemoApp {
    fn on_action<B: RenderBackend, S: PresentationSurface>(
        &mut self,
        scene: &mut SceneManager<B, S>,
        id: u32,
        _delta_time: f32,
    ) -> Result<(), AppError> {
        if id == RESET_CAMERA {
            log::info!("Camera reset to {:?}", self.start_position);
            scene.camera_mut().set_position(self.start_position);
        }
        Ok(())
    }

    fn update<B: RenderBackend, S: PresentationSurface>(
        &mut self,
        scene: &mut SceneManager<B, S>,
        delta_time: f32,
    ) -> Result<(), AppError> {
        if let Some(node) = scene.node_mut(self.spinner) {
            node.add_rotation(Vec3::new(0.0, 20.0 * delta_time, 0.0));
        }

        let frame = scene.timer().frame_count();
        if frame > 0 && frame % 600 == 0 {
            log::debug!("Frame {}: {:.1} fps", frame, scene.timer().average_fps());
        }
        Ok(())
    }
}

struct Options {
    config: ViewerConfig,
    headless_frames: Option<u64>,
}

fn parse_args() -> Result<Options, Box<dyn Error>> {
    let mut config = None;
    let mut headless_frames = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--headless" {
            let frames = args.next().ok_or("--headless needs a frame count")?;
            headless_frames = Some(frames.parse::<u64>()?);
        } else {
            config = Some(ViewerConfig::load_from_file(&arg)?);
        }
    }

    let config = config.unwrap_or_else(|| {
        ViewerConfig::default()
            .with_window_size(600, 450)
            .with_title("Basic example")
            .with_camera_position(Vec3::zeros())
            .with_camera_speed(3.5)
    });
    config.validate()?;

    Ok(Options {
        config,
        headless_frames,
    })
}

fn build_scene<B: RenderBackend, S: PresentationSurface>(
    config: &ViewerConfig,
    backend: B,
    surface: S,
) -> Result<(SceneManager<B, S>, DemoApp), Box<dyn Error>> {
    let mut scene = SceneManager::new(backend, surface)?;
    scene.set_clear_color(config.render.clear_color);

    let camera = scene.camera_mut();
    camera.set_position(config.camera.position);
    camera.set_speed(config.camera.speed);
    camera.set_sensitivity(config.camera.sensitivity);

    let resources = Path::new(RESOURCE_DIR);
    let mut cache = ResourceCache::new();
    let lit = cache.shader_or_unloaded(
        scene.backend_mut(),
        &ShaderDescriptor::files(resources.join("shaders/lit.vert"), resources.join("shaders/lit.frag")),
    );
    let marker = cache.shader(
        scene.backend_mut(),
        &ShaderDescriptor::Builtin(BuiltinShader::LightMarker),
    )?;
    let wireframe = cache.wireframe_shader(scene.backend_mut());
    let container = cache.material_or_unloaded(
        scene.backend_mut(),
        &MaterialDescriptor::new(
            resources.join("textures/crate.png"),
            resources.join("textures/crate_specular.png"),
            32.0,
        ),
    );

    let cube = Rc::new(textured_cube());
    let mut boxes = Vec::with_capacity(BOX_POSITIONS.len());
    for (i, position) in (0u8..).zip(BOX_POSITIONS) {
        let mut node = SceneNode::new(Rc::clone(&lit), Rc::clone(&wireframe))
            .with_name(format!("crate {i}"))
            .with_drawable(DrawableSource::StaticMesh(Rc::clone(&cube)));
        let angle = f32::from(i);
        node.set_translation(Vec3::from(position));
        node.set_rotation(Vec3::new(3.65 * angle, 23.78 * angle, 43.12 * angle));
        node.add_material(Rc::clone(&container));
        boxes.push(scene.add_node(node));
    }

    let light_color = LightColor::white(0.05, 0.55, 1.0);
    let mut lights = LightSet::new();
    lights.add_directional(DirectionalLight::new(Vec3::new(-0.2, -1.0, -0.3), light_color));
    let mut point_ids = Vec::new();
    for position in POINT_LIGHTS {
        let light = PointLight::new(Vec3::from(position), light_color, Attenuation::RANGE_50);
        if let Some(id) = lights.add_point(light) {
            point_ids.push((id, position));
        }
    }
    let camera = scene.camera();
    let flashlight = lights.add_spot(SpotLight::new(
        camera.position(),
        camera.front(),
        light_color,
        Attenuation::RANGE_50,
        12.5,
        17.5,
    ));
    scene.set_light_set(lights)?;

    if let Some(id) = flashlight {
        scene.camera_mut().attach_flashlight(id);
    }
    for (id, position) in point_ids {
        let mut marker_node = SceneNode::new(Rc::clone(&marker), Rc::clone(&wireframe))
            .with_name("light marker")
            .with_drawable(DrawableSource::LightVisualization {
                color: Vec3::repeat(1.0),
            });
        marker_node.set_translation(Vec3::from(position));
        marker_node.set_uniform_scale(0.2);
        let handle = scene.add_node(marker_node);
        scene.attach_point_light(handle, id);
    }

    if let Some(dir) = &config.render.skybox {
        let shader = cache.shader(
            scene.backend_mut(),
            &ShaderDescriptor::Builtin(BuiltinShader::Skybox),
        )?;
        match Skybox::from_directory(scene.backend_mut(), shader, &resources.join(dir)) {
            Ok(skybox) => scene.set_skybox(skybox),
            Err(err) => log::error!("Skybox disabled: {}", err),
        }
    }

    if config.render.post_processing {
        let quad = cache.shader(
            scene.backend_mut(),
            &ShaderDescriptor::Builtin(BuiltinShader::ScreenQuad),
        )?;
        scene.enable_post_processor(quad)?;
    }

    let input = scene.input_mut();
    input.bind(KeyCode::W, TriggerMode::Held, Action::MoveCamera(CameraMovement::Forward));
    input.bind(KeyCode::S, TriggerMode::Held, Action::MoveCamera(CameraMovement::Back));
    input.bind(KeyCode::A, TriggerMode::Held, Action::MoveCamera(CameraMovement::Left));
    input.bind(KeyCode::D, TriggerMode::Held, Action::MoveCamera(CameraMovement::Right));
    input.bind(KeyCode::F, TriggerMode::Pressed, Action::ToggleFlashlight);
    input.bind(KeyCode::Tab, TriggerMode::Pressed, Action::ToggleWireframe(boxes[0]));
    input.bind(KeyCode::R, TriggerMode::Pressed, Action::Custom(RESET_CAMERA));
    input.bind(KeyCode::Escape, TriggerMode::Pressed, Action::RequestClose);
    input.subscribe_mouse(MouseTarget::CameraLook);

    let (shaders, textures, materials) = cache.counts();
    log::info!(
        "Scene ready: {} nodes, {} shaders, {} textures, {} materials",
        scene.node_count(),
        shaders,
        textures,
        materials
    );

    let app = DemoApp {
        spinner: boxes[0],
        start_position: config.camera.position,
    };
    Ok((scene, app))
}

fn run<B: RenderBackend, S: PresentationSurface>(
    config: &ViewerConfig,
    backend: B,
    surface: S,
) -> Result<SceneManager<B, S>, Box<dyn Error>> {
    let (mut scene, mut app) = build_scene(config, backend, surface)?;
    scene.run(&mut app)?;
    log::info!("Finished after {} frames", scene.timer().frame_count());
    Ok(scene)
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = parse_args()?;

    logging::init(options.config.logging.level_filter());

    log::info!("=== Scene Engine Demo ===");

    let config = &options.config;
    match options.headless_frames {
        Some(frames) => {
            log::info!("Running headless for {} frames", frames);
            let surface = HeadlessSurface::new(config.window.width, config.window.height)
                .with_frame_limit(frames);
            let scene = run(config, RecordingBackend::new(), surface)?;
            log::info!("{} draw calls recorded", scene.backend().draw_call_count());
        }
        None => {
            let mut window = GlfwWindow::new(&config.window)?;
            let backend = GlBackend::load(&mut window)?;
            run(config, backend, window)?;
        }
    }
    Ok(())
}
