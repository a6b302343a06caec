//! GLFW-backed presentation surface
//!
//! Opens a window with an OpenGL 3.3 core context, captures the cursor for
//! first-person look and forwards cursor and close events into the
//! engine's input queue. Keys and buttons are polled through [`KeyState`].

use super::backend::PresentationSurface;
use crate::core::config::WindowConfig;
use crate::input::{InputEvent, InputQueue, InputSource, KeyCode, KeyState, MouseButton};
use glfw::Context;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// The window or its context could not be created
    #[error("Window creation failed ({width}x{height})")]
    CreationFailed {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window with a current OpenGL context
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    resized: bool,
}

impl GlfwWindow {
    /// Create the window and make its context current
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::OpenGl));
        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed {
                width: config.width,
                height: config.height,
            })?;

        window.make_current();
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        window.set_cursor_pos_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        if config.capture_cursor {
            window.set_cursor_mode(glfw::CursorMode::Disabled);
        }

        log::info!(
            "Created window '{}' ({}x{}, vsync: {})",
            config.title,
            config.width,
            config.height,
            config.vsync
        );

        Ok(Self {
            glfw,
            window,
            events,
            // first tick computes the projection
            resized: true,
        })
    }

    /// Address of an OpenGL entry point in the window's context
    pub fn get_proc_address(&mut self, symbol: &str) -> glfw::GLProc {
        self.window.get_proc_address(symbol)
    }

    fn translate(&mut self, event: glfw::WindowEvent) -> Option<InputEvent> {
        match event {
            glfw::WindowEvent::CursorPos(x, y) => Some(InputEvent::CursorMoved { x, y }),
            glfw::WindowEvent::FramebufferSize(width, height) => {
                log::debug!("Framebuffer resized to {width}x{height}");
                self.resized = true;
                None
            }
            glfw::WindowEvent::Close => Some(InputEvent::CloseRequested),
            _ => None,
        }
    }
}

impl KeyState for GlfwWindow {
    fn is_pressed(&self, source: InputSource) -> bool {
        match source {
            InputSource::Key(key) => self.window.get_key(key_to_glfw(key)) != glfw::Action::Release,
            InputSource::Mouse(button) => {
                self.window.get_mouse_button(button_to_glfw(button)) != glfw::Action::Release
            }
        }
    }
}

impl PresentationSurface for GlfwWindow {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn request_close(&mut self) {
        self.window.set_should_close(true);
    }

    fn swap_and_poll(&mut self, events: &mut InputQueue) {
        self.window.swap_buffers();
        self.glfw.poll_events();
        let pending: Vec<glfw::WindowEvent> =
            glfw::flush_messages(&self.events).map(|(_, event)| event).collect();
        for event in pending {
            if let Some(event) = self.translate(event) {
                events.push(event);
            }
        }
    }

    fn size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (u32::try_from(width).unwrap_or(0), u32::try_from(height).unwrap_or(0))
    }

    fn take_resized(&mut self) -> bool {
        std::mem::replace(&mut self.resized, false)
    }
}

fn key_to_glfw(key: KeyCode) -> glfw::Key {
    use glfw::Key as G;
    match key {
        KeyCode::A => G::A,
        KeyCode::B => G::B,
        KeyCode::C => G::C,
        KeyCode::D => G::D,
        KeyCode::E => G::E,
        KeyCode::F => G::F,
        KeyCode::G => G::G,
        KeyCode::H => G::H,
        KeyCode::I => G::I,
        KeyCode::J => G::J,
        KeyCode::K => G::K,
        KeyCode::L => G::L,
        KeyCode::M => G::M,
        KeyCode::N => G::N,
        KeyCode::O => G::O,
        KeyCode::P => G::P,
        KeyCode::Q => G::Q,
        KeyCode::R => G::R,
        KeyCode::S => G::S,
        KeyCode::T => G::T,
        KeyCode::U => G::U,
        KeyCode::V => G::V,
        KeyCode::W => G::W,
        KeyCode::X => G::X,
        KeyCode::Y => G::Y,
        KeyCode::Z => G::Z,
        KeyCode::Space => G::Space,
        KeyCode::Enter => G::Enter,
        KeyCode::Escape => G::Escape,
        KeyCode::Tab => G::Tab,
        KeyCode::LeftShift => G::LeftShift,
        KeyCode::Up => G::Up,
        KeyCode::Down => G::Down,
        KeyCode::Left => G::Left,
        KeyCode::Right => G::Right,
    }
}

fn button_to_glfw(button: MouseButton) -> glfw::MouseButton {
    match button {
        MouseButton::Left => glfw::MouseButton::Button1,
        MouseButton::Right => glfw::MouseButton::Button2,
        MouseButton::Middle => glfw::MouseButton::Button3,
    }
}
