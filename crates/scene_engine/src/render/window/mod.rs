//! Window management subsystem
//!
//! ```text
//! ┌──────────────────────┐
//! │    SceneManager      │
//! └──────────┬───────────┘
//!            │ S: PresentationSurface
//!   ┌────────▼────────────┐
//!   │ PresentationSurface │ ← trait (backend.rs)
//!   └────────┬────────────┘
//!            │ implemented by
//!   ┌────────▼────────────┐
//!   │ GlfwWindow          │ ← OpenGL 3.3 core window (glfw_window.rs)
//!   │ HeadlessSurface     │ ← scripted, windowless (headless.rs)
//!   └─────────────────────┘
//! ```

pub mod backend;
pub mod glfw_window;
pub mod headless;

pub use backend::{projection_for_size, PresentationSurface, FAR_PLANE, FOV_Y_DEGREES, NEAR_PLANE};
pub use glfw_window::{GlfwWindow, WindowError, WindowResult};
pub use headless::HeadlessSurface;
