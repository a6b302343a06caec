//! Application trait and lifecycle hooks

use crate::assets::ResourceError;
use crate::engine::SceneManager;
use crate::render::api::RenderBackend;
use crate::render::window::PresentationSurface;
use thiserror::Error;

/// Application hooks called by the frame loop
///
/// Built-in actions (camera movement, flashlight and wireframe toggles,
/// close requests) are handled by the [`SceneManager`] itself. Everything
/// bound as [`Action::Custom`](crate::input::Action::Custom) or subscribed
/// as [`MouseTarget::Custom`](crate::input::MouseTarget::Custom) ends up
/// here. All hooks default to doing nothing.
pub trait Application {
    /// A custom key binding fired
    ///
    /// # Arguments
    /// * `scene` - The running scene
    /// * `id` - Id given to `Action::Custom`
    /// * `delta_time` - Seconds since the previous tick
    fn on_action<B: RenderBackend, S: PresentationSurface>(
        &mut self,
        scene: &mut SceneManager<B, S>,
        id: u32,
        delta_time: f32,
    ) -> Result<(), AppError> {
        let _ = (scene, id, delta_time);
        Ok(())
    }

    /// The cursor moved and `MouseTarget::Custom(id)` is subscribed
    fn on_cursor<B: RenderBackend, S: PresentationSurface>(
        &mut self,
        scene: &mut SceneManager<B, S>,
        id: u32,
        x: f64,
        y: f64,
    ) -> Result<(), AppError> {
        let _ = (scene, id, x, y);
        Ok(())
    }

    /// Called once per tick after input dispatch, before drawing
    fn update<B: RenderBackend, S: PresentationSurface>(
        &mut self,
        scene: &mut SceneManager<B, S>,
        delta_time: f32,
    ) -> Result<(), AppError> {
        let _ = (scene, delta_time);
        Ok(())
    }
}

/// Scene with no application logic
impl Application for () {}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] ResourceError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
