//! Presentation surface trait
//!
//! The scene manager needs very little from a window: whether to keep
//! going, the framebuffer size, a projection that matches it, polled key
//! state, and a place to swap buffers and collect input events.

use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::input::{InputQueue, KeyState};

/// Vertical field of view of the default projection, in degrees
pub const FOV_Y_DEGREES: f32 = 45.0;
/// Near clip plane of the default projection
pub const NEAR_PLANE: f32 = 0.1;
/// Far clip plane of the default projection
pub const FAR_PLANE: f32 = 100.0;

/// Perspective projection for a framebuffer of `width` x `height`
///
/// A zero-height framebuffer (minimized window) is treated as square so the
/// matrix stays finite.
#[allow(clippy::cast_precision_loss)]
pub fn projection_for_size(width: u32, height: u32) -> Mat4 {
    let aspect = if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    };
    Mat4::perspective_gl(utils::deg_to_rad(FOV_Y_DEGREES), aspect, NEAR_PLANE, FAR_PLANE)
}

/// Window-like target the frame loop presents into
///
/// Everything runs on the thread that owns the graphics context.
pub trait PresentationSurface: KeyState {
    /// Whether a close was requested, by the user or by [`Self::request_close`]
    fn should_close(&self) -> bool;

    /// Ask the loop to stop after the current tick
    fn request_close(&mut self);

    /// Present the finished frame, then poll the window system
    ///
    /// Input received while polling is appended to `events`.
    fn swap_and_poll(&mut self, events: &mut InputQueue);

    /// Framebuffer size in pixels
    fn size(&self) -> (u32, u32);

    /// Whether the size changed since the last call; clears the flag
    fn take_resized(&mut self) -> bool;

    /// Perspective projection for the current size
    fn projection(&self) -> Mat4 {
        let (width, height) = self.size();
        projection_for_size(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_uses_aspect_ratio() {
        let wide = projection_for_size(800, 400);
        let square = projection_for_size(400, 400);
        assert_relative_eq!(wide[(0, 0)] * 2.0, square[(0, 0)], epsilon = 1e-6);
        assert_relative_eq!(wide[(1, 1)], square[(1, 1)]);
    }

    #[test]
    fn test_zero_height_projection_is_finite() {
        let proj = projection_for_size(640, 0);
        assert!(proj.iter().all(|v| v.is_finite()));
    }
}
