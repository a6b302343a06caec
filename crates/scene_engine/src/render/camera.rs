//! # First-Person Camera
//!
//! Yaw/pitch fly camera driven by keyboard movement and cursor look.
//!
//! ## Conventions
//! - Right-handed, Y-up world space
//! - Yaw 0° looks down +X; the default yaw of -90° looks down -Z
//! - Pitch is clamped to ±89° so the view basis never degenerates
//!
//! A camera may own a flashlight: a spot light in the active
//! [`LightSet`](crate::render::lighting::LightSet) whose position and
//! direction follow the camera after every movement or look update.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::lighting::{LightSet, SpotLightId};

/// Pitch limit in degrees
pub const PITCH_LIMIT: f32 = 89.0;

/// First-person camera
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    up: Vec3,
    front: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,
    first_move: bool,
    last_cursor: (f64, f64),
    flashlight: Option<SpotLightId>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::y())
    }
}

impl Camera {
    /// Default movement speed in units per second
    pub const DEFAULT_SPEED: f32 = 0.5;
    /// Default degrees of rotation per pixel of cursor travel
    pub const DEFAULT_SENSITIVITY: f32 = 0.07;
    /// Initial yaw in degrees
    pub const DEFAULT_YAW: f32 = -90.0;

    /// Create a camera at `position` with the given up vector
    ///
    /// The camera starts looking down -Z (yaw -90°, pitch 0°).
    pub fn new(position: Vec3, up: Vec3) -> Self {
        let mut camera = Self {
            position,
            up,
            front: -Vec3::z(),
            yaw: Self::DEFAULT_YAW,
            pitch: 0.0,
            speed: Self::DEFAULT_SPEED,
            sensitivity: Self::DEFAULT_SENSITIVITY,
            first_move: true,
            last_cursor: (0.0, 0.0),
            flashlight: None,
        };
        camera.update_direction(0.0, 0.0);
        camera
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the camera to a new position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Movement speed in units per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Change the movement speed
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Degrees per pixel of cursor travel
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Change the look sensitivity
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    /// Whether the next cursor sample will only be recorded
    pub fn first_move(&self) -> bool {
        self.first_move
    }

    /// Make the next cursor sample a reference sample again
    ///
    /// Call after the cursor was warped or re-captured.
    pub fn reset_first_move(&mut self) {
        self.first_move = true;
    }

    /// Step forward along the view direction
    pub fn move_forward(&mut self, delta_time: f32) {
        self.position += self.front * self.speed * delta_time;
    }

    /// Step backward along the view direction
    pub fn move_back(&mut self, delta_time: f32) {
        self.position -= self.front * self.speed * delta_time;
    }

    /// Strafe left
    pub fn move_left(&mut self, delta_time: f32) {
        self.position -= self.right() * self.speed * delta_time;
    }

    /// Strafe right
    pub fn move_right(&mut self, delta_time: f32) {
        self.position += self.right() * self.speed * delta_time;
    }

    /// Feed an absolute cursor position
    ///
    /// The first sample after construction (or [`Self::reset_first_move`])
    /// only records the position. Later samples turn the cursor offset,
    /// scaled by the sensitivity, into yaw and pitch. Screen Y grows
    /// downward, so the pitch offset is inverted.
    #[allow(clippy::cast_possible_truncation)]
    pub fn process_cursor(&mut self, x: f64, y: f64) {
        if self.first_move {
            self.last_cursor = (x, y);
            self.first_move = false;
            return;
        }
        let x_offset = (x - self.last_cursor.0) as f32 * self.sensitivity;
        let y_offset = (self.last_cursor.1 - y) as f32 * self.sensitivity;
        self.last_cursor = (x, y);
        self.update_direction(x_offset, y_offset);
    }

    /// Add yaw and pitch in degrees and rebuild the front vector
    pub fn update_direction(&mut self, yaw_offset: f32, pitch_offset: f32) {
        self.yaw += yaw_offset;
        self.pitch = (self.pitch + pitch_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
    }

    /// View-from-world matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// Attach a spot light that should follow this camera
    pub fn attach_flashlight(&mut self, light: SpotLightId) {
        self.flashlight = Some(light);
    }

    /// Flashlight id, if any
    pub fn flashlight(&self) -> Option<SpotLightId> {
        self.flashlight
    }

    /// Copy position and direction into the attached flashlight
    pub fn sync_flashlight(&self, lights: &mut LightSet) {
        if let Some(spot) = self.flashlight.and_then(|id| lights.spot_mut(id)) {
            spot.position = self.position;
            spot.direction = self.front;
        }
    }

    fn right(&self) -> Vec3 {
        self.front.cross(&self.up).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::lighting::{Attenuation, LightColor, SpotLight};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.front(), -Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(camera.speed(), 0.5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.update_direction(0.0, 500.0);
        assert_relative_eq!(camera.pitch(), PITCH_LIMIT);
        camera.update_direction(0.0, -1000.0);
        assert_relative_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_first_cursor_sample_only_records() {
        let mut camera = Camera::default();
        camera.process_cursor(400.0, 300.0);
        assert_relative_eq!(camera.yaw(), Camera::DEFAULT_YAW);

        camera.process_cursor(410.0, 290.0);
        assert_relative_eq!(camera.yaw(), Camera::DEFAULT_YAW + 10.0 * Camera::DEFAULT_SENSITIVITY, epsilon = 1e-5);
        assert_relative_eq!(camera.pitch(), 10.0 * Camera::DEFAULT_SENSITIVITY, epsilon = 1e-5);
    }

    #[test]
    fn test_strafe_is_perpendicular_to_front() {
        let mut camera = Camera::default();
        camera.set_speed(2.0);
        camera.move_right(0.5);
        assert_relative_eq!(camera.position(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        camera.move_forward(1.0);
        assert_relative_eq!(camera.position(), Vec3::new(1.0, 0.0, -2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_flashlight_follows_camera() {
        let mut lights = LightSet::new();
        let id = lights
            .add_spot(SpotLight::new(
                Vec3::zeros(),
                Vec3::x(),
                LightColor::white(0.0, 1.0, 1.0),
                Attenuation::RANGE_50,
                12.5,
                17.5,
            ))
            .unwrap();
        let mut camera = Camera::new(Vec3::new(0.0, 1.0, 3.0), Vec3::y());
        camera.attach_flashlight(id);
        camera.sync_flashlight(&mut lights);

        let spot = lights.spot(id).unwrap();
        assert_relative_eq!(spot.position, Vec3::new(0.0, 1.0, 3.0));
        assert_relative_eq!(spot.direction, camera.front());
    }
}
