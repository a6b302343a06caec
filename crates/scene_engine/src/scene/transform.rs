//! Node transform
//!
//! Translation, Euler rotation in degrees and scale, composed into a model
//! matrix as `T * Rx * Ry * Rz * S`. Rotation angles are kept in
//! `[0, 360)` after every mutation.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Position, orientation and scale of a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
        }
    }
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Translation
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Euler angles in degrees, each in `[0, 360)`
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Offset the translation
    pub fn add_translation(&mut self, delta: Vec3) {
        self.translation += delta;
    }

    /// Replace the translation, returning `new - old`
    pub fn set_translation(&mut self, translation: Vec3) -> Vec3 {
        let delta = translation - self.translation;
        self.translation = translation;
        delta
    }

    /// Offset the rotation (degrees)
    pub fn add_rotation(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.normalize_angles();
    }

    /// Replace the rotation (degrees), returning `new - old` before
    /// normalization
    pub fn set_rotation(&mut self, rotation: Vec3) -> Vec3 {
        let delta = rotation - self.rotation;
        self.rotation = rotation;
        self.normalize_angles();
        delta
    }

    /// Offset the scale
    pub fn add_scale(&mut self, delta: Vec3) {
        self.scale += delta;
    }

    /// Replace the scale, returning `new - old`
    pub fn set_scale(&mut self, scale: Vec3) -> Vec3 {
        let delta = scale - self.scale;
        self.scale = scale;
        delta
    }

    /// `translate * rotateX * rotateY * rotateZ * scale`
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation)
            * Mat4::rotation_x(utils::deg_to_rad(self.rotation.x))
            * Mat4::rotation_y(utils::deg_to_rad(self.rotation.y))
            * Mat4::rotation_z(utils::deg_to_rad(self.rotation.z))
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    fn normalize_angles(&mut self) {
        self.rotation = self.rotation.map(utils::normalize_degrees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_model_matrix_composition_order() {
        let mut transform = Transform::identity();
        transform.set_translation(Vec3::new(1.0, -2.0, 3.5));
        transform.set_rotation(Vec3::new(30.0, 45.0, 60.0));
        transform.set_scale(Vec3::new(2.0, 0.5, 1.5));

        let reference = Mat4::new_translation(&Vec3::new(1.0, -2.0, 3.5))
            * Mat4::from_axis_angle(&Vec3::x_axis(), 30f32.to_radians())
            * Mat4::from_axis_angle(&Vec3::y_axis(), 45f32.to_radians())
            * Mat4::from_axis_angle(&Vec3::z_axis(), 60f32.to_radians())
            * Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 0.5, 1.5));

        assert_relative_eq!(transform.model_matrix(), reference, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_order_is_not_commutative() {
        let mut xyz = Transform::identity();
        xyz.set_rotation(Vec3::new(90.0, 90.0, 0.0));
        let swapped = Mat4::rotation_y(90f32.to_radians()) * Mat4::rotation_x(90f32.to_radians());
        assert!((xyz.model_matrix() - swapped).abs().max() > 0.5);
    }

    #[test]
    fn test_angles_stay_in_range() {
        let mut transform = Transform::identity();
        transform.set_rotation(Vec3::new(-450.0, 360.0, 719.0));
        assert_relative_eq!(transform.rotation(), Vec3::new(270.0, 0.0, 359.0));

        for _ in 0..10 {
            transform.add_rotation(Vec3::new(-133.0, 97.0, 251.0));
            let r = transform.rotation();
            for angle in [r.x, r.y, r.z] {
                assert!((0.0..360.0).contains(&angle), "{angle} out of range");
            }
        }
    }

    #[test]
    fn test_huge_rotation_is_reduced() {
        let mut transform = Transform::identity();
        transform.set_rotation(Vec3::new(1e10, -1e10, 0.0));
        transform.add_rotation(Vec3::new(0.0, 0.0, 1e12));
        let r = transform.rotation();
        for angle in [r.x, r.y, r.z] {
            assert!((0.0..360.0).contains(&angle), "{angle} out of range");
        }
    }

    #[test]
    fn test_set_returns_delta() {
        let mut transform = Transform::identity();
        transform.set_translation(Vec3::new(1.0, 1.0, 1.0));
        let delta = transform.set_translation(Vec3::new(4.0, 0.0, 1.0));
        assert_eq!(delta, Vec3::new(3.0, -1.0, 0.0));
        assert_eq!(transform.set_scale(Vec3::repeat(3.0)), Vec3::repeat(2.0));
    }
}
