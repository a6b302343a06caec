//! Math utilities and types
//!
//! Provides the nalgebra aliases used across the engine plus a few
//! OpenGL-convention matrix helpers.

pub use nalgebra::{Matrix3, Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Full turn in degrees
    pub const FULL_TURN_DEG: f32 = 360.0;

    /// Magnitude past which whole-turn stepping is replaced by a remainder.
    /// Far below the point where `f32` spacing exceeds a full turn.
    pub const TURN_STEP_LIMIT: f32 = FULL_TURN_DEG * 65536.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Bring an angle in degrees into `[0, 360)` by stepping whole turns
    ///
    /// Angles beyond [`constants::TURN_STEP_LIMIT`] are first reduced with a
    /// Euclidean remainder, so huge inputs terminate.
    pub fn normalize_degrees(mut angle: f32) -> f32 {
        if !angle.is_finite() {
            return angle;
        }
        if angle.abs() > constants::TURN_STEP_LIMIT {
            angle = angle.rem_euclid(constants::FULL_TURN_DEG);
        }
        while angle < 0.0 {
            angle += constants::FULL_TURN_DEG;
        }
        while angle >= constants::FULL_TURN_DEG {
            angle -= constants::FULL_TURN_DEG;
        }
        angle
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis (radians)
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis (radians)
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis (radians)
    fn rotation_z(angle: f32) -> Mat4;

    /// Right-handed perspective projection with a `[-1, 1]` depth range
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Transpose of the inverse of the upper-left 3x3 block.
    ///
    /// Falls back to the plain 3x3 block when it is singular (zero scale).
    fn normal_matrix(&self) -> Mat3;

    /// Column-major array layout, as consumed by uniform uploads
    fn to_cols_array(&self) -> [[f32; 4]; 4];
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        nalgebra::Perspective3::new(aspect, fov_y, near, far).to_homogeneous()
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn normal_matrix(&self) -> Mat3 {
        let upper: Mat3 = self.fixed_view::<3, 3>(0, 0).into_owned();
        upper.try_inverse().map_or(upper, |inverse| inverse.transpose())
    }

    fn to_cols_array(&self) -> [[f32; 4]; 4] {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(utils::normalize_degrees(-450.0), 270.0);
        assert_relative_eq!(utils::normalize_degrees(360.0), 0.0);
        assert_relative_eq!(utils::normalize_degrees(725.0), 5.0);
        assert_relative_eq!(utils::normalize_degrees(42.5), 42.5);
    }

    #[test]
    fn test_normalize_degrees_huge_angles_terminate() {
        for angle in [1e10_f32, -1e10, 3.0e38, -3.0e38, 8_589_934_592.0] {
            let normalized = utils::normalize_degrees(angle);
            assert!((0.0..360.0).contains(&normalized), "{angle} -> {normalized}");
        }
        // below the limit stepping is unchanged
        assert_relative_eq!(utils::normalize_degrees(1e6), 280.0);
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        let model = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 4.0, 1.0));
        let normal = model.normal_matrix();
        assert_relative_eq!(normal[(0, 0)], 0.5);
        assert_relative_eq!(normal[(1, 1)], 0.25);
        assert_relative_eq!(normal[(2, 2)], 1.0);
    }

    #[test]
    fn test_perspective_matches_gl_convention() {
        let proj = Mat4::perspective_gl(utils::deg_to_rad(45.0), 4.0 / 3.0, 0.1, 100.0);
        // w takes -z for a right-handed GL projection
        assert_relative_eq!(proj[(3, 2)], -1.0);
        assert_relative_eq!(proj[(3, 3)], 0.0);
    }
}
