//! Lighting for scene rendering
//!
//! A [`LightSet`] holds up to [`MAX_DIRECTIONAL_LIGHTS`] directional,
//! [`MAX_POINT_LIGHTS`] point and [`MAX_SPOT_LIGHTS`] spot lights. It is
//! serialized every frame into the `LightSet` uniform block with std140
//! rules:
//!
//! ```text
//! DirLight   (64 B)  vec3 direction | uint enable | vec3 ambient | pad
//!                    vec3 diffuse | pad | vec3 specular | pad
//! PointLight (64 B)  vec3 position | uint enable | vec3 ambient | constant
//!                    vec3 diffuse | linear | vec3 specular | quadratic
//! SpotLight  (96 B)  vec3 position | cos(cutOff) | vec3 direction | cos(outerCutOff)
//!                    vec3 ambient | constant | vec3 diffuse | linear
//!                    vec3 specular | quadratic | uint enable | pad x3
//! Block    (2384 B)  DirLight[2] | PointLight[20] | SpotLight[10]
//!                    int numDir | int numPoint | int numSpot | pad
//! ```
//!
//! Slots past the counts are zero.

use crate::foundation::math::{utils, Vec3};
use bytemuck::{Pod, Zeroable};

/// Directional light capacity
pub const MAX_DIRECTIONAL_LIGHTS: usize = 2;
/// Point light capacity
pub const MAX_POINT_LIGHTS: usize = 20;
/// Spot light capacity
pub const MAX_SPOT_LIGHTS: usize = 10;

/// Ambient, diffuse and specular contribution of a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColor {
    /// Ambient term
    pub ambient: Vec3,
    /// Diffuse term
    pub diffuse: Vec3,
    /// Specular term
    pub specular: Vec3,
}

impl LightColor {
    /// Create a light color
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }

    /// White light with scalar intensities per term
    pub fn white(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self::new(
            Vec3::repeat(ambient),
            Vec3::repeat(diffuse),
            Vec3::repeat(specular),
        )
    }
}

/// Distance falloff `1 / (constant + linear*d + quadratic*d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Attenuation {
    /// Falloff covering roughly 50 units
    pub const RANGE_50: Self = Self {
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
    };

    /// Create attenuation parameters
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::RANGE_50
    }
}

/// Parallel light such as the sun
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels
    pub direction: Vec3,
    /// Color terms
    pub color: LightColor,
    /// Whether shaders should apply it
    pub enabled: bool,
}

impl DirectionalLight {
    /// Create an enabled directional light
    pub fn new(direction: Vec3, color: LightColor) -> Self {
        Self {
            direction,
            color,
            enabled: true,
        }
    }

    fn to_std140(&self) -> DirectionalLightStd140 {
        DirectionalLightStd140 {
            direction: self.direction.into(),
            enable: u32::from(self.enabled),
            ambient: self.color.ambient.into(),
            _pad0: 0.0,
            diffuse: self.color.diffuse.into(),
            _pad1: 0.0,
            specular: self.color.specular.into(),
            _pad2: 0.0,
        }
    }
}

/// Omnidirectional light with distance falloff
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// World position
    pub position: Vec3,
    /// Color terms
    pub color: LightColor,
    /// Falloff
    pub attenuation: Attenuation,
    /// Whether shaders should apply it
    pub enabled: bool,
}

impl PointLight {
    /// Create an enabled point light
    pub fn new(position: Vec3, color: LightColor, attenuation: Attenuation) -> Self {
        Self {
            position,
            color,
            attenuation,
            enabled: true,
        }
    }

    fn to_std140(&self) -> PointLightStd140 {
        PointLightStd140 {
            position: self.position.into(),
            enable: u32::from(self.enabled),
            ambient: self.color.ambient.into(),
            constant: self.attenuation.constant,
            diffuse: self.color.diffuse.into(),
            linear: self.attenuation.linear,
            specular: self.color.specular.into(),
            quadratic: self.attenuation.quadratic,
        }
    }
}

/// Cone light; cutoffs are half-angles in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    /// World position
    pub position: Vec3,
    /// Cone axis
    pub direction: Vec3,
    /// Color terms
    pub color: LightColor,
    /// Falloff
    pub attenuation: Attenuation,
    /// Full-intensity half-angle in degrees
    pub inner_cutoff: f32,
    /// Zero-intensity half-angle in degrees
    pub outer_cutoff: f32,
    /// Whether shaders should apply it
    pub enabled: bool,
}

impl SpotLight {
    /// Create an enabled spot light
    pub fn new(
        position: Vec3,
        direction: Vec3,
        color: LightColor,
        attenuation: Attenuation,
        inner_cutoff: f32,
        outer_cutoff: f32,
    ) -> Self {
        Self {
            position,
            direction,
            color,
            attenuation,
            inner_cutoff,
            outer_cutoff,
            enabled: true,
        }
    }

    fn to_std140(&self) -> SpotLightStd140 {
        SpotLightStd140 {
            position: self.position.into(),
            cut_off: utils::deg_to_rad(self.inner_cutoff).cos(),
            direction: self.direction.into(),
            outer_cut_off: utils::deg_to_rad(self.outer_cutoff).cos(),
            ambient: self.color.ambient.into(),
            constant: self.attenuation.constant,
            diffuse: self.color.diffuse.into(),
            linear: self.attenuation.linear,
            specular: self.color.specular.into(),
            quadratic: self.attenuation.quadratic,
            enable: u32::from(self.enabled),
            _pad: [0.0; 3],
        }
    }
}

/// Index of a directional light inside its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectionalLightId(usize);

/// Index of a point light inside its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointLightId(usize);

/// Index of a spot light inside its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpotLightId(usize);

/// std140 image of a directional light
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DirectionalLightStd140 {
    direction: [f32; 3],
    enable: u32,
    ambient: [f32; 3],
    _pad0: f32,
    diffuse: [f32; 3],
    _pad1: f32,
    specular: [f32; 3],
    _pad2: f32,
}

/// std140 image of a point light
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PointLightStd140 {
    position: [f32; 3],
    enable: u32,
    ambient: [f32; 3],
    constant: f32,
    diffuse: [f32; 3],
    linear: f32,
    specular: [f32; 3],
    quadratic: f32,
}

/// std140 image of a spot light
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpotLightStd140 {
    position: [f32; 3],
    cut_off: f32,
    direction: [f32; 3],
    outer_cut_off: f32,
    ambient: [f32; 3],
    constant: f32,
    diffuse: [f32; 3],
    linear: f32,
    specular: [f32; 3],
    quadratic: f32,
    enable: u32,
    _pad: [f32; 3],
}

/// std140 image of the whole `LightSet` block
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightSetStd140 {
    directional: [DirectionalLightStd140; MAX_DIRECTIONAL_LIGHTS],
    point: [PointLightStd140; MAX_POINT_LIGHTS],
    spot: [SpotLightStd140; MAX_SPOT_LIGHTS],
    num_directional: i32,
    num_point: i32,
    num_spot: i32,
    _pad: i32,
}

/// Fixed-capacity collection of scene lights
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    directional: Vec<DirectionalLight>,
    point: Vec<PointLight>,
    spot: Vec<SpotLight>,
}

impl LightSet {
    /// Size of the serialized block in bytes
    pub const BLOCK_SIZE: usize = std::mem::size_of::<LightSetStd140>();

    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directional light; `None` once the set holds two
    pub fn add_directional(&mut self, light: DirectionalLight) -> Option<DirectionalLightId> {
        if self.directional.len() >= MAX_DIRECTIONAL_LIGHTS {
            log::warn!("LightSet: directional light not added, array full ({MAX_DIRECTIONAL_LIGHTS})");
            return None;
        }
        self.directional.push(light);
        Some(DirectionalLightId(self.directional.len() - 1))
    }

    /// Add a point light; `None` once the set holds twenty
    pub fn add_point(&mut self, light: PointLight) -> Option<PointLightId> {
        if self.point.len() >= MAX_POINT_LIGHTS {
            log::warn!("LightSet: point light not added, array full ({MAX_POINT_LIGHTS})");
            return None;
        }
        self.point.push(light);
        Some(PointLightId(self.point.len() - 1))
    }

    /// Add a spot light; `None` once the set holds ten
    pub fn add_spot(&mut self, light: SpotLight) -> Option<SpotLightId> {
        if self.spot.len() >= MAX_SPOT_LIGHTS {
            log::warn!("LightSet: spot light not added, array full ({MAX_SPOT_LIGHTS})");
            return None;
        }
        self.spot.push(light);
        Some(SpotLightId(self.spot.len() - 1))
    }

    /// Directional light by id
    pub fn directional(&self, id: DirectionalLightId) -> Option<&DirectionalLight> {
        self.directional.get(id.0)
    }

    /// Mutable directional light by id
    pub fn directional_mut(&mut self, id: DirectionalLightId) -> Option<&mut DirectionalLight> {
        self.directional.get_mut(id.0)
    }

    /// Point light by id
    pub fn point(&self, id: PointLightId) -> Option<&PointLight> {
        self.point.get(id.0)
    }

    /// Mutable point light by id
    pub fn point_mut(&mut self, id: PointLightId) -> Option<&mut PointLight> {
        self.point.get_mut(id.0)
    }

    /// Spot light by id
    pub fn spot(&self, id: SpotLightId) -> Option<&SpotLight> {
        self.spot.get(id.0)
    }

    /// Mutable spot light by id
    pub fn spot_mut(&mut self, id: SpotLightId) -> Option<&mut SpotLight> {
        self.spot.get_mut(id.0)
    }

    /// Light counts as `(directional, point, spot)`
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.directional.len(), self.point.len(), self.spot.len())
    }

    /// Build the std140 block from the current light state
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn to_std140(&self) -> LightSetStd140 {
        let mut block = LightSetStd140::zeroed();
        for (slot, light) in block.directional.iter_mut().zip(&self.directional) {
            *slot = light.to_std140();
        }
        for (slot, light) in block.point.iter_mut().zip(&self.point) {
            *slot = light.to_std140();
        }
        for (slot, light) in block.spot.iter_mut().zip(&self.spot) {
            *slot = light.to_std140();
        }
        block.num_directional = self.directional.len() as i32;
        block.num_point = self.point.len() as i32;
        block.num_spot = self.spot.len() as i32;
        block
    }

    /// Fresh byte snapshot of the block, [`Self::BLOCK_SIZE`] bytes long
    pub fn serialize(&self) -> Vec<u8> {
        bytemuck::bytes_of(&self.to_std140()).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DIR_SIZE: usize = 64;
    const POINT_SIZE: usize = 64;
    const SPOT_SIZE: usize = 96;
    const POINT_BASE: usize = DIR_SIZE * MAX_DIRECTIONAL_LIGHTS;
    const SPOT_BASE: usize = POINT_BASE + POINT_SIZE * MAX_POINT_LIGHTS;
    const COUNTS_BASE: usize = SPOT_BASE + SPOT_SIZE * MAX_SPOT_LIGHTS;

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        bytemuck::pod_read_unaligned(&bytes[offset..offset + 4])
    }

    fn read_i32(bytes: &[u8], offset: usize) -> i32 {
        bytemuck::pod_read_unaligned(&bytes[offset..offset + 4])
    }

    fn color() -> LightColor {
        LightColor::white(0.05, 0.55, 1.0)
    }

    #[test]
    fn test_struct_sizes_follow_std140() {
        assert_eq!(std::mem::size_of::<DirectionalLightStd140>(), DIR_SIZE);
        assert_eq!(std::mem::size_of::<PointLightStd140>(), POINT_SIZE);
        assert_eq!(std::mem::size_of::<SpotLightStd140>(), SPOT_SIZE);
        assert_eq!(LightSet::BLOCK_SIZE, 2384);
        assert_eq!(LightSet::BLOCK_SIZE % 16, 0);
    }

    #[test]
    fn test_point_light_capacity() {
        let mut lights = LightSet::new();
        for i in 0..MAX_POINT_LIGHTS {
            let light = PointLight::new(Vec3::new(i as f32, 0.0, 0.0), color(), Attenuation::RANGE_50);
            assert!(lights.add_point(light).is_some());
        }
        let before = lights.serialize();

        let extra = PointLight::new(Vec3::new(99.0, 0.0, 0.0), color(), Attenuation::RANGE_50);
        assert!(lights.add_point(extra).is_none());
        assert_eq!(lights.counts().1, MAX_POINT_LIGHTS);
        assert_eq!(lights.serialize(), before);
    }

    #[test]
    fn test_directional_and_spot_capacity() {
        let mut lights = LightSet::new();
        for _ in 0..MAX_DIRECTIONAL_LIGHTS {
            assert!(lights.add_directional(DirectionalLight::new(-Vec3::y(), color())).is_some());
        }
        assert!(lights.add_directional(DirectionalLight::new(Vec3::y(), color())).is_none());

        for _ in 0..MAX_SPOT_LIGHTS {
            let spot = SpotLight::new(Vec3::zeros(), -Vec3::z(), color(), Attenuation::RANGE_50, 12.5, 17.5);
            assert!(lights.add_spot(spot).is_some());
        }
        let spot = SpotLight::new(Vec3::zeros(), -Vec3::z(), color(), Attenuation::RANGE_50, 12.5, 17.5);
        assert!(lights.add_spot(spot).is_none());
        assert_eq!(lights.counts(), (MAX_DIRECTIONAL_LIGHTS, 0, MAX_SPOT_LIGHTS));
    }

    #[test]
    fn test_serialized_field_offsets() {
        let mut lights = LightSet::new();
        lights.add_directional(DirectionalLight::new(Vec3::new(-0.2, -1.0, -0.3), color()));
        lights.add_point(PointLight::new(Vec3::new(0.7, 0.2, 2.0), color(), Attenuation::RANGE_50));
        let spot = lights
            .add_spot(SpotLight::new(
                Vec3::new(1.0, 2.0, 3.0),
                -Vec3::z(),
                color(),
                Attenuation::RANGE_50,
                12.5,
                17.5,
            ))
            .unwrap();
        lights.spot_mut(spot).unwrap().enabled = false;

        let bytes = lights.serialize();
        assert_eq!(bytes.len(), LightSet::BLOCK_SIZE);

        // directional[0]
        assert_relative_eq!(read_f32(&bytes, 0), -0.2);
        assert_eq!(read_i32(&bytes, 12), 1);
        assert_relative_eq!(read_f32(&bytes, 16), 0.05);
        assert_relative_eq!(read_f32(&bytes, 32), 0.55);
        assert_relative_eq!(read_f32(&bytes, 48), 1.0);

        // point[0]
        assert_relative_eq!(read_f32(&bytes, POINT_BASE), 0.7);
        assert_relative_eq!(read_f32(&bytes, POINT_BASE + 8), 2.0);
        assert_relative_eq!(read_f32(&bytes, POINT_BASE + 28), 1.0);
        assert_relative_eq!(read_f32(&bytes, POINT_BASE + 44), 0.09);
        assert_relative_eq!(read_f32(&bytes, POINT_BASE + 60), 0.032);

        // spot[0]
        assert_relative_eq!(read_f32(&bytes, SPOT_BASE), 1.0);
        assert_relative_eq!(read_f32(&bytes, SPOT_BASE + 12), utils::deg_to_rad(12.5).cos());
        assert_relative_eq!(read_f32(&bytes, SPOT_BASE + 24), -1.0);
        assert_relative_eq!(read_f32(&bytes, SPOT_BASE + 28), utils::deg_to_rad(17.5).cos());
        assert_eq!(read_i32(&bytes, SPOT_BASE + 80), 0);

        // unused slots stay zero
        assert!(bytes[DIR_SIZE..POINT_BASE].iter().all(|b| *b == 0));
        assert!(bytes[POINT_BASE + POINT_SIZE..SPOT_BASE].iter().all(|b| *b == 0));

        assert_eq!(read_i32(&bytes, COUNTS_BASE), 1);
        assert_eq!(read_i32(&bytes, COUNTS_BASE + 4), 1);
        assert_eq!(read_i32(&bytes, COUNTS_BASE + 8), 1);
    }

    #[test]
    fn test_serialize_reflects_mutation() {
        let mut lights = LightSet::new();
        let id = lights
            .add_point(PointLight::new(Vec3::zeros(), color(), Attenuation::RANGE_50))
            .unwrap();
        let first = lights.serialize();
        lights.point_mut(id).unwrap().position = Vec3::new(5.0, 0.0, 0.0);
        let second = lights.serialize();

        assert_ne!(first, second);
        assert_relative_eq!(read_f32(&second, POINT_BASE), 5.0);
    }
}
