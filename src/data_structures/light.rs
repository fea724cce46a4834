//! Light sources.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::color::Color;

/// Omni-directional light emitting from a point.
///
/// `distance == 0` means unlimited range.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub distance: f32,
    pub decay: f32,
}

impl PointLight {
    pub fn new(color: impl Into<Color>, intensity: f32) -> Self {
        Self {
            color: color.into(),
            intensity,
            position: Point3::new(0.0, 0.0, 0.0),
            distance: 0.0,
            decay: 2.0,
        }
    }
}

/// Parallel rays travelling from `position` towards `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl DirectionalLight {
    pub fn new(color: impl Into<Color>, intensity: f32) -> Self {
        Self {
            color: color.into(),
            intensity,
            position: Point3::new(0.0, 1.0, 0.0),
            target: Point3::new(0.0, 0.0, 0.0),
        }
    }

    /// Unit vector pointing from the lit surface towards the light.
    pub fn direction(&self) -> Vector3<f32> {
        let dir = self.position - self.target;
        if dir.magnitude2() == 0.0 {
            Vector3::unit_y()
        } else {
            dir.normalize()
        }
    }
}

/// Cone of light from `position` towards `target`.
///
/// `angle` is the cone's half-angle in radians, `penumbra` the fraction of the
/// cone over which the light fades out.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub distance: f32,
}

impl SpotLight {
    pub fn new(color: impl Into<Color>, intensity: f32) -> Self {
        Self {
            color: color.into(),
            intensity,
            position: Point3::new(0.0, 1.0, 0.0),
            target: Point3::new(0.0, 0.0, 0.0),
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            decay: 2.0,
            distance: 0.0,
        }
    }

    /// Unit vector the cone points along.
    pub fn direction(&self) -> Vector3<f32> {
        let dir = self.target - self.position;
        if dir.magnitude2() == 0.0 {
            -Vector3::unit_y()
        } else {
            dir.normalize()
        }
    }

    pub fn cone_cos(&self) -> f32 {
        self.angle.cos()
    }

    pub fn penumbra_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra)).cos()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
    Spot(SpotLight),
}

impl Light {
    pub fn color(&self) -> Color {
        match self {
            Light::Point(light) => light.color,
            Light::Directional(light) => light.color,
            Light::Spot(light) => light.color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Point(light) => light.intensity,
            Light::Directional(light) => light.intensity,
            Light::Spot(light) => light.intensity,
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_light_points_back_at_its_source() {
        let mut light = DirectionalLight::new(0xacbcff, 1.0);
        light.position = Point3::new(-1.0, 0.0, 0.0);
        assert_eq!(light.direction(), Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn spot_cone_narrows_with_penumbra() {
        let mut light = SpotLight::new(0xaee2ff, 1.0);
        light.angle = std::f32::consts::FRAC_PI_2;
        light.penumbra = 0.5;
        assert!(light.cone_cos().abs() < 1e-6);
        assert!((light.penumbra_cos() - std::f32::consts::FRAC_PI_4.cos()).abs() < 1e-6);
    }

    #[test]
    fn degenerate_spot_direction_falls_back_to_down() {
        let mut light = SpotLight::new(0xffffff, 1.0);
        light.position = light.target;
        assert_eq!(light.direction(), -Vector3::unit_y());
    }
}
