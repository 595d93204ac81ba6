use lumen_math::Vec3;

use super::DirectLightSample;
use crate::Color;

/// Light arriving from a single direction with no falloff, like the sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Unit direction from the scene towards the light.
    direction: Vec3,
    pub intensity: Color,
}

impl DirectionalLight {
    /// `direction` points towards the light and is normalized here.
    pub fn new(direction: Vec3, intensity: Color) -> Self {
        Self {
            direction: direction.normalize(),
            intensity,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn sample_direct(&self) -> Option<DirectLightSample> {
        DirectLightSample::new(self.direction, f32::INFINITY, self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_light_is_at_infinity() {
        let light = DirectionalLight::new(Vec3::new(0.0, 3.0, 0.0), Color::splat(2.0));
        let s = light.sample_direct().expect("sample");
        assert!(s.is_infinite());
        assert_eq!(s.wi, Vec3::Y);
        assert_eq!(s.weight, Color::splat(2.0));
    }
}
