use lumen_math::sampling::INV_4PI;
use lumen_math::Vec3;

use super::DirectLightSample;
use crate::Color;

/// Isotropic point emitter with total radiant power `power`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub power: Color,
}

impl PointLight {
    pub fn new(position: Vec3, power: Color) -> Self {
        Self { position, power }
    }

    /// Weight is intensity `power / 4pi` over squared distance.
    pub fn sample_direct(&self, origin: Vec3) -> Option<DirectLightSample> {
        let to_light = self.position - origin;
        let distance2 = to_light.length_squared();
        if distance2 <= 0.0 {
            return None;
        }
        let distance = distance2.sqrt();
        DirectLightSample::new(
            to_light / distance,
            distance,
            self.power * INV_4PI / distance2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_point_light_inverse_square() {
        let light = PointLight::new(Vec3::new(0.0, 2.0, 0.0), Color::splat(4.0 * PI));
        let s = light.sample_direct(Vec3::ZERO).expect("sample");
        assert!((s.wi - Vec3::Y).length() < 1e-6);
        assert!((s.distance - 2.0).abs() < 1e-6);
        assert!((s.weight.x - 0.25).abs() < 1e-6);
        assert!(light.sample_direct(Vec3::new(0.0, 2.0, 0.0)).is_none());
    }
}
