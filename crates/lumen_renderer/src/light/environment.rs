use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::sampling::square_to_uniform_sphere;
use lumen_math::{Transform, Vec2, Vec3};

use super::DirectLightSample;
use crate::sampler::Sampler;
use crate::Color;

/// Radiance arriving from infinitely far away, looked up by direction
/// through an equirectangular mapping with +Y up.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    texture: Arc<dyn Texture>,
    transform: Option<Transform>,
}

impl EnvironmentMap {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self {
            texture,
            transform: None,
        }
    }

    /// Same radiance from every direction.
    pub fn constant(radiance: Color) -> Self {
        Self::new(Arc::new(ConstantTexture::new(radiance)))
    }

    /// Orient the map with a local-to-world transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Map a world direction to equirectangular UV in `[0,1]^2`.
    ///
    /// v is the polar angle from +Y over pi; u is the azimuth around +Y.
    pub fn direction_to_uv(&self, direction: Vec3) -> Vec2 {
        let d = match &self.transform {
            Some(transform) => transform.inverse_vector(direction),
            None => direction,
        }
        .normalize_or_zero();

        let theta = (d.x * d.x + d.z * d.z).sqrt().atan2(d.y);
        let u = 0.5 - d.z.atan2(d.x) / (2.0 * PI);
        let v = theta / PI;
        Vec2::new(u, v)
    }

    /// Radiance arriving from `direction`, the direction of travel of an
    /// escaping ray.
    pub fn evaluate(&self, direction: Vec3) -> Color {
        self.texture.evaluate(self.direction_to_uv(direction))
    }

    /// Uniform sphere sampling, weight `L / (1 / 4pi)`.
    pub fn sample_direct(&self, sampler: &mut dyn Sampler) -> Option<DirectLightSample> {
        let wi = square_to_uniform_sphere(sampler.next_2d());
        DirectLightSample::new(wi, f32::INFINITY, self.evaluate(wi) * (4.0 * PI))
    }
}

impl fmt::Display for EnvironmentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EnvironmentMap[texture={:?}{}]",
            self.texture,
            if self.transform.is_some() { ", transformed" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::CheckerboardTexture;

    #[test]
    fn test_direction_to_uv() {
        let env = EnvironmentMap::constant(Color::ONE);
        assert!((env.direction_to_uv(Vec3::Y).y - 0.0).abs() < 1e-6);
        assert!((env.direction_to_uv(Vec3::NEG_Y).y - 1.0).abs() < 1e-6);

        let side = env.direction_to_uv(Vec3::X);
        assert!((side - Vec2::new(0.5, 0.5)).length() < 1e-6);
        let back = env.direction_to_uv(Vec3::Z);
        assert!((back - Vec2::new(0.25, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_transform_rotates_lookup() {
        // upper half white, lower half black
        let tex = Arc::new(CheckerboardTexture::new(
            Color::ONE,
            Color::ZERO,
            Vec2::new(1.0, 2.0),
        ));
        let up = Vec3::new(0.1, 0.9, 0.0);
        let down = Vec3::new(0.1, -0.9, 0.0);

        let env = EnvironmentMap::new(tex.clone());
        assert_eq!(env.evaluate(up), Color::ONE);
        assert_eq!(env.evaluate(down), Color::ZERO);

        let flipped =
            EnvironmentMap::new(tex).with_transform(Transform::from_rotation(Vec3::X, PI));
        assert_eq!(flipped.evaluate(down), Color::ONE);
        assert_eq!(flipped.evaluate(up), Color::ZERO);
    }

    #[test]
    fn test_constant_environment_sample_weight() {
        let env = EnvironmentMap::constant(Color::splat(0.5));
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(3);
        let s = env.sample_direct(&mut rng).expect("sample");
        assert!(s.is_infinite());
        assert!((s.weight.x - 2.0 * PI).abs() < 1e-4);
    }
}
