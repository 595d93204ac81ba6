use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::{Vec2, Vec3};

use super::microfacet::{alpha_from_roughness, evaluate_reflection, sample_reflection};
use super::BsdfSample;
use crate::sampler::Sampler;
use crate::Color;

/// GGX microfacet metal.
#[derive(Debug, Clone)]
pub struct RoughConductor {
    reflectance: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
}

impl RoughConductor {
    pub fn new(reflectance: Arc<dyn Texture>, roughness: Arc<dyn Texture>) -> Self {
        Self {
            reflectance,
            roughness,
        }
    }

    pub fn constant(reflectance: Color, roughness: f32) -> Self {
        Self::new(
            Arc::new(ConstantTexture::new(reflectance)),
            Arc::new(ConstantTexture::scalar_value(roughness)),
        )
    }

    fn alpha(&self, uv: Vec2) -> f32 {
        alpha_from_roughness(self.roughness.scalar(uv))
    }

    pub fn albedo(&self, uv: Vec2) -> Color {
        self.reflectance.evaluate(uv)
    }

    pub fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> Option<Color> {
        evaluate_reflection(wo, wi, self.alpha(uv), self.reflectance.evaluate(uv))
    }

    pub fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut dyn Sampler) -> Option<BsdfSample> {
        sample_reflection(wo, self.alpha(uv), self.reflectance.evaluate(uv), sampler.next_2d())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::testing::{assert_close, integrated_albedo, sampled_albedo};
    use crate::bsdf::Bsdf;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rough_conductor_energy_consistency() {
        let bsdf = Bsdf::from(RoughConductor::constant(Color::new(0.9, 0.6, 0.3), 0.7));
        let wo = Vec3::new(0.5, 0.0, 0.866).normalize();
        let sampled = sampled_albedo(&bsdf, wo, 50_000);
        let integrated = integrated_albedo(&bsdf, wo, 400_000);
        assert_close(integrated, sampled, 0.03, "integrated vs sampled");
        // masking only removes energy
        assert!(sampled.x <= 0.9 + 1e-3);
    }

    #[test]
    fn test_low_roughness_concentrates_on_mirror() {
        let bsdf = Bsdf::from(RoughConductor::constant(Color::ONE, 0.01));
        let mut rng = StdRng::seed_from_u64(42);
        let wo = Vec3::new(-0.4, 0.2, 0.9).normalize();
        let mirror = Vec3::new(-wo.x, -wo.y, wo.z);
        for _ in 0..1000 {
            let s = bsdf.sample(Vec2::ZERO, wo, &mut rng).expect("sample");
            assert!(s.wi.dot(mirror) > 0.999, "wi {:?} far from mirror", s.wi);
            assert!(s.weight.x > 0.99);
        }
    }

    #[test]
    fn test_rough_conductor_rejects_lower_hemisphere() {
        let bsdf = RoughConductor::constant(Color::ONE, 0.5);
        let mut rng = StdRng::seed_from_u64(42);
        assert!(bsdf.sample(Vec2::ZERO, Vec3::NEG_Z, &mut rng).is_none());
        assert!(bsdf.evaluate(Vec2::ZERO, Vec3::Z, Vec3::NEG_Z).is_none());
    }
}
