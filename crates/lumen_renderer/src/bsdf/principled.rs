use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::{Vec2, Vec3};

use super::microfacet::{alpha_from_roughness, evaluate_reflection, sample_reflection};
use super::{diffuse, fresnel, BsdfSample};
use crate::sampler::Sampler;
use crate::Color;

/// Lobe selection probabilities below this are treated as unusable.
const MIN_LOBE_PROBABILITY: f32 = 1e-4;

/// Diffuse and GGX metallic lobes blended by a Fresnel-weighted
/// metallic/specular factor.
#[derive(Debug, Clone)]
pub struct Principled {
    /// Base color (albedo for dielectrics, reflectance for metals)
    base_color: Arc<dyn Texture>,
    /// Metallic: 0 = dielectric, 1 = metal
    metallic: Arc<dyn Texture>,
    /// Roughness of the specular lobe
    roughness: Arc<dyn Texture>,
    /// Specular: scales Fresnel reflectance of the dielectric part
    specular: Arc<dyn Texture>,
}

struct Lobes {
    diffuse: Color,
    metal: Color,
    alpha: f32,
    diffuse_probability: f32,
}

impl Principled {
    /// Rough dielectric with the given base color and default parameters.
    pub fn new(base_color: Color) -> Self {
        Self {
            base_color: Arc::new(ConstantTexture::new(base_color)),
            metallic: Arc::new(ConstantTexture::scalar_value(0.0)),
            roughness: Arc::new(ConstantTexture::scalar_value(0.5)),
            specular: Arc::new(ConstantTexture::scalar_value(0.5)),
        }
    }

    pub fn with_base_color(mut self, base_color: Arc<dyn Texture>) -> Self {
        self.base_color = base_color;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = Arc::new(ConstantTexture::scalar_value(metallic.clamp(0.0, 1.0)));
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = Arc::new(ConstantTexture::scalar_value(roughness.clamp(0.0, 1.0)));
        self
    }

    pub fn with_specular(mut self, specular: f32) -> Self {
        self.specular = Arc::new(ConstantTexture::scalar_value(specular.max(0.0)));
        self
    }

    fn lobes(&self, uv: Vec2, cos_o: f32) -> Lobes {
        let base = self.base_color.evaluate(uv);
        let metallic = self.metallic.scalar(uv).clamp(0.0, 1.0);
        let specular = self.specular.scalar(uv);

        let f = (specular * fresnel::schlick((1.0 - metallic) * 0.08, cos_o.abs())).clamp(0.0, 1.0);
        let diffuse = (1.0 - f) * (1.0 - metallic) * base;
        let metal = Color::splat(f) + (1.0 - f) * metallic * base;

        let diffuse_weight = mean(diffuse);
        let total = diffuse_weight + mean(metal);
        let diffuse_probability = if total > 0.0 {
            diffuse_weight / total
        } else {
            1.0
        };

        Lobes {
            diffuse,
            metal,
            alpha: alpha_from_roughness(self.roughness.scalar(uv)),
            diffuse_probability,
        }
    }

    pub fn albedo(&self, uv: Vec2) -> Color {
        let lobes = self.lobes(uv, 1.0);
        lobes.diffuse + lobes.metal
    }

    pub fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> Option<Color> {
        let lobes = self.lobes(uv, wo.z);
        let diffuse = diffuse::evaluate_lobe(lobes.diffuse, wo, wi);
        let metal = evaluate_reflection(wo, wi, lobes.alpha, lobes.metal);
        match (diffuse, metal) {
            (None, None) => None,
            (d, m) => Some(d.unwrap_or(Color::ZERO) + m.unwrap_or(Color::ZERO)),
        }
    }

    pub fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut dyn Sampler) -> Option<BsdfSample> {
        let lobes = self.lobes(uv, wo.z);
        let p_diffuse = lobes.diffuse_probability;

        let (mut sample, probability) = if sampler.next() < p_diffuse {
            (diffuse::sample_lobe(lobes.diffuse, wo, sampler.next_2d())?, p_diffuse)
        } else {
            let u = sampler.next_2d();
            (sample_reflection(wo, lobes.alpha, lobes.metal, u)?, 1.0 - p_diffuse)
        };

        if probability <= MIN_LOBE_PROBABILITY {
            return None;
        }
        sample.weight /= probability;
        Some(sample)
    }
}

fn mean(c: Color) -> f32 {
    (c.x + c.y + c.z) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::testing::{assert_close, integrated_albedo, sampled_albedo};
    use crate::bsdf::Bsdf;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_principled_energy_consistency() {
        let bsdf = Bsdf::from(
            Principled::new(Color::new(0.8, 0.3, 0.2))
                .with_metallic(0.5)
                .with_roughness(0.6),
        );
        let wo = Vec3::new(0.3, 0.4, 0.866).normalize();
        let sampled = sampled_albedo(&bsdf, wo, 100_000);
        let integrated = integrated_albedo(&bsdf, wo, 400_000);
        assert_close(integrated, sampled, 0.03, "integrated vs sampled");
    }

    #[test]
    fn test_pure_diffuse_configuration() {
        let bsdf = Principled::new(Color::splat(0.6)).with_specular(0.0);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let s = bsdf.sample(Vec2::ZERO, Vec3::Z, &mut rng).expect("sample");
            assert!((s.weight - Color::splat(0.6)).length() < 1e-5);
        }
    }

    #[test]
    fn test_black_material_never_produces_nan() {
        let bsdf = Principled::new(Color::ZERO).with_specular(0.0);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            if let Some(s) = bsdf.sample(Vec2::ZERO, Vec3::new(0.0, 0.6, 0.8), &mut rng) {
                assert!(s.weight.is_finite());
            }
        }
    }

    #[test]
    fn test_full_metal_is_reflective() {
        let bsdf = Principled::new(Color::new(1.0, 0.8, 0.4))
            .with_metallic(1.0)
            .with_roughness(0.2);
        let lobes = bsdf.lobes(Vec2::ZERO, 1.0);
        assert_eq!(lobes.diffuse, Color::ZERO);
        assert!(lobes.diffuse_probability.abs() < 1e-6);
        assert!((lobes.metal - Color::new(1.0, 0.8, 0.4)).length() < 1e-5);
    }
}
