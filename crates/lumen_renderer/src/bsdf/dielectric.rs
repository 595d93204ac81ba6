use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::{Vec2, Vec3};

use super::{finite_sample, fresnel, reflect, BsdfSample};
use crate::sampler::Sampler;
use crate::Color;

/// Smooth glass-like interface.
///
/// Reflection and refraction are chosen stochastically by the Fresnel term,
/// so both branches carry unit weight up to the tint textures. Refracted
/// radiance is scaled by `eta^2` to account for the change in solid angle.
#[derive(Debug, Clone)]
pub struct Dielectric {
    ior: Arc<dyn Texture>,
    reflectance: Arc<dyn Texture>,
    transmittance: Arc<dyn Texture>,
}

impl Dielectric {
    /// Clear dielectric with index of refraction `ior` (1.5 = glass).
    pub fn new(ior: f32) -> Self {
        Self {
            ior: Arc::new(ConstantTexture::scalar_value(ior)),
            reflectance: Arc::new(ConstantTexture::new(Color::ONE)),
            transmittance: Arc::new(ConstantTexture::new(Color::ONE)),
        }
    }

    pub fn with_ior(mut self, ior: Arc<dyn Texture>) -> Self {
        self.ior = ior;
        self
    }

    pub fn with_reflectance(mut self, reflectance: Arc<dyn Texture>) -> Self {
        self.reflectance = reflectance;
        self
    }

    pub fn with_transmittance(mut self, transmittance: Arc<dyn Texture>) -> Self {
        self.transmittance = transmittance;
        self
    }

    pub fn albedo(&self, uv: Vec2) -> Color {
        self.reflectance.evaluate(uv)
    }

    pub fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut dyn Sampler) -> Option<BsdfSample> {
        let cos_o = wo.z;
        if cos_o == 0.0 {
            return None;
        }

        let ior = self.ior.scalar(uv);
        let entering = cos_o > 0.0;
        // n_i / n_t along the path
        let eta = if entering { 1.0 / ior } else { ior };

        let Some((f, cos_t)) = fresnel::dielectric(cos_o.abs(), eta) else {
            // total internal reflection
            return finite_sample(reflect(wo), self.reflectance.evaluate(uv));
        };

        if sampler.next() < f {
            return finite_sample(reflect(wo), self.reflectance.evaluate(uv));
        }

        let side = cos_o.signum();
        let wi = -eta * wo + (eta * cos_o.abs() - cos_t) * Vec3::new(0.0, 0.0, side);
        finite_sample(wi, self.transmittance.evaluate(uv) * (eta * eta))
    }
}
