use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::sampling::{square_to_cosine_hemisphere, INV_PI};
use lumen_math::{Vec2, Vec3};

use super::{finite, finite_sample, BsdfSample};
use crate::sampler::Sampler;
use crate::Color;

/// Lambertian reflector.
#[derive(Debug, Clone)]
pub struct Diffuse {
    albedo: Arc<dyn Texture>,
}

impl Diffuse {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn constant(albedo: Color) -> Self {
        Self::new(Arc::new(ConstantTexture::new(albedo)))
    }

    pub fn albedo(&self, uv: Vec2) -> Color {
        self.albedo.evaluate(uv)
    }

    pub fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> Option<Color> {
        evaluate_lobe(self.albedo(uv), wo, wi)
    }

    pub fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut dyn Sampler) -> Option<BsdfSample> {
        sample_lobe(self.albedo(uv), wo, sampler.next_2d())
    }
}

/// `albedo cos_i / pi`, zero across the surface.
pub(crate) fn evaluate_lobe(albedo: Color, wo: Vec3, wi: Vec3) -> Option<Color> {
    if wo.z * wi.z <= 0.0 {
        return None;
    }
    finite(albedo * (wi.z.abs() * INV_PI))
}

/// Cosine-weighted sample on the side of `wo`. Cosine and pdf cancel.
pub(crate) fn sample_lobe(albedo: Color, wo: Vec3, u: Vec2) -> Option<BsdfSample> {
    if wo.z == 0.0 {
        return None;
    }
    let mut wi = square_to_cosine_hemisphere(u);
    if wi.z <= 0.0 {
        return None;
    }
    if wo.z < 0.0 {
        wi.z = -wi.z;
    }
    finite_sample(wi, albedo)
}
