use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::{Vec2, Vec3};

use super::{finite_sample, reflect, BsdfSample};
use crate::Color;

/// Perfect mirror. No Fresnel term and no transmission.
#[derive(Debug, Clone)]
pub struct Conductor {
    reflectance: Arc<dyn Texture>,
}

impl Conductor {
    pub fn new(reflectance: Arc<dyn Texture>) -> Self {
        Self { reflectance }
    }

    pub fn constant(reflectance: Color) -> Self {
        Self::new(Arc::new(ConstantTexture::new(reflectance)))
    }

    pub fn albedo(&self, uv: Vec2) -> Color {
        self.reflectance.evaluate(uv)
    }

    pub fn sample(&self, uv: Vec2, wo: Vec3) -> Option<BsdfSample> {
        if wo.z == 0.0 {
            return None;
        }
        finite_sample(reflect(wo), self.reflectance.evaluate(uv))
    }
}
