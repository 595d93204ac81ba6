use std::fmt;
use std::sync::Arc;

use lumen_math::Ray;

use super::Integrator;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::Color;

/// World-space shading normal at the first hit, black for misses.
pub struct NormalsIntegrator {
    scene: Arc<Scene>,
    remap: bool,
}

impl NormalsIntegrator {
    pub fn new(scene: Arc<Scene>) -> Self {
        Self {
            scene,
            remap: false,
        }
    }

    /// Map components from `[-1,1]` to `[0,1]` for display.
    pub fn with_remap(mut self, remap: bool) -> Self {
        self.remap = remap;
        self
    }
}

impl Integrator for NormalsIntegrator {
    fn li(&self, ray: &Ray, _sampler: &mut dyn Sampler) -> Color {
        let its = self.scene.intersect(ray);
        if !its.is_hit() {
            return Color::ZERO;
        }
        let normal = its.surface.frame.normal;
        if self.remap {
            (normal + Color::ONE) * 0.5
        } else {
            normal
        }
    }
}

impl fmt::Display for NormalsIntegrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NormalsIntegrator[remap={}, scene={}]", self.remap, self.scene)
    }
}
