use std::fmt;
use std::sync::Arc;

use lumen_math::Ray;

use super::Integrator;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::Color;

/// Surface albedo at the first hit, emission for pure emitters, and the
/// background for misses.
pub struct AlbedoIntegrator {
    scene: Arc<Scene>,
}

impl AlbedoIntegrator {
    pub fn new(scene: Arc<Scene>) -> Self {
        Self { scene }
    }
}

impl Integrator for AlbedoIntegrator {
    fn li(&self, ray: &Ray, _sampler: &mut dyn Sampler) -> Color {
        let its = self.scene.intersect(ray);
        match its.instance {
            None => self.scene.evaluate_background(ray.direction),
            Some(instance) => match instance.bsdf() {
                Some(bsdf) => bsdf.albedo(its.surface.uv),
                None => its.evaluate_emission(),
            },
        }
    }
}

impl fmt::Display for AlbedoIntegrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlbedoIntegrator[scene={}]", self.scene)
    }
}
