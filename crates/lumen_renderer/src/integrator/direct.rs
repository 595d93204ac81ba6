use std::fmt;
use std::sync::Arc;

use lumen_math::Ray;

use super::{sanitize, Integrator};
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::Color;

/// Emission at the first hit plus one BSDF-sampled bounce.
///
/// Point and directional lights are invisible to it. Handy for checking
/// emitters and environment lighting in isolation.
pub struct DirectIntegrator {
    scene: Arc<Scene>,
}

impl DirectIntegrator {
    pub fn new(scene: Arc<Scene>) -> Self {
        Self { scene }
    }
}

impl Integrator for DirectIntegrator {
    fn li(&self, ray: &Ray, sampler: &mut dyn Sampler) -> Color {
        let its = self.scene.intersect(ray);
        let Some(instance) = its.instance else {
            return self.scene.evaluate_background(ray.direction);
        };

        let mut radiance = its.evaluate_emission();

        let frame = its.surface.frame;
        let sample = instance
            .bsdf()
            .and_then(|bsdf| bsdf.sample(its.surface.uv, frame.to_local(its.wo), sampler));
        if let Some(sample) = sample {
            let bounce = Ray::new(its.surface.position, frame.to_world(sample.wi))
                .with_depth(ray.depth + 1);
            let next = self.scene.intersect(&bounce);
            let incident = if next.is_hit() {
                next.evaluate_emission()
            } else {
                self.scene.evaluate_background(bounce.direction)
            };
            radiance += sample.weight * incident;
        }

        sanitize(radiance)
    }
}

impl fmt::Display for DirectIntegrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectIntegrator[scene={}]", self.scene)
    }
}
