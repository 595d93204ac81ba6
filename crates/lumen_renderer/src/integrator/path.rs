use std::fmt;
use std::sync::Arc;

use lumen_math::Ray;
use serde::{Deserialize, Serialize};

use super::{sanitize, Integrator};
use crate::bsdf::Bsdf;
use crate::error::{SceneError, SceneResult};
use crate::intersection::Intersection;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::Color;

/// Highest survival probability used by Russian roulette.
const MAX_SURVIVAL: f32 = 0.95;

/// Path tracer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTracerConfig {
    /// Number of path vertices; 1 gives direct lighting only.
    pub max_depth: u32,
    /// Depth from which paths are randomly terminated, if any.
    pub russian_roulette_depth: Option<u32>,
}

impl Default for PathTracerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            russian_roulette_depth: None,
        }
    }
}

impl PathTracerConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_russian_roulette(mut self, depth: u32) -> Self {
        self.russian_roulette_depth = Some(depth);
        self
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.max_depth == 0 {
            return Err(SceneError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.russian_roulette_depth == Some(0) {
            return Err(SceneError::InvalidConfig(
                "russian_roulette_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unidirectional path tracer with next-event estimation.
///
/// Each vertex collects emission from the surface it hit and, for
/// materials that allow it, one light sample. Lights that rays can find on
/// their own are not sampled.
pub struct PathTracer {
    scene: Arc<Scene>,
    config: PathTracerConfig,
}

impl PathTracer {
    pub fn new(scene: Arc<Scene>, config: PathTracerConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self { scene, config })
    }

    pub fn config(&self) -> &PathTracerConfig {
        &self.config
    }

    /// Light reaching the hit point through one sampled light, already
    /// multiplied by the BSDF.
    fn next_event(
        &self,
        its: &Intersection<'_>,
        bsdf: &Bsdf,
        sampler: &mut dyn Sampler,
    ) -> Option<Color> {
        let (light, probability) = self.scene.sample_light(sampler)?;
        if light.can_be_intersected() {
            return None;
        }

        let surface = &its.surface;
        let sample = light.sample_direct(surface.position, sampler)?;

        let wo = surface.frame.to_local(its.wo);
        let wi = surface.frame.to_local(sample.wi);
        let value = bsdf.evaluate(surface.uv, wo, wi)?;

        let shadow = Ray::new(surface.position, sample.wi);
        if self.scene.is_occluded(&shadow, sample.distance) {
            return None;
        }

        Some(value * sample.weight / probability)
    }
}

impl Integrator for PathTracer {
    fn li(&self, ray: &Ray, sampler: &mut dyn Sampler) -> Color {
        let mut radiance = Color::ZERO;
        let mut weight = Color::ONE;
        let mut ray = *ray;

        loop {
            let its = self.scene.intersect(&ray);
            let Some(instance) = its.instance else {
                radiance += weight * self.scene.evaluate_background(ray.direction);
                break;
            };

            radiance += weight * its.evaluate_emission();

            let Some(bsdf) = instance.bsdf() else {
                break;
            };

            if self.scene.has_lights() && bsdf.properties().can_use_nee {
                if let Some(direct) = self.next_event(&its, bsdf, sampler) {
                    radiance += weight * direct;
                }
            }

            let depth = ray.depth + 1;
            if depth >= self.config.max_depth {
                break;
            }

            let frame = its.surface.frame;
            let wo = frame.to_local(its.wo);
            let Some(sample) = bsdf.sample(its.surface.uv, wo, sampler) else {
                break;
            };
            weight *= sample.weight;

            if let Some(roulette_depth) = self.config.russian_roulette_depth {
                if depth >= roulette_depth {
                    let survival = weight.max_element().min(MAX_SURVIVAL);
                    if survival <= 0.0 || sampler.next() >= survival {
                        break;
                    }
                    weight /= survival;
                }
            }

            if weight == Color::ZERO {
                break;
            }
            ray = Ray::new(its.surface.position, frame.to_world(sample.wi)).with_depth(depth);
        }

        sanitize(radiance)
    }
}

impl fmt::Display for PathTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathTracer[max_depth={}, russian_roulette=", self.config.max_depth)?;
        match self.config.russian_roulette_depth {
            Some(depth) => write!(f, "from depth {}", depth)?,
            None => write!(f, "off")?,
        }
        write!(f, ", scene={}]", self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_validation() {
        let config = PathTracerConfig::default();
        assert_eq!(config.max_depth, 2);
        assert!(config.russian_roulette_depth.is_none());
        assert!(config.validate().is_ok());

        assert!(config.clone().with_max_depth(0).validate().is_err());
        assert!(config.with_russian_roulette(0).validate().is_err());
    }
}
