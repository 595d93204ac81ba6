use std::sync::Arc;

use lumen_math::Vec3;

use super::DirectLightSample;
use crate::error::{SceneError, SceneResult};
use crate::instance::Instance;
use crate::sampler::Sampler;

/// Emission of an instance, sampled by area.
#[derive(Debug, Clone)]
pub struct AreaLight {
    instance: Arc<Instance>,
}

impl AreaLight {
    /// Bind a light to an emitting instance.
    pub fn new(instance: Arc<Instance>) -> SceneResult<Self> {
        if instance.emission().is_none() {
            return Err(SceneError::MissingEmission(instance.name().to_string()));
        }
        Ok(Self { instance })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Visible emitters are found by ray hits.
    pub fn can_be_intersected(&self) -> bool {
        self.instance.is_visible()
    }

    /// Weight is `L_e cos_l / (pdf_area d^2)`: one cosine at the emitter
    /// and one squared distance convert area to solid angle.
    pub fn sample_direct(&self, origin: Vec3, sampler: &mut dyn Sampler) -> Option<DirectLightSample> {
        let emission = self.instance.emission()?;
        let sample = self.instance.sample_area(sampler)?;
        if sample.pdf.is_nan() || sample.pdf <= 0.0 {
            return None;
        }

        let to_light = sample.position - origin;
        let distance2 = to_light.length_squared();
        if distance2 <= 0.0 {
            return None;
        }
        let distance = distance2.sqrt();
        let wi = to_light / distance;

        let wo_local = sample.frame.to_local(-wi);
        let radiance = emission.evaluate(sample.uv, wo_local);
        let weight = radiance * (wo_local.z.abs() / (sample.pdf * distance2));

        DirectLightSample::new(wi, distance, weight)
    }
}
