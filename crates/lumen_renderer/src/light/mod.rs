//! Light sources for next-event estimation.
//!
//! Every light can be sampled from a shading point. Lights that ordinary
//! rays can also find (visible area emitters, the environment) report
//! `can_be_intersected`, and the path tracer collects them on hit instead
//! of sampling them, so no light is counted twice.

mod area;
mod directional;
mod environment;
mod point;

use std::fmt;

use lumen_math::Vec3;

use crate::sampler::Sampler;
use crate::Color;

pub use area::AreaLight;
pub use directional::DirectionalLight;
pub use environment::EnvironmentMap;
pub use point::PointLight;

/// A sampled direction towards a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectLightSample {
    /// Unit world-space direction from the shading point to the light.
    pub wi: Vec3,
    /// Distance to the sampled point, `f32::INFINITY` for lights at infinity.
    pub distance: f32,
    /// Incident radiance divided by the direction-sampling density.
    pub weight: Color,
}

impl DirectLightSample {
    pub(crate) fn new(wi: Vec3, distance: f32, weight: Color) -> Option<Self> {
        (wi.is_finite() && !distance.is_nan() && weight.is_finite()).then_some(Self {
            wi,
            distance,
            weight,
        })
    }

    pub fn is_infinite(&self) -> bool {
        self.distance == f32::INFINITY
    }
}

/// The closed set of light sources.
#[derive(Debug, Clone)]
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
    Area(AreaLight),
    Environment(EnvironmentMap),
}

impl Light {
    /// Sample incident illumination at `origin`.
    pub fn sample_direct(&self, origin: Vec3, sampler: &mut dyn Sampler) -> Option<DirectLightSample> {
        match self {
            Light::Point(light) => light.sample_direct(origin),
            Light::Directional(light) => light.sample_direct(),
            Light::Area(light) => light.sample_direct(origin, sampler),
            Light::Environment(light) => light.sample_direct(sampler),
        }
    }

    /// True if ordinary rays can hit this light.
    pub fn can_be_intersected(&self) -> bool {
        match self {
            Light::Point(_) | Light::Directional(_) => false,
            Light::Area(light) => light.can_be_intersected(),
            Light::Environment(_) => true,
        }
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Light::Point(l) => write!(f, "PointLight[position={}, power={}]", l.position, l.power),
            Light::Directional(l) => write!(
                f,
                "DirectionalLight[direction={}, intensity={}]",
                l.direction(),
                l.intensity
            ),
            Light::Area(l) => write!(f, "AreaLight[instance={}]", l.instance().name()),
            Light::Environment(l) => write!(f, "{}", l),
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<AreaLight> for Light {
    fn from(light: AreaLight) -> Self {
        Light::Area(light)
    }
}

impl From<EnvironmentMap> for Light {
    fn from(light: EnvironmentMap) -> Self {
        Light::Environment(light)
    }
}
