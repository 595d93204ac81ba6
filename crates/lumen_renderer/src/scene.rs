//! Scene assembly and queries.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use lumen_math::sampling::Distribution1D;
use lumen_math::{Aabb, Ray, Vec3, EPSILON};
use serde::{Deserialize, Serialize};

use crate::bvh::{Bvh, BvhPrimitives};
use crate::error::{SceneError, SceneResult};
use crate::instance::Instance;
use crate::intersection::Intersection;
use crate::light::{AreaLight, EnvironmentMap, Light};
use crate::sampler::Sampler;
use crate::Color;

/// How next-event estimation picks a light.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightSelection {
    /// Every light equally likely.
    #[default]
    Uniform,
    /// One non-negative weight per light, in registration order.
    Weighted(Vec<f32>),
}

/// Visible instances, the top level of the two-level hierarchy.
struct InstanceList(Vec<Arc<Instance>>);

impl BvhPrimitives for InstanceList {
    fn primitive_count(&self) -> usize {
        self.0.len()
    }

    fn primitive_bounds(&self, index: usize) -> Aabb {
        self.0[index].bounding_box()
    }

    fn primitive_centroid(&self, index: usize) -> Vec3 {
        self.0[index].centroid()
    }

    fn intersect_primitive<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection<'a>,
    ) -> bool {
        self.0[index].intersect(ray, its)
    }
}

/// Collects instances and lights before building an immutable [`Scene`].
#[derive(Default)]
pub struct SceneBuilder {
    instances: Vec<Arc<Instance>>,
    lights: Vec<Light>,
    background: Option<EnvironmentMap>,
    light_selection: LightSelection,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instance(&mut self, instance: Arc<Instance>) -> &mut Self {
        self.instances.push(instance);
        self
    }

    /// Add an emitting instance together with the area light sampling it.
    pub fn add_emitter(&mut self, instance: Arc<Instance>) -> SceneResult<&mut Self> {
        let light = AreaLight::new(instance.clone())?;
        self.instances.push(instance);
        self.lights.push(Light::Area(light));
        Ok(self)
    }

    /// Register a light for next-event estimation.
    ///
    /// Escaped rays already collect the environment, so an environment map
    /// becomes the background instead of a sampled light.
    pub fn add_light(&mut self, light: impl Into<Light>) -> &mut Self {
        match light.into() {
            Light::Environment(environment) => {
                if self.background.is_some() {
                    log::warn!("Environment light replaces the existing background");
                }
                self.background = Some(environment);
            }
            light => self.lights.push(light),
        }
        self
    }

    /// Radiance for rays that leave the scene.
    pub fn background(&mut self, background: EnvironmentMap) -> &mut Self {
        self.background = Some(background);
        self
    }

    pub fn light_selection(&mut self, selection: LightSelection) -> &mut Self {
        self.light_selection = selection;
        self
    }

    pub fn build(&self) -> SceneResult<Scene> {
        let start = Instant::now();

        let light_distribution = match &self.light_selection {
            LightSelection::Uniform => None,
            LightSelection::Weighted(weights) => {
                if weights.len() != self.lights.len() {
                    return Err(SceneError::LightWeightCount {
                        weights: weights.len(),
                        lights: self.lights.len(),
                    });
                }
                if self.lights.is_empty() {
                    None
                } else {
                    Some(Distribution1D::new(weights).ok_or(SceneError::LightWeightMass)?)
                }
            }
        };

        let visible: Vec<Arc<Instance>> = self
            .instances
            .iter()
            .filter(|instance| instance.is_visible())
            .cloned()
            .collect();
        let hidden = self.instances.len() - visible.len();
        let instances = InstanceList(visible);
        let bvh = Bvh::build(&instances);

        let bounds = self
            .instances
            .iter()
            .fold(Aabb::EMPTY, |acc, i| Aabb::surrounding(&acc, &i.bounding_box()));

        let scene = Scene {
            instances,
            hidden,
            bvh,
            lights: self.lights.clone(),
            light_distribution,
            background: self.background.clone(),
            bounds,
        };

        log::info!(
            "Built scene in {:.2}ms: {}",
            start.elapsed().as_secs_f64() * 1000.0,
            scene
        );
        if !scene.has_lights() && scene.background.is_none() {
            log::warn!("Scene has no lights and no background, renders will be black");
        }

        Ok(scene)
    }
}

/// Immutable collection of instances and lights, safe to share across
/// render threads.
pub struct Scene {
    instances: InstanceList,
    hidden: usize,
    bvh: Bvh,
    lights: Vec<Light>,
    light_distribution: Option<Distribution1D>,
    background: Option<EnvironmentMap>,
    bounds: Aabb,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    /// Closest visible hit along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        let mut its = Intersection::new(ray.direction);
        self.bvh.intersect(&self.instances, ray, &mut its);
        its
    }

    /// True if anything visible lies along `ray` before `max_distance`.
    ///
    /// The far end is pulled in slightly so the light's own surface does
    /// not occlude itself.
    pub fn is_occluded(&self, ray: &Ray, max_distance: f32) -> bool {
        let mut its = Intersection::with_max_distance(ray.direction, max_distance * (1.0 - EPSILON));
        self.bvh.intersect(&self.instances, ray, &mut its)
    }

    /// Radiance arriving along an escaping ray travelling in `direction`.
    pub fn evaluate_background(&self, direction: Vec3) -> Color {
        self.background
            .as_ref()
            .map_or(Color::ZERO, |background| background.evaluate(direction))
    }

    pub fn has_lights(&self) -> bool {
        !self.lights.is_empty()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Pick one light, returning it with its selection probability.
    pub fn sample_light(&self, sampler: &mut dyn Sampler) -> Option<(&Light, f32)> {
        if self.lights.is_empty() {
            return None;
        }
        let u = sampler.next();
        match &self.light_distribution {
            Some(distribution) => {
                let (index, probability) = distribution.sample(u);
                (probability > 0.0).then(|| (&self.lights[index], probability))
            }
            None => {
                let n = self.lights.len();
                let index = ((u * n as f32) as usize).min(n - 1);
                Some((&self.lights[index], 1.0 / n as f32))
            }
        }
    }

    /// Bounds of all instances, hidden ones included.
    pub fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    pub fn instance_count(&self) -> usize {
        self.instances.0.len() + self.hidden
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene[instances={} ({} hidden), lights={}, bvh_nodes={}, background={}, selection={}]",
            self.instance_count(),
            self.hidden,
            self.lights.len(),
            self.bvh.node_count(),
            if self.background.is_some() { "yes" } else { "none" },
            if self.light_distribution.is_some() { "weighted" } else { "uniform" }
        )
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
