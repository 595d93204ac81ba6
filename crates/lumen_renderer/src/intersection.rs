//! Hit records shared by shapes, instances and the scene.

use lumen_math::{Frame, Vec2, Vec3};

use crate::instance::Instance;
use crate::Color;

/// A point on a surface with its shading frame.
///
/// `pdf` is the area-measure density of the point when it was produced by
/// surface sampling. Ray hits fill it with the same density so light
/// sampling and intersection agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceEvent {
    pub position: Vec3,
    pub uv: Vec2,
    pub frame: Frame,
    pub pdf: f32,
}

impl Default for SurfaceEvent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            uv: Vec2::ZERO,
            frame: Frame::default(),
            pdf: 0.0,
        }
    }
}

/// A surface point produced by uniform area sampling.
pub type AreaSample = SurfaceEvent;

/// Result of a ray query.
///
/// `t` doubles as the query bound: it starts at the maximum distance and
/// only ever shrinks as closer hits are found.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub t: f32,
    /// World-space direction back towards the ray origin.
    pub wo: Vec3,
    pub surface: SurfaceEvent,
    pub instance: Option<&'a Instance>,
}

impl<'a> Intersection<'a> {
    /// An empty record for a ray travelling along `direction`.
    pub fn new(direction: Vec3) -> Self {
        Self::with_max_distance(direction, f32::INFINITY)
    }

    /// An empty record that only accepts hits closer than `max_distance`.
    pub fn with_max_distance(direction: Vec3, max_distance: f32) -> Self {
        Self {
            t: max_distance,
            wo: -direction,
            surface: SurfaceEvent::default(),
            instance: None,
        }
    }

    /// True once an instance has been hit.
    pub fn is_hit(&self) -> bool {
        self.instance.is_some()
    }

    /// Radiance emitted towards `wo`, or zero for non-emitters and misses.
    pub fn evaluate_emission(&self) -> Color {
        match self.instance.and_then(|instance| instance.emission()) {
            Some(emission) => {
                let wo_local = self.surface.frame.to_local(self.wo);
                emission.evaluate(self.surface.uv, wo_local)
            }
            None => Color::ZERO,
        }
    }
}
