//! Analytic sphere primitive.

use std::f32::consts::PI;

use lumen_math::sampling::square_to_uniform_sphere;
use lumen_math::{Aabb, Frame, Ray, Vec2, Vec3, EPSILON};

use crate::intersection::{AreaSample, Intersection, SurfaceEvent};
use crate::sampler::Sampler;

/// A sphere defined by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Surface point for an outward unit normal.
    fn surface(&self, normal: Vec3) -> SurfaceEvent {
        // tangent follows increasing longitude, undefined at the poles
        let tangent_hint = Vec3::new(-normal.z, 0.0, normal.x);
        SurfaceEvent {
            position: self.center + self.radius * normal,
            uv: Self::sphere_uv(normal),
            frame: Frame::from_normal_and_tangent(normal, tangent_hint),
            pdf: self.area_pdf(),
        }
    }

    /// Spherical UV coordinates for a point on the unit sphere.
    ///
    /// u: angle around the Y axis from -X, v: angle down from -Y.
    fn sphere_uv(p: Vec3) -> Vec2 {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        Vec2::new(phi / (2.0 * PI), theta / PI)
    }

    fn area_pdf(&self) -> f32 {
        1.0 / (4.0 * PI * self.radius * self.radius)
    }

    /// Nearest root in `(EPSILON, its.t)`. Works with unnormalized directions.
    pub fn intersect(&self, ray: &Ray, its: &mut Intersection<'_>) -> bool {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();
        let mut root = (h - sqrtd) / a;
        if root <= EPSILON || root >= its.t {
            root = (h + sqrtd) / a;
            if root <= EPSILON || root >= its.t {
                return false;
            }
        }

        let normal = ((ray.at(root) - self.center) / self.radius).normalize();
        its.t = root;
        its.surface = self.surface(normal);
        true
    }

    /// Uniform point on the surface, pdf `1 / (4 pi r^2)`.
    pub fn sample_area(&self, sampler: &mut dyn Sampler) -> Option<AreaSample> {
        if self.radius <= 0.0 {
            return None;
        }
        let normal = square_to_uniform_sphere(sampler.next_2d());
        Some(self.surface(normal))
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }

    pub fn surface_area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }
}
