//! Placed geometry.
//!
//! An instance pairs a shared [`Shape`] with an optional local-to-world
//! transform and the material data used to shade it. Many instances can
//! reference the same mesh; only the ray is moved into local space, never
//! the geometry.

use std::fmt;
use std::sync::Arc;

use lumen_core::Texture;
use lumen_math::{Aabb, Frame, Ray, Transform, Vec3};

use crate::bsdf::Bsdf;
use crate::emission::Emission;
use crate::intersection::{AreaSample, Intersection, SurfaceEvent};
use crate::sampler::Sampler;
use crate::shape::Shape;

/// A shape placed in the scene with its shading data.
#[derive(Debug, Clone)]
pub struct Instance {
    name: Option<String>,
    shape: Arc<Shape>,
    transform: Option<Transform>,
    bsdf: Option<Arc<Bsdf>>,
    emission: Option<Arc<Emission>>,
    normal_map: Option<Arc<dyn Texture>>,
    flip_normal: bool,
    visible: bool,
    world_bbox: Aabb,
}

impl Instance {
    pub fn new(shape: Arc<Shape>) -> Self {
        let world_bbox = shape.bounding_box();
        Self {
            name: None,
            shape,
            transform: None,
            bsdf: None,
            emission: None,
            normal_map: None,
            flip_normal: false,
            visible: true,
            world_bbox,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Place the shape with a local-to-world transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.world_bbox = transform.apply_aabb(&self.shape.bounding_box());
        self.transform = Some(transform);
        self
    }

    pub fn with_bsdf(mut self, bsdf: Arc<Bsdf>) -> Self {
        self.bsdf = Some(bsdf);
        self
    }

    pub fn with_emission(mut self, emission: Arc<Emission>) -> Self {
        self.emission = Some(emission);
        self
    }

    /// Tangent-space normal map, RGB remapped from `[0,1]` to `[-1,1]`.
    pub fn with_normal_map(mut self, normal_map: Arc<dyn Texture>) -> Self {
        self.normal_map = Some(normal_map);
        self
    }

    pub fn with_flip_normal(mut self, flip_normal: bool) -> Self {
        self.flip_normal = flip_normal;
        self
    }

    /// Invisible instances are skipped by ray queries but can still emit
    /// through an area light.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn bsdf(&self) -> Option<&Bsdf> {
        self.bsdf.as_deref()
    }

    pub fn emission(&self) -> Option<&Emission> {
        self.emission.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// World-space bounds. Unbounded local bounds stay unbounded.
    pub fn bounding_box(&self) -> Aabb {
        self.world_bbox
    }

    pub fn centroid(&self) -> Vec3 {
        let local = self.shape.centroid();
        match &self.transform {
            Some(transform) => transform.apply_point(local),
            None => local,
        }
    }

    /// Intersect a world-space ray, narrowing `its.t` on a strictly closer hit.
    pub fn intersect<'a>(&'a self, ray: &Ray, its: &mut Intersection<'a>) -> bool {
        let Some(transform) = &self.transform else {
            if !self.shape.intersect(ray, its) {
                return false;
            }
            self.shade(&mut its.surface);
            its.instance = Some(self);
            return true;
        };

        let local = transform.inverse_ray(ray);
        let scale = local.direction.length();
        if !(scale > 0.0 && scale.is_finite()) {
            return false;
        }
        let local_ray = Ray::new_unnormalized(local.origin, local.direction / scale, ray.depth);

        // distances shrink or grow by `scale` going from world to local units
        let world_t = its.t;
        its.t = world_t * scale;
        if !self.shape.intersect(&local_ray, its) {
            its.t = world_t;
            return false;
        }
        its.t /= scale;

        self.to_world(transform, &mut its.surface);
        self.shade(&mut its.surface);
        its.instance = Some(self);
        true
    }

    /// Uniform point on the instance surface in world space.
    ///
    /// The density is expressed per unit of world-space area.
    pub fn sample_area(&self, sampler: &mut dyn Sampler) -> Option<AreaSample> {
        let mut sample = self.shape.sample_area(sampler)?;
        if let Some(transform) = &self.transform {
            self.to_world(transform, &mut sample);
        }
        self.shade(&mut sample);
        Some(sample)
    }

    /// Move a local surface event to world space and rebuild its frame.
    fn to_world(&self, transform: &Transform, surface: &mut SurfaceEvent) {
        surface.position = transform.apply_point(surface.position);

        let tangent = transform.apply_vector(surface.frame.tangent);
        let bitangent = transform.apply_vector(surface.frame.bitangent);

        // area scale of the transform in the tangent plane
        let jacobian = bitangent.cross(tangent).length();
        if jacobian > 0.0 {
            surface.pdf /= jacobian;
        }

        let tangent = tangent.normalize();
        let bitangent = (bitangent - tangent * tangent.dot(bitangent)).normalize();
        surface.frame = Frame {
            tangent,
            bitangent,
            normal: tangent.cross(bitangent),
        };
    }

    /// Apply the normal map and the normal flip to a world-space frame.
    fn shade(&self, surface: &mut SurfaceEvent) {
        if let Some(normal_map) = &self.normal_map {
            let n = normal_map.evaluate(surface.uv) * 2.0 - Vec3::ONE;
            let frame = surface.frame;
            if let Some(normal) =
                (frame.tangent * n.x + frame.bitangent * n.y + frame.normal * n.z).try_normalize()
            {
                surface.frame = Frame::from_normal_and_tangent(normal, frame.tangent);
            }
        }

        if self.flip_normal {
            let frame = &mut surface.frame;
            frame.bitangent = -frame.bitangent;
            frame.normal = frame.tangent.cross(frame.bitangent);
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance[name={}, shape={}", self.name(), self.shape)?;
        if self.transform.is_some() {
            write!(f, ", transformed")?;
        }
        if let Some(bsdf) = &self.bsdf {
            write!(f, ", bsdf={}", bsdf)?;
        }
        if let Some(emission) = &self.emission {
            write!(f, ", emission={}", emission)?;
        }
        if self.normal_map.is_some() {
            write!(f, ", normal-mapped")?;
        }
        if self.flip_normal {
            write!(f, ", flipped")?;
        }
        if !self.visible {
            write!(f, ", hidden")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleMesh;
    use crate::sphere::Sphere;
    use lumen_core::ConstantTexture;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    fn unit_sphere() -> Arc<Shape> {
        Arc::new(Shape::from(Sphere::new(Vec3::ZERO, 1.0)))
    }

    #[test]
    fn test_untransformed_forwards_directly() {
        let instance = Instance::new(unit_sphere());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let mut its = Intersection::new(ray.direction);
        assert!(instance.intersect(&ray, &mut its));
        assert!((its.t - 4.0).abs() < 1e-5);
        assert!(its.is_hit());
    }

    #[test]
    fn test_scaled_instance_reports_world_distance() {
        let instance = Instance::new(unit_sphere()).with_transform(
            Transform::from_scale(Vec3::splat(2.0)).then(&Transform::from_translation(Vec3::X)),
        );
        let ray = Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z);
        let mut its = Intersection::new(ray.direction);

        assert!(instance.intersect(&ray, &mut its));
        assert!((its.t - 8.0).abs() < 1e-4, "t = {}", its.t);
        assert!((its.surface.position - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-4);
        assert!((its.surface.frame.normal - Vec3::Z).length() < 1e-4);
        assert!(its.surface.frame.is_orthonormal(1e-4));
    }

    #[test]
    fn test_transformed_miss_restores_bound() {
        let instance = Instance::new(unit_sphere())
            .with_transform(Transform::from_scale(Vec3::new(3.0, 1.0, 0.5)));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let mut its = Intersection::with_max_distance(ray.direction, 5.0);
        assert!(!instance.intersect(&ray, &mut its));
        assert_eq!(its.t, 5.0);
    }

    #[test]
    fn test_nonuniform_scale_keeps_frame_orthonormal() {
        let instance = Instance::new(unit_sphere()).with_transform(
            Transform::from_scale(Vec3::new(3.0, 1.0, 0.5))
                .then(&Transform::from_rotation(Vec3::Y, 0.3)),
        );
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let dir = lumen_math::sampling::square_to_uniform_sphere(
                crate::Sampler::next_2d(&mut rng),
            );
            let ray = Ray::new(dir * 10.0, -dir);
            let mut its = Intersection::new(ray.direction);
            assert!(instance.intersect(&ray, &mut its));
            assert!(its.surface.frame.is_orthonormal(1e-3));
        }
    }

    #[test]
    fn test_area_pdf_includes_jacobian() {
        let instance = Instance::new(unit_sphere())
            .with_transform(Transform::from_scale(Vec3::splat(2.0)));
        let mut rng = StdRng::seed_from_u64(42);
        let sample = instance.sample_area(&mut rng).expect("sample");
        // radius 2 sphere: pdf = 1 / (16 pi)
        assert!((sample.pdf - 1.0 / (16.0 * PI)).abs() < 1e-6);
        assert!((sample.position.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_area_pdf_under_nonuniform_rotated_scale() {
        let quad = lumen_core::Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            None,
        );
        let quad = Arc::new(Shape::from(TriangleMesh::new(quad).expect("valid quad")));
        let transform = Transform::from_scale(Vec3::new(3.0, 0.5, 1.0))
            .then(&Transform::from_rotation(Vec3::new(1.0, 1.0, 0.0), 0.7));
        let instance = Instance::new(quad).with_transform(transform);

        // 2x2 quad stretched to 6x1
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..64 {
            let sample = instance.sample_area(&mut rng).expect("sample");
            assert!((sample.pdf - 1.0 / 6.0).abs() < 1e-5, "pdf {}", sample.pdf);
            assert!(sample.frame.is_orthonormal(1e-4));
        }
    }

    #[test]
    fn test_ellipsoid_area_from_sample_pdfs() {
        let instance = Instance::new(unit_sphere())
            .with_transform(Transform::from_scale(Vec3::new(2.0, 1.0, 0.5)));
        let mut rng = StdRng::seed_from_u64(17);
        let n = 50_000;
        let mean_inverse_pdf = (0..n)
            .map(|_| 1.0 / instance.sample_area(&mut rng).expect("sample").pdf as f64)
            .sum::<f64>()
            / n as f64;
        // surface area of the (2, 1, 0.5) ellipsoid
        assert!((mean_inverse_pdf - 15.869).abs() < 0.25, "{}", mean_inverse_pdf);
    }

    #[test]
    fn test_flip_normal() {
        let instance = Instance::new(unit_sphere()).with_flip_normal(true);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let mut its = Intersection::new(ray.direction);
        assert!(instance.intersect(&ray, &mut its));
        assert!((its.surface.frame.normal - Vec3::NEG_Z).length() < 1e-5);
        assert!(its.surface.frame.is_orthonormal(1e-4));
    }

    #[test]
    fn test_flat_normal_map_is_identity() {
        let flat = Arc::new(ConstantTexture::new(Vec3::new(0.5, 0.5, 1.0)));
        let instance = Instance::new(unit_sphere()).with_normal_map(flat);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let mut its = Intersection::new(ray.direction);
        assert!(instance.intersect(&ray, &mut its));
        assert!((its.surface.frame.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_world_bounds() {
        let instance = Instance::new(unit_sphere())
            .with_transform(Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        let bbox = instance.bounding_box();
        assert!((bbox.min().x - 4.0).abs() < 1e-4);
        assert!((bbox.max().x - 6.0).abs() < 1e-4);
        assert!((instance.centroid() - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }
}
