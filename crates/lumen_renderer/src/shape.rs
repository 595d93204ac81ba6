//! The closed set of intersectable shapes.

use std::fmt;

use lumen_math::{Aabb, Ray, Vec3};

use crate::intersection::{AreaSample, Intersection};
use crate::mesh::TriangleMesh;
use crate::sampler::Sampler;
use crate::sphere::Sphere;

/// Geometry an [`Instance`](crate::Instance) can reference.
///
/// Shapes are shared between instances through `Arc` and never mutated
/// after construction.
#[derive(Debug)]
pub enum Shape {
    Sphere(Sphere),
    TriangleMesh(TriangleMesh),
}

impl Shape {
    /// Narrow `its.t` if the ray hits this shape closer than the current hit.
    pub fn intersect<'a>(&'a self, ray: &Ray, its: &mut Intersection<'a>) -> bool {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray, its),
            Shape::TriangleMesh(mesh) => mesh.intersect(ray, its),
        }
    }

    /// Uniform point on the surface with its area-measure density.
    pub fn sample_area(&self, sampler: &mut dyn Sampler) -> Option<AreaSample> {
        match self {
            Shape::Sphere(sphere) => sphere.sample_area(sampler),
            Shape::TriangleMesh(mesh) => mesh.sample_area(sampler),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Sphere(sphere) => sphere.bounding_box(),
            Shape::TriangleMesh(mesh) => mesh.bounding_box(),
        }
    }

    pub fn centroid(&self) -> Vec3 {
        match self {
            Shape::Sphere(sphere) => sphere.center,
            Shape::TriangleMesh(mesh) => mesh.centroid(),
        }
    }

    /// Number of primitives behind this shape.
    pub fn primitive_count(&self) -> usize {
        match self {
            Shape::Sphere(_) => 1,
            Shape::TriangleMesh(mesh) => mesh.triangle_count(),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<TriangleMesh> for Shape {
    fn from(mesh: TriangleMesh) -> Self {
        Shape::TriangleMesh(mesh)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Sphere(s) => write!(f, "Sphere[center={}, radius={}]", s.center, s.radius),
            Shape::TriangleMesh(m) => write!(f, "TriangleMesh[triangles={}]", m.triangle_count()),
        }
    }
}
