//! Triangle meshes with their own BVH.

use std::fmt;

use lumen_core::{Mesh, MeshResult};
use lumen_math::sampling::{square_to_uniform_triangle, Distribution1D};
use lumen_math::{Aabb, Frame, Ray, Vec2, Vec3, EPSILON};

use crate::bvh::{Bvh, BvhPrimitives};
use crate::intersection::{AreaSample, Intersection, SurfaceEvent};
use crate::sampler::Sampler;

/// A validated [`Mesh`] ready for ray queries and area sampling.
///
/// Shading is smooth when the mesh carries per-vertex normals and flat
/// otherwise. Both triangle faces are intersected.
pub struct TriangleMesh {
    mesh: Mesh,
    bvh: Bvh,
    areas: Option<Distribution1D>,
    total_area: f32,
}

impl TriangleMesh {
    /// Validate `mesh` and build its acceleration structure.
    pub fn new(mesh: Mesh) -> MeshResult<Self> {
        mesh.validate()?;

        let areas: Vec<f32> = (0..mesh.triangle_count())
            .map(|i| {
                let [i0, i1, i2] = mesh.triangle(i);
                let p0 = mesh.positions[i0];
                0.5 * (mesh.positions[i1] - p0)
                    .cross(mesh.positions[i2] - p0)
                    .length()
            })
            .collect();
        let total_area = areas.iter().sum();

        let mut triangle_mesh = Self {
            areas: Distribution1D::new(&areas),
            mesh,
            bvh: Bvh::empty(),
            total_area,
        };
        triangle_mesh.bvh = Bvh::build(&triangle_mesh);

        log::info!(
            "TriangleMesh: {} triangles, {} vertices, {} shading, area {:.3}",
            triangle_mesh.mesh.triangle_count(),
            triangle_mesh.mesh.vertex_count(),
            if triangle_mesh.mesh.has_normals() { "smooth" } else { "flat" },
            total_area
        );

        Ok(triangle_mesh)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn surface_area(&self) -> f32 {
        self.total_area
    }

    /// Bounds of the triangles, as seen by the acceleration structure.
    pub fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }

    pub fn centroid(&self) -> Vec3 {
        self.bounding_box().centroid()
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, its: &mut Intersection<'a>) -> bool {
        self.bvh.intersect(self, ray, its)
    }

    /// Uniform point over the whole surface, pdf `1 / total_area`.
    pub fn sample_area(&self, sampler: &mut dyn Sampler) -> Option<AreaSample> {
        let areas = self.areas.as_ref()?;
        let (index, _) = areas.sample(sampler.next());
        let b = square_to_uniform_triangle(sampler.next_2d());
        Some(self.surface_at(index, b.x, b.y))
    }

    fn vertices(&self, index: usize) -> [Vec3; 3] {
        let [i0, i1, i2] = self.mesh.triangle(index);
        [
            self.mesh.positions[i0],
            self.mesh.positions[i1],
            self.mesh.positions[i2],
        ]
    }

    /// Surface data at barycentrics `(b1, b2)` of triangle `index`.
    fn surface_at(&self, index: usize, b1: f32, b2: f32) -> SurfaceEvent {
        let ids = self.mesh.triangle(index);
        let [p0, p1, p2] = self.vertices(index);
        let b0 = 1.0 - b1 - b2;
        let e1 = p1 - p0;
        let e2 = p2 - p0;

        let geometric_normal = e1.cross(e2).try_normalize().unwrap_or(Vec3::Z);
        let normal = match &self.mesh.normals {
            Some(normals) => (b0 * normals[ids[0]] + b1 * normals[ids[1]] + b2 * normals[ids[2]])
                .try_normalize()
                .unwrap_or(geometric_normal),
            None => geometric_normal,
        };

        let (uv, tangent_hint) = match &self.mesh.uvs {
            Some(uvs) => {
                let (uv0, uv1, uv2) = (uvs[ids[0]], uvs[ids[1]], uvs[ids[2]]);
                let uv = b0 * uv0 + b1 * uv1 + b2 * uv2;
                (uv, dp_du(e1, e2, uv1 - uv0, uv2 - uv0).unwrap_or(e1))
            }
            None => (Vec2::new(b1, b2), e1),
        };

        SurfaceEvent {
            position: b0 * p0 + b1 * p1 + b2 * p2,
            uv,
            frame: Frame::from_normal_and_tangent(normal, tangent_hint),
            pdf: if self.total_area > 0.0 {
                1.0 / self.total_area
            } else {
                0.0
            },
        }
    }

    /// Möller-Trumbore intersection, accepting both faces.
    fn intersect_triangle(&self, index: usize, ray: &Ray, its: &mut Intersection<'_>) -> bool {
        let [p0, p1, p2] = self.vertices(index);
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return false;
        }

        let f = 1.0 / a;
        let s = ray.origin - p0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * edge2.dot(q);
        if t <= EPSILON || t >= its.t {
            return false;
        }

        its.t = t;
        its.surface = self.surface_at(index, u, v);
        true
    }
}

/// Position derivative along u, when the UV parameterization is not degenerate.
fn dp_du(e1: Vec3, e2: Vec3, duv1: Vec2, duv2: Vec2) -> Option<Vec3> {
    let det = duv1.x * duv2.y - duv1.y * duv2.x;
    if det.abs() < 1e-8 {
        return None;
    }
    Some((duv2.y * e1 - duv1.y * e2) / det)
}

impl BvhPrimitives for TriangleMesh {
    fn primitive_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    fn primitive_bounds(&self, index: usize) -> Aabb {
        let [p0, p1, p2] = self.vertices(index);
        Aabb::from_points(p0.min(p1).min(p2), p0.max(p1).max(p2))
    }

    fn primitive_centroid(&self, index: usize) -> Vec3 {
        let [p0, p1, p2] = self.vertices(index);
        (p0 + p1 + p2) / 3.0
    }

    fn intersect_primitive<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection<'a>,
    ) -> bool {
        self.intersect_triangle(index, ray, its)
    }
}

impl fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangleMesh")
            .field("triangles", &self.mesh.triangle_count())
            .field("vertices", &self.mesh.vertex_count())
            .field("bvh_nodes", &self.bvh.node_count())
            .field("area", &self.total_area)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_quad() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            None,
        )
    }

    #[test]
    fn test_mesh_rejects_invalid_input() {
        let mut mesh = unit_quad();
        mesh.indices.push(0);
        assert!(TriangleMesh::new(mesh).is_err());
    }

    #[test]
    fn test_bounds_follow_edited_positions() {
        let mut mesh = unit_quad();
        // the cached bounds predate this edit
        mesh.positions[2] = Vec3::new(4.0, 3.0, 0.0);
        let quad = TriangleMesh::new(mesh).expect("valid mesh");

        let bbox = quad.bounding_box();
        assert!((bbox.max().x - 4.0).abs() < 1e-4);
        assert!((bbox.max().y - 3.0).abs() < 1e-4);
        assert!((bbox.min().x + 1.0).abs() < 1e-4);
        assert!((quad.centroid() - Vec3::new(1.5, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_hit_both_faces() {
        let quad = TriangleMesh::new(unit_quad()).expect("valid mesh");

        let down = Ray::new(Vec3::new(0.2, 0.3, 2.0), Vec3::NEG_Z);
        let mut its = Intersection::new(down.direction);
        assert!(quad.intersect(&down, &mut its));
        assert!((its.t - 2.0).abs() < 1e-5);
        assert!((its.surface.position - Vec3::new(0.2, 0.3, 0.0)).length() < 1e-5);
        assert!((its.surface.frame.normal - Vec3::Z).length() < 1e-5);

        let up = Ray::new(Vec3::new(0.2, 0.3, -1.0), Vec3::Z);
        let mut its = Intersection::new(up.direction);
        assert!(quad.intersect(&up, &mut its));
        assert!((its.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_uvs_are_interpolated() {
        let mesh = unit_quad().with_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        let quad = TriangleMesh::new(mesh).expect("valid mesh");
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z);
        let mut its = Intersection::new(ray.direction);
        assert!(quad.intersect(&ray, &mut its));
        assert!((its.surface.uv - Vec2::new(0.75, 0.5)).length() < 1e-5);
        // tangent follows +u, which is +X here
        assert!((its.surface.frame.tangent - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_smooth_normals_are_used() {
        let mut mesh = unit_quad();
        mesh.normals = Some(vec![Vec3::new(0.0, 0.6, 0.8); 4]);
        let quad = TriangleMesh::new(mesh).expect("valid mesh");
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        let mut its = Intersection::new(ray.direction);
        assert!(quad.intersect(&ray, &mut its));
        assert!((its.surface.frame.normal - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_area_sampling() {
        let quad = TriangleMesh::new(unit_quad()).expect("valid mesh");
        assert!((quad.surface_area() - 4.0).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let s = quad.sample_area(&mut rng).expect("sample");
            assert!(s.position.x.abs() <= 1.0 + 1e-5 && s.position.y.abs() <= 1.0 + 1e-5);
            assert!(s.position.z.abs() < 1e-6);
            assert!((s.pdf - 0.25).abs() < 1e-6);
        }
    }
}
