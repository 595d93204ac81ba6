//! Ray queries through meshes, instances and the scene hierarchy.

mod common;

use std::sync::Arc;

use lumen_math::EPSILON;
use lumen_renderer::{
    Instance, Intersection, Mesh, Ray, Scene, Shape, Sphere, Transform, TriangleMesh, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{init_logging, quad_shape};

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// Triangle soup of small triangles scattered through a cube.
fn random_soup(rng: &mut StdRng, triangles: usize) -> Mesh {
    let mut positions = Vec::with_capacity(triangles * 3);
    for _ in 0..triangles {
        let anchor = random_point(rng, 5.0);
        for _ in 0..3 {
            positions.push(anchor + random_point(rng, 0.6));
        }
    }
    let indices = (0..positions.len() as u32).collect();
    Mesh::new(positions, indices, None)
}

/// Closest hit by testing every triangle.
fn brute_force(mesh: &Mesh, ray: &Ray) -> Option<f32> {
    let mut closest: Option<f32> = None;
    for i in 0..mesh.triangle_count() {
        let [i0, i1, i2] = mesh.triangle(i);
        let (p0, p1, p2) = (mesh.positions[i0], mesh.positions[i1], mesh.positions[i2]);
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < 1e-8 {
            continue;
        }
        let f = 1.0 / a;
        let s = ray.origin - p0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            continue;
        }
        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            continue;
        }
        let t = f * edge2.dot(q);
        if t > EPSILON && closest.map_or(true, |c| t < c) {
            closest = Some(t);
        }
    }
    closest
}

#[test]
fn bvh_matches_brute_force_on_triangle_soup() {
    init_logging();

    let mut rng = StdRng::seed_from_u64(2024);
    let mesh = random_soup(&mut rng, 400);
    let accelerated = TriangleMesh::new(mesh.clone()).expect("valid soup");

    let mut hits = 0;
    for _ in 0..2000 {
        let origin = random_point(&mut rng, 8.0);
        let target = random_point(&mut rng, 4.0);
        let ray = Ray::new(origin, target - origin);

        let expected = brute_force(&mesh, &ray);
        let mut its = Intersection::new(ray.direction);
        let found = accelerated.intersect(&ray, &mut its);

        assert_eq!(found, expected.is_some(), "hit mismatch for {:?}", ray);
        if let Some(t) = expected {
            assert!((its.t - t).abs() <= 1e-5 * t.max(1.0), "t {} vs {}", its.t, t);
            hits += 1;
        }
    }
    // the soup is dense enough that most rays aimed at it hit something
    assert!(hits > 500, "only {} hits", hits);
}

#[test]
fn bounded_query_rejects_farther_hits() {
    let mesh = TriangleMesh::new(common::quad_mesh(1.0)).expect("quad");
    let ray = Ray::new(Vec3::new(0.2, 0.1, 3.0), Vec3::NEG_Z);

    let mut its = Intersection::with_max_distance(ray.direction, 2.5);
    assert!(!mesh.intersect(&ray, &mut its));
    assert_eq!(its.t, 2.5);

    let mut its = Intersection::with_max_distance(ray.direction, 3.5);
    assert!(mesh.intersect(&ray, &mut its));
    assert!((its.t - 3.0).abs() < 1e-5);
}

fn rotated_scaled() -> Transform {
    Transform::from_scale(Vec3::new(2.0, 0.5, 1.5))
        .then(&Transform::from_rotation(Vec3::new(1.0, 1.0, 0.0), 0.7))
        .then(&Transform::from_translation(Vec3::new(3.0, -1.0, 2.0)))
}

#[test]
fn identity_round_trip_instance_matches_plain_instance() {
    init_logging();

    let shape = Arc::new(Shape::from(
        TriangleMesh::new(random_soup(&mut StdRng::seed_from_u64(7), 60)).expect("soup"),
    ));
    let transform = rotated_scaled();
    let plain = Instance::new(shape.clone());
    let round_trip = Instance::new(shape).with_transform(transform.then(&transform.inverted()));

    let mut rng = StdRng::seed_from_u64(8);
    let mut hits = 0;
    for _ in 0..500 {
        let origin = random_point(&mut rng, 8.0);
        let ray = Ray::new(origin, random_point(&mut rng, 4.0) - origin);

        let mut a = Intersection::new(ray.direction);
        let mut b = Intersection::new(ray.direction);
        let hit_a = plain.intersect(&ray, &mut a);
        let hit_b = round_trip.intersect(&ray, &mut b);
        assert_eq!(hit_a, hit_b);

        if hit_a {
            hits += 1;
            assert!((a.t - b.t).abs() < 1e-3 * a.t.max(1.0), "t {} vs {}", a.t, b.t);
            assert!(a.surface.position.distance(b.surface.position) < 1e-3);
            assert!(a.surface.frame.normal.dot(b.surface.frame.normal) > 0.999);
        }
    }
    assert!(hits > 50);
}

#[test]
fn transformed_instance_hits_transformed_points() {
    let transform = rotated_scaled();
    let shape = Arc::new(Shape::from(Sphere::new(Vec3::ZERO, 1.0)));
    let local = Instance::new(shape.clone());
    let world = Instance::new(shape).with_transform(transform.clone());

    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..200 {
        let origin = random_point(&mut rng, 4.0) + Vec3::new(0.0, 0.0, 6.0);
        let local_ray = Ray::new(origin, random_point(&mut rng, 0.7) - origin);
        let mut local_its = Intersection::new(local_ray.direction);
        let local_hit = local.intersect(&local_ray, &mut local_its);

        let world_ray = Ray::new(
            transform.apply_point(local_ray.origin),
            transform.apply_vector(local_ray.direction),
        );
        let mut world_its = Intersection::new(world_ray.direction);
        let world_hit = world.intersect(&world_ray, &mut world_its);

        assert_eq!(local_hit, world_hit);
        if local_hit {
            let expected = transform.apply_point(local_its.surface.position);
            assert!(
                world_its.surface.position.distance(expected) < 1e-3,
                "{:?} vs {:?}",
                world_its.surface.position,
                expected
            );
            assert!(world_its.surface.frame.is_orthonormal(1e-4));
            // the distance agrees with the hit point in world units
            let along = world_ray.at(world_its.t);
            assert!(along.distance(expected) < 1e-3);
        }
    }
}

#[test]
fn scene_returns_closest_instance() {
    init_logging();

    let near = Arc::new(
        Instance::new(quad_shape(1.0))
            .with_name("near")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, 1.0))),
    );
    let far = Arc::new(Instance::new(quad_shape(1.0)).with_name("far"));
    let hidden = Arc::new(
        Instance::new(quad_shape(1.0))
            .with_name("hidden")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, 2.0)))
            .with_visible(false),
    );

    let mut builder = Scene::builder();
    builder.add_instance(far).add_instance(near).add_instance(hidden);
    let scene = builder.build().expect("scene");
    assert_eq!(scene.instance_count(), 3);

    let ray = Ray::new(Vec3::new(0.3, 0.2, 5.0), Vec3::NEG_Z);
    let its = scene.intersect(&ray);
    let instance = its.instance.expect("hit");
    assert_eq!(instance.name(), "near");
    assert!((its.t - 4.0).abs() < 1e-4);

    assert!(scene.is_occluded(&ray, 10.0));
    assert!(!scene.is_occluded(&ray, 3.5));

    let miss = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::NEG_Z);
    assert!(!scene.intersect(&miss).is_hit());
}
