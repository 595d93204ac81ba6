#![allow(dead_code)]

use std::sync::Arc;

use lumen_renderer::{
    Bsdf, Camera, CameraSample, Color, Instance, Mesh, Ray, Sampler, Shape, TriangleMesh, Vec3,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Pinhole camera looking from `look_from` towards `look_at`.
pub struct PinholeCamera {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    width: u32,
    height: u32,
}

impl PinholeCamera {
    pub fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov_degrees: f32, width: u32, height: u32) -> Self {
        let aspect = width as f32 / height as f32;
        let viewport_height = 2.0 * (vfov_degrees.to_radians() / 2.0).tan();
        let viewport_width = aspect * viewport_height;

        let w = (look_from - look_at).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        let horizontal = viewport_width * u;
        let vertical = viewport_height * v;
        Self {
            origin: look_from,
            lower_left: look_from - horizontal / 2.0 - vertical / 2.0 - w,
            horizontal,
            vertical,
            width,
            height,
        }
    }
}

impl Camera for PinholeCamera {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn sample_ray(&self, x: u32, y: u32, sampler: &mut dyn Sampler) -> CameraSample {
        let jitter = sampler.next_2d();
        let s = (x as f32 + jitter.x) / self.width as f32;
        let t = 1.0 - (y as f32 + jitter.y) / self.height as f32;
        let direction = self.lower_left + s * self.horizontal + t * self.vertical - self.origin;
        CameraSample::new(Ray::new(self.origin, direction))
    }
}

/// Square in the z = 0 plane spanning `[-half, half]^2`, normal +Z.
pub fn quad_mesh(half: f32) -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(-half, -half, 0.0),
            Vec3::new(half, -half, 0.0),
            Vec3::new(half, half, 0.0),
            Vec3::new(-half, half, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
        None,
    )
}

pub fn quad_shape(half: f32) -> Arc<Shape> {
    Arc::new(Shape::from(
        TriangleMesh::new(quad_mesh(half)).expect("valid quad"),
    ))
}

/// Diffuse floor in the z = 0 plane.
pub fn diffuse_floor(half: f32, albedo: f32) -> Arc<Instance> {
    Arc::new(
        Instance::new(quad_shape(half))
            .with_name("floor")
            .with_bsdf(Arc::new(Bsdf::from(lumen_renderer::bsdf::Diffuse::constant(
                Color::splat(albedo),
            )))),
    )
}
