//! Render a Cornell box to a PNG.
//!
//! ```text
//! cargo run --release --example cornell_box -- [output.png] [samples per pixel]
//! ```

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use anyhow::Context;
use lumen_renderer::bsdf::{Dielectric, Diffuse, Principled, RoughConductor};
use lumen_renderer::integrator::{PathTracer, PathTracerConfig};
use lumen_renderer::{
    render, Bsdf, Camera, CameraSample, Color, Emission, Instance, Mesh, Ray, RenderConfig,
    Sampler, Scene, Shape, Sphere, Transform, TriangleMesh, Vec3,
};

const WIDTH: u32 = 400;
const HEIGHT: u32 = 400;

struct PinholeCamera {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl PinholeCamera {
    fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov_degrees: f32) -> Self {
        let aspect = WIDTH as f32 / HEIGHT as f32;
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
        }
    }
}

impl Camera for PinholeCamera {
    fn width(&self) -> u32 {
        WIDTH
    }

    fn height(&self) -> u32 {
        HEIGHT
    }

    fn sample_ray(&self, x: u32, y: u32, sampler: &mut dyn Sampler) -> CameraSample {
        let jitter = sampler.next_2d();
        let s = (x as f32 + jitter.x) / WIDTH as f32;
        let t = 1.0 - (y as f32 + jitter.y) / HEIGHT as f32;
        let direction = self.lower_left + s * self.horizontal + t * self.vertical - self.origin;
        CameraSample::new(Ray::new(self.origin, direction))
    }
}

/// Square in the z = 0 plane, facing +Z.
fn quad(half: f32) -> anyhow::Result<Arc<Shape>> {
    let mesh = Mesh::new(
        vec![
            Vec3::new(-half, -half, 0.0),
            Vec3::new(half, -half, 0.0),
            Vec3::new(half, half, 0.0),
            Vec3::new(-half, half, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
        None,
    );
    Ok(Arc::new(Shape::from(TriangleMesh::new(mesh)?)))
}

fn diffuse(color: Color) -> Arc<Bsdf> {
    Arc::new(Bsdf::from(Diffuse::constant(color)))
}

fn wall(
    shape: &Arc<Shape>,
    name: &str,
    rotation: Transform,
    position: Vec3,
    bsdf: &Arc<Bsdf>,
) -> Arc<Instance> {
    Arc::new(
        Instance::new(shape.clone())
            .with_name(name)
            .with_transform(rotation.then(&Transform::from_translation(position)))
            .with_bsdf(bsdf.clone()),
    )
}

fn build_scene() -> anyhow::Result<Scene> {
    let white = diffuse(Color::splat(0.73));
    let red = diffuse(Color::new(0.65, 0.05, 0.05));
    let green = diffuse(Color::new(0.12, 0.45, 0.15));
    let panel = quad(1.0)?;

    let mut builder = Scene::builder();
    builder
        .add_instance(wall(
            &panel,
            "floor",
            Transform::from_rotation(Vec3::X, -FRAC_PI_2),
            Vec3::ZERO,
            &white,
        ))
        .add_instance(wall(
            &panel,
            "ceiling",
            Transform::from_rotation(Vec3::X, FRAC_PI_2),
            Vec3::new(0.0, 2.0, 0.0),
            &white,
        ))
        .add_instance(wall(
            &panel,
            "back",
            Transform::default(),
            Vec3::new(0.0, 1.0, -1.0),
            &white,
        ))
        .add_instance(wall(
            &panel,
            "left",
            Transform::from_rotation(Vec3::Y, FRAC_PI_2),
            Vec3::new(-1.0, 1.0, 0.0),
            &red,
        ))
        .add_instance(wall(
            &panel,
            "right",
            Transform::from_rotation(Vec3::Y, -FRAC_PI_2),
            Vec3::new(1.0, 1.0, 0.0),
            &green,
        ));

    builder
        .add_instance(Arc::new(
            Instance::new(Arc::new(Shape::from(Sphere::new(Vec3::new(-0.4, 0.35, -0.2), 0.35))))
                .with_name("glass")
                .with_bsdf(Arc::new(Bsdf::from(Dielectric::new(1.5)))),
        ))
        .add_instance(Arc::new(
            Instance::new(Arc::new(Shape::from(Sphere::new(Vec3::new(0.45, 0.3, 0.3), 0.3))))
                .with_name("gold")
                .with_bsdf(Arc::new(Bsdf::from(RoughConductor::constant(
                    Color::new(1.0, 0.78, 0.34),
                    0.3,
                )))),
        ))
        .add_instance(Arc::new(
            Instance::new(Arc::new(Shape::from(Sphere::new(Vec3::new(0.2, 0.15, -0.55), 0.15))))
                .with_name("plastic")
                .with_bsdf(Arc::new(Bsdf::from(
                    Principled::new(Color::new(0.1, 0.2, 0.7)).with_roughness(0.2),
                ))),
        ));

    // hidden from camera rays so it is only reached by light sampling
    let lamp = Arc::new(
        Instance::new(quad(0.25)?)
            .with_name("lamp")
            .with_transform(
                Transform::from_rotation(Vec3::X, FRAC_PI_2)
                    .then(&Transform::from_translation(Vec3::new(0.0, 1.98, 0.0))),
            )
            .with_emission(Arc::new(Emission::constant(Color::splat(17.0))))
            .with_visible(false),
    );
    builder.add_emitter(lamp)?;

    Ok(builder.build()?)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "cornell_box.png".to_string());
    let samples_per_pixel = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid sample count {:?}", arg))?,
        None => 64,
    };

    let scene = Arc::new(build_scene()?);
    let camera = PinholeCamera::new(
        Vec3::new(0.0, 1.0, 3.8),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        40.0,
    );
    let integrator = PathTracer::new(
        scene,
        PathTracerConfig::default()
            .with_max_depth(8)
            .with_russian_roulette(3),
    )?;
    let config = RenderConfig::default().with_samples_per_pixel(samples_per_pixel);

    let image = render(&camera, &integrator, &config)?;
    image
        .save_png(&output)
        .with_context(|| format!("failed to write {}", output))?;
    log::info!("Wrote {}", output);
    Ok(())
}
