//! Lumen renderer - CPU Monte Carlo path tracing core.
//!
//! Shapes and meshes sit behind a two-level BVH, instances place them in
//! the world, BSDFs and lights are closed enums, and integrators turn camera
//! rays into radiance. The render driver spreads buckets over rayon.

pub mod bsdf;
mod bucket;
mod bvh;
mod emission;
mod error;
mod instance;
pub mod integrator;
mod intersection;
pub mod light;
mod mesh;
mod renderer;
mod sampler;
mod scene;
mod shape;
mod sphere;

pub use bsdf::{Bsdf, BsdfProperties, BsdfSample};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhPrimitives};
pub use emission::Emission;
pub use error::{RenderError, RenderResult, SceneError, SceneResult};
pub use instance::Instance;
pub use integrator::Integrator;
pub use intersection::{AreaSample, Intersection, SurfaceEvent};
pub use light::{DirectLightSample, Light};
pub use mesh::TriangleMesh;
pub use renderer::{
    color_to_rgba, linear_to_gamma, render, render_pixel, Camera, CameraSample, ImageBuffer,
    RenderConfig,
};
pub use sampler::Sampler;
pub use scene::{LightSelection, Scene, SceneBuilder};
pub use shape::Shape;
pub use sphere::Sphere;

pub use lumen_core::{Color, Mesh, Texture};
/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Frame, Ray, Transform, Vec2, Vec3};
