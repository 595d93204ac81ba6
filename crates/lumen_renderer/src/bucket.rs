//! Image tiles rendered independently on the worker pool.
//!
//! A bucket owns its pixels and its random stream, so workers never share
//! mutable state and the image only depends on the render seed.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::integrator::Integrator;
use crate::renderer::{render_pixel, Camera, RenderConfig};
use crate::Color;

/// Default bucket edge in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Rectangle of pixels with its position in the render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Top-left pixel column.
    pub x: u32,
    /// Top-left pixel row.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub index: usize,
}

impl Bucket {
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Squared distance from the bucket center to `(cx, cy)`.
    fn distance2_to(&self, cx: f32, cy: f32) -> f32 {
        let dx = self.x as f32 + self.width as f32 * 0.5 - cx;
        let dy = self.y as f32 + self.height as f32 * 0.5 - cy;
        dx * dx + dy * dy
    }
}

/// Tile a `width` x `height` image, edge buckets clipped to the frame.
///
/// Buckets are ordered outwards from the image center so the middle of
/// the frame finishes first; ties keep row-major order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width).step_by(size as usize).map(move |x| Bucket {
                x,
                y,
                width: size.min(width - x),
                height: size.min(height - y),
                index: 0,
            })
        })
        .collect();

    let (cx, cy) = (width as f32 * 0.5, height as f32 * 0.5);
    buckets.sort_by(|a, b| a.distance2_to(cx, cy).total_cmp(&b.distance2_to(cx, cy)));

    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }
    buckets
}

/// Seed of a bucket's random stream, from the render seed and the
/// bucket's position in the render order only.
fn bucket_seed(seed: u64, bucket: &Bucket) -> u64 {
    seed ^ (bucket.index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Pixels of one bucket, row-major within the bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

pub fn render_bucket(
    bucket: &Bucket,
    camera: &dyn Camera,
    integrator: &dyn Integrator,
    config: &RenderConfig,
) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, bucket));

    let pixels: Vec<Color> = (bucket.y..bucket.y + bucket.height)
        .flat_map(|y| (bucket.x..bucket.x + bucket.width).map(move |x| (x, y)))
        .map(|(x, y)| render_pixel(camera, integrator, x, y, config.samples_per_pixel, &mut rng))
        .collect();

    log::debug!(
        "Bucket {} ({}x{} at {},{}) done",
        bucket.index,
        bucket.width,
        bucket.height,
        bucket.x,
        bucket.y
    );

    BucketResult {
        bucket: *bucket,
        pixels,
    }
}
