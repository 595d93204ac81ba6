//! Render driver.
//!
//! Feeds camera rays through an [`Integrator`] bucket by bucket and
//! collects the averaged results into an [`ImageBuffer`].

use std::path::Path;
use std::time::Instant;

use lumen_math::Ray;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bucket::{generate_buckets, render_bucket, DEFAULT_BUCKET_SIZE};
use crate::error::{RenderResult, SceneError, SceneResult};
use crate::integrator::Integrator;
use crate::sampler::Sampler;
use crate::Color;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel
    pub samples_per_pixel: u32,
    /// Edge length of a square bucket in pixels
    pub bucket_size: u32,
    /// Base seed of the per-bucket random streams
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn with_samples_per_pixel(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(SceneError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.bucket_size == 0 {
            return Err(SceneError::InvalidConfig(
                "bucket_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A primary ray and the sensor weight it carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSample {
    pub ray: Ray,
    pub weight: Color,
}

impl CameraSample {
    /// A ray with unit weight.
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            weight: Color::ONE,
        }
    }
}

/// Primary ray generation, provided by the caller.
pub trait Camera: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Sample a ray through pixel `(x, y)`, row 0 at the top.
    fn sample_ray(&self, x: u32, y: u32, sampler: &mut dyn Sampler) -> CameraSample;
}

/// Average `samples` radiance estimates through pixel `(x, y)`.
pub fn render_pixel(
    camera: &dyn Camera,
    integrator: &dyn Integrator,
    x: u32,
    y: u32,
    samples: u32,
    sampler: &mut dyn Sampler,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let sample = camera.sample_ray(x, y, sampler);
        let color = sample.weight * integrator.li(&sample.ray, sampler);
        if color.is_finite() {
            pixel_color += color;
        }
    }

    pixel_color / samples.max(1) as f32
}

/// Render the full image in parallel buckets.
pub fn render(
    camera: &dyn Camera,
    integrator: &dyn Integrator,
    config: &RenderConfig,
) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let width = camera.width();
    let height = camera.height();
    let buckets = generate_buckets(width, height, config.bucket_size);

    log::info!(
        "Rendering {}x{} at {} spp in {} buckets with {}",
        width,
        height,
        config.samples_per_pixel,
        buckets.len(),
        integrator
    );
    let start = Instant::now();

    let results: Vec<_> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, integrator, config))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in results {
        let bucket = result.bucket;
        for (i, color) in result.pixels.into_iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            image.set_pixel(bucket.x + local_x, bucket.y + local_y, color);
        }
    }

    log::info!("Render finished in {:.2}s", start.elapsed().as_secs_f64());
    Ok(image)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)).round() as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Linear color image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new black image buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Set a pixel color. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) as usize;
            self.pixels[idx] = color;
        }
    }

    /// Get a pixel color.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Mean of all pixels.
    pub fn average(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }

    /// Gamma-corrected 8-bit RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgba(c)).collect()
    }

    /// Write the image as an 8-bit PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        image::save_buffer(
            path,
            &self.to_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ONE), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::splat(4.0)), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(0.25, 0.0, 1.0)), [128, 0, 255, 255]);
    }

    #[test]
    fn test_image_buffer() {
        let mut image = ImageBuffer::new(4, 2);
        image.set_pixel(3, 1, Color::ONE);
        image.set_pixel(9, 9, Color::ONE);
        assert_eq!(image.get_pixel(3, 1), Some(Color::ONE));
        assert_eq!(image.get_pixel(4, 0), None);
        assert!((image.average().x - 1.0 / 8.0).abs() < 1e-6);
        assert_eq!(image.to_rgba().len(), 4 * 2 * 4);
    }

    #[test]
    fn test_render_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());
        assert!(RenderConfig::default()
            .with_samples_per_pixel(0)
            .validate()
            .is_err());
        assert!(RenderConfig::default().with_bucket_size(0).validate().is_err());
    }
}
