//! Warps from the unit square to common sampling domains, and a discrete
//! distribution for picking items by weight.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::{Vec2, Vec3};

pub const INV_PI: f32 = 1.0 / PI;
pub const INV_4PI: f32 = 1.0 / (4.0 * PI);

/// Shirley-Chiu concentric mapping from [0,1)^2 to the unit disk.
pub fn square_to_concentric_disk(u: Vec2) -> Vec2 {
    // map sample from [0, 1] to [-1, 1]
    let offset = 2.0 * u - Vec2::ONE;
    if offset == Vec2::ZERO {
        return Vec2::ZERO;
    }

    let (r, theta) = if offset.x.abs() > offset.y.abs() {
        (offset.x, FRAC_PI_4 * (offset.y / offset.x))
    } else {
        (offset.y, FRAC_PI_2 - FRAC_PI_4 * (offset.x / offset.y))
    };

    r * Vec2::new(theta.cos(), theta.sin())
}

/// Cosine-weighted direction on the +Z hemisphere. pdf = cos(theta) / pi.
pub fn square_to_cosine_hemisphere(u: Vec2) -> Vec3 {
    let d = square_to_concentric_disk(u);
    let z = (1.0 - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vec3::new(d.x, d.y, z)
}

pub fn cosine_hemisphere_pdf(w: Vec3) -> f32 {
    w.z.max(0.0) * INV_PI
}

/// Uniform direction on the unit sphere. pdf = 1 / (4 pi).
pub fn square_to_uniform_sphere(u: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform direction on the +Z hemisphere. pdf = 1 / (2 pi).
pub fn square_to_uniform_hemisphere(u: Vec2) -> Vec3 {
    let z = u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform barycentric coordinates (b1, b2) over a triangle.
pub fn square_to_uniform_triangle(u: Vec2) -> Vec2 {
    let su0 = u.x.sqrt();
    Vec2::new(1.0 - su0, u.y * su0)
}

/// Piecewise-constant discrete distribution over item weights.
#[derive(Debug, Clone)]
pub struct Distribution1D {
    cdf: Vec<f32>,
    total: f32,
}

impl Distribution1D {
    /// Build from non-negative weights. Returns `None` when the weights
    /// carry no positive mass.
    pub fn new(weights: &[f32]) -> Option<Self> {
        let mut cdf = Vec::with_capacity(weights.len());
        let mut total = 0.0f32;
        for &w in weights {
            total += if w.is_finite() { w.max(0.0) } else { 0.0 };
            cdf.push(total);
        }
        if total <= 0.0 {
            return None;
        }
        for c in &mut cdf {
            *c /= total;
        }
        Some(Self { cdf, total })
    }

    pub fn len(&self) -> usize {
        self.cdf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdf.is_empty()
    }

    /// Sum of the original weights.
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Probability of picking item `index`.
    pub fn pmf(&self, index: usize) -> f32 {
        let prev = if index == 0 { 0.0 } else { self.cdf[index - 1] };
        self.cdf[index] - prev
    }

    /// Pick an item for a uniform `u` in [0,1). Returns (index, pmf).
    pub fn sample(&self, u: f32) -> (usize, f32) {
        let index = self
            .cdf
            .partition_point(|&c| c <= u)
            .min(self.cdf.len() - 1);
        (index, self.pmf(index))
    }
}
