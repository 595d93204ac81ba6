//! GGX microfacet distribution with visible-normal sampling.

use std::f32::consts::PI;

use lumen_math::{Vec2, Vec3};

use super::{finite, finite_sample, reflect_about, BsdfSample};
use crate::Color;

/// Map perceptual roughness to GGX alpha, floored to keep D finite.
#[inline]
pub fn alpha_from_roughness(roughness: f32) -> f32 {
    (roughness * roughness).max(1e-3)
}

/// GGX normal distribution for a unit half-vector in the local frame.
pub fn ggx_d(h: Vec3, alpha: f32) -> f32 {
    if h.z <= 0.0 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let denom = h.z * h.z * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

fn smith_lambda(w: Vec3, alpha: f32) -> f32 {
    let cos2 = w.z * w.z;
    if cos2 <= 0.0 {
        return f32::INFINITY;
    }
    let tan2 = (w.x * w.x + w.y * w.y) / cos2;
    0.5 * (-1.0 + (1.0 + alpha * alpha * tan2).sqrt())
}

/// Smith masking for direction `w` seen through microfacet `h`.
pub fn smith_g1(w: Vec3, h: Vec3, alpha: f32) -> f32 {
    if w.dot(h) * w.z <= 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + smith_lambda(w, alpha))
}

/// Sample a half-vector from the distribution of normals visible from `wo`
/// (Heitz 2018). `wo` must be in the upper hemisphere.
pub fn sample_vndf(wo: Vec3, alpha: f32, u: Vec2) -> Vec3 {
    // stretch into the hemisphere configuration
    let vh = Vec3::new(alpha * wo.x, alpha * wo.y, wo.z).normalize();

    let lensq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if lensq > 0.0 {
        Vec3::new(-vh.y, vh.x, 0.0) / lensq.sqrt()
    } else {
        Vec3::X
    };
    let t2 = vh.cross(t1);

    let r = u.x.sqrt();
    let phi = 2.0 * PI * u.y;
    let p1 = r * phi.cos();
    let s = 0.5 * (1.0 + vh.z);
    let p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * r * phi.sin();

    let nh = p1 * t1 + p2 * t2 + (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt() * vh;

    // unstretch
    Vec3::new(alpha * nh.x, alpha * nh.y, nh.z.max(0.0)).normalize()
}

/// Reflection lobe value `R D G1(wi) G1(wo) / (4 cos_o)`, cosine included.
pub fn evaluate_reflection(wo: Vec3, wi: Vec3, alpha: f32, reflectance: Color) -> Option<Color> {
    if wo.z <= 0.0 || wi.z <= 0.0 {
        return None;
    }
    let h = (wo + wi).try_normalize()?;
    let d = ggx_d(h, alpha);
    let g = smith_g1(wi, h, alpha) * smith_g1(wo, h, alpha);
    let value = reflectance * (d * g / (4.0 * wo.z));
    if value == Color::ZERO {
        return None;
    }
    finite(value)
}

/// VNDF-sampled reflection. D and the sampling density cancel, leaving
/// `R G1(wi)`.
pub fn sample_reflection(wo: Vec3, alpha: f32, reflectance: Color, u: Vec2) -> Option<BsdfSample> {
    if wo.z <= 0.0 {
        return None;
    }
    let h = sample_vndf(wo, alpha, u);
    let wi = reflect_about(wo, h);
    if wi.z <= 0.0 {
        return None;
    }
    finite_sample(wi, reflectance * smith_g1(wi, h, alpha))
}
