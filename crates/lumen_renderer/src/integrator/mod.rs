//! Radiance estimators.
//!
//! An integrator turns a camera ray into one radiance sample. The render
//! driver averages many of them per pixel.

mod albedo;
mod direct;
mod normals;
mod path;

use std::fmt;

use lumen_math::Ray;

use crate::sampler::Sampler;
use crate::Color;

pub use albedo::AlbedoIntegrator;
pub use direct::DirectIntegrator;
pub use normals::NormalsIntegrator;
pub use path::{PathTracer, PathTracerConfig};

/// One radiance sample along `ray`.
///
/// Implementations never fail: invalid samples contribute zero and
/// non-finite values are discarded.
pub trait Integrator: Send + Sync + fmt::Display {
    fn li(&self, ray: &Ray, sampler: &mut dyn Sampler) -> Color;
}

/// Replace NaN/Inf radiance with zero.
#[inline]
pub(crate) fn sanitize(radiance: Color) -> Color {
    if radiance.is_finite() {
        radiance
    } else {
        Color::ZERO
    }
}
