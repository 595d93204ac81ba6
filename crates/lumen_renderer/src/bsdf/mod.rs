//! Scattering models.
//!
//! All directions are in the local shading frame: the normal is +Z and
//! `wo` points from the surface back towards where the ray came from.
//! `evaluate` includes the cosine foreshortening term, and `sample` returns
//! a weight that is already `evaluate / pdf`. `None` from either means
//! the configuration carries no contribution.

mod conductor;
mod dielectric;
mod diffuse;
pub(crate) mod fresnel;
pub(crate) mod microfacet;
mod principled;
mod rough_conductor;

use std::fmt;

use lumen_math::{Vec2, Vec3};

use crate::sampler::Sampler;
use crate::Color;

pub use conductor::Conductor;
pub use dielectric::Dielectric;
pub use diffuse::Diffuse;
pub use principled::Principled;
pub use rough_conductor::RoughConductor;

/// A sampled incident direction with its `value / pdf` weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsdfSample {
    pub wi: Vec3,
    pub weight: Color,
}

/// Material properties for integrator decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BsdfProperties {
    /// True if the material is perfectly specular (mirror, glass)
    pub is_pure_specular: bool,
    /// True if the material can use Next Event Estimation
    pub can_use_nee: bool,
}

/// The closed set of scattering models.
#[derive(Debug)]
pub enum Bsdf {
    Diffuse(Diffuse),
    Conductor(Conductor),
    Dielectric(Dielectric),
    RoughConductor(RoughConductor),
    Principled(Principled),
}

impl Bsdf {
    /// Scattered radiance factor for light arriving from `wi` towards `wo`,
    /// cosine included.
    pub fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> Option<Color> {
        match self {
            Bsdf::Diffuse(b) => b.evaluate(uv, wo, wi),
            Bsdf::Conductor(_) | Bsdf::Dielectric(_) => None,
            Bsdf::RoughConductor(b) => b.evaluate(uv, wo, wi),
            Bsdf::Principled(b) => b.evaluate(uv, wo, wi),
        }
    }

    /// Importance sample an incident direction for `wo`.
    pub fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut dyn Sampler) -> Option<BsdfSample> {
        match self {
            Bsdf::Diffuse(b) => b.sample(uv, wo, sampler),
            Bsdf::Conductor(b) => b.sample(uv, wo),
            Bsdf::Dielectric(b) => b.sample(uv, wo, sampler),
            Bsdf::RoughConductor(b) => b.sample(uv, wo, sampler),
            Bsdf::Principled(b) => b.sample(uv, wo, sampler),
        }
    }

    pub fn properties(&self) -> BsdfProperties {
        match self {
            Bsdf::Conductor(_) | Bsdf::Dielectric(_) => BsdfProperties {
                is_pure_specular: true,
                can_use_nee: false,
            },
            Bsdf::Diffuse(_) | Bsdf::RoughConductor(_) | Bsdf::Principled(_) => BsdfProperties {
                is_pure_specular: false,
                can_use_nee: true,
            },
        }
    }

    /// Approximate directional albedo, used by diagnostic integrators.
    pub fn albedo(&self, uv: Vec2) -> Color {
        match self {
            Bsdf::Diffuse(b) => b.albedo(uv),
            Bsdf::Conductor(b) => b.albedo(uv),
            Bsdf::Dielectric(b) => b.albedo(uv),
            Bsdf::RoughConductor(b) => b.albedo(uv),
            Bsdf::Principled(b) => b.albedo(uv),
        }
    }
}

impl fmt::Display for Bsdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bsdf::Diffuse(_) => write!(f, "Diffuse"),
            Bsdf::Conductor(_) => write!(f, "Conductor"),
            Bsdf::Dielectric(_) => write!(f, "Dielectric"),
            Bsdf::RoughConductor(_) => write!(f, "RoughConductor"),
            Bsdf::Principled(_) => write!(f, "Principled"),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Bsdf {
                fn from(bsdf: $variant) -> Self {
                    Bsdf::$variant(bsdf)
                }
            }
        )*
    };
}

impl_from_variant!(Diffuse, Conductor, Dielectric, RoughConductor, Principled);

/// Mirror `wo` about the normal.
#[inline]
pub(crate) fn reflect(wo: Vec3) -> Vec3 {
    Vec3::new(-wo.x, -wo.y, wo.z)
}

/// Mirror `wo` about the unit vector `h`.
#[inline]
pub(crate) fn reflect_about(wo: Vec3, h: Vec3) -> Vec3 {
    2.0 * wo.dot(h) * h - wo
}

/// NaN/Inf values are failed evaluations.
#[inline]
pub(crate) fn finite(value: Color) -> Option<Color> {
    value.is_finite().then_some(value)
}

#[inline]
pub(crate) fn finite_sample(wi: Vec3, weight: Color) -> Option<BsdfSample> {
    (wi.is_finite() && weight.is_finite()).then_some(BsdfSample { wi, weight })
}
