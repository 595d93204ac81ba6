use std::fmt;
use std::sync::Arc;

use lumen_core::{ConstantTexture, Texture};
use lumen_math::{Vec2, Vec3};

use crate::Color;

/// Surface emission.
///
/// Evaluated with the outgoing direction in the local frame of the emitting
/// surface. One-sided emitters only radiate towards +Z.
#[derive(Debug, Clone)]
pub struct Emission {
    radiance: Arc<dyn Texture>,
    two_sided: bool,
}

impl Emission {
    pub fn new(radiance: Arc<dyn Texture>) -> Self {
        Self {
            radiance,
            two_sided: false,
        }
    }

    /// Constant radiance over the whole surface.
    pub fn constant(radiance: Color) -> Self {
        Self::new(Arc::new(ConstantTexture::new(radiance)))
    }

    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    pub fn is_two_sided(&self) -> bool {
        self.two_sided
    }

    pub fn evaluate(&self, uv: Vec2, wo_local: Vec3) -> Color {
        if !self.two_sided && wo_local.z <= 0.0 {
            return Color::ZERO;
        }
        self.radiance.evaluate(uv)
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Emission[{}, radiance={:?}]",
            if self.two_sided { "two-sided" } else { "one-sided" },
            self.radiance
        )
    }
}
