//! Uniform random draws consumed by the estimator.

use lumen_math::Vec2;
use rand::RngCore;

/// Source of uniform samples in `[0, 1)`.
///
/// Any `rand` generator is a sampler, so cameras and drivers can hand in a
/// per-thread `StdRng` directly.
pub trait Sampler {
    /// One uniform draw in `[0, 1)`.
    fn next(&mut self) -> f32;

    /// Two independent uniform draws.
    fn next_2d(&mut self) -> Vec2 {
        let x = self.next();
        let y = self.next();
        Vec2::new(x, y)
    }
}

impl<R: RngCore + ?Sized> Sampler for R {
    #[inline]
    fn next(&mut self) -> f32 {
        // 24 random mantissa bits keep the result strictly below 1
        (self.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }
}
