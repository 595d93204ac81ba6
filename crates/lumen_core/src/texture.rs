//! Texture lookup interface.
//!
//! The renderer only ever asks a texture for a color or a scalar at a UV
//! coordinate. Image decoding and filtering live with whoever implements
//! this trait.

use std::fmt::Debug;

use lumen_math::Vec2;

use crate::Color;

/// An opaque texture handle evaluated at surface UVs.
pub trait Texture: Send + Sync + Debug {
    /// Color at `uv`.
    fn evaluate(&self, uv: Vec2) -> Color;

    /// Scalar at `uv` (roughness, metallic, ...). Defaults to the first channel.
    fn scalar(&self, uv: Vec2) -> f32 {
        self.evaluate(uv).x
    }
}

/// A texture with the same value everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantTexture {
    pub value: Color,
}

impl ConstantTexture {
    pub fn new(value: Color) -> Self {
        Self { value }
    }

    pub fn scalar_value(value: f32) -> Self {
        Self {
            value: Color::splat(value),
        }
    }
}

impl Texture for ConstantTexture {
    fn evaluate(&self, _uv: Vec2) -> Color {
        self.value
    }
}

/// Two-color checker pattern in UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckerboardTexture {
    pub color0: Color,
    pub color1: Color,
    /// Number of checks per unit UV along u and v.
    pub scale: Vec2,
}

impl CheckerboardTexture {
    pub fn new(color0: Color, color1: Color, scale: Vec2) -> Self {
        Self {
            color0,
            color1,
            scale,
        }
    }
}

impl Texture for CheckerboardTexture {
    fn evaluate(&self, uv: Vec2) -> Color {
        let cell = (uv * self.scale).floor();
        let parity = (cell.x + cell.y) as i64;
        if parity.rem_euclid(2) == 0 {
            self.color0
        } else {
            self.color1
        }
    }
}
