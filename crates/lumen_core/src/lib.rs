//! Lumen core - renderer-agnostic scene data.
//!
//! Holds the triangle soup handed over by mesh loaders and the opaque
//! texture interface materials and emitters read from.

pub mod mesh;
pub mod texture;

pub use mesh::{Mesh, MeshError, MeshResult};
pub use texture::{CheckerboardTexture, ConstantTexture, Texture};

/// Linear RGB color.
pub type Color = lumen_math::Vec3;
