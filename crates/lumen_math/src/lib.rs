//! Lumen math - vector types, rays, bounds and sampling warps.
//!
//! Re-exports glam so downstream crates share one set of vector types.

pub use glam::*;

mod aabb;
mod frame;
mod interval;
mod ray;
pub mod sampling;
mod transform;

pub use aabb::Aabb;
pub use frame::Frame;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{Mat4Ext, Transform};

/// Offset used to reject self-intersections right at a ray origin.
pub const EPSILON: f32 = 1e-4;
