// Transform utilities for Mat4
//
// Extends glam::Mat4 with bounding-box transformation and wraps a matrix
// together with its inverse for world <-> local conversions.

use glam::{Mat4, Quat, Vec3};

use crate::{Aabb, Ray};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        if aabb.is_unbounded() {
            return Aabb::UNIVERSE;
        }

        let min_point = aabb.min();
        let max_point = aabb.max();

        let mut result = Aabb::EMPTY;
        for corner in 0..8 {
            let p = Vec3::new(
                if corner & 1 == 0 { min_point.x } else { max_point.x },
                if corner & 2 == 0 { min_point.y } else { max_point.y },
                if corner & 4 == 0 { min_point.z } else { max_point.z },
            );
            result.grow_point(self.transform_point3(p));
        }

        Aabb::from_points(result.min(), result.max())
    }
}

/// An affine local-to-world transform with its cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
}

impl Transform {
    /// Wrap a local-to-world matrix. The matrix must be invertible.
    pub fn new(matrix: Mat4) -> Self {
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Mat4::from_translation(translation))
    }

    pub fn from_scale(scale: Vec3) -> Self {
        Self::new(Mat4::from_scale(scale))
    }

    pub fn from_rotation(axis: Vec3, angle: f32) -> Self {
        Self::new(Mat4::from_quat(Quat::from_axis_angle(axis.normalize(), angle)))
    }

    /// Apply `self` first, then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
            inverse: self.inverse * other.inverse,
        }
    }

    /// The world-to-local transform.
    pub fn inverted(&self) -> Transform {
        Transform {
            matrix: self.inverse,
            inverse: self.matrix,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Local point to world.
    #[inline]
    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    /// Local direction to world. The result is not normalized.
    #[inline]
    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        self.matrix.transform_vector3(v)
    }

    /// World point to local.
    #[inline]
    pub fn inverse_point(&self, p: Vec3) -> Vec3 {
        self.inverse.transform_point3(p)
    }

    /// World direction to local. The result is not normalized.
    #[inline]
    pub fn inverse_vector(&self, v: Vec3) -> Vec3 {
        self.inverse.transform_vector3(v)
    }

    /// World ray to local space, keeping the scaled direction.
    ///
    /// The direction length of the result is the world-to-local distance
    /// scale factor; callers normalize it themselves.
    pub fn inverse_ray(&self, ray: &Ray) -> Ray {
        Ray::new_unnormalized(
            self.inverse_point(ray.origin),
            self.inverse_vector(ray.direction),
            ray.depth,
        )
    }

    /// Local ray to world space, keeping the scaled direction.
    pub fn apply_ray(&self, ray: &Ray) -> Ray {
        Ray::new_unnormalized(
            self.apply_point(ray.origin),
            self.apply_vector(ray.direction),
            ray.depth,
        )
    }

    /// World-space bounds of a local box.
    pub fn apply_aabb(&self, aabb: &Aabb) -> Aabb {
        self.matrix.transform_aabb(aabb)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
