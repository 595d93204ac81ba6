use crate::Vec3;

/// A ray in 3D space with origin, unit direction, and path depth.
///
/// `depth` counts scattering events along a path; camera rays start at 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub depth: u32,
}

impl Ray {
    /// Create a new ray at depth 0. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            depth: 0,
        }
    }

    /// Create a ray without touching the direction.
    ///
    /// Used when the caller needs to keep a scaled direction around, e.g.
    /// while moving a ray into an instance's local space.
    #[inline]
    pub fn new_unnormalized(origin: Vec3, direction: Vec3, depth: u32) -> Self {
        Self {
            origin,
            direction,
            depth,
        }
    }

    /// Same ray with a different path depth.
    #[inline]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 4.0, 0.0));

        assert_eq!(ray.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(ray.direction, Vec3::Y);
        assert_eq!(ray.depth, 0);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_with_depth() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y).with_depth(3);
        assert_eq!(ray.depth, 3);
        assert_eq!(ray.direction, Vec3::Y);
    }
}
