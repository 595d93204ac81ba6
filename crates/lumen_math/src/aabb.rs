use crate::{Interval, Ray, Vec3};

/// Smallest extent given to a box axis, so flat geometry stays hittable.
const MIN_EXTENT: f32 = 1e-4;

/// Axis-aligned bounding box, one [`Interval`] per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Contains nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Reported by shapes with no finite extent.
    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };

    /// Box spanned by two opposite corners, in any order.
    ///
    /// Axes narrower than a small minimum are widened, so an axis-aligned
    /// triangle still gets a box with volume.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        let widen = |min: f32, max: f32| {
            let axis = Interval::new(min, max);
            if axis.size() < MIN_EXTENT {
                axis.expand(MIN_EXTENT)
            } else {
                axis
            }
        };
        Self {
            x: widen(lo.x, hi.x),
            y: widen(lo.y, hi.y),
            z: widen(lo.z, hi.z),
        }
    }

    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&a.x, &b.x),
            y: Interval::surrounding(&a.y, &b.y),
            z: Interval::surrounding(&a.z, &b.z),
        }
    }

    pub fn grow_point(&mut self, p: Vec3) {
        let point = Interval::new;
        self.x = Interval::surrounding(&self.x, &point(p.x, p.x));
        self.y = Interval::surrounding(&self.y, &point(p.y, p.y));
        self.z = Interval::surrounding(&self.z, &point(p.z, p.z));
    }

    /// Interval along axis 0, 1 or 2. Anything above 2 maps to Z.
    pub fn axis_interval(&self, axis: usize) -> Interval {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Slab test. Returns where the ray enters the box within `range`,
    /// clamped to `range.min` for origins inside the box.
    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<f32> {
        let mut near = range.min;
        let mut far = range.max;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv = 1.0 / ray.direction[axis];
            let t0 = (slab.min - ray.origin[axis]) * inv;
            let t1 = (slab.max - ray.origin[axis]) * inv;
            let (entry, exit) = if inv < 0.0 { (t1, t0) } else { (t0, t1) };
            near = near.max(entry);
            far = far.min(exit);
            if far < near {
                return None;
            }
        }

        Some(near)
    }

    /// Index of the widest axis, preferring Z, then Y, on ties.
    pub fn longest_axis(&self) -> usize {
        let extent = self.max() - self.min();
        if extent.x > extent.y && extent.x > extent.z {
            0
        } else if extent.y > extent.z {
            1
        } else {
            2
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Surface area for the SAH cost. Zero for empty boxes.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max() - self.min();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    pub fn is_unbounded(&self) -> bool {
        self.x.is_unbounded() || self.y.is_unbounded() || self.z.is_unbounded()
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        let inside =
            |outer: Interval, inner: Interval| outer.min <= inner.min && inner.max <= outer.max;
        inside(self.x, other.x) && inside(self.y, other.y) && inside(self.z, other.z)
    }
}
