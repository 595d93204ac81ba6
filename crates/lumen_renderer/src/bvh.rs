//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! One implementation serves both levels of the scene: the triangles of a
//! mesh and the instances of a scene. Construction uses a binned surface
//! area heuristic and falls back to a median split when the heuristic
//! cannot separate the primitives.

use std::time::Instant;

use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::intersection::Intersection;

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Leaves up to this size are kept when splitting would not pay off.
const SAH_MAX_LEAF_SIZE: usize = 16;

/// Number of centroid bins evaluated per split.
const SAH_BINS: usize = 12;

/// Cost of one node traversal relative to one primitive test.
const TRAVERSAL_COST: f32 = 0.125;

/// A collection of primitives a [`Bvh`] can be built over.
pub trait BvhPrimitives {
    fn primitive_count(&self) -> usize;

    fn primitive_bounds(&self, index: usize) -> Aabb;

    fn primitive_centroid(&self, index: usize) -> Vec3 {
        self.primitive_bounds(index).centroid()
    }

    /// Intersect one primitive, narrowing `its.t` only on a strictly
    /// closer hit.
    fn intersect_primitive<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection<'a>,
    ) -> bool;
}

/// BVH node - either a branch with two children or a leaf with a range of
/// primitive indices.
#[derive(Debug)]
enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    Leaf {
        first: usize,
        count: usize,
        bbox: Aabb,
    },
    Empty,
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn count_nodes(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.count_nodes() + right.count_nodes(),
        }
    }

    fn max_depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.max_depth().max(right.max_depth()),
        }
    }
}

/// Bounding volume hierarchy over the primitives of a [`BvhPrimitives`]
/// collection. The collection itself is passed back in at query time.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    /// Primitive indices referenced by leaf ranges.
    indices: Vec<usize>,
    /// Primitives with infinite bounds, tested on every query.
    unbounded: Vec<usize>,
}

#[derive(Clone, Copy)]
struct Bin {
    bbox: Aabb,
    count: usize,
}

impl Default for Bin {
    fn default() -> Self {
        Self {
            bbox: Aabb::EMPTY,
            count: 0,
        }
    }
}

struct BuildInput {
    bounds: Vec<Aabb>,
    centroids: Vec<Vec3>,
}

impl Bvh {
    /// A hierarchy with nothing in it.
    pub fn empty() -> Self {
        Self {
            root: BvhNode::Empty,
            indices: Vec::new(),
            unbounded: Vec::new(),
        }
    }

    /// Build a hierarchy over all primitives of `primitives`.
    ///
    /// Primitives with unbounded boxes are kept aside and tested linearly.
    /// Primitives with empty boxes can never be hit and are dropped.
    pub fn build<P: BvhPrimitives + ?Sized>(primitives: &P) -> Self {
        let start = Instant::now();
        let count = primitives.primitive_count();

        let mut input = BuildInput {
            bounds: Vec::with_capacity(count),
            centroids: Vec::with_capacity(count),
        };
        let mut indices = Vec::with_capacity(count);
        let mut unbounded = Vec::new();
        let mut skipped = 0;

        for i in 0..count {
            let bounds = primitives.primitive_bounds(i);
            let centroid = if bounds.is_unbounded() {
                unbounded.push(i);
                Vec3::ZERO
            } else if bounds.is_empty() {
                skipped += 1;
                Vec3::ZERO
            } else {
                indices.push(i);
                primitives.primitive_centroid(i)
            };
            input.bounds.push(bounds);
            input.centroids.push(centroid);
        }

        let root = if indices.is_empty() {
            BvhNode::Empty
        } else {
            build_node(&input, &mut indices, 0)
        };

        let bvh = Self {
            root,
            indices,
            unbounded,
        };

        log::debug!(
            "Built BVH over {} primitives ({} unbounded, {} empty): {} nodes, depth {}, {:.2}ms",
            count,
            bvh.unbounded.len(),
            skipped,
            bvh.node_count(),
            bvh.depth(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        bvh
    }

    /// Bounds of everything in the hierarchy. Unbounded if any primitive is.
    pub fn bounding_box(&self) -> Aabb {
        if self.unbounded.is_empty() {
            self.root.bbox()
        } else {
            Aabb::UNIVERSE
        }
    }

    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Find the closest hit closer than `its.t`.
    ///
    /// `primitives` must be the collection the hierarchy was built over.
    pub fn intersect<'a, P: BvhPrimitives + ?Sized>(
        &self,
        primitives: &'a P,
        ray: &Ray,
        its: &mut Intersection<'a>,
    ) -> bool {
        let mut hit = false;
        for &index in &self.unbounded {
            hit |= primitives.intersect_primitive(index, ray, its);
        }

        if self
            .root
            .bbox()
            .intersect(ray, Interval::new(0.0, its.t))
            .is_some()
        {
            hit |= self.intersect_node(&self.root, primitives, ray, its);
        }
        hit
    }

    fn intersect_node<'a, P: BvhPrimitives + ?Sized>(
        &self,
        node: &BvhNode,
        primitives: &'a P,
        ray: &Ray,
        its: &mut Intersection<'a>,
    ) -> bool {
        match node {
            BvhNode::Empty => false,

            BvhNode::Leaf { first, count, .. } => {
                let mut hit = false;
                for &index in &self.indices[*first..*first + *count] {
                    hit |= primitives.intersect_primitive(index, ray, its);
                }
                hit
            }

            BvhNode::Branch { left, right, .. } => {
                let t_left = left.bbox().intersect(ray, Interval::new(0.0, its.t));
                let t_right = right.bbox().intersect(ray, Interval::new(0.0, its.t));

                match (t_left, t_right) {
                    (None, None) => false,
                    (Some(_), None) => self.intersect_node(left, primitives, ray, its),
                    (None, Some(_)) => self.intersect_node(right, primitives, ray, its),
                    (Some(tl), Some(tr)) => {
                        let (near, far, far_entry) = if tl <= tr {
                            (left, right, tr)
                        } else {
                            (right, left, tl)
                        };

                        let mut hit = self.intersect_node(near, primitives, ray, its);
                        // the near child may already have found something closer
                        if far_entry < its.t {
                            hit |= self.intersect_node(far, primitives, ray, its);
                        }
                        hit
                    }
                }
            }
        }
    }
}

/// Recursive construction over `indices`, which start at `first` in the
/// final index array.
fn build_node(input: &BuildInput, indices: &mut [usize], first: usize) -> BvhNode {
    let n = indices.len();
    let bbox = indices.iter().fold(Aabb::EMPTY, |acc, &i| {
        Aabb::surrounding(&acc, &input.bounds[i])
    });

    if n <= LEAF_MAX_SIZE {
        return BvhNode::Leaf {
            first,
            count: n,
            bbox,
        };
    }

    let centroid_bounds = indices.iter().fold(Aabb::EMPTY, |mut acc, &i| {
        acc.grow_point(input.centroids[i]);
        acc
    });
    let axis = centroid_bounds.longest_axis();
    let axis_range = centroid_bounds.axis_interval(axis);

    let mid = if axis_range.size() > 0.0 {
        match sah_partition(input, indices, &bbox, axis, axis_range) {
            SahOutcome::Split(mid) => mid,
            SahOutcome::Leaf => {
                return BvhNode::Leaf {
                    first,
                    count: n,
                    bbox,
                }
            }
            SahOutcome::Degenerate => median_partition(input, indices, axis),
        }
    } else {
        // all centroids coincide, any partition is as good as another
        median_partition(input, indices, axis)
    };

    let (left_indices, right_indices) = indices.split_at_mut(mid);
    let left = build_node(input, left_indices, first);
    let right = build_node(input, right_indices, first + mid);

    BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bbox,
    }
}

enum SahOutcome {
    Split(usize),
    Leaf,
    Degenerate,
}

fn sah_partition(
    input: &BuildInput,
    indices: &mut [usize],
    bbox: &Aabb,
    axis: usize,
    axis_range: Interval,
) -> SahOutcome {
    let n = indices.len();
    let scale = SAH_BINS as f32 / axis_range.size();
    let bin_of = |centroid: Vec3| -> usize {
        (((centroid[axis] - axis_range.min) * scale) as usize).min(SAH_BINS - 1)
    };

    let mut bins = [Bin::default(); SAH_BINS];
    for &i in indices.iter() {
        let bin = &mut bins[bin_of(input.centroids[i])];
        bin.count += 1;
        bin.bbox = Aabb::surrounding(&bin.bbox, &input.bounds[i]);
    }

    // right-to-left sweep: suffix areas and counts
    let mut right_area = [0.0f32; SAH_BINS];
    let mut right_count = [0usize; SAH_BINS];
    let mut acc = Bin::default();
    for b in (1..SAH_BINS).rev() {
        acc.bbox = Aabb::surrounding(&acc.bbox, &bins[b].bbox);
        acc.count += bins[b].count;
        right_area[b] = acc.bbox.surface_area();
        right_count[b] = acc.count;
    }

    let parent_area = bbox.surface_area().max(f32::MIN_POSITIVE);
    let mut best: Option<(usize, f32)> = None;
    let mut acc = Bin::default();
    for split in 0..SAH_BINS - 1 {
        acc.bbox = Aabb::surrounding(&acc.bbox, &bins[split].bbox);
        acc.count += bins[split].count;
        if acc.count == 0 || right_count[split + 1] == 0 {
            continue;
        }
        let cost = TRAVERSAL_COST
            + (acc.bbox.surface_area() * acc.count as f32
                + right_area[split + 1] * right_count[split + 1] as f32)
                / parent_area;
        if best.map_or(true, |(_, c)| cost < c) {
            best = Some((split, cost));
        }
    }

    let Some((split, cost)) = best else {
        return SahOutcome::Degenerate;
    };
    if cost >= n as f32 && n <= SAH_MAX_LEAF_SIZE {
        return SahOutcome::Leaf;
    }

    let mut mid = 0;
    for i in 0..n {
        if bin_of(input.centroids[indices[i]]) <= split {
            indices.swap(i, mid);
            mid += 1;
        }
    }

    if mid == 0 || mid == n {
        SahOutcome::Degenerate
    } else {
        SahOutcome::Split(mid)
    }
}

fn median_partition(input: &BuildInput, indices: &mut [usize], axis: usize) -> usize {
    let mid = indices.len() / 2;
    indices.select_nth_unstable_by(mid, |&a, &b| {
        input.centroids[a][axis].total_cmp(&input.centroids[b][axis])
    });
    mid
}
