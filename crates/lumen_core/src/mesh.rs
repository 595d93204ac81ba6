//! Triangle soup geometry.
//!
//! A `Mesh` is what a loader produces: flat attribute arrays plus an index
//! buffer. The renderer validates it once and builds its own acceleration
//! structure on top.

use lumen_math::{Aabb, Vec2, Vec3};
use thiserror::Error;

/// Errors reported when a mesh fails validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no triangles")]
    Empty,

    #[error("Index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("Index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Attribute '{attribute}' has {actual} entries, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        actual: usize,
        expected: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Indexed triangle list with optional per-vertex shading attributes.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Smooth shading normals; flat shading is used without them.
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    /// Three entries per triangle.
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl Mesh {
    /// Wrap loader output. Nothing is checked until [`Mesh::validate`].
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = bounds_of(&positions);
        Self {
            positions,
            normals,
            uvs: None,
            indices,
            bounds,
        }
    }

    /// Attach texture coordinates.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Compute smooth vertex normals by averaging area-weighted face normals.
    ///
    /// Replaces any existing normals. Faces with out-of-range indices are
    /// skipped; vertices touched only by degenerate faces get +Z.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.indices.chunks_exact(3) {
            let i0 = face[0] as usize;
            let i1 = face[1] as usize;
            let i2 = face[2] as usize;
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Z);
        }

        log::debug!(
            "Computed smooth normals for {} vertices, {} triangles",
            vertex_count,
            self.triangle_count()
        );
        self.normals = Some(normals);
    }

    /// Check that indices and attribute arrays are consistent.
    pub fn validate(&self) -> MeshResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(self.indices.len()));
        }
        if self.indices.is_empty() {
            return Err(MeshError::Empty);
        }

        let vertex_count = self.positions.len();
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &i)| i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            });
        }

        if let Some(normals) = &self.normals {
            check_length("normals", normals.len(), vertex_count)?;
        }
        if let Some(uvs) = &self.uvs {
            check_length("uvs", uvs.len(), vertex_count)?;
        }

        Ok(())
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        let base = 3 * i;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }
}

fn bounds_of(positions: &[Vec3]) -> Aabb {
    if positions.is_empty() {
        return Aabb::EMPTY;
    }
    let (min, max) = positions.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), &p| (min.min(p), max.max(p)),
    );
    Aabb::from_points(min, max)
}

fn check_length(attribute: &'static str, actual: usize, expected: usize) -> MeshResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(MeshError::AttributeLength {
            attribute,
            actual,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn quad() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            None,
        )
    }

    #[test]
    fn test_mesh_counts_and_bounds() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle(1), [0, 2, 3]);
        assert!((mesh.bounds.max().x - 1.0).abs() < 1e-6);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_compute_normals_faces_plus_z() {
        init_logging();
        let mut mesh = quad();
        assert!(!mesh.has_normals());
        mesh.compute_normals();
        let normals = mesh.normals.as_ref().expect("normals computed");
        for n in normals {
            assert!((*n - Vec3::Z).length() < 1e-5, "unexpected normal {:?}", n);
        }
    }

    #[test]
    fn test_validate_reports_bad_index() {
        init_logging();
        let mut mesh = quad();
        mesh.indices[4] = 9;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                position: 4,
                index: 9,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_validate_reports_ragged_and_empty() {
        let mut mesh = quad();
        mesh.indices.pop();
        assert_eq!(mesh.validate(), Err(MeshError::RaggedIndices(5)));

        mesh.indices.clear();
        assert_eq!(mesh.validate(), Err(MeshError::Empty));
    }

    #[test]
    fn test_validate_reports_attribute_mismatch() {
        let mesh = quad().with_uvs(vec![Vec2::ZERO; 3]);
        assert!(mesh.has_uvs());
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::AttributeLength { attribute: "uvs", actual: 3, expected: 4 })
        ));
    }
}
