use crate::Vec3;

/// Orthonormal shading frame. Local coordinates put the normal on +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Build a frame around a unit normal.
    ///
    /// Branchless basis from Duff et al. 2017, "Building an Orthonormal
    /// Basis, Revisited". `tangent x bitangent == normal`.
    pub fn from_normal(normal: Vec3) -> Self {
        let n = normal;
        let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        let tangent = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let bitangent = Vec3::new(b, sign + n.y * n.y * a, -n.y);

        Self {
            tangent,
            bitangent,
            normal: n,
        }
    }

    /// Build a frame around `normal` whose tangent follows `tangent_hint`
    /// as closely as possible.
    pub fn from_normal_and_tangent(normal: Vec3, tangent_hint: Vec3) -> Self {
        let tangent = tangent_hint - normal * normal.dot(tangent_hint);
        let len = tangent.length();
        if !(len > 1e-6) {
            return Self::from_normal(normal);
        }
        let tangent = tangent / len;
        Self {
            tangent,
            bitangent: normal.cross(tangent),
            normal,
        }
    }

    /// World direction to local coordinates.
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.tangent), v.dot(self.bitangent), v.dot(self.normal))
    }

    /// Local direction to world coordinates.
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.tangent * v.x + self.bitangent * v.y + self.normal * v.z
    }

    /// Unit length and mutually orthogonal within `eps`.
    pub fn is_orthonormal(&self, eps: f32) -> bool {
        (self.tangent.length() - 1.0).abs() < eps
            && (self.bitangent.length() - 1.0).abs() < eps
            && (self.normal.length() - 1.0).abs() < eps
            && self.tangent.dot(self.bitangent).abs() < eps
            && self.tangent.dot(self.normal).abs() < eps
            && self.bitangent.dot(self.normal).abs() < eps
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            tangent: Vec3::X,
            bitangent: Vec3::Y,
            normal: Vec3::Z,
        }
    }
}
