/// Schlick weight `(1 - cos)^5`.
#[inline]
pub fn schlick_weight(cos_theta: f32) -> f32 {
    let m = (1.0 - cos_theta).clamp(0.0, 1.0);
    let m2 = m * m;
    m2 * m2 * m
}

/// Schlick approximation of Fresnel reflectance.
#[inline]
pub fn schlick(f0: f32, cos_theta: f32) -> f32 {
    f0 + (1.0 - f0) * schlick_weight(cos_theta)
}

/// Unpolarized Fresnel reflectance at a dielectric interface.
///
/// `cos_i` is the unsigned incident cosine and `eta` the ratio `n_i / n_t`.
/// Returns the reflectance and the unsigned transmitted cosine, or `None`
/// on total internal reflection.
pub fn dielectric(cos_i: f32, eta: f32) -> Option<(f32, f32)> {
    let cos_i = cos_i.clamp(0.0, 1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();

    let r_s = (eta * cos_i - cos_t) / (eta * cos_i + cos_t);
    let r_p = (eta * cos_t - cos_i) / (eta * cos_t + cos_i);
    Some((0.5 * (r_s * r_s + r_p * r_p), cos_t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schlick_weight() {
        assert!((schlick_weight(1.0) - 0.0).abs() < 1e-6);
        assert!((schlick_weight(0.0) - 1.0).abs() < 1e-6);
        assert!((schlick(0.04, 1.0) - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_dielectric_normal_incidence() {
        // ((1 - 1.5) / (1 + 1.5))^2 = 0.04
        let (f, cos_t) = dielectric(1.0, 1.0 / 1.5).expect("no TIR");
        assert!((f - 0.04).abs() < 1e-5, "F = {}", f);
        assert!((cos_t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // leaving glass at 60 degrees: sin_t = 1.5 * 0.866 > 1
        assert!(dielectric(0.5, 1.5).is_none());
        assert!(dielectric(0.9, 1.5).is_some());
    }
}
