//! Spherical coordinates around the +Y axis.
//!
//! `phi` is the polar angle measured from +Y, `theta` the azimuth measured
//! from +Z toward +X.

use super::vec::Vec3;

/// Smallest polar angle kept away from the poles.
pub const POLE_EPSILON: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spherical {
    pub radius: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Spherical {
    pub fn new(radius: f64, theta: f64, phi: f64) -> Self {
        Self { radius, theta, phi }
    }

    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        let theta = v.x.atan2(v.z);
        let phi = (v.y / radius).clamp(-1.0, 1.0).acos();
        Self { radius, theta, phi }
    }

    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps `phi` strictly inside `(0, PI)` so the up vector stays defined.
    pub fn make_safe(mut self) -> Self {
        self.phi = self
            .phi
            .clamp(POLE_EPSILON, std::f64::consts::PI - POLE_EPSILON);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Spherical;
    use crate::math::Vec3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn roundtrip_preserves_offset() {
        let v = Vec3::new(0.0, 2.0, 12.0);
        let s = Spherical::from_vec3(v);
        assert!((s.radius - v.length()).abs() < 1e-12);
        assert!(approx(s.to_vec3(), v));
    }

    #[test]
    fn plus_z_has_zero_azimuth() {
        let s = Spherical::from_vec3(Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(s.theta, 0.0);
        assert!((s.phi - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_is_degenerate_but_finite() {
        let s = Spherical::from_vec3(Vec3::ZERO);
        assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn make_safe_moves_off_the_pole() {
        let s = Spherical::new(1.0, 0.0, 0.0).make_safe();
        assert!(s.phi > 0.0);
    }
}
