use foundation::math::Vec3;

/// Translation, XYZ Euler rotation (radians) and per-axis scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotates a direction (no scale, no translation).
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        // XYZ order: v' = Rx * Ry * Rz * v
        let (sx, cx) = self.rotation.x.sin_cos();
        let (sy, cy) = self.rotation.y.sin_cos();
        let (sz, cz) = self.rotation.z.sin_cos();

        let v = Vec3::new(v.x * cz - v.y * sz, v.x * sz + v.y * cz, v.z);
        let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
        Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx)
    }

    /// Maps a local-space point to world space.
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let scaled = Vec3::new(p.x * self.scale.x, p.y * self.scale.y, p.z * self.scale.z);
        self.rotate(scaled) + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::Vec3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn identity_is_origin() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(transform.apply(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn yaw_quarter_turn_maps_x_to_minus_z() {
        let t = Transform::identity().with_rotation(Vec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0));
        assert!(approx(t.apply(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn negative_pitch_maps_y_to_minus_z() {
        let t = Transform::identity().with_rotation(Vec3::new(-std::f64::consts::FRAC_PI_2, 0.0, 0.0));
        assert!(approx(t.apply(Vec3::new(0.0, 1.0, 0.0)), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn scale_then_translate() {
        let t = Transform::translate(Vec3::new(1.0, 0.0, 0.0)).with_scale(Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(t.apply(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(3.0, 1.0, 2.0));
    }
}
