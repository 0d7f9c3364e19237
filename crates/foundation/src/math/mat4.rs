use super::vec::Vec3;

/// Column-major 4x4 matrix (matches WGSL `mat4x4<f32>` layout once narrowed).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Mat4 {
    pub fn identity() -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Right-handed view matrix looking from `eye` toward `target`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Self {
            cols: [
                [s.x, u.x, -f.x, 0.0],
                [s.y, u.y, -f.y, 0.0],
                [s.z, u.z, -f.z, 0.0],
                [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
            ],
        }
    }

    /// Right-handed perspective projection with depth range `[0, 1]`.
    pub fn perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (0.5 * fov_y_rad).tan();
        let aspect = aspect.max(1e-6);
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, far / (near - far), -1.0],
                [0.0, 0.0, (near * far) / (near - far), 0.0],
            ],
        }
    }

    /// `self * rhs`.
    pub fn mul(&self, rhs: &Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut c = [[0.0f64; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                c[col][row] = a[0][row] * b[col][0]
                    + a[1][row] * b[col][1]
                    + a[2][row] * b[col][2]
                    + a[3][row] * b[col][3];
            }
        }
        Self { cols: c }
    }

    /// Transforms a point and performs the perspective divide.
    ///
    /// Returns `None` for points on or behind the eye plane (`w <= 0`).
    pub fn project_point(&self, p: Vec3) -> Option<Vec3> {
        let m = &self.cols;
        let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
        let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
        let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
        let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
        if w <= 0.0 || !w.is_finite() {
            return None;
        }
        Some(Vec3::new(x / w, y / w, z / w))
    }

    pub fn to_f32_cols(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (dst, src) in out.iter_mut().zip(self.cols.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = *s as f32;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::Vec3;

    #[test]
    fn identity_mul_is_noop() {
        let p = Mat4::perspective_rh_z0(1.0, 1.5, 0.1, 100.0);
        assert_eq!(Mat4::identity().mul(&p), p);
        assert_eq!(p.mul(&Mat4::identity()), p);
    }

    #[test]
    fn target_projects_to_ndc_center() {
        let eye = Vec3::new(0.0, 5.0, 15.0);
        let target = Vec3::new(0.0, 3.0, 0.0);
        let view = Mat4::look_at_rh(eye, target, Vec3::UP);
        let proj = Mat4::perspective_rh_z0(75f64.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        let ndc = proj.mul(&view).project_point(target).unwrap();
        assert!(ndc.x.abs() < 1e-9);
        assert!(ndc.y.abs() < 1e-9);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn points_behind_the_eye_are_rejected() {
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::UP);
        let proj = Mat4::perspective_rh_z0(1.0, 1.0, 0.1, 100.0);
        assert!(proj.mul(&view).project_point(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn point_above_target_projects_upward() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UP);
        let proj = Mat4::perspective_rh_z0(1.0, 1.0, 0.1, 100.0);
        let ndc = proj.mul(&view).project_point(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(ndc.y > 0.0);
    }
}
