use crate::math::Vec3;

/// Axis-aligned box, used for particle spawn volumes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Box centred on `center` with the given half extents.
    pub fn around(center: Vec3, half: [f64; 3]) -> Self {
        Aabb3 {
            min: [center.x - half[0], center.y - half[1], center.z - half[2]],
            max: [center.x + half[0], center.y + half[1], center.z + half[2]],
        }
    }

    /// Point at normalized coordinates `u` (each in `[0, 1]`).
    pub fn point_at(&self, u: [f64; 3]) -> Vec3 {
        Vec3::new(
            self.min[0] + (self.max[0] - self.min[0]) * u[0],
            self.min[1] + (self.max[1] - self.min[1]) * u[1],
            self.min[2] + (self.max[2] - self.min[2]) * u[2],
        )
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min[0]
            && p.x <= self.max[0]
            && p.y >= self.min[1]
            && p.y <= self.max[1]
            && p.z >= self.min[2]
            && p.z <= self.max[2]
    }

    /// Grows the box by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Self {
        Aabb3 {
            min: [self.min[0] - margin, self.min[1] - margin, self.min[2] - margin],
            max: [self.max[0] + margin, self.max[1] + margin, self.max[2] + margin],
        }
    }
}
