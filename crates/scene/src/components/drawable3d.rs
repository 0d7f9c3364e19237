/// Geometry descriptor. Tessellation happens in the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    Cuboid {
        width: f64,
        height: f64,
        depth: f64,
    },
    Sphere {
        radius: f64,
    },
    /// Capped frustum along +Y, centred on the origin.
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
    },
    /// Pyramid/cone along +Y with `sides` segments.
    Cone {
        radius: f64,
        height: f64,
        sides: u32,
    },
    /// Flat disc in the XZ plane.
    Disc {
        radius: f64,
    },
    /// Flat quad in the XY plane.
    Quad {
        width: f64,
        height: f64,
    },
    /// Point cloud whose positions live in a particle buffer.
    Points,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
}

impl Drawable3D {
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        Self {
            shape: Shape3D::Cuboid {
                width,
                height,
                depth,
            },
        }
    }

    pub fn sphere(radius: f64) -> Self {
        Self {
            shape: Shape3D::Sphere { radius },
        }
    }

    pub fn cylinder(radius_top: f64, radius_bottom: f64, height: f64) -> Self {
        Self {
            shape: Shape3D::Cylinder {
                radius_top,
                radius_bottom,
                height,
            },
        }
    }

    pub fn cone(radius: f64, height: f64, sides: u32) -> Self {
        Self {
            shape: Shape3D::Cone {
                radius,
                height,
                sides,
            },
        }
    }

    pub fn disc(radius: f64) -> Self {
        Self {
            shape: Shape3D::Disc { radius },
        }
    }

    pub fn quad(width: f64, height: f64) -> Self {
        Self {
            shape: Shape3D::Quad { width, height },
        }
    }

    pub fn points() -> Self {
        Self {
            shape: Shape3D::Points,
        }
    }
}
