use foundation::color::Rgb;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub roughness: f32,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
    pub opacity: f32,
    /// World-space point size for point clouds.
    pub point_size: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            roughness: 1.0,
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
            point_size: 0.1,
        }
    }
}

impl Material {
    pub fn solid(hex: u32) -> Self {
        Self {
            color: Rgb::from_hex(hex),
            ..Self::default()
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }
}
