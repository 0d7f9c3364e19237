use foundation::color::Rgb;
use foundation::math::Vec3;

use crate::season::Season;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Light shining from `position` toward the origin.
    Directional { position: Vec3 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Rgb,
    pub intensity: f32,
    /// Seasonal lights are driven by the season store; `None` for ambient.
    pub season: Option<Season>,
}

impl Light {
    pub fn ambient(color: Rgb, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
            season: None,
        }
    }

    pub fn seasonal(season: Season, color: Rgb, position: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional { position },
            color,
            intensity,
            season: Some(season),
        }
    }

    /// Unit vector pointing from the surface toward the light.
    pub fn direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Ambient => None,
            LightKind::Directional { position } => Some(position.normalize()),
        }
    }
}
