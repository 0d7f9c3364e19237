//! Tuning constants for each particle effect.

use foundation::math::Vec3;

use crate::field::Wander;

/// Spawn volume and motion for a falling weather field.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WeatherPreset {
    pub count: usize,
    /// Full width of the square spawn footprint in x and z.
    pub extent: f64,
    /// Spawn ceiling; recycled particles reappear in `[0, height)`.
    pub height: f64,
    pub wander: Wander,
    /// Snow also re-randomises x/z on recycle.
    pub reseed_xz: bool,
    /// Per-particle colours picked at spawn; empty means material colour.
    pub palette: &'static [u32],
}

pub const PETALS: WeatherPreset = WeatherPreset {
    count: 500,
    extent: 20.0,
    height: 8.0,
    wander: Wander {
        frequency: 0.1,
        amplitude: 0.01,
        velocity: -0.01,
    },
    reseed_xz: false,
    palette: &[],
};

pub const LEAVES: WeatherPreset = WeatherPreset {
    count: 300,
    extent: 20.0,
    height: 8.0,
    wander: Wander {
        frequency: 0.2,
        amplitude: 0.01,
        velocity: -0.015,
    },
    reseed_xz: false,
    palette: &[0xd2691e, 0xff8c00, 0xcd853f, 0xb8860b],
};

pub const SNOW: WeatherPreset = WeatherPreset {
    count: 1000,
    extent: 30.0,
    height: 15.0,
    wander: Wander {
        frequency: 0.05,
        amplitude: 0.01,
        velocity: -0.02,
    },
    reseed_xz: true,
    palette: &[],
};

pub const SMOKE_COUNT: usize = 100;
pub const SMOKE_WANDER: Wander = Wander {
    frequency: 0.1,
    amplitude: 0.001,
    velocity: 0.01,
};
/// Jitter of respawned smoke around the chimney top.
pub const SMOKE_SPREAD: f64 = 0.2;
/// Height above the chimney top at which smoke recycles.
pub const SMOKE_MARGIN: f64 = 5.0;
/// Initial column height of the smoke plume.
pub const SMOKE_COLUMN: f64 = 1.5;

pub const SUNSPOT_COUNT: usize = 30;
pub const SUNSPOT_EXTENT: f64 = 10.0;
pub const SUNSPOT_FLOOR: f32 = 0.7;
pub const SUNSPOT_AMPLITUDE: f32 = 0.3;

pub const STAR_BASE_COUNT: usize = 2000;
pub const STAR_EXTRA_WINTER: usize = 1000;
pub const STAR_EXTRA_SUMMER: usize = 12800;
pub const STAR_DOME_RADIUS: f64 = 200.0;
pub const STAR_FLOOR: f32 = 0.6;

pub const GALAXY_COUNT: usize = 100_000;
pub const GALAXY_RADIUS: f64 = 150.0;
pub const GALAXY_BRANCHES: usize = 5;
pub const GALAXY_SPIN: f64 = 1.2;
pub const GALAXY_RANDOMNESS: f64 = 0.3;
pub const GALAXY_RANDOMNESS_POWER: i32 = 3;
pub const GALAXY_LIFT: f64 = 70.0;
pub const GALAXY_INSIDE: u32 = 0x6495ed;
pub const GALAXY_OUTSIDE: u32 = 0xff1493;
pub const GALAXY_POSITION: Vec3 = Vec3::new(-10.0, 0.0, -15.0);
pub const GALAXY_TILT_X: f64 = std::f64::consts::PI * 0.35;
pub const GALAXY_TILT_Y: f64 = std::f64::consts::PI * 0.1;
pub const GALAXY_SPIN_RATE: f64 = 0.03;
pub const GALAXY_PULSE_RATE: f64 = 0.2;
pub const GALAXY_PULSE_DEPTH: f64 = 0.05;
