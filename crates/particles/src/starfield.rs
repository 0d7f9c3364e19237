use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scene::Season;

use crate::field::{Flicker, FlickerTarget, ParticleField};
use crate::presets::{STAR_DOME_RADIUS, STAR_EXTRA_SUMMER, STAR_EXTRA_WINTER, STAR_FLOOR};
use crate::unit;

/// Night sky for one season, regenerated whenever the season changes.
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    season: Season,
    field: ParticleField,
}

/// Star count for `season` on top of `base`.
pub fn star_count(season: Season, base: usize) -> usize {
    base + match season {
        Season::Winter => STAR_EXTRA_WINTER,
        Season::Summer => STAR_EXTRA_SUMMER,
        _ => 0,
    }
}

/// Twinkle amplitude around the 0.6 floor.
pub fn twinkle_amplitude(season: Season) -> f32 {
    if season == Season::Summer { 0.5 } else { 0.4 }
}

impl StarField {
    /// Same `(season, base, seed)` always yields the same sky.
    pub fn generate(season: Season, base: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ (season.index() as u64 + 1) * 0x9e37_79b9);
        let count = star_count(season, base);
        let mut positions = Vec::with_capacity(count * 3);
        let mut sizes = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count * 3);
        let mut speeds = Vec::with_capacity(count);

        for _ in 0..count {
            let theta = TAU * unit(&mut rng);
            let phi = (2.0 * unit(&mut rng) - 1.0).acos();
            positions.extend_from_slice(&[
                (STAR_DOME_RADIUS * phi.sin() * theta.cos()) as f32,
                (STAR_DOME_RADIUS * phi.cos()).abs() as f32,
                (STAR_DOME_RADIUS * phi.sin() * theta.sin()) as f32,
            ]);
            sizes.push(star_size(season, &mut rng));
            colors.extend_from_slice(&star_color(season, &mut rng));
            speeds.push(star_speed(season, &mut rng));
        }

        let flicker = Flicker {
            floor: STAR_FLOOR,
            amplitude: twinkle_amplitude(season),
            target: FlickerTarget::Size,
        };
        Self {
            season,
            field: ParticleField::flickering(positions, sizes, speeds, colors, flicker),
        }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// Twinkle at elapsed time `t`; stars never move.
    pub fn update(&mut self, t: f64) {
        // Flicker fields draw no randomness.
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        self.field.update(t, &mut rng);
    }
}

fn star_size<R: Rng + ?Sized>(season: Season, rng: &mut R) -> f32 {
    let r = unit(rng) as f32;
    match season {
        Season::Winter => r * 2.0 + 0.5,
        Season::Summer => r * 3.8 + 0.6,
        _ => r + 0.5,
    }
}

fn star_speed<R: Rng + ?Sized>(season: Season, rng: &mut R) -> f32 {
    let r = unit(rng) as f32;
    if season == Season::Summer {
        0.5 + r * 1.2
    } else {
        0.3 + r
    }
}

fn star_color<R: Rng + ?Sized>(season: Season, rng: &mut R) -> [f32; 3] {
    let mut r = || unit(rng) as f32;
    if season == Season::Summer {
        if r() > 0.7 {
            [0.85 + r() * 0.15, 0.85 + r() * 0.15, 1.0]
        } else if r() > 0.5 {
            [1.0, 0.9 + r() * 0.1, 0.5 + r() * 0.3]
        } else if r() > 0.3 {
            [0.95 + r() * 0.05, 0.95 + r() * 0.05, 0.95 + r() * 0.05]
        } else {
            [0.8 + r() * 0.2, 0.7 + r() * 0.2, 0.9 + r() * 0.1]
        }
    } else if r() > 0.8 {
        [0.8 + r() * 0.2, 0.8 + r() * 0.2, 1.0]
    } else if r() > 0.6 {
        [1.0, 0.9 + r() * 0.1, 0.6 + r() * 0.3]
    } else {
        [0.9 + r() * 0.1, 0.9 + r() * 0.1, 0.9 + r() * 0.1]
    }
}
