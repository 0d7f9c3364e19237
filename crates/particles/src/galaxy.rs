use std::f64::consts::TAU;

use foundation::color::Rgb;
use foundation::math::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scene::components::Transform;

use crate::field::ParticleField;
use crate::presets::{
    GALAXY_BRANCHES, GALAXY_INSIDE, GALAXY_LIFT, GALAXY_OUTSIDE, GALAXY_POSITION,
    GALAXY_PULSE_DEPTH, GALAXY_PULSE_RATE, GALAXY_RADIUS, GALAXY_RANDOMNESS,
    GALAXY_RANDOMNESS_POWER, GALAXY_SPIN, GALAXY_SPIN_RATE, GALAXY_TILT_X, GALAXY_TILT_Y,
};
use crate::unit;

/// Spiral point cloud shown behind the house on summer nights.
#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    field: ParticleField,
    transform: Transform,
}

impl Galaxy {
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let inside = Rgb::from_hex(GALAXY_INSIDE);
        let outside = Rgb::from_hex(GALAXY_OUTSIDE);
        let mut positions = Vec::with_capacity(count * 3);
        let mut colors = Vec::with_capacity(count * 3);

        for i in 0..count {
            let radius = unit(&mut rng) * GALAXY_RADIUS;
            let spin = radius * GALAXY_SPIN;
            let branch = (i % GALAXY_BRANCHES) as f64 / GALAXY_BRANCHES as f64 * TAU;
            let jitter_x = scatter(&mut rng, radius);
            let jitter_y = scatter(&mut rng, radius);
            let jitter_z = scatter(&mut rng, radius);

            positions.extend_from_slice(&[
                ((branch + spin).cos() * radius + jitter_x) as f32,
                (jitter_y + GALAXY_LIFT) as f32,
                ((branch + spin).sin() * radius + jitter_z) as f32,
            ]);
            let mix = inside.lerp(outside, (radius / GALAXY_RADIUS) as f32);
            colors.extend_from_slice(&mix.to_array());
        }

        Self {
            field: ParticleField::static_cloud(positions, colors),
            transform: Transform::translate(GALAXY_POSITION)
                .with_rotation(Vec3::new(GALAXY_TILT_X, GALAXY_TILT_Y, 0.0)),
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Slow rotation about Y plus a gentle pulse of the whole cloud.
    pub fn update(&mut self, t: f64) {
        self.transform.rotation.y = t * GALAXY_SPIN_RATE;
        let pulse = 1.0 + (t * GALAXY_PULSE_RATE).sin() * GALAXY_PULSE_DEPTH;
        self.transform.scale = Vec3::new(pulse, pulse, pulse);
    }
}

/// Offset biased toward zero by `GALAXY_RANDOMNESS_POWER`, random sign.
fn scatter<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> f64 {
    let magnitude = unit(rng).powi(GALAXY_RANDOMNESS_POWER);
    let sign = if unit(rng) < 0.5 { 1.0 } else { -1.0 };
    magnitude * sign * GALAXY_RANDOMNESS * radius
}
