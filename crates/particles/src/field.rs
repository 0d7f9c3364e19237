use foundation::bounds::Aabb3;
use foundation::color::Rgb;
use foundation::math::Vec3;
use rand::Rng;

use crate::presets::{
    SMOKE_COLUMN, SMOKE_MARGIN, SMOKE_SPREAD, SMOKE_WANDER, SUNSPOT_AMPLITUDE,
    SUNSPOT_EXTENT, SUNSPOT_FLOOR, WeatherPreset,
};
use crate::{centered, unit};

/// How a field moves each frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Fall,
    Rise,
    Flicker,
    Drift,
}

/// Horizontal sway plus constant vertical velocity, per frame.
///
/// The sway phase is `(t + i) * frequency` where `i` is the flat buffer
/// offset of the particle's x coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Wander {
    pub frequency: f64,
    pub amplitude: f64,
    pub velocity: f64,
}

/// Where particles go once they leave their travel bounds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Recycle {
    /// Falling particles below `y = 0` get a fresh height inside `spawn`.
    Ground { spawn: Aabb3, reseed_xz: bool },
    /// Rising particles above `emitter.y + margin` restart at the emitter.
    Emitter {
        emitter: Vec3,
        spread: f64,
        margin: f64,
    },
    Never,
}

/// Which per-particle attribute a flicker modulates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlickerTarget {
    Opacity,
    Size,
}

/// `level = base * (floor + amplitude * sin(t * speed))`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Flicker {
    pub floor: f32,
    pub amplitude: f32,
    pub target: FlickerTarget,
}

/// Flat particle buffers plus the rule that animates them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    kind: FieldKind,
    positions: Vec<f32>,
    sizes: Vec<f32>,
    levels: Vec<f32>,
    base_levels: Vec<f32>,
    speeds: Vec<f32>,
    colors: Option<Vec<f32>>,
    wander: Option<Wander>,
    flicker: Option<Flicker>,
    recycle: Recycle,
    recycle_counts: Vec<u32>,
}

impl ParticleField {
    fn with_capacity(kind: FieldKind, count: usize) -> Self {
        Self {
            kind,
            positions: Vec::with_capacity(count * 3),
            sizes: Vec::with_capacity(count),
            levels: Vec::with_capacity(count),
            base_levels: Vec::with_capacity(count),
            speeds: Vec::with_capacity(count),
            colors: None,
            wander: None,
            flicker: None,
            recycle: Recycle::Never,
            recycle_counts: vec![0; count],
        }
    }

    fn push(&mut self, p: Vec3, size: f32, level: f32, speed: f32) {
        self.positions
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        self.sizes.push(size);
        self.levels.push(level);
        self.base_levels.push(level);
        self.speeds.push(speed);
    }

    /// Falling weather (petals, leaves, snow) spread over a square footprint.
    pub fn weather<R: Rng + ?Sized>(preset: &WeatherPreset, count: usize, rng: &mut R) -> Self {
        let half = preset.extent * 0.5;
        let spawn = Aabb3::new([-half, 0.0, -half], [half, preset.height, half]);
        let mut field = Self::with_capacity(FieldKind::Fall, count);
        let mut colors = Vec::new();
        for _ in 0..count {
            let p = Vec3::new(
                centered(rng, preset.extent),
                unit(rng) * preset.height,
                centered(rng, preset.extent),
            );
            field.push(p, 1.0, 1.0, 0.0);
            if !preset.palette.is_empty() {
                let pick = rng.gen_range(0..preset.palette.len());
                colors.extend_from_slice(&Rgb::from_hex(preset.palette[pick]).to_array());
            }
        }
        if !preset.palette.is_empty() {
            field.colors = Some(colors);
        }
        field.wander = Some(preset.wander);
        field.recycle = Recycle::Ground {
            spawn,
            reseed_xz: preset.reseed_xz,
        };
        field
    }

    /// Chimney smoke: a short column above `emitter` that rises and restarts.
    pub fn smoke<R: Rng + ?Sized>(emitter: Vec3, count: usize, rng: &mut R) -> Self {
        let mut field = Self::with_capacity(FieldKind::Rise, count);
        for _ in 0..count {
            let p = Vec3::new(
                emitter.x + centered(rng, SMOKE_SPREAD),
                emitter.y + unit(rng) * SMOKE_COLUMN,
                emitter.z + centered(rng, SMOKE_SPREAD),
            );
            field.push(p, 1.0, 1.0, 0.0);
        }
        field.wander = Some(SMOKE_WANDER);
        field.recycle = Recycle::Emitter {
            emitter,
            spread: SMOKE_SPREAD,
            margin: SMOKE_MARGIN,
        };
        field
    }

    /// Dappled light patches on the summer ground.
    pub fn sunspots<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut field = Self::with_capacity(FieldKind::Flicker, count);
        for _ in 0..count {
            let size = 0.2 + unit(rng) as f32 * 0.5;
            let opacity = 0.1 + unit(rng) as f32 * 0.4;
            let p = Vec3::new(
                centered(rng, SUNSPOT_EXTENT),
                0.05 + unit(rng) * 0.1,
                centered(rng, SUNSPOT_EXTENT),
            );
            let speed = 1.0 + unit(rng) as f32 * 2.0;
            field.push(p, size, opacity, speed);
        }
        field.flicker = Some(Flicker {
            floor: SUNSPOT_FLOOR,
            amplitude: SUNSPOT_AMPLITUDE,
            target: FlickerTarget::Opacity,
        });
        field
    }

    /// Builds a flickering field from prepared buffers (stars).
    pub(crate) fn flickering(
        positions: Vec<f32>,
        sizes: Vec<f32>,
        speeds: Vec<f32>,
        colors: Vec<f32>,
        flicker: Flicker,
    ) -> Self {
        let count = sizes.len();
        Self {
            kind: FieldKind::Flicker,
            positions,
            sizes,
            levels: vec![1.0; count],
            base_levels: vec![1.0; count],
            speeds,
            colors: Some(colors),
            wander: None,
            flicker: Some(flicker),
            recycle: Recycle::Never,
            recycle_counts: vec![0; count],
        }
    }

    /// Static coloured cloud (galaxy); animated through its transform only.
    pub(crate) fn static_cloud(positions: Vec<f32>, colors: Vec<f32>) -> Self {
        let count = positions.len() / 3;
        Self {
            kind: FieldKind::Drift,
            positions,
            sizes: vec![1.0; count],
            levels: vec![1.0; count],
            base_levels: vec![1.0; count],
            speeds: vec![0.0; count],
            colors: Some(colors),
            wander: None,
            flicker: None,
            recycle: Recycle::Never,
            recycle_counts: vec![0; count],
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Flat `[x, y, z, x, y, z, ...]` buffer.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Size multiplier on top of the material's point size; all ones for
    /// weather, smoke and the galaxy.
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Flat RGB buffer when particles carry their own colour.
    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }

    pub fn flicker(&self) -> Option<Flicker> {
        self.flicker
    }

    pub fn recycle(&self) -> Recycle {
        self.recycle
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        let i = index * 3;
        let p = self.positions.get(i..i + 3)?;
        Some(Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
    }

    /// How often particle `index` has been sent back to its source.
    pub fn recycle_count(&self, index: usize) -> u32 {
        self.recycle_counts.get(index).copied().unwrap_or(0)
    }

    /// Advances the field to elapsed time `t` (seconds since start).
    pub fn update<R: Rng + ?Sized>(&mut self, t: f64, rng: &mut R) {
        if let Some(wander) = self.wander {
            self.advance_wander(wander, t, rng);
        }
        if let Some(flicker) = self.flicker {
            for ((level, base), speed) in self
                .levels
                .iter_mut()
                .zip(&self.base_levels)
                .zip(&self.speeds)
            {
                let wave = (t * *speed as f64).sin() as f32;
                *level = base * (flicker.floor + flicker.amplitude * wave);
            }
        }
    }

    fn advance_wander<R: Rng + ?Sized>(&mut self, wander: Wander, t: f64, rng: &mut R) {
        let recycle = self.recycle;
        for (k, chunk) in self.positions.chunks_exact_mut(3).enumerate() {
            let phase = (t + (k * 3) as f64) * wander.frequency;
            chunk[0] += (phase.sin() * wander.amplitude) as f32;
            chunk[1] += wander.velocity as f32;
            chunk[2] += (phase.cos() * wander.amplitude) as f32;

            let respawned = match recycle {
                Recycle::Ground { spawn, reseed_xz } if chunk[1] < 0.0 => {
                    let p = spawn.point_at([unit(rng), unit(rng), unit(rng)]);
                    chunk[1] = p.y as f32;
                    if reseed_xz {
                        chunk[0] = p.x as f32;
                        chunk[2] = p.z as f32;
                    }
                    true
                }
                Recycle::Emitter {
                    emitter,
                    spread,
                    margin,
                } if chunk[1] as f64 > emitter.y + margin => {
                    chunk[0] = (emitter.x + centered(rng, spread)) as f32;
                    chunk[1] = emitter.y as f32;
                    chunk[2] = (emitter.z + centered(rng, spread)) as f32;
                    true
                }
                _ => false,
            };
            if respawned {
                self.recycle_counts[k] += 1;
            }
        }
    }
}
