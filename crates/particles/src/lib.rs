//! CPU-side particle buffers and their per-frame motion rules.

pub mod field;
pub mod fliers;
pub mod galaxy;
pub mod presets;
pub mod starfield;

pub use field::*;
pub use fliers::*;
pub use galaxy::*;
pub use starfield::*;

use rand::Rng;

/// Uniform sample in `[0, 1)`.
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..1.0)
}

/// Uniform sample in `[-0.5, 0.5) * extent`.
pub fn centered<R: Rng + ?Sized>(rng: &mut R, extent: f64) -> f64 {
    (unit(rng) - 0.5) * extent
}
