//! Four-seasons diorama: one context object that owns the scene, the orbit
//! camera, the season store, the particle fields and the hover labels, and
//! drives them once per display refresh.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod prefab;
pub mod seasons;
pub mod tick;

pub use commands::*;
pub use config::*;
pub use context::*;
pub use error::*;
