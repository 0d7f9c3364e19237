pub mod components;
pub mod entity;
pub mod palette;
pub mod season;
pub mod world;

pub use season::*;
pub use world::*;
