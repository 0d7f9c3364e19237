pub mod gesture;
pub mod orbit;

pub use gesture::*;
pub use orbit::*;
