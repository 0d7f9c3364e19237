pub mod drawable3d;
pub mod light;
pub mod material;
pub mod tags;
pub mod transform;
pub mod visibility;

pub use drawable3d::*;
pub use light::*;
pub use material::*;
pub use tags::*;
pub use transform::*;
pub use visibility::*;
