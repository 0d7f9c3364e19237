pub mod frame;
pub mod job;
pub mod scheduler;
pub mod timers;
pub mod tween;

pub use frame::*;
pub use job::*;
pub use scheduler::*;
pub use timers::*;
pub use tween::*;
