pub mod listeners;
pub mod timer;

pub use listeners::*;
pub use timer::*;
