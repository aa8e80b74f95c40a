//! Vertical classification of the city: fixed elevation bands, named range
//! presets, and the controller that owns the currently visible slice.

pub mod controller;
pub mod level;
pub mod preset;
pub mod range;

pub use controller::*;
pub use level::*;
pub use preset::*;
pub use range::*;
