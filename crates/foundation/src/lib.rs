pub mod bounds;
pub mod color;
pub mod math;
pub mod polygon;
pub mod simplify;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use color::*;
pub use polygon::*;
pub use simplify::*;

/// A `[longitude, latitude]` pair in degrees.
pub type LngLat = [f64; 2];
