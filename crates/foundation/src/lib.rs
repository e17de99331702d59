pub mod bounds;
pub mod crs;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use crs::*;
