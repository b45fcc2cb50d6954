//! Geometry primitives: points, displacements and half-open regions.

pub mod location;
pub mod region;

pub use location::{Location, Offset};
pub use region::Region;
