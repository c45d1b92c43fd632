//! Building model produced by the massing pipeline.
//!
//! Hierarchy: Building → ZoneVolume → Surface → Polygon (+ window sub-surfaces).
//! Volumes live in an arena (`Building::volumes`) and refer to each other by index.

pub mod boundary;
pub mod building;
pub mod facade;
pub mod story;
pub mod surface;
pub mod volume;
