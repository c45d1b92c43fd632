//! Bar massing pipeline.
//!
//! `MassingConfig` → `ResolvedMassing` (dimensions, layout, space-type mix)
//! → per bar: story stack, slicing, extrusion → reconciliation of shared
//! faces → fenestration → validation.

use crate::units::M_PER_FT;

pub mod catalog;
pub mod config;
pub mod create;
pub mod decompose;
pub mod deadline;
pub mod dimensions;
pub mod extrude;
pub mod fenestration;
pub mod party_walls;
pub mod reconcile;
pub mod slicer;
pub mod spec;
pub mod stories;
pub mod validate;

/// Shortest allowed bar edge, 15 ft.
pub const MIN_BAR_SIZE: f64 = 15. * M_PER_FT;

/// Depth of perimeter zones, 15 ft.
pub const PERIMETER_ZONE_DEPTH: f64 = 15. * M_PER_FT;

/// Slices longer than this many perimeter depths get an end cap.
pub const MAX_END_MULTIPLIER: f64 = 2.0;

/// Slices shorter than this many perimeter depths are not zoned.
pub const MIN_END_MULTIPLIER: f64 = 1.0;

/// Core/perimeter zoning needs the short side to exceed this many depths.
pub const CORE_PERIMETER_MIN_FACTOR: f64 = 2.5;

/// Area tolerance of the floor-area check, 1 ft².
pub const FLOOR_AREA_TOLERANCE: f64 = M_PER_FT * M_PER_FT;
