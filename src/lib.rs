//! Bar-shaped building massing.
//!
//! Turns a floor area, a story count and a space-type mix into a model of
//! one or two rectangular bars, sliced into zone volumes with boundary
//! conditions and windows. Start with [`create_bar_massing`].

pub mod bar;
pub mod diagnostics;
pub mod error;
pub mod geom;
pub mod io;
pub mod model;
pub mod units;

// Prelude
pub use bar::catalog::{SpaceTypeCatalog, StaticCatalog};
pub use bar::config::{DivisionMethod, MassingConfig, StoryMultiplierMethod};
pub use bar::create::{MassingResult, create_bar_massing, create_bar_massing_with_deadline};
pub use bar::deadline::Deadline;
pub use diagnostics::{Diagnostics, Severity};
pub use error::MassingError;
pub use geom::point::Point;
pub use geom::polygon::Polygon;
pub use geom::vector::Vector;
pub use model::boundary::BoundaryCondition;
pub use model::building::Building;
