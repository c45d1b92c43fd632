//! Boundary conditions of volume surfaces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a surface: volume in the building arena, then surface within the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceRef {
    pub volume: usize,
    pub surface: usize,
}

impl SurfaceRef {
    pub fn new(volume: usize, surface: usize) -> Self {
        Self { volume, surface }
    }
}

impl fmt::Display for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.volume, self.surface)
    }
}

/// What lies on the other side of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Outdoor air.
    Exterior,
    /// Soil.
    Ground,
    /// No heat flow; stands for an unmodeled neighbour (party wall, repeated floor).
    Adiabatic,
    /// Another modeled surface, coincident with this one and facing the other way.
    InteriorShared(SurfaceRef),
}

impl BoundaryCondition {
    pub fn partner(&self) -> Option<SurfaceRef> {
        match self {
            BoundaryCondition::InteriorShared(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_exterior(&self) -> bool {
        matches!(self, BoundaryCondition::Exterior)
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, BoundaryCondition::InteriorShared(_))
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Exterior => write!(f, "Exterior"),
            BoundaryCondition::Ground => write!(f, "Ground"),
            BoundaryCondition::Adiabatic => write!(f, "Adiabatic"),
            BoundaryCondition::InteriorShared(r) => write!(f, "InteriorShared({r})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner() {
        let bc = BoundaryCondition::InteriorShared(SurfaceRef::new(3, 1));
        assert_eq!(bc.partner(), Some(SurfaceRef::new(3, 1)));
        assert!(bc.is_shared());
        assert_eq!(bc.to_string(), "InteriorShared(3/1)");
        assert_eq!(BoundaryCondition::Ground.partner(), None);
        assert!(BoundaryCondition::Exterior.is_exterior());
    }
}
