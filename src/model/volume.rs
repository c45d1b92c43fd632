use crate::geom::bboxes::{bounding_box, union};
use crate::geom::point::Point;
use crate::model::facade::Orientation;
use crate::model::surface::{Surface, SurfaceKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a zone within its story's floor plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exposure {
    Core,
    Perimeter(Orientation),
    /// Whole slice or whole floor, no core/perimeter split.
    Whole,
    /// Corridor strip of a double-loaded corridor.
    Corridor,
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exposure::Core => write!(f, "Core"),
            Exposure::Perimeter(o) => write!(f, "{o} Perimeter"),
            Exposure::Whole => write!(f, "Whole"),
            Exposure::Corridor => write!(f, "Corridor"),
        }
    }
}

/// Extruded footprint of one space type on one story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneVolume {
    pub name: String,
    pub space_type: String,
    pub hvac_zone: String,
    /// Index of the owning story in `Building::stories`.
    pub story: usize,
    pub multiplier: u32,
    pub exposure: Exposure,
    /// Clockwise rotation of this volume's axes relative to the building, degrees.
    pub direction_of_relative_north: f64,
    pub surfaces: Vec<Surface>,
}

impl ZoneVolume {
    pub fn surfaces_of(&self, kind: SurfaceKind) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter().filter(move |s| s.kind == kind)
    }

    /// Floor area of one instance (not multiplied).
    pub fn floor_area(&self) -> f64 {
        self.surfaces_of(SurfaceKind::Floor).map(|s| s.area()).sum()
    }

    pub fn bbox(&self) -> Option<(Point, Point)> {
        self.surfaces
            .iter()
            .filter_map(|s| bounding_box(s.polygon.vertices()))
            .reduce(union)
    }
}
