use crate::model::facade::FacadeFlags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryRole {
    BelowGrade,
    Ground,
    Mid,
    Top,
}

/// A modeled story, possibly standing for several identical physical floors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDescriptor {
    pub id: String,
    /// Index of the owning bar in `Building::bars`.
    pub bar: usize,
    pub role: StoryRole,
    /// Elevation of the modeled floor.
    pub vertical_origin: f64,
    pub height: f64,
    /// Number of physical floors this story represents (at least 1).
    pub multiplier: u32,
    /// Footprint area scale, below 1 only on a partial top story.
    pub area_scale: f64,
    /// Facades of this story modeled as party walls.
    pub party_walls: FacadeFlags,
    /// Floor is not exposed to ground (`bottom_story_ground_exposed = false`).
    pub adiabatic_floor: bool,
    /// Roof is not exposed to outdoors (`top_story_roof_exposed = false`).
    pub adiabatic_roof: bool,
}

impl StoryDescriptor {
    pub fn top(&self) -> f64 {
        self.vertical_origin + self.height
    }

    pub fn is_above_grade(&self) -> bool {
        self.role != StoryRole::BelowGrade
    }

    pub fn is_partial(&self) -> bool {
        self.area_scale < 1.
    }
}
