use crate::bar::PERIMETER_ZONE_DEPTH;
use crate::bar::catalog::DoubleLoadedCorridor;
use crate::units::ft2_to_m2;
use serde::{Deserialize, Serialize};

/// How repeated floors are collapsed into one modeled story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryMultiplierMethod {
    /// Every floor is modeled.
    None,
    /// Basements, ground, one merged mid story per party-wall pattern, top.
    BasementsGroundMidTop,
}

/// How a bar's footprint is divided between space types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionMethod {
    /// Same slices on every story.
    SimpleSliced,
    /// Slices recomputed per story; space types spill onto following stories.
    PerStorySliced,
    /// The largest space type takes the whole building, zoned core and perimeter.
    SingleSpaceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceTypeSort {
    /// Largest target area first.
    Size,
    /// Categories by total area, then largest first within a category.
    CategoryThenSize,
}

/// Share of the building taken by a further building type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTypeShare {
    pub building_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    pub fraction: f64,
}

/// Explicit space-type area fraction with optional overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceTypeFraction {
    pub name: String,
    pub fraction: f64,
    #[serde(default)]
    pub category: Option<String>,
    /// Floor-to-floor height, m.
    #[serde(default)]
    pub story_height: Option<f64>,
    #[serde(default)]
    pub window_to_wall_ratio: Option<f64>,
    #[serde(default)]
    pub double_loaded_corridor: Option<DoubleLoadedCorridor>,
}

impl SpaceTypeFraction {
    pub fn new(name: &str, fraction: f64) -> Self {
        Self {
            name: name.to_string(),
            fraction,
            category: None,
            story_height: None,
            window_to_wall_ratio: None,
            double_loaded_corridor: None,
        }
    }
}

/// Input of the massing synthesizer.
///
/// Zero means "use the building type's default" for `floor_height`,
/// `aspect_ratio`, `perimeter_multiplier` and `window_to_wall_ratio`,
/// and "unconstrained" for `fixed_bar_width` and `single_floor_area`.
/// Lengths are in m, areas in m².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassingConfig {
    pub building_name: String,
    /// Catalog key of the main building type.
    pub building_type: String,
    pub building_subtype: Option<String>,
    /// Standard passed to the catalog (e.g. "90.1-2013").
    pub template: String,
    /// Further building types; the main type takes the remaining share.
    pub additional_building_types: Vec<BuildingTypeShare>,
    /// Explicit space-type mix. Replaces the catalog mix when not empty.
    pub space_types: Vec<SpaceTypeFraction>,
    pub total_floor_area: f64,
    /// Area of one floor. Takes precedence over `total_floor_area` when positive.
    pub single_floor_area: f64,
    /// Fractional values give a partial top story.
    pub num_stories_above_grade: f64,
    pub num_stories_below_grade: u32,
    pub floor_height: f64,
    /// Put space types with a non-typical story height into their own one-story bar.
    pub custom_height_bar: bool,
    pub aspect_ratio: f64,
    pub perimeter_multiplier: f64,
    pub fixed_bar_width: f64,
    /// Gap between bars in units of the building height.
    pub bar_separation_multiplier: f64,
    pub window_to_wall_ratio: f64,
    /// Share of the exterior wall area modeled as party walls, in [0, 1).
    pub party_wall_fraction: f64,
    /// Number of above-grade stories, counted from the ground floor up, with a
    /// party wall on the given facade.
    pub party_wall_stories_north: u32,
    pub party_wall_stories_east: u32,
    pub party_wall_stories_south: u32,
    pub party_wall_stories_west: u32,
    pub bottom_story_ground_exposed: bool,
    pub top_story_roof_exposed: bool,
    /// Clockwise rotation of the building, degrees.
    pub building_rotation: f64,
    pub story_multiplier_method: StoryMultiplierMethod,
    /// Only pair surfaces within a story; floors and ceilings between stories become adiabatic.
    pub make_mid_story_surfaces_adiabatic: bool,
    pub division_method: DivisionMethod,
    pub space_type_sort: SpaceTypeSort,
    /// Merge the primary and circulation space types into a double-loaded corridor.
    pub double_loaded_corridor: bool,
    pub perimeter_zone_depth: f64,
}

impl Default for MassingConfig {
    fn default() -> Self {
        Self {
            building_name: "Building".to_string(),
            building_type: "SmallOffice".to_string(),
            building_subtype: None,
            template: "90.1-2013".to_string(),
            additional_building_types: Vec::new(),
            space_types: Vec::new(),
            total_floor_area: ft2_to_m2(10000.),
            single_floor_area: 0.,
            num_stories_above_grade: 1.,
            num_stories_below_grade: 0,
            floor_height: 0.,
            custom_height_bar: true,
            aspect_ratio: 0.,
            perimeter_multiplier: 0.,
            fixed_bar_width: 0.,
            bar_separation_multiplier: 10.,
            window_to_wall_ratio: 0.,
            party_wall_fraction: 0.,
            party_wall_stories_north: 0,
            party_wall_stories_east: 0,
            party_wall_stories_south: 0,
            party_wall_stories_west: 0,
            bottom_story_ground_exposed: true,
            top_story_roof_exposed: true,
            building_rotation: 0.,
            story_multiplier_method: StoryMultiplierMethod::BasementsGroundMidTop,
            make_mid_story_surfaces_adiabatic: true,
            division_method: DivisionMethod::PerStorySliced,
            space_type_sort: SpaceTypeSort::Size,
            double_loaded_corridor: true,
            perimeter_zone_depth: PERIMETER_ZONE_DEPTH,
        }
    }
}

impl MassingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_building_type(mut self, building_type: &str) -> Self {
        self.building_type = building_type.to_string();
        self
    }

    pub fn with_total_floor_area(mut self, area: f64) -> Self {
        self.total_floor_area = area;
        self
    }

    pub fn with_single_floor_area(mut self, area: f64) -> Self {
        self.single_floor_area = area;
        self
    }

    pub fn with_stories(mut self, above_grade: f64, below_grade: u32) -> Self {
        self.num_stories_above_grade = above_grade;
        self.num_stories_below_grade = below_grade;
        self
    }

    pub fn with_floor_height(mut self, height: f64) -> Self {
        self.floor_height = height;
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn with_perimeter_multiplier(mut self, multiplier: f64) -> Self {
        self.perimeter_multiplier = multiplier;
        self
    }

    pub fn with_fixed_bar_width(mut self, width: f64) -> Self {
        self.fixed_bar_width = width;
        self
    }

    pub fn with_window_to_wall_ratio(mut self, wwr: f64) -> Self {
        self.window_to_wall_ratio = wwr;
        self
    }

    pub fn with_space_type(mut self, name: &str, fraction: f64) -> Self {
        self.space_types.push(SpaceTypeFraction::new(name, fraction));
        self
    }

    pub fn with_additional_building_type(mut self, building_type: &str, fraction: f64) -> Self {
        self.additional_building_types.push(BuildingTypeShare {
            building_type: building_type.to_string(),
            subtype: None,
            fraction,
        });
        self
    }

    /// Party-wall story counts per facade.
    pub fn with_party_wall_stories(mut self, north: u32, east: u32, south: u32, west: u32) -> Self {
        self.party_wall_stories_north = north;
        self.party_wall_stories_east = east;
        self.party_wall_stories_south = south;
        self.party_wall_stories_west = west;
        self
    }

    pub fn with_party_wall_fraction(mut self, fraction: f64) -> Self {
        self.party_wall_fraction = fraction;
        self
    }

    pub fn with_division_method(mut self, method: DivisionMethod) -> Self {
        self.division_method = method;
        self
    }

    pub fn with_story_multiplier_method(mut self, method: StoryMultiplierMethod) -> Self {
        self.story_multiplier_method = method;
        self
    }

    pub fn with_mid_story_surfaces_adiabatic(mut self, adiabatic: bool) -> Self {
        self.make_mid_story_surfaces_adiabatic = adiabatic;
        self
    }

    pub fn with_building_rotation(mut self, degrees: f64) -> Self {
        self.building_rotation = degrees;
        self
    }

    pub fn with_exposure(mut self, ground_exposed: bool, roof_exposed: bool) -> Self {
        self.bottom_story_ground_exposed = ground_exposed;
        self.top_story_roof_exposed = roof_exposed;
        self
    }

    pub fn with_custom_height_bar(mut self, enabled: bool) -> Self {
        self.custom_height_bar = enabled;
        self
    }

    pub fn with_double_loaded_corridor(mut self, enabled: bool) -> Self {
        self.double_loaded_corridor = enabled;
        self
    }

    pub fn with_space_type_sort(mut self, sort: SpaceTypeSort) -> Self {
        self.space_type_sort = sort;
        self
    }

    pub fn has_party_wall_stories(&self) -> bool {
        self.party_wall_stories_north
            + self.party_wall_stories_east
            + self.party_wall_stories_south
            + self.party_wall_stories_west
            > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_defaults() {
        let c = MassingConfig::default();
        assert_eq!(c.division_method, DivisionMethod::PerStorySliced);
        assert_eq!(
            c.story_multiplier_method,
            StoryMultiplierMethod::BasementsGroundMidTop
        );
        assert!(c.bottom_story_ground_exposed && c.top_story_roof_exposed);
        assert!(!c.has_party_wall_stories());
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let c: MassingConfig = serde_json::from_str(
            r#"{"num_stories_above_grade": 3, "division_method": "simple_sliced",
                "space_types": [{"name": "Office", "fraction": 1.0}]}"#,
        )?;
        assert_eq!(c.num_stories_above_grade, 3.);
        assert_eq!(c.division_method, DivisionMethod::SimpleSliced);
        assert_eq!(c.space_types[0].story_height, None);
        assert_eq!(c.building_type, "SmallOffice");
        Ok(())
    }

    #[test]
    fn test_builder() {
        let c = MassingConfig::new()
            .with_stories(4., 1)
            .with_party_wall_stories(2, 0, 0, 0)
            .with_space_type("Office", 0.7)
            .with_space_type("Storage", 0.3);
        assert!(c.has_party_wall_stories());
        assert_eq!(c.space_types.len(), 2);
        assert_eq!(c.num_stories_below_grade, 1);
    }
}
