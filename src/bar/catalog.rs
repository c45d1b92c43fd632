//! Space-type catalog: the read-only data the synthesizer looks up by
//! building type, subtype and standard.

use crate::units::ft_to_m;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Massing defaults of a building type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingFormDefaults {
    /// N/S facade length over E/W facade length.
    pub aspect_ratio: f64,
    pub window_to_wall_ratio: f64,
    /// Floor-to-floor height, m.
    pub typical_story_height: f64,
    /// `None` means 1.0.
    pub perimeter_multiplier: Option<f64>,
}

impl BuildingFormDefaults {
    fn from_ft(aspect_ratio: f64, wwr: f64, story_ft: f64, perimeter_multiplier: Option<f64>) -> Self {
        Self {
            aspect_ratio,
            window_to_wall_ratio: wwr,
            typical_story_height: ft_to_m(story_ft),
            perimeter_multiplier,
        }
    }

    /// Defaults of the DOE and DEER prototype buildings.
    pub fn prototype(building_type: &str) -> Option<Self> {
        let one = Some(1.0);
        let d = match building_type {
            "SmallOffice" => Self::from_ft(1.5, 0.15, 10., one),
            "MediumOffice" => Self::from_ft(1.5, 0.33, 13., one),
            "LargeOffice" => Self::from_ft(1.5, 0.15, 13., one),
            "RetailStandalone" => Self::from_ft(1.28, 0.07, 20., one),
            "RetailStripmall" => Self::from_ft(4.0, 0.11, 17., one),
            // Ratios and multipliers of the schools and the outpatient clinic come
            // from the prototype footprints (see `prototype_multipliers`)
            "PrimarySchool" => Self::from_ft(2.8, 0.35, 13., Some(1.914)),
            "SecondarySchool" => Self::from_ft(2.1, 0.33, 13., Some(1.568)),
            "Outpatient" => Self::from_ft(1.6, 0.20, 10., Some(1.121)),
            "Hospital" => Self::from_ft(1.33, 0.16, 14., one),
            "SmallHotel" => Self::from_ft(3.0, 0.11, 9., one),
            "LargeHotel" => Self::from_ft(5.1, 0.27, 10., one),
            "Warehouse" => Self::from_ft(2.2, 0.0, 28., one),
            "FullServiceRestaurant" | "QuickServiceRestaurant" => {
                Self::from_ft(1.0, 0.18, 10., one)
            }
            "MidriseApartment" | "HighriseApartment" => Self::from_ft(2.75, 0.15, 10., one),
            "SuperMarket" => Self::from_ft(1.5, 0.11, 20., one),
            "Laboratory" => Self::from_ft(1.33, 0.12, 10., one),
            "LargeDataCenterLowITE" | "LargeDataCenterHighITE" => {
                Self::from_ft(1.67, 0.0, 14., one)
            }
            "SmallDataCenterLowITE" | "SmallDataCenterHighITE" => {
                Self::from_ft(1.5, 0.0, 14., one)
            }
            "Courthouse" => Self::from_ft(2.06, 0.18, 16., one),
            "College" => Self::from_ft(2.5, 0.037, 13., one),
            // DEER prototypes
            "Asm" => Self::from_ft(1.0, 0.19, 15., None),
            "ECC" => Self::from_ft(4.0, 0.25, 13., None),
            "EPr" => Self::from_ft(2.0, 0.16, 12., None),
            "ERC" => Self::from_ft(1.7, 0.03, 12., None),
            "ESe" => Self::from_ft(1.0, 0.15, 13., None),
            "EUn" => Self::from_ft(2.5, 0.3, 14., None),
            "Gro" => Self::from_ft(1.0, 0.07, 25., None),
            "Hsp" => Self::from_ft(1.5, 0.11, 13., None),
            "Htl" => Self::from_ft(3.0, 0.23, 9.5, None),
            "MBT" => Self::from_ft(10.7, 0.12, 15., None),
            "MFm" => Self::from_ft(1.4, 0.24, 9.5, None),
            "MLI" => Self::from_ft(1.0, 0.01, 35., None),
            "Mtl" => Self::from_ft(5.1, 0.41, 9., None),
            "Nrs" => Self::from_ft(10.3, 0.2, 13., None),
            "OfL" | "OfS" => Self::from_ft(1.5, 0.33, 12., None),
            "RFF" => Self::from_ft(1.0, 0.25, 13., None),
            "RSD" => Self::from_ft(1.0, 0.13, 13., None),
            "Rt3" => Self::from_ft(1.0, 0.02, 20.8, None),
            "RtL" => Self::from_ft(1.0, 0.03, 20.5, None),
            "RtS" => Self::from_ft(1.0, 0.13, 12., None),
            "SCn" | "SUn" => Self::from_ft(1.0, 0.01, 48., None),
            "WRf" => Self::from_ft(1.6, 0.0, 32., None),
            _ => return None,
        };
        Some(d)
    }
}

/// Perimeter multipliers of prototypes whose real footprint is not a rectangle,
/// as `(footprint ft², perimeter ft, aspect ratio)` → multiplier.
///
/// The minimum perimeter is computed the way the tabulated values were
/// produced, including the `width / area` term for the two schools.
#[cfg(test)]
fn prototype_multipliers() -> [(&'static str, f64); 3] {
    let school = |area: f64, perimeter: f64, ratio: f64| {
        let width = (area / ratio).sqrt();
        perimeter / (2. * (width + width / area))
    };
    let clinic = |area: f64, perimeter: f64, ratio: f64| {
        let width = (area / ratio).sqrt();
        perimeter / (2. * (width + area / width))
    };
    [
        ("PrimarySchool", school(73958., 619., 2.829268293)),
        ("SecondarySchool", school(210887. / 2., 708., 2.069230769)),
        ("Outpatient", clinic(40946. / 3., 537., 1.56448737)),
    ]
}

/// Corridor/occupied pairing generated as one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleLoadedCorridor {
    /// Share of the corridor (circulation) space type.
    pub core_ratio: f64,
    /// Share of the occupied space type flanking the corridor.
    pub perimeter_ratio: f64,
    /// Space type placed in the corridor strip.
    pub core_category: String,
    /// Space type placed on both sides of the corridor.
    pub perimeter_category: String,
}

impl DoubleLoadedCorridor {
    /// Fraction of the slice width taken by the corridor.
    pub fn core_fraction(&self) -> f64 {
        let total = self.core_ratio + self.perimeter_ratio;
        if total > 0. { self.core_ratio / total } else { 0. }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSpaceType {
    pub name: String,
    pub category: String,
    /// Share of the building type's floor area (normalized by the caller).
    pub area_ratio: f64,
    /// Non-typical floor-to-floor height, m.
    #[serde(default)]
    pub story_height: Option<f64>,
    #[serde(default)]
    pub window_to_wall_ratio: Option<f64>,
    #[serde(default)]
    pub double_loaded_corridor: Option<DoubleLoadedCorridor>,
    /// Main occupied space type of the building type.
    #[serde(default)]
    pub primary: bool,
    /// Circulation space type (corridor).
    #[serde(default)]
    pub circulation: bool,
}

impl CatalogSpaceType {
    pub fn new(name: &str, category: &str, area_ratio: f64) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            area_ratio,
            story_height: None,
            window_to_wall_ratio: None,
            double_loaded_corridor: None,
            primary: false,
            circulation: false,
        }
    }

    pub fn with_story_height(mut self, height: f64) -> Self {
        self.story_height = Some(height);
        self
    }

    pub fn with_window_to_wall_ratio(mut self, wwr: f64) -> Self {
        self.window_to_wall_ratio = Some(wwr);
        self
    }

    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn as_circulation(mut self) -> Self {
        self.circulation = true;
        self
    }
}

/// Read-only lookup injected into the synthesizer.
pub trait SpaceTypeCatalog {
    /// Space types of a building type. An empty list means the catalog knows nothing about it.
    fn space_types(
        &self,
        building_type: &str,
        subtype: Option<&str>,
        standard: &str,
    ) -> Result<Vec<CatalogSpaceType>>;

    fn building_form_defaults(&self, building_type: &str) -> Option<BuildingFormDefaults>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub building_type: String,
    /// `None` matches any subtype.
    #[serde(default)]
    pub subtype: Option<String>,
    /// `None` matches any standard.
    #[serde(default)]
    pub standard: Option<String>,
    pub space_types: Vec<CatalogSpaceType>,
}

impl CatalogEntry {
    /// Number of matched qualifiers, or `None` if the entry does not apply.
    fn specificity(&self, building_type: &str, subtype: Option<&str>, standard: &str) -> Option<u8> {
        if self.building_type != building_type {
            return None;
        }
        let mut score = 0;
        if let Some(s) = &self.subtype {
            if subtype != Some(s.as_str()) {
                return None;
            }
            score += 2;
        }
        if let Some(s) = &self.standard {
            if s != standard {
                return None;
            }
            score += 1;
        }
        Some(score)
    }
}

/// In-memory catalog.
///
/// Lookups pick the most specific entry (subtype beats standard); form
/// defaults fall back to the prototype table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
    #[serde(default)]
    pub form_defaults: BTreeMap<String, BuildingFormDefaults>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_space_types(self, building_type: &str, space_types: Vec<CatalogSpaceType>) -> Self {
        self.with_space_types_for(building_type, None, None, space_types)
    }

    pub fn with_space_types_for(
        mut self,
        building_type: &str,
        subtype: Option<&str>,
        standard: Option<&str>,
        space_types: Vec<CatalogSpaceType>,
    ) -> Self {
        self.entries.push(CatalogEntry {
            building_type: building_type.to_string(),
            subtype: subtype.map(str::to_string),
            standard: standard.map(str::to_string),
            space_types,
        });
        self
    }

    pub fn with_form_defaults(mut self, building_type: &str, defaults: BuildingFormDefaults) -> Self {
        self.form_defaults.insert(building_type.to_string(), defaults);
        self
    }

    /// Space-type mixes of a subset of the DOE prototype buildings.
    pub fn prototypes() -> Self {
        let st = CatalogSpaceType::new;
        let tall = ft_to_m(26.);
        Self::new()
            .with_space_types(
                "SmallOffice",
                vec![st("WholeBuilding - Sm Office", "SmallOffice", 1.0).as_primary()],
            )
            .with_space_types(
                "MediumOffice",
                vec![st("WholeBuilding - Md Office", "MediumOffice", 1.0).as_primary()],
            )
            .with_space_types(
                "PrimarySchool",
                vec![
                    st("Cafeteria", "PrimarySchool", 0.0458),
                    st("Classroom", "PrimarySchool", 0.4793).as_primary(),
                    st("ComputerRoom", "PrimarySchool", 0.0236),
                    st("Corridor", "PrimarySchool", 0.1633).as_circulation(),
                    st("Gym", "PrimarySchool", 0.0520),
                    st("Kitchen", "PrimarySchool", 0.0244),
                    st("Library", "PrimarySchool", 0.0581),
                    st("Lobby", "PrimarySchool", 0.0249),
                    st("Mechanical", "PrimarySchool", 0.0367),
                    st("Office", "PrimarySchool", 0.0642),
                    st("Restroom", "PrimarySchool", 0.0277),
                ],
            )
            .with_space_types(
                "SecondarySchool",
                vec![
                    st("Auditorium", "SecondarySchool", 0.0504).with_story_height(tall),
                    st("Cafeteria", "SecondarySchool", 0.0319),
                    st("Classroom", "SecondarySchool", 0.3041).as_primary(),
                    st("ComputerRoom", "SecondarySchool", 0.0487),
                    st("Corridor", "SecondarySchool", 0.2144).as_circulation(),
                    st("Gym", "SecondarySchool", 0.1646).with_story_height(tall),
                    st("Kitchen", "SecondarySchool", 0.0110),
                    st("Library", "SecondarySchool", 0.0429),
                    st("Lobby", "SecondarySchool", 0.0214),
                    st("Mechanical", "SecondarySchool", 0.0349),
                    st("Office", "SecondarySchool", 0.0543),
                    st("Restroom", "SecondarySchool", 0.0214),
                ],
            )
            .with_space_types(
                "SmallHotel",
                vec![
                    st("Corridor", "SmallHotel", 0.1313).as_circulation(),
                    st("Elec/MechRoom", "SmallHotel", 0.0038),
                    st("ElevatorCore", "SmallHotel", 0.0113),
                    st("Exercise", "SmallHotel", 0.0081),
                    st("GuestLounge", "SmallHotel", 0.0406),
                    st("GuestRoom123Occ", "SmallHotel", 0.4081).as_primary(),
                    st("GuestRoom123Vac", "SmallHotel", 0.2231),
                    st("Laundry", "SmallHotel", 0.0244),
                    st("Mechanical", "SmallHotel", 0.0081),
                    st("Meeting", "SmallHotel", 0.0200),
                    st("Office", "SmallHotel", 0.0325),
                    st("PublicRestroom", "SmallHotel", 0.0081),
                    st("StaffLounge", "SmallHotel", 0.0081),
                    st("Stair", "SmallHotel", 0.0400),
                    st("Storage", "SmallHotel", 0.0325),
                ],
            )
            .with_space_types(
                "Warehouse",
                vec![
                    st("Bulk", "Warehouse", 0.6628).as_primary(),
                    st("Fine", "Warehouse", 0.2882),
                    st("Office", "Warehouse", 0.0490)
                        .with_window_to_wall_ratio(0.71)
                        .with_story_height(ft_to_m(14.)),
                ],
            )
            .with_space_types_for(
                "Warehouse",
                Some("warehouse_bulk100"),
                None,
                vec![st("Bulk", "Warehouse", 1.0).as_primary()],
            )
            .with_space_types(
                "RetailStandalone",
                vec![
                    st("Back_Space", "RetailStandalone", 0.1656),
                    st("Entry", "RetailStandalone", 0.0052),
                    st("Point_of_Sale", "RetailStandalone", 0.0657),
                    st("Retail", "RetailStandalone", 0.7635).as_primary(),
                ],
            )
            .with_space_types(
                "RetailStripmall",
                vec![
                    st("Strip mall - type 1", "RetailStripmall", 0.25),
                    st("Strip mall - type 2", "RetailStripmall", 0.25),
                    st("Strip mall - type 3", "RetailStripmall", 0.50).as_primary(),
                ],
            )
            .with_space_types(
                "QuickServiceRestaurant",
                vec![
                    st("Dining", "QuickServiceRestaurant", 0.5).as_primary(),
                    st("Kitchen", "QuickServiceRestaurant", 0.5),
                ],
            )
            .with_space_types(
                "FullServiceRestaurant",
                vec![
                    st("Dining", "FullServiceRestaurant", 0.7272).as_primary(),
                    st("Kitchen", "FullServiceRestaurant", 0.2728),
                ],
            )
            .with_space_types(
                "MidriseApartment",
                vec![
                    st("Apartment", "MidriseApartment", 0.8727).as_primary(),
                    st("Corridor", "MidriseApartment", 0.0991).as_circulation(),
                    st("Office", "MidriseApartment", 0.0282),
                ],
            )
    }
}

impl SpaceTypeCatalog for StaticCatalog {
    fn space_types(
        &self,
        building_type: &str,
        subtype: Option<&str>,
        standard: &str,
    ) -> Result<Vec<CatalogSpaceType>> {
        let best = self
            .entries
            .iter()
            .filter_map(|e| Some((e.specificity(building_type, subtype, standard)?, e)))
            .max_by_key(|(score, _)| *score);
        Ok(best.map(|(_, e)| e.space_types.clone()).unwrap_or_default())
    }

    fn building_form_defaults(&self, building_type: &str) -> Option<BuildingFormDefaults> {
        self.form_defaults
            .get(building_type)
            .copied()
            .or_else(|| BuildingFormDefaults::prototype(building_type))
    }
}
