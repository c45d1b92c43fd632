//! Resolution of a `MassingConfig` into immutable per-bar specifications.
//!
//! Every zero sentinel of the config is replaced here, once, by a building
//! type default; the rest of the pipeline only sees `BarSpec` records.

use crate::bar::MIN_BAR_SIZE;
use crate::bar::catalog::{CatalogSpaceType, DoubleLoadedCorridor, SpaceTypeCatalog};
use crate::bar::config::{DivisionMethod, MassingConfig, SpaceTypeSort, StoryMultiplierMethod};
use crate::bar::decompose::{BarLayout, LayoutRequest, choose_layout};
use crate::bar::dimensions::{self, BarDimensions, positive};
use crate::bar::party_walls::{self, FractionRequest, PartyWallCounts};
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::MassingError;
use crate::geom::TOLERANCE;
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use crate::model::facade::{FacadeFlags, FacadeRatios, Orientation};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slack when filling the secondary bar, m².
const SPLIT_TOLERANCE: f64 = 1e-4;

/// Space type with its absolute area target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceTypeEntry {
    pub name: String,
    pub category: String,
    /// m², all stories of the owning bar together.
    pub target_floor_area: f64,
    pub story_height: Option<f64>,
    pub window_to_wall_ratio: Option<f64>,
    pub double_loaded_corridor: Option<DoubleLoadedCorridor>,
}

impl SpaceTypeEntry {
    pub fn new(name: &str, category: &str, target_floor_area: f64) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            target_floor_area,
            story_height: None,
            window_to_wall_ratio: None,
            double_loaded_corridor: None,
        }
    }

    /// Space types the entry places, with their share of its area.
    ///
    /// A double-loaded corridor expands into its corridor and occupied types.
    pub fn leaf_shares(&self) -> Vec<(String, f64)> {
        match &self.double_loaded_corridor {
            Some(dlc) => {
                let core = dlc.core_fraction();
                vec![
                    (dlc.core_category.clone(), core),
                    (dlc.perimeter_category.clone(), 1. - core),
                ]
            }
            None => vec![(self.name.clone(), 1.)],
        }
    }

    fn with_area(&self, area: f64) -> Self {
        Self {
            target_floor_area: area,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarRole {
    Primary,
    Secondary,
    /// One-story bar holding the space types with a non-typical story height.
    CustomHeight,
}

/// Everything needed to build one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSpec {
    pub name: String,
    pub role: BarRole,
    /// Extent along X, m.
    pub length: f64,
    /// Extent along Y, m.
    pub width: f64,
    pub floor_height: f64,
    pub num_stories_above_grade: f64,
    pub num_stories_below_grade: u32,
    pub center: Point,
    /// Slicing order.
    pub space_types: Vec<SpaceTypeEntry>,
    pub story_multiplier_method: StoryMultiplierMethod,
    pub division_method: DivisionMethod,
    pub make_mid_story_surfaces_adiabatic: bool,
    /// One entry per modeled floor, lowest first.
    pub party_walls: Vec<FacadeFlags>,
    pub bottom_story_ground_exposed: bool,
    pub top_story_roof_exposed: bool,
    /// Multiplier forced on every story of the bar.
    pub multiplier_override: Option<u32>,
    pub perimeter_zone_depth: f64,
    pub window_to_wall: FacadeRatios,
}

impl BarSpec {
    pub fn footprint(&self) -> Result<Rect> {
        Rect::centered(self.center, self.length, self.width)
    }

    /// Number of floors including a partial top floor.
    pub fn num_floors(&self) -> usize {
        (self.num_stories_above_grade + self.num_stories_below_grade as f64).ceil() as usize
    }

    pub fn target_area(&self) -> f64 {
        self.space_types.iter().map(|s| s.target_floor_area).sum()
    }

    /// Footprint area scale of the top floor.
    pub fn top_area_scale(&self) -> f64 {
        let above = self.num_stories_above_grade;
        1. - above.ceil() + above
    }
}

/// Where the party walls came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PartyWallSource {
    None,
    Counts {
        north: u32,
        east: u32,
        south: u32,
        west: u32,
    },
    Fraction(f64),
}

impl PartyWallSource {
    pub fn is_none(&self) -> bool {
        matches!(self, PartyWallSource::None)
    }
}

/// Resolved building-wide values plus one `BarSpec` per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMassing {
    pub building_name: String,
    /// Degrees, clockwise.
    pub building_rotation: f64,
    pub bars: Vec<BarSpec>,
    pub layout: BarLayout,
    /// Rectangle with the footprint area and the requested aspect ratio.
    pub min_rectangle: BarDimensions,
    pub aspect_ratio: f64,
    pub perimeter_multiplier: f64,
    pub floor_height: f64,
    pub num_stories_above_grade: f64,
    pub num_stories_below_grade: u32,
    pub total_floor_area: f64,
    pub fixed_width: Option<f64>,
    /// Floor area per placed space type, m².
    pub target_areas: BTreeMap<String, f64>,
    /// Window-to-wall ratio overrides per placed space type.
    pub window_overrides: BTreeMap<String, f64>,
    pub window_to_wall: FacadeRatios,
    pub division_method: DivisionMethod,
    pub party_walls: PartyWallSource,
    pub make_mid_story_surfaces_adiabatic: bool,
}

impl ResolvedMassing {
    pub fn has_custom_height_bar(&self) -> bool {
        self.bars.iter().any(|b| b.role == BarRole::CustomHeight)
    }

    pub fn has_partial_top(&self) -> bool {
        self.num_stories_above_grade.fract() > 0.
    }
}

/// Massing values taken from the config or the building type defaults.
#[derive(Debug, Clone, Copy)]
struct Form {
    aspect_ratio: f64,
    floor_height: f64,
    floor_height_defaulted: bool,
    window_to_wall_ratio: f64,
    perimeter_multiplier: f64,
}

impl MassingConfig {
    /// Validates the config and resolves it against the catalog.
    pub fn resolve(
        &self,
        catalog: &dyn SpaceTypeCatalog,
        diag: &mut Diagnostics,
    ) -> Result<ResolvedMassing> {
        self.validate_inputs()?;
        let form = self.form(catalog, diag)?;
        let above = self.num_stories_above_grade;
        let below = self.num_stories_below_grade;
        let num_stories = above + below as f64;

        let mut use_custom_height = self.custom_height_bar && form.floor_height_defaulted;
        let total_area = if self.single_floor_area > 0. {
            let total = self.single_floor_area * num_stories;
            diag.info(
                Stage::Config,
                format!("Total floor area {total:.1} m² derived from the single floor area"),
            );
            if use_custom_height {
                diag.warn(
                    Stage::Config,
                    "Custom-height bar disabled because a single floor area is given",
                );
                use_custom_height = false;
            }
            total
        } else {
            self.total_floor_area
        };

        let mut entries = self.space_type_mix(catalog, total_area, diag)?;
        let mut custom = Vec::new();
        if use_custom_height {
            custom = take_custom_height(&mut entries, form.floor_height);
            if entries.is_empty() {
                diag.warn(
                    Stage::Config,
                    "All space types have a custom story height; they stay in the main bar",
                );
                entries = std::mem::take(&mut custom);
            }
        }
        sort_space_types(&mut entries, self.space_type_sort);
        sort_space_types(&mut custom, self.space_type_sort);

        let mut target_areas: BTreeMap<String, f64> = BTreeMap::new();
        let mut window_overrides: BTreeMap<String, f64> = BTreeMap::new();
        for e in entries.iter().chain(custom.iter()) {
            for (leaf, share) in e.leaf_shares() {
                *target_areas.entry(leaf.clone()).or_default() += e.target_floor_area * share;
                if let Some(wwr) = e.window_to_wall_ratio {
                    if window_overrides.insert(leaf.clone(), wwr).is_none() {
                        diag.info(
                            Stage::Config,
                            format!("Window-to-wall ratio {wwr} used for space type {leaf}"),
                        );
                    }
                }
            }
        }

        let custom_area: f64 = custom.iter().map(|e| e.target_floor_area).sum();
        let footprint = (total_area - custom_area) / num_stories;
        positive("footprint area", footprint)?;

        let fixed_width = (self.fixed_bar_width > 0.).then_some(self.fixed_bar_width);
        let layout = choose_layout(
            &LayoutRequest {
                footprint,
                aspect_ratio: form.aspect_ratio,
                perimeter_multiplier: form.perimeter_multiplier,
                fixed_width,
                min_bar_size: MIN_BAR_SIZE,
                allow_dual: self.division_method == DivisionMethod::PerStorySliced,
            },
            diag,
        )?;
        let min_rectangle = dimensions::rectangle(footprint, form.aspect_ratio)?;
        if form.perimeter_multiplier > 1. && custom_area > 0. {
            diag.warn(
                Stage::Dimensions,
                "Perimeter multiplier does not account for the custom-height bar",
            );
        }

        let party_walls = self.party_wall_source(diag);
        let window_to_wall = FacadeRatios::uniform(form.window_to_wall_ratio);
        let offset = self.separation(num_stories, form.floor_height, diag);
        let n_floors = num_stories.ceil() as usize;

        let template = BarSpec {
            name: String::new(),
            role: BarRole::Primary,
            length: 0.,
            width: 0.,
            floor_height: form.floor_height,
            num_stories_above_grade: above,
            num_stories_below_grade: below,
            center: Point::new(0., 0., 0.),
            space_types: Vec::new(),
            story_multiplier_method: self.story_multiplier_method,
            division_method: self.division_method,
            make_mid_story_surfaces_adiabatic: self.make_mid_story_surfaces_adiabatic,
            party_walls: vec![FacadeFlags::none(); n_floors],
            bottom_story_ground_exposed: self.bottom_story_ground_exposed,
            top_story_roof_exposed: self.top_story_roof_exposed,
            multiplier_override: None,
            perimeter_zone_depth: self.perimeter_zone_depth,
            window_to_wall,
        };

        let primary = layout.primary();
        let (primary_types, secondary_types) = match layout.secondary() {
            Some(secondary) => split_between_bars(entries, secondary.area() * num_stories),
            None => (entries, Vec::new()),
        };

        let mut bars = vec![BarSpec {
            name: "Primary Bar".to_string(),
            length: primary.length,
            width: primary.width,
            space_types: primary_types,
            party_walls: self.party_wall_flags(party_walls, primary, form.floor_height, n_floors),
            ..template.clone()
        }];

        if let Some(secondary) = layout.secondary() {
            let mut flags = self.party_wall_flags(party_walls, secondary, form.floor_height, n_floors);
            if matches!(layout, BarLayout::DualBarAdiabaticEnds { .. }) {
                // Ends of the secondary bar, north and south before rotation
                let ends = [0., 180.].map(|az| Orientation::from_azimuth(az + self.building_rotation));
                for f in flags.iter_mut() {
                    for o in ends {
                        f.set(o, true);
                    }
                }
            }
            bars.push(BarSpec {
                name: "Secondary Bar".to_string(),
                role: BarRole::Secondary,
                length: secondary.length,
                width: secondary.width,
                center: Point::new(
                    0.5 * (primary.length + secondary.length) + offset,
                    0.5 * (primary.width + secondary.width) + offset,
                    0.,
                ),
                space_types: secondary_types,
                party_walls: flags,
                ..template.clone()
            });
        }

        if !custom.is_empty() {
            let dims = match fixed_width {
                Some(w) => dimensions::with_fixed_width(custom_area, w, MIN_BAR_SIZE)?.0,
                None => dimensions::rectangle(custom_area, form.aspect_ratio)?,
            };
            let height = custom
                .iter()
                .filter_map(|e| e.story_height)
                .fold(form.floor_height, f64::max);
            if !party_walls.is_none() {
                diag.warn(
                    Stage::Config,
                    "Party walls are not applied to the custom-height bar",
                );
            }
            diag.info(
                Stage::Config,
                format!(
                    "{} space types with a custom story height placed in a one-story bar of height {height:.2} m",
                    custom.len()
                ),
            );
            bars.push(BarSpec {
                name: "Custom Height Bar".to_string(),
                role: BarRole::CustomHeight,
                length: dims.length,
                width: dims.width,
                floor_height: height,
                num_stories_above_grade: 1.,
                num_stories_below_grade: 0,
                center: Point::new(-0.5 * (primary.length + dims.length) - offset, 0., 0.),
                space_types: custom,
                party_walls: vec![FacadeFlags::none()],
                multiplier_override: Some(1),
                ..template.clone()
            });
        }

        tracing::debug!(
            layout = layout.label(),
            bars = bars.len(),
            footprint,
            "Massing resolved"
        );

        Ok(ResolvedMassing {
            building_name: self.building_name.clone(),
            building_rotation: self.building_rotation,
            bars,
            layout,
            min_rectangle,
            aspect_ratio: form.aspect_ratio,
            perimeter_multiplier: form.perimeter_multiplier,
            floor_height: form.floor_height,
            num_stories_above_grade: above,
            num_stories_below_grade: below,
            total_floor_area: total_area,
            fixed_width,
            target_areas,
            window_overrides,
            window_to_wall,
            division_method: self.division_method,
            party_walls,
            make_mid_story_surfaces_adiabatic: self.make_mid_story_surfaces_adiabatic,
        })
    }

    fn validate_inputs(&self) -> Result<()> {
        if self.single_floor_area < 0. {
            return Err(MassingError::NegativeValue {
                what: "single floor area",
                value: self.single_floor_area,
            }
            .into());
        }
        if self.single_floor_area == 0. {
            positive("total floor area", self.total_floor_area)?;
        }
        positive("stories above grade", self.num_stories_above_grade)?;
        positive("perimeter zone depth", self.perimeter_zone_depth)?;
        for (what, value) in [
            ("floor height", self.floor_height),
            ("aspect ratio", self.aspect_ratio),
            ("fixed bar width", self.fixed_bar_width),
        ] {
            if value < 0. || value.is_nan() {
                return Err(MassingError::NegativeValue { what, value }.into());
            }
        }
        let pm = self.perimeter_multiplier;
        if pm != 0. && !(pm >= 1.) {
            return Err(MassingError::PerimeterMultiplierBelowOne(pm).into());
        }
        let wwr = self.window_to_wall_ratio;
        if !(0. ..1.).contains(&wwr) {
            return Err(MassingError::WindowToWallRatioOutOfRange(wwr).into());
        }
        let f = self.party_wall_fraction;
        if !(0. ..1.).contains(&f) {
            return Err(MassingError::FractionOutOfRange {
                what: "party wall fraction",
                value: f,
            }
            .into());
        }
        for st in self.space_types.iter() {
            if st.fraction < 0. {
                return Err(MassingError::NegativeValue {
                    what: "space type fraction",
                    value: st.fraction,
                }
                .into());
            }
            if let Some(wwr) = st.window_to_wall_ratio {
                if !(0. ..1.).contains(&wwr) {
                    return Err(MassingError::WindowToWallRatioOutOfRange(wwr).into());
                }
            }
        }
        Ok(())
    }

    fn form(&self, catalog: &dyn SpaceTypeCatalog, diag: &mut Diagnostics) -> Result<Form> {
        let defaults = catalog.building_form_defaults(&self.building_type);
        let bt = &self.building_type;
        let mut pick = |value: f64, default: Option<f64>, what: &str| -> Result<f64> {
            if value > 0. {
                return Ok(value);
            }
            match default {
                Some(d) => {
                    diag.info(Stage::Config, format!("{what} defaulted to {d:.3} for {bt}"));
                    Ok(d)
                }
                None => Err(MassingError::UnknownBuildingType(bt.clone()).into()),
            }
        };
        let aspect_ratio = pick(
            self.aspect_ratio,
            defaults.map(|d| d.aspect_ratio),
            "Aspect ratio",
        )?;
        let floor_height = pick(
            self.floor_height,
            defaults.map(|d| d.typical_story_height),
            "Floor height",
        )?;
        let window_to_wall_ratio = if self.window_to_wall_ratio > 0. {
            self.window_to_wall_ratio
        } else {
            pick(0., Some(defaults.map_or(0., |d| d.window_to_wall_ratio)), "Window-to-wall ratio")?
        };
        let perimeter_multiplier = if self.perimeter_multiplier > 0. {
            self.perimeter_multiplier
        } else {
            defaults.and_then(|d| d.perimeter_multiplier).unwrap_or(1.)
        };
        Ok(Form {
            aspect_ratio,
            floor_height,
            floor_height_defaulted: self.floor_height == 0.,
            window_to_wall_ratio,
            perimeter_multiplier,
        })
    }

    /// Space types with absolute area targets, unsorted.
    fn space_type_mix(
        &self,
        catalog: &dyn SpaceTypeCatalog,
        total_area: f64,
        diag: &mut Diagnostics,
    ) -> Result<Vec<SpaceTypeEntry>> {
        let mut entries: Vec<SpaceTypeEntry> = Vec::new();
        let catalog_wwr = self.window_to_wall_ratio == 0.;

        if !self.space_types.is_empty() {
            let sum: f64 = self.space_types.iter().map(|s| s.fraction).sum();
            if !(sum > 0.) {
                return Err(MassingError::FractionsSumNonPositive(sum).into());
            }
            let known = catalog.space_types(
                &self.building_type,
                self.building_subtype.as_deref(),
                &self.template,
            )?;
            for st in self.space_types.iter().filter(|s| s.fraction > 0.) {
                let meta = known.iter().find(|c| c.name == st.name);
                let category = st
                    .category
                    .clone()
                    .or_else(|| meta.map(|m| m.category.clone()))
                    .unwrap_or_else(|| self.building_type.clone());
                let entry = SpaceTypeEntry {
                    story_height: st.story_height.or(meta.and_then(|m| m.story_height)),
                    window_to_wall_ratio: st.window_to_wall_ratio.or(if catalog_wwr {
                        meta.and_then(|m| m.window_to_wall_ratio)
                    } else {
                        None
                    }),
                    double_loaded_corridor: st
                        .double_loaded_corridor
                        .clone()
                        .or_else(|| meta.and_then(|m| m.double_loaded_corridor.clone())),
                    ..SpaceTypeEntry::new(&st.name, &category, total_area * st.fraction / sum)
                };
                push_or_merge(&mut entries, entry);
            }
            return Ok(entries);
        }

        let additional: f64 = self
            .additional_building_types
            .iter()
            .map(|b| b.fraction)
            .sum();
        let main_share = 1. - additional;
        if !(main_share > 0.) {
            return Err(MassingError::FractionsSumNonPositive(main_share).into());
        }
        let mut shares = vec![(
            self.building_type.as_str(),
            self.building_subtype.as_deref(),
            main_share,
        )];
        shares.extend(
            self.additional_building_types
                .iter()
                .filter(|b| b.fraction > 0.)
                .map(|b| (b.building_type.as_str(), b.subtype.as_deref(), b.fraction)),
        );
        let several = shares.len() > 1;

        for (bt, subtype, share) in shares {
            let types: Vec<CatalogSpaceType> = catalog
                .space_types(bt, subtype, &self.template)?
                .into_iter()
                .filter(|t| t.area_ratio > 0.)
                .collect();
            if types.is_empty() {
                return Err(MassingError::NoSpaceTypes(bt.to_string()).into());
            }
            let ratio_sum: f64 = types.iter().map(|t| t.area_ratio).sum();
            let area_of = |ratio: f64| total_area * share * ratio / ratio_sum;
            let corridor = if self.double_loaded_corridor {
                corridor_pair(&types)
            } else {
                None
            };

            for (i, t) in types.iter().enumerate() {
                if corridor.is_some_and(|(p, c)| i == p || i == c) {
                    continue;
                }
                let entry = SpaceTypeEntry {
                    story_height: t.story_height,
                    window_to_wall_ratio: t.window_to_wall_ratio.filter(|_| catalog_wwr),
                    double_loaded_corridor: t.double_loaded_corridor.clone(),
                    ..SpaceTypeEntry::new(&t.name, &t.category, area_of(t.area_ratio))
                };
                push_or_merge(&mut entries, entry);
            }

            if let Some((p, c)) = corridor {
                let (occupied, hall) = (&types[p], &types[c]);
                let name = if several {
                    format!("{bt} Double Loaded Corridor")
                } else {
                    "Double Loaded Corridor".to_string()
                };
                diag.info(
                    Stage::Config,
                    format!("{} and {} combined into {name}", occupied.name, hall.name),
                );
                let entry = SpaceTypeEntry {
                    window_to_wall_ratio: occupied.window_to_wall_ratio.filter(|_| catalog_wwr),
                    double_loaded_corridor: Some(DoubleLoadedCorridor {
                        core_ratio: hall.area_ratio,
                        perimeter_ratio: occupied.area_ratio,
                        core_category: hall.name.clone(),
                        perimeter_category: occupied.name.clone(),
                    }),
                    ..SpaceTypeEntry::new(&name, bt, area_of(occupied.area_ratio + hall.area_ratio))
                };
                push_or_merge(&mut entries, entry);
            }
        }
        Ok(entries)
    }

    fn party_wall_source(&self, diag: &mut Diagnostics) -> PartyWallSource {
        if self.has_party_wall_stories() {
            if self.party_wall_fraction > 0. {
                diag.warn(
                    Stage::Config,
                    "Both party wall story counts and a party wall fraction are given; the fraction is ignored",
                );
            }
            PartyWallSource::Counts {
                north: self.party_wall_stories_north,
                east: self.party_wall_stories_east,
                south: self.party_wall_stories_south,
                west: self.party_wall_stories_west,
            }
        } else if self.party_wall_fraction > 0. {
            PartyWallSource::Fraction(self.party_wall_fraction)
        } else {
            PartyWallSource::None
        }
    }

    fn party_wall_flags(
        &self,
        source: PartyWallSource,
        dims: BarDimensions,
        floor_height: f64,
        n_floors: usize,
    ) -> Vec<FacadeFlags> {
        match source {
            PartyWallSource::None => vec![FacadeFlags::none(); n_floors],
            PartyWallSource::Counts {
                north,
                east,
                south,
                west,
            } => party_walls::from_counts(
                PartyWallCounts {
                    north,
                    east,
                    south,
                    west,
                },
                n_floors,
                self.num_stories_below_grade,
            ),
            PartyWallSource::Fraction(fraction) => party_walls::from_fraction(&FractionRequest {
                length: dims.length,
                width: dims.width,
                floor_height,
                above_grade: self.num_stories_above_grade,
                below_grade: self.num_stories_below_grade,
                fraction,
                rotation: self.building_rotation,
            }),
        }
    }

    /// Gap between detached bars.
    fn separation(&self, num_stories: f64, floor_height: f64, diag: &mut Diagnostics) -> f64 {
        let mult = if self.bar_separation_multiplier > 0. {
            self.bar_separation_multiplier
        } else {
            diag.warn(
                Stage::Config,
                format!(
                    "Bar separation multiplier must be positive, got {}; using 0.1",
                    self.bar_separation_multiplier
                ),
            );
            0.1
        };
        num_stories.ceil() * floor_height * mult
    }
}

fn push_or_merge(entries: &mut Vec<SpaceTypeEntry>, entry: SpaceTypeEntry) {
    match entries.iter_mut().find(|e| e.name == entry.name) {
        Some(e) => e.target_floor_area += entry.target_floor_area,
        None => entries.push(entry),
    }
}

/// Indices of the last primary and the first circulation space type.
fn corridor_pair(types: &[CatalogSpaceType]) -> Option<(usize, usize)> {
    let primary = types.iter().rposition(|t| t.primary)?;
    let circulation = types.iter().position(|t| t.circulation)?;
    (primary != circulation).then_some((primary, circulation))
}

/// Removes the space types whose story height differs from `typical`.
fn take_custom_height(entries: &mut Vec<SpaceTypeEntry>, typical: f64) -> Vec<SpaceTypeEntry> {
    let (custom, typical_types): (Vec<_>, Vec<_>) = std::mem::take(entries)
        .into_iter()
        .partition(|e| e.story_height.is_some_and(|h| (h - typical).abs() > TOLERANCE));
    *entries = typical_types;
    custom
}

pub fn sort_space_types(entries: &mut [SpaceTypeEntry], sort: SpaceTypeSort) {
    let by_size = |a: &SpaceTypeEntry, b: &SpaceTypeEntry| {
        b.target_floor_area
            .total_cmp(&a.target_floor_area)
            .then_with(|| a.name.cmp(&b.name))
    };
    match sort {
        SpaceTypeSort::Size => entries.sort_by(by_size),
        SpaceTypeSort::CategoryThenSize => {
            let mut totals: BTreeMap<String, f64> = BTreeMap::new();
            for e in entries.iter() {
                *totals.entry(e.category.clone()).or_default() += e.target_floor_area;
            }
            let total = |c: &str| totals.get(c).copied().unwrap_or(0.);
            entries.sort_by(|a, b| {
                total(&b.category)
                    .total_cmp(&total(&a.category))
                    .then_with(|| a.category.cmp(&b.category))
                    .then_with(|| by_size(a, b))
            });
        }
    }
}

/// Fills the secondary bar's capacity with space types in slicing order.
/// The space type that straddles the capacity is split between the bars.
fn split_between_bars(
    entries: Vec<SpaceTypeEntry>,
    secondary_capacity: f64,
) -> (Vec<SpaceTypeEntry>, Vec<SpaceTypeEntry>) {
    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    let mut room = secondary_capacity;
    for e in entries {
        let area = e.target_floor_area;
        if room <= SPLIT_TOLERANCE {
            primary.push(e);
        } else if area <= room + SPLIT_TOLERANCE {
            room -= area;
            secondary.push(e);
        } else {
            secondary.push(e.with_area(room));
            primary.push(e.with_area(area - room));
            room = 0.;
        }
    }
    (primary, secondary)
}
