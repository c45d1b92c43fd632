//! Party walls and windows on exterior walls.

use crate::diagnostics::{Diagnostics, Stage};
use crate::geom::EPS;
use crate::model::boundary::BoundaryCondition;
use crate::model::building::Building;
use crate::model::facade::{FacadeRatios, Orientation};
use crate::model::surface::SubSurface;
use anyhow::Result;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenestrationSummary {
    pub windows: usize,
    pub party_walls: usize,
}

/// Turns party-wall facades adiabatic and adds one centered window per
/// remaining exterior wall.
///
/// The window-to-wall ratio of a wall is the override of its volume's space
/// type if there is one, else the ratio of the wall's facade.
pub fn fenestrate(
    building: &mut Building,
    ratios: &FacadeRatios,
    overrides: &BTreeMap<String, f64>,
    diag: &mut Diagnostics,
) -> Result<FenestrationSummary> {
    let mut summary = FenestrationSummary::default();
    let north_axis = building.north_axis;
    for v in building.volumes.iter_mut() {
        let party = building.stories[v.story].party_walls;
        let wwr_override = overrides.get(&v.space_type).copied();
        for s in v.surfaces.iter_mut() {
            if !s.boundary.is_exterior() {
                continue;
            }
            let Some(relative) = s.relative_azimuth() else {
                continue;
            };
            let facade =
                Orientation::from_azimuth(relative + v.direction_of_relative_north + north_axis);
            if party.get(facade) {
                s.boundary = BoundaryCondition::Adiabatic;
                s.windows.clear();
                summary.party_walls += 1;
                continue;
            }
            let wwr = wwr_override.unwrap_or_else(|| ratios.get(facade));
            if wwr <= EPS {
                continue;
            }
            let window = s.polygon.scale_about_centroid(wwr.sqrt())?;
            s.windows = vec![SubSurface {
                name: format!("{} Window", s.name),
                polygon: window,
            }];
            summary.windows += 1;
        }
    }
    diag.info(
        Stage::Fenestration,
        format!(
            "{} windows added, {} party walls",
            summary.windows, summary.party_walls
        ),
    );
    Ok(summary)
}

/// Exterior wall and window area per facade orientation, multipliers included.
pub fn facade_areas(building: &Building) -> BTreeMap<Orientation, (f64, f64)> {
    let mut areas: BTreeMap<Orientation, (f64, f64)> = BTreeMap::new();
    for v in building.volumes.iter() {
        let m = v.multiplier as f64;
        for s in v.surfaces.iter().filter(|s| s.boundary.is_exterior()) {
            let Some(relative) = s.relative_azimuth() else {
                continue;
            };
            let facade = Orientation::from_azimuth(
                relative + v.direction_of_relative_north + building.north_axis,
            );
            let entry = areas.entry(facade).or_default();
            entry.0 += s.area() * m;
            entry.1 += s.window_area() * m;
        }
    }
    areas
}
