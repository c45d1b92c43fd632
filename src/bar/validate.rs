//! Post-build checks of the massing against its targets.

use crate::bar::FLOOR_AREA_TOLERANCE;
use crate::bar::config::DivisionMethod;
use crate::bar::fenestration::facade_areas;
use crate::bar::party_walls::realized_fraction;
use crate::bar::spec::{PartyWallSource, ResolvedMassing};
use crate::diagnostics::{Diagnostics, Stage};
use crate::model::boundary::BoundaryCondition;
use crate::model::building::Building;
use crate::model::facade::Orientation;
use crate::model::surface::SurfaceKind;
use crate::units::{M_PER_FT, m2_to_ft2};

/// Tolerance of the facade area check, 0.1 ft².
const FACADE_AREA_TOLERANCE: f64 = 0.1 * M_PER_FT * M_PER_FT;

/// Slack of the ground and roof area check, m².
const FOOTPRINT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValidationReport {
    pub floor_areas_match: bool,
    /// `None` if the facade check does not apply.
    pub facade_areas_match: Option<bool>,
    pub party_wall_fraction: Option<f64>,
    /// Floors and roofs set adiabatic by the footprint repair.
    pub repaired_surfaces: usize,
    pub footprint_ok: bool,
}

/// Runs all checks. Findings go to `diag`; only the footprint repair changes
/// the building.
pub fn validate_massing(
    building: &mut Building,
    resolved: &ResolvedMassing,
    diag: &mut Diagnostics,
) -> ValidationReport {
    let floor_areas_match = check_floor_areas(building, resolved, diag);
    let party_wall_fraction = match resolved.party_walls {
        PartyWallSource::Fraction(target) => {
            let realized = party_wall_share(building);
            diag.info(
                Stage::Validation,
                format!("Target party wall fraction is {target}, realized fraction is {realized:.2}"),
            );
            Some(realized)
        }
        _ => None,
    };
    let facade_areas_match = check_facade_areas(building, resolved, diag);
    let (repaired_surfaces, footprint_ok) = check_footprint(building, diag);
    ValidationReport {
        floor_areas_match,
        facade_areas_match,
        party_wall_fraction,
        repaired_surfaces,
        footprint_ok,
    }
}

fn check_floor_areas(building: &Building, resolved: &ResolvedMassing, diag: &mut Diagnostics) -> bool {
    let realized = building.space_type_areas();
    let lenient = resolved.division_method == DivisionMethod::SingleSpaceType;
    let mut ok = true;
    let names = resolved.target_areas.keys().chain(realized.keys().filter(|k| !resolved.target_areas.contains_key(*k)));
    for name in names {
        let target = resolved.target_areas.get(name).copied().unwrap_or(0.);
        let actual = realized.get(name).copied().unwrap_or(0.);
        if (actual - target).abs() < FLOOR_AREA_TOLERANCE {
            continue;
        }
        let msg = format!(
            "{name} doesn't have the expected floor area (actual {:.0} ft², target {:.0} ft²)",
            m2_to_ft2(actual),
            m2_to_ft2(target)
        );
        if lenient {
            diag.warn(Stage::Validation, msg);
        } else {
            diag.error(Stage::Validation, msg);
            ok = false;
        }
    }
    if !ok {
        let target: f64 = resolved.target_areas.values().sum();
        diag.error(
            Stage::Validation,
            format!(
                "Sum of actual floor area is {:.0} ft², sum of target floor area is {:.0} ft²",
                m2_to_ft2(building.floor_area()),
                m2_to_ft2(target)
            ),
        );
    }
    ok
}

/// Adiabatic share of all exterior and adiabatic wall area.
fn party_wall_share(building: &Building) -> f64 {
    let mut party = 0.;
    let mut exterior = 0.;
    for v in building.volumes.iter() {
        let m = v.multiplier as f64;
        for s in v.surfaces_of(SurfaceKind::Wall) {
            match s.boundary {
                BoundaryCondition::Adiabatic => party += s.area() * m,
                BoundaryCondition::Exterior => exterior += s.area() * m,
                _ => {}
            }
        }
    }
    realized_fraction(party, exterior)
}

/// Compares N/S and E/W exterior wall area with `2 · side · pm · stories · h`.
fn check_facade_areas(
    building: &Building,
    resolved: &ResolvedMassing,
    diag: &mut Diagnostics,
) -> Option<bool> {
    let skip = if !resolved.party_walls.is_none() {
        Some("party walls are applied")
    } else if resolved.has_partial_top() {
        Some("a partial top story is used")
    } else if resolved.layout.is_stretched() {
        Some("a single stretched bar has to be used to meet the perimeter multiplier")
    } else if resolved.has_custom_height_bar() {
        Some("a dedicated bar is added for space types with custom heights")
    } else if resolved.fixed_width.is_some() {
        Some("a fixed bar width is defined")
    } else {
        None
    };
    if let Some(reason) = skip {
        diag.info(
            Stage::Validation,
            format!("Facade area by orientation not validated when {reason}"),
        );
        return None;
    }

    let areas = facade_areas(building);
    let wall = |o: Orientation| areas.get(&o).map_or(0., |a| a.0);
    let ns = wall(Orientation::North) + wall(Orientation::South);
    let ew = wall(Orientation::East) + wall(Orientation::West);

    let dims = resolved.min_rectangle;
    let scale = 2. * resolved.perimeter_multiplier * resolved.num_stories_above_grade * resolved.floor_height;
    let mirrored = matches!(
        Orientation::from_azimuth(resolved.building_rotation),
        Orientation::East | Orientation::West
    );
    let (ns_target, ew_target) = if mirrored {
        (scale * dims.width, scale * dims.length)
    } else {
        (scale * dims.length, scale * dims.width)
    };
    let tol = FACADE_AREA_TOLERANCE.max(1e-6 * (ns_target + ew_target));

    let mut ok = true;
    for (label, actual, target) in [("North/South", ns, ns_target), ("East/West", ew, ew_target)] {
        if (actual - target).abs() > tol {
            diag.error(
                Stage::Validation,
                format!(
                    "{label} walls don't have the expected area (actual {:.4} ft², target {:.4} ft²)",
                    m2_to_ft2(actual),
                    m2_to_ft2(target)
                ),
            );
            ok = false;
        }
    }
    Some(ok)
}

/// Ground and roof area must not exceed the footprint. Repairs ground floors
/// above and exterior roofs below the ends of each bar first.
fn check_footprint(building: &mut Building, diag: &mut Diagnostics) -> (usize, bool) {
    let footprint: f64 = building.bars.iter().map(|b| b.length * b.width).sum();
    let exceeded = |b: &Building| {
        let (ground, roof) = exposed_areas(b);
        (ground > footprint + FOOTPRINT_TOLERANCE, roof > footprint + FOOTPRINT_TOLERANCE)
    };
    if exceeded(building) == (false, false) {
        return (0, true);
    }

    let mut inner: Vec<(bool, bool)> = vec![(false, false); building.stories.len()];
    for bar in 0..building.bars.len() {
        let order = building.bar_stories(bar);
        for (k, &si) in order.iter().enumerate() {
            inner[si] = (k > 0, k + 1 < order.len());
        }
    }
    let mut repaired = 0;
    for v in building.volumes.iter_mut() {
        let (not_lowest, not_highest) = inner[v.story];
        for s in v.surfaces.iter_mut() {
            let fix = match (s.kind, s.boundary) {
                (SurfaceKind::Floor, BoundaryCondition::Ground) => not_lowest,
                (SurfaceKind::RoofCeiling, BoundaryCondition::Exterior) => not_highest,
                _ => false,
            };
            if fix {
                s.boundary = BoundaryCondition::Adiabatic;
                repaired += 1;
            }
        }
    }
    diag.warn(
        Stage::Validation,
        format!("Ground or roof area exceeded the footprint; {repaired} surfaces set to adiabatic"),
    );

    let (ground_over, roof_over) = exceeded(building);
    let (ground, roof) = exposed_areas(building);
    if ground_over {
        diag.error(
            Stage::Validation,
            format!("Ground area {ground:.2} m² exceeds the footprint {footprint:.2} m²"),
        );
    }
    if roof_over {
        diag.error(
            Stage::Validation,
            format!("Roof area {roof:.2} m² exceeds the footprint {footprint:.2} m²"),
        );
    }
    (repaired, !ground_over && !roof_over)
}

/// Ground-contact floor area and exterior roof area, multipliers included.
fn exposed_areas(building: &Building) -> (f64, f64) {
    let mut ground = 0.;
    let mut roof = 0.;
    for v in building.volumes.iter() {
        let m = v.multiplier as f64;
        for s in v.surfaces.iter() {
            match (s.kind, s.boundary) {
                (SurfaceKind::Floor, BoundaryCondition::Ground) => ground += s.area() * m,
                (SurfaceKind::RoofCeiling, BoundaryCondition::Exterior) => roof += s.area() * m,
                _ => {}
            }
        }
    }
    (ground, roof)
}
