//! Entry point of the massing pipeline.

use crate::bar::MIN_BAR_SIZE;
use crate::bar::catalog::SpaceTypeCatalog;
use crate::bar::config::MassingConfig;
use crate::bar::deadline::Deadline;
use crate::bar::extrude::extrude_bar;
use crate::bar::fenestration::fenestrate;
use crate::bar::reconcile::reconcile;
use crate::bar::slicer::{SliceRequest, SlicingStrategy};
use crate::bar::spec::ResolvedMassing;
use crate::bar::stories::build_story_stack;
use crate::bar::validate::{ValidationReport, validate_massing};
use crate::diagnostics::Diagnostics;
use crate::model::building::Building;
use anyhow::Result;

/// Massing model with the log of everything that deviated from the request.
#[derive(Debug, Clone)]
pub struct MassingResult {
    pub building: Building,
    pub diagnostics: Diagnostics,
    pub resolved: ResolvedMassing,
    pub validation: ValidationReport,
}

/// Builds a bar massing from `config`.
///
/// Infeasible inputs fail before any geometry is built. Degraded fits and
/// validation findings are returned in `MassingResult::diagnostics` together
/// with a best-effort model.
pub fn create_bar_massing(
    config: &MassingConfig,
    catalog: &dyn SpaceTypeCatalog,
) -> Result<MassingResult> {
    create_bar_massing_with_deadline(config, catalog, &Deadline::none())
}

/// Same as `create_bar_massing`, but the face matching pass gives up with
/// `MassingError::Cancelled` once `deadline` expires.
pub fn create_bar_massing_with_deadline(
    config: &MassingConfig,
    catalog: &dyn SpaceTypeCatalog,
    deadline: &Deadline,
) -> Result<MassingResult> {
    let mut diag = Diagnostics::new();
    let resolved = config.resolve(catalog, &mut diag)?;

    let mut building = Building::new(&resolved.building_name);
    building.north_axis = resolved.building_rotation;
    for (i, bar) in resolved.bars.iter().enumerate() {
        let stories = build_story_stack(bar, i, &mut diag)?;
        let req = SliceRequest {
            footprint: bar.footprint()?,
            stories: &stories,
            space_types: &bar.space_types,
            perimeter_depth: bar.perimeter_zone_depth,
            min_bar_size: MIN_BAR_SIZE,
        };
        let sliced = SlicingStrategy::for_method(bar.division_method).produce(&req, &mut diag)?;
        extrude_bar(&mut building, bar, stories, sliced, &mut diag)?;
    }

    reconcile(
        &mut building,
        resolved.make_mid_story_surfaces_adiabatic,
        deadline,
        &mut diag,
    )?;
    fenestrate(
        &mut building,
        &resolved.window_to_wall,
        &resolved.window_overrides,
        &mut diag,
    )?;
    let validation = validate_massing(&mut building, &resolved, &mut diag);
    building.validate()?;

    tracing::info!(
        building = %building.name,
        stories = building.stories.len(),
        volumes = building.volumes.len(),
        floor_area = building.floor_area(),
        errors = diag.has_errors(),
        "Bar massing created"
    );
    Ok(MassingResult {
        building,
        diagnostics: diag,
        resolved,
        validation,
    })
}
