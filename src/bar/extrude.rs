//! Extrusion of sliced footprints into zone volumes.

use crate::bar::slicer::{FootprintPiece, SlicedBar};
use crate::bar::spec::BarSpec;
use crate::diagnostics::{Diagnostics, Stage};
use crate::geom::polygon::Polygon;
use crate::model::boundary::BoundaryCondition;
use crate::model::building::{BarSummary, Building};
use crate::model::story::StoryDescriptor;
use crate::model::surface::{Surface, SurfaceKind};
use crate::model::volume::ZoneVolume;
use anyhow::{Result, anyhow};

/// Adds the bar, its stories and one volume per footprint piece to `building`.
///
/// `stories` and `sliced.stories` are parallel, lowest story first. Walls and
/// roofs start out `Exterior`, the floor of the bar's lowest story `Ground`;
/// reconciliation refines them.
pub fn extrude_bar(
    building: &mut Building,
    bar: &BarSpec,
    stories: Vec<StoryDescriptor>,
    sliced: SlicedBar,
    diag: &mut Diagnostics,
) -> Result<()> {
    if stories.len() != sliced.stories.len() {
        return Err(anyhow!(
            "{}: {} stories but {} sliced floor plans",
            bar.name,
            stories.len(),
            sliced.stories.len()
        ));
    }
    let bar_index = building.bars.len();
    building.bars.push(BarSummary {
        name: bar.name.clone(),
        length: bar.length,
        width: bar.width,
        center: bar.center,
        floor_height: bar.floor_height,
    });

    let mut count = 0;
    for (k, (mut story, pieces)) in stories.into_iter().zip(sliced.stories).enumerate() {
        story.bar = bar_index;
        if story.is_partial() {
            building.partial_top_story = Some(story.area_scale);
        }
        let story_index = building.stories.len();
        for (n, piece) in pieces.iter().enumerate() {
            let mut volume = extrude_piece(piece, &story, n + 1, k == 0)?;
            volume.story = story_index;
            building.volumes.push(volume);
            count += 1;
        }
        building.stories.push(story);
    }
    diag.info(
        Stage::Extrusion,
        format!("{}: {count} zone volumes extruded", bar.name),
    );
    Ok(())
}

/// Extrudes one piece over the story height.
fn extrude_piece(
    piece: &FootprintPiece,
    story: &StoryDescriptor,
    number: usize,
    lowest: bool,
) -> Result<ZoneVolume> {
    let name = format!(
        "{} Space {number} - {} {}",
        story.id, piece.space_type, piece.exposure
    );
    let z0 = story.vertical_origin;
    let z1 = story.top();
    let plan = piece.rect.to_polygon(z0)?;

    let floor_bc = if lowest {
        BoundaryCondition::Ground
    } else {
        BoundaryCondition::Exterior
    };
    let mut surfaces = vec![Surface::new(
        format!("{name} Floor"),
        SurfaceKind::Floor,
        plan.flip(),
        floor_bc,
    )];
    for (i, (p, q)) in plan.edges().enumerate() {
        let wall = Polygon::new(vec![p, q, q.with_z(z1), p.with_z(z1)])?;
        surfaces.push(Surface::new(
            format!("{name} Wall {}", i + 1),
            SurfaceKind::Wall,
            wall,
            BoundaryCondition::Exterior,
        ));
    }
    surfaces.push(Surface::new(
        format!("{name} Roof"),
        SurfaceKind::RoofCeiling,
        piece.rect.to_polygon(z1)?,
        BoundaryCondition::Exterior,
    ));

    Ok(ZoneVolume {
        hvac_zone: format!("{} {} {}", story.id, piece.space_type, piece.exposure),
        name,
        space_type: piece.space_type.clone(),
        story: 0,
        multiplier: story.multiplier,
        exposure: piece.exposure,
        direction_of_relative_north: 0.,
        surfaces,
    })
}
