//! Matching of coincident faces between zone volumes and boundary-condition
//! assignment.
//!
//! Faces of different volumes that lie in the same plane and face each other
//! are cut so that every overlap becomes one face on each side; the pair is
//! then linked as `InteriorShared`. The search runs in parallel over an
//! immutable snapshot, the cuts and links are written in one serial pass.

use crate::bar::deadline::Deadline;
use crate::diagnostics::{Diagnostics, Stage};
use crate::geom::TOLERANCE;
use crate::geom::bboxes::are_bboxes_overlapping;
use crate::geom::plane_rect::{Axis3, PlaneRect, Span};
use crate::geom::point::Point;
use crate::model::boundary::{BoundaryCondition, SurfaceRef};
use crate::model::building::Building;
use crate::model::story::StoryRole;
use crate::model::surface::{Surface, SurfaceKind};
use anyhow::{Result, anyhow};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Distance within which a wall counts as lying on its story's outline.
const OUTLINE_TOLERANCE: f64 = 0.01;

/// Overlap of one face with a face of another volume.
#[derive(Debug, Clone, Copy)]
struct SharedPiece {
    partner: SurfaceRef,
    rect: PlaneRect,
}

/// How one face is cut.
#[derive(Debug, Clone)]
struct FaceSplit {
    surface: usize,
    shared: Vec<SharedPiece>,
    rest: Vec<PlaneRect>,
}

/// Counts reported after reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub removed_faces: usize,
    pub shared_pairs: usize,
    pub ground: usize,
    pub adiabatic: usize,
}

/// Runs cleanup, face matching and boundary assignment on a freshly extruded
/// building.
///
/// With `mid_story_adiabatic`, only volumes of the same story are matched and
/// unmatched faces between stories become adiabatic.
pub fn reconcile(
    building: &mut Building,
    mid_story_adiabatic: bool,
    deadline: &Deadline,
    diag: &mut Diagnostics,
) -> Result<ReconcileSummary> {
    if building.surfaces().any(|(_, s)| s.boundary.is_shared()) {
        return Err(anyhow!("Building {} is already reconciled", building.name));
    }
    let mut summary = ReconcileSummary {
        removed_faces: cleanup(building),
        ..Default::default()
    };
    if summary.removed_faces > 0 {
        diag.warn(
            Stage::Reconciliation,
            format!("{} degenerate or duplicate faces removed", summary.removed_faces),
        );
    }

    let splits = find_splits(building, mid_story_adiabatic, deadline)?;
    summary.shared_pairs = apply_splits(building, splits, diag)?;
    let (ground, adiabatic) = assign_boundaries(building, mid_story_adiabatic);
    summary.ground = ground;
    summary.adiabatic = adiabatic;

    diag.info(
        Stage::Reconciliation,
        format!(
            "{} interior surface pairs, {} surfaces set to ground, {} set to adiabatic",
            summary.shared_pairs, summary.ground, summary.adiabatic
        ),
    );
    Ok(summary)
}

/// Removes repeated and collinear vertices, faces without area, and faces
/// that duplicate another face of the same volume.
fn cleanup(building: &mut Building) -> usize {
    let mut removed = 0;
    for v in building.volumes.iter_mut() {
        let before = v.surfaces.len();
        let mut kept: Vec<Surface> = Vec::with_capacity(before);
        for mut s in std::mem::take(&mut v.surfaces) {
            let Some(poly) = s.polygon.cleaned(TOLERANCE) else {
                continue;
            };
            let duplicate = kept.iter().any(|k| {
                k.polygon.is_coincident(&poly, TOLERANCE)
                    || k.polygon.is_coincident_reversed(&poly, TOLERANCE)
            });
            if !duplicate {
                s.polygon = poly;
                kept.push(s);
            }
        }
        removed += before - kept.len();
        v.surfaces = kept;
    }
    removed
}

fn find_splits(
    building: &Building,
    same_story_only: bool,
    deadline: &Deadline,
) -> Result<Vec<(usize, Vec<FaceSplit>)>> {
    let faces: Vec<Vec<Option<PlaneRect>>> = building
        .volumes
        .iter()
        .map(|v| v.surfaces.iter().map(|s| PlaneRect::of(&s.polygon)).collect())
        .collect();
    let boxes: Vec<Option<(Point, Point)>> = building.volumes.iter().map(|v| v.bbox()).collect();
    let total = building.volumes.len();
    let done = AtomicUsize::new(0);

    (0..total)
        .into_par_iter()
        .map(|i| -> Result<(usize, Vec<FaceSplit>)> {
            deadline.check(done.load(Ordering::Relaxed), total)?;
            let mut splits = Vec::new();
            for (si, face) in faces[i].iter().enumerate() {
                let Some(face) = face else { continue };
                let mut shared = Vec::new();
                for j in 0..total {
                    if j == i
                        || (same_story_only && building.volumes[j].story != building.volumes[i].story)
                        || !boxes_touch(boxes[i], boxes[j])
                    {
                        continue;
                    }
                    for (ti, other) in faces[j].iter().enumerate() {
                        let Some(other) = other else { continue };
                        if !face.faces(other, TOLERANCE) {
                            continue;
                        }
                        if let Some((a, b)) = face.overlap(other, TOLERANCE) {
                            let rect = PlaneRect {
                                c: face.c.min(other.c),
                                ..face.with_spans(a, b)
                            };
                            shared.push(SharedPiece {
                                partner: SurfaceRef::new(j, ti),
                                rect,
                            });
                        }
                    }
                }
                if shared.is_empty() {
                    continue;
                }
                let holes: Vec<(Span, Span)> = shared.iter().map(|p| (p.rect.a, p.rect.b)).collect();
                let rest = face
                    .remainder(&holes, TOLERANCE)
                    .into_iter()
                    .map(|(a, b)| face.with_spans(a, b))
                    .collect();
                splits.push(FaceSplit {
                    surface: si,
                    shared,
                    rest,
                });
            }
            done.fetch_add(1, Ordering::Relaxed);
            Ok((i, splits))
        })
        .collect()
}

fn boxes_touch(a: Option<(Point, Point)>, b: Option<(Point, Point)>) -> bool {
    match (a, b) {
        (Some((min1, max1)), Some((min2, max2))) => {
            are_bboxes_overlapping(min1, max1, min2, max2, TOLERANCE)
        }
        _ => false,
    }
}

/// Replaces split faces by their pieces and links the shared ones.
/// Returns the number of linked pairs.
fn apply_splits(
    building: &mut Building,
    splits: Vec<(usize, Vec<FaceSplit>)>,
    diag: &mut Diagnostics,
) -> Result<usize> {
    // (face, partner face) → new index of the piece
    let mut pieces: BTreeMap<(SurfaceRef, SurfaceRef), SurfaceRef> = BTreeMap::new();

    for (vi, volume_splits) in splits {
        if volume_splits.is_empty() {
            continue;
        }
        let by_surface: BTreeMap<usize, FaceSplit> =
            volume_splits.into_iter().map(|s| (s.surface, s)).collect();
        let old = std::mem::take(&mut building.volumes[vi].surfaces);
        let mut new: Vec<Surface> = Vec::with_capacity(old.len());
        for (si, s) in old.into_iter().enumerate() {
            let Some(split) = by_surface.get(&si) else {
                new.push(s);
                continue;
            };
            let count = split.shared.len() + split.rest.len();
            let mut k = 0;
            let mut piece_name = || {
                k += 1;
                if count == 1 {
                    s.name.clone()
                } else {
                    format!("{} {k}", s.name)
                }
            };
            for p in split.shared.iter() {
                pieces.insert(
                    (SurfaceRef::new(vi, si), p.partner),
                    SurfaceRef::new(vi, new.len()),
                );
                new.push(Surface::new(piece_name(), s.kind, p.rect.to_polygon()?, s.boundary));
            }
            for r in split.rest.iter() {
                new.push(Surface::new(piece_name(), s.kind, r.to_polygon()?, s.boundary));
            }
        }
        building.volumes[vi].surfaces = new;
    }

    let mut linked = 0;
    let mut unmatched = 0;
    for (&(face, partner), &piece) in pieces.iter() {
        let Some(&other) = pieces.get(&(partner, face)) else {
            unmatched += 1;
            continue;
        };
        let coincident = match (building.surface(piece), building.surface(other)) {
            (Some(a), Some(b)) => a.polygon.is_coincident_reversed(&b.polygon, TOLERANCE),
            _ => false,
        };
        if !coincident {
            unmatched += 1;
            continue;
        }
        if let Some(s) = building.surface_mut(piece) {
            s.boundary = BoundaryCondition::InteriorShared(other);
        }
        if piece < other {
            linked += 1;
        }
    }
    if unmatched > 0 {
        diag.warn(
            Stage::Reconciliation,
            format!("{unmatched} face overlaps could not be paired and keep their boundary condition"),
        );
    }
    Ok(linked)
}

/// Story-position rules for faces that were not paired.
/// Returns the number of faces set to ground and to adiabatic.
fn assign_boundaries(building: &mut Building, mid_story_adiabatic: bool) -> (usize, usize) {
    let story_boxes: Vec<Option<(Point, Point)>> = (0..building.stories.len())
        .map(|si| {
            building
                .story_volumes(si)
                .filter_map(|(_, v)| v.bbox())
                .reduce(crate::geom::bboxes::union)
        })
        .collect();

    // Multipliers of the neighbours below and above, None at the bar's ends
    let mut neighbours: Vec<(Option<u32>, Option<u32>)> = vec![(None, None); building.stories.len()];
    for bar in 0..building.bars.len() {
        let order = building.bar_stories(bar);
        for (k, &si) in order.iter().enumerate() {
            let below = k.checked_sub(1).map(|p| building.stories[order[p]].multiplier);
            let above = order.get(k + 1).map(|&n| building.stories[n].multiplier);
            neighbours[si] = (below, above);
        }
    }

    let mut ground = 0;
    let mut adiabatic = 0;
    for v in building.volumes.iter_mut() {
        let story = &building.stories[v.story];
        let (below, above) = neighbours[v.story];
        let repeated = story.multiplier > 1;
        for s in v.surfaces.iter_mut() {
            if s.boundary.is_shared() {
                continue;
            }
            let before = s.boundary;
            match s.kind {
                SurfaceKind::Wall => {
                    if story.role == StoryRole::BelowGrade && s.boundary.is_exterior() {
                        s.boundary = BoundaryCondition::Ground;
                    } else if (mid_story_adiabatic || repeated)
                        && !on_outline(s, story_boxes[v.story])
                    {
                        s.boundary = BoundaryCondition::Adiabatic;
                    }
                }
                SurfaceKind::Floor => {
                    if let Some(m) = below {
                        if mid_story_adiabatic || repeated || m > 1 {
                            s.boundary = BoundaryCondition::Adiabatic;
                        }
                    } else if story.adiabatic_floor {
                        s.boundary = BoundaryCondition::Adiabatic;
                    }
                }
                SurfaceKind::RoofCeiling => {
                    if let Some(m) = above {
                        if mid_story_adiabatic || repeated || m > 1 {
                            s.boundary = BoundaryCondition::Adiabatic;
                        }
                    } else if story.adiabatic_roof {
                        s.boundary = BoundaryCondition::Adiabatic;
                    }
                }
            }
            if s.boundary != before {
                match s.boundary {
                    BoundaryCondition::Ground => ground += 1,
                    BoundaryCondition::Adiabatic => adiabatic += 1,
                    _ => {}
                }
            }
        }
    }
    (ground, adiabatic)
}

/// True if a wall lies on the outline of its story's bounding box.
fn on_outline(wall: &Surface, story_box: Option<(Point, Point)>) -> bool {
    let (Some(rect), Some((min, max))) = (PlaneRect::of(&wall.polygon), story_box) else {
        return true;
    };
    let (lo, hi) = match rect.axis {
        Axis3::X => (min.x, max.x),
        Axis3::Y => (min.y, max.y),
        Axis3::Z => return true,
    };
    (rect.c - lo).abs() <= OUTLINE_TOLERANCE || (rect.c - hi).abs() <= OUTLINE_TOLERANCE
}
