//! Division of a bar's stories into space-type footprints.

pub mod layout;
pub mod ledger;

use crate::bar::config::DivisionMethod;
use crate::bar::spec::SpaceTypeEntry;
use crate::diagnostics::{Diagnostics, Stage};
use crate::geom::rect::Rect;
use crate::model::story::StoryDescriptor;
use crate::model::volume::Exposure;
use anyhow::Result;
use layout::layout_slices;
use ledger::AreaLedger;
use serde::{Deserialize, Serialize};

/// Allowed drift of the area ledger after slicing, m².
pub const AREA_TOLERANCE: f64 = 1e-4;

/// Plan rectangle of one zone on one story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintPiece {
    pub space_type: String,
    pub exposure: Exposure,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy)]
pub struct SliceRequest<'a> {
    /// Full footprint of the bar.
    pub footprint: Rect,
    pub stories: &'a [StoryDescriptor],
    /// Slicing order.
    pub space_types: &'a [SpaceTypeEntry],
    pub perimeter_depth: f64,
    pub min_bar_size: f64,
}

/// Pieces per story (same order as the request's stories) and the final ledger.
#[derive(Debug, Clone)]
pub struct SlicedBar {
    pub stories: Vec<Vec<FootprintPiece>>,
    pub ledger: AreaLedger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlicingStrategy {
    /// Global fractions, same slices on every story.
    SimpleSliced,
    /// Running per-type counters; types spill onto following stories.
    PerStorySliced,
    /// The largest space type fills every story.
    CorePerimeter,
}

impl SlicingStrategy {
    pub fn for_method(method: DivisionMethod) -> Self {
        match method {
            DivisionMethod::SimpleSliced => SlicingStrategy::SimpleSliced,
            DivisionMethod::PerStorySliced => SlicingStrategy::PerStorySliced,
            DivisionMethod::SingleSpaceType => SlicingStrategy::CorePerimeter,
        }
    }

    pub fn produce(&self, req: &SliceRequest, diag: &mut Diagnostics) -> Result<SlicedBar> {
        let sliced = match self {
            SlicingStrategy::SimpleSliced => simple(req, diag)?,
            SlicingStrategy::PerStorySliced => per_story(req, diag)?,
            SlicingStrategy::CorePerimeter => single_type(req, diag)?,
        };
        if *self != SlicingStrategy::CorePerimeter {
            for (name, area) in sliced.ledger.unsettled(AREA_TOLERANCE) {
                diag.error(
                    Stage::Slicing,
                    format!("{name}: {area:.4} m² left unallocated after slicing"),
                );
            }
        }
        Ok(sliced)
    }
}

/// Story rectangle, shrunk about the center on a partial floor.
fn story_rect(footprint: Rect, story: &StoryDescriptor) -> Result<Rect> {
    if story.is_partial() {
        footprint.scaled_about_center(story.area_scale.sqrt())
    } else {
        Ok(footprint)
    }
}

fn simple(req: &SliceRequest, diag: &mut Diagnostics) -> Result<SlicedBar> {
    let total: f64 = req.space_types.iter().map(|e| e.target_floor_area).sum();
    let mut ledger = AreaLedger::new(req.space_types);
    let mut stories = Vec::with_capacity(req.stories.len());
    for story in req.stories.iter() {
        let rect = story_rect(req.footprint, story)?;
        let allocations: Vec<(&SpaceTypeEntry, f64)> = req
            .space_types
            .iter()
            .map(|e| (e, rect.area() * e.target_floor_area / total))
            .collect();
        for (e, a) in allocations.iter() {
            ledger = ledger.allocate(&e.name, a * story.multiplier as f64);
        }
        stories.push(layout_slices(rect, &allocations, req.perimeter_depth, diag)?);
    }
    Ok(SlicedBar { stories, ledger })
}

fn per_story(req: &SliceRequest, diag: &mut Diagnostics) -> Result<SlicedBar> {
    let mut ledger = AreaLedger::new(req.space_types);
    let mut stories = Vec::with_capacity(req.stories.len());
    let n = req.stories.len();
    for (k, story) in req.stories.iter().enumerate() {
        let rect = story_rect(req.footprint, story)?;
        let m = story.multiplier as f64;
        let mut room = rect.area() * m;

        // (entry index, area over all floors of the story)
        let mut allocations: Vec<(usize, f64)> = Vec::new();
        for (i, e) in req.space_types.iter().enumerate() {
            if room <= AREA_TOLERANCE {
                break;
            }
            let left = ledger.remaining(&e.name);
            if left <= AREA_TOLERANCE {
                continue;
            }
            let a = left.min(room);
            allocations.push((i, a));
            room -= a;
        }
        if room > AREA_TOLERANCE {
            diag.warn(
                Stage::Slicing,
                format!("{}: {room:.4} m² of floor area has no space type left", story.id),
            );
        }

        let strip = rect.extent(rect.major_axis().other()) * m;
        avoid_sliver(
            &mut allocations,
            req,
            &ledger,
            strip * req.min_bar_size,
            k + 1 == n,
            &story.id,
            diag,
        );

        for (i, a) in allocations.iter() {
            ledger = ledger.allocate(&req.space_types[*i].name, *a);
        }
        let per_floor: Vec<(&SpaceTypeEntry, f64)> = allocations
            .iter()
            .map(|(i, a)| (&req.space_types[*i], a / m))
            .collect();
        stories.push(layout_slices(rect, &per_floor, req.perimeter_depth, diag)?);
    }
    Ok(SlicedBar { stories, ledger })
}

/// Keeps the smallest allocation of a story from becoming a sliver thinner
/// than the minimum bar size (`min_area` over the story's floors).
///
/// The sliver moves to the next story with the largest allocation taking
/// its place, or grows by borrowing from the largest allocation, or stays.
fn avoid_sliver(
    allocations: &mut Vec<(usize, f64)>,
    req: &SliceRequest,
    ledger: &AreaLedger,
    min_area: f64,
    last_story: bool,
    story_id: &str,
    diag: &mut Diagnostics,
) {
    if allocations.len() < 2 {
        return;
    }
    let by_area = |a: &(usize, (usize, f64)), b: &(usize, (usize, f64))| a.1.1.total_cmp(&b.1.1);
    let indexed = || allocations.iter().copied().enumerate();
    let (Some((si, (small_ty, small))), Some((li, (large_ty, large)))) =
        (indexed().min_by(by_area), indexed().max_by(by_area))
    else {
        return;
    };
    if si == li || small >= min_area - AREA_TOLERANCE {
        return;
    }
    let small_name = &req.space_types[small_ty].name;
    let large_name = &req.space_types[large_ty].name;

    if !last_story && ledger.remaining(large_name) >= large + small - AREA_TOLERANCE {
        allocations[li].1 += small;
        allocations.remove(si);
        diag.warn(
            Stage::Slicing,
            format!("{story_id}: {small_name} sliver moved to the next story, {large_name} takes its place"),
        );
        return;
    }
    let delta = min_area - small;
    if ledger.remaining(small_name) >= small + delta - AREA_TOLERANCE && large - delta >= min_area {
        allocations[si].1 += delta;
        allocations[li].1 -= delta;
        diag.warn(
            Stage::Slicing,
            format!("{story_id}: {small_name} widened to the minimum bar size with area borrowed from {large_name}"),
        );
        return;
    }
    diag.info(
        Stage::Slicing,
        format!("{story_id}: {small_name} is narrower than the minimum bar size"),
    );
}

fn single_type(req: &SliceRequest, diag: &mut Diagnostics) -> Result<SlicedBar> {
    let mut ledger = AreaLedger::new(req.space_types);
    let Some(largest) = req
        .space_types
        .iter()
        .max_by(|a, b| a.target_floor_area.total_cmp(&b.target_floor_area))
    else {
        return Ok(SlicedBar {
            stories: vec![Vec::new(); req.stories.len()],
            ledger,
        });
    };
    if req.space_types.len() > 1 {
        diag.warn(
            Stage::Slicing,
            format!(
                "Single space type division: {} used for the whole bar, {} other space types dropped",
                largest.name,
                req.space_types.len() - 1
            ),
        );
    }
    let mut stories = Vec::with_capacity(req.stories.len());
    for story in req.stories.iter() {
        let rect = story_rect(req.footprint, story)?;
        ledger = ledger.allocate(&largest.name, rect.area() * story.multiplier as f64);
        stories.push(layout_slices(
            rect,
            &[(largest, rect.area())],
            req.perimeter_depth,
            diag,
        )?);
    }
    Ok(SlicedBar { stories, ledger })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::{MIN_BAR_SIZE, PERIMETER_ZONE_DEPTH};
    use crate::diagnostics::Severity;
    use crate::geom::IsClose;
    use crate::model::facade::FacadeFlags;
    use crate::model::story::StoryRole;
    use std::collections::BTreeMap;

    fn stories(multipliers: &[u32], top_scale: f64) -> Vec<StoryDescriptor> {
        let n = multipliers.len();
        multipliers
            .iter()
            .enumerate()
            .map(|(i, &m)| StoryDescriptor {
                id: format!("Story {}", i + 1),
                bar: 0,
                role: if i == 0 { StoryRole::Ground } else { StoryRole::Mid },
                vertical_origin: 3. * i as f64,
                height: 3.,
                multiplier: m,
                area_scale: if i + 1 == n { top_scale } else { 1. },
                party_walls: FacadeFlags::none(),
                adiabatic_floor: false,
                adiabatic_roof: false,
            })
            .collect()
    }

    /// Realized floor area per space type, multipliers included.
    fn realized(sliced: &SlicedBar, stories: &[StoryDescriptor]) -> BTreeMap<String, f64> {
        let mut areas = BTreeMap::new();
        for (pieces, story) in sliced.stories.iter().zip(stories.iter()) {
            for p in pieces {
                *areas.entry(p.space_type.clone()).or_default() +=
                    p.rect.area() * story.multiplier as f64;
            }
        }
        areas
    }

    fn request<'a>(
        stories: &'a [StoryDescriptor],
        types: &'a [SpaceTypeEntry],
    ) -> Result<SliceRequest<'a>> {
        Ok(SliceRequest {
            footprint: Rect::centered(Default::default(), 60., 20.)?,
            stories,
            space_types: types,
            perimeter_depth: PERIMETER_ZONE_DEPTH,
            min_bar_size: MIN_BAR_SIZE,
        })
    }

    #[test]
    fn test_per_story_spills_over() -> Result<()> {
        let stories = stories(&[1, 1, 1], 1.);
        let types = vec![
            SpaceTypeEntry::new("Office", "x", 2520.),
            SpaceTypeEntry::new("Storage", "x", 1080.),
        ];
        let mut diag = Diagnostics::new();
        let sliced = SlicingStrategy::PerStorySliced.produce(&request(&stories, &types)?, &mut diag)?;
        assert!(sliced.ledger.is_settled(AREA_TOLERANCE));
        assert!(!diag.has_errors());
        let areas = realized(&sliced, &stories);
        assert!(areas["Office"].is_close_within(2520., 1e-6));
        assert!(areas["Storage"].is_close_within(1080., 1e-6));
        // Office fills the first two stories
        assert!(sliced.stories[0].iter().all(|p| p.space_type == "Office"));
        Ok(())
    }

    #[test]
    fn test_simple_same_slices_everywhere() -> Result<()> {
        let stories = stories(&[1, 3, 1], 1.);
        let types = vec![
            SpaceTypeEntry::new("Office", "x", 4200.),
            SpaceTypeEntry::new("Storage", "x", 1800.),
        ];
        let sliced = SlicingStrategy::SimpleSliced.produce(&request(&stories, &types)?, &mut Diagnostics::new())?;
        assert!(sliced.ledger.is_settled(AREA_TOLERANCE));
        assert_eq!(sliced.stories[0], sliced.stories[1]);
        let areas = realized(&sliced, &stories);
        assert!(areas["Storage"].is_close_within(1800., 1e-6));
        Ok(())
    }

    #[test]
    fn test_partial_top_story() -> Result<()> {
        let stories = stories(&[1, 1], 0.5);
        let types = vec![SpaceTypeEntry::new("Office", "x", 1800.)];
        let sliced = SlicingStrategy::PerStorySliced.produce(&request(&stories, &types)?, &mut Diagnostics::new())?;
        let top: f64 = sliced.stories[1].iter().map(|p| p.rect.area()).sum();
        assert!(top.is_close_within(600., 1e-9));
        assert!(sliced.ledger.is_settled(AREA_TOLERANCE));
        Ok(())
    }

    #[test]
    fn test_sliver_moves_to_next_story() -> Result<()> {
        let stories = stories(&[1, 1], 1.);
        // Story capacity 1200; Storage would get a 2 m wide slice on story 1
        let types = vec![
            SpaceTypeEntry::new("Lab", "x", 400.),
            SpaceTypeEntry::new("Storage", "x", 40.),
            SpaceTypeEntry::new("Office", "x", 1960.),
        ];
        let mut diag = Diagnostics::new();
        let sliced = SlicingStrategy::PerStorySliced.produce(&request(&stories, &types)?, &mut diag)?;
        assert!(!sliced.stories[0].iter().any(|p| p.space_type == "Storage"));
        assert!(diag.mentions(Severity::Warning, "next story"));
        assert!(sliced.ledger.is_settled(AREA_TOLERANCE));
        let areas = realized(&sliced, &stories);
        assert!(areas["Storage"].is_close_within(40., 1e-6));
        assert!(areas["Office"].is_close_within(1960., 1e-6));
        Ok(())
    }

    #[test]
    fn test_single_type() -> Result<()> {
        let stories = stories(&[1, 1], 1.);
        let types = vec![
            SpaceTypeEntry::new("Office", "x", 1800.),
            SpaceTypeEntry::new("Storage", "x", 600.),
        ];
        let mut diag = Diagnostics::new();
        let sliced = SlicingStrategy::CorePerimeter.produce(&request(&stories, &types)?, &mut diag)?;
        let areas = realized(&sliced, &stories);
        assert!(areas["Office"].is_close_within(2400., 1e-6));
        assert!(!areas.contains_key("Storage"));
        assert!(!diag.has_errors());
        assert!(diag.mentions(Severity::Warning, "single space type"));
        Ok(())
    }
}
