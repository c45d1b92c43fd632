//! Placement of space-type slices in one story rectangle.
//!
//! Slices run across the major axis (`u`), one after another. With
//! perimeter zoning, each slice gets a strip of the perimeter depth on both
//! long sides (`v`) and a core; the first and last slices also get an end cap.

use crate::bar::slicer::FootprintPiece;
use crate::bar::spec::SpaceTypeEntry;
use crate::bar::{CORE_PERIMETER_MIN_FACTOR, MAX_END_MULTIPLIER, MIN_END_MULTIPLIER};
use crate::diagnostics::{Diagnostics, Stage};
use crate::geom::EPS;
use crate::geom::rect::{PlanAxis, Rect};
use crate::model::facade::Orientation;
use crate::model::volume::Exposure;
use anyhow::Result;

/// Compass directions of the four sides of a rectangle sliced along `axis`.
#[derive(Debug, Clone, Copy)]
struct Sides {
    u_low: Orientation,
    u_high: Orientation,
    v_low: Orientation,
    v_high: Orientation,
}

impl Sides {
    fn of(axis: PlanAxis) -> Self {
        match axis {
            PlanAxis::X => Sides {
                u_low: Orientation::West,
                u_high: Orientation::East,
                v_low: Orientation::South,
                v_high: Orientation::North,
            },
            PlanAxis::Y => Sides {
                u_low: Orientation::South,
                u_high: Orientation::North,
                v_low: Orientation::West,
                v_high: Orientation::East,
            },
        }
    }
}

/// Lays out `allocations` (space type, floor area on one floor) across `rect`.
///
/// Slice lengths are proportional to the allocations and the last slice ends
/// exactly at the rectangle's edge, so the pieces always tile the rectangle.
pub fn layout_slices(
    rect: Rect,
    allocations: &[(&SpaceTypeEntry, f64)],
    depth: f64,
    diag: &mut Diagnostics,
) -> Result<Vec<FootprintPiece>> {
    let allocations: Vec<(&SpaceTypeEntry, f64)> =
        allocations.iter().copied().filter(|(_, a)| *a > EPS).collect();
    if let [(entry, _)] = allocations.as_slice() {
        if entry.double_loaded_corridor.is_none() {
            return core_perimeter(rect, &entry.name, depth, diag);
        }
    }

    let axis = rect.major_axis();
    let sides = Sides::of(axis);
    let (u_start, u_end) = rect.span(axis);
    let (v0, v1) = rect.span(axis.other());
    let total: f64 = allocations.iter().map(|(_, a)| a).sum();
    let zoned = (v1 - v0) > CORE_PERIMETER_MIN_FACTOR * depth;

    let mut segments: Vec<(&SpaceTypeEntry, f64)> = allocations
        .iter()
        .map(|(e, a)| (*e, (u_end - u_start) * a / total))
        .collect();
    if zoned {
        reapply_largest_at_end(&mut segments, depth, diag);
    }

    let mut pieces = Vec::new();
    let mut u0 = u_start;
    let last = segments.len().saturating_sub(1);
    for (k, (entry, length)) in segments.iter().enumerate() {
        let u1 = if k == last { u_end } else { u0 + length };
        if u1 - u0 <= EPS {
            continue;
        }
        let slice = Slice {
            axis,
            sides,
            u0,
            u1,
            v0,
            v1,
        };
        if let Some(dlc) = &entry.double_loaded_corridor {
            pieces.extend(slice.corridor(
                &dlc.core_category,
                &dlc.perimeter_category,
                dlc.core_fraction(),
            )?);
        } else if !zoned {
            pieces.push(slice.whole(&entry.name)?);
        } else if u1 - u0 < MIN_END_MULTIPLIER * depth - EPS {
            diag.warn(
                Stage::Slicing,
                format!(
                    "{} slice is {:.2} m long, less than the perimeter depth; modeled as one zone",
                    entry.name,
                    u1 - u0
                ),
            );
            pieces.push(slice.whole(&entry.name)?);
        } else {
            let cap_limit = MAX_END_MULTIPLIER * depth;
            let low_cap = (k == 0 && u1 - u0 > cap_limit).then_some(depth);
            let high_cap = (k == last && u1 - u0 > cap_limit).then_some(depth);
            pieces.extend(slice.zoned(&entry.name, depth, low_cap, high_cap)?);
        }
        u0 = u1;
    }
    Ok(pieces)
}

/// Keeps the far end of the bar from being a sliver.
///
/// When the last slice is shorter than the minimum end length, a piece of
/// that length is cut from the largest slice and placed after it. Every
/// space type keeps its area.
fn reapply_largest_at_end<'a>(
    segments: &mut Vec<(&'a SpaceTypeEntry, f64)>,
    depth: f64,
    diag: &mut Diagnostics,
) {
    let min_length = MIN_END_MULTIPLIER * depth;
    let Some(&(end, end_length)) = segments.last() else {
        return;
    };
    if segments.len() < 2 || end_length >= min_length || end.double_loaded_corridor.is_some() {
        return;
    }
    let Some((li, &(largest, largest_length))) = segments
        .iter()
        .enumerate()
        .filter(|(_, (e, _))| e.double_loaded_corridor.is_none())
        .max_by(|a, b| a.1.1.total_cmp(&b.1.1))
    else {
        return;
    };
    // The remaining part of the largest slice must not become a sliver itself
    if li + 1 == segments.len() || largest_length - min_length < min_length {
        return;
    }
    segments[li].1 -= min_length;
    segments.push((largest, min_length));
    diag.warn(
        Stage::Slicing,
        format!(
            "{} slice is {end_length:.2} m long; {} repeated at the end of the bar",
            end.name, largest.name
        ),
    );
}

/// Four perimeter strips of `depth` around a core, or one zone if the
/// rectangle is too small for that.
pub fn core_perimeter(
    rect: Rect,
    space_type: &str,
    depth: f64,
    diag: &mut Diagnostics,
) -> Result<Vec<FootprintPiece>> {
    let axis = rect.major_axis();
    let (u0, u1) = rect.span(axis);
    let (v0, v1) = rect.span(axis.other());
    let slice = Slice {
        axis,
        sides: Sides::of(axis),
        u0,
        u1,
        v0,
        v1,
    };
    if rect.dx().min(rect.dy()) <= CORE_PERIMETER_MIN_FACTOR * depth {
        diag.warn(
            Stage::Slicing,
            format!(
                "{space_type} footprint {:.2} m x {:.2} m is too small for {depth:.2} m perimeter zones; one zone used",
                rect.dx(),
                rect.dy()
            ),
        );
        return Ok(vec![slice.whole(space_type)?]);
    }
    slice.zoned(space_type, depth, Some(depth), Some(depth))
}

#[derive(Debug, Clone, Copy)]
struct Slice {
    axis: PlanAxis,
    sides: Sides,
    u0: f64,
    u1: f64,
    v0: f64,
    v1: f64,
}

impl Slice {
    fn piece(&self, space_type: &str, exposure: Exposure, u: (f64, f64), v: (f64, f64)) -> Result<FootprintPiece> {
        Ok(FootprintPiece {
            space_type: space_type.to_string(),
            exposure,
            rect: Rect::from_uv(self.axis, u.0, u.1, v.0, v.1)?,
        })
    }

    fn whole(&self, space_type: &str) -> Result<FootprintPiece> {
        self.piece(space_type, Exposure::Whole, (self.u0, self.u1), (self.v0, self.v1))
    }

    /// Long-side strips over the full slice length, optional end caps between
    /// them, and the core.
    fn zoned(
        &self,
        space_type: &str,
        depth: f64,
        low_cap: Option<f64>,
        high_cap: Option<f64>,
    ) -> Result<Vec<FootprintPiece>> {
        let u = (self.u0, self.u1);
        let inner_v = (self.v0 + depth, self.v1 - depth);
        let core_u0 = self.u0 + low_cap.unwrap_or(0.);
        let core_u1 = self.u1 - high_cap.unwrap_or(0.);

        let mut pieces = vec![
            self.piece(
                space_type,
                Exposure::Perimeter(self.sides.v_low),
                u,
                (self.v0, self.v0 + depth),
            )?,
            self.piece(
                space_type,
                Exposure::Perimeter(self.sides.v_high),
                u,
                (self.v1 - depth, self.v1),
            )?,
        ];
        if let Some(d) = low_cap {
            pieces.push(self.piece(
                space_type,
                Exposure::Perimeter(self.sides.u_low),
                (self.u0, self.u0 + d),
                inner_v,
            )?);
        }
        if let Some(d) = high_cap {
            pieces.push(self.piece(
                space_type,
                Exposure::Perimeter(self.sides.u_high),
                (self.u1 - d, self.u1),
                inner_v,
            )?);
        }
        pieces.push(self.piece(space_type, Exposure::Core, (core_u0, core_u1), inner_v)?);
        Ok(pieces)
    }

    /// Corridor strip in the middle with occupied strips on both sides.
    fn corridor(&self, corridor: &str, occupied: &str, core_fraction: f64) -> Result<Vec<FootprintPiece>> {
        let u = (self.u0, self.u1);
        let width = self.v1 - self.v0;
        let side = 0.5 * width * (1. - core_fraction);
        if core_fraction <= EPS || side <= EPS {
            let name = if core_fraction <= EPS { occupied } else { corridor };
            return Ok(vec![self.whole(name)?]);
        }
        Ok(vec![
            self.piece(
                occupied,
                Exposure::Perimeter(self.sides.v_low),
                u,
                (self.v0, self.v0 + side),
            )?,
            self.piece(corridor, Exposure::Corridor, u, (self.v0 + side, self.v1 - side))?,
            self.piece(
                occupied,
                Exposure::Perimeter(self.sides.v_high),
                u,
                (self.v1 - side, self.v1),
            )?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::catalog::DoubleLoadedCorridor;
    use crate::diagnostics::Severity;
    use crate::geom::IsClose;

    fn area_of(pieces: &[FootprintPiece], space_type: &str) -> f64 {
        pieces
            .iter()
            .filter(|p| p.space_type == space_type)
            .map(|p| p.rect.area())
            .sum()
    }

    #[test]
    fn test_core_perimeter() -> Result<()> {
        let rect = Rect::new(0., 0., 40., 20.)?;
        let pieces = core_perimeter(rect, "Office", 4.572, &mut Diagnostics::new())?;
        assert_eq!(pieces.len(), 5);
        assert!(area_of(&pieces, "Office").is_close_within(800., 1e-9));
        let south = pieces
            .iter()
            .find(|p| p.exposure == Exposure::Perimeter(Orientation::South))
            .unwrap();
        assert!(south.rect.dx().is_close(40.));
        let core = pieces.iter().find(|p| p.exposure == Exposure::Core).unwrap();
        assert!(core.rect.dx().is_close_within(40. - 2. * 4.572, 1e-9));
        Ok(())
    }

    #[test]
    fn test_small_footprint_is_one_zone() -> Result<()> {
        let mut diag = Diagnostics::new();
        let pieces = core_perimeter(Rect::new(0., 0., 30., 10.)?, "Office", 4.572, &mut diag)?;
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].exposure, Exposure::Whole);
        assert!(diag.mentions(Severity::Warning, "too small"));
        Ok(())
    }

    #[test]
    fn test_slices_tile_the_rectangle() -> Result<()> {
        let rect = Rect::new(0., 0., 60., 20.)?;
        let office = SpaceTypeEntry::new("Office", "x", 0.);
        let storage = SpaceTypeEntry::new("Storage", "x", 0.);
        let pieces = layout_slices(
            rect,
            &[(&office, 840.), (&storage, 360.)],
            4.572,
            &mut Diagnostics::new(),
        )?;
        assert!(area_of(&pieces, "Office").is_close_within(840., 1e-9));
        assert!(area_of(&pieces, "Storage").is_close_within(360., 1e-9));
        // Office: two strips, west cap, core; storage: two strips, east cap, core
        assert_eq!(pieces.len(), 8);
        assert!(pieces.iter().any(|p| p.space_type == "Office"
            && p.exposure == Exposure::Perimeter(Orientation::West)));
        assert!(pieces.iter().any(|p| p.space_type == "Storage"
            && p.exposure == Exposure::Perimeter(Orientation::East)));
        Ok(())
    }

    #[test]
    fn test_slices_along_y() -> Result<()> {
        let rect = Rect::new(0., 0., 20., 60.)?;
        let a = SpaceTypeEntry::new("A", "x", 0.);
        let b = SpaceTypeEntry::new("B", "x", 0.);
        let pieces = layout_slices(rect, &[(&a, 600.), (&b, 600.)], 4.572, &mut Diagnostics::new())?;
        let a_cap = pieces
            .iter()
            .find(|p| p.space_type == "A" && p.exposure == Exposure::Perimeter(Orientation::South));
        assert!(a_cap.is_some());
        assert!(pieces.iter().any(|p| p.space_type == "B"
            && p.exposure == Exposure::Perimeter(Orientation::North)));
        Ok(())
    }

    #[test]
    fn test_end_sliver_moves_inside() -> Result<()> {
        let rect = Rect::new(0., 0., 100., 20.)?;
        let big = SpaceTypeEntry::new("Big", "x", 0.);
        let tiny = SpaceTypeEntry::new("Tiny", "x", 0.);
        let mut diag = Diagnostics::new();
        let pieces = layout_slices(rect, &[(&big, 1940.), (&tiny, 60.)], 4.572, &mut diag)?;

        assert!(area_of(&pieces, "Big").is_close_within(1940., 1e-9));
        assert!(area_of(&pieces, "Tiny").is_close_within(60., 1e-9));
        let tiny: Vec<&FootprintPiece> = pieces.iter().filter(|p| p.space_type == "Tiny").collect();
        assert_eq!(tiny.len(), 1);
        assert_eq!(tiny[0].exposure, Exposure::Whole);
        assert!(tiny[0].rect.dx().is_close_within(3., 1e-9));
        assert!(tiny[0].rect.span(PlanAxis::X).1.is_close_within(100. - 4.572, 1e-9));
        // The bar ends with the largest space type again
        let end: Vec<&FootprintPiece> = pieces
            .iter()
            .filter(|p| p.rect.span(PlanAxis::X).1.is_close_within(100., 1e-9))
            .collect();
        assert!(!end.is_empty());
        assert!(end.iter().all(|p| p.space_type == "Big"));
        assert!(diag.mentions(Severity::Warning, "repeated at the end"));
        Ok(())
    }

    #[test]
    fn test_end_sliver_stays_when_largest_is_short() -> Result<()> {
        let rect = Rect::new(0., 0., 12.2, 11.5)?;
        let a = SpaceTypeEntry::new("A", "x", 0.);
        let b = SpaceTypeEntry::new("B", "x", 0.);
        let c = SpaceTypeEntry::new("C", "x", 0.);
        let mut diag = Diagnostics::new();
        let pieces = layout_slices(
            rect,
            &[(&a, 5.1 * 11.5), (&b, 5.1 * 11.5), (&c, 2. * 11.5)],
            4.572,
            &mut diag,
        )?;
        let c: Vec<&FootprintPiece> = pieces.iter().filter(|p| p.space_type == "C").collect();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].exposure, Exposure::Whole);
        assert!(c[0].rect.span(PlanAxis::X).1.is_close_within(12.2, 1e-9));
        assert!(diag.mentions(Severity::Warning, "modeled as one zone"));
        assert!(!diag.mentions(Severity::Warning, "repeated at the end"));
        Ok(())
    }

    #[test]
    fn test_corridor_slice() -> Result<()> {
        let rect = Rect::new(0., 0., 50., 20.)?;
        let entry = SpaceTypeEntry {
            double_loaded_corridor: Some(DoubleLoadedCorridor {
                core_ratio: 1.,
                perimeter_ratio: 4.,
                core_category: "Corridor".to_string(),
                perimeter_category: "GuestRoom".to_string(),
            }),
            ..SpaceTypeEntry::new("Double Loaded Corridor", "x", 0.)
        };
        let pieces = layout_slices(rect, &[(&entry, 1000.)], 4.572, &mut Diagnostics::new())?;
        assert_eq!(pieces.len(), 3);
        assert!(area_of(&pieces, "Corridor").is_close_within(200., 1e-9));
        assert!(area_of(&pieces, "GuestRoom").is_close_within(800., 1e-9));
        let hall = pieces.iter().find(|p| p.exposure == Exposure::Corridor).unwrap();
        assert!(hall.rect.center().y.is_close(10.));
        Ok(())
    }
}
