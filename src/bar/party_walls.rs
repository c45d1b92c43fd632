//! Per-story party-wall flags, from explicit story counts or from a target
//! share of the exterior wall area.
//!
//! Flags are listed per modeled floor, lowest first, basements included.

use crate::geom::normalize_degrees;
use crate::model::facade::{FacadeFlags, Orientation};

/// Story counts per facade. A count covers above-grade floors from the ground up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartyWallCounts {
    pub north: u32,
    pub east: u32,
    pub south: u32,
    pub west: u32,
}

impl PartyWallCounts {
    fn get(&self, o: Orientation) -> u32 {
        match o {
            Orientation::North => self.north,
            Orientation::East => self.east,
            Orientation::South => self.south,
            Orientation::West => self.west,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.north + self.east + self.south + self.west == 0
    }
}

/// Flags for `num_floors` floors of which the lowest `below_grade` are basements.
///
/// Basements never get a flag.
pub fn from_counts(counts: PartyWallCounts, num_floors: usize, below_grade: u32) -> Vec<FacadeFlags> {
    (0..num_floors)
        .map(|i| {
            let level = i as i64 + 1 - below_grade as i64;
            let mut flags = FacadeFlags::none();
            if level <= 0 {
                return flags;
            }
            for o in Orientation::ALL {
                if counts.get(o) as i64 >= level {
                    flags.set(o, true);
                }
            }
            flags
        })
        .collect()
}

/// Inputs of the party-wall fraction placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionRequest {
    pub length: f64,
    pub width: f64,
    pub floor_height: f64,
    pub above_grade: f64,
    pub below_grade: u32,
    pub fraction: f64,
    /// Building rotation, degrees.
    pub rotation: f64,
}

/// Places party walls so that roughly `fraction` of the exterior wall area is covered.
///
/// Short facades are stacked first (both ends of a floor count as two facades).
/// If they cannot reach the target within one typical long facade, the long
/// facades are used instead. At most one opposing pair of orientations is used.
pub fn from_fraction(req: &FractionRequest) -> Vec<FacadeFlags> {
    let above_ceil = req.above_grade.ceil();
    let num_floors = (req.above_grade + req.below_grade as f64).ceil() as usize;
    let edge = (1. - above_ceil + req.above_grade).sqrt();

    let typical_length_area = req.length * req.floor_height;
    let typical_width_area = req.width * req.floor_height;
    let top_length_area = typical_length_area * edge;
    let top_width_area = typical_width_area * edge;

    let total = 2. * (req.length + req.width) * (above_ceil - 1.) * req.floor_height
        + 2. * (top_length_area + top_width_area);
    let target = total * req.fraction;

    let (width_count, width_area) = stack_facades(target, typical_width_area, top_width_area, above_ceil);
    let (length_count, _) = stack_facades(target, typical_length_area, top_length_area, above_ceil);

    // Which compass pair holds the short facades depends on the rotation
    let rotation = normalize_degrees(req.rotation);
    let best_fit = [360., 270., 180., 90., 0.]
        .into_iter()
        .min_by(|a: &f64, b: &f64| (a - rotation).abs().total_cmp(&(b - rotation).abs()))
        .unwrap_or(0.);
    let quarter_turn = best_fit == 90. || best_fit == 270.;
    let (width_pair, length_pair) = if quarter_turn {
        ([Orientation::North, Orientation::South], [Orientation::East, Orientation::West])
    } else {
        ([Orientation::East, Orientation::West], [Orientation::North, Orientation::South])
    };

    let (pair, count) = if target - width_area <= typical_length_area {
        (width_pair, width_count)
    } else {
        (length_pair, length_count)
    };

    (0..num_floors)
        .map(|i| {
            let level = (i + 1) as f64 - req.below_grade as f64;
            let mut flags = FacadeFlags::none();
            if level <= 0. || level > count as f64 {
                return flags;
            }
            flags.set(pair[0], true);
            if level <= count as f64 - req.above_grade {
                flags.set(pair[1], true);
            }
            flags
        })
        .collect()
}

/// Adds facades (one side of every floor, then the other) until the next one
/// would reach `target`. Returns the number of facades and their area.
fn stack_facades(target: f64, typical: f64, top: f64, above_ceil: f64) -> (u32, f64) {
    let limit = (2. * above_ceil) as u32;
    let last = above_ceil as u32;
    let mut count = 0;
    let mut area = 0.;
    let mut facade = typical;
    while area + facade < target && count != limit {
        facade = if count + 1 == last || count + 1 == 2 * last {
            top
        } else {
            typical
        };
        count += 1;
        area += facade;
    }
    (count, area)
}

/// Share of party-wall area in the total wall area.
pub fn realized_fraction(party_wall_area: f64, exterior_wall_area: f64) -> f64 {
    let total = party_wall_area + exterior_wall_area;
    if total > 0. { party_wall_area / total } else { 0. }
}
