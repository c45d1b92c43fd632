//! Choice between one bar and two detached bars.
//!
//! A perimeter multiplier above 1 cannot be met by a rectangle that keeps
//! the requested aspect ratio. Strategies are tried in order:
//! 1. two bars with a common width (all walls exterior),
//! 2. two bars where the secondary bar's end walls are adiabatic,
//! 3. one stretched bar that gives up the aspect ratio.
//!
//! The secondary bar is turned by 90 degrees, so the primary bar contributes
//! its length to the N/S facades and the secondary bar its length to the E/W facades.

use crate::bar::dimensions::{self, BarDimensions};
use crate::diagnostics::{Diagnostics, Stage};
use crate::units::m_to_ft;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Absolute slack when comparing segment lengths against the minimum bar size.
const SIZE_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BarLayout {
    /// One rectangle with the requested area and aspect ratio.
    Single(BarDimensions),
    /// One rectangle with the requested area and perimeter, aspect ratio relaxed.
    Stretched(BarDimensions),
    /// Two bars sharing a width; `secondary` is already turned (length along X is the width).
    DualBar {
        primary: BarDimensions,
        secondary: BarDimensions,
    },
    /// As `DualBar`, but the secondary bar's north and south walls are adiabatic.
    DualBarAdiabaticEnds {
        primary: BarDimensions,
        secondary: BarDimensions,
    },
}

impl BarLayout {
    pub fn primary(&self) -> BarDimensions {
        match self {
            BarLayout::Single(d) | BarLayout::Stretched(d) => *d,
            BarLayout::DualBar { primary, .. } | BarLayout::DualBarAdiabaticEnds { primary, .. } => {
                *primary
            }
        }
    }

    pub fn secondary(&self) -> Option<BarDimensions> {
        match self {
            BarLayout::Single(_) | BarLayout::Stretched(_) => None,
            BarLayout::DualBar { secondary, .. }
            | BarLayout::DualBarAdiabaticEnds { secondary, .. } => Some(*secondary),
        }
    }

    pub fn is_stretched(&self) -> bool {
        matches!(self, BarLayout::Stretched(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            BarLayout::Single(_) => "single bar",
            BarLayout::Stretched(_) => "stretched bar",
            BarLayout::DualBar { .. } => "dual bar",
            BarLayout::DualBarAdiabaticEnds { .. } => "dual bar with adiabatic ends",
        }
    }
}

/// Inputs of the layout decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRequest {
    /// Footprint area of all bars together (one story).
    pub footprint: f64,
    pub aspect_ratio: f64,
    pub perimeter_multiplier: f64,
    pub fixed_width: Option<f64>,
    pub min_bar_size: f64,
    /// Two bars need per-story slicing to split space types between them.
    pub allow_dual: bool,
}

pub fn choose_layout(req: &LayoutRequest, diag: &mut Diagnostics) -> Result<BarLayout> {
    if let Some(width) = req.fixed_width {
        return fixed_width_layout(req, width, diag);
    }

    let base = dimensions::rectangle(req.footprint, req.aspect_ratio)?;
    if req.perimeter_multiplier <= 1. {
        return Ok(BarLayout::Single(base));
    }
    if !req.allow_dual {
        diag.warn(
            Stage::Dimensions,
            format!(
                "Perimeter multiplier {} ignored: the division method does not support detached bars",
                req.perimeter_multiplier
            ),
        );
        return Ok(BarLayout::Single(base));
    }

    let area = req.footprint;
    let target = base.perimeter() * req.perimeter_multiplier;
    diag.info(
        Stage::Dimensions,
        format!(
            "Minimum rectangle is {:.0} ft x {:.0} ft, target perimeter {:.0} ft",
            m_to_ft(base.length),
            m_to_ft(base.width),
            m_to_ft(target)
        ),
    );

    // Two bars, common width: 2·L² − P·L + 4·A = 0
    let disc = target * target - 32. * area;
    if disc > 0. {
        let total = 0.25 * (target + disc.sqrt());
        let width = area / total;
        let (a, b) = split_common_width(total, width, req.aspect_ratio);
        if [a, b, width].iter().all(|&x| x >= req.min_bar_size - SIZE_TOLERANCE) {
            diag.info(
                Stage::Dimensions,
                "Perimeter multiplier met with two detached bars",
            );
            return Ok(BarLayout::DualBar {
                primary: BarDimensions::new(a, width),
                secondary: BarDimensions::new(width, b),
            });
        }
    }

    // Two bars, secondary bar ends not counted: 2·L² − P·L + 2·A = 0
    let disc = target * target - 16. * area;
    if disc > 0. {
        let total = 0.25 * (target + disc.sqrt());
        let width = area / total;
        let a = req.aspect_ratio * (total + width) / (1. + req.aspect_ratio);
        let b = total - a;
        if [a, b, width].iter().all(|&x| x >= req.min_bar_size - SIZE_TOLERANCE) {
            diag.info(
                Stage::Dimensions,
                "Adiabatic ends added to the secondary bar: two full rectangles cannot meet the perimeter multiplier",
            );
            return Ok(BarLayout::DualBarAdiabaticEnds {
                primary: BarDimensions::new(a, width),
                secondary: BarDimensions::new(width, b),
            });
        }
    }

    let bar = dimensions::stretched(area, target)?;
    diag.warn(
        Stage::Dimensions,
        format!(
            "Perimeter multiplier {} met by a stretched bar; aspect ratio {:.2} instead of {}",
            req.perimeter_multiplier,
            bar.aspect_ratio(),
            req.aspect_ratio
        ),
    );
    Ok(BarLayout::Stretched(bar))
}

/// Splits a combined length into the primary and secondary bar lengths so that
/// `(a + w) / (w + b) == ratio`.
fn split_common_width(total: f64, width: f64, ratio: f64) -> (f64, f64) {
    let a = (ratio * (total + width) - width) / (1. + ratio);
    (a, total - a)
}

fn fixed_width_layout(req: &LayoutRequest, width: f64, diag: &mut Diagnostics) -> Result<BarLayout> {
    if req.perimeter_multiplier > 1. {
        diag.info(
            Stage::Dimensions,
            "Perimeter multiplier ignored because a fixed bar width is given",
        );
    }
    let (bar, adjusted) = dimensions::with_fixed_width(req.footprint, width, req.min_bar_size)?;
    if adjusted {
        diag.warn(
            Stage::Dimensions,
            format!(
                "Fixed bar width {width:.2} m gives a bar shorter than the minimum size; width reduced to {:.2} m",
                bar.width
            ),
        );
    }

    let realized = bar.aspect_ratio();
    if (realized - req.aspect_ratio).abs() <= 1e-9 * req.aspect_ratio {
        return Ok(BarLayout::Single(bar));
    }
    if req.aspect_ratio > realized || !req.allow_dual {
        diag.warn(
            Stage::Dimensions,
            format!(
                "Fixed bar width forces aspect ratio {realized:.2} instead of {}",
                req.aspect_ratio
            ),
        );
        return Ok(BarLayout::Single(bar));
    }

    // The bar is too long for the requested ratio; fold it into two bars
    let (a, b) = split_common_width(bar.length, bar.width, req.aspect_ratio);
    if a.min(b) >= req.min_bar_size - SIZE_TOLERANCE {
        diag.info(
            Stage::Dimensions,
            "Fixed bar width: aspect ratio met with two detached bars",
        );
        return Ok(BarLayout::DualBar {
            primary: BarDimensions::new(a, bar.width),
            secondary: BarDimensions::new(bar.width, b),
        });
    }
    diag.warn(
        Stage::Dimensions,
        format!(
            "Second bar would be below the minimum size; single bar with aspect ratio {realized:.2} instead of {}",
            req.aspect_ratio
        ),
    );
    Ok(BarLayout::Single(bar))
}
