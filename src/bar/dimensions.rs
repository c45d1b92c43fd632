//! Rectangle sizing from area, aspect ratio and perimeter targets.
//!
//! Length runs along X (the north and south facades), width along Y,
//! so the aspect ratio is the N/S facade length over the E/W facade length.

use crate::error::MassingError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarDimensions {
    pub length: f64,
    pub width: f64,
}

impl BarDimensions {
    pub fn new(length: f64, width: f64) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    pub fn perimeter(&self) -> f64 {
        2. * (self.length + self.width)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.length / self.width
    }

    /// Same rectangle turned by 90 degrees.
    pub fn rotated(&self) -> Self {
        Self::new(self.width, self.length)
    }
}

/// Sizing request for a single rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionRequest {
    pub area: f64,
    pub aspect_ratio: f64,
    /// Target perimeter; the minimum perimeter for `area` and `aspect_ratio` when `None`.
    pub target_perimeter: Option<f64>,
    /// Multiplier applied to the target perimeter.
    pub perimeter_multiplier: f64,
    pub fixed_width: Option<f64>,
}

impl DimensionRequest {
    pub fn new(area: f64, aspect_ratio: f64) -> Self {
        Self {
            area,
            aspect_ratio,
            target_perimeter: None,
            perimeter_multiplier: 1.,
            fixed_width: None,
        }
    }
}

/// Solves a request:
/// - fixed width: `length = area / width`,
/// - multiplier of 1 (or less): the rectangle with the requested aspect ratio,
/// - multiplier above 1: the rectangle with the requested area and the multiplied
///   perimeter; the aspect ratio is whatever results.
pub fn solve(req: &DimensionRequest) -> Result<BarDimensions> {
    if let Some(width) = req.fixed_width {
        positive("bar width", width)?;
        positive("footprint area", req.area)?;
        return Ok(BarDimensions::new(req.area / width, width));
    }
    let base = rectangle(req.area, req.aspect_ratio)?;
    if req.perimeter_multiplier <= 1. {
        return Ok(base);
    }
    let target = req.target_perimeter.unwrap_or(base.perimeter()) * req.perimeter_multiplier;
    stretched(req.area, target)
}

/// Rectangle with the given area and length/width ratio.
pub fn rectangle(area: f64, aspect_ratio: f64) -> Result<BarDimensions> {
    positive("footprint area", area)?;
    positive("aspect ratio", aspect_ratio)?;
    let width = (area / aspect_ratio).sqrt();
    Ok(BarDimensions::new(area / width, width))
}

/// Perimeter of the rectangle with the given area and aspect ratio.
pub fn minimum_perimeter(area: f64, aspect_ratio: f64) -> Result<f64> {
    Ok(rectangle(area, aspect_ratio)?.perimeter())
}

/// Rectangle with the given area and perimeter, longer side first.
///
/// Solves `2·len² − P·len + 2·A = 0`.
pub fn stretched(area: f64, perimeter: f64) -> Result<BarDimensions> {
    positive("footprint area", area)?;
    positive("perimeter", perimeter)?;
    let disc = perimeter * perimeter - 16. * area;
    if disc < 0. {
        return Err(MassingError::InfeasiblePerimeter { area, perimeter }.into());
    }
    let length = 0.25 * (perimeter + disc.sqrt());
    Ok(BarDimensions::new(length, area / length))
}

/// Aspect ratio of the rectangle with the given area and perimeter.
pub fn aspect_ratio_from_perimeter(area: f64, perimeter: f64) -> Result<f64> {
    Ok(stretched(area, perimeter)?.aspect_ratio())
}

/// Rectangle of fixed `width`, unless that would make it shorter than
/// `min_length`; then length is pinned to `min_length` and width shrinks.
///
/// The flag is true if the width had to be changed.
pub fn with_fixed_width(area: f64, width: f64, min_length: f64) -> Result<(BarDimensions, bool)> {
    positive("footprint area", area)?;
    positive("bar width", width)?;
    if area / width >= min_length {
        Ok((BarDimensions::new(area / width, width), false))
    } else {
        Ok((BarDimensions::new(min_length, area / min_length), true))
    }
}

pub(crate) fn positive(what: &'static str, value: f64) -> Result<()> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(MassingError::NonPositive { what, value }.into())
    }
}
