//! Geometric primitives used by the massing pipeline.
//!
//! Everything the pipeline builds is made of planar polygons whose edges are
//! parallel to the coordinate axes, but the primitives here do not assume it.

pub mod bboxes;
pub mod plane_rect;
pub mod point;
pub mod polygon;
pub mod rect;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-9;

/// Tolerance for coordinates that were computed along different paths
/// (e.g. a ceiling at `z0 + h` and a floor at `z0 + 2h - h`).
pub const TOLERANCE: f64 = 1e-6;

pub trait IsClose {
    fn is_close(&self, other: f64) -> bool;
    fn is_close_within(&self, other: f64, tol: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }

    fn is_close_within(&self, other: f64, tol: f64) -> bool {
        (self - other).abs() <= tol
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.);
    // rem_euclid may return exactly 360.0 for tiny negative inputs
    if d >= 360. { 0. } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        assert!(1.0_f64.is_close(1.0 + 1e-12));
        assert!(!1.0_f64.is_close(1.0001));
        assert!(1.0_f64.is_close_within(1.0001, 1e-3));
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(normalize_degrees(370.).is_close(10.));
        assert!(normalize_degrees(-90.).is_close(270.));
        assert!(normalize_degrees(0.).is_close(0.));
        assert!(normalize_degrees(-1e-20) < 360.);
    }
}
