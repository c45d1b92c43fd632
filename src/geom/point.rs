use crate::geom::EPS;
use crate::geom::vector::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        self.is_close_within(other, EPS)
    }

    /// Like `is_close()`, but with an explicit per-coordinate tolerance.
    pub fn is_close_within(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }

    /// Returns a copy moved vertically to `z`.
    pub fn with_z(&self, z: f64) -> Self {
        Self { z, ..*self }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        Vector::from_points(*self, *other).length()
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new(
            0.5 * (self.x + other.x),
            0.5 * (self.y + other.y),
            0.5 * (self.z + other.z),
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(
            f,
            "Point({:.prec$}, {:.prec$}, {:.prec$})",
            self.x,
            self.y,
            self.z,
            prec = prec
        )
    }
}

// Point - Point is deliberately absent, use Vector::from_points()
impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, other: Vector) -> Self {
        Self {
            x: self.x + other.dx,
            y: self.y + other.dy,
            z: self.z + other.dz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        let pa = Point::new(5., 5., 5.);
        let pb = Point::new(5.0000000000001, 5., 5.);
        let pc = Point::new(5.0001, 5., 5.);
        assert!(pa.is_close(&pb));
        assert!(!pa.is_close(&pc));
        assert!(pa.is_close_within(&pc, 1e-3));
    }

    #[test]
    fn test_add_vector() {
        let p = Point::new(1., 2., 3.) + Vector::new(0.5, -2., 1.);
        assert!(p.is_close(&Point::new(1.5, 0., 4.)));
    }

    #[test]
    fn test_midpoint_and_distance() {
        let p0 = Point::new(0., 0., 0.);
        let p1 = Point::new(3., 4., 0.);
        assert!(p0.midpoint(&p1).is_close(&Point::new(1.5, 2., 0.)));
        assert!((p0.distance(&p1) - 5.).abs() < EPS);
        assert!(p1.with_z(7.).is_close(&Point::new(3., 4., 7.)));
    }

    #[test]
    fn test_display() {
        let p = Point::new(1., 2.25, 3.);
        assert_eq!(format!("{p}"), "Point(1.00, 2.25, 3.00)");
        assert_eq!(format!("{p:.1}"), "Point(1.0, 2.2, 3.0)");
    }
}
