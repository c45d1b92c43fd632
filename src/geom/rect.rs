use crate::geom::EPS;
use crate::geom::point::Point;
use crate::geom::polygon::Polygon;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Horizontal axis of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanAxis {
    X,
    Y,
}

impl PlanAxis {
    pub fn other(self) -> Self {
        match self {
            PlanAxis::X => PlanAxis::Y,
            PlanAxis::Y => PlanAxis::X,
        }
    }
}

/// Axis-aligned rectangle in plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Rect {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        if xmax - xmin < EPS || ymax - ymin < EPS {
            return Err(anyhow!(
                "Rectangle has no area: x=[{xmin}, {xmax}], y=[{ymin}, {ymax}]"
            ));
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// Rectangle of `length` along X and `width` along Y centered at `center`.
    pub fn centered(center: Point, length: f64, width: f64) -> Result<Self> {
        Self::new(
            center.x - 0.5 * length,
            center.y - 0.5 * width,
            center.x + 0.5 * length,
            center.y + 0.5 * width,
        )
    }

    /// Builds a rectangle from coordinates measured along (`u`) and
    /// across (`v`) the given axis.
    pub fn from_uv(axis: PlanAxis, u0: f64, u1: f64, v0: f64, v1: f64) -> Result<Self> {
        match axis {
            PlanAxis::X => Self::new(u0, v0, u1, v1),
            PlanAxis::Y => Self::new(v0, u0, v1, u1),
        }
    }

    pub fn dx(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn dy(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.dx() * self.dy()
    }

    pub fn center(&self) -> Point {
        Point::new(
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
            0.,
        )
    }

    /// The longer side's axis (X on ties).
    pub fn major_axis(&self) -> PlanAxis {
        if self.dx() >= self.dy() {
            PlanAxis::X
        } else {
            PlanAxis::Y
        }
    }

    /// `(min, max)` extent along an axis.
    pub fn span(&self, axis: PlanAxis) -> (f64, f64) {
        match axis {
            PlanAxis::X => (self.xmin, self.xmax),
            PlanAxis::Y => (self.ymin, self.ymax),
        }
    }

    pub fn extent(&self, axis: PlanAxis) -> f64 {
        let (a, b) = self.span(axis);
        b - a
    }

    /// Shrinks or grows the rectangle about its center; edges scale by `factor`.
    pub fn scaled_about_center(&self, factor: f64) -> Result<Self> {
        Self::centered(self.center(), self.dx() * factor, self.dy() * factor)
    }

    /// Counter-clockwise (seen from above) polygon at elevation `z`.
    pub fn to_polygon(&self, z: f64) -> Result<Polygon> {
        Polygon::rectangle_xy(self.xmin, self.ymin, self.xmax, self.ymax, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IsClose;

    #[test]
    fn test_centered() -> Result<()> {
        let r = Rect::centered(Point::new(10., 0., 0.), 4., 2.)?;
        assert!(r.xmin.is_close(8.) && r.xmax.is_close(12.));
        assert!(r.ymin.is_close(-1.) && r.ymax.is_close(1.));
        assert!(r.area().is_close(8.));
        assert_eq!(r.major_axis(), PlanAxis::X);
        Ok(())
    }

    #[test]
    fn test_from_uv() -> Result<()> {
        let r = Rect::from_uv(PlanAxis::Y, 0., 10., 2., 3.)?;
        assert!(r.dx().is_close(1.) && r.dy().is_close(10.));
        assert_eq!(r.major_axis(), PlanAxis::Y);
        assert!(r.extent(PlanAxis::Y).is_close(10.));
        Ok(())
    }

    #[test]
    fn test_degenerate() {
        assert!(Rect::new(0., 0., 0., 1.).is_err());
    }

    #[test]
    fn test_scaled_and_polygon() -> Result<()> {
        let r = Rect::new(0., 0., 10., 20.)?.scaled_about_center(0.5)?;
        assert!(r.area().is_close(50.));
        assert!(r.center().is_close(&Point::new(5., 10., 0.)));
        let poly = r.to_polygon(3.)?;
        assert!(poly.area().is_close(50.));
        assert!(poly.normal().dz.is_close(1.));
        Ok(())
    }
}
