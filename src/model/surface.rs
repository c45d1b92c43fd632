use crate::geom::polygon::Polygon;
use crate::model::boundary::BoundaryCondition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Wall,
    Floor,
    RoofCeiling,
}

/// Window punched into a wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSurface {
    pub name: String,
    pub polygon: Polygon,
}

/// A face of a zone volume. The polygon normal points out of the volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub kind: SurfaceKind,
    pub polygon: Polygon,
    pub boundary: BoundaryCondition,
    pub windows: Vec<SubSurface>,
}

impl Surface {
    pub fn new(
        name: impl Into<String>,
        kind: SurfaceKind,
        polygon: Polygon,
        boundary: BoundaryCondition,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            polygon,
            boundary,
            windows: Vec::new(),
        }
    }

    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    pub fn window_area(&self) -> f64 {
        self.windows.iter().map(|w| w.polygon.area()).sum()
    }

    pub fn is_wall(&self) -> bool {
        self.kind == SurfaceKind::Wall
    }

    /// Azimuth of the outward normal relative to the volume's own north, walls only.
    pub fn relative_azimuth(&self) -> Option<f64> {
        if !self.is_wall() {
            return None;
        }
        self.polygon.normal().azimuth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IsClose;
    use crate::geom::point::Point;
    use anyhow::Result;

    #[test]
    fn test_wall_azimuth() -> Result<()> {
        // Outward normal towards -Y (south)
        let poly = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(5., 0., 0.),
            Point::new(5., 0., 3.),
            Point::new(0., 0., 3.),
        ])?;
        let wall = Surface::new("w", SurfaceKind::Wall, poly, BoundaryCondition::Exterior);
        assert!(wall.relative_azimuth().is_some_and(|a| a.is_close(180.)));
        assert!(wall.area().is_close(15.));
        assert!(wall.window_area().is_close(0.));
        Ok(())
    }

    #[test]
    fn test_floor_has_no_azimuth() -> Result<()> {
        let poly = Polygon::rectangle_xy(0., 0., 1., 1., 0.)?.flip();
        let floor = Surface::new("f", SurfaceKind::Floor, poly, BoundaryCondition::Ground);
        assert!(floor.relative_azimuth().is_none());
        Ok(())
    }
}
