use crate::geom::bboxes::bounding_box;
use crate::geom::point::Point;
use crate::geom::vector::Vector;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar polygon given as an ordered, implicitly closed loop of points.
///
/// The normal `vn` follows the right-hand rule over the vertex order, so a
/// loop that is counter-clockwise seen from above has an upward normal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pts: Vec<Point>,
    vn: Vector,
}

impl Polygon {
    pub fn new(pts: Vec<Point>) -> Result<Self> {
        if pts.len() < 3 {
            return Err(anyhow!(
                "Polygon needs at least 3 points, got {}",
                pts.len()
            ));
        }
        let vn = newell_vector(&pts)
            .normalize()
            .ok_or_else(|| anyhow!("Polygon has zero area: {:?}", pts))?;
        Ok(Self { pts, vn })
    }

    /// Axis-aligned rectangle in the horizontal plane `z`,
    /// counter-clockwise when viewed from above.
    pub fn rectangle_xy(xmin: f64, ymin: f64, xmax: f64, ymax: f64, z: f64) -> Result<Self> {
        Self::new(vec![
            Point::new(xmin, ymin, z),
            Point::new(xmax, ymin, z),
            Point::new(xmax, ymax, z),
            Point::new(xmin, ymax, z),
        ])
    }

    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    /// Unit normal vector.
    pub fn normal(&self) -> Vector {
        self.vn
    }

    pub fn area(&self) -> f64 {
        0.5 * newell_vector(&self.pts).length()
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| a.distance(&b)).sum()
    }

    /// Returns consecutive vertex pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| (self.pts[i], self.pts[(i + 1) % n]))
    }

    /// Area-weighted centroid (triangle fan around the first vertex).
    pub fn centroid(&self) -> Point {
        let p0 = self.pts[0];
        let mut acc = Vector::new(0., 0., 0.);
        let mut total = 0.;
        for i in 1..self.pts.len() - 1 {
            let (p1, p2) = (self.pts[i], self.pts[i + 1]);
            let w = Vector::from_points(p0, p1)
                .cross(&Vector::from_points(p0, p2))
                .dot(&self.vn)
                * 0.5;
            let c = Vector::new(
                (p0.x + p1.x + p2.x) / 3.,
                (p0.y + p1.y + p2.y) / 3.,
                (p0.z + p1.z + p2.z) / 3.,
            );
            acc = acc + c * w;
            total += w;
        }
        if total.abs() < f64::EPSILON {
            return p0;
        }
        Point::new(acc.dx / total, acc.dy / total, acc.dz / total)
    }

    /// `(min, max)` corners of the polygon's bounding box.
    pub fn bbox(&self) -> (Point, Point) {
        bounding_box(&self.pts).unwrap_or((self.pts[0], self.pts[0]))
    }

    /// Returns a copy with reversed vertex order and opposite normal.
    pub fn flip(&self) -> Self {
        let mut pts = self.pts.clone();
        pts.reverse();
        Self { pts, vn: -self.vn }
    }

    pub fn translate(&self, v: Vector) -> Self {
        Self {
            pts: self.pts.iter().map(|p| *p + v).collect(),
            vn: self.vn,
        }
    }

    /// Moves the polygon by `distance` along its own normal.
    pub fn offset(&self, distance: f64) -> Self {
        self.translate(self.vn * distance)
    }

    /// Scales the polygon about its centroid by a linear `factor`.
    ///
    /// The area changes by `factor²`.
    pub fn scale_about_centroid(&self, factor: f64) -> Result<Self> {
        let c = self.centroid();
        let pts = self
            .pts
            .iter()
            .map(|p| c + Vector::from_points(c, *p) * factor)
            .collect();
        Self::new(pts)
    }

    /// Signed distance of a point from the polygon's plane.
    pub fn plane_distance(&self, pt: &Point) -> f64 {
        Vector::from_points(self.pts[0], *pt).dot(&self.vn)
    }

    /// Returns a copy without duplicate consecutive vertices and without
    /// collinear vertices, or `None` if nothing with area is left.
    pub fn cleaned(&self, tol: f64) -> Option<Self> {
        let mut pts: Vec<Point> = Vec::with_capacity(self.pts.len());
        for p in self.pts.iter() {
            if pts.last().is_none_or(|q| !q.is_close_within(p, tol)) {
                pts.push(*p);
            }
        }
        while pts.len() > 1 && pts[0].is_close_within(&pts[pts.len() - 1], tol) {
            pts.pop();
        }

        loop {
            let n = pts.len();
            if n < 3 {
                return None;
            }
            let collinear = (0..n).find(|&i| {
                let prev = pts[(i + n - 1) % n];
                let next = pts[(i + 1) % n];
                let a = Vector::from_points(prev, pts[i]);
                let b = Vector::from_points(pts[i], next);
                a.cross(&b).length() <= tol * (a.length() + b.length())
            });
            match collinear {
                Some(i) => {
                    pts.remove(i);
                }
                None => break,
            }
        }

        Self::new(pts).ok()
    }

    /// True if both polygons have the same vertex loop (any starting vertex, same direction).
    pub fn is_coincident(&self, other: &Self, tol: f64) -> bool {
        let n = self.pts.len();
        if n != other.pts.len() {
            return false;
        }
        let Some(start) = other
            .pts
            .iter()
            .position(|p| p.is_close_within(&self.pts[0], tol))
        else {
            return false;
        };
        (0..n).all(|i| self.pts[i].is_close_within(&other.pts[(start + i) % n], tol))
    }

    /// True if `other` is this polygon seen from the other side.
    pub fn is_coincident_reversed(&self, other: &Self, tol: f64) -> bool {
        self.flip().is_coincident(other, tol)
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(f, "Polygon(")?;
        for (i, p) in self.pts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.prec$}", p, prec = prec)?;
        }
        write!(f, ")")
    }
}

/// Newell's method: twice the vector area of a (possibly non-convex) planar loop.
fn newell_vector(pts: &[Point]) -> Vector {
    let n = pts.len();
    let mut v = Vector::new(0., 0., 0.);
    for i in 0..n {
        let c = pts[i];
        let nx = pts[(i + 1) % n];
        v.dx += (c.y - nx.y) * (c.z + nx.z);
        v.dy += (c.z - nx.z) * (c.x + nx.x);
        v.dz += (c.x - nx.x) * (c.y + nx.y);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IsClose;

    #[test]
    fn test_rectangle() -> Result<()> {
        let poly = Polygon::rectangle_xy(0., 0., 4., 2., 3.)?;
        assert!(poly.area().is_close(8.));
        assert!(poly.perimeter().is_close(12.));
        assert!(poly.normal().is_close(&Vector::new(0., 0., 1.)));
        assert!(poly.centroid().is_close(&Point::new(2., 1., 3.)));
        Ok(())
    }

    #[test]
    fn test_degenerate() {
        let line = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(2., 0., 0.),
        ];
        assert!(Polygon::new(line).is_err());
        assert!(Polygon::new(vec![Point::new(0., 0., 0.)]).is_err());
    }

    #[test]
    fn test_flip_and_offset() -> Result<()> {
        let poly = Polygon::rectangle_xy(0., 0., 1., 1., 0.)?;
        let flipped = poly.flip();
        assert!(flipped.normal().is_close(&Vector::new(0., 0., -1.)));
        assert!(poly.is_coincident_reversed(&flipped, 1e-9));
        assert!(!poly.is_coincident(&flipped, 1e-9));

        let lifted = poly.offset(2.5);
        assert!(lifted.vertices().iter().all(|p| p.z.is_close(2.5)));
        let lowered = flipped.offset(1.);
        assert!(lowered.vertices().iter().all(|p| p.z.is_close(-1.)));
        Ok(())
    }

    #[test]
    fn test_cleaned() -> Result<()> {
        let pts = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(1., 0., 0.), // duplicate
            Point::new(2., 0., 0.), // collinear neighbour
            Point::new(2., 1., 0.),
            Point::new(0., 1., 0.),
            Point::new(0., 0., 0.), // closing duplicate
        ];
        let poly = Polygon::new(pts)?;
        let clean = poly.cleaned(1e-9).unwrap();
        assert_eq!(clean.vertices().len(), 4);
        assert!(clean.area().is_close(2.));
        Ok(())
    }

    #[test]
    fn test_coincident_with_rotation() -> Result<()> {
        let a = Polygon::rectangle_xy(0., 0., 1., 1., 0.)?;
        let mut pts = a.vertices().to_vec();
        pts.rotate_left(2);
        let b = Polygon::new(pts)?;
        assert!(a.is_coincident(&b, 1e-9));
        let c = Polygon::rectangle_xy(0., 0., 1., 1.1, 0.)?;
        assert!(!a.is_coincident(&c, 1e-9));
        Ok(())
    }

    #[test]
    fn test_scale_about_centroid() -> Result<()> {
        let wall = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(10., 0., 0.),
            Point::new(10., 0., 3.),
            Point::new(0., 0., 3.),
        ])?;
        let window = wall.scale_about_centroid(0.4_f64.sqrt())?;
        assert!((window.area() / wall.area()).is_close(0.4));
        assert!(window.centroid().is_close(&wall.centroid()));
        assert!(window.normal().is_close(&wall.normal()));
        Ok(())
    }
}
