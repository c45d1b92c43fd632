//! Axis-aligned rectangles in 3D, used to intersect faces of box-shaped volumes.

use crate::geom::TOLERANCE;
use crate::geom::point::Point;
use crate::geom::polygon::Polygon;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis3 {
    X,
    Y,
    Z,
}

/// Coordinate interval.
pub type Span = (f64, f64);

/// Rectangle lying in the plane `axis = c`, spanning `a` and `b` along the
/// two other axes (Y, Z for X; X, Z for Y; X, Y for Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneRect {
    pub axis: Axis3,
    pub c: f64,
    /// +1 if the normal points along +axis, -1 otherwise.
    pub facing: f64,
    pub a: Span,
    pub b: Span,
}

impl PlaneRect {
    /// Recognizes an axis-aligned rectangular polygon.
    pub fn of(poly: &Polygon) -> Option<Self> {
        let n = poly.normal();
        let (axis, component) = [(Axis3::X, n.dx), (Axis3::Y, n.dy), (Axis3::Z, n.dz)]
            .into_iter()
            .find(|(_, v)| v.abs() > 1. - TOLERANCE)?;
        let pts = poly.vertices();
        let (c, a0, b0) = split(axis, &pts[0]);
        let mut a = (a0, a0);
        let mut b = (b0, b0);
        for p in pts.iter().skip(1) {
            let (_, pa, pb) = split(axis, p);
            a = (a.0.min(pa), a.1.max(pa));
            b = (b.0.min(pb), b.1.max(pb));
        }
        let rect = Self {
            axis,
            c,
            facing: component.signum(),
            a,
            b,
        };
        let area = poly.area();
        ((rect.area() - area).abs() <= TOLERANCE * (1. + area)).then_some(rect)
    }

    pub fn area(&self) -> f64 {
        (self.a.1 - self.a.0) * (self.b.1 - self.b.0)
    }

    /// True if `other` lies in the same plane and faces the opposite way.
    pub fn faces(&self, other: &Self, tol: f64) -> bool {
        self.axis == other.axis && self.facing != other.facing && (self.c - other.c).abs() <= tol
    }

    /// Common part of the two spans, if it has a positive area.
    pub fn overlap(&self, other: &Self, tol: f64) -> Option<(Span, Span)> {
        let a = (self.a.0.max(other.a.0), self.a.1.min(other.a.1));
        let b = (self.b.0.max(other.b.0), self.b.1.min(other.b.1));
        (a.1 - a.0 > tol && b.1 - b.0 > tol).then_some((a, b))
    }

    /// Same plane and orientation, different extent.
    pub fn with_spans(&self, a: Span, b: Span) -> Self {
        Self { a, b, ..*self }
    }

    /// Parts of this rectangle not covered by `holes`, which must not overlap
    /// each other. Pieces are merged along `a` within each band of `b`.
    pub fn remainder(&self, holes: &[(Span, Span)], tol: f64) -> Vec<(Span, Span)> {
        let a_cuts = cuts(self.a, holes.iter().map(|h| h.0), tol);
        let b_cuts = cuts(self.b, holes.iter().map(|h| h.1), tol);
        let covered = |a: f64, b: f64| {
            holes
                .iter()
                .any(|(ha, hb)| a > ha.0 && a < ha.1 && b > hb.0 && b < hb.1)
        };

        let mut pieces = Vec::new();
        for bw in b_cuts.windows(2) {
            let bm = 0.5 * (bw[0] + bw[1]);
            let mut run: Option<f64> = None;
            for aw in a_cuts.windows(2) {
                let am = 0.5 * (aw[0] + aw[1]);
                match (covered(am, bm), run) {
                    (false, None) => run = Some(aw[0]),
                    (true, Some(start)) => {
                        pieces.push(((start, aw[0]), (bw[0], bw[1])));
                        run = None;
                    }
                    _ => {}
                }
            }
            if let (Some(start), Some(end)) = (run, a_cuts.last()) {
                pieces.push(((start, *end), (bw[0], bw[1])));
            }
        }
        merge_bands(pieces, tol)
    }

    /// Polygon of this rectangle with its normal along `facing`.
    pub fn to_polygon(&self) -> Result<Polygon> {
        let pts = vec![
            join(self.axis, self.c, self.a.0, self.b.0),
            join(self.axis, self.c, self.a.1, self.b.0),
            join(self.axis, self.c, self.a.1, self.b.1),
            join(self.axis, self.c, self.a.0, self.b.1),
        ];
        let poly = Polygon::new(pts)?;
        let n = poly.normal();
        let component = match self.axis {
            Axis3::X => n.dx,
            Axis3::Y => n.dy,
            Axis3::Z => n.dz,
        };
        if component * self.facing < 0. {
            Ok(poly.flip())
        } else {
            Ok(poly)
        }
    }
}

/// `(c, a, b)` coordinates of a point for a plane normal to `axis`.
fn split(axis: Axis3, p: &Point) -> (f64, f64, f64) {
    match axis {
        Axis3::X => (p.x, p.y, p.z),
        Axis3::Y => (p.y, p.x, p.z),
        Axis3::Z => (p.z, p.x, p.y),
    }
}

fn join(axis: Axis3, c: f64, a: f64, b: f64) -> Point {
    match axis {
        Axis3::X => Point::new(c, a, b),
        Axis3::Y => Point::new(a, c, b),
        Axis3::Z => Point::new(a, b, c),
    }
}

/// Sorted cut positions within `span`, closer than `tol` collapsed.
fn cuts(span: Span, holes: impl Iterator<Item = Span>, tol: f64) -> Vec<f64> {
    let mut v: Vec<f64> = vec![span.0, span.1];
    for (lo, hi) in holes {
        v.extend([lo, hi].into_iter().filter(|x| *x > span.0 && *x < span.1));
    }
    v.sort_by(f64::total_cmp);
    v.dedup_by(|x, y| (*x - *y).abs() <= tol);
    if let Some(last) = v.last_mut() {
        *last = span.1;
    }
    v
}

/// Merges vertically adjacent pieces with the same `a` span.
fn merge_bands(pieces: Vec<(Span, Span)>, tol: f64) -> Vec<(Span, Span)> {
    let mut merged: Vec<(Span, Span)> = Vec::new();
    for (a, b) in pieces {
        let same = |x: Span, y: Span| (x.0 - y.0).abs() <= tol && (x.1 - y.1).abs() <= tol;
        match merged
            .iter_mut()
            .find(|(ma, mb)| same(*ma, a) && (mb.1 - b.0).abs() <= tol)
        {
            Some(m) => m.1.1 = b.1,
            None => merged.push((a, b)),
        }
    }
    merged
}
