use crate::geom::point::Point;

/// Returns the `(min, max)` corners of the box holding all points `pts`,
/// or `None` if `pts` is empty.
pub fn bounding_box(pts: &[Point]) -> Option<(Point, Point)> {
    let first = pts.first()?;
    let (pmin, pmax) = pts.iter().fold((*first, *first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
        )
    });
    Some((pmin, pmax))
}

/// Checks whether two bounding boxes overlap or touch (within `tol`).
pub fn are_bboxes_overlapping(min1: Point, max1: Point, min2: Point, max2: Point, tol: f64) -> bool {
    // Boxes don't overlap if separated along any axis
    if max1.x < min2.x - tol || min1.x > max2.x + tol {
        return false;
    }
    if max1.y < min2.y - tol || min1.y > max2.y + tol {
        return false;
    }
    if max1.z < min2.z - tol || min1.z > max2.z + tol {
        return false;
    }
    true
}

/// Merges two boxes into the smallest box containing both.
pub fn union(a: (Point, Point), b: (Point, Point)) -> (Point, Point) {
    (
        Point::new(a.0.x.min(b.0.x), a.0.y.min(b.0.y), a.0.z.min(b.0.z)),
        Point::new(a.1.x.max(b.1.x), a.1.y.max(b.1.y), a.1.z.max(b.1.z)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let pts = vec![
            Point::new(1., -1., 0.),
            Point::new(-2., 3., 5.),
            Point::new(0., 0., -1.),
        ];
        let (pmin, pmax) = bounding_box(&pts).unwrap();
        assert!(pmin.is_close(&Point::new(-2., -1., -1.)));
        assert!(pmax.is_close(&Point::new(1., 3., 5.)));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn test_overlapping() {
        let o = Point::new(0., 0., 0.);
        let one = Point::new(1., 1., 1.);
        let two = Point::new(2., 2., 2.);
        let three = Point::new(3., 3., 3.);
        assert!(are_bboxes_overlapping(o, one, one, two, 1e-9)); // touching
        assert!(!are_bboxes_overlapping(o, one, two, three, 1e-9));
        let (lo, hi) = union((o, one), (two, three));
        assert!(lo.is_close(&o) && hi.is_close(&three));
    }
}
