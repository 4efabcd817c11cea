//! Polygon simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Traced zone outlines carry one vertex per boundary pixel. Simplification
//! reduces them to a handful of vertices while keeping every dropped point
//! within `epsilon` of the segment that replaces it.
//!
//! Outlines are closed loops, so [`simplify_closed`] splits the loop into
//! two open chains at a pair of far-apart anchors and simplifies each with
//! the open-chain [`simplify`].

use crate::types::{Point, Polyline};

/// Default tolerance as a fraction of the outline perimeter.
pub const DEFAULT_PERIMETER_FRACTION: f64 = 0.002;

/// Simplify an open polyline using the Ramer-Douglas-Peucker algorithm.
///
/// Points within `tolerance` of the line between their retained neighbours
/// are removed. Both endpoints are always kept. A tolerance of 0.0 keeps
/// every point that is not exactly collinear.
///
/// Polylines with fewer than 3 points are returned unchanged.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, tolerance: f64) -> Polyline {
    Polyline::new(simplify_chain(polyline.points(), tolerance))
}

/// Simplify a closed loop using the Ramer-Douglas-Peucker algorithm.
///
/// The loop is cut at its first point and the point farthest from it. Both
/// halves are simplified as open chains sharing those two anchors, then
/// rejoined. The result is a subset of the input points in the same cyclic
/// order, starting at the same first point.
///
/// Loops with fewer than 3 points are returned unchanged.
#[must_use = "returns the simplified polygon"]
pub fn simplify_closed(polygon: &Polyline, tolerance: f64) -> Polyline {
    let points = polygon.points();
    if points.len() < 3 {
        return polygon.clone();
    }

    let anchor = points[0];
    let mut far_idx = 0;
    let mut far_dist = 0.0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let d = p.distance_squared(anchor);
        if d > far_dist {
            far_dist = d;
            far_idx = i;
        }
    }
    if far_idx == 0 {
        // Every point coincides with the anchor.
        return Polyline::new(vec![anchor]);
    }

    let outward = simplify_chain(&points[..=far_idx], tolerance);
    let mut back: Vec<Point> = points[far_idx..].to_vec();
    back.push(anchor);
    let homeward = simplify_chain(&back, tolerance);

    // Both chains end on the other's start; drop the shared endpoints.
    let mut result = outward;
    result.pop();
    result.extend_from_slice(&homeward[..homeward.len() - 1]);
    Polyline::new(result)
}

/// Simplify a traced outline with a tolerance proportional to its length.
///
/// `epsilon = fraction * perimeter`, the perimeter including the closing
/// edge.
#[must_use = "returns the simplified polygon"]
pub fn simplify_contour(contour: &Polyline, fraction: f64) -> Polyline {
    simplify_closed(contour, fraction * perimeter(contour))
}

/// Length of a closed loop, including the edge from the last point back to
/// the first.
#[must_use]
pub fn perimeter(polygon: &Polyline) -> f64 {
    let points = polygon.points();
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.distance(*b))
        .sum()
}

fn simplify_chain(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, tolerance, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line through them. If that distance exceeds `tolerance`, the point is
/// kept and both sub-chains are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line through `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
pub(crate) fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::contour::{ContourSelector, ContourSelectorKind};

    /// Distance from `p` to the closest point of segment `ab`.
    fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length_sq = dx.mul_add(dx, dy * dy);
        if length_sq == 0.0 {
            return p.distance(a);
        }
        let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
        p.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }

    fn distance_to_polygon(p: Point, polygon: &Polyline) -> f64 {
        let v = polygon.points();
        (0..v.len())
            .map(|i| segment_distance(p, v[i], v[(i + 1) % v.len()]))
            .fold(f64::INFINITY, f64::min)
    }

    fn traced_disk(radius: u32) -> Polyline {
        let size = radius * 2 + 5;
        let c = f64::from(size) / 2.0;
        let r = f64::from(radius);
        let mask = image::GrayImage::from_fn(size, size, |x, y| {
            let d = (f64::from(x) - c).hypot(f64::from(y) - c);
            image::Luma([if d <= r { 255 } else { 0 }])
        });
        ContourSelectorKind::LargestExternal.select(&mask).unwrap()
    }

    #[test]
    fn open_chain_short_inputs_unchanged() {
        assert!(simplify(&Polyline::default(), 1.0).is_empty());
        let two = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert_eq!(simplify(&two, 1.0), two);
    }

    #[test]
    fn collinear_points_collapse_to_endpoints() {
        let pl = Polyline::new((0..5).map(|i| Point::new(f64::from(i), f64::from(i))).collect());
        let result = simplify(&pl, 0.1);
        assert_eq!(
            result.points(),
            &[Point::new(0.0, 0.0), Point::new(4.0, 4.0)]
        );
    }

    #[test]
    fn zigzag_peaks_follow_tolerance() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 5.0),
            Point::new(4.0, 0.0),
            Point::new(6.0, 5.0),
            Point::new(8.0, 0.0),
        ]);
        assert_eq!(simplify(&pl, 1.0).len(), 5);
        assert_eq!(simplify(&pl, 10.0).len(), 2);
    }

    #[test]
    fn perpendicular_distance_cases() {
        let d = perpendicular_distance(
            Point::new(2.0, -1.0),
            Point::new(0.0, 0.0),
            Point::new(4.0, 2.0),
        );
        assert!((d - 8.0 / 20.0_f64.sqrt()).abs() < 1e-10);

        let coincident = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((coincident - 5.0).abs() < 1e-10);
    }

    #[test]
    fn perimeter_includes_closing_edge() {
        let square = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(0.0, 3.0),
        ]);
        assert!((perimeter(&square) - 12.0).abs() < 1e-12);
        assert!(perimeter(&Polyline::new(vec![Point::new(1.0, 1.0)])).abs() < f64::EPSILON);
    }

    #[test]
    fn closed_rectangle_reduces_to_corners() {
        // Every boundary pixel of a 10 x 6 rectangle, clockwise from (0,0).
        let mut pts = Vec::new();
        pts.extend((0..10).map(|x| Point::new(f64::from(x), 0.0)));
        pts.extend((1..6).map(|y| Point::new(9.0, f64::from(y))));
        pts.extend((0..9).rev().map(|x| Point::new(f64::from(x), 5.0)));
        pts.extend((1..5).rev().map(|y| Point::new(0.0, f64::from(y))));
        let loop_ = Polyline::new(pts);

        let simplified = simplify_closed(&loop_, 0.5);
        assert_eq!(
            simplified.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(9.0, 0.0),
                Point::new(9.0, 5.0),
                Point::new(0.0, 5.0),
            ]
        );
    }

    #[test]
    fn closed_short_and_degenerate_loops() {
        let two = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_eq!(simplify_closed(&two, 1.0), two);

        let same = Polyline::new(vec![Point::new(2.0, 2.0); 4]);
        assert_eq!(simplify_closed(&same, 1.0).len(), 1);
    }

    #[test]
    fn closed_result_is_ordered_subset() {
        let contour = traced_disk(30);
        let simplified = simplify_contour(&contour, DEFAULT_PERIMETER_FRACTION);
        assert!(simplified.len() <= contour.len());
        assert_eq!(simplified.first(), contour.first());

        // Each retained vertex appears in the contour after the previous one.
        let mut cursor = 0;
        for v in simplified.points() {
            let offset = contour.points()[cursor..]
                .iter()
                .position(|p| p == v)
                .unwrap();
            cursor += offset + 1;
        }
    }

    #[test]
    fn every_contour_point_stays_within_epsilon() {
        for radius in [5, 18, 40] {
            let contour = traced_disk(radius);
            let epsilon = DEFAULT_PERIMETER_FRACTION * perimeter(&contour);
            let simplified = simplify_closed(&contour, epsilon);
            assert!(simplified.len() >= 3, "radius {radius}");
            assert!(simplified.len() < contour.len(), "radius {radius}");
            for p in contour.points() {
                let d = distance_to_polygon(*p, &simplified);
                assert!(d <= epsilon + 1e-9, "radius {radius}: {p:?} is {d} > {epsilon}");
            }
        }
    }

    #[test]
    fn larger_fraction_never_adds_vertices() {
        let contour = traced_disk(25);
        let fine = simplify_contour(&contour, 0.001);
        let coarse = simplify_contour(&contour, 0.02);
        assert!(coarse.len() <= fine.len());
    }
}
