//! Pure planar geometry helpers.
//!
//! Everything here works on `(x, y)` tuples in abstract units and knows
//! nothing about the entity store. Angles follow the one convention used
//! throughout the kernel: screen Y grows downward, so a segment's angle in
//! degrees is `atan2(-(y2-y1), x2-x1)` — 0° east, positive counter-
//! clockwise as seen on screen.

use std::f64::consts::TAU;

use crate::EPSILON;

/// Euclidean distance between two points.
pub fn euclidean_distance(p0: (f64, f64), p1: (f64, f64)) -> f64 {
    let dx = p0.0 - p1.0;
    let dy = p0.1 - p1.1;
    (dx * dx + dy * dy).sqrt()
}

/// Center and radius of the circle through three points, or `None` when
/// they are (near-)collinear.
pub fn circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<((f64, f64), f64)> {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < 1e-10 {
        return None;
    }
    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let ux = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let uy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let center = (ux, uy);
    Some((center, euclidean_distance(center, a)))
}

/// Distance from `p` to the closed segment `a`..`b`. The projection
/// parameter is clamped to the segment, so beyond an endpoint this is the
/// distance to that endpoint. A degenerate segment measures to `a`.
pub fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len2 = dx * dx + dy * dy;
    if len2 < 1e-6 {
        return euclidean_distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    euclidean_distance(p, (a.0 + t * dx, a.1 + t * dy))
}

/// Direction of the segment `a` -> `b` in degrees, math convention over
/// screen coordinates (see module docs).
pub fn segment_angle(a: (f64, f64), b: (f64, f64)) -> f64 {
    libm::atan2(-(b.1 - a.1), b.0 - a.0).to_degrees()
}

/// Proper crossing of two segments, excluding endpoints: both line
/// parameters must land in the open interval `(ε, 1-ε)`. Parallel (and
/// near-parallel) pairs yield `None`.
pub fn segment_segment_intersection(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> Option<(f64, f64)> {
    let d1 = (a2.0 - a1.0, a2.1 - a1.1);
    let d2 = (b2.0 - b1.0, b2.1 - b1.1);
    let denom = d1.0 * d2.1 - d1.1 * d2.0;
    if denom.abs() < 1e-10 {
        return None;
    }
    let t = ((b1.0 - a1.0) * d2.1 - (b1.1 - a1.1) * d2.0) / denom;
    let u = ((b1.0 - a1.0) * d1.1 - (b1.1 - a1.1) * d1.0) / denom;
    if !in_open_interval(t) || !in_open_interval(u) {
        return None;
    }
    Some((a1.0 + t * d1.0, a1.1 + t * d1.1))
}

/// Points where the segment `a`..`b` crosses the circle, excluding the
/// segment's endpoints. Near-tangent hits (roots closer together than ε
/// along the segment) are collapsed to one point.
pub fn segment_circle_intersections(
    a: (f64, f64),
    b: (f64, f64),
    center: (f64, f64),
    radius: f64,
) -> Vec<(f64, f64)> {
    let d = (b.0 - a.0, b.1 - a.1);
    let f = (a.0 - center.0, a.1 - center.1);
    let qa = d.0 * d.0 + d.1 * d.1;
    if qa < 1e-12 {
        return Vec::new();
    }
    let qb = 2.0 * (f.0 * d.0 + f.1 * d.1);
    let qc = f.0 * f.0 + f.1 * f.1 - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    let t1 = (-qb - sq) / (2.0 * qa);
    let t2 = (-qb + sq) / (2.0 * qa);

    let mut out = Vec::new();
    let first_emitted = in_open_interval(t1);
    if first_emitted {
        out.push((a.0 + t1 * d.0, a.1 + t1 * d.1));
    }
    // Both roots are only emitted when they are separated by more than ε
    // along the segment; a near-tangent graze counts once.
    if in_open_interval(t2) && (!first_emitted || (t2 - t1).abs() > EPSILON) {
        out.push((a.0 + t2 * d.0, a.1 + t2 * d.1));
    }
    out
}

/// Intersection points of two circles. Empty when they are separate, one
/// contains the other, or the centers (near-)coincide; a single point when
/// they are tangent.
pub fn circle_circle_intersections(
    c1: (f64, f64),
    r1: f64,
    c2: (f64, f64),
    r2: f64,
) -> Vec<(f64, f64)> {
    let d = euclidean_distance(c1, c2);
    if d > r1 + r2 || d < (r1 - r2).abs() || d < EPSILON {
        return Vec::new();
    }
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let mx = c1.0 + a * (c2.0 - c1.0) / d;
    let my = c1.1 + a * (c2.1 - c1.1) / d;
    if h < EPSILON {
        return vec![(mx, my)];
    }
    let ox = h * (c2.1 - c1.1) / d;
    let oy = h * (c2.0 - c1.0) / d;
    vec![(mx + ox, my - oy), (mx - ox, my + oy)]
}

/// Polar angle of `p` about `center` in radians, normalized to `[0, 2π)`,
/// in the same screen-inverted convention as [`segment_angle`].
pub fn polar_angle(center: (f64, f64), p: (f64, f64)) -> f64 {
    libm::atan2(-(p.1 - center.1), p.0 - center.0).rem_euclid(TAU)
}

/// Shortest angular distance between two angles, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

/// Whether `theta` lies inside the counter-clockwise span from `start` to
/// `end`. All angles must already be normalized to `[0, 2π)`; a span with
/// `start > end` wraps through zero.
pub fn angle_in_ccw_span(theta: f64, start: f64, end: f64) -> bool {
    if start <= end {
        theta >= start && theta <= end
    } else {
        theta >= start || theta <= end
    }
}

fn in_open_interval(t: f64) -> bool {
    t > EPSILON && t < 1.0 - EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_nearly(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn circumcircle_of_right_triangle() {
        let ((cx, cy), r) = circumcircle((0.0, 0.0), (4.0, 0.0), (0.0, 3.0)).unwrap();
        assert_nearly(cx, 2.0);
        assert_nearly(cy, 1.5);
        assert_nearly(r, 2.5);
    }

    #[test]
    fn circumcircle_center_is_equidistant() {
        let pts = [(1.0, 2.0), (-3.0, 4.5), (2.5, -1.25)];
        let (center, r) = circumcircle(pts[0], pts[1], pts[2]).unwrap();
        for p in pts {
            assert_nearly(euclidean_distance(center, p), r);
        }
    }

    #[test]
    fn circumcircle_rejects_collinear() {
        assert!(circumcircle((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)).is_none());
        assert!(circumcircle((0.0, 0.0), (0.0, 0.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn projection_clamps_to_endpoints() {
        let a = (0.0, 0.0);
        let b = (10.0, 0.0);
        assert_nearly(point_segment_distance((5.0, 3.0), a, b), 3.0);
        assert_nearly(point_segment_distance((-4.0, 3.0), a, b), 5.0);
        assert_nearly(point_segment_distance((13.0, 4.0), a, b), 5.0);
        // Degenerate segment measures to the first endpoint.
        assert_nearly(point_segment_distance((3.0, 4.0), a, (0.0, 0.0)), 5.0);
    }

    #[test]
    fn segment_angle_uses_inverted_y() {
        assert_nearly(segment_angle((0.0, 0.0), (1.0, 0.0)), 0.0);
        // Up on screen is negative dy, which is +90 degrees.
        assert_nearly(segment_angle((0.0, 0.0), (0.0, -1.0)), 90.0);
        assert_nearly(segment_angle((0.0, 0.0), (-1.0, 0.0)), 180.0);
        assert_nearly(segment_angle((0.0, 0.0), (0.0, 1.0)), -90.0);
    }

    #[test]
    fn crossing_segments_intersect_once() {
        let p = segment_segment_intersection((0.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 0.0))
            .unwrap();
        assert_nearly(p.0, 5.0);
        assert_nearly(p.1, 5.0);
    }

    #[test]
    fn parallel_and_endpoint_touches_are_excluded() {
        assert!(
            segment_segment_intersection((0.0, 0.0), (10.0, 0.0), (0.0, 1.0), (10.0, 1.0))
                .is_none()
        );
        // Shared endpoint: parameters sit at the interval boundary.
        assert!(
            segment_segment_intersection((0.0, 0.0), (10.0, 0.0), (10.0, 0.0), (10.0, 10.0))
                .is_none()
        );
    }

    #[test]
    fn segment_circle_hits() {
        // Horizontal chord through a unit-radius-5 circle at origin.
        let hits = segment_circle_intersections((-10.0, 0.0), (10.0, 0.0), (0.0, 0.0), 5.0);
        assert_eq!(hits.len(), 2);
        assert_nearly(hits[0].0, -5.0);
        assert_nearly(hits[1].0, 5.0);
        // Miss entirely.
        assert!(segment_circle_intersections((-10.0, 9.0), (10.0, 9.0), (0.0, 0.0), 5.0).is_empty());
        // Tangent line grazes at one point.
        let grazing = segment_circle_intersections((-10.0, 5.0), (10.0, 5.0), (0.0, 0.0), 5.0);
        assert_eq!(grazing.len(), 1);
    }

    #[test]
    fn circle_circle_hits() {
        let hits = circle_circle_intersections((0.0, 0.0), 5.0, (8.0, 0.0), 5.0);
        assert_eq!(hits.len(), 2);
        for (x, y) in hits {
            assert_nearly(x, 4.0);
            assert_nearly(y.abs(), 3.0);
        }
        // Tangent externally: one point.
        let tangent = circle_circle_intersections((0.0, 0.0), 2.0, (5.0, 0.0), 3.0);
        assert_eq!(tangent.len(), 1);
        assert_nearly(tangent[0].0, 2.0);
        // Separate, contained, and coincident: none.
        assert!(circle_circle_intersections((0.0, 0.0), 1.0, (10.0, 0.0), 1.0).is_empty());
        assert!(circle_circle_intersections((0.0, 0.0), 5.0, (1.0, 0.0), 1.0).is_empty());
        assert!(circle_circle_intersections((0.0, 0.0), 5.0, (0.0, 0.0), 5.0).is_empty());
    }

    #[test]
    fn ccw_span_membership_handles_wrap() {
        use std::f64::consts::PI;
        assert!(angle_in_ccw_span(PI / 2.0, 0.0, PI));
        assert!(!angle_in_ccw_span(3.0 * PI / 2.0, 0.0, PI));
        // Span wrapping through zero.
        assert!(angle_in_ccw_span(0.1, 3.0 * PI / 2.0, PI / 2.0));
        assert!(!angle_in_ccw_span(PI, 3.0 * PI / 2.0, PI / 2.0));
    }

    #[test]
    fn angular_distance_is_shortest_way_around() {
        use std::f64::consts::PI;
        assert_nearly(angular_distance(0.1, TAU - 0.1), 0.2);
        assert_nearly(angular_distance(PI, 0.0), PI);
    }
}
