//! Intersection synthesis: after a construction, every place where two
//! existing curves cross gains a real point the user can snap to and
//! constrain.

use tracing::trace;

use crate::{EPSILON, GeometryState, geometry, id::Id};

impl GeometryState {
    /// Scan all segment/segment, segment/circle and circle/circle pairs
    /// and add a point at each crossing that doesn't already have one
    /// (Chebyshev test, tolerance `1e-3`).
    ///
    /// The scan is single-shot over the curves present when it starts:
    /// points added by this pass don't create new candidate pairs until a
    /// later construction triggers another pass. Running it twice in a
    /// row therefore adds nothing the second time.
    ///
    /// Returns the ids of the points it added.
    pub fn find_all_intersections(&mut self) -> Vec<Id> {
        let segments: Vec<((f64, f64), (f64, f64))> = self
            .segments
            .values()
            .filter_map(|seg| {
                let a = self.point(seg.p1)?;
                let b = self.point(seg.p2)?;
                Some(((a.x, a.y), (b.x, b.y)))
            })
            .collect();
        let circles: Vec<((f64, f64), f64)> = self
            .circles
            .values()
            .filter_map(|circle| {
                let center = self.point(circle.center)?;
                Some(((center.x, center.y), circle.radius))
            })
            .collect();

        let mut candidates: Vec<(f64, f64)> = Vec::new();
        for (i, &(a1, a2)) in segments.iter().enumerate() {
            for &(b1, b2) in &segments[i + 1..] {
                candidates.extend(geometry::segment_segment_intersection(a1, a2, b1, b2));
            }
        }
        for &(a, b) in &segments {
            for &(center, radius) in &circles {
                candidates.extend(geometry::segment_circle_intersections(a, b, center, radius));
            }
        }
        for (i, &(c1, r1)) in circles.iter().enumerate() {
            for &(c2, r2) in &circles[i + 1..] {
                candidates.extend(geometry::circle_circle_intersections(c1, r1, c2, r2));
            }
        }

        let mut added = Vec::new();
        for (x, y) in candidates {
            let exists = self
                .points
                .values()
                .any(|p| (p.x - x).abs() < EPSILON && (p.y - y).abs() < EPSILON);
            if exists {
                continue;
            }
            let id = self.add_point(x, y);
            trace!(point = id, x, y, "synthesized intersection point");
            added.push(id);
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_gain_one_point() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 10.0);
        let c = state.add_point(0.0, 10.0);
        let d = state.add_point(10.0, 0.0);
        state.add_segment_two_points(a, b).unwrap();
        state.add_segment_two_points(c, d).unwrap();

        let added = state.find_all_intersections();
        assert_eq!(added.len(), 1);
        let p = state.point(added[0]).unwrap();
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);

        // Idempotent: the point now exists, so a second pass is a no-op.
        assert!(state.find_all_intersections().is_empty());
    }

    #[test]
    fn existing_point_within_tolerance_suppresses_synthesis() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 10.0);
        let c = state.add_point(0.0, 10.0);
        let d = state.add_point(10.0, 0.0);
        // Pre-existing point a hair away from the crossing.
        state.add_point(5.0004, 4.9996);
        state.add_segment_two_points(a, b).unwrap();
        state.add_segment_two_points(c, d).unwrap();

        assert!(state.find_all_intersections().is_empty());
    }

    #[test]
    fn segment_circle_and_circle_circle_pairs_are_scanned() {
        let mut state = GeometryState::new();
        let center1 = state.add_point(0.0, 0.0);
        let center2 = state.add_point(8.0, 0.0);
        state.add_circle_radius(center1, 5.0).unwrap();
        state.add_circle_radius(center2, 5.0).unwrap();
        let a = state.add_point(-10.0, 0.0);
        let b = state.add_point(-0.5, 0.0);
        state.add_segment_two_points(a, b).unwrap();

        let added = state.find_all_intersections();
        // Circle/circle crossings at (4, ±3); the segment enters the first
        // circle at (-5, 0).
        assert_eq!(added.len(), 3);
    }
}
