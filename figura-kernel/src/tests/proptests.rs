use proptest::prelude::*;

use crate::{
    GeometryState,
    constraints::ConstraintKind,
    expr::{self, Bindings},
    geometry,
    tests::assert_nearly_eq,
};

proptest! {
    #[test]
    fn circumcircle_center_is_equidistant(
        ax in -100.0..100.0f64,
        ay in -100.0..100.0f64,
        bx in -100.0..100.0f64,
        by in -100.0..100.0f64,
        cx in -100.0..100.0f64,
        cy in -100.0..100.0f64,
    ) {
        let (a, b, c) = ((ax, ay), (bx, by), (cx, cy));
        if let Some((center, r)) = geometry::circumcircle(a, b, c) {
            // Relative error, since random triples can be huge or tiny.
            let scale = r.max(1.0);
            for p in [a, b, c] {
                let d = geometry::euclidean_distance(center, p);
                prop_assert!(((d - r) / scale).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn constants_evaluate_to_themselves(n in 0.0..1e9f64) {
        let vars = Bindings::new();
        // Format with enough precision to round-trip.
        let text = format!("{n:.10}");
        let value = expr::evaluate(&text, &vars).unwrap();
        prop_assert!((value - text.parse::<f64>().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn precedence_matches_rust_arithmetic(
        a in 1.0..50.0f64,
        b in 1.0..50.0f64,
        c in 1.0..50.0f64,
    ) {
        let vars: Bindings = [("a", a), ("b", b), ("c", c)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let got = expr::evaluate("a + b*c", &vars).unwrap();
        prop_assert!((got - (a + b * c)).abs() < 1e-9);
        let got = expr::evaluate("a*b + c", &vars).unwrap();
        prop_assert!((got - (a * b + c)).abs() < 1e-9);
        let got = expr::evaluate("a - b - c", &vars).unwrap();
        prop_assert!((got - (a - b - c)).abs() < 1e-9);
    }

    #[test]
    fn intersection_pass_is_idempotent(
        x0 in -50.0..50.0f64,
        y0 in -50.0..50.0f64,
        x1 in -50.0..50.0f64,
        y1 in -50.0..50.0f64,
        x2 in -50.0..50.0f64,
        y2 in -50.0..50.0f64,
        x3 in -50.0..50.0f64,
        y3 in -50.0..50.0f64,
    ) {
        let mut state = GeometryState::new();
        let a = state.add_point(x0, y0);
        let b = state.add_point(x1, y1);
        let c = state.add_point(x2, y2);
        let d = state.add_point(x3, y3);
        // Degenerate pairs just make the constructors return None; the
        // property holds either way.
        let _ = state.add_segment_two_points(a, b);
        let _ = state.add_segment_two_points(c, d);
        let _ = state.add_circle_circumference(a, c);

        let _first = state.find_all_intersections();
        let second = state.find_all_intersections();
        prop_assert!(second.is_empty());
    }

    #[test]
    fn distance_constraint_converges_from_random_guesses(
        bx in 1.0..80.0f64,
        by in 1.0..80.0f64,
        target in 1.0..100.0f64,
    ) {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(bx, by);
        state.set_floating(b, true);
        state
            .add_constraint(ConstraintKind::Distance {
                p1: a,
                p2: b,
                target: target.to_string(),
            })
            .unwrap();

        let outcome = state.solve();
        prop_assert!(outcome.success);
        let (a, b) = (state.point(a).unwrap(), state.point(b).unwrap());
        assert_nearly_eq(
            geometry::euclidean_distance((a.x, a.y), (b.x, b.y)),
            target,
        );
    }
}
