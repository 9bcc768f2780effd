//! Each kind of constraint we support, and its residual.
//!
//! A residual is the scalar deviation of a constraint from satisfaction;
//! the solver minimizes the sum of squares across all constraints. A
//! constraint whose target expression does not resolve, or whose referents
//! have been deleted mid-template, contributes zero rather than failing:
//! half-specified systems stay solvable.

use crate::{
    GeometryState,
    expr::{self, Bindings},
    geometry,
    id::Id,
};

/// A constraint in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub id: Id,
    pub kind: ConstraintKind,
}

/// Each geometric constraint we support.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// These two points should be a given distance apart. The target is an
    /// expression over the document's variables.
    Distance { p1: Id, p2: Id, target: String },
    /// The direction from `p1` to `p2` should be a given angle in degrees.
    Angle { p1: Id, p2: Id, target: String },
    /// The point should lie on the (closed) segment.
    PointOnSegment { point: Id, segment: Id },
    /// The point should lie on the circle's circumference.
    PointOnCircle { point: Id, circle: Id },
    /// The point should lie on the arc, radially and within its span.
    PointOnArc { point: Id, arc: Id },
    /// The expression should evaluate to zero.
    Equation { expr: String },
}

impl ConstraintKind {
    /// Ids of every entity this constraint references. Used to wire the
    /// constraint into the dependency graph so deletion cascades over it.
    pub fn referenced_ids(&self) -> Vec<Id> {
        match self {
            ConstraintKind::Distance { p1, p2, .. } | ConstraintKind::Angle { p1, p2, .. } => {
                vec![*p1, *p2]
            }
            ConstraintKind::PointOnSegment { point, segment } => vec![*point, *segment],
            ConstraintKind::PointOnCircle { point, circle } => vec![*point, *circle],
            ConstraintKind::PointOnArc { point, arc } => vec![*point, *arc],
            ConstraintKind::Equation { .. } => Vec::new(),
        }
    }

    /// Human-readable constraint name, useful for debugging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstraintKind::Distance { .. } => "Distance",
            ConstraintKind::Angle { .. } => "Angle",
            ConstraintKind::PointOnSegment { .. } => "PointOnSegment",
            ConstraintKind::PointOnCircle { .. } => "PointOnCircle",
            ConstraintKind::PointOnArc { .. } => "PointOnArc",
            ConstraintKind::Equation { .. } => "Equation",
        }
    }

    /// How close this constraint is to being satisfied. Zero means
    /// satisfied; distance and angle residuals are signed, the point-on
    /// family is non-negative.
    pub fn residual(&self, state: &GeometryState, vars: &Bindings) -> f64 {
        match self {
            ConstraintKind::Distance { p1, p2, target } => {
                let (Some(a), Some(b)) = (state.point(*p1), state.point(*p2)) else {
                    return 0.0;
                };
                let Some(target) = expr::evaluate(target, vars) else {
                    return 0.0;
                };
                geometry::euclidean_distance((a.x, a.y), (b.x, b.y)) - target
            }
            ConstraintKind::Angle { p1, p2, target } => {
                let (Some(a), Some(b)) = (state.point(*p1), state.point(*p2)) else {
                    return 0.0;
                };
                let Some(target) = expr::evaluate(target, vars) else {
                    return 0.0;
                };
                wrap_degrees(geometry::segment_angle((a.x, a.y), (b.x, b.y)) - target)
            }
            ConstraintKind::PointOnSegment { point, segment } => {
                let (Some(p), Some(seg)) = (state.point(*point), state.segment(*segment)) else {
                    return 0.0;
                };
                let (Some(a), Some(b)) = (state.point(seg.p1), state.point(seg.p2)) else {
                    return 0.0;
                };
                geometry::point_segment_distance((p.x, p.y), (a.x, a.y), (b.x, b.y))
            }
            ConstraintKind::PointOnCircle { point, circle } => {
                let (Some(p), Some(circ)) = (state.point(*point), state.circle(*circle)) else {
                    return 0.0;
                };
                let Some(center) = state.point(circ.center) else {
                    return 0.0;
                };
                (geometry::euclidean_distance((p.x, p.y), (center.x, center.y)) - circ.radius)
                    .abs()
            }
            ConstraintKind::PointOnArc { point, arc } => {
                let (Some(p), Some(arc)) = (state.point(*point), state.arc(*arc)) else {
                    return 0.0;
                };
                let Some(circ) = state.circle(arc.circle) else {
                    return 0.0;
                };
                let (Some(center), Some(start), Some(end)) = (
                    state.point(circ.center),
                    state.point(arc.start),
                    state.point(arc.end),
                ) else {
                    return 0.0;
                };
                let center = (center.x, center.y);
                let radial = (geometry::euclidean_distance((p.x, p.y), center) - circ.radius).abs();

                let theta = geometry::polar_angle(center, (p.x, p.y));
                let start = geometry::polar_angle(center, (start.x, start.y));
                let end = geometry::polar_angle(center, (end.x, end.y));
                if geometry::angle_in_ccw_span(theta, start, end) {
                    radial
                } else {
                    let off = geometry::angular_distance(theta, start)
                        .min(geometry::angular_distance(theta, end));
                    radial + off * circ.radius
                }
            }
            ConstraintKind::Equation { expr } => expr::evaluate(expr, vars).unwrap_or(0.0),
        }
    }
}

/// Wrap a degree difference into `(-180, 180]`.
fn wrap_degrees(d: f64) -> f64 {
    let mut d = d % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_covers_the_half_open_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }
}
