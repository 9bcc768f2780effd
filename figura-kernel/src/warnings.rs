//! Lints for likely-unintended input. Advisory only: nothing here stops a
//! solve, the host decides what to surface.

use crate::{EPSILON, GeometryState, constraints::ConstraintKind, expr, geometry, id::Id};

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// The entity or constraint the warning is about, if any single one.
    pub about: Option<Id>,
    pub content: WarningContent,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum WarningContent {
    /// A segment's endpoints practically overlap.
    DegenerateSegment,
    /// A constraint target doesn't evaluate against the current variables.
    UnresolvedTarget,
    /// A distance target evaluates to a negative number.
    NegativeDistance,
}

impl std::fmt::Display for WarningContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningContent::DegenerateSegment => write!(
                f,
                "This segment's endpoints are so close together that they practically overlap; constraints on it won't behave well."
            ),
            WarningContent::UnresolvedTarget => write!(
                f,
                "This constraint's expression has no value yet, so the constraint is ignored until it does."
            ),
            WarningContent::NegativeDistance => {
                write!(f, "A distance can't be negative; this constraint can never be satisfied.")
            }
        }
    }
}

/// Inspect the document for inputs that are probably mistakes.
pub fn lint(state: &GeometryState) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let vars = state.bindings();

    for seg in state.segments().values() {
        let (Some(a), Some(b)) = (state.point(seg.p1), state.point(seg.p2)) else {
            continue;
        };
        if geometry::euclidean_distance((a.x, a.y), (b.x, b.y)) < EPSILON {
            warnings.push(Warning {
                about: Some(seg.id),
                content: WarningContent::DegenerateSegment,
            });
        }
    }

    for constraint in state.constraints() {
        let target = match &constraint.kind {
            ConstraintKind::Distance { target, .. } | ConstraintKind::Angle { target, .. } => {
                target
            }
            ConstraintKind::Equation { expr } => expr,
            _ => continue,
        };
        match expr::evaluate(target, &vars) {
            None => warnings.push(Warning {
                about: Some(constraint.id),
                content: WarningContent::UnresolvedTarget,
            }),
            Some(d)
                if d < 0.0 && matches!(constraint.kind, ConstraintKind::Distance { .. }) =>
            {
                warnings.push(Warning {
                    about: Some(constraint.id),
                    content: WarningContent::NegativeDistance,
                })
            }
            Some(_) => {}
        }
    }

    warnings
}
