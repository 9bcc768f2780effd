//! The geometric constraint kernel of the figura planar sketch tool.
//!
//! A document is a [`GeometryState`]: points, segments, circles, arcs,
//! named variables and constraints, all cross-referenced by stable ids.
//! Constructors wire every new entity into a dependency graph so deletion
//! cascades; [`GeometryState::solve`] satisfies the constraints by moving
//! floating points and determined variables with a damped least-squares
//! loop; [`GeometryState::find_all_intersections`] materializes points
//! where curves cross.

pub use crate::constraints::{Constraint, ConstraintKind};
pub use crate::entities::{Arc, Circle, CircleKind, Point, Segment, SegmentKind, Tool, Variable};
pub use crate::id::{Id, IdGenerator};
pub use crate::solver::SolveOutcome;
pub use crate::state::GeometryState;
pub use crate::warnings::{Warning, WarningContent, lint};
// Solver tuning knobs, for hosts that call `solve_with_config`.
pub use lmls_dense::LmCfg;

/// Residual functions for each constraint kind.
mod constraints;
/// Geometric entities of a document.
mod entities;
/// Arithmetic expressions over named variables.
pub mod expr;
/// Pure planar geometry helpers.
pub mod geometry;
/// Entity identifiers.
mod id;
/// Intersection synthesis pass.
mod intersect;
/// Point label allocation.
mod label;
/// Bridges the document state to the least-squares solver.
mod solver;
/// Document state: containers, constructors, cascading delete.
mod state;
/// Lints for likely-unintended inputs.
mod warnings;

/// Kernel-wide coincidence tolerance, in abstract units. Intersection
/// parameters, duplicate-point suppression and degeneracy lints all use
/// this.
pub(crate) const EPSILON: f64 = 1e-3;
