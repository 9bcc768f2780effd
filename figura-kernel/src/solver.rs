//! Bridges the document state to the least-squares driver.
//!
//! The free parameters of a document are, in order: `x` then `y` of every
//! floating point, then the value of every determined ("auto") variable.
//! A template records each slot's identity so a parameter vector can be
//! written back by id/name, skipping slots whose entity was deleted while
//! a solve was in flight.

use lmls_dense::{LeastSquares, LmCfg, l2_norm};
use tracing::debug;

use crate::{
    GeometryState,
    constraints::ConstraintKind,
    id::Id,
    warnings::{self, Warning},
};

/// One slot in the flat parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParamSlot {
    PointX(Id),
    PointY(Id),
    Variable(String),
}

/// Snapshot the solver-adjustable values into a flat vector, with a
/// template describing what each slot is.
pub(crate) fn extract_free_params(state: &GeometryState) -> (Vec<ParamSlot>, Vec<f64>) {
    let mut template = Vec::new();
    let mut values = Vec::new();
    for p in state.points.values().filter(|p| p.floating) {
        template.push(ParamSlot::PointX(p.id));
        values.push(p.x);
        template.push(ParamSlot::PointY(p.id));
        values.push(p.y);
    }
    for v in state.variables.values().filter(|v| v.determined) {
        template.push(ParamSlot::Variable(v.name.clone()));
        values.push(v.value.unwrap_or(0.0));
    }
    (template, values)
}

/// Write a parameter vector back into the store. Slots whose point or
/// variable no longer exists are silently skipped.
pub(crate) fn apply_params(state: &mut GeometryState, template: &[ParamSlot], values: &[f64]) {
    for (slot, &value) in template.iter().zip(values) {
        match slot {
            ParamSlot::PointX(id) => {
                if let Some(p) = state.points.get_mut(id) {
                    p.x = value;
                }
            }
            ParamSlot::PointY(id) => {
                if let Some(p) = state.points.get_mut(id) {
                    p.y = value;
                }
            }
            ParamSlot::Variable(name) => {
                if let Some(v) = state.variables.get_mut(name) {
                    v.value = Some(value);
                }
            }
        }
    }
}

/// Evaluate every constraint's residual against the store as it stands.
fn residuals_into(state: &GeometryState, out: &mut [f64]) {
    let vars = state.bindings();
    for (constraint, slot) in state.constraints.iter().zip(out.iter_mut()) {
        *slot = constraint.kind.residual(state, &vars);
    }
}

/// The document viewed as a least-squares problem: parameters are the
/// template slots, equations are the constraints.
struct DocumentProblem<'a> {
    state: &'a mut GeometryState,
    template: &'a [ParamSlot],
}

impl LeastSquares for DocumentProblem<'_> {
    type Real = f64;

    fn n_residuals(&self) -> usize {
        self.state.constraints.len()
    }

    fn residual(&mut self, x: &[f64], out: &mut [f64]) {
        apply_params(self.state, self.template, x);
        residuals_into(self.state, out);
    }
}

/// What a solve reports back. Non-convergence is not an error; callers
/// branch on `success`.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Did the residual norm drop below tolerance?
    pub success: bool,
    /// How many damped iterations ran.
    pub iterations: usize,
    /// L2 norm of the residual vector at the final parameters.
    pub final_error: f64,
    /// Advisory lints about the system as it was handed to the solver.
    pub warnings: Vec<Warning>,
}

impl GeometryState {
    /// Satisfy the constraints by adjusting floating points and determined
    /// variables, in place, with default solver settings.
    pub fn solve(&mut self) -> SolveOutcome {
        self.solve_with_config(LmCfg::default())
    }

    pub fn solve_with_config(&mut self, cfg: LmCfg<f64>) -> SolveOutcome {
        let lints = warnings::lint(self);
        let (template, mut x) = extract_free_params(self);

        // No adjustable values: report whether the system is already
        // satisfied as it stands.
        if template.is_empty() {
            let mut r = vec![0.0; self.constraints.len()];
            residuals_into(self, &mut r);
            let final_error = l2_norm(&r);
            return SolveOutcome {
                success: final_error < cfg.tol,
                iterations: 0,
                final_error,
                warnings: lints,
            };
        }

        let outcome = {
            let mut problem = DocumentProblem {
                state: self,
                template: &template,
            };
            lmls_dense::solve(&mut problem, &mut x, cfg)
        };
        // The driver leaves the store at the accepted parameters; write
        // them once more so that holds even if no residual pass ran.
        apply_params(self, &template, &x);
        debug!(
            success = outcome.success,
            iterations = outcome.iterations,
            final_error = outcome.final_error,
            "solve finished"
        );
        SolveOutcome {
            success: outcome.success,
            iterations: outcome.iterations,
            final_error: outcome.final_error,
            warnings: lints,
        }
    }

    /// Would the document still converge with this constraint added? Runs
    /// a trial solve on a clone; the caller's state is never touched.
    pub fn validate_constraint(&self, kind: &ConstraintKind) -> bool {
        let mut trial = self.clone();
        trial.push_constraint(kind.clone());
        trial.solve().success
    }
}
