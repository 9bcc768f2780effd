#![doc = include_str!("../README.md")]

mod linalg;

pub use linalg::{l2_norm, normal_equations, solve_lower_bounded};

use num_traits::{Float, Zero};
use tracing::debug;

/// A nonlinear least-squares problem.
///
/// The driver owns the parameter vector and hands it back on every residual
/// evaluation, so implementations that mirror parameters into some backing
/// store should write them through on each call. The last call the driver
/// makes before returning always carries the accepted parameters, which
/// leaves the backing store in the accepted state.
pub trait LeastSquares {
    /// What number type we're using.
    type Real: Float;

    /// How many equations (residual components) the problem has.
    fn n_residuals(&self) -> usize;

    /// Compute all residuals at `x`, writing them into `out`.
    /// `out.len() == self.n_residuals()`.
    fn residual(&mut self, x: &[Self::Real], out: &mut [Self::Real]);
}

/// Tuning knobs for the LM loop.
#[derive(Clone, Copy, Debug)]
pub struct LmCfg<T> {
    /// Convergence threshold on the L2 norm of the residual vector.
    pub tol: T,
    /// Iteration budget.
    pub max_iter: usize,
    /// Initial damping factor.
    pub lambda0: T,
    /// Damping multiplier after a rejected step.
    pub lambda_up: T,
    /// Damping multiplier after an accepted step.
    pub lambda_down: T,
    /// Forward-difference step, both the relative factor and absolute floor.
    pub fd_eps: T,
    /// Floor for the diagonal term the damping multiplies, so a parameter
    /// with no local effect still gets a nonzero damping contribution.
    pub damping_floor: T,
    /// Pivots below this are treated as singular and skipped.
    pub pivot_eps: T,
}

impl<T: Float> Default for LmCfg<T> {
    fn default() -> Self {
        Self {
            tol: T::from(1e-4).expect("type must support 1e-4 for default tolerance"),
            max_iter: 100,
            lambda0: T::from(0.01).expect("type must support 0.01 for initial damping"),
            lambda_up: T::from(10.0).expect("type must support 10.0 for damping growth"),
            lambda_down: T::from(0.1).expect("type must support 0.1 for damping decay"),
            fd_eps: T::from(1e-6).expect("type must support 1e-6 for difference step"),
            damping_floor: T::from(1e-6).expect("type must support 1e-6 for damping floor"),
            pivot_eps: T::from(1e-12).expect("type must support 1e-12 for pivot threshold"),
        }
    }
}

impl<T: Float> LmCfg<T> {
    pub fn with_tol(mut self, tol: T) -> Self {
        self.tol = tol;
        self
    }
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
    pub fn with_lambda0(mut self, lambda0: T) -> Self {
        self.lambda0 = lambda0;
        self
    }
}

/// What the driver reports back.
///
/// Non-convergence is not an error: callers branch on `success` (and
/// validation-style callers use it to reject a candidate system).
#[derive(Clone, Copy, Debug)]
pub struct LmOutcome<T> {
    /// Did the residual norm drop below tolerance?
    pub success: bool,
    /// How many iterations ran.
    pub iterations: usize,
    /// The residual norm at the accepted parameters.
    pub final_error: T,
}

/// Minimize `Σ rᵢ(x)²` by damped Gauss-Newton, mutating `x` in place.
///
/// Each iteration estimates the Jacobian by forward differences (rows =
/// parameters, columns = residuals), forms `H = J Jᵀ` and `g = J r`, damps
/// the diagonal with `λ · max(Hᵢᵢ, floor)`, and solves `H δ = -g`. Steps
/// that don't reduce the residual norm are rejected and raise λ, so the
/// norm at accepted parameters is non-increasing.
///
/// Non-finite difference quotients are zeroed rather than propagated; a
/// residual that is singular at the current point (two coincident points,
/// say) then simply contributes nothing to this iteration's step.
pub fn solve<P>(problem: &mut P, x: &mut [P::Real], cfg: LmCfg<P::Real>) -> LmOutcome<P::Real>
where
    P: LeastSquares,
    P::Real: Float + std::fmt::Debug,
{
    let n = x.len();
    let m = problem.n_residuals();

    let mut r = vec![P::Real::zero(); m];
    problem.residual(x, &mut r);
    let mut err = l2_norm(&r);

    // Nothing to adjust, or nothing to satisfy: report how things stand.
    if n == 0 || m == 0 {
        return LmOutcome {
            success: err < cfg.tol,
            iterations: 0,
            final_error: err,
        };
    }

    let mut lambda = cfg.lambda0;
    let mut iterations = 0;

    let mut jacobian = vec![vec![P::Real::zero(); m]; n];
    let mut scratch = vec![P::Real::zero(); m];
    let mut x_trial = vec![P::Real::zero(); n];
    let mut r_trial = vec![P::Real::zero(); m];

    for iter in 0..cfg.max_iter {
        if err < cfg.tol {
            break;
        }
        iterations = iter + 1;

        // Forward-difference Jacobian, one parameter at a time.
        for i in 0..n {
            let saved = x[i];
            let eps = cfg.fd_eps.max(saved.abs() * cfg.fd_eps);
            x[i] = saved + eps;
            problem.residual(x, &mut scratch);
            x[i] = saved;
            for j in 0..m {
                let slope = (scratch[j] - r[j]) / eps;
                jacobian[i][j] = if slope.is_finite() {
                    slope
                } else {
                    P::Real::zero()
                };
            }
        }
        // Put the backing store back at the baseline before stepping.
        problem.residual(x, &mut scratch);

        let (mut h, g) = normal_equations(&jacobian, &r);
        for i in 0..n {
            h[i][i] = h[i][i] + lambda * h[i][i].max(cfg.damping_floor);
        }
        let neg_g: Vec<P::Real> = g.iter().map(|&gi| -gi).collect();
        let delta = solve_lower_bounded(h, neg_g, cfg.pivot_eps);

        for i in 0..n {
            x_trial[i] = x[i] + delta[i];
        }
        problem.residual(&x_trial, &mut r_trial);
        let err_trial = l2_norm(&r_trial);

        let accepted = err_trial < err;
        if accepted {
            x.copy_from_slice(&x_trial);
            r.copy_from_slice(&r_trial);
            err = err_trial;
            lambda = lambda * cfg.lambda_down;
        } else {
            // Rejected: re-apply the baseline to the backing store.
            problem.residual(x, &mut scratch);
            lambda = lambda * cfg.lambda_up;
        }
        debug!(iter, residual = ?err, lambda = ?lambda, accepted, "lm iteration");
    }

    LmOutcome {
        success: err < cfg.tol,
        iterations,
        final_error: err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x + y = 10 and x - y = 2, as residuals.
    struct TwoLinear;

    impl LeastSquares for TwoLinear {
        type Real = f64;
        fn n_residuals(&self) -> usize {
            2
        }
        fn residual(&mut self, x: &[f64], out: &mut [f64]) {
            out[0] = x[0] + x[1] - 10.0;
            out[1] = x[0] - x[1] - 2.0;
        }
    }

    #[test]
    fn linear_pair_converges() {
        let mut x = vec![1.0, 1.0];
        let outcome = solve(&mut TwoLinear, &mut x, LmCfg::default());
        assert!(outcome.success);
        assert!((x[0] - 6.0).abs() < 1e-3);
        assert!((x[1] - 4.0).abs() < 1e-3);
    }

    /// Distance-style residual: sqrt(x² + y²) - 5.
    struct OnCircle;

    impl LeastSquares for OnCircle {
        type Real = f64;
        fn n_residuals(&self) -> usize {
            1
        }
        fn residual(&mut self, x: &[f64], out: &mut [f64]) {
            out[0] = (x[0] * x[0] + x[1] * x[1]).sqrt() - 5.0;
        }
    }

    #[test]
    fn nonlinear_residual_converges() {
        let mut x = vec![10.0, 0.0];
        let outcome = solve(&mut OnCircle, &mut x, LmCfg::default());
        assert!(outcome.success);
        assert!(((x[0] * x[0] + x[1] * x[1]).sqrt() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn zero_parameters_reports_current_state() {
        let mut x: Vec<f64> = vec![];
        struct Constant(f64);
        impl LeastSquares for Constant {
            type Real = f64;
            fn n_residuals(&self) -> usize {
                1
            }
            fn residual(&mut self, _x: &[f64], out: &mut [f64]) {
                out[0] = self.0;
            }
        }

        let satisfied = solve(&mut Constant(0.0), &mut x, LmCfg::default());
        assert!(satisfied.success);
        assert_eq!(satisfied.iterations, 0);

        let unsatisfied = solve(&mut Constant(3.0), &mut x, LmCfg::default());
        assert!(!unsatisfied.success);
        assert_eq!(unsatisfied.final_error, 3.0);
    }

    #[test]
    fn final_parameters_match_final_error() {
        struct Quadratic;
        impl LeastSquares for Quadratic {
            type Real = f64;
            fn n_residuals(&self) -> usize {
                2
            }
            fn residual(&mut self, x: &[f64], out: &mut [f64]) {
                out[0] = x[0] * x[0] - 2.0;
                out[1] = x[0] * x[1] - 3.0;
            }
        }
        let mut problem = Quadratic;
        let mut x = vec![5.0, -5.0];
        let outcome = solve(&mut problem, &mut x, LmCfg::default());
        assert!(outcome.success);
        // Re-evaluating at the returned parameters reproduces the
        // reported final error.
        let mut out = vec![0.0; 2];
        problem.residual(&x, &mut out);
        assert!((l2_norm(&out) - outcome.final_error).abs() < 1e-12);
    }
}
