//! Solver environment owned by a controller context.
//!
//! The environment holds the operating parameters every QP solved by the
//! controller is configured with, rendered into Clarabel settings. It is
//! acquired once during construction and released exactly once, either by
//! an explicit [`SolverEnvironment::release`] or when it is dropped.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{NonnegativeConeT, ZeroConeT},
};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SolverError;

/// Iteration limit applied when the barrier method is selected.
pub const BARRIER_ITERATION_LIMIT: u32 = 20;

/// Convergence tolerance applied when the barrier method is selected.
pub const BARRIER_CONVERGENCE_TOLERANCE: f64 = 0.0005;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Solution method selector, numbered by its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SolverMethod {
    Automatic = -1,
    PrimalSimplex = 0,
    DualSimplex = 1,
    Barrier = 2,
    Concurrent = 3,
    DeterministicConcurrent = 4,
    DeterministicConcurrentSimplex = 5,
}

impl SolverMethod {
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for SolverMethod {
    type Error = SolverError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(Self::Automatic),
            0 => Ok(Self::PrimalSimplex),
            1 => Ok(Self::DualSimplex),
            2 => Ok(Self::Barrier),
            3 => Ok(Self::Concurrent),
            4 => Ok(Self::DeterministicConcurrent),
            5 => Ok(Self::DeterministicConcurrentSimplex),
            other => Err(SolverError::InvalidMethod(other)),
        }
    }
}

/// Caller-supplied solver options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Integer method code; see [`SolverMethod`].
    pub method: i32,
}

impl SolverOptions {
    pub const fn with_method(method: SolverMethod) -> Self {
        Self {
            method: method.code(),
        }
    }
}

/// Barrier-method parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierParams {
    pub iteration_limit: u32,
    /// `None` lets the solver decide.
    pub homogeneous: Option<bool>,
    pub convergence_tolerance: f64,
}

impl Default for BarrierParams {
    fn default() -> Self {
        Self {
            iteration_limit: 200,
            homogeneous: None,
            convergence_tolerance: 1e-8,
        }
    }
}

impl BarrierParams {
    /// Parameters used by the controller when the barrier method is selected.
    pub const fn controller() -> Self {
        Self {
            iteration_limit: BARRIER_ITERATION_LIMIT,
            homogeneous: Some(false),
            convergence_tolerance: BARRIER_CONVERGENCE_TOLERANCE,
        }
    }
}

/// Operating parameters of an environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub output_flag: bool,
    pub method: SolverMethod,
    pub presolve: bool,
    pub barrier: BarrierParams,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            output_flag: true,
            method: SolverMethod::Automatic,
            presolve: true,
            barrier: BarrierParams::default(),
        }
    }
}

impl SolverParams {
    fn render(&self) -> Result<DefaultSettings<f64>, SolverError> {
        let tol = self.barrier.convergence_tolerance;
        DefaultSettingsBuilder::default()
            .verbose(self.output_flag)
            .presolve_enable(self.presolve)
            .max_iter(self.barrier.iteration_limit)
            .tol_gap_abs(tol)
            .tol_gap_rel(tol)
            .tol_feas(tol)
            .build()
            .map_err(|e| SolverError::Settings(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// A dense QP in the form
///
/// ```text
/// min  ½ zᵀ P z + qᵀ z
/// s.t. A[..n_eq] z  = b[..n_eq]
///      A[n_eq..] z <= b[n_eq..]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DenseQp<'a> {
    pub p: &'a DMatrix<f64>,
    pub q: &'a DVector<f64>,
    pub a: &'a DMatrix<f64>,
    pub b: &'a DVector<f64>,
    pub n_eq: usize,
}

/// Primal solution of a [`DenseQp`].
#[derive(Debug, Clone)]
pub struct QpSolution {
    pub z: DVector<f64>,
    pub status: SolverStatus,
    pub iterations: u32,
}

impl QpSolution {
    pub fn is_solved(&self) -> bool {
        matches!(
            self.status,
            SolverStatus::Solved | SolverStatus::AlmostSolved
        )
    }
}

/// Solver environment with the controller's operating parameters applied.
#[derive(Debug)]
pub struct SolverEnvironment {
    params: SolverParams,
    settings: DefaultSettings<f64>,
    released: bool,
}

impl SolverEnvironment {
    /// Load an environment with default parameters.
    pub fn load() -> Result<Self, SolverError> {
        let params = SolverParams::default();
        let settings = params.render()?;
        debug!("solver environment loaded");
        Ok(Self {
            params,
            settings,
            released: false,
        })
    }

    /// Load an environment and apply the controller's operating parameters:
    /// output off, the requested method, presolve off, and the controller
    /// barrier parameters when the barrier method is requested.
    pub fn acquire(options: &SolverOptions) -> Result<Self, SolverError> {
        let mut env = Self::load()?;
        env.set_output_flag(false)?;
        env.set_method(options.method)?;
        env.set_presolve(false)?;
        if env.params.method == SolverMethod::Barrier {
            env.set_barrier(BarrierParams::controller())?;
        }
        debug!(method = options.method, "solver environment configured");
        Ok(env)
    }

    pub fn set_output_flag(&mut self, on: bool) -> Result<(), SolverError> {
        self.update(|p| p.output_flag = on)
    }

    pub fn set_method(&mut self, code: i32) -> Result<(), SolverError> {
        let method = SolverMethod::try_from(code)?;
        self.update(|p| p.method = method)
    }

    pub fn set_presolve(&mut self, on: bool) -> Result<(), SolverError> {
        self.update(|p| p.presolve = on)
    }

    pub fn set_barrier(&mut self, barrier: BarrierParams) -> Result<(), SolverError> {
        if barrier.iteration_limit == 0 {
            return Err(SolverError::InvalidParameter {
                name: "barrier.iteration_limit",
                value: barrier.iteration_limit.to_string(),
            });
        }
        let tol = barrier.convergence_tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(SolverError::InvalidParameter {
                name: "barrier.convergence_tolerance",
                value: tol.to_string(),
            });
        }
        self.update(|p| p.barrier = barrier)
    }

    /// Current operating parameters.
    pub const fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Clarabel settings rendered from the current parameters.
    pub fn settings(&self) -> Result<&DefaultSettings<f64>, SolverError> {
        self.ensure_live()?;
        Ok(&self.settings)
    }

    /// Build a Clarabel solver for `qp` using this environment's settings.
    pub fn solver(&self, qp: &DenseQp<'_>) -> Result<DefaultSolver<f64>, SolverError> {
        let settings = self.settings()?.clone();
        let n = qp.q.len();
        let m = qp.b.len();
        if qp.p.shape() != (n, n) || qp.a.shape() != (m, n) || qp.n_eq > m {
            return Err(SolverError::Setup(format!(
                "inconsistent QP dimensions: P {:?}, q {n}, A {:?}, b {m}, n_eq {}",
                qp.p.shape(),
                qp.a.shape(),
                qp.n_eq
            )));
        }

        let p = to_csc(qp.p, true);
        let a = to_csc(qp.a, false);
        let mut cones = Vec::with_capacity(2);
        if qp.n_eq > 0 {
            cones.push(ZeroConeT(qp.n_eq));
        }
        if m > qp.n_eq {
            cones.push(NonnegativeConeT(m - qp.n_eq));
        }

        Ok(DefaultSolver::new(
            &p,
            qp.q.as_slice(),
            &a,
            qp.b.as_slice(),
            &cones,
            settings,
        ))
    }

    /// Solve `qp` and return its primal solution.
    pub fn solve(&self, qp: &DenseQp<'_>) -> Result<QpSolution, SolverError> {
        let mut solver = self.solver(qp)?;
        solver.solve();
        let sol = &solver.solution;
        if !matches!(sol.status, SolverStatus::Solved | SolverStatus::AlmostSolved) {
            warn!(status = ?sol.status, "QP not solved");
        }
        Ok(QpSolution {
            z: DVector::from_column_slice(&sol.x),
            status: sol.status,
            iterations: sol.iterations,
        })
    }

    /// Release the environment. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        debug!("solver environment released");
        true
    }

    pub const fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_live(&self) -> Result<(), SolverError> {
        if self.released {
            Err(SolverError::Released)
        } else {
            Ok(())
        }
    }

    fn update(&mut self, apply: impl FnOnce(&mut SolverParams)) -> Result<(), SolverError> {
        self.ensure_live()?;
        let mut next = self.params;
        apply(&mut next);
        self.settings = next.render()?;
        self.params = next;
        Ok(())
    }
}

impl Drop for SolverEnvironment {
    fn drop(&mut self) {
        self.release();
    }
}

/// Dense to compressed-sparse-column, optionally keeping only the upper
/// triangle (Clarabel reads `P` that way).
fn to_csc(m: &DMatrix<f64>, upper_only: bool) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = Vec::with_capacity(ncols + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    colptr.push(0);
    for j in 0..ncols {
        let last = if upper_only { (j + 1).min(nrows) } else { nrows };
        for i in 0..last {
            let v = m[(i, j)];
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr.push(rowval.len());
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn method_codes() {
        for code in -1..=5 {
            assert_eq!(SolverMethod::try_from(code).unwrap().code(), code);
        }
        assert_eq!(
            SolverMethod::try_from(6),
            Err(SolverError::InvalidMethod(6))
        );
        assert_eq!(
            SolverMethod::try_from(-2),
            Err(SolverError::InvalidMethod(-2))
        );
    }

    #[test]
    fn loaded_environment_has_defaults() {
        let env = SolverEnvironment::load().unwrap();
        assert_eq!(env.params(), &SolverParams::default());
        assert!(env.settings().unwrap().verbose);
    }

    #[test]
    fn barrier_acquisition_applies_controller_parameters() {
        let env = SolverEnvironment::acquire(&SolverOptions::with_method(SolverMethod::Barrier))
            .unwrap();
        let params = env.params();
        assert!(!params.output_flag);
        assert!(!params.presolve);
        assert_eq!(params.method, SolverMethod::Barrier);
        assert_eq!(params.barrier.iteration_limit, 20);
        assert_eq!(params.barrier.homogeneous, Some(false));
        assert_relative_eq!(params.barrier.convergence_tolerance, 0.0005);

        let settings = env.settings().unwrap();
        assert_eq!(settings.max_iter, 20);
        assert!(!settings.verbose);
        assert!(!settings.presolve_enable);
        assert_relative_eq!(settings.tol_feas, 0.0005);
    }

    #[test]
    fn non_barrier_method_keeps_default_barrier_parameters() {
        let env = SolverEnvironment::acquire(&SolverOptions { method: 0 }).unwrap();
        assert_eq!(env.params().method, SolverMethod::PrimalSimplex);
        assert_eq!(env.params().barrier, BarrierParams::default());
        assert!(!env.params().presolve);
    }

    #[test]
    fn unknown_method_fails_acquisition() {
        let err = SolverEnvironment::acquire(&SolverOptions { method: 7 }).unwrap_err();
        assert_eq!(err, SolverError::InvalidMethod(7));
    }

    #[test]
    fn invalid_barrier_parameters_leave_environment_unchanged() {
        let mut env = SolverEnvironment::load().unwrap();
        let bad = BarrierParams {
            convergence_tolerance: -1.0,
            ..BarrierParams::controller()
        };
        assert!(matches!(
            env.set_barrier(bad),
            Err(SolverError::InvalidParameter { .. })
        ));
        assert_eq!(env.params().barrier, BarrierParams::default());
    }

    #[test]
    fn release_is_idempotent() {
        let mut env = SolverEnvironment::load().unwrap();
        assert!(env.release());
        assert!(env.is_released());
        assert!(!env.release());
        assert!(matches!(env.settings(), Err(SolverError::Released)));
        assert_eq!(env.set_presolve(true), Err(SolverError::Released));
    }

    #[test]
    fn options_deserialize_from_toml() {
        let opts: SolverOptions = toml::from_str("method = 2").unwrap();
        assert_eq!(opts, SolverOptions::with_method(SolverMethod::Barrier));
    }

    #[test]
    fn upper_triangle_conversion() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 3.0]);
        let csc = to_csc(&m, true);
        assert_eq!(csc.colptr, vec![0, 1, 3]);
        assert_eq!(csc.rowval, vec![0, 0, 1]);
        assert_eq!(csc.nzval, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn solves_equality_constrained_qp() {
        // min x² + y² - 2x  s.t.  x + y = 1,  y >= -1
        let p = DMatrix::from_diagonal_element(2, 2, 2.0);
        let q = DVector::from_vec(vec![-2.0, 0.0]);
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, -1.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        let qp = DenseQp {
            p: &p,
            q: &q,
            a: &a,
            b: &b,
            n_eq: 1,
        };

        let env = SolverEnvironment::acquire(&SolverOptions::with_method(SolverMethod::Barrier))
            .unwrap();
        let sol = env.solve(&qp).unwrap();
        assert!(sol.is_solved());
        assert!(sol.iterations <= BARRIER_ITERATION_LIMIT);
        assert_relative_eq!(sol.z[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(sol.z[1], 0.0, epsilon = 1e-2);
    }

    #[test]
    fn mismatched_qp_dimensions_are_rejected() {
        let p = DMatrix::identity(2, 2);
        let q = DVector::zeros(3);
        let a = DMatrix::zeros(0, 3);
        let b = DVector::zeros(0);
        let env = SolverEnvironment::load().unwrap();
        let result = env.solver(&DenseQp {
            p: &p,
            q: &q,
            a: &a,
            b: &b,
            n_eq: 0,
        });
        assert!(matches!(result, Err(SolverError::Setup(_))));
    }
}
