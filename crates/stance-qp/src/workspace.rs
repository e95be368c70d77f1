//! Preallocated scratch matrices for the QP control loop.

use nalgebra::{DMatrix, DVector};

use stance_core::DofCounts;

/// Number of rows in the floating-base block of the dynamics.
pub const FLOATING_BASE_DIM: usize = 6;

/// Scratch storage sized from the model's DOF counts.
///
/// Matrices are named after the quantities the control loop writes into
/// them; every entry starts at zero.
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct QpWorkspace {
    /// Mass matrix, `nq × nq`.
    pub H: DMatrix<f64>,
    /// Floating-base rows of the mass matrix, `6 × nq`.
    pub H_float: DMatrix<f64>,
    /// Actuated rows of the mass matrix, `nu × nq`.
    pub H_act: DMatrix<f64>,
    /// Bias forces, `nq`.
    pub C: DVector<f64>,
    pub C_float: DVector<f64>,
    pub C_act: DVector<f64>,
    /// Center-of-mass Jacobian, `3 × nq`.
    pub J: DMatrix<f64>,
    /// Horizontal rows of the center-of-mass Jacobian, `2 × nq`.
    pub J_xy: DMatrix<f64>,
    /// QP Hessian, `nq × nq`.
    pub Hqp: DMatrix<f64>,
    /// QP linear term, `nq`.
    pub fqp: DVector<f64>,
    /// Centroidal momentum matrix, `6 × nq`.
    pub Ag: DMatrix<f64>,
    /// Angular rows of the centroidal momentum matrix, `3 × nq`.
    pub Ak: DMatrix<f64>,
}

impl QpWorkspace {
    pub fn new(dofs: &DofCounts) -> Self {
        let DofCounts { nq, nu, .. } = *dofs;
        Self {
            H: DMatrix::zeros(nq, nq),
            H_float: DMatrix::zeros(FLOATING_BASE_DIM, nq),
            H_act: DMatrix::zeros(nu, nq),
            C: DVector::zeros(nq),
            C_float: DVector::zeros(FLOATING_BASE_DIM),
            C_act: DVector::zeros(nu),
            J: DMatrix::zeros(3, nq),
            J_xy: DMatrix::zeros(2, nq),
            Hqp: DMatrix::zeros(nq, nq),
            fqp: DVector::zeros(nq),
            Ag: DMatrix::zeros(FLOATING_BASE_DIM, nq),
            Ak: DMatrix::zeros(3, nq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_dof_counts() {
        let ws = QpWorkspace::new(&DofCounts::new(10, 10, 4));
        assert_eq!(ws.H.shape(), (10, 10));
        assert_eq!(ws.H_float.shape(), (6, 10));
        assert_eq!(ws.H_act.shape(), (4, 10));
        assert_eq!(ws.C.len(), 10);
        assert_eq!(ws.C_float.len(), 6);
        assert_eq!(ws.C_act.len(), 4);
        assert_eq!(ws.J.shape(), (3, 10));
        assert_eq!(ws.J_xy.shape(), (2, 10));
        assert_eq!(ws.Hqp.shape(), (10, 10));
        assert_eq!(ws.fqp.len(), 10);
        assert_eq!(ws.Ag.shape(), (6, 10));
        assert_eq!(ws.Ak.shape(), (3, 10));
    }

    #[test]
    fn starts_zeroed() {
        let ws = QpWorkspace::new(&DofCounts::new(7, 7, 1));
        assert!(ws.H.iter().all(|&v| v == 0.0));
        assert!(ws.Ag.iter().all(|&v| v == 0.0));
        assert!(ws.fqp.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn unactuated_model_has_empty_actuated_blocks() {
        let ws = QpWorkspace::new(&DofCounts::new(6, 6, 0));
        assert_eq!(ws.H_act.shape(), (0, 6));
        assert!(ws.C_act.is_empty());
    }
}
