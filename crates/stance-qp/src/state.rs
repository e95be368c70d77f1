//! Mutable controller state carried between control ticks.

use nalgebra::{DVector, Vector3, Vector4};

use stance_core::{DofCounts, SideArray};

/// Runtime state of a freshly constructed controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Variable basis from the previous solve, for warm starts.
    pub vbasis: Vec<i32>,
    /// Constraint basis from the previous solve.
    pub cbasis: Vec<i32>,
    pub t_prev: f64,
    /// Velocity-reference integrator state, `nv`.
    pub vref_integrator_state: DVector<f64>,
    /// Position integrator state, `nq`.
    pub q_integrator_state: DVector<f64>,
    pub foot_contact_prev: SideArray<bool>,
    pub num_active_contact_pts: usize,
    pub center_of_mass_observer_state: Vector4<f64>,
    pub last_com_ddot: Vector3<f64>,
}

impl ControllerState {
    pub fn new(dofs: &DofCounts) -> Self {
        Self {
            vbasis: Vec::new(),
            cbasis: Vec::new(),
            t_prev: 0.0,
            vref_integrator_state: DVector::zeros(dofs.nv),
            q_integrator_state: DVector::zeros(dofs.nq),
            foot_contact_prev: SideArray::new(false, false),
            num_active_contact_pts: 0,
            center_of_mass_observer_state: Vector4::zeros(),
            last_com_ddot: Vector3::zeros(),
        }
    }
}
