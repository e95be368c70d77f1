//! Controller context assembly for the stance whole-body QP controller.
//!
//! Ties a compiled [`stance_urdf::KinematicModel`] and the parsed controller
//! configuration together with a solver environment, a preallocated
//! workspace, and zeroed runtime state.

pub mod context;
pub mod error;
pub mod handle;
pub mod joint_names;
pub mod solver;
pub mod state;
pub mod workspace;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use context::{
    COLLISION_GROUPS_TO_KEEP, ConstructArgs, ControllerContext, METADATA_SECTION, PARAMS_SECTION,
    load_model, prepare_model,
};
pub use error::{ControllerError, SolverError};
pub use handle::ControllerHandle;
pub use joint_names::JointNames;
pub use solver::{
    BARRIER_CONVERGENCE_TOLERANCE, BARRIER_ITERATION_LIMIT, BarrierParams, DenseQp, QpSolution,
    SolverEnvironment, SolverMethod, SolverOptions, SolverParams,
};
pub use state::ControllerState;
pub use workspace::QpWorkspace;
