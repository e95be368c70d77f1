use crate::types::{Actuator, JointSpan};

// ---------------------------------------------------------------------------
// KinematicTree
// ---------------------------------------------------------------------------

/// Read-only view of a compiled rigid-body tree.
///
/// This is the only surface the configuration layer needs from a robot
/// model: name lookups, DOF counts, and the ordered actuator list.
pub trait KinematicTree {
    /// Position span of the joint called `name`, if any.
    fn find_joint(&self, name: &str) -> Option<JointSpan>;

    /// Numeric identifier of the link called `name`, if any.
    fn find_link_id(&self, name: &str) -> Option<usize>;

    /// Length of the generalized position vector.
    fn num_positions(&self) -> usize;

    /// Length of the generalized velocity vector.
    fn num_velocities(&self) -> usize;

    /// Actuators in model order.
    fn actuators(&self) -> &[Actuator];
}
