//! URDF loading and kinematic tree compilation for the stance controller.
//!
//! Parses a robot description into a [`RobotModel`], lets callers prune
//! collision groups, and compiles it into a [`KinematicModel`] whose joints
//! carry position indices and whose links carry numeric ids.

pub mod error;
pub mod model;
pub mod parser;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::UrdfError;
pub use model::{CompiledJoint, KinematicModel};
pub use parser::{parse_file, parse_string};
pub use types::{
    Collision, FLOATING_BASE_JOINT, Geometry, JointData, JointLimits, JointType, LinkData,
    RobotModel,
};
