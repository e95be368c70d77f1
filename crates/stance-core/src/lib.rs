// stance-core: configuration reading, parameter sets, and kinematic metadata
// for the stance whole-body QP controller.

pub mod error;
pub mod metadata;
pub mod params;
pub mod reader;
pub mod registry;
pub mod traits;
pub mod types;

pub use error::{ConfigError, Dims, ErrorKind, NameKind};
pub use metadata::{PositionIndices, RobotPropertyCache, find_position_indices};
pub use params::{
    AccelBounds, BodyMotionParams, CONTROL_MODE_THRESHOLD, HardwareGains, HardwareParams,
    IntegratorParams, JointSoftLimitParams, QddBounds, QpControllerParams, VRefIntegratorParams,
    WholeBodyParams,
};
pub use reader::{ConfigNode, load_document};
pub use registry::ParameterSetRegistry;
pub use traits::KinematicTree;
pub use types::{Actuator, DofCounts, JointSpan, Side, SideArray};
