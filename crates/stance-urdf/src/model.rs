//! Compiled kinematic tree with numbered coordinates and links.

use std::collections::HashMap;

use stance_core::{Actuator, JointSpan, KinematicTree};

use crate::error::UrdfError;
use crate::types::{JointType, LinkData};

/// A joint after coordinate assignment.
#[derive(Debug, Clone)]
pub struct CompiledJoint {
    pub name: String,
    pub joint_type: JointType,
    /// Parent link id; `None` for the floating base.
    pub parent: Option<usize>,
    /// Child link id.
    pub child: usize,
    pub span: JointSpan,
}

/// A compiled robot model: the rigid-body tree the controller is built on.
///
/// Produced by [`RobotModel::compile`](crate::RobotModel::compile). Link ids
/// index [`Self::links`]; position indices index the generalized position
/// vector.
#[derive(Debug, Clone)]
pub struct KinematicModel {
    name: String,
    links: Vec<LinkData>,
    joints: Vec<CompiledJoint>,
    joint_ids: HashMap<String, usize>,
    link_ids: HashMap<String, usize>,
    actuators: Vec<Actuator>,
    num_positions: usize,
    num_velocities: usize,
}

impl KinematicModel {
    pub(crate) fn new(
        name: String,
        links: Vec<LinkData>,
        joints: Vec<CompiledJoint>,
        actuators: Vec<Actuator>,
        link_ids: HashMap<String, usize>,
        num_positions: usize,
        num_velocities: usize,
    ) -> Self {
        let joint_ids = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.name.clone(), i))
            .collect();
        Self {
            name,
            links,
            joints,
            joint_ids,
            link_ids,
            actuators,
            num_positions,
            num_velocities,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Links, indexed by link id.
    pub fn links(&self) -> &[LinkData] {
        &self.links
    }

    /// Joints in coordinate order, floating base first.
    pub fn joints(&self) -> &[CompiledJoint] {
        &self.joints
    }

    pub fn joint(&self, name: &str) -> Result<&CompiledJoint, UrdfError> {
        self.joint_ids
            .get(name)
            .map(|&i| &self.joints[i])
            .ok_or_else(|| UrdfError::UnknownJoint(name.into()))
    }

    pub fn link_id(&self, name: &str) -> Option<usize> {
        self.link_ids.get(name).copied()
    }

    /// Joint name of each actuator, in actuator order.
    pub fn actuated_joint_names(&self) -> Vec<&str> {
        self.actuators.iter().map(|a| a.joint.as_str()).collect()
    }
}

impl KinematicTree for KinematicModel {
    fn find_joint(&self, name: &str) -> Option<JointSpan> {
        self.joint(name).ok().map(|j| j.span)
    }

    fn find_link_id(&self, name: &str) -> Option<usize> {
        self.link_id(name)
    }

    fn num_positions(&self) -> usize {
        self.num_positions
    }

    fn num_velocities(&self) -> usize {
        self.num_velocities
    }

    fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }
}
