//! In-memory robot description, as parsed and before compilation.
//!
//! Links and joints keep their document order; [`RobotModel::compile`]
//! relies on it to number coordinates deterministically.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::error::UrdfError;
use crate::model::{CompiledJoint, KinematicModel};
use stance_core::{Actuator, JointSpan};

/// Name of the floating joint that attaches the root link to the world.
pub const FLOATING_BASE_JOINT: &str = "base";

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Rotation about a single axis, with position limits.
    Revolute,
    /// Unlimited rotation about a single axis.
    Continuous,
    /// Translation along an axis, with position limits.
    Prismatic,
    /// No relative motion between parent and child.
    Fixed,
    /// Unconstrained 6-DOF joint, parameterized as xyz + roll-pitch-yaw.
    Floating,
    /// Planar motion: two translations and one rotation.
    Planar,
}

impl JointType {
    /// Whether this joint type is driven by an actuator.
    pub const fn is_actuated(self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous | Self::Prismatic)
    }

    pub const fn num_positions(self) -> usize {
        match self {
            Self::Revolute | Self::Continuous | Self::Prismatic => 1,
            Self::Fixed => 0,
            Self::Floating => 6,
            Self::Planar => 3,
        }
    }

    /// Same as [`Self::num_positions`]: rotations use roll-pitch-yaw, not
    /// quaternions.
    pub const fn num_velocities(self) -> usize {
        self.num_positions()
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Effort limit declared on a joint.
#[derive(Debug, Clone, Default)]
pub struct JointLimits {
    /// Maximum effort (Nm or N). Zero means unbounded.
    pub effort: f64,
}

impl JointLimits {
    /// Symmetric effort bounds, or infinite bounds when no effort is declared.
    pub fn effort_bounds(&self) -> (f64, f64) {
        if self.effort > 0.0 {
            (-self.effort, self.effort)
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry / Collision
// ---------------------------------------------------------------------------

/// Geometric shape of a collision element.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere { radius: f64 },
    Box { size: [f64; 3] },
    Cylinder { radius: f64, length: f64 },
    Mesh { filename: String, scale: [f64; 3] },
}

/// A collision element of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Collision group, taken from the element's `name` attribute.
    pub group: Option<String>,
    pub geometry: Geometry,
}

impl Collision {
    /// Group name, empty for ungrouped elements.
    pub fn group_name(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// LinkData / JointData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF link.
#[derive(Debug, Clone)]
pub struct LinkData {
    pub name: String,
    pub collisions: Vec<Collision>,
}

impl LinkData {
    /// Create a link with only a name (no collision geometry).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collisions: Vec::new(),
        }
    }
}

/// In-memory representation of a URDF joint.
#[derive(Debug, Clone)]
pub struct JointData {
    pub name: String,
    pub joint_type: JointType,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    pub limits: JointLimits,
}

// ---------------------------------------------------------------------------
// RobotModel
// ---------------------------------------------------------------------------

/// A parsed robot description, prior to coordinate assignment.
#[derive(Debug, Clone)]
pub struct RobotModel {
    pub name: String,
    /// Links in document order.
    pub links: Vec<LinkData>,
    /// Joints in document order.
    pub joints: Vec<JointData>,
    /// Name of the root link (the one never referenced as a child).
    pub root_link: String,
}

impl RobotModel {
    /// Get a link by name.
    pub fn link(&self, name: &str) -> Result<&LinkData, UrdfError> {
        self.links
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| UrdfError::UnknownLink(name.into()))
    }

    /// Get a joint by name.
    pub fn joint(&self, name: &str) -> Result<&JointData, UrdfError> {
        self.joints
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| UrdfError::UnknownJoint(name.into()))
    }

    /// Distinct collision group names, sorted. Ungrouped elements appear
    /// as the empty string.
    pub fn collision_groups(&self) -> Vec<&str> {
        let groups: BTreeSet<&str> = self
            .links
            .iter()
            .flat_map(|l| l.collisions.iter().map(Collision::group_name))
            .collect();
        groups.into_iter().collect()
    }

    /// Drop every collision element whose group matches `pred`.
    ///
    /// Returns the number of elements removed.
    pub fn remove_collision_groups_if(&mut self, mut pred: impl FnMut(&str) -> bool) -> usize {
        let mut removed = 0;
        for link in &mut self.links {
            let before = link.collisions.len();
            link.collisions.retain(|c| !pred(c.group_name()));
            removed += before - link.collisions.len();
        }
        debug!(removed, "filtered collision groups");
        removed
    }

    /// Attach a floating base to the root link and number every joint's
    /// coordinates and every link in depth-first order.
    ///
    /// Children are visited in document order. Actuators are created for
    /// each revolute, continuous, or prismatic joint, in the same order.
    pub fn compile(self) -> Result<KinematicModel, UrdfError> {
        let link_names: HashSet<&str> = self.links.iter().map(|l| l.name.as_str()).collect();
        let mut joint_names = HashSet::from([FLOATING_BASE_JOINT]);
        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();

        for (i, joint) in self.joints.iter().enumerate() {
            for end in [&joint.parent, &joint.child] {
                if !link_names.contains(end.as_str()) {
                    return Err(UrdfError::DanglingJoint {
                        joint: joint.name.clone(),
                        link: end.clone(),
                    });
                }
            }
            if !joint_names.insert(joint.name.as_str()) {
                return Err(UrdfError::DuplicateJoint(joint.name.clone()));
            }
            if parents.insert(&joint.child, &joint.name).is_some() {
                return Err(UrdfError::MultipleParents(joint.child.clone()));
            }
            children.entry(joint.parent.as_str()).or_default().push(i);
        }
        if !link_names.contains(self.root_link.as_str()) {
            return Err(UrdfError::NoRootLink);
        }

        // Depth-first preorder; children pushed in reverse so they pop in
        // document order.
        let mut link_order: Vec<&str> = Vec::with_capacity(self.links.len());
        let mut joint_order: Vec<usize> = Vec::with_capacity(self.joints.len());
        let mut stack: Vec<(&str, Option<usize>)> = vec![(self.root_link.as_str(), None)];
        while let Some((link, via)) = stack.pop() {
            link_order.push(link);
            joint_order.extend(via);
            if let Some(kids) = children.get(link) {
                stack.extend(
                    kids.iter()
                        .rev()
                        .map(|&j| (self.joints[j].child.as_str(), Some(j))),
                );
            }
        }

        if link_order.len() != self.links.len() {
            let reached: HashSet<&str> = link_order.iter().copied().collect();
            let mut orphans: Vec<String> = link_names
                .difference(&reached)
                .map(|&l| l.to_owned())
                .collect();
            orphans.sort_unstable();
            return Err(UrdfError::Disconnected {
                root: self.root_link.clone(),
                orphans,
            });
        }

        let link_ids: HashMap<String, usize> = link_order
            .iter()
            .enumerate()
            .map(|(id, name)| ((*name).to_owned(), id))
            .collect();

        let base_positions = JointType::Floating.num_positions();
        let mut joints = vec![CompiledJoint {
            name: FLOATING_BASE_JOINT.into(),
            joint_type: JointType::Floating,
            parent: None,
            child: 0,
            span: JointSpan::new(0, base_positions),
        }];
        let mut actuators = Vec::new();
        let mut nq = base_positions;
        let mut nv = JointType::Floating.num_velocities();

        for &j in &joint_order {
            let joint = &self.joints[j];
            let positions = joint.joint_type.num_positions();
            joints.push(CompiledJoint {
                name: joint.name.clone(),
                joint_type: joint.joint_type,
                parent: Some(link_ids[joint.parent.as_str()]),
                child: link_ids[joint.child.as_str()],
                span: JointSpan::new(nq, positions),
            });
            nq += positions;
            nv += joint.joint_type.num_velocities();

            if joint.joint_type.is_actuated() {
                let (effort_limit_min, effort_limit_max) = joint.limits.effort_bounds();
                actuators.push(Actuator {
                    name: joint.name.clone(),
                    joint: joint.name.clone(),
                    body: joint.child.clone(),
                    effort_limit_min,
                    effort_limit_max,
                });
            }
        }

        let mut by_name: HashMap<String, LinkData> = self
            .links
            .into_iter()
            .map(|l| (l.name.clone(), l))
            .collect();
        let links = link_order
            .iter()
            .filter_map(|name| by_name.remove(*name))
            .collect();

        debug!(
            robot = %self.name,
            nq,
            nv,
            nu = actuators.len(),
            "compiled kinematic tree"
        );

        Ok(KinematicModel::new(
            self.name, links, joints, actuators, link_ids, nq, nv,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
