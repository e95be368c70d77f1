//! URDF XML parsing using `urdf-rs`.
//!
//! Converts `urdf_rs` types into the crate's [`RobotModel`], keeping only
//! what the controller needs: tree topology, joint limits, and collision
//! geometry with its group names.

use std::collections::HashSet;
use std::path::Path;

use crate::error::UrdfError;
use crate::types::{Collision, Geometry, JointData, JointLimits, JointType, LinkData, RobotModel};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a URDF file from disk into a [`RobotModel`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<RobotModel, UrdfError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| UrdfError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse a URDF XML string into a [`RobotModel`].
pub fn parse_string(xml: &str) -> Result<RobotModel, UrdfError> {
    let robot = urdf_rs::read_from_string(xml).map_err(|e| UrdfError::Malformed(e.to_string()))?;
    convert_robot(&robot)
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn convert_robot(robot: &urdf_rs::Robot) -> Result<RobotModel, UrdfError> {
    let links: Vec<LinkData> = robot.links.iter().map(convert_link).collect();
    let joints: Vec<JointData> = robot
        .joints
        .iter()
        .map(convert_joint)
        .collect::<Result<_, _>>()?;

    // Root link = the first link (in document order) that is never a child.
    let child_links: HashSet<&str> = joints.iter().map(|j| j.child.as_str()).collect();
    let root_link = links
        .iter()
        .find(|l| !child_links.contains(l.name.as_str()))
        .ok_or(UrdfError::NoRootLink)?
        .name
        .clone();

    Ok(RobotModel {
        name: robot.name.clone(),
        links,
        joints,
        root_link,
    })
}

fn convert_link(link: &urdf_rs::Link) -> LinkData {
    LinkData {
        name: link.name.clone(),
        collisions: link.collision.iter().map(convert_collision).collect(),
    }
}

fn convert_joint(joint: &urdf_rs::Joint) -> Result<JointData, UrdfError> {
    Ok(JointData {
        name: joint.name.clone(),
        joint_type: convert_joint_type(&joint.name, &joint.joint_type)?,
        parent: joint.parent.link.clone(),
        child: joint.child.link.clone(),
        limits: convert_limits(&joint.limit),
    })
}

fn convert_joint_type(name: &str, jt: &urdf_rs::JointType) -> Result<JointType, UrdfError> {
    match jt {
        urdf_rs::JointType::Revolute => Ok(JointType::Revolute),
        urdf_rs::JointType::Continuous => Ok(JointType::Continuous),
        urdf_rs::JointType::Prismatic => Ok(JointType::Prismatic),
        urdf_rs::JointType::Fixed => Ok(JointType::Fixed),
        urdf_rs::JointType::Floating => Ok(JointType::Floating),
        urdf_rs::JointType::Planar => Ok(JointType::Planar),
        urdf_rs::JointType::Spherical => Err(UrdfError::UnsupportedJoint {
            joint: name.to_owned(),
            kind: "spherical",
        }),
    }
}

fn convert_limits(limit: &urdf_rs::JointLimit) -> JointLimits {
    JointLimits {
        effort: limit.effort,
    }
}

fn convert_collision(collision: &urdf_rs::Collision) -> Collision {
    Collision {
        group: collision.name.clone(),
        geometry: convert_geometry(&collision.geometry),
    }
}

fn convert_geometry(geom: &urdf_rs::Geometry) -> Geometry {
    match geom {
        urdf_rs::Geometry::Sphere { radius } => Geometry::Sphere { radius: *radius },
        urdf_rs::Geometry::Box { size } => Geometry::Box { size: **size },
        urdf_rs::Geometry::Cylinder { radius, length }
        | urdf_rs::Geometry::Capsule { radius, length } => Geometry::Cylinder {
            radius: *radius,
            length: *length,
        },
        urdf_rs::Geometry::Mesh { filename, scale } => Geometry::Mesh {
            filename: filename.clone(),
            scale: scale.as_ref().map_or([1.0, 1.0, 1.0], |s| **s),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
