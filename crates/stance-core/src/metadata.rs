//! Resolution of side-qualified robot part names into model indices.

use crate::error::{ConfigError, NameKind};
use crate::reader::ConfigNode;
use crate::traits::KinematicTree;
use crate::types::{Side, SideArray};

/// Position indices of the named joint groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionIndices {
    pub legs: SideArray<Vec<usize>>,
    pub knees: SideArray<usize>,
    pub ankles: SideArray<Vec<usize>>,
    pub arms: SideArray<Vec<usize>>,
    pub neck: Vec<usize>,
    pub back_bkz: usize,
    pub back_bky: usize,
}

/// Link ids and position indices of the robot parts the controller
/// addresses by role rather than by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotPropertyCache {
    pub foot_ids: SideArray<usize>,
    pub position_indices: PositionIndices,
}

impl RobotPropertyCache {
    /// Resolve a `kinematic_tree_metadata` section against `tree`.
    pub fn parse(metadata: &ConfigNode<'_>, tree: &impl KinematicTree) -> Result<Self, ConfigError> {
        let feet = metadata.field("body_names")?.field("feet")?;
        let foot_ids = SideArray::try_from_fn(|side| {
            let name = feet.string(side.code())?;
            find_link_id(tree, &name)
        })?;

        let groups = metadata.field("joint_group_names")?;
        let per_side = |group: &str, side: Side| groups.field(group)?.string_list(side.code());

        let legs = SideArray::try_from_fn(|side| find_position_indices(tree, &per_side("legs", side)?))?;
        let knees = SideArray::try_from_fn(|side| {
            let name = groups.field("knees")?.string(side.code())?;
            position_start(tree, &name)
        })?;
        let ankles =
            SideArray::try_from_fn(|side| find_position_indices(tree, &per_side("ankles", side)?))?;
        let arms = SideArray::try_from_fn(|side| find_position_indices(tree, &per_side("arms", side)?))?;

        Ok(Self {
            foot_ids,
            position_indices: PositionIndices {
                legs,
                knees,
                ankles,
                arms,
                neck: find_position_indices(tree, &groups.string_list("neck")?)?,
                back_bkz: position_start(tree, &groups.string("back_bkz")?)?,
                back_bky: position_start(tree, &groups.string("back_bky")?)?,
            },
        })
    }
}

/// Concatenate the full position span of each named joint, in order.
pub fn find_position_indices(
    tree: &impl KinematicTree,
    joint_names: &[String],
) -> Result<Vec<usize>, ConfigError> {
    let mut indices = Vec::with_capacity(joint_names.len());
    for name in joint_names {
        let span = tree
            .find_joint(name)
            .ok_or_else(|| unresolved(NameKind::Joint, name))?;
        indices.extend(span.positions());
    }
    Ok(indices)
}

fn position_start(tree: &impl KinematicTree, name: &str) -> Result<usize, ConfigError> {
    tree.find_joint(name)
        .map(|span| span.position_start)
        .ok_or_else(|| unresolved(NameKind::Joint, name))
}

fn find_link_id(tree: &impl KinematicTree, name: &str) -> Result<usize, ConfigError> {
    tree.find_link_id(name)
        .ok_or_else(|| unresolved(NameKind::Link, name))
}

fn unresolved(kind: NameKind, name: &str) -> ConfigError {
    ConfigError::UnresolvedName {
        kind,
        name: name.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
