//! Joint-name lists used to map between controller and hardware ordering.

use std::path::Path;

use serde_yaml::Value;
use tracing::warn;

use stance_core::{ConfigError, ConfigNode, KinematicTree, NameKind, load_document};

/// Actuated joint names in controller order next to the hardware's own
/// joint-name list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointNames {
    /// Joint of each actuator, in actuator order.
    pub controller: Vec<String>,
    /// The `joint_names` list of the hardware document, as given.
    pub robot: Vec<String>,
}

impl JointNames {
    /// Build from a model and a parsed hardware document.
    pub fn from_hardware_config(
        tree: &impl KinematicTree,
        hardware: &Value,
    ) -> Result<Self, ConfigError> {
        let controller: Vec<String> = tree.actuators().iter().map(|a| a.joint.clone()).collect();
        let robot = ConfigNode::root(hardware).string_list("joint_names")?;
        if controller.len() != robot.len() {
            warn!(
                controller = controller.len(),
                robot = robot.len(),
                "hardware joint list length differs from actuator count"
            );
        }
        Ok(Self { controller, robot })
    }

    /// Build from a model and a hardware document on disk.
    pub fn load(tree: &impl KinematicTree, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let doc = load_document(path)?;
        Self::from_hardware_config(tree, &doc)
    }

    /// For each controller joint, its index in the hardware list.
    pub fn controller_to_robot(&self) -> Result<Vec<usize>, ConfigError> {
        self.controller
            .iter()
            .map(|name| {
                self.robot
                    .iter()
                    .position(|r| r == name)
                    .ok_or_else(|| ConfigError::UnresolvedName {
                        kind: NameKind::HardwareJoint,
                        name: name.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::ErrorKind;
    use stance_test_utils::MockTree;

    fn hip_and_knee() -> MockTree {
        MockTree::floating()
            .with_joint("hip", "thigh", 1, 1.0)
            .with_joint("knee", "shin", 1, 1.0)
    }

    fn hardware(names: &str) -> Value {
        serde_yaml::from_str(&format!("joint_names: {names}")).unwrap()
    }

    #[test]
    fn maps_controller_order_onto_hardware_order() {
        let names =
            JointNames::from_hardware_config(&hip_and_knee(), &hardware("[knee, ankle, hip]"))
                .unwrap();
        assert_eq!(names.controller, vec!["hip", "knee"]);
        assert_eq!(names.robot, vec!["knee", "ankle", "hip"]);
        assert_eq!(names.controller_to_robot().unwrap(), vec![2, 0]);
    }

    #[test]
    fn missing_hardware_joint_is_unresolved() {
        let names = JointNames::from_hardware_config(&hip_and_knee(), &hardware("[hip]")).unwrap();
        let err = names.controller_to_robot().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedName);
        assert_eq!(err.to_string(), "unresolved hardware joint name: knee");
    }

    #[test]
    fn missing_list_is_reported() {
        let doc: Value = serde_yaml::from_str("other: 1").unwrap();
        let err = JointNames::from_hardware_config(&hip_and_knee(), &doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn load_reads_document_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hardware.yaml");
        std::fs::write(&path, "joint_names: [knee, hip]\n").unwrap();
        let names = JointNames::load(&hip_and_knee(), &path).unwrap();
        assert_eq!(names.robot, vec!["knee", "hip"]);
        assert_eq!(names.controller_to_robot().unwrap(), vec![1, 0]);
    }

    #[test]
    fn load_missing_file_is_a_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JointNames::load(&hip_and_knee(), dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Document);
    }
}
