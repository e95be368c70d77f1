//! Table-backed [`KinematicTree`] for tests that don't need a URDF.

use stance_core::{Actuator, JointSpan, KinematicTree};

/// Kinematic tree built joint by joint. Starts with a 6-coordinate floating
/// base named `base` and the root link `root`.
#[derive(Debug, Clone)]
pub struct MockTree {
    joints: Vec<(String, JointSpan)>,
    links: Vec<String>,
    actuators: Vec<Actuator>,
    num_positions: usize,
}

impl Default for MockTree {
    fn default() -> Self {
        Self::floating()
    }
}

impl MockTree {
    pub fn floating() -> Self {
        Self {
            joints: vec![("base".into(), JointSpan::new(0, 6))],
            links: vec!["root".into()],
            actuators: Vec::new(),
            num_positions: 6,
        }
    }

    /// Append a joint with `num_positions` coordinates moving link `child`.
    /// Single-coordinate joints get an actuator bounded by `±effort`.
    #[must_use]
    pub fn with_joint(mut self, name: &str, child: &str, num_positions: usize, effort: f64) -> Self {
        self.joints
            .push((name.into(), JointSpan::new(self.num_positions, num_positions)));
        self.links.push(child.into());
        self.num_positions += num_positions;
        if num_positions == 1 {
            self.actuators.push(Actuator {
                name: name.into(),
                joint: name.into(),
                body: child.into(),
                effort_limit_min: -effort,
                effort_limit_max: effort,
            });
        }
        self
    }
}

impl KinematicTree for MockTree {
    fn find_joint(&self, name: &str) -> Option<JointSpan> {
        self.joints.iter().find(|(n, _)| n == name).map(|(_, s)| *s)
    }

    fn find_link_id(&self, name: &str) -> Option<usize> {
        self.links.iter().position(|l| l == name)
    }

    fn num_positions(&self) -> usize {
        self.num_positions
    }

    fn num_velocities(&self) -> usize {
        self.num_positions
    }

    fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }
}
