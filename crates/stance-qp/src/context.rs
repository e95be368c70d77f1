//! Controller context assembly.
//!
//! [`ControllerContext::construct`] loads the model and both documents,
//! validates every parameter set against the model's DOF counts, resolves
//! named robot parts, acquires the solver environment, and preallocates
//! the workspace and runtime state. Any failure aborts construction and
//! nothing partially built is returned.

use std::path::{Path, PathBuf};

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info};

use stance_core::{
    ConfigError, ConfigNode, DofCounts, KinematicTree, ParameterSetRegistry, RobotPropertyCache, load_document,
};
use stance_urdf::{KinematicModel, RobotModel, UrdfError, parse_file};

use crate::error::ControllerError;
use crate::joint_names::JointNames;
use crate::solver::{SolverEnvironment, SolverOptions};
use crate::state::ControllerState;
use crate::workspace::QpWorkspace;

/// Collision groups the controller keeps; all others are removed before
/// the model is compiled.
pub const COLLISION_GROUPS_TO_KEEP: [&str; 2] = ["heel", "toe"];

/// Section of the controller document holding the named parameter sets.
pub const PARAMS_SECTION: &str = "qp_controller_params";

/// Section of the controller document holding robot part names.
pub const METADATA_SECTION: &str = "kinematic_tree_metadata";

// ---------------------------------------------------------------------------
// Construction arguments
// ---------------------------------------------------------------------------

/// Inputs to [`ControllerContext::construct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructArgs {
    pub model_path: PathBuf,
    pub config_path: PathBuf,
    /// Opaque mode code stored on the context for the control loop.
    #[serde(default)]
    pub solver_mode: i32,
    pub solver_options: SolverOptions,
    pub hardware_joint_names_path: PathBuf,
    /// Expected number of tracked bodies per parameter set. When absent
    /// the first parameter set fixes it.
    #[serde(default)]
    pub num_tracked_bodies: Option<usize>,
}

impl ConstructArgs {
    /// Load arguments from a TOML file. Relative paths are resolved
    /// against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ControllerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut args: Self = toml::from_str(&content)?;
        if let Some(dir) = path.parent() {
            args.resolve_relative_to(dir);
        }
        Ok(args)
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        for p in [
            &mut self.model_path,
            &mut self.config_path,
            &mut self.hardware_joint_names_path,
        ] {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Model loading
// ---------------------------------------------------------------------------

/// Parse a URDF file and prepare it for the controller.
pub fn load_model(path: impl AsRef<Path>) -> Result<KinematicModel, UrdfError> {
    prepare_model(parse_file(path)?)
}

/// Drop every collision group the controller does not use, then compile.
pub fn prepare_model(mut robot: RobotModel) -> Result<KinematicModel, UrdfError> {
    let removed =
        robot.remove_collision_groups_if(|group| !COLLISION_GROUPS_TO_KEEP.contains(&group));
    debug!(robot = %robot.name, removed, "removed unused collision groups");
    robot.compile()
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything the controller needs for its lifetime.
#[derive(Debug)]
pub struct ControllerContext {
    pub robot: KinematicModel,
    pub param_sets: ParameterSetRegistry,
    pub rpc: RobotPropertyCache,
    /// Actuator effort lower bounds, actuator order.
    pub umin: DVector<f64>,
    pub umax: DVector<f64>,
    pub solver_mode: i32,
    pub input_joint_names: JointNames,
    /// Acceleration bounds, `nq`, unbounded at construction.
    pub qdd_lb: DVector<f64>,
    pub qdd_ub: DVector<f64>,
    pub env: SolverEnvironment,
    pub workspace: QpWorkspace,
    pub state: ControllerState,
}

impl ControllerContext {
    /// Build a context from files on disk.
    ///
    /// The hardware joint-names document is only read once the parameter
    /// sets and robot metadata have been validated.
    pub fn construct(args: &ConstructArgs) -> Result<Self, ControllerError> {
        info!(
            model = %args.model_path.display(),
            config = %args.config_path.display(),
            "constructing controller context"
        );
        let robot = load_model(&args.model_path)?;
        let control_config = load_document(&args.config_path)?;
        Self::build(
            robot,
            &control_config,
            |robot| JointNames::load(robot, &args.hardware_joint_names_path),
            args.solver_mode,
            &args.solver_options,
            args.num_tracked_bodies,
        )
    }

    /// Build a context from an already compiled model and parsed documents.
    pub fn assemble(
        robot: KinematicModel,
        control_config: &Value,
        hardware_config: &Value,
        solver_mode: i32,
        solver_options: &SolverOptions,
        num_tracked_bodies: Option<usize>,
    ) -> Result<Self, ControllerError> {
        Self::build(
            robot,
            control_config,
            |robot| JointNames::from_hardware_config(robot, hardware_config),
            solver_mode,
            solver_options,
            num_tracked_bodies,
        )
    }

    fn build(
        robot: KinematicModel,
        control_config: &Value,
        joint_names: impl FnOnce(&KinematicModel) -> Result<JointNames, ConfigError>,
        solver_mode: i32,
        solver_options: &SolverOptions,
        num_tracked_bodies: Option<usize>,
    ) -> Result<Self, ControllerError> {
        let dofs = DofCounts::from_tree(&robot);
        let root = ConfigNode::root(control_config);

        let param_sets = ParameterSetRegistry::from_config(
            &root.field(PARAMS_SECTION)?,
            &dofs,
            num_tracked_bodies,
        )?;
        let rpc = RobotPropertyCache::parse(&root.field(METADATA_SECTION)?, &robot)?;

        let (umin, umax) = effort_bounds(&robot);
        let input_joint_names = joint_names(&robot)?;

        let qdd_lb = DVector::from_element(dofs.nq, f64::NEG_INFINITY);
        let qdd_ub = DVector::from_element(dofs.nq, f64::INFINITY);

        let env = SolverEnvironment::acquire(solver_options)?;
        let workspace = QpWorkspace::new(&dofs);
        let state = ControllerState::new(&dofs);

        info!(
            nq = dofs.nq,
            nv = dofs.nv,
            nu = dofs.nu,
            parameter_sets = param_sets.len(),
            "controller context constructed"
        );

        Ok(Self {
            robot,
            param_sets,
            rpc,
            umin,
            umax,
            solver_mode,
            input_joint_names,
            qdd_lb,
            qdd_ub,
            env,
            workspace,
            state,
        })
    }

    pub fn dofs(&self) -> DofCounts {
        DofCounts::from_tree(&self.robot)
    }

    /// Release the solver environment and drop the context.
    pub fn teardown(mut self) {
        self.env.release();
        info!(robot = %self.robot.name(), "controller context torn down");
    }
}

/// Per-actuator effort bounds, in actuator order.
fn effort_bounds(tree: &impl KinematicTree) -> (DVector<f64>, DVector<f64>) {
    let actuators = tree.actuators();
    (
        DVector::from_iterator(actuators.len(), actuators.iter().map(|a| a.effort_limit_min)),
        DVector::from_iterator(actuators.len(), actuators.iter().map(|a| a.effort_limit_max)),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_from_toml_resolve_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("args.toml");
        std::fs::write(
            &path,
            r#"
            model_path = "robot.urdf"
            config_path = "/etc/stance/control.yaml"
            hardware_joint_names_path = "hw.yaml"

            [solver_options]
            method = 2
            "#,
        )
        .unwrap();

        let args = ConstructArgs::from_file(&path).unwrap();
        assert_eq!(args.model_path, dir.path().join("robot.urdf"));
        assert_eq!(args.config_path, PathBuf::from("/etc/stance/control.yaml"));
        assert_eq!(args.hardware_joint_names_path, dir.path().join("hw.yaml"));
        assert_eq!(args.solver_mode, 0);
        assert_eq!(args.solver_options.method, 2);
        assert_eq!(args.num_tracked_bodies, None);
    }

    #[test]
    fn args_missing_solver_options_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("args.toml");
        std::fs::write(
            &path,
            "model_path = \"a\"\nconfig_path = \"b\"\nhardware_joint_names_path = \"c\"\n",
        )
        .unwrap();
        let err = ConstructArgs::from_file(&path).unwrap_err();
        assert!(matches!(err, ControllerError::Toml(_)));
    }

    #[test]
    fn args_file_not_found() {
        let err = ConstructArgs::from_file("/nonexistent/args.toml").unwrap_err();
        assert!(matches!(err, ControllerError::Io { .. }));
    }

    #[test]
    fn prepare_model_keeps_only_heel_and_toe() {
        let robot = stance_urdf::parse_string(
            r#"
            <robot name="foot">
                <link name="foot">
                    <collision name="heel"><geometry><sphere radius="0.01"/></geometry></collision>
                    <collision name="toe"><geometry><sphere radius="0.01"/></geometry></collision>
                    <collision name="sole"><geometry><sphere radius="0.01"/></geometry></collision>
                    <collision><geometry><sphere radius="0.01"/></geometry></collision>
                </link>
            </robot>
            "#,
        )
        .unwrap();
        let model = prepare_model(robot).unwrap();
        let groups: Vec<&str> = model.links()[0]
            .collisions
            .iter()
            .map(stance_urdf::Collision::group_name)
            .collect();
        assert_eq!(groups, vec!["heel", "toe"]);
    }
}
