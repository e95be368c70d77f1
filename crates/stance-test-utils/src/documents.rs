//! Generated controller and hardware documents.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};
use tempfile::TempDir;

use stance_core::DofCounts;

use crate::biped::{actuated_joint_names, biped_urdf};

// ---------------------------------------------------------------------------
// Value builders
// ---------------------------------------------------------------------------

/// Mapping from `(key, value)` pairs, preserving order.
pub fn mapping<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (Value::from(k), v))
            .collect::<Mapping>(),
    )
}

/// Sequence of `n` copies of `x`.
pub fn repeated(n: usize, x: f64) -> Value {
    Value::Sequence(vec![Value::from(x); n])
}

/// `n × n` matrix as rows, with `diag` on the diagonal.
pub fn diagonal_rows(n: usize, diag: f64) -> Value {
    Value::Sequence(
        (0..n)
            .map(|i| {
                Value::Sequence(
                    (0..n)
                        .map(|j| Value::from(if i == j { diag } else { 0.0 }))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn strings(items: &[&str]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::from(*s)).collect())
}

/// Replace (or insert) the value at a key path.
///
/// # Panics
/// If an intermediate key is missing or not a mapping.
pub fn set_path(doc: &mut Value, path: &[&str], value: Value) {
    let (last, parents) = path.split_last().expect("non-empty path");
    let mut cur = doc;
    for key in parents {
        cur = cur.get_mut(*key).expect("path exists");
    }
    cur.as_mapping_mut()
        .expect("parent is a mapping")
        .insert(Value::from(*last), value);
}

/// Remove the value at a key path, returning it.
///
/// # Panics
/// If an intermediate key is missing or not a mapping.
pub fn remove_path(doc: &mut Value, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last().expect("non-empty path");
    let mut cur = doc;
    for key in parents {
        cur = cur.get_mut(*key).expect("path exists");
    }
    cur.as_mapping_mut()
        .expect("parent is a mapping")
        .remove(*last)
}

// ---------------------------------------------------------------------------
// Controller document
// ---------------------------------------------------------------------------

fn body_motion(kp: f64, weight: f64) -> Value {
    mapping([
        ("Kp", repeated(6, kp)),
        ("Kd", repeated(6, 2.0 * kp.sqrt())),
        ("weight", Value::from(weight)),
        (
            "accel_bounds",
            mapping([("min", repeated(6, -100.0)), ("max", repeated(6, 100.0))]),
        ),
    ])
}

fn soft_limit(index: usize) -> Value {
    mapping([
        ("enabled", Value::from(i64::from(index >= 6))),
        ("disable_when_body_in_support", Value::from(0)),
        ("lb", Value::from(-1.0)),
        ("ub", Value::from(1.0)),
        ("kp", Value::from(100.0)),
        ("kd", Value::from(20.0)),
        ("weight", Value::from(1e-3)),
        ("k_logistic", Value::from(20.0)),
    ])
}

/// A complete parameter set for `dofs` with `tracked_bodies` body-motion
/// entries.
pub fn parameter_set(dofs: &DofCounts, kp_ang: f64, tracked_bodies: usize) -> Value {
    let DofCounts { nq, nv, nu } = *dofs;
    mapping([
        ("W_kdot", diagonal_rows(3, 1.0)),
        ("Kp_ang", Value::from(kp_ang)),
        ("w_slack", Value::from(0.05)),
        ("slack_limit", Value::from(100)),
        ("w_grf", Value::from(0.0)),
        ("Kp_accel", Value::from(1.0)),
        ("contact_threshold", Value::from(0.002)),
        ("min_knee_angle", Value::from(0.7)),
        ("center_of_mass_observer_gain", diagonal_rows(4, 0.25)),
        ("use_center_of_mass_observer", Value::from(false)),
        (
            "whole_body",
            mapping([
                ("Kp", repeated(nq, 150.0)),
                ("Kd", repeated(nq, 2.0 * 150.0_f64.sqrt())),
                ("w_qdd", repeated(nv, 1e-3)),
                (
                    "integrator",
                    mapping([
                        ("gains", repeated(nq, 0.0)),
                        ("clamps", repeated(nq, 0.2)),
                        ("eta", Value::from(0.0)),
                    ]),
                ),
                (
                    "qdd_bounds",
                    mapping([("min", repeated(nv, -100.0)), ("max", repeated(nv, 100.0))]),
                ),
            ]),
        ),
        (
            "vref_integrator",
            mapping([
                ("zero_ankles_on_contact", Value::from(0)),
                ("eta", Value::from(0.001)),
                ("delta_max", Value::from(1.0)),
            ]),
        ),
        (
            "joint_soft_limits",
            Value::Sequence((0..nq).map(soft_limit).collect()),
        ),
        (
            "body_motion",
            Value::Sequence(
                (0..tracked_bodies)
                    .map(|i| body_motion(if i == 0 { 100.0 } else { 25.0 }, 1.0))
                    .collect(),
            ),
        ),
        (
            "hardware",
            mapping([
                (
                    "gains",
                    mapping([
                        ("k_f_p", repeated(nu, 0.0)),
                        ("k_q_p", repeated(nu, 40.0)),
                        ("k_q_i", repeated(nu, 0.0)),
                        ("k_qd_p", repeated(nu, 2.0)),
                        ("ff_qd", repeated(nu, 0.0)),
                        ("ff_f_d", repeated(nu, 0.0)),
                        ("ff_const", repeated(nu, 0.0)),
                        ("ff_qd_d", repeated(nu, 0.0)),
                    ]),
                ),
                ("joint_is_position_controlled", repeated(nu, 1.0)),
                ("joint_is_force_controlled", repeated(nu, 0.0)),
            ]),
        ),
    ])
}

/// `kinematic_tree_metadata` for the biped.
pub fn biped_metadata() -> Value {
    fn side(l: &[&str], r: &[&str]) -> Value {
        mapping([("l", strings(l)), ("r", strings(r))])
    }
    mapping([
        (
            "body_names",
            mapping([(
                "feet",
                mapping([("l", Value::from("l_foot")), ("r", Value::from("r_foot"))]),
            )]),
        ),
        (
            "joint_group_names",
            mapping([
                (
                    "legs",
                    side(
                        &["l_leg_hpz", "l_leg_hpx", "l_leg_hpy", "l_leg_kny", "l_leg_aky", "l_leg_akx"],
                        &["r_leg_hpz", "r_leg_hpx", "r_leg_hpy", "r_leg_kny", "r_leg_aky", "r_leg_akx"],
                    ),
                ),
                (
                    "knees",
                    mapping([("l", Value::from("l_leg_kny")), ("r", Value::from("r_leg_kny"))]),
                ),
                (
                    "ankles",
                    side(&["l_leg_aky", "l_leg_akx"], &["r_leg_aky", "r_leg_akx"]),
                ),
                (
                    "arms",
                    side(&["l_arm_shz", "l_arm_shx"], &["r_arm_shz", "r_arm_shx"]),
                ),
                ("neck", strings(&["neck_ry"])),
                ("back_bkz", Value::from("back_bkz")),
                ("back_bky", Value::from("back_bky")),
            ]),
        ),
    ])
}

/// Controller document for the biped with one parameter set per name,
/// each tracking two bodies.
pub fn biped_controller_document(set_names: &[&str]) -> Value {
    let dofs = crate::biped::BIPED_DOFS;
    let sets = set_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            #[allow(clippy::cast_precision_loss)]
            let kp_ang = 1.0 + i as f64;
            (Value::from(*name), parameter_set(&dofs, kp_ang, 2))
        })
        .collect::<Mapping>();
    mapping([
        ("qp_controller_params", Value::Mapping(sets)),
        ("kinematic_tree_metadata", biped_metadata()),
    ])
}

// ---------------------------------------------------------------------------
// Hardware document
// ---------------------------------------------------------------------------

/// Hardware joint ordering: legs first, then back, neck, and arms.
pub fn hardware_joint_names() -> Vec<&'static str> {
    let controller = actuated_joint_names();
    let legs = controller.iter().filter(|n| n.contains("_leg_"));
    let rest = controller.iter().filter(|n| !n.contains("_leg_"));
    legs.chain(rest).copied().collect()
}

pub fn hardware_document(names: &[&str]) -> Value {
    mapping([("joint_names", strings(names))])
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Model, controller, and hardware documents written to a temporary
/// directory that lives as long as this value.
pub struct DocumentFiles {
    pub dir: TempDir,
    pub model: PathBuf,
    pub config: PathBuf,
    pub hardware: PathBuf,
}

/// Write the biped URDF and the given documents to a fresh directory.
///
/// # Panics
/// On any I/O or serialization failure.
pub fn write_documents(control: &Value, hardware: &Value) -> DocumentFiles {
    let dir = tempfile::tempdir().expect("create temp dir");
    let model = dir.path().join("biped.urdf");
    let config = dir.path().join("control.yaml");
    let hardware_path = dir.path().join("hardware.yaml");
    std::fs::write(&model, biped_urdf()).expect("write model");
    std::fs::write(&config, serde_yaml::to_string(control).expect("serialize control"))
        .expect("write control document");
    std::fs::write(
        &hardware_path,
        serde_yaml::to_string(hardware).expect("serialize hardware"),
    )
    .expect("write hardware document");
    DocumentFiles {
        dir,
        model,
        config,
        hardware: hardware_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::{ConfigNode, QpControllerParams};

    #[test]
    fn generated_set_parses() {
        let dofs = crate::biped::BIPED_DOFS;
        let doc = parameter_set(&dofs, 2.0, 3);
        let params = QpControllerParams::parse(&ConfigNode::root(&doc), &dofs, None).unwrap();
        assert_eq!(params.body_motion.len(), 3);
        assert!(params.hardware.joint_is_position_controlled.iter().all(|&b| b));
    }

    #[test]
    fn hardware_order_is_a_permutation() {
        let mut hw = hardware_joint_names();
        let mut ctl = actuated_joint_names();
        assert_ne!(hw, ctl);
        hw.sort_unstable();
        ctl.sort_unstable();
        assert_eq!(hw, ctl);
    }

    #[test]
    fn remove_and_set_path() {
        let mut doc = biped_controller_document(&["standing"]);
        assert!(remove_path(&mut doc, &["kinematic_tree_metadata", "body_names"]).is_some());
        set_path(&mut doc, &["qp_controller_params"], Value::Mapping(Mapping::new()));
        assert!(doc["kinematic_tree_metadata"].get("body_names").is_none());
        assert!(doc["qp_controller_params"].as_mapping().unwrap().is_empty());
    }
}
