//! Controller parameter structures and their parsers.
//!
//! Every `parse` constructor is all-or-nothing: it either returns a fully
//! populated value whose arrays match the robot's [`DofCounts`], or fails
//! with an error naming the first offending field. Parsers build fresh
//! values, so no field can carry over from a previously parsed entry.

use nalgebra::{DVector, Matrix3, Matrix4, Vector6};

use crate::error::ConfigError;
use crate::reader::ConfigNode;
use crate::types::DofCounts;

/// Control-mode inputs above this value mark a joint as controlled.
pub const CONTROL_MODE_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// IntegratorParams
// ---------------------------------------------------------------------------

/// Bounds on integral-action drift in joint space.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorParams {
    /// Integral gain per position (length `nq`).
    pub gains: DVector<f64>,
    /// Accumulator clamp per position (length `nq`).
    pub clamps: DVector<f64>,
    /// Leak rate.
    pub eta: f64,
}

impl IntegratorParams {
    pub fn zeros(dofs: &DofCounts) -> Self {
        Self {
            gains: DVector::zeros(dofs.nq),
            clamps: DVector::zeros(dofs.nq),
            eta: 0.0,
        }
    }

    pub fn parse(node: &ConfigNode<'_>, dofs: &DofCounts) -> Result<Self, ConfigError> {
        Ok(Self {
            gains: node.vector("gains", dofs.nq)?,
            clamps: node.vector("clamps", dofs.nq)?,
            eta: node.scalar("eta")?,
        })
    }
}

// ---------------------------------------------------------------------------
// JointSoftLimitParams
// ---------------------------------------------------------------------------

/// Per-joint soft position limits, one entry per position coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSoftLimitParams {
    pub enabled: Vec<bool>,
    /// Contact-body flag that suspends the limit while that body supports.
    pub disable_when_body_in_support: Vec<i32>,
    pub lb: DVector<f64>,
    pub ub: DVector<f64>,
    pub kp: DVector<f64>,
    pub kd: DVector<f64>,
    pub weight: DVector<f64>,
    pub k_logistic: DVector<f64>,
}

impl JointSoftLimitParams {
    pub fn zeros(dofs: &DofCounts) -> Self {
        let n = dofs.nq;
        Self {
            enabled: vec![false; n],
            disable_when_body_in_support: vec![0; n],
            lb: DVector::zeros(n),
            ub: DVector::zeros(n),
            kp: DVector::zeros(n),
            kd: DVector::zeros(n),
            weight: DVector::zeros(n),
            k_logistic: DVector::zeros(n),
        }
    }

    /// Parse a sequence of exactly `nq` per-joint entries.
    pub fn parse(node: &ConfigNode<'_>, dofs: &DofCounts) -> Result<Self, ConfigError> {
        let entries = node.elements(dofs.nq)?;
        let mut out = Self::zeros(dofs);
        for (i, entry) in entries.iter().enumerate() {
            out.enabled[i] = entry.flag("enabled")?;
            let body = entry.integer("disable_when_body_in_support")?;
            out.disable_when_body_in_support[i] =
                i32::try_from(body).map_err(|_| ConfigError::InvalidValue {
                    field: format!("{}.disable_when_body_in_support", entry.path()),
                    message: format!("{body} does not fit a body index"),
                })?;
            out.lb[i] = entry.scalar("lb")?;
            out.ub[i] = entry.scalar("ub")?;
            out.kp[i] = entry.scalar("kp")?;
            out.kd[i] = entry.scalar("kd")?;
            out.weight[i] = entry.scalar("weight")?;
            out.k_logistic[i] = entry.scalar("k_logistic")?;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// WholeBodyParams
// ---------------------------------------------------------------------------

/// Joint acceleration limits.
#[derive(Debug, Clone, PartialEq)]
pub struct QddBounds {
    /// Length `nv`.
    pub min: DVector<f64>,
    /// Length `nv`.
    pub max: DVector<f64>,
}

/// Joint-space posture tracking gains.
#[derive(Debug, Clone, PartialEq)]
pub struct WholeBodyParams {
    /// Proportional gain (`Kp`, length `nq`).
    pub kp: DVector<f64>,
    /// Derivative gain (`Kd`, length `nq`).
    pub kd: DVector<f64>,
    /// Per-DOF acceleration cost weight (length `nv`).
    pub w_qdd: DVector<f64>,
    pub integrator: IntegratorParams,
    pub qdd_bounds: QddBounds,
}

impl WholeBodyParams {
    pub fn zeros(dofs: &DofCounts) -> Self {
        Self {
            kp: DVector::zeros(dofs.nq),
            kd: DVector::zeros(dofs.nq),
            w_qdd: DVector::zeros(dofs.nv),
            integrator: IntegratorParams::zeros(dofs),
            qdd_bounds: QddBounds {
                min: DVector::zeros(dofs.nv),
                max: DVector::zeros(dofs.nv),
            },
        }
    }

    pub fn parse(node: &ConfigNode<'_>, dofs: &DofCounts) -> Result<Self, ConfigError> {
        let bounds = node.field("qdd_bounds")?;
        Ok(Self {
            kp: node.vector("Kp", dofs.nq)?,
            kd: node.vector("Kd", dofs.nq)?,
            w_qdd: node.vector("w_qdd", dofs.nv)?,
            integrator: IntegratorParams::parse(&node.field("integrator")?, dofs)?,
            qdd_bounds: QddBounds {
                min: bounds.vector("min", dofs.nv)?,
                max: bounds.vector("max", dofs.nv)?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// BodyMotionParams
// ---------------------------------------------------------------------------

/// Spatial acceleration limits for a tracked body.
#[derive(Debug, Clone, PartialEq)]
pub struct AccelBounds {
    pub min: Vector6<f64>,
    pub max: Vector6<f64>,
}

/// Motion-tracking gains for one tracked body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMotionParams {
    /// Spatial proportional gain (`Kp`).
    pub kp: Vector6<f64>,
    /// Spatial derivative gain (`Kd`).
    pub kd: Vector6<f64>,
    pub weight: f64,
    pub accel_bounds: AccelBounds,
}

impl BodyMotionParams {
    pub fn parse(node: &ConfigNode<'_>) -> Result<Self, ConfigError> {
        let bounds = node.field("accel_bounds")?;
        Ok(Self {
            kp: node.fixed_vector::<6>("Kp")?,
            kd: node.fixed_vector::<6>("Kd")?,
            weight: node.scalar("weight")?,
            accel_bounds: AccelBounds {
                min: bounds.fixed_vector::<6>("min")?,
                max: bounds.fixed_vector::<6>("max")?,
            },
        })
    }

    /// Parse one entry per tracked body. The sequence must have exactly
    /// `num_tracked_bodies` entries so indices stay aligned with the
    /// tracked-body list.
    pub fn parse_all(
        node: &ConfigNode<'_>,
        num_tracked_bodies: usize,
    ) -> Result<Vec<Self>, ConfigError> {
        node.elements(num_tracked_bodies)?
            .iter()
            .map(Self::parse)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// VRefIntegratorParams
// ---------------------------------------------------------------------------

/// Velocity-reference integrator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct VRefIntegratorParams {
    /// Reset the ankle integrator entries while in contact.
    ///
    /// Encoded in documents as a number (0 or 1), never as a YAML boolean.
    pub zero_ankles_on_contact: bool,
    pub eta: f64,
    pub delta_max: f64,
}

impl VRefIntegratorParams {
    pub fn parse(node: &ConfigNode<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            zero_ankles_on_contact: node.numeric_flag("zero_ankles_on_contact")?,
            eta: node.scalar("eta")?,
            delta_max: node.scalar("delta_max")?,
        })
    }
}

// ---------------------------------------------------------------------------
// HardwareGains / HardwareParams
// ---------------------------------------------------------------------------

/// Per-actuator gain tables for the joint-level hardware controller.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareGains {
    pub k_f_p: DVector<f64>,
    pub k_q_p: DVector<f64>,
    pub k_q_i: DVector<f64>,
    pub k_qd_p: DVector<f64>,
    pub ff_qd: DVector<f64>,
    pub ff_f_d: DVector<f64>,
    pub ff_const: DVector<f64>,
    pub ff_qd_d: DVector<f64>,
}

impl HardwareGains {
    pub fn zeros(dofs: &DofCounts) -> Self {
        let z = DVector::zeros(dofs.nu);
        Self {
            k_f_p: z.clone(),
            k_q_p: z.clone(),
            k_q_i: z.clone(),
            k_qd_p: z.clone(),
            ff_qd: z.clone(),
            ff_f_d: z.clone(),
            ff_const: z.clone(),
            ff_qd_d: z,
        }
    }

    pub fn parse(node: &ConfigNode<'_>, dofs: &DofCounts) -> Result<Self, ConfigError> {
        let nu = dofs.nu;
        Ok(Self {
            k_f_p: node.vector("k_f_p", nu)?,
            k_q_p: node.vector("k_q_p", nu)?,
            k_q_i: node.vector("k_q_i", nu)?,
            k_qd_p: node.vector("k_qd_p", nu)?,
            ff_qd: node.vector("ff_qd", nu)?,
            ff_f_d: node.vector("ff_f_d", nu)?,
            ff_const: node.vector("ff_const", nu)?,
            ff_qd_d: node.vector("ff_qd_d", nu)?,
        })
    }
}

/// Hardware gains plus per-actuator control mode.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareParams {
    pub gains: HardwareGains,
    pub joint_is_position_controlled: Vec<bool>,
    pub joint_is_force_controlled: Vec<bool>,
}

impl HardwareParams {
    pub fn zeros(dofs: &DofCounts) -> Self {
        Self {
            gains: HardwareGains::zeros(dofs),
            joint_is_position_controlled: vec![false; dofs.nu],
            joint_is_force_controlled: vec![false; dofs.nu],
        }
    }

    /// Mode flags are numeric and thresholded strictly above
    /// [`CONTROL_MODE_THRESHOLD`]. A joint may be neither position- nor
    /// force-controlled, but never both.
    pub fn parse(node: &ConfigNode<'_>, dofs: &DofCounts) -> Result<Self, ConfigError> {
        let gains = HardwareGains::parse(&node.field("gains")?, dofs)?;
        let position = node.vector("joint_is_position_controlled", dofs.nu)?;
        let force = node.vector("joint_is_force_controlled", dofs.nu)?;

        let joint_is_position_controlled: Vec<bool> =
            position.iter().map(|&x| x > CONTROL_MODE_THRESHOLD).collect();
        let joint_is_force_controlled: Vec<bool> =
            force.iter().map(|&x| x > CONTROL_MODE_THRESHOLD).collect();

        if let Some(i) = joint_is_position_controlled
            .iter()
            .zip(&joint_is_force_controlled)
            .position(|(&p, &f)| p && f)
        {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.joint_is_force_controlled[{i}]", node.path()),
                message: "actuator is also marked position-controlled".into(),
            });
        }

        Ok(Self {
            gains,
            joint_is_position_controlled,
            joint_is_force_controlled,
        })
    }
}

// ---------------------------------------------------------------------------
// QpControllerParams
// ---------------------------------------------------------------------------

/// One complete, named bundle of controller gains and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct QpControllerParams {
    /// Angular-momentum rate cost (`W_kdot`).
    pub w_kdot: Matrix3<f64>,
    /// Angular-momentum proportional gain (`Kp_ang`).
    pub kp_ang: f64,
    pub w_slack: f64,
    pub slack_limit: f64,
    /// Ground-reaction-force regularization weight.
    pub w_grf: f64,
    /// Acceleration feedback gain (`Kp_accel`).
    pub kp_accel: f64,
    pub contact_threshold: f64,
    pub min_knee_angle: f64,
    pub center_of_mass_observer_gain: Matrix4<f64>,
    pub use_center_of_mass_observer: bool,
    pub whole_body: WholeBodyParams,
    pub vref_integrator: VRefIntegratorParams,
    pub joint_soft_limits: JointSoftLimitParams,
    /// Index-aligned with the externally defined tracked-body list.
    pub body_motion: Vec<BodyMotionParams>,
    pub hardware: HardwareParams,
}

impl QpControllerParams {
    /// Zero-valued parameter set with every DOF-dependent array sized.
    pub fn new(dofs: &DofCounts) -> Self {
        Self {
            w_kdot: Matrix3::zeros(),
            kp_ang: 0.0,
            w_slack: 0.0,
            slack_limit: 0.0,
            w_grf: 0.0,
            kp_accel: 0.0,
            contact_threshold: 0.0,
            min_knee_angle: 0.0,
            center_of_mass_observer_gain: Matrix4::zeros(),
            use_center_of_mass_observer: false,
            whole_body: WholeBodyParams::zeros(dofs),
            vref_integrator: VRefIntegratorParams {
                zero_ankles_on_contact: false,
                eta: 0.0,
                delta_max: 0.0,
            },
            joint_soft_limits: JointSoftLimitParams::zeros(dofs),
            body_motion: Vec::new(),
            hardware: HardwareParams::zeros(dofs),
        }
    }

    /// Parse a complete parameter set.
    ///
    /// When `num_tracked_bodies` is `None` the length of `body_motion` is
    /// taken from the document.
    pub fn parse(
        node: &ConfigNode<'_>,
        dofs: &DofCounts,
        num_tracked_bodies: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let body_motion_node = node.field("body_motion")?;
        let num_tracked_bodies = match num_tracked_bodies {
            Some(n) => n,
            None => body_motion_node.sequence()?.len(),
        };

        Ok(Self {
            w_kdot: node.matrix::<3, 3>("W_kdot")?,
            kp_ang: node.scalar("Kp_ang")?,
            w_slack: node.scalar("w_slack")?,
            slack_limit: node.scalar("slack_limit")?,
            w_grf: node.scalar("w_grf")?,
            kp_accel: node.scalar("Kp_accel")?,
            contact_threshold: node.scalar("contact_threshold")?,
            min_knee_angle: node.scalar("min_knee_angle")?,
            center_of_mass_observer_gain: node.matrix::<4, 4>("center_of_mass_observer_gain")?,
            use_center_of_mass_observer: node.boolean("use_center_of_mass_observer")?,
            whole_body: WholeBodyParams::parse(&node.field("whole_body")?, dofs)?,
            vref_integrator: VRefIntegratorParams::parse(&node.field("vref_integrator")?)?,
            joint_soft_limits: JointSoftLimitParams::parse(
                &node.field("joint_soft_limits")?,
                dofs,
            )?,
            body_motion: BodyMotionParams::parse_all(&body_motion_node, num_tracked_bodies)?,
            hardware: HardwareParams::parse(&node.field("hardware")?, dofs)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_yaml::{Mapping, Value};

    pub(crate) const DOFS: DofCounts = DofCounts::new(8, 8, 2);

    fn map(entries: Vec<(&str, Value)>) -> Value {
        let mut m = Mapping::new();
        for (k, v) in entries {
            m.insert(Value::from(k), v);
        }
        Value::Mapping(m)
    }

    fn filled(n: usize, x: f64) -> Value {
        Value::Sequence(vec![Value::from(x); n])
    }

    fn rows(r: usize, c: usize, diag: f64) -> Value {
        Value::Sequence(
            (0..r)
                .map(|i| {
                    Value::Sequence(
                        (0..c)
                            .map(|j| Value::from(if i == j { diag } else { 0.0 }))
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    fn body_motion(weight: f64) -> Value {
        map(vec![
            ("Kp", filled(6, 100.0)),
            ("Kd", filled(6, 20.0)),
            ("weight", Value::from(weight)),
            (
                "accel_bounds",
                map(vec![("min", filled(6, -100.0)), ("max", filled(6, 100.0))]),
            ),
        ])
    }

    fn soft_limit(i: usize) -> Value {
        map(vec![
            ("enabled", Value::from(i64::from(i % 2 == 0))),
            ("disable_when_body_in_support", Value::from(0)),
            ("lb", Value::from(-1.0)),
            ("ub", Value::from(1.0)),
            ("kp", Value::from(50.0)),
            ("kd", Value::from(5.0)),
            ("weight", Value::from(1e-4)),
            ("k_logistic", Value::from(20.0)),
        ])
    }

    /// A complete, valid parameter set for [`DOFS`].
    pub(crate) fn param_set(dofs: &DofCounts, kp_ang: f64) -> Value {
        let (nq, nv, nu) = (dofs.nq, dofs.nv, dofs.nu);
        map(vec![
            ("W_kdot", rows(3, 3, 1.0)),
            ("Kp_ang", Value::from(kp_ang)),
            ("w_slack", Value::from(0.05)),
            ("slack_limit", Value::from(30)),
            ("w_grf", Value::from(0.0)),
            ("Kp_accel", Value::from(1.0)),
            ("contact_threshold", Value::from(0.002)),
            ("min_knee_angle", Value::from(0.7)),
            ("center_of_mass_observer_gain", rows(4, 4, 0.5)),
            ("use_center_of_mass_observer", Value::from(false)),
            (
                "whole_body",
                map(vec![
                    ("Kp", filled(nq, 150.0)),
                    ("Kd", filled(nq, 24.5)),
                    ("w_qdd", filled(nv, 1e-3)),
                    (
                        "integrator",
                        map(vec![
                            ("gains", filled(nq, 0.0)),
                            ("clamps", filled(nq, 0.2)),
                            ("eta", Value::from(0.0)),
                        ]),
                    ),
                    (
                        "qdd_bounds",
                        map(vec![("min", filled(nv, -100.0)), ("max", filled(nv, 100.0))]),
                    ),
                ]),
            ),
            (
                "vref_integrator",
                map(vec![
                    ("zero_ankles_on_contact", Value::from(1)),
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
                Value::Sequence(vec![body_motion(1.0), body_motion(0.01)]),
            ),
            (
                "hardware",
                map(vec![
                    (
                        "gains",
                        map(vec![
                            ("k_f_p", filled(nu, 0.1)),
                            ("k_q_p", filled(nu, 10.0)),
                            ("k_q_i", filled(nu, 0.0)),
                            ("k_qd_p", filled(nu, 1.0)),
                            ("ff_qd", filled(nu, 0.0)),
                            ("ff_f_d", filled(nu, 0.0)),
                            ("ff_const", filled(nu, 0.0)),
                            ("ff_qd_d", filled(nu, 0.0)),
                        ]),
                    ),
                    ("joint_is_position_controlled", filled(nu, 0.0)),
                    ("joint_is_force_controlled", filled(nu, 1.0)),
                ]),
            ),
        ])
    }

    fn set_path(doc: &mut Value, path: &[&str], value: Value) {
        let (last, parents) = path.split_last().unwrap();
        let mut cur = doc;
        for key in parents {
            cur = cur.get_mut(*key).unwrap();
        }
        cur.as_mapping_mut().unwrap().insert(Value::from(*last), value);
    }

    fn parse(doc: &Value) -> Result<QpControllerParams, ConfigError> {
        QpControllerParams::parse(&ConfigNode::at(doc, "standing"), &DOFS, None)
    }

    #[test]
    fn parses_complete_set() {
        let doc = param_set(&DOFS, 1.5);
        let p = parse(&doc).unwrap();
        assert_eq!(p.whole_body.kp.len(), DOFS.nq);
        assert_eq!(p.whole_body.w_qdd.len(), DOFS.nv);
        assert_eq!(p.hardware.gains.k_q_p.len(), DOFS.nu);
        assert_eq!(p.joint_soft_limits.lb.len(), DOFS.nq);
        assert_eq!(p.body_motion.len(), 2);
        assert!(p.vref_integrator.zero_ankles_on_contact);
        assert!(!p.use_center_of_mass_observer);
        assert!(p.joint_soft_limits.enabled[0]);
        assert!(!p.joint_soft_limits.enabled[1]);
        approx::assert_relative_eq!(p.center_of_mass_observer_gain[(3, 3)], 0.5);
        approx::assert_relative_eq!(p.slack_limit, 30.0);
    }

    #[test]
    fn scalar_fields_round_trip_exactly() {
        let doc = param_set(&DOFS, 0.123_456_789);
        let p = parse(&doc).unwrap();
        assert_eq!(p.kp_ang.to_bits(), 0.123_456_789_f64.to_bits());
        assert_eq!(p.min_knee_angle.to_bits(), 0.7_f64.to_bits());
    }

    #[test]
    fn every_dof_sized_field_rejects_off_by_one() {
        let cases: &[(&[&str], usize)] = &[
            (&["whole_body", "Kp"], DOFS.nq),
            (&["whole_body", "Kd"], DOFS.nq),
            (&["whole_body", "w_qdd"], DOFS.nv),
            (&["whole_body", "integrator", "gains"], DOFS.nq),
            (&["whole_body", "integrator", "clamps"], DOFS.nq),
            (&["whole_body", "qdd_bounds", "min"], DOFS.nv),
            (&["whole_body", "qdd_bounds", "max"], DOFS.nv),
            (&["hardware", "gains", "k_f_p"], DOFS.nu),
            (&["hardware", "gains", "k_q_p"], DOFS.nu),
            (&["hardware", "gains", "k_q_i"], DOFS.nu),
            (&["hardware", "gains", "k_qd_p"], DOFS.nu),
            (&["hardware", "gains", "ff_qd"], DOFS.nu),
            (&["hardware", "gains", "ff_f_d"], DOFS.nu),
            (&["hardware", "gains", "ff_const"], DOFS.nu),
            (&["hardware", "gains", "ff_qd_d"], DOFS.nu),
            (&["hardware", "joint_is_position_controlled"], DOFS.nu),
            (&["hardware", "joint_is_force_controlled"], DOFS.nu),
        ];
        for (path, n) in cases {
            for len in [n - 1, n + 1] {
                let mut doc = param_set(&DOFS, 1.0);
                set_path(&mut doc, path, filled(len, 0.0));
                let err = parse(&doc).unwrap_err();
                let expected_field = format!("standing.{}", path.join("."));
                assert!(
                    matches!(&err, ConfigError::ShapeMismatch { field, .. } if *field == expected_field),
                    "{path:?} with {len} entries gave {err}"
                );
            }
        }
    }

    #[test]
    fn body_motion_vectors_reject_off_by_one() {
        let paths: &[&[&str]] = &[
            &["Kp"],
            &["Kd"],
            &["accel_bounds", "min"],
            &["accel_bounds", "max"],
        ];
        for path in paths {
            for len in [5, 7] {
                let mut entry = body_motion(1.0);
                set_path(&mut entry, path, filled(len, 0.0));
                let mut doc = param_set(&DOFS, 1.0);
                set_path(
                    &mut doc,
                    &["body_motion"],
                    Value::Sequence(vec![entry, body_motion(0.01)]),
                );
                let err = parse(&doc).unwrap_err();
                let expected_field = format!("standing.body_motion[0].{}", path.join("."));
                assert!(
                    matches!(&err, ConfigError::ShapeMismatch { field, .. } if *field == expected_field),
                    "{path:?} with {len} entries gave {err}"
                );
            }
        }
    }

    #[test]
    fn soft_limits_need_one_entry_per_position() {
        for len in [DOFS.nq - 1, DOFS.nq + 1] {
            let mut doc = param_set(&DOFS, 1.0);
            set_path(
                &mut doc,
                &["joint_soft_limits"],
                Value::Sequence((0..len).map(soft_limit).collect()),
            );
            let err = parse(&doc).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ShapeMismatch, "{len} entries gave {err}");
            assert!(err.to_string().starts_with("standing.joint_soft_limits"));
        }
    }

    #[test]
    fn soft_limit_enabled_accepts_native_bool() {
        let mut doc = param_set(&DOFS, 1.0);
        let mut entries: Vec<Value> = (0..DOFS.nq).map(soft_limit).collect();
        set_path(&mut entries[0], &["enabled"], Value::from(false));
        set_path(&mut entries[1], &["enabled"], Value::from(true));
        set_path(&mut doc, &["joint_soft_limits"], Value::Sequence(entries));
        let p = parse(&doc).unwrap();
        assert!(!p.joint_soft_limits.enabled[0]);
        assert!(p.joint_soft_limits.enabled[1]);
        assert!(p.joint_soft_limits.enabled[2]);

        let mut entries: Vec<Value> = (0..DOFS.nq).map(soft_limit).collect();
        set_path(&mut entries[3], &["enabled"], Value::from("yes"));
        set_path(&mut doc, &["joint_soft_limits"], Value::Sequence(entries));
        let err = parse(&doc).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::InvalidType { field, .. } if field == "standing.joint_soft_limits[3].enabled"
        ));
    }

    #[test]
    fn body_motion_count_is_enforced_when_supplied() {
        let doc = param_set(&DOFS, 1.0);
        let node = ConfigNode::at(&doc, "standing");
        assert!(QpControllerParams::parse(&node, &DOFS, Some(2)).is_ok());
        let err = QpControllerParams::parse(&node, &DOFS, Some(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn body_motion_vectors_must_be_six_long() {
        let mut doc = param_set(&DOFS, 1.0);
        let mut bad = body_motion(1.0);
        bad.as_mapping_mut()
            .unwrap()
            .insert(Value::from("Kd"), filled(5, 1.0));
        set_path(&mut doc, &["body_motion"], Value::Sequence(vec![bad]));
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.to_string(), "standing.body_motion[0].Kd should be of size 6x1, got 5x1");
    }

    #[test]
    fn missing_nested_field_is_named() {
        let mut doc = param_set(&DOFS, 1.0);
        doc.get_mut("vref_integrator")
            .unwrap()
            .as_mapping_mut()
            .unwrap()
            .remove("delta_max");
        let err = parse(&doc).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField(f) if f == "standing.vref_integrator.delta_max"
        ));
    }

    #[test]
    fn zero_ankles_on_contact_must_be_numeric() {
        let mut doc = param_set(&DOFS, 1.0);
        set_path(
            &mut doc,
            &["vref_integrator", "zero_ankles_on_contact"],
            Value::from(true),
        );
        assert_eq!(parse(&doc).unwrap_err().kind(), ErrorKind::InvalidType);

        set_path(
            &mut doc,
            &["vref_integrator", "zero_ankles_on_contact"],
            Value::from(0.0),
        );
        assert!(!parse(&doc).unwrap().vref_integrator.zero_ankles_on_contact);
    }

    #[test]
    fn hardware_mode_threshold_is_strict() {
        let mut doc = param_set(&DOFS, 1.0);
        set_path(
            &mut doc,
            &["hardware", "joint_is_position_controlled"],
            Value::Sequence(vec![Value::from(0.5), Value::from(0.500_000_1)]),
        );
        set_path(
            &mut doc,
            &["hardware", "joint_is_force_controlled"],
            Value::Sequence(vec![Value::from(0.5), Value::from(0)]),
        );
        let hw = parse(&doc).unwrap().hardware;
        assert_eq!(hw.joint_is_position_controlled, vec![false, true]);
        assert_eq!(hw.joint_is_force_controlled, vec![false, false]);
    }

    #[test]
    fn hardware_joint_cannot_be_both_modes() {
        let mut doc = param_set(&DOFS, 1.0);
        set_path(
            &mut doc,
            &["hardware", "joint_is_position_controlled"],
            filled(DOFS.nu, 1.0),
        );
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(err.to_string().contains("joint_is_force_controlled[0]"));
    }

    #[test]
    fn new_sizes_arrays_from_dofs() {
        let p = QpControllerParams::new(&DOFS);
        assert_eq!(p.whole_body.integrator.gains.len(), DOFS.nq);
        assert_eq!(p.whole_body.qdd_bounds.max.len(), DOFS.nv);
        assert_eq!(p.joint_soft_limits.enabled.len(), DOFS.nq);
        assert_eq!(p.hardware.joint_is_force_controlled.len(), DOFS.nu);
        assert!(p.body_motion.is_empty());
    }
}
