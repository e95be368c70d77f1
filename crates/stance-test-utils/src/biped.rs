//! A small humanoid model with a floating pelvis, a two-joint back, a neck,
//! two-joint arms, and six-joint legs.

use stance_core::DofCounts;
use stance_urdf::{KinematicModel, parse_string};

/// DOF counts of [`biped_urdf`] once compiled.
pub const BIPED_DOFS: DofCounts = DofCounts::new(25, 25, 19);

/// `(joint, type, parent, child, effort)` in document order.
const JOINTS: &[(&str, &str, &str, &str, f64)] = &[
    ("back_bkz", "revolute", "pelvis", "ltorso", 62.0),
    ("back_bky", "revolute", "ltorso", "utorso", 245.0),
    ("neck_ry", "revolute", "utorso", "head", 5.0),
    ("hokuyo_joint", "fixed", "head", "hokuyo_link", 0.0),
    ("l_arm_shz", "revolute", "utorso", "l_clav", 87.0),
    ("l_arm_shx", "revolute", "l_clav", "l_scap", 99.0),
    ("r_arm_shz", "revolute", "utorso", "r_clav", 87.0),
    ("r_arm_shx", "revolute", "r_clav", "r_scap", 99.0),
    ("l_leg_hpz", "revolute", "pelvis", "l_uglut", 275.0),
    ("l_leg_hpx", "revolute", "l_uglut", "l_lglut", 530.0),
    ("l_leg_hpy", "revolute", "l_lglut", "l_uleg", 840.0),
    ("l_leg_kny", "revolute", "l_uleg", "l_lleg", 890.0),
    ("l_leg_aky", "revolute", "l_lleg", "l_talus", 740.0),
    ("l_leg_akx", "revolute", "l_talus", "l_foot", 360.0),
    ("r_leg_hpz", "revolute", "pelvis", "r_uglut", 275.0),
    ("r_leg_hpx", "revolute", "r_uglut", "r_lglut", 530.0),
    ("r_leg_hpy", "revolute", "r_lglut", "r_uleg", 840.0),
    ("r_leg_kny", "revolute", "r_uleg", "r_lleg", 890.0),
    ("r_leg_aky", "revolute", "r_lleg", "r_talus", 740.0),
    ("r_leg_akx", "revolute", "r_talus", "r_foot", 360.0),
];

/// Expected link ids of the feet after compilation.
pub const LEFT_FOOT_ID: usize = 14;
pub const RIGHT_FOOT_ID: usize = 20;

fn foot(name: &str) -> String {
    format!(
        r#"  <link name="{name}">
    <collision name="heel"><origin xyz="-0.08 0 -0.08"/><geometry><sphere radius="0.01"/></geometry></collision>
    <collision name="toe"><origin xyz="0.17 0 -0.08"/><geometry><sphere radius="0.01"/></geometry></collision>
    <collision name="sole"><geometry><box size="0.26 0.12 0.02"/></geometry></collision>
  </link>
"#
    )
}

/// URDF text of the biped.
pub fn biped_urdf() -> String {
    let mut xml = String::from("<robot name=\"biped\">\n");
    xml.push_str(
        "  <link name=\"pelvis\">\n    <collision><geometry><box size=\"0.3 0.3 0.2\"/></geometry></collision>\n  </link>\n",
    );
    for &(_, _, _, child, _) in JOINTS {
        if child.ends_with("_foot") {
            xml.push_str(&foot(child));
        } else {
            xml.push_str(&format!("  <link name=\"{child}\"/>\n"));
        }
    }
    for &(name, kind, parent, child, effort) in JOINTS {
        xml.push_str(&format!(
            "  <joint name=\"{name}\" type=\"{kind}\">\n    <parent link=\"{parent}\"/>\n    <child link=\"{child}\"/>\n"
        ));
        if kind != "fixed" {
            xml.push_str(&format!(
                "    <axis xyz=\"0 1 0\"/>\n    <limit lower=\"-1.0\" upper=\"1.0\" effort=\"{effort}\" velocity=\"10\"/>\n"
            ));
        }
        xml.push_str("  </joint>\n");
    }
    xml.push_str("</robot>\n");
    xml
}

/// Actuated joint names in controller (model) order.
pub fn actuated_joint_names() -> Vec<&'static str> {
    JOINTS
        .iter()
        .filter(|(_, kind, ..)| *kind != "fixed")
        .map(|(name, ..)| *name)
        .collect()
}

/// Effort limit of each actuated joint, in controller order.
pub fn actuated_efforts() -> Vec<f64> {
    JOINTS
        .iter()
        .filter(|(_, kind, ..)| *kind != "fixed")
        .map(|&(.., effort)| effort)
        .collect()
}

/// Parsed and compiled biped with every collision group intact.
///
/// # Panics
/// If the built-in URDF fails to parse or compile.
pub fn biped_model() -> KinematicModel {
    parse_string(&biped_urdf())
        .and_then(stance_urdf::RobotModel::compile)
        .expect("built-in biped URDF compiles")
}
