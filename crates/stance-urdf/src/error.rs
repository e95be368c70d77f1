//! Failures while reading a robot description or numbering its tree.

use std::path::PathBuf;

/// Why a robot description could not become a [`KinematicModel`].
///
/// [`KinematicModel`]: crate::KinematicModel
#[derive(Debug, thiserror::Error)]
pub enum UrdfError {
    #[error("cannot read robot description {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The XML was rejected by the URDF reader.
    #[error("malformed robot description: {0}")]
    Malformed(String),

    #[error("joint '{joint}' has unsupported type '{kind}'")]
    UnsupportedJoint { joint: String, kind: &'static str },

    #[error("no link named '{0}'")]
    UnknownLink(String),

    #[error("no joint named '{0}'")]
    UnknownJoint(String),

    /// A joint's parent or child is not a link of the description.
    #[error("joint '{joint}' attaches to unknown link '{link}'")]
    DanglingJoint { joint: String, link: String },

    #[error("joint name '{0}' is used more than once")]
    DuplicateJoint(String),

    #[error("link '{0}' has more than one parent joint")]
    MultipleParents(String),

    /// Every link is the child of some joint, so the tree has no root.
    #[error("robot description has no parentless link to use as root")]
    NoRootLink,

    #[error("links not connected to root '{root}': {}", .orphans.join(", "))]
    Disconnected { root: String, orphans: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_errors_name_the_offender() {
        let e = UrdfError::DanglingJoint {
            joint: "l_wrist".into(),
            link: "l_hand".into(),
        };
        assert_eq!(e.to_string(), "joint 'l_wrist' attaches to unknown link 'l_hand'");

        let e = UrdfError::MultipleParents("pelvis".into());
        assert_eq!(e.to_string(), "link 'pelvis' has more than one parent joint");

        let e = UrdfError::Disconnected {
            root: "pelvis".into(),
            orphans: vec!["antenna".into(), "tail".into()],
        };
        assert_eq!(e.to_string(), "links not connected to root 'pelvis': antenna, tail");

        let e = UrdfError::UnsupportedJoint {
            joint: "neck".into(),
            kind: "spherical",
        };
        assert_eq!(e.to_string(), "joint 'neck' has unsupported type 'spherical'");
    }

    #[test]
    fn read_error_names_the_file() {
        let e = UrdfError::Read {
            path: PathBuf::from("/opt/robots/biped.urdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            e.to_string(),
            "cannot read robot description /opt/robots/biped.urdf: denied"
        );
    }
}
