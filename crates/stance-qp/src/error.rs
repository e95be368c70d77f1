use std::path::PathBuf;

use thiserror::Error;

use stance_core::{ConfigError, ErrorKind};
use stance_urdf::UrdfError;

/// Top-level error for controller construction and use.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] UrdfError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("controller context has already been destroyed")]
    Destroyed,
}

impl ControllerError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => e.kind(),
            Self::Model(_) => ErrorKind::Model,
            Self::Solver(e) => e.kind(),
            Self::Io { .. } | Self::Toml(_) => ErrorKind::Document,
            Self::Destroyed => ErrorKind::Destroyed,
        }
    }
}

/// Failures creating, configuring, or using the solver environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("unknown solver method code: {0}")]
    InvalidMethod(i32),

    #[error("invalid value for solver parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("cannot build solver settings: {0}")]
    Settings(String),

    #[error("cannot set up QP: {0}")]
    Setup(String),

    #[error("solver environment has been released")]
    Released,
}

impl SolverError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Released => ErrorKind::Destroyed,
            _ => ErrorKind::ResourceAcquisitionFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::Dims;

    #[test]
    fn controller_error_from_config_keeps_kind() {
        let err: ControllerError = ConfigError::ShapeMismatch {
            field: "Kp".into(),
            expected: Dims::vector(3),
            got: Dims::vector(2),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.to_string().starts_with("Configuration error: Kp"));
    }

    #[test]
    fn solver_error_kinds() {
        let err: ControllerError = SolverError::InvalidMethod(9).into();
        assert_eq!(err.kind(), ErrorKind::ResourceAcquisitionFailure);
        assert_eq!(
            err.to_string(),
            "Solver error: unknown solver method code: 9"
        );
        assert_eq!(SolverError::Released.kind(), ErrorKind::Destroyed);
    }

    #[test]
    fn model_and_destroyed_kinds() {
        let err: ControllerError = UrdfError::NoRootLink.into();
        assert_eq!(err.kind(), ErrorKind::Model);
        assert_eq!(ControllerError::Destroyed.kind(), ErrorKind::Destroyed);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn error_is_send_sync() {
        assert_send_sync::<ControllerError>();
    }
}
