use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Coarse classification of every failure that can abort controller
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An array or matrix does not match its DOF-derived size.
    ShapeMismatch,
    /// A required key is absent.
    MissingField,
    /// A symbolic joint or link name has no match in the model.
    UnresolvedName,
    /// The named parameter-set section has no entries.
    EmptyRegistry,
    /// The solver environment could not be created or configured.
    ResourceAcquisitionFailure,
    /// A value has the wrong type (e.g. a string where a number is required).
    InvalidType,
    /// A value is well-typed but violates a documented constraint.
    InvalidValue,
    /// A document could not be read or parsed.
    Document,
    /// The kinematic model could not be loaded or compiled.
    Model,
    /// The operation targeted a context that was already torn down.
    Destroyed,
}

// ---------------------------------------------------------------------------
// Dims
// ---------------------------------------------------------------------------

/// Row/column shape used in [`ConfigError::ShapeMismatch`] messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    pub const SCALAR: Self = Self { rows: 1, cols: 1 };

    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Column vector of length `n`.
    pub const fn vector(n: usize) -> Self {
        Self { rows: n, cols: 1 }
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

// ---------------------------------------------------------------------------
// NameKind
// ---------------------------------------------------------------------------

/// What sort of symbolic name failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Joint,
    Link,
    HardwareJoint,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Joint => "joint",
            Self::Link => "link",
            Self::HardwareJoint => "hardware joint",
        })
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised while reading and validating controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{field} should be of size {expected}, got {got}")]
    ShapeMismatch {
        field: String,
        expected: Dims,
        got: Dims,
    },

    #[error("{field} should be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unresolved {kind} name: {name}")]
    UnresolvedName { kind: NameKind, name: String },

    #[error("could not get any parameter sets from {0}")]
    EmptyRegistry(String),
}

impl ConfigError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::Yaml(_) => ErrorKind::Document,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::InvalidType { .. } => ErrorKind::InvalidType,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::UnresolvedName { .. } => ErrorKind::UnresolvedName,
            Self::EmptyRegistry(_) => ErrorKind::EmptyRegistry,
        }
    }

    pub(crate) fn shape(field: impl Into<String>, expected: Dims, got: Dims) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected,
            got,
        }
    }

    pub(crate) fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
        }
    }
}
