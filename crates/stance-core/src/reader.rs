//! Typed, shape-checked access to an untyped YAML document.
//!
//! A [`ConfigNode`] is a borrowed position inside a [`serde_yaml::Value`]
//! tree together with its dotted path, so every failure can name the
//! offending field. Nothing here defaults: a missing key is an error, and
//! every fixed-shape read checks its size before any value is copied.

use std::path::Path;

use nalgebra::{DVector, SMatrix, SVector};
use serde_yaml::Value;

use crate::error::{ConfigError, Dims};

/// Read and parse a YAML document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

// ---------------------------------------------------------------------------
// ConfigNode
// ---------------------------------------------------------------------------

/// A located value inside a configuration document.
#[derive(Debug, Clone)]
pub struct ConfigNode<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> ConfigNode<'a> {
    /// Wrap a document root.
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            path: String::new(),
        }
    }

    /// Wrap a value that is reported under `path` in error messages.
    pub fn at(value: &'a Value, path: impl Into<String>) -> Self {
        Self {
            value,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn value(&self) -> &'a Value {
        self.value
    }

    fn child_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    // -- Navigation --

    /// Required sub-field. A key bound to `null` counts as missing.
    pub fn field(&self, name: &str) -> Result<Self, ConfigError> {
        let path = self.child_path(name);
        match self.value.get(name) {
            None | Some(Value::Null) => Err(ConfigError::MissingField(path)),
            Some(value) => Ok(Self { value, path }),
        }
    }

    /// Element `index` of an array-of-structs source.
    pub fn element(&self, index: usize) -> Result<Self, ConfigError> {
        let items = self.sequence()?;
        let len = items.len();
        items.into_iter().nth(index).ok_or_else(|| {
            ConfigError::shape(self.path.clone(), Dims::vector(index + 1), Dims::vector(len))
        })
    }

    /// All elements of a sequence.
    pub fn sequence(&self) -> Result<Vec<Self>, ConfigError> {
        let items = self
            .value
            .as_sequence()
            .ok_or_else(|| ConfigError::invalid_type(self.path.clone(), "a sequence"))?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, value)| Self {
                value,
                path: format!("{}[{i}]", self.path),
            })
            .collect())
    }

    /// All elements of a sequence that must have exactly `expected` entries.
    pub fn elements(&self, expected: usize) -> Result<Vec<Self>, ConfigError> {
        let items = self.sequence()?;
        if items.len() != expected {
            return Err(ConfigError::shape(
                self.path.clone(),
                Dims::vector(expected),
                Dims::vector(items.len()),
            ));
        }
        Ok(items)
    }

    /// Named entries of a mapping, in document order.
    pub fn entries(&self) -> Result<Vec<(String, Self)>, ConfigError> {
        let mapping = self
            .value
            .as_mapping()
            .ok_or_else(|| ConfigError::invalid_type(self.path.clone(), "a mapping"))?;
        mapping
            .iter()
            .map(|(key, value)| {
                let name = key
                    .as_str()
                    .ok_or_else(|| ConfigError::invalid_type(self.path.clone(), "keyed by strings"))?;
                Ok((
                    name.to_owned(),
                    Self {
                        value,
                        path: self.child_path(name),
                    },
                ))
            })
            .collect()
    }

    // -- Leaf conversions --

    /// This node as a scalar number. Integers are widened.
    pub fn as_f64(&self) -> Result<f64, ConfigError> {
        match self.value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ConfigError::invalid_type(self.path.clone(), "a finite number")),
            Value::Sequence(items) => Err(ConfigError::shape(
                self.path.clone(),
                Dims::SCALAR,
                Dims::vector(items.len()),
            )),
            _ => Err(ConfigError::invalid_type(self.path.clone(), "a number")),
        }
    }

    /// This node as an integer. Floats are accepted only when integral.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn as_i64(&self) -> Result<i64, ConfigError> {
        if let Value::Number(n) = self.value {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
        }
        let x = self.as_f64()?;
        if x.fract() == 0.0 && x.abs() < 9.0e15 {
            Ok(x as i64)
        } else {
            Err(ConfigError::invalid_type(self.path.clone(), "an integer"))
        }
    }

    pub fn as_string(&self) -> Result<String, ConfigError> {
        self.value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ConfigError::invalid_type(self.path.clone(), "a string"))
    }

    fn as_numbers(&self) -> Result<Vec<f64>, ConfigError> {
        match self.value {
            Value::Sequence(_) => self.sequence()?.iter().map(Self::as_f64).collect(),
            Value::Number(_) => Ok(vec![self.as_f64()?]),
            _ => Err(ConfigError::invalid_type(
                self.path.clone(),
                "a sequence of numbers",
            )),
        }
    }

    fn as_vector(&self, expected: usize) -> Result<DVector<f64>, ConfigError> {
        let values = self.as_numbers()?;
        if values.len() != expected {
            return Err(ConfigError::shape(
                self.path.clone(),
                Dims::vector(expected),
                Dims::vector(values.len()),
            ));
        }
        Ok(DVector::from_vec(values))
    }

    // -- Field readers --

    pub fn scalar(&self, name: &str) -> Result<f64, ConfigError> {
        self.field(name)?.as_f64()
    }

    pub fn integer(&self, name: &str) -> Result<i64, ConfigError> {
        self.field(name)?.as_i64()
    }

    /// Boolean encoded as a number: any non-zero value is true.
    ///
    /// A native YAML `true`/`false` is rejected so documents keep a single
    /// encoding for these fields.
    pub fn numeric_flag(&self, name: &str) -> Result<bool, ConfigError> {
        Ok(self.scalar(name)? != 0.0)
    }

    /// Boolean given either natively or as a number (non-zero is true).
    pub fn flag(&self, name: &str) -> Result<bool, ConfigError> {
        let node = self.field(name)?;
        match node.value {
            Value::Bool(b) => Ok(*b),
            Value::Number(_) => Ok(node.as_f64()? != 0.0),
            _ => Err(ConfigError::invalid_type(node.path, "a boolean or a number")),
        }
    }

    /// Native YAML boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, ConfigError> {
        let node = self.field(name)?;
        node.value
            .as_bool()
            .ok_or_else(|| ConfigError::invalid_type(node.path, "a boolean"))
    }

    pub fn string(&self, name: &str) -> Result<String, ConfigError> {
        self.field(name)?.as_string()
    }

    pub fn string_list(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        self.field(name)?
            .sequence()?
            .iter()
            .map(Self::as_string)
            .collect()
    }

    /// Variable-size vector that must have exactly `expected` entries.
    pub fn vector(&self, name: &str, expected: usize) -> Result<DVector<f64>, ConfigError> {
        self.field(name)?.as_vector(expected)
    }

    pub fn fixed_vector<const N: usize>(&self, name: &str) -> Result<SVector<f64, N>, ConfigError> {
        let v = self.vector(name, N)?;
        Ok(SVector::from_iterator(v.iter().copied()))
    }

    /// Fixed-size matrix written as a sequence of `R` rows of `C` numbers.
    pub fn matrix<const R: usize, const C: usize>(
        &self,
        name: &str,
    ) -> Result<SMatrix<f64, R, C>, ConfigError> {
        let node = self.field(name)?;
        let rows = node.sequence().map_err(|_| {
            ConfigError::invalid_type(node.path.clone(), "a sequence of matrix rows")
        })?;
        if rows.len() != R {
            let cols = rows.first().map_or(0, |r| r.as_numbers().map_or(1, |v| v.len()));
            return Err(ConfigError::shape(
                node.path.clone(),
                Dims::new(R, C),
                Dims::new(rows.len(), cols),
            ));
        }
        let mut out = SMatrix::<f64, R, C>::zeros();
        for (r, row) in rows.iter().enumerate() {
            let values = row.as_numbers()?;
            if values.len() != C {
                return Err(ConfigError::shape(
                    node.path.clone(),
                    Dims::new(R, C),
                    Dims::new(R, values.len()),
                ));
            }
            for (c, x) in values.into_iter().enumerate() {
                out[(r, c)] = x;
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
