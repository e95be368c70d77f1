//! Named registry of controller parameter sets.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ConfigError;
use crate::params::QpControllerParams;
use crate::reader::ConfigNode;
use crate::types::DofCounts;

/// Every named [`QpControllerParams`] from one configuration section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSetRegistry {
    sets: HashMap<String, QpControllerParams>,
}

impl ParameterSetRegistry {
    /// Parse each top-level field of `section` as an independent, complete
    /// parameter set.
    ///
    /// All sets must describe the same number of tracked bodies. When
    /// `num_tracked_bodies` is `None` the first set fixes that number.
    pub fn from_config(
        section: &ConfigNode<'_>,
        dofs: &DofCounts,
        num_tracked_bodies: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let entries = section.entries()?;
        if entries.is_empty() {
            return Err(ConfigError::EmptyRegistry(section.path().to_owned()));
        }

        let mut tracked = num_tracked_bodies;
        let mut sets = HashMap::with_capacity(entries.len());
        for (name, node) in entries {
            let params = QpControllerParams::parse(&node, dofs, tracked)?;
            tracked.get_or_insert(params.body_motion.len());
            debug!(
                set = %name,
                tracked_bodies = params.body_motion.len(),
                "parsed controller parameter set"
            );
            sets.insert(name, params);
        }
        Ok(Self { sets })
    }

    pub fn get(&self, name: &str) -> Option<&QpControllerParams> {
        self.sets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// Set names, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QpControllerParams)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }
}
