//! Engine configuration.
//!
//! [`EngineConfig`] can be built in code, through
//! [`Partree::builder`](crate::Partree::builder), or loaded from TOML:
//!
//! ```toml
//! strategy = "partitioned"
//! granularity = { fixed = 2048 }
//! partition_policy = "complete"
//! threads = 8
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PartreeError, Result};
use crate::executor::PartitionSettings;
use crate::partition::{Granularity, PartitionPolicy};

/// Execution strategy for the broadcasting operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Calling thread only, pre-sized branches.
    Sequential,
    /// Calling thread only, branches collected from lazy iterators.
    Lazy,
    /// Partitions of branches on rayon tasks.
    #[default]
    Partitioned,
    /// A task per branch and per element; zip skips validation.
    Nested,
}

/// Settings for a [`Partree`](crate::Partree) engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Execution strategy.
    pub strategy: Strategy,
    /// Element budget per partition.
    pub granularity: Granularity,
    /// Handling of the last partition.
    pub partition_policy: PartitionPolicy,
    /// Size of a dedicated thread pool; `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| PartreeError::Config(e.to_string()))
    }

    /// Rejects values no engine can run with.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(PartreeError::Config("threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Partitioning part of the configuration.
    pub fn partition_settings(&self) -> PartitionSettings {
        PartitionSettings {
            granularity: self.granularity,
            policy: self.partition_policy,
        }
    }
}
