//! Migration configuration file handling.
//!
//! Configuration is stored as JSON:
//!
//! ```json
//! {
//!   "resource_roots": ["mutations"],
//!   "max_resource_bytes": 1048576,
//!   "trailing_statement": "drop",
//!   "executor": { "program": "cqlsh", "args": ["cassandra-1", "-k", "app", "-e"], "max_attempts": 3 },
//!   "dry_run": false
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::executor::ExecutorCommand;
use crate::mutation::MutationLoader;
use crate::resource::{DEFAULT_MAX_RESOURCE_BYTES, ResourceLoader};
use crate::script::TrailingStatementPolicy;

/// Settings for loading and applying mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Directories searched before the plain filesystem path
    pub resource_roots: Vec<PathBuf>,
    /// Read ceiling per resource
    pub max_resource_bytes: u64,
    /// Handling of scripts that end without `;`
    pub trailing_statement: TrailingStatementPolicy,
    /// Client used to send statements to the cluster
    pub executor: ExecutorCommand,
    /// Log statements instead of executing them
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            resource_roots: Vec::new(),
            max_resource_bytes: DEFAULT_MAX_RESOURCE_BYTES,
            trailing_statement: TrailingStatementPolicy::default(),
            executor: ExecutorCommand::default(),
            dry_run: false,
        }
    }
}

impl MigrationConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_resource_bytes == 0 {
            anyhow::bail!("max_resource_bytes must be greater than zero");
        }

        if self.executor.program.trim().is_empty() {
            anyhow::bail!("Executor program must be specified");
        }
        if self.executor.max_attempts == 0 {
            anyhow::bail!("Executor max_attempts must be at least 1");
        }

        for root in &self.resource_roots {
            if root.as_os_str().is_empty() {
                anyhow::bail!("Resource roots cannot be empty paths");
            }
        }

        Ok(())
    }

    /// Resource loader honoring the configured roots and size ceiling
    pub fn resource_loader(&self) -> ResourceLoader {
        self.resource_roots
            .iter()
            .fold(ResourceLoader::new(), |loader, root| loader.with_root(root))
            .with_max_bytes(self.max_resource_bytes)
    }

    /// Mutation loader with the default `V<number>_` resolver
    pub fn mutation_loader(&self) -> MutationLoader {
        MutationLoader::new(self.resource_loader()).with_trailing_policy(self.trailing_statement)
    }
}
