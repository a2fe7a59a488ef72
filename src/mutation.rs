//! Mutations: versioned, pre-parsed units of change.
//!
//! Two kinds exist, chosen by file extension:
//!
//! | Extension                  | Kind       | Parsed by            |
//! |----------------------------|------------|----------------------|
//! | `.cql`, `.cql3`, `.txt`, none | `Script` | [`crate::script`]    |
//! | `.csv`                     | `SeedData` | [`crate::tabular`]   |
//!
//! All parsing happens at construction. A constructed mutation is immutable
//! and holds everything needed to apply it.

use crate::apply_state::MutationRun;
use crate::engine;
use crate::error::{MutagenError, Result};
use crate::executor::StatementExecutor;
use crate::resource::ResourceLoader;
use crate::script::{self, TrailingStatementPolicy};
use crate::tabular;
use crate::version::{PrefixVersionResolver, Version, VersionResolver, file_name};
use std::fmt;
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

/// Kind of mutation resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum MutationKind {
    /// CQL script
    #[strum(serialize = "cql")]
    Script,
    /// CSV seed data for one table
    #[strum(serialize = "csv")]
    SeedData,
}

impl MutationKind {
    /// Determine the kind from a resource name's extension.
    pub fn from_resource(resource_name: &str) -> Result<Self> {
        let name = file_name(resource_name);
        let extension = match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx + 1..].to_ascii_lowercase(),
            _ => String::new(),
        };

        match extension.as_str() {
            "" | "cql" | "cql3" | "txt" => Ok(Self::Script),
            "csv" => Ok(Self::SeedData),
            _ => Err(MutagenError::UnsupportedResource {
                resource: resource_name.to_string(),
            }),
        }
    }
}

/// One versioned unit of schema or data change.
pub trait Mutation: fmt::Debug {
    fn kind(&self) -> MutationKind;

    /// Resource the mutation was built from
    fn resource(&self) -> &str;

    fn version(&self) -> Version;

    /// Human-readable description of the change, for audit logs
    fn change_summary(&self) -> &str;

    /// Statements in execution order
    fn statements(&self) -> &[String];

    /// Apply every statement in order, stopping at the first failure.
    ///
    /// The run is returned whether or not application succeeded, so the
    /// caller can inspect the per-statement records of a failed mutation.
    fn apply(&self, executor: &mut dyn StatementExecutor) -> (MutationRun, Result<()>) {
        let mut run = MutationRun::new(self.version());
        let result = engine::run_statements(&mut run, self.statements(), executor);
        (run, result)
    }
}

/// Mutation built from a CQL script.
#[derive(Debug, Clone)]
pub struct ScriptMutation {
    resource: String,
    version: Version,
    source: String,
    statements: Vec<String>,
}

impl ScriptMutation {
    pub fn load(
        resource_name: &str,
        resources: &ResourceLoader,
        resolver: &dyn VersionResolver,
        trailing: TrailingStatementPolicy,
    ) -> Result<Self> {
        let version = resolver.parse_version(resource_name)?;
        let source = resources.load(resource_name)?.unwrap_or_default();
        Self::from_source(resource_name, version, source, trailing)
    }

    /// Build from already loaded text.
    pub fn from_source(
        resource_name: &str,
        version: Version,
        source: String,
        trailing: TrailingStatementPolicy,
    ) -> Result<Self> {
        let statements = script::parse_script(&source).finish(resource_name, trailing)?;
        debug!(
            "Parsed {} statements from {} (version {})",
            statements.len(),
            resource_name,
            version
        );

        Ok(Self {
            resource: resource_name.to_string(),
            version,
            source,
            statements,
        })
    }
}

impl Mutation for ScriptMutation {
    fn kind(&self) -> MutationKind {
        MutationKind::Script
    }

    fn resource(&self) -> &str {
        &self.resource
    }

    fn version(&self) -> Version {
        self.version
    }

    fn change_summary(&self) -> &str {
        &self.source
    }

    fn statements(&self) -> &[String] {
        &self.statements
    }
}

/// Mutation built from a CSV seed-data file.
#[derive(Debug, Clone)]
pub struct SeedDataMutation {
    resource: String,
    version: Version,
    table: String,
    summary: String,
    statements: Vec<String>,
}

impl SeedDataMutation {
    pub fn load(
        resource_name: &str,
        resources: &ResourceLoader,
        resolver: &dyn VersionResolver,
    ) -> Result<Self> {
        let version = resolver.parse_version(resource_name)?;
        // Fails before the file is touched
        let table = tabular::table_name(resource_name)?;
        let source = resources.load(resource_name)?.unwrap_or_default();
        Self::from_source(resource_name, version, &table, &source)
    }

    /// Build from already loaded text.
    pub fn from_source(
        resource_name: &str,
        version: Version,
        table: &str,
        source: &str,
    ) -> Result<Self> {
        let data = tabular::translate(resource_name, table, source)?;
        debug!(
            "Translated {} rows of {} into updates on {}",
            data.statements.len(),
            resource_name,
            data.table
        );

        Ok(Self {
            resource: resource_name.to_string(),
            version,
            summary: data.change_summary(),
            table: data.table,
            statements: data.statements,
        })
    }

    /// Table the rows are written to
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Mutation for SeedDataMutation {
    fn kind(&self) -> MutationKind {
        MutationKind::SeedData
    }

    fn resource(&self) -> &str {
        &self.resource
    }

    fn version(&self) -> Version {
        self.version
    }

    fn change_summary(&self) -> &str {
        &self.summary
    }

    fn statements(&self) -> &[String] {
        &self.statements
    }
}

/// Builds mutations of the right kind from resource names.
#[derive(Debug, Clone)]
pub struct MutationLoader<R = PrefixVersionResolver> {
    resources: ResourceLoader,
    resolver: R,
    trailing: TrailingStatementPolicy,
}

impl MutationLoader<PrefixVersionResolver> {
    pub fn new(resources: ResourceLoader) -> Self {
        Self::with_resolver(resources, PrefixVersionResolver)
    }
}

impl<R: VersionResolver> MutationLoader<R> {
    pub fn with_resolver(resources: ResourceLoader, resolver: R) -> Self {
        Self {
            resources,
            resolver,
            trailing: TrailingStatementPolicy::default(),
        }
    }

    /// Set how scripts ending without `;` are handled
    pub fn with_trailing_policy(mut self, trailing: TrailingStatementPolicy) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Load and parse one resource.
    pub fn load(&self, resource_name: &str) -> Result<Box<dyn Mutation>> {
        match MutationKind::from_resource(resource_name)? {
            MutationKind::Script => Ok(Box::new(ScriptMutation::load(
                resource_name,
                &self.resources,
                &self.resolver,
                self.trailing,
            )?)),
            MutationKind::SeedData => Ok(Box::new(SeedDataMutation::load(
                resource_name,
                &self.resources,
                &self.resolver,
            )?)),
        }
    }
}
