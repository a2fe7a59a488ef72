//! Migration planning and sequential application.
//!
//! A plan is the set of mutation resources in one directory, ordered by
//! version. Applying a plan loads every pending mutation first, so a broken
//! resource anywhere in the set is reported before anything touches the
//! cluster, then applies them one by one and stops at the first failure.

use crate::apply_state::MutationRun;
use crate::error::{MutagenError, Result};
use crate::executor::StatementExecutor;
use crate::mutation::{MutationKind, MutationLoader};
use crate::version::{Version, VersionResolver};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

/// A resource scheduled for application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMutation {
    pub version: Version,
    pub resource: String,
    pub kind: MutationKind,
}

/// Mutation resources ordered by ascending version.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    entries: Vec<PlannedMutation>,
}

impl MigrationPlan {
    /// Build a plan from resource names.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResource` for unknown extensions
    /// - `MalformedResourceName` if a version cannot be resolved
    /// - `DuplicateVersion` if two resources share a version
    pub fn from_resources<I, S>(resources: I, resolver: &dyn VersionResolver) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_version: BTreeMap<Version, PlannedMutation> = BTreeMap::new();

        for resource in resources {
            let resource = resource.into();
            let kind = MutationKind::from_resource(&resource)?;
            let version = resolver.parse_version(&resource)?;

            if let Some(existing) = by_version.get(&version) {
                return Err(MutagenError::DuplicateVersion {
                    version,
                    first: existing.resource.clone(),
                    second: resource,
                });
            }
            by_version.insert(
                version,
                PlannedMutation {
                    version,
                    resource,
                    kind,
                },
            );
        }

        Ok(Self {
            entries: by_version.into_values().collect(),
        })
    }

    /// Plan every mutation resource in `dir`.
    ///
    /// Hidden files, files whose name does not start like `V1` or `V_`,
    /// and files with an unsupported extension are ignored. A name that
    /// starts like a versioned resource but is otherwise broken still fails
    /// with `MalformedResourceName`.
    pub fn discover(dir: &Path, resolver: &dyn VersionResolver) -> Result<Self> {
        let dir_name = dir.display().to_string();
        let mut names = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| MutagenError::io(&dir_name, e))? {
            let entry = entry.map_err(|e| MutagenError::io(&dir_name, e))?;
            let file_type = entry.file_type().map_err(|e| MutagenError::io(&dir_name, e))?;
            if !file_type.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("Skipping non UTF-8 file name in {}", dir_name);
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if !looks_versioned(&name) {
                debug!("Skipping unversioned file {}", name);
                continue;
            }
            if MutationKind::from_resource(&name).is_err() {
                debug!("Skipping unsupported file {}", name);
                continue;
            }
            names.push(name);
        }

        let plan = Self::from_resources(names, resolver)?;
        debug!("Discovered {} mutations in {}", plan.len(), dir_name);
        Ok(plan)
    }

    /// All entries in version order
    pub fn entries(&self) -> &[PlannedMutation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newer than `last_applied` (all of them if `None`)
    pub fn pending_after(&self, last_applied: Option<Version>) -> Vec<&PlannedMutation> {
        self.entries
            .iter()
            .filter(|e| last_applied.is_none_or(|v| e.version > v))
            .collect()
    }
}

/// `V`/`v` followed by a digit or `_`, the start of a versioned name
fn looks_versioned(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('V' | 'v'))
        && chars.next().is_some_and(|c| c.is_ascii_digit() || c == '_')
}

/// Outcome of applying a plan.
#[derive(Debug)]
pub struct MigrationReport {
    /// One run per attempted mutation, in order
    pub runs: Vec<MutationRun>,
    /// Error that stopped the run, if any
    pub error: Option<MutagenError>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Highest version that was fully applied
    pub fn last_applied(&self) -> Option<Version> {
        self.runs
            .iter()
            .filter(|r| r.is_succeeded())
            .map(MutationRun::version)
            .max()
    }

    /// Successful runs, or the error that stopped the migration
    pub fn into_result(self) -> Result<Vec<MutationRun>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.runs),
        }
    }
}

/// Apply every mutation newer than `last_applied`, in version order.
///
/// Load and parse errors are returned before any statement is executed.
/// Execution failures end the migration at the failing mutation and are
/// reported through [`MigrationReport::error`].
pub fn migrate<R: VersionResolver>(
    loader: &MutationLoader<R>,
    plan: &MigrationPlan,
    last_applied: Option<Version>,
    executor: &mut dyn StatementExecutor,
) -> Result<MigrationReport> {
    let mutations = plan
        .pending_after(last_applied)
        .into_iter()
        .map(|entry| loader.load(&entry.resource))
        .collect::<Result<Vec<_>>>()?;

    info!("Applying {} pending mutations", mutations.len());

    let mut report = MigrationReport {
        runs: Vec::with_capacity(mutations.len()),
        error: None,
    };

    for mutation in &mutations {
        info!(
            "Applying mutation {} ({}, {} statements)",
            mutation.version(),
            mutation.resource(),
            mutation.statements().len()
        );
        debug!("Change summary for {}:\n{}", mutation.version(), mutation.change_summary());

        let (run, result) = mutation.apply(executor);
        report.runs.push(run);

        if let Err(err) = result {
            error!("Mutation {} failed, stopping: {}", mutation.version(), err);
            report.error = Some(err);
            break;
        }
    }

    Ok(report)
}
