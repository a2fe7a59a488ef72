//! mutagen Cassandra library
//!
//! Versioned schema and data mutations for Cassandra-style clusters. CQL
//! scripts and CSV seed-data files are parsed into ordered statements, bound
//! to the version encoded in their name, and applied one statement at a time
//! through a [`StatementExecutor`], stopping at the first failure.

pub mod apply_state;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod mutation;
pub mod plan;
pub mod resource;
pub mod script;
pub mod tabular;
pub mod version;

// Re-export main types for convenience
pub use apply_state::{ApplyState, ApplyTransitionError, MutationRun, StatementOutcome};
pub use config::MigrationConfig;
pub use error::{MutagenError, Result};
pub use executor::{
    CommandExecutor, DryRunExecutor, ExecutionResult, ExecutorCommand, ExecutorError,
    StatementExecutor,
};
pub use mutation::{Mutation, MutationKind, MutationLoader, ScriptMutation, SeedDataMutation};
pub use plan::{MigrationPlan, MigrationReport, PlannedMutation, migrate};
pub use resource::ResourceLoader;
pub use script::{TrailingStatementPolicy, parse_script};
pub use version::{PrefixVersionResolver, Version, VersionResolver};
