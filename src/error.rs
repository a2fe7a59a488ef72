//! Error handling module for mutagen
//!
//! Provides the typed error taxonomy shared by the loader, the parsers and the
//! execution engine. Configuration mistakes (bad names, malformed seed data)
//! are kept apart from infrastructure failures (I/O, executor errors) so
//! callers can tell them apart.

use crate::apply_state::ApplyTransitionError;
use crate::executor::ExecutorError;
use crate::version::Version;
use thiserror::Error;

/// Main error type for mutation loading and application
#[derive(Error, Debug)]
pub enum MutagenError {
    /// No resource root and no filesystem path resolves the name
    #[error("Resource \"{resource}\" not found")]
    ResourceNotFound { resource: String },

    /// Version or table-name segment cannot be extracted from the name
    #[error("Resource name \"{resource}\" is malformed: {reason}")]
    MalformedResourceName { resource: String, reason: String },

    /// Read failure while loading resource bytes
    #[error("Could not load resource \"{resource}\": {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    /// Resource is larger than the configured read ceiling
    #[error("Resource \"{resource}\" exceeds the {limit} byte limit")]
    Truncated { resource: String, limit: u64 },

    /// Extension does not map to a known mutation kind
    #[error("Resource \"{resource}\" is not a supported mutation type")]
    UnsupportedResource { resource: String },

    /// Script ended with text that was never closed by `;`
    #[error("Resource \"{resource}\" ends with an unterminated statement: {statement}")]
    UnterminatedStatement { resource: String, statement: String },

    /// Seed-data header cannot describe an update
    #[error("Seed data \"{resource}\" has a malformed header: {reason}")]
    MalformedHeader { resource: String, reason: String },

    /// Seed-data row arity differs from the header
    #[error("Seed data \"{resource}\" line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        resource: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Executor reported a connectivity or execution failure for a statement
    #[error("Mutation {version}: exception executing CQL \"{statement}\": {source}")]
    Execution {
        version: Version,
        statement: String,
        #[source]
        source: ExecutorError,
    },

    /// Programmer error raised by the executor, passed through untouched
    #[error(transparent)]
    Unexpected(anyhow::Error),

    /// Two resources resolve to the same version
    #[error("Version {version} is claimed by both \"{first}\" and \"{second}\"")]
    DuplicateVersion {
        version: Version,
        first: String,
        second: String,
    },

    /// Apply state machine refused a transition
    #[error("Apply state error: {0}")]
    Transition(#[from] ApplyTransitionError),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for mutagen operations
pub type Result<T> = std::result::Result<T, MutagenError>;

impl MutagenError {
    /// Create a resource-not-found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }

    /// Create a malformed-name error
    pub fn malformed_name(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResourceName {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the resource it was raised for
    pub fn io(resource: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            resource: resource.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for failures caused by the migration set itself rather than
    /// the environment it runs in.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound { .. }
                | Self::MalformedResourceName { .. }
                | Self::UnsupportedResource { .. }
                | Self::UnterminatedStatement { .. }
                | Self::MalformedHeader { .. }
                | Self::MalformedRow { .. }
                | Self::DuplicateVersion { .. }
                | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MutagenError::not_found("V1_init.cql");
        assert_eq!(err.to_string(), "Resource \"V1_init.cql\" not found");

        let err = MutagenError::malformed_name("V12_", "missing table name");
        assert_eq!(
            err.to_string(),
            "Resource name \"V12_\" is malformed: missing table name"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MutagenError::io("V2_users.cql", io_err);
        assert!(matches!(err, MutagenError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_configuration_errors_are_classified() {
        assert!(MutagenError::not_found("x").is_configuration_error());
        assert!(MutagenError::config("bad").is_configuration_error());

        let io_err = std::io::Error::other("disk gone");
        assert!(!MutagenError::io("x", io_err).is_configuration_error());
        assert!(!MutagenError::Unexpected(anyhow::anyhow!("bug")).is_configuration_error());
    }
}
