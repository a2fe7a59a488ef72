//! Version resolution for mutation resources.
//!
//! Resource names carry their ordering key as a prefix:
//!
//! ```text
//! V<number>_<name>[.ext]
//! V0043_AlbumsByArtist.csv
//! V2_create_keyspace.cql
//! ```
//!
//! The engine never interprets a [`Version`] beyond ordering. Which versions
//! have already been applied is decided by the caller.

use crate::error::{MutagenError, Result};
use std::fmt;
use std::path::Path;

/// Totally ordered identifier of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u64);

impl Version {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric id
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts a resource name into its ordering key.
///
/// Called exactly once per mutation, at construction.
pub trait VersionResolver {
    fn parse_version(&self, resource_name: &str) -> Result<Version>;
}

/// Resolver for the `V<number>_` naming convention.
///
/// Directory components are ignored, only the file name is inspected. The
/// number may be followed by `_`, `.` or the end of the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixVersionResolver;

impl VersionResolver for PrefixVersionResolver {
    fn parse_version(&self, resource_name: &str) -> Result<Version> {
        let file_name = file_name(resource_name);

        let rest = file_name
            .strip_prefix('V')
            .or_else(|| file_name.strip_prefix('v'))
            .ok_or_else(|| {
                MutagenError::malformed_name(resource_name, "name must start with 'V'")
            })?;

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, tail) = rest.split_at(digits_end);

        if digits.is_empty() {
            return Err(MutagenError::malformed_name(
                resource_name,
                "missing version number after 'V'",
            ));
        }
        if let Some(c) = tail.chars().next().filter(|c| !matches!(c, '_' | '.')) {
            return Err(MutagenError::malformed_name(
                resource_name,
                format!("unexpected '{}' after version number", c),
            ));
        }

        digits.parse::<u64>().map(Version::new).map_err(|e| {
            MutagenError::malformed_name(resource_name, format!("invalid version number: {}", e))
        })
    }
}

/// Last path component of a resource name.
pub(crate) fn file_name(resource_name: &str) -> &str {
    Path::new(resource_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(resource_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> Result<Version> {
        PrefixVersionResolver.parse_version(name)
    }

    #[test]
    fn test_parses_padded_versions() {
        assert_eq!(parse("V0001_Users.csv").unwrap(), Version::new(1));
        assert_eq!(parse("V43_AlbumsByArtist").unwrap(), Version::new(43));
        assert_eq!(parse("v7.cql").unwrap(), Version::new(7));
        assert_eq!(parse("V12_").unwrap(), Version::new(12));
    }

    #[test]
    fn test_ignores_directories() {
        let v = parse("mutations/cassandra_v2/V0003_add_index.cql").unwrap();
        assert_eq!(v.id(), 3);
    }

    #[test]
    fn test_rejects_malformed_names() {
        for name in ["Users.csv", "V_users.cql", "Vx1_users.cql", "V1-users.cql", ""] {
            let err = parse(name).unwrap_err();
            assert!(
                matches!(err, MutagenError::MalformedResourceName { .. }),
                "{name} should be malformed, got {err}"
            );
        }
    }

    #[test]
    fn test_rejects_overflowing_version() {
        let err = parse("V99999999999999999999999_big.cql").unwrap_err();
        assert!(matches!(err, MutagenError::MalformedResourceName { .. }));
    }

    #[test]
    fn test_versions_order_numerically() {
        assert!(parse("V9_a.cql").unwrap() < parse("V10_b.cql").unwrap());
        assert_eq!(Version::new(10).to_string(), "10");
    }
}
