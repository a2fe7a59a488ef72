//! CSV seed data translation.
//!
//! A seed-data file fills one table. The table comes from the resource name,
//! the columns from the header row:
//!
//! ```text
//! Filename:  V0043_AlbumsByArtist.csv
//! Header:    artistName,albumName,yearReleased
//! Row:       'Pink Floyd','The Wall',1979
//! ```
//!
//! The first column is the row key. Every data row becomes
//!
//! ```text
//! UPDATE AlbumsByArtist SET albumName='The Wall',yearReleased=1979 WHERE artistName='Pink Floyd';
//! ```
//!
//! Values are embedded verbatim. There is no quoting or escaping, so a value
//! containing `,` or an unbalanced quote produces a broken statement; write
//! CQL literals (quoted strings) in the file itself.

use crate::error::{MutagenError, Result};
use crate::version::file_name;

/// Cell delimiter
pub const CSV_DELIM: char = ',';

/// Separator between version and table in the resource name
pub const RESOURCE_NAME_DELIM: char = '_';

/// Extract the target table from a resource name.
///
/// The file stem is split on `_`; the second segment is the table.
pub fn table_name(resource_name: &str) -> Result<String> {
    let name = file_name(resource_name);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };

    match stem.split(RESOURCE_NAME_DELIM).nth(1) {
        Some(table) if !table.trim().is_empty() => Ok(table.to_string()),
        _ => Err(MutagenError::malformed_name(
            resource_name,
            "CSV mutation is missing its table name",
        )),
    }
}

/// Seed-data rows translated into update statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub table: String,
    pub columns: Vec<String>,
    pub statements: Vec<String>,
}

impl SeedData {
    /// Generated statements, one per line
    pub fn change_summary(&self) -> String {
        self.statements.join("\n")
    }
}

/// Translate CSV text into one UPDATE per data row.
///
/// `resource` is only used for error context. Blank lines are skipped.
pub fn translate(resource: &str, table: &str, source: &str) -> Result<SeedData> {
    let mut lines = source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let columns: Vec<String> = match lines.next() {
        Some((_, header)) => header.split(CSV_DELIM).map(str::to_string).collect(),
        None => {
            return Ok(SeedData {
                table: table.to_string(),
                columns: Vec::new(),
                statements: Vec::new(),
            });
        }
    };

    if columns.len() < 2 {
        return Err(MutagenError::MalformedHeader {
            resource: resource.to_string(),
            reason: "need a key column and at least one value column".to_string(),
        });
    }
    if let Some(pos) = columns.iter().position(|c| c.trim().is_empty()) {
        return Err(MutagenError::MalformedHeader {
            resource: resource.to_string(),
            reason: format!("column {} has no name", pos + 1),
        });
    }

    let statements = lines
        .map(|(idx, line)| {
            let values: Vec<&str> = line.split(CSV_DELIM).collect();
            if values.len() != columns.len() {
                return Err(MutagenError::MalformedRow {
                    resource: resource.to_string(),
                    line: idx + 1,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            Ok(update_statement(table, &columns, &values))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SeedData {
        table: table.to_string(),
        columns,
        statements,
    })
}

/// Build `UPDATE <table> SET c1=v1,... WHERE c0=v0;`
fn update_statement(table: &str, columns: &[String], values: &[&str]) -> String {
    let assignments = columns[1..]
        .iter()
        .zip(&values[1..])
        .map(|(column, value)| format!("{}={}", column, value))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "UPDATE {} SET {} WHERE {}={};",
        table, assignments, columns[0], values[0]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_from_resource() {
        assert_eq!(table_name("V0001_Users.csv").unwrap(), "Users");
        assert_eq!(table_name("seed/V0043_AlbumsByArtist").unwrap(), "AlbumsByArtist");
        // Only the second segment names the table
        assert_eq!(table_name("V2_Album_Tracks.csv").unwrap(), "Album");
    }

    #[test]
    fn test_table_name_missing() {
        for name in ["V12_", "V12", "V12.csv", "V12_.csv"] {
            assert!(
                matches!(table_name(name), Err(MutagenError::MalformedResourceName { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_single_row_update() {
        let data = translate("V0001_Users.csv", "Users", "id,name,age\n1,Bob,30\n").unwrap();
        assert_eq!(data.statements, vec!["UPDATE Users SET name=Bob,age=30 WHERE id=1;"]);
        assert_eq!(data.columns, vec!["id", "name", "age"]);
    }

    #[test]
    fn test_rows_keep_file_order() {
        let csv = "artistName,albumName\n'Pink Floyd','The Wall'\n\n'Yes','Fragile'";
        let data = translate("V43_Albums.csv", "Albums", csv).unwrap();
        assert_eq!(
            data.statements,
            vec![
                "UPDATE Albums SET albumName='The Wall' WHERE artistName='Pink Floyd';",
                "UPDATE Albums SET albumName='Fragile' WHERE artistName='Yes';",
            ]
        );
        assert_eq!(data.change_summary(), data.statements.join("\n"));
    }

    #[test]
    fn test_empty_file_and_header_only() {
        assert!(translate("V1_T.csv", "T", "").unwrap().statements.is_empty());
        assert!(translate("V1_T.csv", "T", "id,v\n").unwrap().statements.is_empty());
    }

    #[test]
    fn test_short_row_fails() {
        let err = translate("V1_T.csv", "T", "id,a,b\n1,x,y\n2,x\n").unwrap_err();
        match err {
            MutagenError::MalformedRow { line, expected, found, .. } => {
                assert_eq!((line, expected, found), (3, 3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_long_row_fails() {
        let err = translate("V1_T.csv", "T", "id,a\n1,x,y\n").unwrap_err();
        assert!(matches!(err, MutagenError::MalformedRow { found: 3, .. }));
    }

    #[test]
    fn test_key_only_header_fails() {
        let err = translate("V1_T.csv", "T", "id\n1\n").unwrap_err();
        assert!(matches!(err, MutagenError::MalformedHeader { .. }));
    }
}
