//! CQL script parsing.
//!
//! Splits a script into `;`-terminated statements. Statements may span
//! several lines, and a new statement may begin on the same line right after
//! the previous terminator. Lines starting with `--` or `//` (after
//! trimming) are comments and contribute nothing, even if they contain `;`.
//!
//! No CQL syntax is checked; statements are forwarded verbatim.

use crate::error::{MutagenError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

/// Line comment prefixes
pub const COMMENT_MARKERS: [&str; 2] = ["--", "//"];

/// Statement terminator
pub const TERMINATOR: char = ';';

/// What to do with text left over after the last `;`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrailingStatementPolicy {
    /// Discard it with a warning
    #[default]
    Drop,
    /// Fail construction with `UnterminatedStatement`
    Reject,
}

/// Output of a single parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedScript {
    /// Completed statements in source order
    pub statements: Vec<String>,
    /// Non-blank text that never reached a terminator
    pub unterminated: Option<String>,
}

impl ParsedScript {
    /// Apply the trailing-statement policy and return the statements.
    pub fn finish(self, resource: &str, policy: TrailingStatementPolicy) -> Result<Vec<String>> {
        match (self.unterminated, policy) {
            (None, _) => Ok(self.statements),
            (Some(statement), TrailingStatementPolicy::Drop) => {
                warn!(
                    "Dropping unterminated statement at end of {}: \"{}\"",
                    resource, statement
                );
                Ok(self.statements)
            }
            (Some(statement), TrailingStatementPolicy::Reject) => {
                Err(MutagenError::UnterminatedStatement {
                    resource: resource.to_string(),
                    statement,
                })
            }
        }
    }
}

/// True if the line is a comment once leading whitespace is ignored
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    COMMENT_MARKERS.iter().any(|m| trimmed.starts_with(m))
}

/// Split script text into statements.
pub fn parse_script(source: &str) -> ParsedScript {
    let (statements, pending) = source.lines().fold(
        (Vec::new(), String::new()),
        |(mut statements, mut pending), line| {
            if is_comment(line) {
                return (statements, pending);
            }
            if !pending.is_empty() {
                pending.push('\n');
            }

            let mut rest = line;
            loop {
                // A comment after a terminator ends the line
                if pending.trim().is_empty() && is_comment(rest) {
                    pending.clear();
                    rest = "";
                }
                match rest.find(TERMINATOR) {
                    Some(idx) => {
                        pending.push_str(&rest[..=idx]);
                        push_statement(&mut statements, &pending);
                        pending.clear();
                        rest = &rest[idx + 1..];
                    }
                    None => break,
                }
            }
            pending.push_str(rest);
            (statements, pending)
        },
    );

    let leftover = pending.trim();
    ParsedScript {
        statements,
        unterminated: (!leftover.is_empty()).then(|| leftover.to_string()),
    }
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let statement = text.trim();
    // Bare terminator
    if statement.len() > TERMINATOR.len_utf8() {
        statements.push(statement.to_string());
    }
}
