//! Property-Based Tests for the script parser and seed-data translator
//!
//! These tests verify:
//! - Comment handling (comment-only scripts, no comment residue)
//! - Re-parsing a statement gives the statement back
//! - Multi-line statements survive intact
//! - Seed-data rows map one-to-one onto updates

use mutagen_cassandra::script::{is_comment, parse_script};
use mutagen_cassandra::tabular::translate;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A comment line with arbitrary body, possibly containing terminators
fn comment_line() -> impl Strategy<Value = String> {
    (
        "[ \t]{0,3}",
        prop_oneof![Just("--"), Just("//")],
        "[a-zA-Z0-9 ;,'()=]{0,30}",
    )
        .prop_map(|(indent, marker, body)| format!("{}{}{}", indent, marker, body))
}

/// A line of statement text without terminators or comment markers
fn body_line() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ,'()=*]{0,30}"
}

/// A terminated statement spread over one to four lines
fn statement() -> impl Strategy<Value = String> {
    prop::collection::vec(body_line(), 1..4).prop_map(|lines| format!("{};", lines.join("\n")))
}

// =============================================================================
// Script Parser Properties
// =============================================================================

proptest! {
    /// Scripts made only of comments produce nothing
    #[test]
    fn comment_only_scripts_are_empty(lines in prop::collection::vec(comment_line(), 0..10)) {
        let parsed = parse_script(&lines.join("\n"));
        prop_assert!(parsed.statements.is_empty());
        prop_assert_eq!(parsed.unterminated, None);
    }

    /// No statement keeps a comment line
    #[test]
    fn statements_hold_no_comment_lines(
        statements in prop::collection::vec(statement(), 0..6),
        comments in prop::collection::vec(comment_line(), 0..6),
    ) {
        // Interleave comments between statements
        let mut script = Vec::new();
        for (i, stmt) in statements.iter().enumerate() {
            if let Some(c) = comments.get(i) {
                script.push(c.clone());
            }
            script.push(stmt.clone());
        }

        let parsed = parse_script(&script.join("\n"));
        prop_assert_eq!(parsed.statements.len(), statements.len());
        for stmt in &parsed.statements {
            prop_assert!(stmt.lines().all(|line| !is_comment(line)));
        }
    }

    /// Parsing then re-parsing a single statement is the identity
    #[test]
    fn reparse_is_idempotent(statements in prop::collection::vec(statement(), 1..6)) {
        let parsed = parse_script(&statements.join("\n"));
        for stmt in &parsed.statements {
            let again = parse_script(stmt);
            prop_assert_eq!(&again.statements, &vec![stmt.clone()]);
        }
    }

    /// Multi-line statements come back with every source line
    #[test]
    fn multiline_statements_are_preserved(stmt in statement()) {
        let parsed = parse_script(&stmt);
        prop_assert_eq!(parsed.statements.len(), 1);
        prop_assert_eq!(parsed.statements[0].lines().count(), stmt.lines().count());
    }

    /// Text after the last terminator never becomes a statement
    #[test]
    fn unterminated_tail_is_not_a_statement(stmt in statement(), tail in body_line()) {
        let parsed = parse_script(&format!("{}\n{}", stmt, tail));
        prop_assert_eq!(parsed.statements.len(), 1);
        prop_assert_eq!(parsed.unterminated, Some(tail.trim().to_string()));
    }
}

// =============================================================================
// Seed Data Properties
// =============================================================================

proptest! {
    /// One update per data row, each keyed on the first column
    #[test]
    fn one_update_per_row(
        rows in prop::collection::vec(("[0-9]{1,5}", "[a-z]{1,8}", "[0-9]{1,3}"), 0..20),
    ) {
        let mut csv = String::from("id,name,age\n");
        for (id, name, age) in &rows {
            csv.push_str(&format!("{},{},{}\n", id, name, age));
        }

        let data = translate("V1_People.csv", "People", &csv).unwrap();
        prop_assert_eq!(data.statements.len(), rows.len());
        for (stmt, (id, name, age)) in data.statements.iter().zip(&rows) {
            prop_assert_eq!(
                stmt,
                &format!("UPDATE People SET name={},age={} WHERE id={};", name, age, id)
            );
        }
    }
}
