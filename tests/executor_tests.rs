//! Tests for the external-command executor
//!
//! These tests run small system programs in place of a CQL client.

#![cfg(unix)]

use mutagen_cassandra::{CommandExecutor, ExecutorCommand, ExecutorError, StatementExecutor};

fn executor(program: &str, args: &[&str], max_attempts: u32) -> CommandExecutor {
    CommandExecutor::new(ExecutorCommand {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        max_attempts,
    })
}

#[test]
fn test_success_reports_one_attempt() {
    let mut exec = executor("true", &[], 3);
    let result = exec.execute("SELECT 1;").unwrap();
    assert_eq!(result.attempts, 1);
}

#[test]
fn test_failure_after_all_attempts() {
    let mut exec = executor("false", &[], 2);
    let err = exec.execute("SELECT 1;").unwrap_err();
    assert!(matches!(err, ExecutorError::Execution(_)));
}

#[test]
fn test_stderr_is_reported() {
    let mut exec = executor("sh", &["-c", "echo \"bad: $1\" >&2; exit 2", "sh"], 1);
    let err = exec.execute("DROP TABLE x;").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("exit code 2"), "{message}");
    assert!(message.contains("bad: DROP TABLE x;"), "{message}");
}

#[test]
fn test_missing_program_is_connection_error() {
    let mut exec = executor("/nonexistent/cqlsh", &[], 1);
    let err = exec.execute("SELECT 1;").unwrap_err();
    assert!(matches!(err, ExecutorError::Connection(_)));
}
