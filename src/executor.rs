//! Statement executors.
//!
//! The engine never talks to the cluster directly. Each statement is handed
//! to a [`StatementExecutor`], which blocks until the statement completed or
//! failed. Retrying is the executor's business; it only reports how many
//! attempts were needed.

use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Successful execution of one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Attempts needed, at least 1
    pub attempts: u32,
}

impl ExecutionResult {
    pub fn new(attempts: u32) -> Self {
        Self { attempts }
    }
}

/// Failure reported by an executor.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The cluster could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The cluster rejected or failed the statement
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Anything else (programmer error). Passed through without wrapping.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Sends statements to the target cluster.
pub trait StatementExecutor {
    fn execute(&mut self, statement: &str) -> Result<ExecutionResult, ExecutorError>;
}

/// Logs and records statements without sending them anywhere.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    executed: Vec<String>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements seen so far, in submission order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl StatementExecutor for DryRunExecutor {
    fn execute(&mut self, statement: &str) -> Result<ExecutionResult, ExecutorError> {
        info!("[DRY RUN] Skipped: {}", statement);
        self.executed.push(statement.to_string());
        Ok(ExecutionResult::new(1))
    }
}

/// Command used to run one statement, e.g. `cqlsh host -e <statement>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorCommand {
    /// Program to run
    pub program: String,

    /// Arguments placed before the statement
    #[serde(default)]
    pub args: Vec<String>,

    /// Runs per statement before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    1
}

impl Default for ExecutorCommand {
    fn default() -> Self {
        Self {
            program: "cqlsh".to_string(),
            args: vec!["-e".to_string()],
            max_attempts: default_max_attempts(),
        }
    }
}

/// Runs every statement through an external client program.
///
/// The statement is passed as the last argument. A spawn failure counts as
/// a connection error; a non-zero exit is retried up to `max_attempts`
/// times and then reported as an execution error carrying stderr.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    command: ExecutorCommand,
}

impl CommandExecutor {
    pub fn new(command: ExecutorCommand) -> Self {
        Self { command }
    }
}

impl StatementExecutor for CommandExecutor {
    fn execute(&mut self, statement: &str) -> Result<ExecutionResult, ExecutorError> {
        let max_attempts = self.command.max_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=max_attempts {
            debug!(
                "Running {} {:?} (attempt {}/{})",
                self.command.program, self.command.args, attempt, max_attempts
            );

            let output = Command::new(&self.command.program)
                .args(&self.command.args)
                .arg(statement)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .map_err(|e| {
                    ExecutorError::Connection(format!(
                        "failed to spawn {}: {}",
                        self.command.program, e
                    ))
                })?;

            if output.status.success() {
                return Ok(ExecutionResult::new(attempt));
            }

            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            last_failure = format!("exit code {}: {}", code, stderr.trim());
            warn!(
                "{} failed on attempt {}/{} ({})",
                self.command.program, attempt, max_attempts, last_failure
            );
        }

        Err(ExecutorError::Execution(last_failure))
    }
}
