//! Sequential statement execution.
//!
//! Statements are submitted one at a time, in order, each blocking until the
//! executor returns. The first failure ends the pass: the run moves to
//! `Failed` and no later statement is submitted. Statements that already
//! succeeded stay applied, there is no rollback.

use crate::apply_state::MutationRun;
use crate::error::{MutagenError, Result};
use crate::executor::{ExecutorError, StatementExecutor};
use tracing::{debug, error, info};

/// Drive `run` from `Pending` to a terminal state.
///
/// On failure the run is left in `Failed` with the failing statement
/// recorded, and the error carries the statement text.
pub fn run_statements(
    run: &mut MutationRun,
    statements: &[String],
    executor: &mut dyn StatementExecutor,
) -> Result<()> {
    let version = run.version();
    run.begin()?;
    debug!("Executing mutation {}", version);

    for (index, statement) in statements.iter().enumerate() {
        debug!("Executing CQL \"{}\"", statement);

        match executor.execute(statement) {
            Ok(result) => {
                info!(
                    "Successfully executed CQL \"{}\" in {} attempts",
                    statement, result.attempts
                );
                run.record_success(index, statement, result.attempts)?;
            }
            Err(ExecutorError::Unexpected(cause)) => {
                error!("Exception executing CQL \"{}\": {:#}", statement, cause);
                run.record_failure(index, statement, cause.to_string())?;
                return Err(MutagenError::Unexpected(cause));
            }
            Err(cause) => {
                error!("Exception executing CQL \"{}\": {}", statement, cause);
                run.record_failure(index, statement, cause.to_string())?;
                return Err(MutagenError::Execution {
                    version,
                    statement: statement.clone(),
                    source: cause,
                });
            }
        }
    }

    run.complete()?;
    debug!("Done executing mutation {}", version);
    Ok(())
}
