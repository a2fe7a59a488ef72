//! mutagen - Main entry point
//!
//! Parses, plans and applies versioned mutations from the command line.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use mutagen_cassandra::cli::{Cli, Commands};
use mutagen_cassandra::config::MigrationConfig;
use mutagen_cassandra::executor::{CommandExecutor, DryRunExecutor, StatementExecutor};
use mutagen_cassandra::plan::{self, MigrationPlan};
use mutagen_cassandra::version::{PrefixVersionResolver, Version};

/// Initialize the tracing subscriber; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);
    debug!("CLI arguments parsed");

    let result = match cli.command {
        Commands::Parse { resource, config } => run_parse(&resource, config.as_deref()),
        Commands::Plan { dir, after } => run_plan(&dir, after.map(Version::new)),
        Commands::Apply {
            dir,
            after,
            config,
            dry_run,
        } => run_apply(&dir, after.map(Version::new), config.as_deref(), dry_run),
        Commands::Validate { config } => run_validate(&config),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<MigrationConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            MigrationConfig::load_from_file(path)?
        }
        None => MigrationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn run_parse(resource: &str, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let mutation = config
        .mutation_loader()
        .load(resource)
        .with_context(|| format!("Failed to parse {}", resource))?;

    println!(
        "-- {} (version {}, {} statements)",
        mutation.resource(),
        mutation.version(),
        mutation.statements().len()
    );
    for statement in mutation.statements() {
        println!("{}", statement);
    }
    Ok(())
}

fn run_plan(dir: &Path, after: Option<Version>) -> Result<()> {
    let plan = MigrationPlan::discover(dir, &PrefixVersionResolver)?;
    let pending = plan.pending_after(after);

    if pending.is_empty() {
        println!("✓ Nothing to apply ({} mutations known)", plan.len());
        return Ok(());
    }
    for entry in pending {
        println!(
            "{:>8}  {:<4}  {}",
            entry.version.to_string(),
            entry.kind.to_string(),
            entry.resource
        );
    }
    Ok(())
}

fn run_apply(
    dir: &Path,
    after: Option<Version>,
    config: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    // The plan directory is searched before any configured root
    config.resource_roots.insert(0, dir.to_path_buf());

    let plan = MigrationPlan::discover(dir, &PrefixVersionResolver)?;
    let loader = config.mutation_loader();

    let mut executor: Box<dyn StatementExecutor> = if dry_run || config.dry_run {
        info!("Dry-run mode: statements will be logged, not executed");
        Box::new(DryRunExecutor::new())
    } else {
        Box::new(CommandExecutor::new(config.executor.clone()))
    };

    let report = plan::migrate(&loader, &plan, after, executor.as_mut())?;
    let applied = report.runs.iter().filter(|r| r.is_succeeded()).count();
    let last = report.last_applied().or(after);

    match report.error {
        None => {
            println!("✓ Applied {} mutations", applied);
            if let Some(version) = last {
                println!("  Last applied version: {}", version);
            }
            Ok(())
        }
        Some(err) => {
            eprintln!("✗ Applied {} mutations before failing", applied);
            if let Some(version) = last {
                eprintln!("  Re-run with --after {} once the failure is fixed", version);
            }
            Err(err.into())
        }
    }
}

fn run_validate(path: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", path);
    let config = MigrationConfig::load_from_file(path)?;
    config.validate()?;
    println!("✓ Configuration file is valid: {:?}", path);
    Ok(())
}
