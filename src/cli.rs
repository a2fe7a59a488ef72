use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mutagen - versioned CQL and CSV seed-data mutations
#[derive(Parser)]
#[command(name = "mutagen")]
#[command(about = "Apply versioned CQL scripts and CSV seed data to a Cassandra cluster")]
#[command(version)]
pub struct Cli {
    /// Log every statement and state transition
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the statements parsed from one resource
    Parse {
        /// Resource name, e.g. V0001_create_users.cql
        resource: String,
        /// Configuration file (resource roots, trailing statement policy)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the mutations that would be applied, in version order
    Plan {
        /// Directory containing the mutation resources
        dir: PathBuf,
        /// Last version already applied to the cluster
        #[arg(long)]
        after: Option<u64>,
    },
    /// Apply pending mutations in version order
    Apply {
        /// Directory containing the mutation resources
        dir: PathBuf,
        /// Last version already applied to the cluster
        #[arg(long)]
        after: Option<u64>,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Show what would be executed without touching the cluster
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
