//! Command-line interface for weft
//!
//! The `weft` binary is a thin companion to the library: it loads the
//! project manifest, runs the dependency resolver, and visualizes the
//! result.
//!
//! # Commands
//!
//! - `tree` - resolve a module's dependency graph and display it
//!
//! # Global Options
//!
//! - `--verbose` - enable debug output
//! - `--quiet` - suppress all log output
//! - `--manifest-path <PATH>` - use an explicit weft.toml instead of
//!   searching parent directories
//!
//! # Examples
//!
//! ```bash
//! # Dependency tree of the frontend entrypoint
//! weft tree frontend/entrypoint.ts
//!
//! # JSON output for scripting
//! weft tree frontend/entrypoint.ts --format json
//!
//! # Only the first two levels
//! weft tree frontend/entrypoint.ts --depth 2
//! ```

pub mod tree;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::tree::TreeCommand;

/// Main CLI structure for the weft binary.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about = "Fullstack web UI framework toolkit", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the manifest file (weft.toml)
    #[arg(long, global = true, env = "WEFT_MANIFEST_PATH")]
    manifest_path: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display the dependency tree of a module
    Tree(TreeCommand),
}

impl Cli {
    /// Executes the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to display.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Tree(cmd) => cmd.execute(self.manifest_path).await,
        }
    }

    fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
