//! Command-line interface for verdiff
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lock::{FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::output::OutputOptions;
use crate::shell::{Shell, ShellConfig};

mod fetch_pr;
mod init;
mod make;
mod push;
mod versions;

/// verdiff - PR version snapshots and interdiffs
///
/// Records immutable (base, head) snapshots of a pull request as refs in a
/// scratch git repository and synthesizes interdiff commits between
/// consecutive snapshots.
#[derive(Parser, Debug)]
#[command(name = "verdiff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the scratch work repository
    #[arg(long, global = true, env = "VERDIFF_SCRATCH")]
    pub scratch: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "VERDIFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create and populate a scratch work repository
    Init {
        /// Origin URL (may embed a short-lived credential)
        #[arg(long)]
        origin: Option<String>,
    },

    /// Fetch a PR's current head from origin and print its sha
    FetchPr {
        /// PR number
        pr: u64,
    },

    /// List the stored versions of a PR
    Versions {
        /// PR number
        pr: u64,
    },

    /// Record the next version of a PR and synthesize its interdiff
    Make {
        /// PR number
        pr: u64,

        /// Sha the PR is proposed against
        #[arg(long)]
        base: String,

        /// PR tip sha; defaults to the head fetched from origin
        #[arg(long)]
        head: Option<String>,
    },

    /// Force-push version refs to origin
    Push {
        /// PR number
        pr: u64,

        /// Version numbers to push
        #[arg(required = true)]
        versions: Vec<u32>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let config = Config::load_or_default(self.config.as_deref())?;
        let scratch = scratch_dir(&config, self.scratch);

        match self.command {
            Commands::Init { origin } => init::run(&config, &scratch, origin, options),
            Commands::FetchPr { pr } => fetch_pr::run(&scratch, pr, options),
            Commands::Versions { pr } => versions::run(&scratch, pr, options),
            Commands::Make { pr, base, head } => make::run(&scratch, pr, base, head, options),
            Commands::Push { pr, versions } => push::run(&scratch, pr, versions, options),
        }
    }
}

fn scratch_dir(config: &Config, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| config.scratch_root.join("work"))
}

/// An opened scratch repository: a shell bound to its directory plus the
/// exclusive lock that keeps concurrent invocations off it.
#[derive(Debug)]
pub(crate) struct WorkContext {
    pub shell: Shell,
    _lock: FileLock,
}

/// Lock and open an existing scratch repository.
pub(crate) fn open_work_repo(scratch: &Path) -> Result<WorkContext> {
    if !scratch.join(".git").is_dir() {
        return Err(Error::InvalidArgument(format!(
            "scratch repository not found: {} (run `verdiff init` first)",
            scratch.display()
        )));
    }
    work_context(scratch)
}

/// Lock a scratch directory and build its shell. The lock file lives next
/// to the directory so it never shows up in porcelain status.
pub(crate) fn work_context(scratch: &Path) -> Result<WorkContext> {
    let lock = FileLock::acquire(&lock_path(scratch), DEFAULT_LOCK_TIMEOUT_MS)?;

    let mut shell_config = ShellConfig::new(scratch.to_path_buf());
    // Bot context: never prompt for credentials.
    shell_config
        .env
        .push(("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()));

    Ok(WorkContext {
        shell: Shell::new(shell_config),
        _lock: lock,
    })
}

fn lock_path(scratch: &Path) -> PathBuf {
    let name = scratch
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "work".to_string());
    scratch.with_file_name(format!("{name}.lock"))
}
