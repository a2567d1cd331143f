//! Command-line interface definitions for ops-purge.
//!
//! This module defines the CLI structure using clap, including all subcommands
//! and their arguments. The main entry point is the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use ops_purge::cli::{Cli, Commands};
//!
//! // Parse command-line arguments
//! let cli = Cli::parse_args();
//!
//! // Access the parsed command
//! match cli.command() {
//!     Commands::Purge(args) => println!("Grace period: {}h", args.grace_hours),
//!     Commands::Prune(args) => println!("Pruning {:?}", args.roots),
//!     Commands::Sweep { .. } => println!("Purging and pruning"),
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::error::{PurgeError, Result};
use crate::prune::{DEFAULT_LONG_LIVED_DAYS, DEFAULT_PRUNE_ROOTS, DEFAULT_STANDARD_DAYS};
use crate::retention::DEFAULT_GRACE_HOURS;


/// Default log file, appended to on every run.
pub const DEFAULT_LOG_FILE: &str = "/tmp/ops_files_purge.log";

/// Main command-line interface for ops-purge.
///
/// This struct represents the top-level CLI configuration, containing both
/// global options that apply to all commands and the specific subcommand
/// to execute.
#[derive(Parser)]
#[command(
    name = "ops-purge",
    bin_name = "ops-purge",
    author,
    version,
    about = "Delete stale files and aged directory trees on ops hosts",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Global options that apply to all ops-purge commands.
#[derive(Parser)]
pub struct GlobalOpts {
    /// Path to the exclude configuration file
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CONFIG_PATH,
        env = "OPS_PURGE_CONFIG"
    )]
    config: PathBuf,

    /// File the run report is appended to
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_LOG_FILE,
        env = "OPS_PURGE_LOG_FILE"
    )]
    log_file: Option<PathBuf>,

    /// Do not write a log file, only report on stderr
    #[arg(long, global = true, env = "OPS_PURGE_NO_LOG_FILE")]
    no_log_file: bool,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = ArgAction::Count, env = "OPS_PURGE_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "OPS_PURGE_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Create a new builder for constructing `GlobalOpts` programmatically.
    pub fn builder() -> GlobalOptsBuilder {
        GlobalOptsBuilder::default()
    }

    /// Get the absolute configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        normalize_path(self.config())
    }

    /// Get the absolute log file path, `None` when file logging is off
    pub fn get_log_file(&self) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        self.log_file().map(normalize_path)
    }

    /// Get the configuration file path as given
    pub fn config(&self) -> &Path {
        &self.config
    }

    /// Get the log file option as given
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Builder for constructing `GlobalOpts` programmatically.
///
/// Unlike command-line parsing, the builder does not write a log file unless
/// one is set explicitly.
#[derive(Default)]
pub struct GlobalOptsBuilder {
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
}

impl GlobalOptsBuilder {
    /// Set the configuration file path.
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// Set the log file path.
    pub fn log_file(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.log_file = path.map(|p| p.into());
        self
    }

    /// Set the verbosity level (0 = normal, 1+ = verbose).
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the `GlobalOpts` instance with the configured values.
    pub fn build(self) -> GlobalOpts {
        GlobalOpts {
            config: self
                .config
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            no_log_file: self.log_file.is_none(),
            log_file: self.log_file,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Parse the process arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    /// Set the configuration file
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// Set the log file
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the command
    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let command = self
            .command
            .ok_or_else(|| PurgeError::ConfigError("Command is required".to_string()))?;

        let mut global_opts = GlobalOpts::builder()
            .log_file(self.log_file)
            .verbose(self.verbose)
            .quiet(self.quiet);
        if let Some(config) = self.config {
            global_opts = global_opts.config(config);
        }

        Ok(Cli {
            global_opts: global_opts.build(),
            command,
        })
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks (preserves user intent)
/// - Does NOT require the path to exist
pub(crate) fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    use std::path::Component;

    let path = path.as_ref();

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                if matches!(components.last(), Some(Component::RootDir)) {
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}

/// Options for purging configured directories.
#[derive(Debug, Clone, Args)]
pub struct PurgeArgs {
    /// Files modified within this many hours are never deleted
    #[arg(long, default_value_t = DEFAULT_GRACE_HOURS, env = "OPS_PURGE_GRACE_HOURS")]
    pub grace_hours: u64,

    /// Purge directories whose exclude list is empty (anything older than the
    /// grace period is deleted). Set to false to skip such directories.
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        env = "OPS_PURGE_CONFIRM_EMPTY_EXCLUDES"
    )]
    pub confirm_empty_excludes: bool,
}

impl Default for PurgeArgs {
    fn default() -> Self {
        Self {
            grace_hours: DEFAULT_GRACE_HOURS,
            confirm_empty_excludes: true,
        }
    }
}

/// Options for pruning aged directory trees.
#[derive(Debug, Clone, Args)]
pub struct PruneArgs {
    /// Directory whose descendants are pruned (repeatable)
    #[arg(
        long = "root",
        value_name = "PATH",
        default_values = DEFAULT_PRUNE_ROOTS.iter().copied(),
        env = "OPS_PURGE_PRUNE_ROOTS",
        value_delimiter = ','
    )]
    pub roots: Vec<PathBuf>,

    /// Age in days after which directories starting with 3 or 4 are pruned
    #[arg(long, default_value_t = DEFAULT_LONG_LIVED_DAYS, env = "OPS_PURGE_LONG_LIVED_DAYS")]
    pub long_lived_days: u64,

    /// Age in days after which directories starting with any other digit are
    /// pruned
    #[arg(long, default_value_t = DEFAULT_STANDARD_DAYS, env = "OPS_PURGE_STANDARD_DAYS")]
    pub standard_days: u64,
}

impl PruneArgs {
    /// Get the prune roots as absolute paths
    pub fn get_roots(&self) -> Vec<PathBuf> {
        self.roots.iter().map(normalize_path).collect()
    }
}

impl Default for PruneArgs {
    fn default() -> Self {
        Self {
            roots: DEFAULT_PRUNE_ROOTS.iter().map(PathBuf::from).collect(),
            long_lived_days: DEFAULT_LONG_LIVED_DAYS,
            standard_days: DEFAULT_STANDARD_DAYS,
        }
    }
}

/// Available ops-purge subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Delete stale files from every configured directory
    ///
    /// For each `[DIRECTORY]` section of the configuration, deletes the
    /// regular files that are not in its `files` exclude list (wildcards
    /// such as `tf*.env` are expanded) and were not modified within the
    /// grace period. Subdirectories are left alone.
    Purge(PurgeArgs),

    /// Remove aged directory trees below the prune roots
    ///
    /// Walks each root top-down. A directory whose name starts with 3 or 4
    /// is removed once older than --long-lived-days, one starting with any
    /// other digit once older than --standard-days. Other directories are
    /// kept and searched. The roots themselves are never removed.
    Prune(PruneArgs),

    /// Purge, then prune, in a single run with a single report
    Sweep {
        #[command(flatten)]
        purge: PurgeArgs,

        #[command(flatten)]
        prune: PruneArgs,
    },
}
