//! # ops-purge
//!
//! Housekeeping for operations hosts: deletes stale files from configured
//! directories and removes aged, digit-prefixed directory trees from archive
//! roots.
//!
//! ## Overview
//!
//! Two independent engines do the work:
//!
//! - **Retention** ([`retention`]): for every directory listed in the exclude
//!   configuration, delete the regular files that are neither excluded
//!   (literal names or wildcards such as `tf*.env`) nor modified within the
//!   grace period. Subdirectories are never touched.
//! - **Pruning** ([`prune`]): walk each prune root top-down and remove whole
//!   subtrees whose name starts with a digit once they exceed the age
//!   threshold of their prefix class. The root itself is never removed.
//!
//! Both engines return an immutable [`report::ExecutionReport`] per call;
//! commands concatenate them into a single report that is written to stderr
//! and the log file at the end of the run.
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: The `purge`, `prune` and `sweep` subcommands
//! - [`config`]: Loading of the INI-style exclude configuration
//! - [`error`]: Error types and handling with thiserror + miette
//! - [`logging`]: stderr and log-file output of reports
//! - [`report`]: Timestamped, ordered record of everything a run did
//! - [`retention`]: Deletion planning and execution for one directory
//! - [`prune`]: Age-based removal of directory trees
//!
//! ## Usage
//!
//! ```bash
//! # Purge every directory listed in the default configuration
//! ops-purge purge
//!
//! # Purge, then prune the archive roots, in one run
//! ops-purge sweep --root /ops/archives --standard-days 14
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use ops_purge::cli::{Cli, Commands, PurgeArgs};
//! use ops_purge::commands;
//!
//! let cli = Cli::builder()
//!     .config("/ops/scripts/ops_files_purge_exceptions.cfg")
//!     .verbose(1)
//!     .command(Commands::Purge(PurgeArgs::default()))
//!     .build()?;
//!
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Environment Variables
//!
//! - `OPS_PURGE_CONFIG`: Exclude configuration file
//! - `OPS_PURGE_LOG_FILE`: Log file the report is appended to
//! - `OPS_PURGE_VERBOSE`: Enable verbose output
//! - `OPS_PURGE_QUIET`: Silence all output except errors

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod prune;
pub mod report;
pub mod retention;
