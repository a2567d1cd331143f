//! Error types for ops-purge.
//!
//! This module defines all error types used throughout ops-purge, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - Source-level failures ([`PurgeError::ConfigSourceMissing`],
//!   [`PurgeError::ConfigParseError`]) end the purge and make the run exit
//!   with an error
//! - Failures local to one configured directory, one file or one tree node
//!   are recorded in the [`ExecutionReport`](crate::report::ExecutionReport)
//!   and never propagate past the component that produced them
//! - Every variant carries a diagnostic code and, where it helps an operator,
//!   a hint on how to fix it
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ops_purge::error::{PurgeError, Result};
//!
//! fn check_config(path: &Path) -> Result<()> {
//!     if !path.is_file() {
//!         return Err(PurgeError::ConfigSourceMissing(path.to_path_buf()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::report::Severity;

/// Example configuration shown to operators whenever the file is malformed.
pub const SAMPLE_CONFIG: &str = "An example entry in the config file would look like\n  \
                                 [DIRECTORY_PATH]\n  files = [\"1.txt\",\"2.txt\"]";

/// Error types that can occur in ops-purge operations
#[derive(Error, Debug, Diagnostic)]
pub enum PurgeError {
    /// The exclude configuration file does not exist.
    ///
    /// Nothing can be processed without it, so the run ends after the
    /// closing banner is written.
    #[error("Configuration file '{0}' doesn't exist")]
    #[diagnostic(
        code(ops_purge::config::missing),
        help("Create the file or point --config / OPS_PURGE_CONFIG at it.")
    )]
    ConfigSourceMissing(
        /// The path where the configuration file was expected
        PathBuf,
    ),

    /// The configuration file could not be parsed at all.
    #[error("An error occurred when loading '{path}' (line {line}): {message}")]
    #[diagnostic(
        code(ops_purge::config::parse_error),
        help(
            "Each section names a directory and holds a single `files` list, e.g.\n  \
             [/ops/app/logs]\n  files = [\"1.txt\", \"tf*.env\"]"
        )
    )]
    ConfigParseError {
        /// The configuration file being parsed
        path: PathBuf,
        /// 1-based line number of the offending line
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// One configured directory has an invalid entry.
    #[error(transparent)]
    #[diagnostic(transparent)]
    SpecEntry(#[from] SpecEntryError),

    /// A configured directory vanished between loading and planning.
    #[error("Directory path {0} doesn't exist or is not a directory")]
    #[diagnostic(code(ops_purge::plan::directory_missing))]
    DirectoryMissing(PathBuf),

    /// A single file or subtree could not be removed.
    ///
    /// Typical causes are permissions, or the entry being removed by another
    /// process first. Processing continues with the next entry.
    #[error("Failed to delete '{path}'")]
    #[diagnostic(
        code(ops_purge::delete::failed),
        help("Check the permissions of the entry and its parent directory.")
    )]
    EntryDeletion {
        /// The entry that could not be deleted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A node of a pruned tree could not be listed or inspected.
    #[error("Unable to inspect '{path}' while walking the prune root")]
    #[diagnostic(code(ops_purge::prune::walk_error))]
    Walk {
        /// The node that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File system I/O error outside of deletion and walking.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(ops_purge::io_error))]
    Io {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid programmatic configuration (e.g. a builder missing a field).
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(ops_purge::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError(
        /// Description of the configuration error
        String,
    ),
}

/// Rejection of a single configured directory.
///
/// These never abort a run; the entry is skipped and the reason logged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SpecEntryError {
    /// The section's option is not `files`, or the section has no option.
    #[error("Invalid key found for directory path: {directory}. Expected \"files\" found \"{found}\"")]
    #[diagnostic(
        code(ops_purge::config::invalid_key),
        help("Correct the key. Each directory section holds exactly one `files` list.")
    )]
    InvalidKey {
        /// The section (directory) the key belongs to
        directory: String,
        /// The key that was found, empty when the section has none
        found: String,
    },

    /// The `files` value is not a JSON array of strings.
    #[error("Invalid exclude list for {directory}: {message}")]
    #[diagnostic(
        code(ops_purge::config::invalid_pattern_list),
        help("Write the list as JSON, e.g. files = [\"1.txt\", \"tf*.env\"]")
    )]
    InvalidPatternList {
        /// The section (directory) whose list failed to parse
        directory: String,
        /// Parser message
        message: String,
    },

    /// The section names a path that is not an existing directory.
    #[error("Directory path {directory} mentioned in the configuration doesn't exist")]
    #[diagnostic(code(ops_purge::config::missing_directory))]
    MissingDirectory {
        /// The configured path
        directory: String,
    },
}

impl SpecEntryError {
    /// The configured directory this rejection refers to.
    pub fn directory(&self) -> &str {
        match self {
            Self::InvalidKey { directory, .. }
            | Self::InvalidPatternList { directory, .. }
            | Self::MissingDirectory { directory } => directory,
        }
    }

    /// Severity used when the rejection is reported.
    ///
    /// A missing directory is routine on hosts that do not carry every
    /// application, so it is only a warning.
    pub fn entry_severity(&self) -> Severity {
        match self {
            Self::MissingDirectory { .. } => Severity::Warning,
            Self::InvalidKey { .. } | Self::InvalidPatternList { .. } => Severity::Error,
        }
    }
}

/// Render an error together with its immediate cause, for log lines.
pub(crate) fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    match err.source() {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PurgeError>;
