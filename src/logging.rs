use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::{PurgeError, Result};
use crate::report::{ExecutionReport, Record, ReportEntry, Severity};

const SEPARATOR_WIDTH: usize = 100;

/// Writes finished reports to stderr and, optionally, a log
/// file.
///
/// stderr honours `--verbose`/`--quiet` (errors are shown even when quiet);
/// the log file receives every report entry.
#[derive(Clone, Debug)]
pub struct Logger {
    verbose: u8,
    quiet: bool,
    log_file: Option<PathBuf>,
}

impl Logger {
    pub fn new(verbose: u8, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            log_file: None,
        }
    }

    /// Also append every report entry to `path`.
    pub fn with_log_file(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.log_file = path.map(Into::into);
        self
    }

    /// Whether `entry` is shown on stderr at the current verbosity.
    pub fn shows(&self, entry: &ReportEntry) -> bool {
        match entry.severity {
            Severity::Error => true,
            _ if self.quiet => false,
            Severity::Warning => true,
            Severity::Info => match entry.record {
                Record::Snapshot(_) => self.verbose >= 1,
                Record::Deletion(_) | Record::Prune(_) => self.verbose >= 1,
                Record::Banner(_) | Record::Event => true,
            },
        }
    }

    /// Emit a finished report.
    ///
    /// # Errors
    ///
    /// Returns [`PurgeError::Io`] if the log file cannot be opened or
    /// written.
    pub fn write_report(&self, report: &ExecutionReport) -> Result<()> {
        for entry in report.entries() {
            if self.shows(entry) {
                eprintln!("{}", render_message(entry));
            }
        }

        let Some(path) = self.log_file.as_deref() else {
            return Ok(());
        };
        let io_error = |source| PurgeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        for entry in report.entries() {
            writeln!(writer, "{}", render_line(entry)).map_err(io_error)?;
        }
        writer.flush().map_err(io_error)
    }
}

/// Short stderr form of an entry.
fn render_message(entry: &ReportEntry) -> String {
    match entry.severity {
        Severity::Info => entry.message.clone(),
        Severity::Warning => format!("Warning: {}", entry.message),
        Severity::Error => format!("Error: {}", entry.message),
    }
}

/// Log-file form of an entry: `<timestamp> - <LEVEL> - <message>`.
///
/// Banners are framed by separator lines.
pub fn render_line(entry: &ReportEntry) -> String {
    let line = format!(
        "{} - {} - {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
        entry.severity,
        entry.message
    );
    if !matches!(entry.record, Record::Banner(_)) {
        return line;
    }

    let separator = format!(
        "{} - {} - {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
        entry.severity,
        "=".repeat(SEPARATOR_WIDTH)
    );
    format!("{separator}\n{line}\n{separator}")
}
