//! Append-only record of everything a run decided and did.
//!
//! Planners and the pruner each return their own [`ExecutionReport`]; the
//! command layer concatenates them in processing order and hands the result
//! to the [`Logger`](crate::logging::Logger) once the run is over. Nothing in
//! the engine reads a report back to make a decision.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::prune::PruneDecision;
use crate::retention::DeletionDecision;

/// Severity of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        })
    }
}

/// Opening or closing bracket of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Begin,
    End,
}

/// What kind of fact a report entry carries.
#[derive(Debug, Clone)]
pub enum Record {
    /// Begin/end marker of a run
    Banner(Banner),
    /// Free-form narration, warning or error
    Event,
    /// Outcome of a planned file decision
    Deletion(DeletionDecision),
    /// Classification of one directory node during a prune walk
    Prune(PruneDecision),
    /// Entry names of a directory after it was processed
    Snapshot(Vec<String>),
}

/// A single timestamped line of the report.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
    pub path: Option<PathBuf>,
    pub record: Record,
}

/// Ordered, append-only sequence of report entries.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    entries: Vec<ReportEntry>,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        path: Option<&Path>,
        record: Record,
    ) {
        self.entries.push(ReportEntry {
            timestamp: Local::now(),
            severity,
            message: message.into(),
            path: path.map(Path::to_path_buf),
            record,
        });
    }

    /// Append a begin or end marker stamped with the current time.
    pub fn banner(&mut self, banner: Banner) {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        let message = match banner {
            Banner::Begin => format!("Log for operations performed on {now}"),
            Banner::End => format!("End of operations performed on {now}"),
        };
        self.push(Severity::Info, message, None, Record::Banner(banner));
    }

    pub fn info(&mut self, message: impl Into<String>, path: Option<&Path>) {
        self.push(Severity::Info, message, path, Record::Event);
    }

    pub fn warning(&mut self, message: impl Into<String>, path: Option<&Path>) {
        self.push(Severity::Warning, message, path, Record::Event);
    }

    pub fn error(&mut self, message: impl Into<String>, path: Option<&Path>) {
        self.push(Severity::Error, message, path, Record::Event);
    }

    /// Append an event with a caller-chosen severity.
    pub fn event(&mut self, severity: Severity, message: impl Into<String>, path: Option<&Path>) {
        self.push(severity, message, path, Record::Event);
    }

    /// Record the outcome of a planned file decision.
    ///
    /// A decision whose deletion failed is recorded at [`Severity::Error`].
    pub fn deletion(
        &mut self,
        severity: Severity,
        decision: DeletionDecision,
        message: impl Into<String>,
    ) {
        let path = decision.entry.full_path.clone();
        self.push(
            severity,
            message,
            Some(&path),
            Record::Deletion(decision),
        );
    }

    pub fn prune(&mut self, decision: PruneDecision, message: impl Into<String>) {
        let path = decision.directory_path.clone();
        self.push(Severity::Info, message, Some(&path), Record::Prune(decision));
    }

    /// Record the entries of `directory` as they are after processing.
    pub fn snapshot(&mut self, directory: &Path, names: Vec<String>) {
        let message = format!(
            "Current files/directories in directory : {} are {:?}",
            directory.display(),
            names
        );
        self.push(
            Severity::Info,
            message,
            Some(directory),
            Record::Snapshot(names),
        );
    }

    /// Move every entry of `other` to the end of this report.
    pub fn append(&mut self, mut other: ExecutionReport) {
        self.entries.append(&mut other.entries);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File decisions in the order they were recorded.
    pub fn deletions(&self) -> impl Iterator<Item = &DeletionDecision> {
        self.entries.iter().filter_map(|entry| match &entry.record {
            Record::Deletion(decision) => Some(decision),
            _ => None,
        })
    }

    /// Prune-walk decisions in visiting order.
    pub fn prunes(&self) -> impl Iterator<Item = &PruneDecision> {
        self.entries.iter().filter_map(|entry| match &entry.record {
            Record::Prune(decision) => Some(decision),
            _ => None,
        })
    }

    /// Number of entries at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut report = ExecutionReport::new();
        report.banner(Banner::Begin);
        report.warning("first", Some(Path::new("/d")));
        report.error("second", None);
        report.banner(Banner::End);

        let kinds: Vec<_> = report.entries().iter().map(|e| e.severity).collect();
        assert_eq!(
            kinds,
            vec![
                Severity::Info,
                Severity::Warning,
                Severity::Error,
                Severity::Info
            ]
        );
        assert!(matches!(
            report.entries()[0].record,
            Record::Banner(Banner::Begin)
        ));
        assert!(matches!(
            report.entries()[3].record,
            Record::Banner(Banner::End)
        ));
        assert_eq!(report.entries()[1].path.as_deref(), Some(Path::new("/d")));
        assert!(report.has_errors());
    }

    #[test]
    fn test_append_concatenates() {
        let mut first = ExecutionReport::new();
        first.info("a", None);
        let mut second = ExecutionReport::new();
        second.info("b", None);
        second.warning("c", None);

        first.append(second);
        let messages: Vec<_> = first.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert_eq!(first.count(Severity::Warning), 1);
        assert!(!first.has_errors());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }
}
