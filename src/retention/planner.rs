use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::age::Elapsed;
use super::pattern::{self, Expansion};
use crate::error::{PurgeError, Result, describe};
use crate::report::{ExecutionReport, Severity};

/// Files modified within this many hours are never deleted.
pub const DEFAULT_GRACE_HOURS: u64 = 48;

/// One configured directory and the names that must survive in it.
///
/// An empty pattern set is meaningful: every entry of the directory becomes a
/// candidate and only the grace period protects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionSpec {
    directory: PathBuf,
    exclude_patterns: BTreeSet<String>,
}

impl RetentionSpec {
    pub fn new<I, S>(directory: impl Into<PathBuf>, exclude_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directory: directory.into(),
            exclude_patterns: exclude_patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn exclude_patterns(&self) -> &BTreeSet<String> {
        &self.exclude_patterns
    }
}

/// An immediate child of a configured directory, as seen at planning time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// File name, lossily decoded for matching and reporting
    pub name: String,
    pub full_path: PathBuf,
    /// Whether the entry is a regular file (symlinks are followed)
    pub is_file: bool,
    pub modified_at: SystemTime,
}

/// What to do with one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Delete,
    SkipTooYoung,
    SkipIsDirectory,
    SkipExcluded,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Delete => "DELETE",
            Action::SkipTooYoung => "SKIP_TOO_YOUNG",
            Action::SkipIsDirectory => "SKIP_IS_DIRECTORY",
            Action::SkipExcluded => "SKIP_EXCLUDED",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionDecision {
    pub entry: DirectoryEntry,
    pub action: Action,
    pub reason: String,
}

/// Whether a plan may be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Ready,
    /// The exclude list was empty and purging such directories was not
    /// confirmed; the plan holds no decisions.
    EmptyExcludesRefused,
}

/// Decisions for one configured directory, sorted by entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    directory: PathBuf,
    status: PlanStatus,
    empty_excludes: bool,
    grace_hours: u64,
    decisions: Vec<DeletionDecision>,
    candidates: usize,
    invalid_patterns: Vec<(String, String)>,
    unreadable: Vec<(PathBuf, String)>,
}

impl Plan {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// True when the spec had no exclude patterns at all.
    pub fn empty_excludes(&self) -> bool {
        self.empty_excludes
    }

    pub fn decisions(&self) -> &[DeletionDecision] {
        &self.decisions
    }

    /// Decision for the entry called `name`, if it was planned.
    pub fn decision_for(&self, name: &str) -> Option<&DeletionDecision> {
        self.decisions.iter().find(|d| d.entry.name == name)
    }

    /// Number of entries left after removing the expanded exclude set.
    pub fn candidate_count(&self) -> usize {
        self.candidates
    }

    /// Wildcard patterns that could not be compiled.
    pub fn invalid_patterns(&self) -> &[(String, String)] {
        &self.invalid_patterns
    }

    /// Entries that could not be inspected while enumerating.
    pub fn unreadable(&self) -> &[(PathBuf, String)] {
        &self.unreadable
    }
}

/// Computes and carries out file deletions for configured directories.
#[derive(Debug, Clone)]
pub struct RetentionPlanner {
    grace_hours: u64,
    allow_empty_excludes: bool,
    now: SystemTime,
}

impl Default for RetentionPlanner {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetentionPlanner {
    /// Creates a new builder for [`RetentionPlanner`]
    pub fn builder() -> RetentionPlannerBuilder {
        RetentionPlannerBuilder::default()
    }

    pub fn grace_hours(&self) -> u64 {
        self.grace_hours
    }

    pub fn allow_empty_excludes(&self) -> bool {
        self.allow_empty_excludes
    }

    /// Reference time all ages are measured against
    pub fn now(&self) -> SystemTime {
        self.now
    }

    /// Plan the deletions for one directory without touching it.
    ///
    /// Only the immediate children of the directory are considered. Entries
    /// are sorted by name so repeated plans over an unchanged directory are
    /// identical.
    ///
    /// # Errors
    ///
    /// Returns [`PurgeError::DirectoryMissing`] when the configured path is
    /// not an existing directory, and [`PurgeError::Io`] when it cannot be
    /// listed.
    pub fn plan(&self, spec: &RetentionSpec) -> Result<Plan> {
        let directory = spec.directory();
        if !directory.is_dir() {
            return Err(PurgeError::DirectoryMissing(directory.to_path_buf()));
        }

        let empty_excludes = spec.exclude_patterns().is_empty();
        let mut plan = Plan {
            directory: directory.to_path_buf(),
            status: PlanStatus::Ready,
            empty_excludes,
            grace_hours: self.grace_hours,
            decisions: Vec::new(),
            candidates: 0,
            invalid_patterns: Vec::new(),
            unreadable: Vec::new(),
        };

        if empty_excludes && !self.allow_empty_excludes {
            plan.status = PlanStatus::EmptyExcludesRefused;
            return Ok(plan);
        }

        let (entries, unreadable) = enumerate(directory)?;
        plan.unreadable = unreadable;

        let names: BTreeSet<String> = entries.values().map(|e| e.name.clone()).collect();
        let Expansion { names: excluded, invalid } =
            pattern::expand(spec.exclude_patterns(), &names);
        plan.invalid_patterns = invalid;
        plan.candidates = entries
            .values()
            .filter(|e| !excluded.contains(&e.name))
            .count();

        plan.decisions = entries
            .into_values()
            .map(|entry| self.decide(entry, &excluded))
            .collect();

        Ok(plan)
    }

    /// Decide the fate of one entry.
    ///
    /// Recency is checked first: a file inside the grace period is reported
    /// as too young whether or not it is also excluded.
    fn decide(&self, entry: DirectoryEntry, excluded: &BTreeSet<String>) -> DeletionDecision {
        let path = entry.full_path.display().to_string();
        let hours = Elapsed::between(entry.modified_at, self.now).hours;

        let (action, reason) = if entry.is_file && hours <= self.grace_hours {
            (
                Action::SkipTooYoung,
                format!(
                    "File {path} was modified in the last {} hours. Hence its not being deleted",
                    self.grace_hours
                ),
            )
        } else if excluded.contains(&entry.name) {
            (
                Action::SkipExcluded,
                format!("{path} is in the exclude list. Hence not deleted"),
            )
        } else if !entry.is_file {
            (
                Action::SkipIsDirectory,
                format!("{path} is a directory. Hence not deleted"),
            )
        } else {
            (
                Action::Delete,
                format!("File {path} was last modified {hours} hours ago"),
            )
        };

        DeletionDecision {
            entry,
            action,
            reason,
        }
    }

    /// Carry out a plan and describe what happened.
    ///
    /// A file that cannot be removed is reported and the remaining decisions
    /// are still executed.
    pub fn execute(&self, plan: Plan) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        let directory = plan.directory.clone();
        let dir = Some(directory.as_path());

        report.info(format!("Processing :  {}", directory.display()), dir);

        if plan.empty_excludes {
            match plan.status {
                PlanStatus::Ready => report.warning(
                    format!(
                        "No files included in the exclude list for directory {}. Any files not \
                         modified in the last {} hours in this directory will be deleted.",
                        directory.display(),
                        plan.grace_hours
                    ),
                    dir,
                ),
                PlanStatus::EmptyExcludesRefused => {
                    report.warning(
                        format!(
                            "No files included in the exclude list for directory {}. Purging \
                             directories without an exclude list is not confirmed, skipping.",
                            directory.display()
                        ),
                        dir,
                    );
                    return report;
                }
            }
        }

        for (pattern, message) in &plan.invalid_patterns {
            report.warning(
                format!(
                    "Exclude pattern {pattern:?} is not a valid wildcard ({message}); treating \
                     it as a literal name"
                ),
                dir,
            );
        }

        for (path, message) in &plan.unreadable {
            report.error(
                format!("Unable to inspect {}: {message}", path.display()),
                Some(path),
            );
        }

        if plan.candidate_count() == 0 {
            for decision in plan.decisions {
                let message = decision.reason.clone();
                report.deletion(Severity::Info, decision, message);
            }
            report.info(format!("No files to delete in {}", directory.display()), dir);
            snapshot(&mut report, &directory);
            return report;
        }

        let mut deleted = Vec::new();
        for decision in plan.decisions {
            if decision.action != Action::Delete {
                let message = decision.reason.clone();
                report.deletion(Severity::Info, decision, message);
                continue;
            }

            let path = decision.entry.full_path.clone();
            match fs::remove_file(&path) {
                Ok(()) => {
                    report.deletion(
                        Severity::Info,
                        decision,
                        format!("Deleted file {}", path.display()),
                    );
                    deleted.push(path.display().to_string());
                }
                Err(source) => {
                    let err = PurgeError::EntryDeletion { path, source };
                    report.deletion(Severity::Error, decision, describe(&err));
                }
            }
        }

        if !deleted.is_empty() {
            report.info(
                format!("The following files were deleted in this execution: {deleted:?}"),
                dir,
            );
        }
        snapshot(&mut report, &directory);

        report
    }

    /// Plan and execute one spec, reporting a missing directory as a warning.
    pub fn process(&self, spec: &RetentionSpec) -> ExecutionReport {
        match self.plan(spec) {
            Ok(plan) => self.execute(plan),
            Err(err @ PurgeError::DirectoryMissing(_)) => {
                let mut report = ExecutionReport::new();
                report.warning(err.to_string(), Some(spec.directory()));
                report
            }
            Err(err) => {
                let mut report = ExecutionReport::new();
                report.error(describe(&err), Some(spec.directory()));
                report
            }
        }
    }
}

/// Builder for [`RetentionPlanner`]
#[derive(Debug, Clone)]
pub struct RetentionPlannerBuilder {
    grace_hours: u64,
    allow_empty_excludes: bool,
    now: Option<SystemTime>,
}

impl Default for RetentionPlannerBuilder {
    fn default() -> Self {
        Self {
            grace_hours: DEFAULT_GRACE_HOURS,
            allow_empty_excludes: true,
            now: None,
        }
    }
}

impl RetentionPlannerBuilder {
    /// Set the grace period in hours (default: 48)
    pub fn grace_hours(mut self, hours: u64) -> Self {
        self.grace_hours = hours;
        self
    }

    /// Allow purging directories whose exclude list is empty (default: true)
    pub fn allow_empty_excludes(mut self, allow: bool) -> Self {
        self.allow_empty_excludes = allow;
        self
    }

    /// Pin the reference time (default: the time `build` is called)
    pub fn now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn build(self) -> RetentionPlanner {
        RetentionPlanner {
            grace_hours: self.grace_hours,
            allow_empty_excludes: self.allow_empty_excludes,
            now: self.now.unwrap_or_else(SystemTime::now),
        }
    }
}

type Enumerated = (BTreeMap<OsString, DirectoryEntry>, Vec<(PathBuf, String)>);

/// List the immediate children of `directory`, keyed and sorted by their raw
/// file name so names that are not valid UTF-8 never collide.
fn enumerate(directory: &Path) -> Result<Enumerated> {
    let mut entries = BTreeMap::new();
    let mut unreadable = Vec::new();

    let read_dir = fs::read_dir(directory).map_err(|source| PurgeError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    for entry in read_dir {
        let entry = entry.map_err(|source| PurgeError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        let full_path = entry.path();
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy().into_owned();

        // Follow symlinks; a dangling link is inspected as the link itself
        let metadata = match fs::metadata(&full_path).or_else(|_| entry.metadata()) {
            Ok(metadata) => metadata,
            Err(err) => {
                unreadable.push((full_path, err.to_string()));
                continue;
            }
        };
        let modified_at = match metadata.modified() {
            Ok(modified) => modified,
            Err(err) => {
                unreadable.push((full_path, err.to_string()));
                continue;
            }
        };

        entries.insert(
            file_name,
            DirectoryEntry {
                name,
                full_path,
                is_file: metadata.is_file(),
                modified_at,
            },
        );
    }

    Ok((entries, unreadable))
}

fn snapshot(report: &mut ExecutionReport, directory: &Path) {
    match fs::read_dir(directory) {
        Ok(read_dir) => {
            let mut names: Vec<String> = read_dir
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            report.snapshot(directory, names);
        }
        Err(source) => {
            let err = PurgeError::Io {
                path: directory.to_path_buf(),
                source,
            };
            report.error(describe(&err), Some(directory));
        }
    }
}

