use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use super::policy::{PrefixClass, PruneSpec};
use crate::error::{PurgeError, describe};
use crate::report::ExecutionReport;
use crate::retention::Elapsed;

/// What the walk did with one directory node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PruneAction {
    /// The root itself, which is never eligible
    SkipRoot,
    /// Keep the node and visit its children
    Descend,
    /// Remove the node with everything beneath it
    Prune,
}

impl fmt::Display for PruneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PruneAction::SkipRoot => "SKIPPED_ROOT",
            PruneAction::Descend => "DESCEND",
            PruneAction::Prune => "PRUNE",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneDecision {
    pub directory_path: PathBuf,
    pub age_in_days: u64,
    pub child_dir_count: usize,
    pub child_file_count: usize,
    pub prefix_class: Option<PrefixClass>,
    pub action: PruneAction,
}

/// Result of pruning one root.
#[derive(Debug, Default)]
pub struct PruneOutcome {
    pub report: ExecutionReport,
    /// Directories removed, in the order they were pruned
    pub pruned: Vec<PathBuf>,
}

/// Walks prune roots top-down and removes aged, digit-prefixed directories.
#[derive(Debug, Clone)]
pub struct TreePruner {
    now: SystemTime,
}

impl Default for TreePruner {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TreePruner {
    /// Creates a new builder for [`TreePruner`]
    pub fn builder() -> TreePrunerBuilder {
        TreePrunerBuilder::default()
    }

    /// Reference time all ages are measured against
    pub fn now(&self) -> SystemTime {
        self.now
    }

    /// Walk `spec.root()` pre-order and prune every strict descendant whose
    /// age exceeds the threshold of its prefix class.
    ///
    /// Children are visited in file-name order. A pruned node is never
    /// descended into, and nodes that cannot be inspected are reported and
    /// skipped together with their subtree.
    pub fn prune(&self, spec: &PruneSpec) -> PruneOutcome {
        let mut outcome = PruneOutcome::default();
        let root = spec.root();

        if !root.is_dir() {
            outcome.report.warning(
                format!("Prune root {} doesn't exist", root.display()),
                Some(root),
            );
            return outcome;
        }

        outcome
            .report
            .info(format!("Pruning directories under {}", root.display()), Some(root));

        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = walker.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    let source = io::Error::from(err);
                    let err = PurgeError::Walk {
                        path: path.clone(),
                        source,
                    };
                    outcome.report.error(describe(&err), Some(&path));
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path().to_path_buf();
            let inspected = modified_at(&path).and_then(|modified| {
                let (dirs, files) = count_children(&path)?;
                Ok((modified, dirs, files))
            });
            let (modified, child_dir_count, child_file_count) = match inspected {
                Ok(inspected) => inspected,
                Err(source) => {
                    if entry.depth() > 0 {
                        walker.skip_current_dir();
                    }
                    let err = PurgeError::Walk {
                        path: path.clone(),
                        source,
                    };
                    outcome.report.error(describe(&err), Some(&path));
                    if entry.depth() == 0 {
                        return outcome;
                    }
                    continue;
                }
            };

            let age_in_days = Elapsed::between(modified, self.now).days;
            let mut decision = PruneDecision {
                directory_path: path.clone(),
                age_in_days,
                child_dir_count,
                child_file_count,
                prefix_class: None,
                action: PruneAction::Descend,
            };

            if entry.depth() == 0 {
                decision.action = PruneAction::SkipRoot;
                outcome.report.prune(
                    decision,
                    format!(
                        "{} is the prune root with {child_dir_count} directories and \
                         {child_file_count} files, probing subdirectories",
                        path.display()
                    ),
                );
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let Some((class, threshold)) = spec.policy().classify(&name) else {
                outcome.report.prune(
                    decision,
                    format!(
                        "{} does not start with a digit, probing subdirectories",
                        path.display()
                    ),
                );
                continue;
            };
            decision.prefix_class = Some(class);

            if age_in_days <= threshold {
                outcome.report.prune(
                    decision,
                    format!(
                        "{} is {age_in_days} days old, not older than {threshold} days. Not old \
                         enough, will probe subdirectories",
                        path.display()
                    ),
                );
                continue;
            }

            // Release the walker's handle on the node before removing it
            walker.skip_current_dir();
            decision.action = PruneAction::Prune;
            outcome.report.prune(
                decision,
                format!(
                    "Deleting {} ({age_in_days} days old, {class} threshold {threshold} days) \
                     with {child_dir_count} directories and {child_file_count} files",
                    path.display()
                ),
            );

            let failures = remove_tree(&path);
            if failures.is_empty() {
                outcome.pruned.push(path);
            } else {
                for (failed, source) in failures {
                    let err = PurgeError::EntryDeletion {
                        path: failed.clone(),
                        source,
                    };
                    outcome.report.error(describe(&err), Some(&failed));
                }
            }
        }

        if !outcome.pruned.is_empty() {
            let pruned: Vec<_> = outcome
                .pruned
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            outcome.report.info(
                format!("The following directories were deleted in this execution: {pruned:?}"),
                Some(root),
            );
        }

        outcome
    }
}

/// Builder for [`TreePruner`]
#[derive(Debug, Clone, Default)]
pub struct TreePrunerBuilder {
    now: Option<SystemTime>,
}

impl TreePrunerBuilder {
    /// Pin the reference time (default: the time `build` is called)
    pub fn now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn build(self) -> TreePruner {
        TreePruner {
            now: self.now.unwrap_or_else(SystemTime::now),
        }
    }
}

fn modified_at(path: &Path) -> io::Result<SystemTime> {
    fs::symlink_metadata(path)?.modified()
}

/// Count the immediate subdirectories and files of `path`.
fn count_children(path: &Path) -> io::Result<(usize, usize)> {
    let mut dirs = 0;
    let mut files = 0;
    for entry in fs::read_dir(path)? {
        if entry?.file_type()?.is_dir() {
            dirs += 1;
        } else {
            files += 1;
        }
    }
    Ok((dirs, files))
}

/// Remove `path` and everything beneath it, carrying on past failures.
///
/// Returns the entries that could not be removed. Entries that disappeared
/// on their own are not failures.
fn remove_tree(path: &Path) -> Vec<(PathBuf, io::Error)> {
    if fs::remove_dir_all(path).is_ok() {
        return Vec::new();
    }

    let mut failures = Vec::new();
    for entry in WalkDir::new(path).contents_first(true) {
        let result = match entry {
            Ok(entry) if entry.file_type().is_dir() => fs::remove_dir(entry.path())
                .map_err(|err| (entry.path().to_path_buf(), err)),
            Ok(entry) => {
                fs::remove_file(entry.path()).map_err(|err| (entry.path().to_path_buf(), err))
            }
            Err(err) => {
                let failed = err.path().unwrap_or(path).to_path_buf();
                Err((failed, io::Error::from(err)))
            }
        };
        if let Err((failed, err)) = result
            && err.kind() != io::ErrorKind::NotFound
        {
            failures.push((failed, err));
        }
    }
    failures
}
