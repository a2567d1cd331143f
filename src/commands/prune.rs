//! Prune command: remove aged directory trees below each root.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::prune::{
    DEFAULT_LONG_LIVED_DAYS, DEFAULT_STANDARD_DAYS, PrefixPolicy, PruneSpec, TreePruner,
};
use crate::report::ExecutionReport;

pub struct Prune<'a> {
    roots: &'a [PathBuf],
    policy: PrefixPolicy,
    now: Option<SystemTime>,
}

pub struct PruneBuilder<'a> {
    roots: &'a [PathBuf],
    long_lived_days: u64,
    standard_days: u64,
    now: Option<SystemTime>,
}

impl Default for PruneBuilder<'_> {
    fn default() -> Self {
        Self {
            roots: &[],
            long_lived_days: DEFAULT_LONG_LIVED_DAYS,
            standard_days: DEFAULT_STANDARD_DAYS,
            now: None,
        }
    }
}

impl<'a> PruneBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(mut self, roots: &'a [PathBuf]) -> Self {
        self.roots = roots;
        self
    }

    pub fn long_lived_days(mut self, days: u64) -> Self {
        self.long_lived_days = days;
        self
    }

    pub fn standard_days(mut self, days: u64) -> Self {
        self.standard_days = days;
        self
    }

    pub fn now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn build(self) -> Prune<'a> {
        Prune {
            roots: self.roots,
            policy: PrefixPolicy::new(self.long_lived_days, self.standard_days),
            now: self.now,
        }
    }
}

impl<'a> Prune<'a> {
    pub fn builder() -> PruneBuilder<'a> {
        PruneBuilder::new()
    }

    /// Prune every root in order, appending all events to `report`.
    ///
    /// Returns the directories that were removed completely.
    pub fn run(&self, report: &mut ExecutionReport) -> Vec<PathBuf> {
        let pruner = match self.now {
            Some(now) => TreePruner::builder().now(now).build(),
            None => TreePruner::builder().build(),
        };

        let mut pruned = Vec::new();
        for root in self.roots {
            let outcome = pruner.prune(&PruneSpec::new(root, self.policy.clone()));
            report.append(outcome.report);
            pruned.extend(outcome.pruned);
        }
        pruned
    }
}
