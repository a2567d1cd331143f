//! Sweep command (purge + prune).

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::commands::prune::Prune;
use crate::commands::purge::Purge;
use crate::error::{PurgeError, Result};
use crate::prune::{DEFAULT_LONG_LIVED_DAYS, DEFAULT_STANDARD_DAYS};
use crate::report::ExecutionReport;
use crate::retention::DEFAULT_GRACE_HOURS;

pub struct Sweep<'a> {
    config_path: &'a Path,
    grace_hours: u64,
    confirm_empty_excludes: bool,
    roots: &'a [PathBuf],
    long_lived_days: u64,
    standard_days: u64,
    now: Option<SystemTime>,
}

pub struct SweepBuilder<'a> {
    config_path: Option<&'a Path>,
    grace_hours: u64,
    confirm_empty_excludes: bool,
    roots: &'a [PathBuf],
    long_lived_days: u64,
    standard_days: u64,
    now: Option<SystemTime>,
}

impl Default for SweepBuilder<'_> {
    fn default() -> Self {
        Self {
            config_path: None,
            grace_hours: DEFAULT_GRACE_HOURS,
            confirm_empty_excludes: true,
            roots: &[],
            long_lived_days: DEFAULT_LONG_LIVED_DAYS,
            standard_days: DEFAULT_STANDARD_DAYS,
            now: None,
        }
    }
}

impl<'a> Sweep<'a> {
    pub fn builder() -> SweepBuilder<'a> {
        SweepBuilder::new()
    }

    /// Purge the configured directories, then prune the roots.
    ///
    /// The prune roots do not depend on the configuration, so they are
    /// pruned even when the configuration cannot be loaded; that error is
    /// returned once both phases are done.
    pub fn run(self, report: &mut ExecutionReport) -> Result<()> {
        let mut purge = Purge::builder()
            .config_path(self.config_path)
            .grace_hours(self.grace_hours)
            .confirm_empty_excludes(self.confirm_empty_excludes);
        let mut prune = Prune::builder()
            .roots(self.roots)
            .long_lived_days(self.long_lived_days)
            .standard_days(self.standard_days);
        if let Some(now) = self.now {
            purge = purge.now(now);
            prune = prune.now(now);
        }

        let purged = purge.build()?.run(report);
        prune.build().run(report);
        purged
    }
}

impl<'a> SweepBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_path(mut self, path: &'a Path) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn grace_hours(mut self, hours: u64) -> Self {
        self.grace_hours = hours;
        self
    }

    pub fn confirm_empty_excludes(mut self, confirm: bool) -> Self {
        self.confirm_empty_excludes = confirm;
        self
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

    pub fn build(self) -> Result<Sweep<'a>> {
        let config_path = self
            .config_path
            .ok_or_else(|| PurgeError::ConfigError("config_path is required".to_string()))?;

        Ok(Sweep {
            config_path,
            grace_hours: self.grace_hours,
            confirm_empty_excludes: self.confirm_empty_excludes,
            roots: self.roots,
            long_lived_days: self.long_lived_days,
            standard_days: self.standard_days,
            now: self.now,
        })
    }
}
