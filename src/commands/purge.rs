//! Purge command: apply the exclude configuration to every listed directory.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config;
use crate::error::{PurgeError, Result, SAMPLE_CONFIG, SpecEntryError, describe};
use crate::report::ExecutionReport;
use crate::retention::{DEFAULT_GRACE_HOURS, RetentionPlanner};

pub struct Purge<'a> {
    config_path: &'a Path,
    grace_hours: u64,
    confirm_empty_excludes: bool,
    now: Option<SystemTime>,
}

pub struct PurgeBuilder<'a> {
    config_path: Option<&'a Path>,
    grace_hours: u64,
    confirm_empty_excludes: bool,
    now: Option<SystemTime>,
}

impl Default for PurgeBuilder<'_> {
    fn default() -> Self {
        Self {
            config_path: None,
            grace_hours: DEFAULT_GRACE_HOURS,
            confirm_empty_excludes: true,
            now: None,
        }
    }
}

impl<'a> PurgeBuilder<'a> {
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

    /// Pin the reference time used for file ages.
    pub fn now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn build(self) -> Result<Purge<'a>> {
        let config_path = self
            .config_path
            .ok_or_else(|| PurgeError::ConfigError("config_path is required".to_string()))?;

        Ok(Purge {
            config_path,
            grace_hours: self.grace_hours,
            confirm_empty_excludes: self.confirm_empty_excludes,
            now: self.now,
        })
    }
}

impl<'a> Purge<'a> {
    pub fn builder() -> PurgeBuilder<'a> {
        PurgeBuilder::new()
    }

    fn planner(&self) -> RetentionPlanner {
        let builder = RetentionPlanner::builder()
            .grace_hours(self.grace_hours)
            .allow_empty_excludes(self.confirm_empty_excludes);
        match self.now {
            Some(now) => builder.now(now).build(),
            None => builder.build(),
        }
    }

    /// Load the configuration and purge every valid entry, appending all
    /// events to `report`.
    ///
    /// Rejected entries are reported and skipped. Only a missing or
    /// unparsable configuration file is returned as an error, after it has
    /// been recorded in `report`.
    pub fn run(&self, report: &mut ExecutionReport) -> Result<()> {
        let loaded = match config::load(self.config_path) {
            Ok(loaded) => loaded,
            Err(err) => {
                report.error(describe(&err), Some(self.config_path));
                if matches!(err, PurgeError::ConfigParseError { .. }) {
                    report.error(SAMPLE_CONFIG, Some(self.config_path));
                }
                return Err(err);
            }
        };

        if loaded.is_empty() {
            report.warning(
                format!(
                    "Configuration {} is empty, no directories to purge",
                    loaded.path().display()
                ),
                Some(loaded.path()),
            );
            return Ok(());
        }

        let planner = self.planner();
        for entry in loaded.entries() {
            match entry {
                Ok(spec) => report.append(planner.process(&spec)),
                Err(err) => reject(report, &err),
            }
        }

        Ok(())
    }
}

fn reject(report: &mut ExecutionReport, err: &SpecEntryError) {
    let directory = PathBuf::from(err.directory());
    report.event(err.entry_severity(), err.to_string(), Some(&directory));
    if !matches!(err, SpecEntryError::MissingDirectory { .. }) {
        report.event(err.entry_severity(), SAMPLE_CONFIG, Some(&directory));
    }
}
