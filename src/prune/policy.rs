use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prune roots used when none are given on the command line.
pub const DEFAULT_PRUNE_ROOTS: &[&str] = &["/ops/archives"];

/// Threshold for directories whose name starts with `3` or `4`.
pub const DEFAULT_LONG_LIVED_DAYS: u64 = 365;

/// Threshold for directories whose name starts with any other digit.
pub const DEFAULT_STANDARD_DAYS: u64 = 30;

/// Category of a directory name, selected by its first character.
///
/// Names that do not start with an ASCII digit have no class and are never
/// pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrefixClass {
    /// Leading `3` or `4`
    LongLived,
    /// Any other leading digit
    Standard,
}

impl PrefixClass {
    pub fn of(name: &str) -> Option<Self> {
        match name.chars().next()? {
            '3' | '4' => Some(Self::LongLived),
            c if c.is_ascii_digit() => Some(Self::Standard),
            _ => None,
        }
    }
}

impl fmt::Display for PrefixClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixClass::LongLived => "long-lived",
            PrefixClass::Standard => "standard",
        })
    }
}

/// Age threshold in days per prefix class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixPolicy {
    thresholds: BTreeMap<PrefixClass, u64>,
}

impl Default for PrefixPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_LIVED_DAYS, DEFAULT_STANDARD_DAYS)
    }
}

impl PrefixPolicy {
    pub fn new(long_lived_days: u64, standard_days: u64) -> Self {
        Self {
            thresholds: BTreeMap::from([
                (PrefixClass::LongLived, long_lived_days),
                (PrefixClass::Standard, standard_days),
            ]),
        }
    }

    /// Replace the threshold of one class.
    pub fn with_threshold(mut self, class: PrefixClass, days: u64) -> Self {
        self.thresholds.insert(class, days);
        self
    }

    pub fn threshold(&self, class: PrefixClass) -> u64 {
        self.thresholds.get(&class).copied().unwrap_or(match class {
            PrefixClass::LongLived => DEFAULT_LONG_LIVED_DAYS,
            PrefixClass::Standard => DEFAULT_STANDARD_DAYS,
        })
    }

    /// Class and threshold for a directory name, `None` when it is never
    /// eligible for pruning.
    pub fn classify(&self, name: &str) -> Option<(PrefixClass, u64)> {
        let class = PrefixClass::of(name)?;
        Some((class, self.threshold(class)))
    }
}

/// A root whose strict descendants are subject to the prefix policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneSpec {
    root: PathBuf,
    policy: PrefixPolicy,
}

impl PruneSpec {
    pub fn new(root: impl Into<PathBuf>, policy: PrefixPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> &PrefixPolicy {
        &self.policy
    }
}
