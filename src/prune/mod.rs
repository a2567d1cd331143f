//! Age-based pruning of whole directory trees.
//!
//! Below each prune root, directories whose name starts with a digit are
//! removed with all their contents once they are older than the threshold of
//! their [`PrefixClass`]: 365 days for a leading `3` or `4`, 30 days for any
//! other digit. Directories with any other name are kept but still walked,
//! so aged digit-prefixed directories deeper in the tree are found too.
//!
//! # Example
//!
//! ```no_run
//! use ops_purge::prune::{PrefixPolicy, PruneSpec, TreePruner};
//!
//! let spec = PruneSpec::new("/ops/archives", PrefixPolicy::default());
//! let outcome = TreePruner::builder().build().prune(&spec);
//! for path in &outcome.pruned {
//!     println!("pruned {}", path.display());
//! }
//! ```

mod policy;
#[cfg(test)]
mod tests;
mod walker;

pub use policy::{
    DEFAULT_LONG_LIVED_DAYS, DEFAULT_PRUNE_ROOTS, DEFAULT_STANDARD_DAYS, PrefixClass,
    PrefixPolicy, PruneSpec,
};
pub use walker::{PruneAction, PruneDecision, PruneOutcome, TreePruner, TreePrunerBuilder};
