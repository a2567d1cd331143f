//! File retention for configured directories.
//!
//! Each configured directory comes with a list of exclude patterns. Every
//! immediate child that is not excluded is a *candidate*; candidates that are
//! regular files and older than the grace period (48 hours by default) are
//! deleted. Subdirectories are never deleted here, that is the job of the
//! [`prune`](crate::prune) walk.
//!
//! # Example
//!
//! ```no_run
//! use ops_purge::retention::{RetentionPlanner, RetentionSpec};
//!
//! let planner = RetentionPlanner::builder().grace_hours(48).build();
//! let spec = RetentionSpec::new("/ops/app/logs", ["app.env", "tf*.env"]);
//!
//! let plan = planner.plan(&spec)?;
//! for decision in plan.decisions() {
//!     println!("{} {}", decision.action, decision.entry.name);
//! }
//! let report = planner.execute(plan);
//! println!("{} report entries", report.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod age;
pub mod pattern;
mod planner;

pub use age::{Elapsed, classify};
pub use pattern::{Expansion, expand};
pub use planner::{
    Action, DEFAULT_GRACE_HOURS, DeletionDecision, DirectoryEntry, Plan, PlanStatus,
    RetentionPlanner, RetentionPlannerBuilder, RetentionSpec,
};
