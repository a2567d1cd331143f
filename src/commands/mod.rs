//! Implementation of ops-purge subcommands.
//!
//! `mod.rs` is a thin dispatcher; command logic lives in dedicated modules
//! (`purge`, `prune`, `sweep`). Every command appends to one
//! [`ExecutionReport`] which is bracketed by begin/end banners and handed to
//! the [`Logger`] whole once the run is over.

use crate::cli::{Cli, Commands};
use crate::error::{PurgeError, Result};
use crate::logging::Logger;
use crate::report::{Banner, ExecutionReport};

pub(crate) mod prune;
pub(crate) mod purge;
pub(crate) mod sweep;

pub use prune::{Prune, PruneBuilder};
pub use purge::{Purge, PurgeBuilder};
pub use sweep::{Sweep, SweepBuilder};


/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: ExecutionReport,
    /// A source-level error that should make the process exit non-zero
    pub fatal: Option<PurgeError>,
}

/// Execute the command and write its report through a [`Logger`] built from
/// the global options.
///
/// # Errors
///
/// Returns the run's fatal error if there was one, otherwise any error
/// writing the log file.
pub fn execute(cli: &Cli) -> Result<()> {
    let opts = cli.global_opts();
    let logger = Logger::new(opts.verbose(), opts.quiet()).with_log_file(opts.get_log_file());

    let outcome = run(cli);
    let written = logger.write_report(&outcome.report);

    match outcome.fatal {
        Some(err) => Err(err),
        None => written,
    }
}

/// Run the command and collect its report without writing it anywhere.
pub fn run(cli: &Cli) -> RunOutcome {
    let config_path = cli.global_opts().get_config_path();

    let mut report = ExecutionReport::new();
    report.banner(Banner::Begin);

    let result = match cli.command() {
        Commands::Purge(args) => Purge::builder()
            .config_path(&config_path)
            .grace_hours(args.grace_hours)
            .confirm_empty_excludes(args.confirm_empty_excludes)
            .build()
            .and_then(|purge| purge.run(&mut report)),
        Commands::Prune(args) => {
            let roots = args.get_roots();
            Prune::builder()
                .roots(&roots)
                .long_lived_days(args.long_lived_days)
                .standard_days(args.standard_days)
                .build()
                .run(&mut report);
            Ok(())
        }
        Commands::Sweep { purge, prune } => {
            let roots = prune.get_roots();
            Sweep::builder()
                .config_path(&config_path)
                .grace_hours(purge.grace_hours)
                .confirm_empty_excludes(purge.confirm_empty_excludes)
                .roots(&roots)
                .long_lived_days(prune.long_lived_days)
                .standard_days(prune.standard_days)
                .build()
                .and_then(|sweep| sweep.run(&mut report))
        }
    };

    report.banner(Banner::End);

    RunOutcome {
        report,
        fatal: result.err(),
    }
}
