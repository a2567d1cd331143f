//! # ops-purge CLI
//!
//! Deletes stale files from the directories listed in the exclude
//! configuration and prunes aged directory trees below the archive roots.
//!
//! ## Commands
//!
//! - **purge**: Delete files older than the grace period that are not
//!   excluded
//! - **prune**: Remove digit-prefixed directories older than their threshold
//! - **sweep**: Combined purge + prune
//!
//! ## Quick Start
//!
//! From cron:
//!
//! ```bash
//! ops-purge sweep --config /ops/scripts/ops_files_purge_exceptions.cfg
//! ```
//!
//! The run report is appended to `/tmp/ops_files_purge.log` unless
//! `--log-file` or `--no-log-file` says otherwise.

use std::io::IsTerminal;

use ops_purge::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // cron mail and log collectors get plain text
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    ops_purge::commands::execute(&cli).map_err(Into::into)
}
