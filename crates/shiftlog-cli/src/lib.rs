//! Thin CLI surface over `shiftlog-core`. Argument parsing and
//! output formatting only — every operation's actual behavior lives in
//! `shiftlog-core`; this crate never reimplements it.

mod args;
mod commands;
mod output;

pub use args::Cli;
pub use commands::run;

/// Install a `tracing` subscriber that writes to stderr, honoring `RUST_LOG`
/// and falling back to `warn` (or `error` with `--quiet`) otherwise.
pub fn init_logging(quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
