//! Command-line surface. This crate is deliberately thin: it
//! parses arguments and formats output; every behavior lives in
//! `shiftlog-core`.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "shiftlog")]
#[command(about = "Capture and replay AI coding-agent transcripts, bound to the git commits they produced")]
#[command(version)]
pub struct Cli {
    /// Override the configured agent for this invocation.
    #[arg(long, global = true)]
    pub agent: Option<String>,

    /// Override the configured annotation reference for this invocation.
    #[arg(long = "notes-ref", global = true)]
    pub notes_ref: Option<String>,

    /// Output format for read-only commands (list/show/search/doctor).
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Quiet logging (errors only); repeat for more verbosity is not
    /// supported, use RUST_LOG instead.
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Configure hooks and write the repo-local config.
    Init {
        #[arg(long)]
        agent: Option<String>,
        #[arg(long = "notes-ref")]
        notes_ref: Option<String>,
    },

    /// Remove everything `init` added. Never deletes annotations.
    Deinit,

    /// Read a hook-invocation payload on stdin and capture a transcript if
    /// the triggering action was a git commit.
    Store {
        /// Hookless path for agents with no per-tool hook (invoked from
        /// `post-commit`): discover the active session instead of reading
        /// stdin.
        #[arg(long)]
        hookless: bool,
    },

    /// Restore an annotated commit's transcript and resume the agent.
    Resume {
        /// Commit reference carrying the annotation (full/short hash,
        /// `HEAD~N`, branch name, ...).
        #[arg(default_value = "HEAD")]
        commit_ref: String,

        /// Skip the dirty-worktree confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// List annotated commits reachable from HEAD, newest first.
    List,

    /// Render the annotation on a commit (default HEAD).
    Show {
        #[arg(default_value = "HEAD")]
        reference: String,
    },

    /// Search annotated commits by metadata and/or transcript content.
    Search {
        /// Substring or (with --regex) pattern to match against decoded
        /// transcript content. Empty string matches metadata only.
        #[arg(default_value = "")]
        query: String,

        #[arg(long)]
        agent: Option<String>,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Only commits annotated before this RFC 3339 timestamp.
        #[arg(long)]
        before: Option<String>,

        /// Only commits annotated after this RFC 3339 timestamp.
        #[arg(long)]
        after: Option<String>,

        /// Treat `query` as a regular expression.
        #[arg(long)]
        regex: bool,

        #[arg(long = "case-sensitive")]
        case_sensitive: bool,

        /// Characters of surrounding context to print around each match.
        #[arg(long, default_value_t = 40)]
        context: usize,

        #[arg(long)]
        limit: Option<usize>,

        /// Skip content matching entirely; filter by metadata only.
        #[arg(long = "metadata-only")]
        metadata_only: bool,
    },

    /// Push/pull the annotation reference.
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },

    /// Re-attach annotations orphaned by a server-side rebase, by
    /// patch-identity.
    Remap,

    /// Environment, configuration, and per-agent hook diagnostics.
    Doctor,
}

#[derive(Subcommand)]
pub enum SyncAction {
    Push {
        #[arg(long)]
        remote: Option<String>,
    },
    Pull {
        #[arg(long)]
        remote: Option<String>,
    },
}
