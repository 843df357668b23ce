use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use shiftlog_types::{Entry, Transcript, UsageMetrics};

use crate::error::Result;

/// Parsed hook-invocation input. Each agent
/// may carry additional fields in its raw JSON; the orchestrator ignores
/// them, only the owning adapter interprets them.
#[derive(Debug, Clone, Default)]
pub struct HookInput {
    pub session_id: String,
    pub transcript_path: String,
    pub tool_name: String,
    pub command: String,
}

/// Result of `DiscoverSession`: the most recently modified session candidate
/// within the recency window.
#[derive(Debug, Clone)]
pub struct DiscoveredSession {
    pub session_id: String,
    pub transcript_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub project_path: PathBuf,
}

/// Everything `RestoreSession` needs to write a transcript back into an
/// agent's expected on-disk location.
pub struct RestoreRequest<'a> {
    pub project_path: &'a Path,
    pub session_id: &'a str,
    pub branch: &'a str,
    pub transcript_bytes: &'a [u8],
    pub entry_count: usize,
    pub summary: Option<&'a str>,
}

/// One diagnostic check, as surfaced by `doctor`.
#[derive(Debug, Clone)]
pub struct DiagnosticCheck {
    pub name: String,
    pub ok: bool,
    pub message: String,
}

impl DiagnosticCheck {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        DiagnosticCheck {
            name: name.into(),
            ok: true,
            message: message.into(),
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        DiagnosticCheck {
            name: name.into(),
            ok: false,
            message: message.into(),
        }
    }
}

/// The single behavioral contract every supported agent implements.
/// Implementations are plain records that own their state;
/// callers never switch on agent identity — everything goes through this
/// trait via the registry.
pub trait Agent: Send + Sync {
    /// Short lowercase identifier, unique across agents.
    fn name(&self) -> &'static str;

    /// Human-readable label, used only for messages.
    fn display_name(&self) -> &'static str;

    /// Install a tool-invocation hook into the agent's configuration under
    /// `repo_root`. Idempotent: running twice produces the same on-disk
    /// state, and unrelated pre-existing entries in the hook configuration
    /// are preserved.
    fn configure_hooks(&self, repo_root: &Path) -> Result<()>;

    /// Remove everything `configure_hooks` added, preserving unrelated
    /// entries. Never touches annotations.
    fn remove_hooks(&self, repo_root: &Path) -> Result<()>;

    /// At least one check; all must pass immediately after a successful
    /// `configure_hooks`.
    fn diagnose_hooks(&self, repo_root: &Path) -> Vec<DiagnosticCheck>;

    /// Parse hook-invocation input from stdin bytes. Fails only on
    /// malformed JSON; otherwise best-effort, with missing fields left as
    /// empty strings.
    fn parse_hook_input(&self, raw: &[u8]) -> Result<HookInput>;

    /// True iff `tool_name` is one of this agent's shell-executing tools
    /// and `command` is a git commit invocation. Intentionally loose: false
    /// positives are acceptable, false negatives would silently drop
    /// conversations.
    fn is_commit_command(&self, tool_name: &str, command: &str) -> bool;

    /// Parse a transcript from a reader in this agent's native format.
    /// Tolerates partial/corrupt lines by skipping them; never partial-fails
    /// the whole parse.
    fn parse_transcript(&self, reader: &mut dyn Read) -> Result<Transcript>;

    /// Equivalent to `parse_transcript` on a file's contents. For agents
    /// that store a session as a directory (or database), reads the
    /// directory/database contents in a deterministic order.
    fn parse_transcript_file(&self, path: &Path) -> Result<Transcript>;

    /// Find the most recently modified session for `project_path`, within
    /// the recency window. `None` means "no active session".
    fn discover_session(&self, project_path: &Path) -> Result<Option<DiscoveredSession>>;

    /// Write `request`'s transcript bytes into this agent's expected
    /// on-disk location, creating parent directories as needed. Idempotent.
    /// Preserves the original bytes exactly — never reserializes.
    fn restore_session(&self, request: &RestoreRequest) -> Result<()>;

    /// The command to exec to resume the restored session: (binary, argv).
    fn resume_command(&self, session_id: &str) -> (String, Vec<String>);

    /// Map from this agent's native tool name to a canonical display name.
    /// Used only for rendering.
    fn tool_aliases(&self) -> &'static [(&'static str, &'static str)];

    /// Per-entry token usage, extracted from whatever raw field this agent
    /// attaches it to. Defaults to "not reported".
    fn extract_usage(&self, _entry: &Entry) -> Option<UsageMetrics> {
        None
    }

    /// Model identifier extractable from the transcript, if any.
    fn extract_model(&self, _transcript: &Transcript) -> Option<String> {
        None
    }

    /// Optional non-interactive summarization capability.
    fn summariser(&self) -> Option<&dyn Summariser> {
        None
    }
}

/// Non-interactive summarization: the command to exec, fed a prompt on
/// stdin.
pub trait Summariser {
    fn summarise_command(&self) -> (String, Vec<String>);
}
