mod discovery;
mod hooks;
mod parser;

use std::fs;
use std::io::Read;
use std::path::Path;

use shiftlog_types::{Entry, Transcript, UsageMetrics};

use crate::error::{Error, Result};
use crate::traits::{Agent, DiagnosticCheck, DiscoveredSession, HookInput, RestoreRequest};

/// The Codex CLI adapter. Codex is hookless: capture relies on the
/// repository post-commit hook and the active-session file rather than a
/// per-tool hook payload, so `parse_hook_input`/`is_commit_command` are
/// unreachable in normal operation but still implemented for `store`'s
/// uniform dispatch.
pub struct CodexAgent;

impl Agent for CodexAgent {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn display_name(&self) -> &'static str {
        "Codex"
    }

    fn configure_hooks(&self, repo_root: &Path) -> Result<()> {
        hooks::configure(repo_root)
    }

    fn remove_hooks(&self, repo_root: &Path) -> Result<()> {
        hooks::remove(repo_root)
    }

    fn diagnose_hooks(&self, repo_root: &Path) -> Vec<DiagnosticCheck> {
        hooks::diagnose(repo_root)
    }

    fn parse_hook_input(&self, _raw: &[u8]) -> Result<HookInput> {
        Err(Error::HookConfig(
            "codex has no tool hook; capture is driven by the post-commit hook".to_string(),
        ))
    }

    fn is_commit_command(&self, _tool_name: &str, _command: &str) -> bool {
        // The post-commit hook already guarantees a commit happened; there
        // is no tool_name/command pair to inspect.
        true
    }

    fn parse_transcript(&self, reader: &mut dyn Read) -> Result<Transcript> {
        parser::parse(reader)
    }

    fn parse_transcript_file(&self, path: &Path) -> Result<Transcript> {
        let mut file = fs::File::open(path)?;
        parser::parse(&mut file)
    }

    fn discover_session(&self, project_path: &Path) -> Result<Option<DiscoveredSession>> {
        discovery::discover(project_path)
    }

    fn restore_session(&self, request: &RestoreRequest) -> Result<()> {
        let path = discovery::sessions_root()
            .join("restored")
            .join(format!("rollout-restored-{}.jsonl", request.session_id));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, request.transcript_bytes)?;
        Ok(())
    }

    fn resume_command(&self, session_id: &str) -> (String, Vec<String>) {
        ("codex".to_string(), vec!["resume".to_string(), session_id.to_string()])
    }

    fn tool_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("shell", "Bash")]
    }

    fn extract_usage(&self, entry: &Entry) -> Option<UsageMetrics> {
        parser::extract_usage(entry)
    }

    fn extract_model(&self, transcript: &Transcript) -> Option<String> {
        parser::extract_model(transcript)
    }
}
