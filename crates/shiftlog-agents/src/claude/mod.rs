mod discovery;
mod hooks;
mod parser;

use std::fs;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use shiftlog_types::{Entry, Transcript, UsageMetrics};

use crate::error::Result;
use crate::helpers::is_commit_command;
use crate::traits::{Agent, DiagnosticCheck, DiscoveredSession, HookInput, RestoreRequest};

/// The Claude Code adapter: `.claude/settings.local.json` PostToolUse hooks,
/// `~/.claude/projects/<dash-encoded-path>/<id>.jsonl` session transcripts.
pub struct ClaudeAgent;

impl Agent for ClaudeAgent {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
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

    fn parse_hook_input(&self, raw: &[u8]) -> Result<HookInput> {
        let value: Value = serde_json::from_slice(raw)?;
        Ok(HookInput {
            session_id: value
                .get("session_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            transcript_path: value
                .get("transcript_path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tool_name: value
                .get("tool_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            command: value
                .get("tool_input")
                .and_then(|i| i.get("command"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    fn is_commit_command(&self, tool_name: &str, command: &str) -> bool {
        tool_name == "Bash" && is_commit_command(command)
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
        let path = discovery::session_dir(request.project_path).join(format!("{}.jsonl", request.session_id));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, request.transcript_bytes)?;
        Ok(())
    }

    fn resume_command(&self, session_id: &str) -> (String, Vec<String>) {
        (
            "claude".to_string(),
            vec!["--resume".to_string(), session_id.to_string()],
        )
    }

    fn tool_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("Bash", "Bash")]
    }

    fn extract_usage(&self, entry: &Entry) -> Option<UsageMetrics> {
        parser::extract_usage(entry)
    }

    fn extract_model(&self, transcript: &Transcript) -> Option<String> {
        parser::extract_model(transcript)
    }
}
