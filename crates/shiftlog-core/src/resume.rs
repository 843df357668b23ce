//! Session restoration: `resume(commitRef, force) → spawn
//! agent resume command`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use shiftlog_agents::{get_agent, Agent, RestoreRequest};
use shiftlog_types::{Config, ContentBlock, Record};
use shiftlog_vcs::Repo;

/// What the caller (the CLI) needs to actually exec the resume command;
/// kept separate from the `std::process::Command` exec itself so this
/// function stays testable without spawning a real agent binary.
pub struct ResumePlan {
    pub binary: String,
    pub args: Vec<String>,
    pub entry_count: usize,
    pub title_hint: Option<String>,
}

/// Run steps 1-7 of `resume` and return the command the caller should exec
/// (step 8). `force` skips the dirty-worktree prompt — the prompt itself is
/// a CLI concern, so this function instead reports whether the tree is
/// dirty and lets the caller decide whether to proceed.
pub fn prepare(repo_root: &Path, config: &Config, commit_ref: &str, force: bool) -> Result<ResumePlan> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let commit = repo.resolve_commit(commit_ref).with_context(|| format!("resolving {commit_ref}"))?;

    if !force && repo.is_dirty()? {
        bail!("working tree has uncommitted changes; pass --force to resume anyway");
    }

    let body = shiftlog_vcs::read_note(&repo, &config.notes_ref, &commit)?
        .with_context(|| format!("no annotation found on {commit}"))?;
    let record = Record::from_json(body.as_bytes()).context("parsing annotation record")?;

    let decoded = record.decode_transcript().context("decoding annotation transcript")?;
    if !decoded.checksum_ok {
        tracing::warn!("checksum mismatch on {commit}'s annotation; restoring anyway");
    }

    let agent = get_agent(record.agent_name())?;
    let transcript = agent
        .parse_transcript(&mut decoded.bytes.as_slice())
        .context("parsing restored transcript")?;
    let title_hint = first_user_prompt_text(&transcript);

    let branch = repo.current_branch()?.unwrap_or_else(|| "HEAD".to_string());
    let request = RestoreRequest {
        project_path: repo_root,
        session_id: &record.session_id,
        branch: &branch,
        transcript_bytes: &decoded.bytes,
        entry_count: transcript.len(),
        summary: title_hint.as_deref(),
    };
    agent.restore_session(&request).context("restoring session onto disk")?;

    repo.checkout(&commit).with_context(|| format!("checking out {commit}"))?;

    let (binary, args) = agent.resume_command(&record.session_id);
    Ok(ResumePlan {
        binary,
        args,
        entry_count: transcript.len(),
        title_hint,
    })
}

fn first_user_prompt_text(transcript: &shiftlog_types::Transcript) -> Option<String> {
    transcript.entries.iter().find_map(|entry| {
        if entry.role != shiftlog_types::Role::User {
            return None;
        }
        let message = entry.message.as_ref()?;
        message.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            _ => None,
        })
    })
}
