//! The capture orchestrator: `store(hookInputBytes) → ()`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use shiftlog_agents::{get_agent, Agent};
use shiftlog_types::{checksum, Config, Effort, Record};
use shiftlog_vcs::Repo;

/// Where the transcript bytes and session id for this capture came from.
struct Session {
    session_id: String,
    transcript_path: PathBuf,
}

/// Run the capture orchestrator. `hook_input` is the hook's stdin bytes for
/// a tool-hook-driven capture, or `None` for the hookless post-commit path
/// (which falls back to the active-session file, then to the agent's own
/// `DiscoverSession`).
///
/// Steps 1-2 (parse + commit-command filter) always return `Ok(())` on
/// failure, per the hard requirement that a hook path never fails an
/// agent's tool call. Every step from 3 onward is a hard error.
pub fn store(repo_root: &Path, config: &Config, hook_input: Option<&[u8]>) -> Result<()> {
    let agent = get_agent(&config.agent)?;

    let session = match hook_input {
        Some(raw) => match resolve_from_hook(agent.as_ref(), raw) {
            ResolvedHook::Proceed(session) => session,
            ResolvedHook::Skip => return Ok(()),
        },
        None => match resolve_hookless(agent.as_ref(), repo_root)? {
            Some(session) => session,
            None => {
                tracing::warn!("store --hookless: no active session found for {}", repo_root.display());
                return Ok(());
            }
        },
    };

    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    capture(&repo, config, agent.as_ref(), repo_root, &session)
}

enum ResolvedHook {
    Proceed(Session),
    Skip,
}

fn resolve_from_hook(agent: &dyn Agent, raw: &[u8]) -> ResolvedHook {
    let input = match agent.parse_hook_input(raw) {
        Ok(input) => input,
        Err(err) => {
            tracing::warn!("store: failed to parse hook input: {err}");
            return ResolvedHook::Skip;
        }
    };
    if !agent.is_commit_command(&input.tool_name, &input.command) {
        return ResolvedHook::Skip;
    }
    ResolvedHook::Proceed(Session {
        session_id: input.session_id,
        transcript_path: PathBuf::from(input.transcript_path),
    })
}

fn resolve_hookless(agent: &dyn Agent, repo_root: &Path) -> Result<Option<Session>> {
    if let Some(active) = crate::active_session::read(repo_root)? {
        return Ok(Some(Session {
            session_id: active.session_id,
            transcript_path: active.transcript_path,
        }));
    }
    Ok(agent
        .discover_session(repo_root)?
        .map(|discovered| Session {
            session_id: discovered.session_id,
            transcript_path: discovered.transcript_path,
        }))
}

fn capture(repo: &Repo, config: &Config, agent: &dyn Agent, repo_root: &Path, session: &Session) -> Result<()> {
    let head = repo.resolve_commit("HEAD").context("resolving HEAD")?;

    let raw = std::fs::read(&session.transcript_path)
        .with_context(|| format!("reading transcript at {}", session.transcript_path.display()))?;

    // Idempotence guard (step 4): same session, same bytes already captured
    // on HEAD means this is a no-op.
    if let Some(existing_body) = shiftlog_vcs::read_note(repo, &config.notes_ref, &head)? {
        if let Ok(existing) = Record::from_json(existing_body.as_bytes()) {
            if existing.session_id == session.session_id && existing.checksum == checksum(&raw) {
                tracing::info!("store: HEAD already carries this session's capture, nothing to do");
                return Ok(());
            }
        }
    }

    let transcript = agent
        .parse_transcript(&mut raw.as_slice())
        .with_context(|| format!("parsing transcript at {}", session.transcript_path.display()))?;

    let usage = transcript.usage_totals(|entry| agent.extract_usage(entry));
    let effort = Effort {
        turns: transcript.count_turns() as u64,
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
        cache_creation_input_tokens: usage.cache_creation_input_tokens,
        cache_read_input_tokens: usage.cache_read_input_tokens,
    };
    let model = agent.extract_model(&transcript);
    let branch = repo.current_branch()?.unwrap_or_else(|| "HEAD".to_string());
    let project_path = repo_root
        .canonicalize()
        .unwrap_or_else(|_| repo_root.to_path_buf())
        .to_string_lossy()
        .to_string();

    let record = Record::build(
        &raw,
        session.session_id.clone(),
        Utc::now(),
        project_path,
        branch,
        transcript.len() as u64,
        agent.name(),
        model,
        Some(effort),
    )
    .context("building annotation record")?;

    let body = record.to_json().context("serializing annotation record")?;
    shiftlog_vcs::write_note(repo, &config.notes_ref, &head, &body).context("writing annotation")?;

    tracing::info!(
        "captured {} ({} entries) on {}",
        session.session_id,
        transcript.len(),
        &head[..head.len().min(12)]
    );
    Ok(())
}
