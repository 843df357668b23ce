//! The active-session file: a small piece of mutable shared state under
//! `<repo>/.git/shiftlog/` that lets the capture orchestrator find a
//! hookless agent's transcript on `post-commit`.
//!
//! Lifecycle: written on session-start signal, left untouched by tool-use
//! (the hook path doesn't need it), removed on session-end. Absence always
//! means "no active session", never an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const STATE_REL: &str = ".git/shiftlog/active-session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub agent: String,
    pub session_id: String,
    pub transcript_path: PathBuf,
    pub started_at: DateTime<Utc>,
}

fn state_path(repo_root: &Path) -> PathBuf {
    repo_root.join(STATE_REL)
}

/// Read the active session, if one is recorded. Tolerates a missing or
/// unparseable file by returning `None` — a corrupt state file must never
/// block a commit.
pub fn read(repo_root: &Path) -> Result<Option<ActiveSession>> {
    let path = state_path(repo_root);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_slice(&bytes).ok())
}

/// Write (or overwrite) the active session via write-and-rename. If
/// multiple agents signal session-start without an intervening
/// session-end, the last write wins.
pub fn write(repo_root: &Path, session: &ActiveSession) -> Result<()> {
    let path = state_path(repo_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    let tmp_path = path.with_extension("json.shiftlog-tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// Remove the active session file. Absence is not an error.
pub fn remove(repo_root: &Path) -> Result<()> {
    let path = state_path(repo_root);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ActiveSession {
        ActiveSession {
            agent: "codex".to_string(),
            session_id: "sess-1".to_string(),
            transcript_path: PathBuf::from("/tmp/rollout.jsonl"),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn missing_state_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read(dir.path()).unwrap(), None);
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let session = sample();
        write(dir.path(), &session).unwrap();
        assert_eq!(read(dir.path()).unwrap(), Some(session));
    }

    #[test]
    fn second_write_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), &sample()).unwrap();
        let mut second = sample();
        second.session_id = "sess-2".to_string();
        write(dir.path(), &second).unwrap();
        assert_eq!(read(dir.path()).unwrap(), Some(second));
    }

    #[test]
    fn remove_then_read_is_none() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), &sample()).unwrap();
        remove(dir.path()).unwrap();
        assert_eq!(read(dir.path()).unwrap(), None);
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(remove(dir.path()).is_ok());
    }
}
