//! `init`/`deinit` orchestration: wiring agent hooks and repository-level
//! git hooks in, and cleanly removing them again without touching
//! annotations already written.

use std::path::Path;

use anyhow::{bail, Context, Result};
use shiftlog_agents::get_agent;
use shiftlog_types::{Config, Record};
use shiftlog_vcs::Repo;

/// Inspect every commit already carrying an annotation under `notes_ref`
/// and classify it as "ours" (parses as a `Record`) or "foreign" (anything
/// else). Returns the foreign commits, if any.
pub fn foreign_annotations(repo: &Repo, notes_ref: &str) -> Result<Vec<String>> {
    let noted = shiftlog_vcs::list_noted_commits(repo, notes_ref)?;
    let mut foreign = Vec::new();
    for commit in noted {
        if let Some(body) = shiftlog_vcs::read_note(repo, notes_ref, &commit)? {
            if Record::from_json(body.as_bytes()).is_err() {
                foreign.push(commit);
            }
        }
    }
    Ok(foreign)
}

/// Configure hooks, register the notes rewrite-follow policy, install the
/// repo-level sync/remap hooks, and write the repo-local config. Refuses if
/// the chosen reference already carries foreign (non-`shiftlog`) notes.
pub fn init(repo_root: &Path, agent_flag: Option<&str>, notes_ref_flag: Option<&str>) -> Result<Config> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let config = crate::config::resolve(repo_root, agent_flag, notes_ref_flag)?;

    let foreign = foreign_annotations(&repo, &config.notes_ref)?;
    if !foreign.is_empty() {
        bail!(
            "refusing to init: {} commit(s) already carry non-shiftlog annotations under {} \
             (pass --notes-ref to choose a different reference)",
            foreign.len(),
            config.notes_ref
        );
    }

    let agent = get_agent(&config.agent)?;
    agent.configure_hooks(repo_root).context("configuring agent hooks")?;
    shiftlog_vcs::configure_rewrite_ref(&repo, &config.notes_ref).context("configuring notes rewrite-follow")?;
    crate::repo_hooks::configure(repo_root).context("installing repository hooks")?;
    crate::config::save(repo_root, &config).context("writing repo-local config")?;

    Ok(config)
}

/// Remove everything `init` added. Never touches annotations.
pub fn deinit(repo_root: &Path) -> Result<()> {
    let config = crate::config::load(repo_root)?.unwrap_or_default();
    if let Ok(agent) = get_agent(&config.agent) {
        agent.remove_hooks(repo_root).context("removing agent hooks")?;
    }
    crate::repo_hooks::remove(repo_root).context("removing repository hooks")?;
    crate::config::remove(repo_root).context("removing repo-local config")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        Command::new("git").args(["init", "-q"]).current_dir(dir.path()).output().unwrap();
        Command::new("git").args(["config", "user.email", "t@example.com"]).current_dir(dir.path()).output().unwrap();
        Command::new("git").args(["config", "user.name", "T"]).current_dir(dir.path()).output().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
        Command::new("git").args(["add", "."]).current_dir(dir.path()).output().unwrap();
        Command::new("git").args(["commit", "-q", "-m", "initial"]).current_dir(dir.path()).output().unwrap();
        dir
    }

    #[test]
    fn init_writes_config_and_is_idempotent() {
        let dir = init_repo();
        let config = init(dir.path(), Some("claude"), None).unwrap();
        assert_eq!(config.agent, "claude");
        assert!(crate::repo_hooks::is_configured(dir.path()));
        let second = init(dir.path(), Some("claude"), None).unwrap();
        assert_eq!(config, second);
    }

    #[test]
    fn init_refuses_when_foreign_annotation_exists() {
        let dir = init_repo();
        let repo = Repo::discover(dir.path()).unwrap();
        shiftlog_vcs::write_note(&repo, "refs/notes/shiftlog", "HEAD", "not a shiftlog record").unwrap();
        let err = init(dir.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("foreign") || err.to_string().contains("non-shiftlog"));
    }

    #[test]
    fn deinit_after_init_leaves_no_managed_state() {
        let dir = init_repo();
        init(dir.path(), Some("claude"), None).unwrap();
        deinit(dir.path()).unwrap();
        assert!(!crate::config::config_path(dir.path()).exists());
        assert!(!crate::repo_hooks::is_configured(dir.path()));
    }
}
