//! `sync push`/`sync pull`: push/fetch the annotation
//! reference, with a union-by-concatenation merge on pull so two divergent
//! captures of the same commit both survive.

use std::path::Path;

use anyhow::{Context, Result};
use shiftlog_types::Config;
use shiftlog_vcs::Repo;

const DEFAULT_REMOTE: &str = "origin";

/// Push the annotation reference to `remote` (default `origin`). Never
/// force-pushes; a non-fast-forward rejection surfaces as an error telling
/// the caller to pull first.
pub fn push(repo_root: &Path, config: &Config, remote: Option<&str>) -> Result<()> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let remote = remote.unwrap_or(DEFAULT_REMOTE);
    let refspec = format!("{ref}:{ref}", ref = config.notes_ref);
    match repo.push(remote, &refspec) {
        Ok(()) => Ok(()),
        Err(shiftlog_vcs::Error::NonFastForward) => {
            anyhow::bail!("push rejected: {remote} has annotations this repo doesn't have, run `sync pull` first")
        }
        Err(err) => Err(err.into()),
    }
}

/// Fetch the remote annotation reference into a scratch local ref, then
/// union-merge it into the local annotation reference: commits present on
/// only one side are taken as-is, commits present on both have their
/// records concatenated (blank-line separated) so neither capture is lost.
pub fn pull(repo_root: &Path, config: &Config, remote: Option<&str>) -> Result<()> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let remote = remote.unwrap_or(DEFAULT_REMOTE);
    let fetch_ref = format!("refs/shiftlog/fetch/{}", config.notes_ref.trim_start_matches("refs/notes/"));
    let refspec = format!("{}:{}", config.notes_ref, fetch_ref);
    repo.fetch(remote, &refspec).with_context(|| format!("fetching {} from {remote}", config.notes_ref))?;

    let remote_commits = shiftlog_vcs::list_noted_commits(&repo, &fetch_ref)?;
    for commit in remote_commits {
        let Some(remote_body) = shiftlog_vcs::read_note(&repo, &fetch_ref, &commit)? else {
            continue;
        };
        let local_body = shiftlog_vcs::read_note(&repo, &config.notes_ref, &commit)?;
        let merged = match local_body {
            None => remote_body,
            Some(local_body) if local_body == remote_body => local_body,
            Some(local_body) => format!("{local_body}\n\n{remote_body}"),
        };
        shiftlog_vcs::write_note(&repo, &config.notes_ref, &commit, &merged)
            .with_context(|| format!("merging annotation on {commit}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_bare_and_clone() -> (TempDir, TempDir, TempDir) {
        let remote_dir = TempDir::new().unwrap();
        Command::new("git").args(["init", "-q", "--bare"]).current_dir(remote_dir.path()).output().unwrap();

        let a = TempDir::new().unwrap();
        Command::new("git").args(["clone", "-q", remote_dir.path().to_str().unwrap(), "."]).current_dir(a.path()).output().unwrap();
        Command::new("git").args(["config", "user.email", "a@example.com"]).current_dir(a.path()).output().unwrap();
        Command::new("git").args(["config", "user.name", "A"]).current_dir(a.path()).output().unwrap();
        std::fs::write(a.path().join("f.txt"), "hi").unwrap();
        Command::new("git").args(["add", "."]).current_dir(a.path()).output().unwrap();
        Command::new("git").args(["commit", "-q", "-m", "initial"]).current_dir(a.path()).output().unwrap();
        Command::new("git").args(["push", "-q", "origin", "HEAD:refs/heads/main"]).current_dir(a.path()).output().unwrap();

        let b = TempDir::new().unwrap();
        Command::new("git").args(["clone", "-q", remote_dir.path().to_str().unwrap(), "."]).current_dir(b.path()).output().unwrap();
        Command::new("git").args(["checkout", "-q", "main"]).current_dir(b.path()).output().unwrap();
        Command::new("git").args(["config", "user.email", "b@example.com"]).current_dir(b.path()).output().unwrap();
        Command::new("git").args(["config", "user.name", "B"]).current_dir(b.path()).output().unwrap();

        (remote_dir, a, b)
    }

    #[test]
    fn push_then_pull_round_trips_a_single_annotation() {
        let (_remote, a, b) = init_bare_and_clone();
        let config = Config::default();
        let repo_a = Repo::discover(a.path()).unwrap();
        shiftlog_vcs::write_note(&repo_a, &config.notes_ref, "HEAD", "from a").unwrap();
        push(a.path(), &config, None).unwrap();

        pull(b.path(), &config, None).unwrap();
        let repo_b = Repo::discover(b.path()).unwrap();
        let head_b = repo_b.resolve_commit("HEAD").unwrap();
        assert_eq!(shiftlog_vcs::read_note(&repo_b, &config.notes_ref, &head_b).unwrap(), Some("from a".to_string()));
    }

    #[test]
    fn divergent_annotations_on_same_commit_are_concatenated() {
        let (_remote, a, b) = init_bare_and_clone();
        let config = Config::default();

        let repo_a = Repo::discover(a.path()).unwrap();
        shiftlog_vcs::write_note(&repo_a, &config.notes_ref, "HEAD", "from a").unwrap();
        push(a.path(), &config, None).unwrap();

        let repo_b = Repo::discover(b.path()).unwrap();
        shiftlog_vcs::write_note(&repo_b, &config.notes_ref, "HEAD", "from b").unwrap();

        pull(b.path(), &config, None).unwrap();
        let head_b = repo_b.resolve_commit("HEAD").unwrap();
        let merged = shiftlog_vcs::read_note(&repo_b, &config.notes_ref, &head_b).unwrap().unwrap();
        assert!(merged.contains("from a"));
        assert!(merged.contains("from b"));
    }
}
