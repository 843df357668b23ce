//! `list`/`show`: the read-only views over annotated commits.

use std::path::Path;

use anyhow::{Context, Result};
use shiftlog_types::{Config, Record};
use shiftlog_vcs::Repo;

/// Annotated commits reachable from HEAD, newest first, each with its
/// decoded record.
pub fn list_annotations(repo_root: &Path, config: &Config) -> Result<Vec<(String, Record)>> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let commits = shiftlog_vcs::annotated_commits_on_head(&repo, &config.notes_ref)?;
    let mut out = Vec::with_capacity(commits.len());
    for commit in commits {
        if let Some(body) = shiftlog_vcs::read_note(&repo, &config.notes_ref, &commit)? {
            if let Ok(record) = Record::from_json(body.as_bytes()) {
                out.push((commit, record));
            }
        }
    }
    Ok(out)
}

/// The annotation on `reference` (default `HEAD`).
pub fn show_annotation(repo_root: &Path, config: &Config, reference: Option<&str>) -> Result<(String, Record)> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let commit = repo.resolve_commit(reference.unwrap_or("HEAD"))?;
    let body = shiftlog_vcs::read_note(&repo, &config.notes_ref, &commit)?
        .with_context(|| format!("no annotation found on {commit}"))?;
    let record = Record::from_json(body.as_bytes()).context("parsing annotation record")?;
    Ok((commit, record))
}
