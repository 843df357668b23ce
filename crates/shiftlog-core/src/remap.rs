//! `remap`: re-attach annotations orphaned by a server-side
//! rebase (e.g. a hosting platform's "rebase and merge" flow) using
//! patch-identity, since `notes.rewriteRef` only covers local rewrites.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use shiftlog_types::Config;
use shiftlog_vcs::Repo;

pub struct RemapReport {
    pub remapped: usize,
    pub unmatched_orphans: usize,
}

/// Enumerate every branch tip's reachable commits. `rev_list_head` alone
/// covers only the current branch; remap needs every local branch tip.
fn all_reachable_commits(repo: &Repo) -> Result<HashSet<String>> {
    let mut reachable = HashSet::new();
    for branch_ref in repo.branch_refs().context("listing branch refs")? {
        if let Ok(commits) = repo.rev_list(&branch_ref) {
            reachable.extend(commits);
        }
    }
    Ok(reachable)
}

pub fn remap(repo_root: &std::path::Path, config: &Config) -> Result<RemapReport> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let reachable = all_reachable_commits(&repo)?;

    let annotated: HashSet<String> = shiftlog_vcs::list_noted_commits(&repo, &config.notes_ref)?.into_iter().collect();

    let orphans: Vec<&String> = annotated.iter().filter(|commit| !reachable.contains(*commit)).collect();
    let unannotated_reachable: Vec<&String> = reachable.iter().filter(|commit| !annotated.contains(*commit)).collect();

    if orphans.is_empty() {
        return Ok(RemapReport { remapped: 0, unmatched_orphans: 0 });
    }

    let mut candidates_by_patch_id: HashMap<String, Vec<&String>> = HashMap::new();
    for commit in &unannotated_reachable {
        if let Ok(patch_id) = repo.patch_id(commit) {
            if !patch_id.is_empty() {
                candidates_by_patch_id.entry(patch_id).or_default().push(commit);
            }
        }
    }

    let mut remapped = 0;
    let mut unmatched = 0;
    for orphan in &orphans {
        let Ok(patch_id) = repo.patch_id(orphan) else {
            unmatched += 1;
            continue;
        };
        if patch_id.is_empty() {
            unmatched += 1;
            continue;
        }
        match candidates_by_patch_id.get(&patch_id) {
            Some(matches) if matches.len() == 1 => {
                let target = matches[0];
                if let Some(body) = shiftlog_vcs::read_note(&repo, &config.notes_ref, orphan)? {
                    shiftlog_vcs::write_note(&repo, &config.notes_ref, target, &body)
                        .with_context(|| format!("copying annotation from {orphan} to {target}"))?;
                    remapped += 1;
                } else {
                    unmatched += 1;
                }
            }
            _ => unmatched += 1,
        }
    }

    Ok(RemapReport {
        remapped,
        unmatched_orphans: unmatched,
    })
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
    fn no_orphans_is_a_clean_report() {
        let dir = init_repo();
        let config = Config::default();
        let report = remap(dir.path(), &config).unwrap();
        assert_eq!(report.remapped, 0);
        assert_eq!(report.unmatched_orphans, 0);
    }

    #[test]
    fn orphan_with_matching_patch_id_is_remapped() {
        let dir = init_repo();
        let config = Config::default();
        let repo = Repo::discover(dir.path()).unwrap();
        let original = repo.resolve_commit("HEAD").unwrap();
        shiftlog_vcs::write_note(&repo, &config.notes_ref, &original, "annotation body").unwrap();

        // Simulate a server-side rebase: amend the commit so its hash
        // changes but the diff content (and therefore patch-id) does not.
        Command::new("git")
            .args(["commit", "--amend", "-q", "--no-edit", "--author", "Someone Else <x@example.com>"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        let report = remap(dir.path(), &config).unwrap();
        assert_eq!(report.remapped, 1);
        assert_eq!(report.unmatched_orphans, 0);

        let new_head = repo.resolve_commit("HEAD").unwrap();
        assert_ne!(new_head, original);
        assert_eq!(
            shiftlog_vcs::read_note(&repo, &config.notes_ref, &new_head).unwrap(),
            Some("annotation body".to_string())
        );
        // Original annotation is preserved, not deleted.
        assert!(shiftlog_vcs::read_note(&repo, &config.notes_ref, &original).unwrap().is_some());
    }
}
