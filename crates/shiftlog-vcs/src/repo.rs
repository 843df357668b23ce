use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// A git working tree, addressed by its top-level directory. Every
/// operation shells out to the `git` binary; this crate never links a git
/// library.
#[derive(Debug, Clone)]
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the repository containing `start_dir` (or any ancestor of it).
    pub fn discover(start_dir: &Path) -> Result<Repo> {
        let output = run(start_dir, &["rev-parse", "--show-toplevel"])?;
        let root = PathBuf::from(output.trim());
        Ok(Repo { root })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run(&self.root, args)
    }

    /// Resolve any commit-ish to its full commit hash.
    pub fn resolve_commit(&self, commit_ish: &str) -> Result<String> {
        let spec = format!("{commit_ish}^{{commit}}");
        match self.run(&["rev-parse", "--verify", &spec]) {
            Ok(out) => Ok(out.trim().to_string()),
            Err(_) => Err(Error::UnresolvedRef(commit_ish.to_string())),
        }
    }

    /// The current branch's short name, or `None` in detached-HEAD state.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let out = self.run(&["symbolic-ref", "--short", "-q", "HEAD"]);
        match out {
            Ok(name) if !name.trim().is_empty() => Ok(Some(name.trim().to_string())),
            _ => Ok(None),
        }
    }

    /// True iff the working tree has uncommitted changes (staged or not).
    pub fn is_dirty(&self) -> Result<bool> {
        let out = self.run(&["status", "--porcelain"])?;
        Ok(!out.trim().is_empty())
    }

    /// Check out a branch or commit. Used by `resume` to land on the
    /// annotated commit before restoring its transcript.
    pub fn checkout(&self, target: &str) -> Result<()> {
        self.run(&["checkout", target])?;
        Ok(())
    }

    /// Commits reachable from HEAD, most recent first.
    pub fn rev_list_head(&self) -> Result<Vec<String>> {
        self.rev_list("HEAD")
    }

    /// Commits reachable from `reference`, most recent first.
    pub fn rev_list(&self, reference: &str) -> Result<Vec<String>> {
        let out = self.run(&["rev-list", reference])?;
        Ok(out.lines().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
    }

    /// Every local branch ref name (`refs/heads/...`). Used by `remap` to
    /// enumerate all branch tips, not just the current one.
    pub fn branch_refs(&self) -> Result<Vec<String>> {
        let out = self.run(&["for-each-ref", "--format=%(refname)", "refs/heads/"])?;
        Ok(out.lines().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
    }

    /// Set a git config key (used to register the notes rewrite ref and
    /// the amend/rebase carry-forward behavior on `init`).
    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.run(&["config", key, value])?;
        Ok(())
    }

    /// Fetch and push a ref (used for `sync push`/`sync pull` on the notes
    /// ref). `refspec` is passed through verbatim, e.g.
    /// `refs/notes/shiftlog:refs/notes/shiftlog`.
    pub fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        match self.run(&["push", remote, refspec]) {
            Ok(_) => Ok(()),
            Err(Error::GitFailed { stderr, .. }) if stderr.contains("non-fast-forward") || stderr.contains("fetch first") => {
                Err(Error::NonFastForward)
            }
            Err(err) => Err(err),
        }
    }

    pub fn fetch(&self, remote: &str, refspec: &str) -> Result<()> {
        self.run(&["fetch", remote, refspec])?;
        Ok(())
    }

    pub fn patch_id(&self, commit: &str) -> Result<String> {
        crate::patch_id::compute(self, commit)
    }

    pub(crate) fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.root);
        cmd
    }
}

fn run(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        return Err(Error::GitFailed {
            args: args.iter().map(|s| s.to_string()).collect(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(String::from_utf8(output.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Repo) {
        let dir = TempDir::new().unwrap();
        StdCommand::new("git").args(["init", "-q"]).current_dir(dir.path()).output().unwrap();
        StdCommand::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        StdCommand::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        StdCommand::new("git").args(["add", "."]).current_dir(dir.path()).output().unwrap();
        StdCommand::new("git")
            .args(["commit", "-q", "-m", "initial"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        let repo = Repo::discover(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn discover_finds_toplevel() {
        let (dir, repo) = init_repo();
        assert_eq!(repo.root().canonicalize().unwrap(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn resolve_commit_resolves_head() {
        let (_dir, repo) = init_repo();
        let sha = repo.resolve_commit("HEAD").unwrap();
        assert_eq!(sha.len(), 40);
    }

    #[test]
    fn resolve_unknown_ref_errors() {
        let (_dir, repo) = init_repo();
        assert!(matches!(repo.resolve_commit("nonexistent-ref"), Err(Error::UnresolvedRef(_))));
    }

    #[test]
    fn clean_worktree_is_not_dirty() {
        let (_dir, repo) = init_repo();
        assert!(!repo.is_dirty().unwrap());
    }

    #[test]
    fn untracked_file_marks_worktree_dirty() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("b.txt"), "new").unwrap();
        assert!(repo.is_dirty().unwrap());
    }
}
