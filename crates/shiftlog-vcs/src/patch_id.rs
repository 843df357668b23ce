use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::repo::Repo;

/// A commit's patch identity: stable across rebase/cherry-pick as long as
/// the diff content is unchanged (used by `remap`). Computed as
/// `git diff-tree -p <commit> | git patch-id --stable`, run as two
/// subprocesses connected by an in-process pipe rather than a shell `|`.
pub fn compute(repo: &Repo, commit: &str) -> Result<String> {
    let diff_output = repo.command(&["diff-tree", "-p", commit]).output()?;
    if !diff_output.status.success() {
        return Err(Error::GitFailed {
            args: vec!["diff-tree".into(), "-p".into(), commit.into()],
            stderr: String::from_utf8_lossy(&diff_output.stderr).to_string(),
        });
    }

    let mut patch_id_cmd = Command::new("git")
        .args(["patch-id", "--stable"])
        .current_dir(repo.root())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    patch_id_cmd
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(&diff_output.stdout)?;

    let output = patch_id_cmd.wait_with_output()?;
    if !output.status.success() {
        return Err(Error::GitFailed {
            args: vec!["patch-id".into(), "--stable".into()],
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8(output.stdout)?;
    // Output is "<patch-id> <commit-sha>"; an empty diff (merge commits,
    // already-applied patches) produces no line at all.
    Ok(stdout
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn init_repo_with_commit() -> (TempDir, Repo) {
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
        std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
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
    fn patch_id_is_stable_across_recompute() {
        let (_dir, repo) = init_repo_with_commit();
        let a = compute(&repo, "HEAD").unwrap();
        let b = compute(&repo, "HEAD").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
