use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use assert_cmd::Command as AssertCommand;
use tempfile::TempDir;

/// An isolated git repository plus a fake `$HOME`, wired up to drive the
/// `shiftlog` binary end to end.
///
/// ```no_run
/// use shiftlog_testing::TestWorld;
///
/// let world = TestWorld::new();
/// world.run(&["init"]).success();
/// ```
pub struct TestWorld {
    _temp_dir: TempDir,
    repo_root: PathBuf,
    home: PathBuf,
    env: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a fresh repo with one commit on `main` and an isolated home
    /// directory (so agent hook/session discovery never touches the real
    /// `~/.claude`, `~/.gemini`, etc).
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let repo_root = temp_dir.path().join("repo");
        let home = temp_dir.path().join("home");
        std::fs::create_dir_all(&repo_root).expect("create repo dir");
        std::fs::create_dir_all(&home).expect("create home dir");

        run_git(&repo_root, &["init", "-q", "-b", "main"]);
        run_git(&repo_root, &["config", "user.email", "test@example.com"]);
        run_git(&repo_root, &["config", "user.name", "Test"]);
        std::fs::write(repo_root.join("README.md"), "hello\n").expect("write README");
        run_git(&repo_root, &["add", "."]);
        run_git(&repo_root, &["commit", "-q", "-m", "initial"]);

        let mut env = HashMap::new();
        env.insert("HOME".to_string(), home.to_string_lossy().into_owned());

        TestWorld {
            _temp_dir: temp_dir,
            repo_root,
            home,
            env,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Override or add an environment variable passed to every subsequent
    /// `shiftlog` invocation (e.g. `SHIFTLOG_AGENT`).
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Write a file relative to the repo root, creating parent directories.
    pub fn write_file(&self, relpath: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.repo_root.join(relpath);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a file at an absolute path (e.g. into the fake home), creating
    /// parent directories.
    pub fn write_absolute(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Stage everything and commit, returning the new commit's full hash.
    pub fn commit(&self, message: &str) -> Result<String> {
        run_git(&self.repo_root, &["add", "-A"]);
        run_git(&self.repo_root, &["commit", "-q", "--allow-empty", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> Result<String> {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(&self.repo_root)
            .output()
            .context("running git rev-parse HEAD")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Read `refs/notes/<notes_ref suffix>` for a commit directly via git,
    /// bypassing the CLI, for assertions that shouldn't depend on `shiftlog
    /// show`'s own formatting.
    pub fn read_note(&self, notes_ref: &str, commit: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["notes", "--ref", notes_ref, "show", commit])
            .current_dir(&self.repo_root)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Build a `shiftlog` invocation rooted at this repo, with the fake
    /// home and any overrides from [`TestWorld::set_env`] applied.
    pub fn command(&self) -> AssertCommand {
        let mut cmd = AssertCommand::cargo_bin("shiftlog").expect("shiftlog binary built by this workspace");
        cmd.current_dir(&self.repo_root);
        cmd.env_clear();
        // Keep PATH so `git` and agent binaries used by `doctor` resolve.
        if let Ok(path) = std::env::var("PATH") {
            cmd.env("PATH", path);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    /// Convenience: run `shiftlog <args>` and return the assertion so
    /// callers can chain `.success()`, `.stdout(...)`, etc.
    pub fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert()
    }

    /// Run `shiftlog <args>` feeding `stdin` bytes, as a tool hook would.
    pub fn run_with_stdin(&self, args: &[&str], stdin: impl Into<Vec<u8>>) -> assert_cmd::assert::Assert {
        self.command().args(args).write_stdin(stdin.into()).assert()
    }
}

fn run_git(repo_root: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .unwrap_or_else(|err| panic!("failed to run git {args:?}: {err}"));
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
