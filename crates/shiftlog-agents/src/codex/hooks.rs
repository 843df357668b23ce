use std::path::Path;

use crate::error::Result;
use crate::traits::DiagnosticCheck;

/// Codex has no per-tool hook mechanism: `init` relies entirely on the
/// repository-level post-commit hook that `shiftlog-core` installs, which
/// discovers the active session via the repo-local active-session file.
/// There is nothing agent-side to configure or remove.
pub fn configure(_repo_root: &Path) -> Result<()> {
    Ok(())
}

pub fn remove(_repo_root: &Path) -> Result<()> {
    Ok(())
}

pub fn diagnose(_repo_root: &Path) -> Vec<DiagnosticCheck> {
    vec![DiagnosticCheck::pass(
        "codex.hookless",
        "Codex has no tool hook; capture relies on the repository post-commit hook",
    )]
}
