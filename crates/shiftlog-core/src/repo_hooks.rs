//! Installs the repository-level git hooks `init` wires up: pre-push runs
//! `sync push`; post-merge and post-checkout run
//! `sync pull` then `remap`; post-commit (for hookless agents) runs
//! `store` with no stdin. Each hook script carries a managed section
//! delimited by `# shiftlog-managed` markers so `deinit` can strip exactly
//! what `init` added, leaving any pre-existing user hook content intact.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const BEGIN_MARKER: &str = "# shiftlog-managed: begin";
const END_MARKER: &str = "# shiftlog-managed: end";

struct HookSpec {
    name: &'static str,
    body: &'static str,
}

const HOOKS: &[HookSpec] = &[
    HookSpec {
        name: "pre-push",
        body: "shiftlog sync push >/dev/null 2>&1 || true",
    },
    HookSpec {
        name: "post-merge",
        body: "shiftlog sync pull >/dev/null 2>&1 || true\nshiftlog remap >/dev/null 2>&1 || true",
    },
    HookSpec {
        name: "post-checkout",
        body: "shiftlog sync pull >/dev/null 2>&1 || true\nshiftlog remap >/dev/null 2>&1 || true",
    },
    HookSpec {
        name: "post-commit",
        body: "shiftlog store --hookless >/dev/null 2>&1 || true",
    },
];

fn hooks_dir(repo_root: &Path) -> PathBuf {
    repo_root.join(".git/hooks")
}

fn managed_block(body: &str) -> String {
    format!("{BEGIN_MARKER}\n{body}\n{END_MARKER}\n")
}

/// Insert or replace the managed block in `existing`, preserving everything
/// outside the markers. A file with no markers gets the block appended; a
/// missing file starts from a bare shebang.
fn upsert_managed(existing: Option<String>, body: &str) -> String {
    let block = managed_block(body);
    match existing {
        None => format!("#!/bin/sh\n{block}"),
        Some(content) => match (content.find(BEGIN_MARKER), content.find(END_MARKER)) {
            (Some(start), Some(end)) if end > start => {
                let end_of_marker = end + END_MARKER.len();
                let mut out = String::new();
                out.push_str(&content[..start]);
                out.push_str(&block);
                let rest = content[end_of_marker..].trim_start_matches('\n');
                out.push_str(rest);
                out
            }
            _ => {
                let mut out = content;
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&block);
                out
            }
        },
    }
}

/// Strip the managed block from `content`, returning `None` if the result
/// is just a bare shebang (nothing worth keeping).
fn strip_managed(content: &str) -> Option<String> {
    let (start, end) = (content.find(BEGIN_MARKER)?, content.find(END_MARKER)?);
    if end <= start {
        return Some(content.to_string());
    }
    let end_of_marker = end + END_MARKER.len();
    let mut out = String::new();
    out.push_str(&content[..start]);
    out.push_str(content[end_of_marker..].trim_start_matches('\n'));
    if out.trim() == "#!/bin/sh" || out.trim().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Install every repo-level hook, idempotently.
pub fn configure(repo_root: &Path) -> Result<()> {
    let dir = hooks_dir(repo_root);
    std::fs::create_dir_all(&dir)?;
    for spec in HOOKS {
        let path = dir.join(spec.name);
        let existing = std::fs::read_to_string(&path).ok();
        let updated = upsert_managed(existing, spec.body);
        write_executable(&path, &updated)?;
    }
    Ok(())
}

/// Remove every managed block `configure` added, deleting hook files that
/// had no other content.
pub fn remove(repo_root: &Path) -> Result<()> {
    let dir = hooks_dir(repo_root);
    for spec in HOOKS {
        let path = dir.join(spec.name);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        match strip_managed(&content) {
            Some(remaining) => write_executable(&path, &remaining)?,
            None => {
                std::fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            }
        }
    }
    Ok(())
}

fn write_executable(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("shiftlog-tmp");
    std::fs::write(&tmp_path, content)?;
    let mut perms = std::fs::metadata(&tmp_path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&tmp_path, perms)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// True iff every hook `configure` installs carries its managed block.
/// Used by `doctor`.
pub fn is_configured(repo_root: &Path) -> bool {
    let dir = hooks_dir(repo_root);
    HOOKS.iter().all(|spec| {
        std::fs::read_to_string(dir.join(spec.name))
            .map(|content| content.contains(BEGIN_MARKER) && content.contains(END_MARKER))
            .unwrap_or(false)
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
        dir
    }

    #[test]
    fn configure_is_idempotent() {
        let dir = init_repo();
        configure(dir.path()).unwrap();
        let first = std::fs::read_to_string(dir.path().join(".git/hooks/pre-push")).unwrap();
        configure(dir.path()).unwrap();
        let second = std::fs::read_to_string(dir.path().join(".git/hooks/pre-push")).unwrap();
        assert_eq!(first, second);
        assert!(is_configured(dir.path()));
    }

    #[test]
    fn configure_preserves_preexisting_hook_content() {
        let dir = init_repo();
        let hooks_dir = dir.path().join(".git/hooks");
        std::fs::write(hooks_dir.join("pre-push"), "#!/bin/sh\necho custom-user-hook\n").unwrap();
        configure(dir.path()).unwrap();
        let content = std::fs::read_to_string(hooks_dir.join("pre-push")).unwrap();
        assert!(content.contains("echo custom-user-hook"));
        assert!(content.contains("shiftlog sync push"));
    }

    #[test]
    fn remove_drops_managed_block_but_keeps_user_content() {
        let dir = init_repo();
        let hooks_dir = dir.path().join(".git/hooks");
        std::fs::write(hooks_dir.join("pre-push"), "#!/bin/sh\necho custom-user-hook\n").unwrap();
        configure(dir.path()).unwrap();
        remove(dir.path()).unwrap();
        let content = std::fs::read_to_string(hooks_dir.join("pre-push")).unwrap();
        assert!(content.contains("echo custom-user-hook"));
        assert!(!content.contains("shiftlog sync push"));
    }

    #[test]
    fn remove_deletes_hook_file_with_no_other_content() {
        let dir = init_repo();
        configure(dir.path()).unwrap();
        remove(dir.path()).unwrap();
        assert!(!dir.path().join(".git/hooks/pre-push").exists());
        assert!(!is_configured(dir.path()));
    }
}
