use chrono::{DateTime, Utc};
use std::path::Path;

/// The window within which a session is considered "active" for
/// `DiscoverSession` purposes.
pub const RECENCY_WINDOW_MINUTES: i64 = 5;

/// Loose, intentionally permissive commit-command check shared by every
/// agent's `IsCommitCommand`. False positives are fine; false negatives
/// would silently drop a conversation.
pub fn is_commit_command(command: &str) -> bool {
    command.contains("git commit") || command.contains("git-commit")
}

/// Whether `modified` falls within the recency window measured from `now`.
pub fn within_recency_window(modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let elapsed = now.signed_duration_since(modified);
    elapsed >= chrono::Duration::zero() && elapsed <= chrono::Duration::minutes(RECENCY_WINDOW_MINUTES)
}

/// Compare two paths for equality after resolving symlinks, falling back to
/// plain equality when canonicalization fails (e.g. the path doesn't exist
/// yet). Used when matching a hook-reported project path against a
/// provider's on-disk session directory, which may traverse a symlinked
/// home directory.
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => a == b,
    }
}

/// Expand a leading `~/` against `$HOME`. Returns the path unchanged if it
/// has no such prefix or `$HOME` is unset.
pub fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    std::path::PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_git_commit_substring() {
        assert!(is_commit_command("git commit -m 'x'"));
        assert!(is_commit_command("cd foo && git commit --amend"));
        assert!(is_commit_command("git-commit-tool wraps git-commit"));
        assert!(!is_commit_command("git status"));
        assert!(!is_commit_command("git log"));
    }

    #[test]
    fn recency_window_accepts_recent_and_rejects_stale() {
        let now = Utc::now();
        assert!(within_recency_window(now - chrono::Duration::minutes(2), now));
        assert!(within_recency_window(now, now));
        assert!(!within_recency_window(now - chrono::Duration::minutes(10), now));
        assert!(!within_recency_window(now + chrono::Duration::minutes(1), now));
    }
}
