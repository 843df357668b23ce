use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::error::Result;
use crate::helpers::{expand_home, within_recency_window};
use crate::traits::DiscoveredSession;

pub fn sessions_root() -> PathBuf {
    expand_home("~/.codex/sessions")
}

/// Codex lays sessions out under `YYYY/MM/DD/rollout-<ts>-<id>.jsonl` with no
/// per-project directory, so discovery walks the whole tree (bounded to a
/// few levels) rather than a single project folder, and relies purely on the
/// recency window to avoid picking up an unrelated project's session.
pub fn discover(project_path: &Path) -> Result<Option<DiscoveredSession>> {
    let root = sessions_root();
    if !root.is_dir() {
        return Ok(None);
    }

    let now = Utc::now();
    let mut best: Option<(PathBuf, chrono::DateTime<Utc>)> = None;

    for entry in WalkDir::new(&root).max_depth(4).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !name.starts_with("rollout-") || path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(m) => chrono::DateTime::<Utc>::from(m),
            None => continue,
        };
        if !within_recency_window(modified, now) {
            continue;
        }
        let is_better = match &best {
            Some((_, best_modified)) => modified > *best_modified,
            None => true,
        };
        if is_better {
            best = Some((path.to_path_buf(), modified));
        }
    }

    Ok(best.map(|(path, modified)| {
        let session_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .to_string();
        DiscoveredSession {
            session_id,
            transcript_path: path,
            started_at: modified,
            project_path: project_path.to_path_buf(),
        }
    }))
}
