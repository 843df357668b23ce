use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::error::Result;
use crate::helpers::{expand_home, paths_equal, within_recency_window};
use crate::traits::DiscoveredSession;

pub fn session_state_root() -> PathBuf {
    expand_home("~/.copilot/session-state")
}

fn workspace_path(session_dir: &Path) -> PathBuf {
    session_dir.join("workspace.yaml")
}

/// Read the `path:` key out of a session's `workspace.yaml`. Parsed with a
/// plain line scan rather than a YAML crate: the file is a flat key/value
/// document and this is the only field this system reads.
fn workspace_project_path(session_dir: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(workspace_path(session_dir)).ok()?;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("path:") {
            return Some(PathBuf::from(rest.trim().trim_matches('"')));
        }
    }
    None
}

pub fn discover(project_path: &Path) -> Result<Option<DiscoveredSession>> {
    let root = session_state_root();
    if !root.is_dir() {
        return Ok(None);
    }

    let now = Utc::now();
    let mut best: Option<(PathBuf, PathBuf, chrono::DateTime<Utc>)> = None;

    for entry in WalkDir::new(&root).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let session_dir = entry.path();
        if !session_dir.is_dir() || session_dir == root {
            continue;
        }
        let Some(recorded_path) = workspace_project_path(session_dir) else {
            continue;
        };
        if !paths_equal(&recorded_path, project_path) {
            continue;
        }
        let events_path = session_dir.join("events.jsonl");
        let modified = match std::fs::metadata(&events_path).ok().and_then(|m| m.modified().ok()) {
            Some(m) => chrono::DateTime::<Utc>::from(m),
            None => continue,
        };
        if !within_recency_window(modified, now) {
            continue;
        }
        let is_better = match &best {
            Some((_, _, best_modified)) => modified > *best_modified,
            None => true,
        };
        if is_better {
            best = Some((session_dir.to_path_buf(), events_path, modified));
        }
    }

    Ok(best.map(|(session_dir, events_path, modified)| {
        let session_id = session_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        DiscoveredSession {
            session_id,
            transcript_path: events_path,
            started_at: modified,
            project_path: project_path.to_path_buf(),
        }
    }))
}
