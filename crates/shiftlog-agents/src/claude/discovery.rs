use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::error::Result;
use crate::helpers::{expand_home, within_recency_window};
use crate::traits::DiscoveredSession;

/// Encode a project path the way Claude Code names its session directory:
/// every path separator becomes a dash.
pub fn dash_encode(project_path: &Path) -> String {
    project_path.to_string_lossy().replace('/', "-")
}

pub fn projects_root() -> PathBuf {
    expand_home("~/.claude/projects")
}

pub fn session_dir(project_path: &Path) -> PathBuf {
    projects_root().join(dash_encode(project_path))
}

pub fn discover(project_path: &Path) -> Result<Option<DiscoveredSession>> {
    let dir = session_dir(project_path);
    if !dir.is_dir() {
        return Ok(None);
    }

    let now = Utc::now();
    let mut best: Option<(PathBuf, chrono::DateTime<Utc>)> = None;

    for entry in WalkDir::new(&dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
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
            .unwrap_or_default();
        DiscoveredSession {
            session_id,
            transcript_path: path,
            started_at: modified,
            project_path: project_path.to_path_buf(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_encode_replaces_slashes() {
        assert_eq!(dash_encode(Path::new("/Users/me/project")), "-Users-me-project");
    }
}
