use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::Result;
use crate::helpers::{expand_home, within_recency_window};
use crate::traits::DiscoveredSession;

fn project_id(project_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn storage_root() -> PathBuf {
    expand_home("~/.local/share/opencode/storage")
}

pub fn session_dir(project_path: &Path) -> PathBuf {
    storage_root().join("session").join(project_id(project_path))
}

pub fn message_dir(project_path: &Path, session_id: &str) -> PathBuf {
    storage_root().join("message").join(project_id(project_path)).join(session_id)
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
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
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
        let session_id = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
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
    fn project_id_is_deterministic() {
        let a = project_id(Path::new("/tmp/some-project"));
        let b = project_id(Path::new("/tmp/some-project"));
        assert_eq!(a, b);
    }
}
