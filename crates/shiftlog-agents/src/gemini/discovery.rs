use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::Result;
use crate::helpers::{expand_home, paths_equal, within_recency_window};
use crate::json_file::load_json;
use crate::traits::DiscoveredSession;

fn projects_index_path() -> PathBuf {
    expand_home("~/.gemini/projects.json")
}

fn sha256_hex(project_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve a project's tmp-directory name: prefer the slug recorded in
/// `~/.gemini/projects.json` (older Gemini CLI versions), fall back to the
/// SHA-256 hash of the project path.
fn resolve_dir_name(project_path: &Path) -> String {
    if let Ok(index) = load_json(&projects_index_path()) {
        if let Some(map) = index.as_object() {
            for (slug, value) in map {
                let recorded_path = value
                    .as_str()
                    .or_else(|| value.get("path").and_then(|v| v.as_str()));
                if let Some(recorded_path) = recorded_path {
                    if paths_equal(Path::new(recorded_path), project_path) {
                        return slug.clone();
                    }
                }
            }
        }
    }
    sha256_hex(project_path)
}

pub fn chats_dir(project_path: &Path) -> PathBuf {
    expand_home("~/.gemini/tmp")
        .join(resolve_dir_name(project_path))
        .join("chats")
}

pub fn discover(project_path: &Path) -> Result<Option<DiscoveredSession>> {
    let dir = chats_dir(project_path);
    if !dir.is_dir() {
        return Ok(None);
    }

    let now = Utc::now();
    let mut best: Option<(PathBuf, chrono::DateTime<Utc>)> = None;

    for entry in WalkDir::new(&dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !name.starts_with("session-") || path.extension().and_then(|e| e.to_str()) != Some("json") {
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
            .map(|s| s.to_string_lossy().trim_start_matches("session-").to_string())
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
    fn sha256_fallback_is_deterministic() {
        let a = resolve_dir_name(Path::new("/tmp/does-not-exist-project"));
        let b = resolve_dir_name(Path::new("/tmp/does-not-exist-project"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
