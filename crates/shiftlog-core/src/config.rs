//! Repo-local configuration: load/save, and the flag → env → file → default
//! resolution cascade used by every command that needs an agent name or
//! notes ref.

use std::path::Path;

use anyhow::{Context, Result};
use shiftlog_types::Config;

const CONFIG_REL: &str = ".shiftlog/config.json";

pub fn config_path(repo_root: &Path) -> std::path::PathBuf {
    repo_root.join(CONFIG_REL)
}

/// Load the repo-local config file, if present. Absence is not an error —
/// every caller must fall back to `Config::default()`.
pub fn load(repo_root: &Path) -> Result<Option<Config>> {
    let path = config_path(repo_root);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let config = Config::from_json(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}

/// Write the repo-local config file via write-and-rename, creating
/// `.shiftlog/` as needed.
pub fn save(repo_root: &Path, config: &Config) -> Result<()> {
    let path = config_path(repo_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = config.to_json()?;
    let tmp_path = path.with_extension("json.shiftlog-tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// Remove the repo-local config file, if present. Never errors on absence.
pub fn remove(repo_root: &Path) -> Result<()> {
    let path = config_path(repo_root);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
    }
}

/// Resolve the effective config for an invocation: explicit CLI flag wins,
/// then `SHIFTLOG_AGENT`/`SHIFTLOG_NOTES_REF`, then the repo-local config
/// file, then `Config::default()`.
pub fn resolve(repo_root: &Path, agent_flag: Option<&str>, notes_ref_flag: Option<&str>) -> Result<Config> {
    let on_disk = load(repo_root)?;
    let default = Config::default();

    let agent = agent_flag
        .map(str::to_string)
        .or_else(|| std::env::var("SHIFTLOG_AGENT").ok())
        .or_else(|| on_disk.as_ref().map(|c| c.agent.clone()))
        .unwrap_or_else(|| default.agent.clone());

    let notes_ref = notes_ref_flag
        .map(str::to_string)
        .or_else(|| std::env::var("SHIFTLOG_NOTES_REF").ok())
        .or_else(|| on_disk.as_ref().map(|c| c.notes_ref.clone()))
        .unwrap_or_else(|| default.notes_ref.clone());

    Ok(Config::new(agent, notes_ref)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let config = Config::new("codex", "refs/notes/shiftlog").unwrap();
        save(dir.path(), &config).unwrap();
        assert_eq!(load(dir.path()).unwrap(), Some(config));
    }

    #[test]
    fn resolve_falls_back_to_default_when_nothing_set() {
        let dir = TempDir::new().unwrap();
        let config = resolve(dir.path(), None, None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn resolve_flag_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        save(dir.path(), &Config::new("claude", "refs/notes/shiftlog").unwrap()).unwrap();
        let config = resolve(dir.path(), Some("gemini"), None).unwrap();
        assert_eq!(config.agent, "gemini");
    }

    #[test]
    fn remove_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(remove(dir.path()).is_ok());
    }
}
