use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default annotation reference, chosen to avoid polluting git's default
/// notes namespace (`refs/notes/commits`).
pub const DEFAULT_NOTES_REF: &str = "refs/notes/shiftlog";

/// Default agent when none is configured.
pub const DEFAULT_AGENT: &str = "claude";

/// Repo-local configuration file. Absence implies
/// defaults; every reader of this struct must tolerate a missing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub agent: String,
    pub notes_ref: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            agent: DEFAULT_AGENT.to_string(),
            notes_ref: DEFAULT_NOTES_REF.to_string(),
        }
    }
}

impl Config {
    pub fn new(agent: impl Into<String>, notes_ref: impl Into<String>) -> Result<Self> {
        let config = Config {
            agent: agent.into(),
            notes_ref: notes_ref.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.notes_ref.starts_with("refs/notes/") {
            return Err(Error::InvalidNotesRef(self.notes_ref.clone()));
        }
        Ok(())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Config = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_notes_ref_outside_refs_notes() {
        let err = Config::new("claude", "refs/heads/main").unwrap_err();
        assert!(matches!(err, Error::InvalidNotesRef(_)));
    }

    #[test]
    fn json_round_trip() {
        let config = Config::new("codex", "refs/notes/shiftlog").unwrap();
        let json = config.to_json().unwrap();
        let parsed = Config::from_json(json.as_bytes()).unwrap();
        assert_eq!(config, parsed);
    }
}
