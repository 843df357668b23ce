use crate::error::{Error, Result};
use crate::traits::Agent;

/// Name used when a repo-local config omits `agent`, for backward
/// compatibility with pre-agent-field captures.
pub const DEFAULT_AGENT_NAME: &str = "claude";

/// Look up an agent implementation by its `name()`.
pub fn get_agent(name: &str) -> Result<Box<dyn Agent>> {
    match name {
        "claude" => Ok(Box::new(crate::claude::ClaudeAgent)),
        "gemini" => Ok(Box::new(crate::gemini::GeminiAgent)),
        "codex" => Ok(Box::new(crate::codex::CodexAgent)),
        "copilot" => Ok(Box::new(crate::copilot::CopilotAgent)),
        "opencode" => Ok(Box::new(crate::opencode::OpenCodeAgent)),
        other => Err(Error::UnknownAgent(other.to_string())),
    }
}

/// Every agent name the registry knows, in a stable order.
pub fn agent_names() -> &'static [&'static str] {
    &["claude", "gemini", "codex", "copilot", "opencode"]
}

/// One boxed implementation per registered agent.
pub fn all_agents() -> Vec<Box<dyn Agent>> {
    agent_names()
        .iter()
        .map(|name| get_agent(name).expect("agent_names() entries must be registered"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_name_resolves() {
        for name in agent_names() {
            let agent = get_agent(name).unwrap();
            assert_eq!(agent.name(), *name);
        }
    }

    #[test]
    fn unknown_name_errors() {
        assert!(matches!(get_agent("nonexistent"), Err(Error::UnknownAgent(_))));
    }

    #[test]
    fn all_agents_returns_one_per_name() {
        assert_eq!(all_agents().len(), agent_names().len());
    }
}
