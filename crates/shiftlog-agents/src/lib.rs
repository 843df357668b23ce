//! Agent contract, registry, and per-agent adapters.
//!
//! Every agent (Claude Code, Gemini CLI, Codex, GitHub Copilot CLI,
//! OpenCode) implements the [`Agent`] trait; callers never switch on agent
//! identity directly, they go through [`registry::get_agent`].

mod claude;
mod codex;
mod copilot;
mod error;
mod gemini;
mod helpers;
mod json_file;
mod ndjson;
mod opencode;
mod registry;
mod traits;

pub use error::{Error, Result};
pub use helpers::{is_commit_command, within_recency_window, RECENCY_WINDOW_MINUTES};
pub use registry::{agent_names, all_agents, get_agent, DEFAULT_AGENT_NAME};
pub use traits::{Agent, DiagnosticCheck, DiscoveredSession, HookInput, RestoreRequest, Summariser};
