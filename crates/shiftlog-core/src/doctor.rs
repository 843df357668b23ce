//! `doctor`: aggregates environment, configuration, and per-agent hook
//! diagnostics into one pass.

use std::path::Path;
use std::process::Command;

use anyhow::Result;
use shiftlog_agents::{all_agents, DiagnosticCheck};
use shiftlog_types::Config;

const MIN_GIT_VERSION: (u32, u32) = (2, 25);

fn git_version_check() -> DiagnosticCheck {
    let output = match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            return DiagnosticCheck::fail("git.present", format!("git exited non-zero: {}", String::from_utf8_lossy(&output.stderr)))
        }
        Err(err) => return DiagnosticCheck::fail("git.present", format!("git binary not found on PATH: {err}")),
    };
    let text = String::from_utf8_lossy(&output.stdout);
    match parse_git_version(&text) {
        Some((major, minor)) if (major, minor) >= MIN_GIT_VERSION => {
            DiagnosticCheck::pass("git.version", format!("git {major}.{minor} (>= 2.25, reliable notes.rewriteRef support)"))
        }
        Some((major, minor)) => {
            DiagnosticCheck::fail("git.version", format!("git {major}.{minor} is older than the required 2.25"))
        }
        None => DiagnosticCheck::fail("git.version", format!("could not parse git version from: {}", text.trim())),
    }
}

fn parse_git_version(text: &str) -> Option<(u32, u32)> {
    let version = text.split_whitespace().nth(2)?;
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

fn agent_binary_check(agent_name: &str) -> DiagnosticCheck {
    let found = std::env::var_os("PATH").is_some_and(|path| {
        std::env::split_paths(&path).any(|dir| dir.join(agent_name).exists())
    });
    if found {
        DiagnosticCheck::pass(format!("agent.{agent_name}.binary"), format!("{agent_name} found on PATH"))
    } else {
        DiagnosticCheck::fail(format!("agent.{agent_name}.binary"), format!("{agent_name} not found on PATH"))
    }
}

fn config_checks(repo_root: &Path) -> Vec<DiagnosticCheck> {
    let path = crate::config::config_path(repo_root);
    if !path.exists() {
        return vec![DiagnosticCheck::fail("config.present", "no repo-local config; run `shiftlog init`")];
    }
    match crate::config::load(repo_root) {
        Ok(Some(config)) => match Config::new(config.agent.clone(), config.notes_ref.clone()) {
            Ok(_) => vec![DiagnosticCheck::pass("config.valid", format!("agent={}, notes_ref={}", config.agent, config.notes_ref))],
            Err(err) => vec![DiagnosticCheck::fail("config.valid", err.to_string())],
        },
        Ok(None) => vec![DiagnosticCheck::fail("config.present", "no repo-local config; run `shiftlog init`")],
        Err(err) => vec![DiagnosticCheck::fail("config.parseable", err.to_string())],
    }
}

fn repo_hooks_check(repo_root: &Path) -> DiagnosticCheck {
    if crate::repo_hooks::is_configured(repo_root) {
        DiagnosticCheck::pass("repo_hooks.installed", "pre-push/post-merge/post-checkout/post-commit all carry the managed block")
    } else {
        DiagnosticCheck::fail("repo_hooks.installed", "one or more repository hooks are missing their managed block")
    }
}

/// Run every check. Never fails outright — a check that can't even be
/// attempted (e.g. no config to read the configured agent from) becomes a
/// failing check, not a propagated error, since `doctor`'s entire point is
/// to report status even when things are broken.
pub fn run(repo_root: &Path) -> Result<Vec<DiagnosticCheck>> {
    let mut checks = vec![git_version_check()];
    checks.extend(config_checks(repo_root));
    checks.push(repo_hooks_check(repo_root));

    if let Ok(Some(config)) = crate::config::load(repo_root) {
        checks.push(agent_binary_check(&config.agent));
        if let Ok(agent) = shiftlog_agents::get_agent(&config.agent) {
            checks.extend(agent.diagnose_hooks(repo_root));
        }
    } else {
        for agent in all_agents() {
            checks.push(agent_binary_check(agent.name()));
        }
    }

    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_git_version_string() {
        assert_eq!(parse_git_version("git version 2.43.0"), Some((2, 43)));
    }

    #[test]
    fn rejects_unparseable_version_string() {
        assert_eq!(parse_git_version("not git at all"), None);
    }

    #[test]
    fn missing_config_yields_a_failing_check() {
        let dir = tempfile::TempDir::new().unwrap();
        let checks = run(dir.path()).unwrap();
        assert!(checks.iter().any(|c| c.name == "config.present" && !c.ok));
    }
}
