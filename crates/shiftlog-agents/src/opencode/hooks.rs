use std::path::Path;

use crate::error::Result;
use crate::traits::DiagnosticCheck;

const PLUGIN_REL: &str = ".opencode/plugins/claudit.js";

const PLUGIN_SOURCE: &str = r#"// shiftlog-managed
export const ShiftlogCapture = async ({ project, client, $ }) => {
  return {
    "tool.execute.after": async (input, output) => {
      await $`shiftlog store`.quiet().nothrow();
    },
  };
};
"#;

fn plugin_path(repo_root: &Path) -> std::path::PathBuf {
    repo_root.join(PLUGIN_REL)
}

pub fn configure(repo_root: &Path) -> Result<()> {
    let path = plugin_path(repo_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("shiftlog-tmp");
    std::fs::write(&tmp, PLUGIN_SOURCE)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

pub fn remove(repo_root: &Path) -> Result<()> {
    let path = plugin_path(repo_root);
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

pub fn diagnose(repo_root: &Path) -> Vec<DiagnosticCheck> {
    let path = plugin_path(repo_root);
    match std::fs::read_to_string(&path) {
        Ok(contents) if contents.contains("tool.execute.after") => {
            vec![DiagnosticCheck::pass("opencode.plugin_file", format!("{PLUGIN_REL} is installed"))]
        }
        Ok(_) => vec![DiagnosticCheck::fail(
            "opencode.plugin_file",
            format!("{PLUGIN_REL} exists but does not register tool.execute.after"),
        )],
        Err(_) => vec![DiagnosticCheck::fail(
            "opencode.plugin_file",
            format!("{PLUGIN_REL} does not exist — run init"),
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn configure_then_diagnose_passes() {
        let dir = TempDir::new().unwrap();
        configure(dir.path()).unwrap();
        let checks = diagnose(dir.path());
        assert!(checks.iter().all(|c| c.ok));
    }

    #[test]
    fn remove_deletes_plugin_file() {
        let dir = TempDir::new().unwrap();
        configure(dir.path()).unwrap();
        remove(dir.path()).unwrap();
        assert!(!plugin_path(dir.path()).exists());
    }
}
