use std::collections::HashSet;
use std::io::Write;
use std::process::Stdio;

use crate::error::{Error, Result};
use crate::repo::Repo;

/// Read the note attached to `commit` under `notes_ref`, if any. `git notes
/// show` exits non-zero when no note exists — that is not an error here.
pub fn read(repo: &Repo, notes_ref: &str, commit: &str) -> Result<Option<String>> {
    let output = repo
        .command(&["notes", &format!("--ref={notes_ref}"), "show", commit])
        .output()?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8(output.stdout)?))
}

/// Write (overwrite) the note on `commit` under `notes_ref`, piping
/// `content` in on stdin via `-F -` so arbitrarily large annotations never
/// touch the argv size limit.
pub fn write(repo: &Repo, notes_ref: &str, commit: &str, content: &str) -> Result<()> {
    let mut child = repo
        .command(&["notes", &format!("--ref={notes_ref}"), "add", "-f", "-F", "-", commit])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(content.as_bytes())?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(Error::GitFailed {
            args: vec!["notes".into(), "add".into()],
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(())
}

/// Every commit carrying a note under `notes_ref`.
pub fn list_noted_commits(repo: &Repo, notes_ref: &str) -> Result<Vec<String>> {
    let output = repo.command(&["notes", &format!("--ref={notes_ref}"), "list"]).output()?;
    if !output.status.success() {
        // No notes ref yet: `git notes list` on a nonexistent ref is empty, not fatal.
        return Ok(Vec::new());
    }
    let stdout = String::from_utf8(output.stdout)?;
    // Each line is "<note-blob-sha> <annotated-object-sha>".
    Ok(stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|s| s.to_string())
        .collect())
}

/// Annotated commits that are also reachable from HEAD, in `rev-list`
/// order (most recent first).
pub fn annotated_commits_on_head(repo: &Repo, notes_ref: &str) -> Result<Vec<String>> {
    let noted: HashSet<String> = list_noted_commits(repo, notes_ref)?.into_iter().collect();
    Ok(repo
        .rev_list_head()?
        .into_iter()
        .filter(|sha| noted.contains(sha))
        .collect())
}

/// Register `notes_ref` to carry forward across rewrites: `notes.rewriteRef`
/// plus the amend/rebase opt-ins.
pub fn configure_rewrite_ref(repo: &Repo, notes_ref: &str) -> Result<()> {
    repo.set_config("notes.rewriteRef", notes_ref)?;
    repo.set_config("notes.rewrite.amend", "true")?;
    repo.set_config("notes.rewrite.rebase", "true")?;
    Ok(())
}
