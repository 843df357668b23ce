//! Assertions tailored to shiftlog's annotation domain: does a commit carry
//! a well-formed, decodable note, does it belong to the session we expect.

use anyhow::{Context, Result};
use shiftlog_types::Record;

use crate::world::TestWorld;

/// Read and parse the note `shiftlog` wrote on `commit`, failing the test
/// with a clear message if it's missing or malformed.
pub fn annotation_on(world: &TestWorld, notes_ref: &str, commit: &str) -> Result<Record> {
    let raw = world
        .read_note(notes_ref, commit)
        .with_context(|| format!("no note on {commit} under {notes_ref}"))?;
    Record::from_json(raw.as_bytes()).with_context(|| format!("note on {commit} is not a valid record"))
}

/// Assert `commit` carries a note whose session id matches `expected`.
pub fn assert_session_id(world: &TestWorld, notes_ref: &str, commit: &str, expected: &str) -> Result<()> {
    let record = annotation_on(world, notes_ref, commit)?;
    if record.session_id != expected {
        anyhow::bail!("commit {commit} has session_id {:?}, expected {:?}", record.session_id, expected);
    }
    Ok(())
}

/// Assert `commit` carries a note attributed to `expected` agent.
pub fn assert_agent(world: &TestWorld, notes_ref: &str, commit: &str, expected: &str) -> Result<()> {
    let record = annotation_on(world, notes_ref, commit)?;
    if record.agent_name() != expected {
        anyhow::bail!("commit {commit} has agent {:?}, expected {:?}", record.agent_name(), expected);
    }
    Ok(())
}

/// Assert `commit`'s note decodes and its checksum verifies.
pub fn assert_transcript_intact(world: &TestWorld, notes_ref: &str, commit: &str) -> Result<()> {
    let record = annotation_on(world, notes_ref, commit)?;
    let decoded = record.decode_transcript().context("decoding transcript payload")?;
    if !decoded.checksum_ok {
        anyhow::bail!("commit {commit}'s transcript failed its checksum");
    }
    Ok(())
}

/// Assert `commit` carries no note under `notes_ref`.
pub fn assert_no_annotation(world: &TestWorld, notes_ref: &str, commit: &str) -> Result<()> {
    if world.read_note(notes_ref, commit).is_some() {
        anyhow::bail!("expected no note on {commit} under {notes_ref}, but found one");
    }
    Ok(())
}
