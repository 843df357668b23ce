//! Rendering for read-only commands. Text output colorizes when stdout is a
//! TTY (`owo-colors` + `is-terminal`); JSON output never colorizes and is
//! meant for piping into other tools.

use std::io::IsTerminal;

use owo_colors::OwoColorize;
use shiftlog_agents::DiagnosticCheck;
use shiftlog_core::SearchHit;
use shiftlog_types::Record;

use crate::args::OutputFormat;

pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

fn short(commit: &str) -> &str {
    &commit[..commit.len().min(12)]
}

pub fn print_record_summary(commit: &str, record: &Record) {
    if stdout_is_tty() {
        println!(
            "{}  {}  {}",
            short(commit).yellow(),
            record.agent_name().cyan(),
            record.timestamp.to_rfc3339()
        );
    } else {
        println!("{}  {}  {}", short(commit), record.agent_name(), record.timestamp.to_rfc3339());
    }
    println!(
        "  session {}  branch {}  {} entries  {} turns",
        record.session_id,
        record.git_branch,
        record.message_count,
        record.effort.as_ref().map(|e| e.turns).unwrap_or_default()
    );
}

pub fn print_list(format: OutputFormat, annotations: &[(String, Record)]) {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = annotations
                .iter()
                .map(|(commit, record)| serde_json::json!({"commit": commit, "record": record}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
        }
        OutputFormat::Text => {
            if annotations.is_empty() {
                println!("no annotated commits on this branch");
                return;
            }
            for (commit, record) in annotations {
                print_record_summary(commit, record);
            }
        }
    }
}

pub fn print_show(format: OutputFormat, commit: &str, record: &Record) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        OutputFormat::Text => {
            print_record_summary(commit, record);
            let decoded = record.decode_transcript()?;
            if !decoded.checksum_ok {
                print_warning(&format!("checksum mismatch on {commit}'s annotation"));
            }
            println!();
            println!("{}", String::from_utf8_lossy(&decoded.bytes));
        }
    }
    Ok(())
}

pub fn print_search_hits(format: OutputFormat, query: &str, context: usize, hits: &[SearchHit]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = hits
                .iter()
                .map(|hit| serde_json::json!({"commit": hit.commit, "record": hit.record, "match_offsets": hit.match_offsets}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("no matches");
                return Ok(());
            }
            for hit in hits {
                print_record_summary(&hit.commit, &hit.record);
                if query.is_empty() || hit.match_offsets.is_empty() {
                    continue;
                }
                let decoded = hit.record.decode_transcript()?;
                let text = String::from_utf8_lossy(&decoded.bytes);
                for &offset in &hit.match_offsets {
                    println!("  {}", excerpt(&text, offset, context));
                }
            }
        }
    }
    Ok(())
}

fn excerpt(text: &str, offset: usize, context: usize) -> String {
    let start = offset.saturating_sub(context);
    let end = (offset + context).min(text.len());
    // Clamp to char boundaries so an excerpt never splits a multi-byte codepoint.
    let start = (start..=offset).find(|&i| text.is_char_boundary(i)).unwrap_or(offset);
    let end = (end..=text.len()).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(end);
    text[start..end].replace('\n', " ")
}

pub fn print_doctor(format: OutputFormat, checks: &[DiagnosticCheck]) {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = checks
                .iter()
                .map(|c| serde_json::json!({"name": c.name, "ok": c.ok, "message": c.message}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
        }
        OutputFormat::Text => {
            for check in checks {
                let mark = if check.ok { "ok".to_string() } else { "FAIL".to_string() };
                if stdout_is_tty() {
                    let mark = if check.ok { mark.green().to_string() } else { mark.red().bold().to_string() };
                    println!("[{mark}] {}: {}", check.name, check.message);
                } else {
                    println!("[{mark}] {}: {}", check.name, check.message);
                }
            }
            let failures = checks.iter().filter(|c| !c.ok).count();
            if failures > 0 {
                println!("\n{failures} check(s) failed");
            }
        }
    }
}

pub fn print_warning(message: &str) {
    if stdout_is_tty() {
        eprintln!("{} {message}", "warning:".yellow().bold());
    } else {
        eprintln!("warning: {message}");
    }
}
