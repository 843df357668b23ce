use std::io::Read;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::args::{Cli, Command, OutputFormat, SyncAction};
use crate::output;

pub fn run(cli: Cli) -> Result<()> {
    let repo_root = std::env::current_dir().context("reading current directory")?;
    let config = shiftlog_core::resolve_config(&repo_root, cli.agent.as_deref(), cli.notes_ref.as_deref())
        .context("resolving configuration")?;

    match cli.command {
        Command::Init { agent, notes_ref } => {
            let config = shiftlog_core::init(&repo_root, agent.as_deref(), notes_ref.as_deref())?;
            println!("initialized shiftlog: agent={}, notes_ref={}", config.agent, config.notes_ref);
            Ok(())
        }
        Command::Deinit => {
            shiftlog_core::deinit(&repo_root)?;
            println!("removed shiftlog hooks and configuration (annotations preserved)");
            Ok(())
        }
        Command::Store { hookless } => run_store(&repo_root, &config, hookless),
        Command::Resume { commit_ref, force } => run_resume(&repo_root, &config, &commit_ref, force),
        Command::List => {
            let annotations = shiftlog_core::list_annotations(&repo_root, &config)?;
            output::print_list(cli.format, &annotations);
            Ok(())
        }
        Command::Show { reference } => {
            let (commit, record) = shiftlog_core::show_annotation(&repo_root, &config, Some(&reference))?;
            output::print_show(cli.format, &commit, &record)
        }
        Command::Search {
            query,
            agent,
            branch,
            model,
            before,
            after,
            regex,
            case_sensitive,
            context,
            limit,
            metadata_only,
        } => run_search(
            &repo_root,
            &config,
            cli.format,
            &query,
            agent,
            branch,
            model,
            before.as_deref(),
            after.as_deref(),
            regex,
            case_sensitive,
            context,
            limit,
            metadata_only,
        ),
        Command::Sync { action } => match action {
            SyncAction::Push { remote } => {
                shiftlog_core::sync_push(&repo_root, &config, remote.as_deref())?;
                println!("pushed {} to {}", config.notes_ref, remote.as_deref().unwrap_or("origin"));
                Ok(())
            }
            SyncAction::Pull { remote } => {
                shiftlog_core::sync_pull(&repo_root, &config, remote.as_deref())?;
                println!("pulled and merged {} from {}", config.notes_ref, remote.as_deref().unwrap_or("origin"));
                Ok(())
            }
        },
        Command::Remap => {
            let report = shiftlog_core::remap(&repo_root, &config)?;
            println!("remapped {} annotation(s), {} orphan(s) unmatched", report.remapped, report.unmatched_orphans);
            Ok(())
        }
        Command::Doctor => {
            let checks = shiftlog_core::doctor(&repo_root)?;
            let failed = checks.iter().any(|c| !c.ok);
            output::print_doctor(cli.format, &checks);
            if failed {
                anyhow::bail!("one or more diagnostic checks failed");
            }
            Ok(())
        }
    }
}

fn run_store(repo_root: &std::path::Path, config: &shiftlog_types::Config, hookless: bool) -> Result<()> {
    if hookless {
        return shiftlog_core::store(repo_root, config, None);
    }
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf).context("reading hook input from stdin")?;
    shiftlog_core::store(repo_root, config, Some(&buf))
}

fn run_resume(repo_root: &std::path::Path, config: &shiftlog_types::Config, commit_ref: &str, force: bool) -> Result<()> {
    let plan = shiftlog_core::prepare_resume(repo_root, config, commit_ref, force)?;
    println!(
        "restored {} entries{}",
        plan.entry_count,
        plan.title_hint.as_deref().map(|t| format!(" — {t}")).unwrap_or_default()
    );
    let err = exec_replace(&plan.binary, &plan.args);
    Err(err).with_context(|| format!("executing {} {:?}", plan.binary, plan.args))
}

#[cfg(unix)]
fn exec_replace(binary: &str, args: &[String]) -> std::io::Error {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(program) = CString::new(binary.as_bytes()) else {
        return std::io::Error::new(std::io::ErrorKind::InvalidInput, "binary name contains a NUL byte");
    };
    let mut c_args = vec![program.clone()];
    for arg in args {
        match CString::new(std::ffi::OsStr::new(arg).as_bytes()) {
            Ok(c_arg) => c_args.push(c_arg),
            Err(_) => return std::io::Error::new(std::io::ErrorKind::InvalidInput, "argument contains a NUL byte"),
        }
    }
    let mut argv: Vec<*const libc::c_char> = c_args.iter().map(|a| a.as_ptr()).collect();
    argv.push(std::ptr::null());
    unsafe {
        libc::execvp(program.as_ptr(), argv.as_ptr());
    }
    std::io::Error::last_os_error()
}

#[cfg(not(unix))]
fn exec_replace(binary: &str, args: &[String]) -> std::io::Error {
    match std::process::Command::new(binary).args(args).status() {
        Ok(status) => {
            std::process::exit(status.code().unwrap_or(1));
        }
        Err(err) => err,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_search(
    repo_root: &std::path::Path,
    config: &shiftlog_types::Config,
    format: OutputFormat,
    query: &str,
    agent: Option<String>,
    branch: Option<String>,
    model: Option<String>,
    before: Option<&str>,
    after: Option<&str>,
    use_regex: bool,
    case_sensitive: bool,
    context: usize,
    limit: Option<usize>,
    metadata_only: bool,
) -> Result<()> {
    let mut filter = shiftlog_core::SearchFilter {
        agent,
        branch,
        model,
        case_sensitive,
        metadata_only,
        limit,
        ..Default::default()
    };
    if let Some(before) = before {
        filter.before = Some(parse_timestamp(before)?);
    }
    if let Some(after) = after {
        filter.after = Some(parse_timestamp(after)?);
    }
    if use_regex {
        filter.regex = Some(regex::Regex::new(query).with_context(|| format!("invalid --regex pattern: {query}"))?);
    }

    let hits = shiftlog_core::search_annotations(repo_root, config, query, &filter)?;
    output::print_search_hits(format, query, context, &hits)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    anyhow::bail!("could not parse {raw:?} as an RFC 3339 timestamp or YYYY-MM-DD date")
}
