//! `search_annotations`: the one function the
//! thin CLI `search` wrapper calls. Metadata filters run before content
//! matching so a record that can't match is never decompressed.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shiftlog_types::{Config, Record};
use shiftlog_vcs::Repo;

#[derive(Debug, Default, Clone)]
pub struct SearchFilter {
    pub agent: Option<String>,
    pub branch: Option<String>,
    pub model: Option<String>,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
    pub regex: Option<regex::Regex>,
    pub case_sensitive: bool,
    pub metadata_only: bool,
    pub limit: Option<usize>,
}

pub struct SearchHit {
    pub commit: String,
    pub record: Record,
    /// Byte offsets into the decoded transcript where `query` matched.
    /// Empty when `metadata_only` is set or the query is empty.
    pub match_offsets: Vec<usize>,
}

fn matches_metadata(record: &Record, branch: &str, filter: &SearchFilter) -> bool {
    if let Some(agent) = &filter.agent {
        if record.agent_name() != agent {
            return false;
        }
    }
    if let Some(wanted_branch) = &filter.branch {
        if branch != wanted_branch {
            return false;
        }
    }
    if let Some(model) = &filter.model {
        if record.model.as_deref() != Some(model.as_str()) {
            return false;
        }
    }
    if let Some(before) = filter.before {
        if record.timestamp >= before {
            return false;
        }
    }
    if let Some(after) = filter.after {
        if record.timestamp <= after {
            return false;
        }
    }
    true
}

fn content_matches(haystack: &str, query: &str, filter: &SearchFilter) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    if let Some(re) = &filter.regex {
        return re.find_iter(haystack).map(|m| m.start()).collect();
    }
    if filter.case_sensitive {
        haystack.match_indices(query).map(|(i, _)| i).collect()
    } else {
        let haystack_lower = haystack.to_lowercase();
        let query_lower = query.to_lowercase();
        haystack_lower.match_indices(&query_lower).map(|(i, _)| i).collect()
    }
}

/// Search every annotation reachable from HEAD for `query`, applying
/// `filter`'s metadata constraints first.
pub fn search_annotations(repo_root: &std::path::Path, config: &Config, query: &str, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
    let repo = Repo::discover(repo_root).context("locating the enclosing git repository")?;
    let branch = repo.current_branch()?.unwrap_or_else(|| "HEAD".to_string());
    let commits = shiftlog_vcs::annotated_commits_on_head(&repo, &config.notes_ref)?;

    let mut hits = Vec::new();
    for commit in commits {
        let Some(body) = shiftlog_vcs::read_note(&repo, &config.notes_ref, &commit)? else {
            continue;
        };
        let Ok(record) = Record::from_json(body.as_bytes()) else {
            continue;
        };
        if !matches_metadata(&record, &branch, filter) {
            continue;
        }

        let match_offsets = if filter.metadata_only {
            Vec::new()
        } else {
            match record.decode_transcript() {
                Ok(decoded) => {
                    let text = String::from_utf8_lossy(&decoded.bytes);
                    let offsets = content_matches(&text, query, filter);
                    if offsets.is_empty() && !query.is_empty() {
                        continue;
                    }
                    offsets
                }
                Err(_) => continue,
            }
        };

        hits.push(SearchHit { commit, record, match_offsets });
        if let Some(limit) = filter.limit {
            if hits.len() >= limit {
                break;
            }
        }
    }
    Ok(hits)
}
