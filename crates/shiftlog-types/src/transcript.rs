use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{ContentBlock, Message, Role};
use crate::usage::UsageMetrics;

/// One entry in a transcript, in the order the agent produced it.
///
/// `id` is unique within the transcript for agents that mint one; some
/// agents leave it empty, which callers must treat as opaque rather than as
/// a missing value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<Message>,
    /// The exact source line this entry was parsed from, preserved
    /// byte-for-byte so a restore never reformats what the agent wrote.
    pub raw: String,
}

impl Entry {
    /// Per the Turn invariant: a user entry "turns" only if it carries at
    /// least one block that is not a tool result.
    fn is_turn(&self) -> bool {
        if self.role != Role::User {
            return false;
        }
        match &self.message {
            Some(msg) => msg.content.iter().any(ContentBlock::counts_toward_turn),
            None => false,
        }
    }
}

/// A finite ordered sequence of transcript entries.
///
/// Invariant: entries are stored in the order the agent produced them; no
/// operation here reorders them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub entries: Vec<Entry>,
}

impl Transcript {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Transcript { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count of user entries carrying at least one non-tool-result block.
    /// Tool-result entries and assistant entries never count.
    pub fn count_turns(&self) -> usize {
        self.entries.iter().filter(|e| e.is_turn()).count()
    }

    /// Position of the entry whose `id` matches, or `None` if absent. An
    /// empty `id` never matches (some agents leave every entry's id empty;
    /// treating `""` as a wildcard would make every entry "found").
    pub fn find_entry_index(&self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.entries.iter().position(|e| e.id == id)
    }

    /// Entries strictly after the one matching `id`. An empty `id`, or one
    /// that is not found, returns the full slice — restart-from-scratch is
    /// the safe default for an unresolvable resume cursor.
    pub fn entries_since(&self, id: &str) -> &[Entry] {
        match self.find_entry_index(id) {
            Some(idx) => &self.entries[idx + 1..],
            None => &self.entries[..],
        }
    }

    /// The last entry's id — the resume cursor — or `None` for an empty
    /// transcript.
    pub fn resume_cursor(&self) -> Option<&str> {
        self.entries.last().map(|e| e.id.as_str())
    }

    /// Sum of every entry's usage metrics (most agents attach usage to a
    /// single terminal entry, but summing tolerates agents that emit
    /// incremental usage per entry).
    pub fn usage_totals(&self, extractor: impl Fn(&Entry) -> Option<UsageMetrics>) -> UsageMetrics {
        let mut total = UsageMetrics::default();
        for entry in &self.entries {
            if let Some(usage) = extractor(entry) {
                total.add(&usage);
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_entry(id: &str, text: &str) -> Entry {
        Entry {
            id: id.to_string(),
            parent_id: None,
            role: Role::User,
            timestamp: None,
            message: Some(Message {
                role: Role::User,
                content: vec![ContentBlock::Text {
                    text: text.to_string(),
                }],
            }),
            raw: format!(r#"{{"id":"{id}"}}"#),
        }
    }

    fn tool_result_entry(id: &str, tool_use_id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            parent_id: None,
            role: Role::User,
            timestamp: None,
            message: Some(Message {
                role: Role::User,
                content: vec![ContentBlock::ToolResult {
                    tool_use_id: tool_use_id.to_string(),
                    output: serde_json::Value::Null,
                    is_error: false,
                }],
            }),
            raw: format!(r#"{{"id":"{id}"}}"#),
        }
    }

    fn assistant_entry(id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            parent_id: None,
            role: Role::Assistant,
            timestamp: None,
            message: Some(Message {
                role: Role::Assistant,
                content: vec![ContentBlock::Text {
                    text: "hello".to_string(),
                }],
            }),
            raw: format!(r#"{{"id":"{id}"}}"#),
        }
    }

    #[test]
    fn turn_count_excludes_tool_results_and_assistant_entries() {
        let t = Transcript::from_entries(vec![
            user_entry("1", "hi"),
            assistant_entry("2"),
            tool_result_entry("3", "tool-1"),
            user_entry("4", "more"),
        ]);
        assert_eq!(t.count_turns(), 2);
    }

    #[test]
    fn find_entry_index_treats_empty_id_as_not_found() {
        let t = Transcript::from_entries(vec![user_entry("", "hi"), user_entry("2", "more")]);
        assert_eq!(t.find_entry_index(""), None);
        assert_eq!(t.find_entry_index("2"), Some(1));
        assert_eq!(t.find_entry_index("missing"), None);
    }

    #[test]
    fn entries_since_returns_full_slice_when_not_found() {
        let t = Transcript::from_entries(vec![user_entry("1", "hi"), user_entry("2", "more")]);
        assert_eq!(t.entries_since("").len(), 2);
        assert_eq!(t.entries_since("missing").len(), 2);
        assert_eq!(t.entries_since("1").len(), 1);
    }

    #[test]
    fn resume_cursor_is_last_entry_id() {
        let t = Transcript::from_entries(vec![user_entry("1", "hi"), user_entry("2", "more")]);
        assert_eq!(t.resume_cursor(), Some("2"));
        assert_eq!(Transcript::default().resume_cursor(), None);
    }
}
