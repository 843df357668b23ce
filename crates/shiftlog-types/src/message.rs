use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized role of a transcript entry or message.
///
/// Source strings vary per agent (`human`, `model`, `gemini`, `copilot`,
/// `tool`, ...); the raw string is preserved on the owning `Entry`'s `raw`
/// line, never discarded, but every typed `Role` is one of these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Map an agent-native role string onto the normalized three-value set.
    ///
    /// `tool` normalizes to `User` because tool-result entries are emitted by
    /// the agent runtime on the user's turn in every supported agent's
    /// transcript, never as a standalone assistant turn. Unknown strings
    /// return `None`; callers discard the entry's typed role but must keep
    /// the raw line.
    pub fn normalize(raw: &str) -> Option<Role> {
        match raw {
            "user" | "human" => Some(Role::User),
            "assistant" | "model" | "gemini" | "copilot" => Some(Role::Assistant),
            "system" => Some(Role::System),
            "tool" => Some(Role::User),
            _ => None,
        }
    }
}

/// A role plus an ordered sequence of content blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawMessage {
            role: String,
            content: Value,
        }

        let raw = RawMessage::deserialize(deserializer)?;
        let role = Role::normalize(&raw.role).ok_or_else(|| {
            de::Error::custom(format!("unrecognized message role: {:?}", raw.role))
        })?;
        let content = parse_content(raw.content);
        Ok(Message { role, content })
    }
}

/// Parse the polymorphic `content` field: either a bare string (wrapped as a
/// single text block) or an array of typed blocks. Unknown block shapes are
/// preserved as `ContentBlock::Unknown` rather than failing the parse — every
/// agent evolves its transcript format independently and a hard failure here
/// would turn one malformed block into a dropped entire transcript.
fn parse_content(value: Value) -> Vec<ContentBlock> {
    match value {
        Value::String(text) => vec![ContentBlock::Text { text }],
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item.clone()).unwrap_or(ContentBlock::Unknown {
                raw: item,
            }))
            .collect(),
        other => vec![ContentBlock::Unknown { raw: other }],
    }
}

/// A tagged union over the content kinds every supported agent can emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Human-readable prose.
    Text { text: String },

    /// Hidden reasoning. Never shown to downstream summarizers.
    Thinking { text: String },

    /// The agent invoked a tool.
    ToolUse {
        id: String,
        name: String,
        /// Opaque structured input; the core never interprets it.
        input: Value,
    },

    /// A tool's output, paired with a prior `ToolUse` by id.
    ToolResult {
        tool_use_id: String,
        /// Opaque structured output; the core never interprets it.
        output: Value,
        #[serde(default)]
        is_error: bool,
    },

    /// Any block shape this build does not recognize. Preserved, never
    /// dropped, so a round trip through `Transcript` never silently loses a
    /// future agent's new block kind.
    #[serde(other)]
    Unknown { raw: Value },
}

impl ContentBlock {
    /// True for every variant except `ToolResult` — used by turn counting
    /// (spec: a user entry "turns" only if it carries at least one
    /// non-tool-result block).
    pub fn counts_toward_turn(&self) -> bool {
        !matches!(self, ContentBlock::ToolResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_roles() {
        assert_eq!(Role::normalize("user"), Some(Role::User));
        assert_eq!(Role::normalize("human"), Some(Role::User));
        assert_eq!(Role::normalize("assistant"), Some(Role::Assistant));
        assert_eq!(Role::normalize("model"), Some(Role::Assistant));
        assert_eq!(Role::normalize("gemini"), Some(Role::Assistant));
        assert_eq!(Role::normalize("copilot"), Some(Role::Assistant));
        assert_eq!(Role::normalize("system"), Some(Role::System));
        assert_eq!(Role::normalize("tool"), Some(Role::User));
        assert_eq!(Role::normalize("bogus"), None);
    }

    #[test]
    fn deserializes_string_content_as_single_text_block() {
        let json = r#"{"role":"user","content":"hello"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content.len(), 1);
        match &msg.content[0] {
            ContentBlock::Text { text } => assert_eq!(text, "hello"),
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn deserializes_array_content_and_preserves_unknown_blocks() {
        let json = r#"{"role":"assistant","content":[
            {"type":"text","text":"hi"},
            {"type":"some_future_block","foo":"bar"}
        ]}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.content.len(), 2);
        assert!(matches!(msg.content[0], ContentBlock::Text { .. }));
        assert!(matches!(msg.content[1], ContentBlock::Unknown { .. }));
    }

    #[test]
    fn tool_result_does_not_count_toward_turn() {
        let result = ContentBlock::ToolResult {
            tool_use_id: "x".into(),
            output: Value::Null,
            is_error: false,
        };
        assert!(!result.counts_toward_turn());
        let text = ContentBlock::Text {
            text: "hi".into(),
        };
        assert!(text.counts_toward_turn());
    }
}
