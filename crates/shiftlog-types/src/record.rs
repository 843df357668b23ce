use base64::Engine;
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Current format version this build writes. Readers accept any version
/// `<= CURRENT_VERSION`; see `Record::from_json`.
pub const CURRENT_VERSION: u32 = 3;

/// Effort metrics: turn count and token totals. Optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effort {
    #[serde(default)]
    pub turns: u64,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

/// A self-describing annotation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub version: u32,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub project_path: String,
    pub git_branch: String,
    pub message_count: u64,
    pub checksum: String,
    /// base64 of gzip of the raw transcript bytes.
    pub transcript: String,
    /// Absent on the wire means "claude", for backward compatibility with
    /// records captured before the agent field existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Effort>,
}

/// Compute the `sha256:<hex>` checksum over raw (pre-compression) bytes.
pub fn checksum(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    format!("sha256:{:x}", hasher.finalize())
}

fn gzip_compress(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    encoder.finish()
}

fn gzip_decompress(compressed: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(compressed);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

impl Record {
    /// Build a record from raw transcript bytes and capture metadata. The
    /// checksum is computed over `raw` before compression, per the
    /// checksum-before-compress invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        raw: &[u8],
        session_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        project_path: impl Into<String>,
        git_branch: impl Into<String>,
        message_count: u64,
        agent: impl Into<String>,
        model: Option<String>,
        effort: Option<Effort>,
    ) -> std::io::Result<Self> {
        let compressed = gzip_compress(raw)?;
        let transcript = base64::engine::general_purpose::STANDARD.encode(compressed);
        Ok(Record {
            version: CURRENT_VERSION,
            session_id: session_id.into(),
            timestamp,
            project_path: project_path.into(),
            git_branch: git_branch.into(),
            message_count,
            checksum: checksum(raw),
            transcript,
            agent: Some(agent.into()),
            model,
            effort,
        })
    }

    /// Serialize with two-space indentation (keeps
    /// annotations diff-friendly).
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        Serialize::serialize(self, &mut ser)?;
        Ok(String::from_utf8(buf).expect("serde_json output is valid UTF-8"))
    }

    /// Parse a record from its JSON bytes. Fails only if the JSON itself is
    /// malformed or carries an unsupported version — never on checksum
    /// mismatch, which is a `DecodedTranscript::checksum_ok == false`
    /// warning instead.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: Record = serde_json::from_slice(bytes)?;
        if record.version > CURRENT_VERSION {
            return Err(Error::UnsupportedVersion {
                found: record.version,
                max_supported: CURRENT_VERSION,
            });
        }
        Ok(record)
    }

    /// Agent name, defaulting to "claude" when absent (backward
    /// compatibility with pre-agent-field records).
    pub fn agent_name(&self) -> &str {
        self.agent.as_deref().unwrap_or("claude")
    }

    /// Decode, decompress, and verify a record's transcript payload.
    ///
    /// Base64 or gzip failure is fatal (the record is unreadable). A
    /// checksum mismatch is *not* fatal: the decoded bytes are returned
    /// anyway, with `checksum_ok = false`, because a lossy restore beats
    /// none.
    pub fn decode_transcript(&self) -> Result<DecodedTranscript> {
        let compressed = base64::engine::general_purpose::STANDARD.decode(&self.transcript)?;
        let raw = gzip_decompress(&compressed).map_err(Error::Decompress)?;
        let checksum_ok = checksum(&raw) == self.checksum;
        Ok(DecodedTranscript {
            bytes: raw,
            checksum_ok,
        })
    }
}

/// The result of decoding a record's transcript payload.
pub struct DecodedTranscript {
    pub bytes: Vec<u8>,
    pub checksum_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(raw: &[u8]) -> Record {
        Record::build(
            raw,
            "sess-1",
            Utc::now(),
            "/home/user/project",
            "main",
            2,
            "claude",
            Some("claude-opus".to_string()),
            Some(Effort {
                turns: 1,
                input_tokens: 10,
                output_tokens: 20,
                cache_creation_input_tokens: 0,
                cache_read_input_tokens: 0,
            }),
        )
        .unwrap()
    }

    #[test]
    fn round_trip_preserves_raw_bytes_exactly() {
        let raw = br#"{"role":"user"}"#;
        let record = sample_record(raw);
        let decoded = record.decode_transcript().unwrap();
        assert_eq!(decoded.bytes, raw);
        assert!(decoded.checksum_ok);
    }

    #[test]
    fn checksum_law_same_bytes_same_checksum() {
        let raw = b"identical payload";
        assert_eq!(checksum(raw), checksum(raw));
        assert_ne!(checksum(raw), checksum(b"different payload"));
    }

    #[test]
    fn json_round_trip_via_to_json_and_from_json() {
        let record = sample_record(b"hello world");
        let json = record.to_json().unwrap();
        assert!(json.contains("  \"version\""), "expected two-space indent");
        let parsed = Record::from_json(json.as_bytes()).unwrap();
        assert_eq!(parsed.session_id, record.session_id);
        assert_eq!(parsed.checksum, record.checksum);
        assert_eq!(parsed.agent_name(), "claude");
    }

    #[test]
    fn agent_field_absent_defaults_to_claude() {
        let json = r#"{
            "version": 3,
            "session_id": "s",
            "timestamp": "2024-01-01T00:00:00Z",
            "project_path": "/p",
            "git_branch": "main",
            "message_count": 0,
            "checksum": "sha256:deadbeef",
            "transcript": ""
        }"#;
        let record = Record::from_json(json.as_bytes()).unwrap();
        assert_eq!(record.agent_name(), "claude");
    }

    #[test]
    fn checksum_mismatch_warns_but_does_not_fail() {
        let mut record = sample_record(b"payload");
        record.checksum = "sha256:0000000000000000000000000000000000000000000000000000000000000000".to_string();
        let decoded = record.decode_transcript().unwrap();
        assert_eq!(decoded.bytes, b"payload");
        assert!(!decoded.checksum_ok);
    }

    #[test]
    fn corrupt_base64_is_fatal() {
        let mut record = sample_record(b"payload");
        record.transcript = "not valid base64!!".to_string();
        assert!(record.decode_transcript().is_err());
    }

    #[test]
    fn future_version_is_rejected() {
        let json = r#"{
            "version": 99,
            "session_id": "s",
            "timestamp": "2024-01-01T00:00:00Z",
            "project_path": "/p",
            "git_branch": "main",
            "message_count": 0,
            "checksum": "sha256:deadbeef",
            "transcript": ""
        }"#;
        let result = Record::from_json(json.as_bytes());
        assert!(matches!(result, Err(Error::UnsupportedVersion { .. })));
    }
}
