use std::fmt;

/// Result type for shiftlog-types operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building, encoding, or decoding records
/// and transcripts.
#[derive(Debug)]
pub enum Error {
    /// The record JSON itself could not be parsed.
    Json(serde_json::Error),

    /// The record's base64 `transcript` field was not valid base64.
    Base64(base64::DecodeError),

    /// The decompression stream was corrupt or truncated.
    Decompress(std::io::Error),

    /// The record's `version` field is newer than this reader understands.
    UnsupportedVersion { found: u32, max_supported: u32 },

    /// `notes_ref` failed validation (must start with `refs/notes/`).
    InvalidNotesRef(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Json(err) => write!(f, "record JSON error: {err}"),
            Error::Base64(err) => write!(f, "record base64 error: {err}"),
            Error::Decompress(err) => write!(f, "record decompression error: {err}"),
            Error::UnsupportedVersion {
                found,
                max_supported,
            } => write!(
                f,
                "record format version {found} is newer than the highest version this build understands ({max_supported})"
            ),
            Error::InvalidNotesRef(r) => {
                write!(f, "invalid notes_ref {r:?}: must start with refs/notes/")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Base64(err) => Some(err),
            Error::Decompress(err) => Some(err),
            Error::UnsupportedVersion { .. } | Error::InvalidNotesRef(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Base64(err)
    }
}
