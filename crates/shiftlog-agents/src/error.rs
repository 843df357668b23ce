use std::fmt;

/// Result type for shiftlog-agents operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The agent name was not recognized by the registry.
    UnknownAgent(String),
    /// A hook configuration file could not be read, written, or parsed.
    HookConfig(String),
    /// No parseable transcript was found where one was expected.
    SessionNotFound(String),
    Sqlite(rusqlite::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::UnknownAgent(name) => write!(f, "unknown agent: {name}"),
            Error::HookConfig(msg) => write!(f, "hook configuration error: {msg}"),
            Error::SessionNotFound(msg) => write!(f, "session not found: {msg}"),
            Error::Sqlite(err) => write!(f, "sqlite error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Sqlite(err) => Some(err),
            Error::UnknownAgent(_) | Error::HookConfig(_) | Error::SessionNotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}
