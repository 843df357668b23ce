use std::fmt;

/// Result type for shiftlog-vcs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// `git` itself ran and exited non-zero; carries its stderr.
    GitFailed { args: Vec<String>, stderr: String },
    /// A ref or commit-ish could not be resolved.
    UnresolvedRef(String),
    /// Not inside a git working tree.
    NotARepository,
    /// A push was rejected as non-fast-forward.
    NonFastForward,
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "failed to run git: {err}"),
            Error::GitFailed { args, stderr } => {
                write!(f, "git {} failed: {}", args.join(" "), stderr.trim())
            }
            Error::UnresolvedRef(reference) => write!(f, "could not resolve ref: {reference}"),
            Error::NotARepository => write!(f, "not inside a git working tree"),
            Error::NonFastForward => write!(f, "push rejected: remote has diverged"),
            Error::Utf8(err) => write!(f, "git produced non-UTF-8 output: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Utf8(err)
    }
}
