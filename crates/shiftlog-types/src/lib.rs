//! Core types shared across shiftlog crates: the common transcript model
//! (§4.1), the annotation record wire format (§4.3), and repo-local
//! configuration (§6). Not intended for direct use outside the workspace.

mod config;
mod error;
mod message;
mod record;
mod transcript;
mod usage;

pub use config::{Config, DEFAULT_AGENT, DEFAULT_NOTES_REF};
pub use error::{Error, Result};
pub use message::{ContentBlock, Message, Role};
pub use record::{checksum, DecodedTranscript, Effort, Record, CURRENT_VERSION};
pub use transcript::{Entry, Transcript};
pub use usage::UsageMetrics;
