//! Subprocess boundary onto the git binary. Every operation here shells out
//! to `git`; nothing in this crate or its callers links a git library.

mod error;
mod notes;
mod patch_id;
mod repo;

pub use error::{Error, Result};
pub use notes::{annotated_commits_on_head, configure_rewrite_ref, list_noted_commits, read as read_note, write as write_note};
pub use repo::Repo;
