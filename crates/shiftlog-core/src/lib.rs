//! Orchestration layer: every CLI command's actual behavior lives here, so
//! `shiftlog-cli` stays a thin argument-parsing shell. Composes
//! `shiftlog-types`, `shiftlog-agents`, and `shiftlog-vcs` with `anyhow` for
//! error context, per the layered error-handling discipline.

mod active_session;
mod annotations;
mod config;
mod doctor;
mod init;
mod remap;
mod repo_hooks;
mod resume;
mod search;
mod store;
mod sync;

pub use active_session::{read as read_active_session, remove as remove_active_session, write as write_active_session, ActiveSession};
pub use annotations::{list_annotations, show_annotation};
pub use config::{load as load_config, resolve as resolve_config, save as save_config};
pub use doctor::run as doctor;
pub use init::{deinit, foreign_annotations, init};
pub use remap::{remap, RemapReport};
pub use resume::{prepare as prepare_resume, ResumePlan};
pub use search::{search_annotations, SearchFilter, SearchHit};
pub use store::store;
pub use sync::{pull as sync_pull, push as sync_push};

// Re-exported so callers that only depend on shiftlog-core don't also need
// a direct dependency on shiftlog-types/shiftlog-agents for common types.
pub use shiftlog_agents::DiagnosticCheck;
pub use shiftlog_types::Config;
pub use shiftlog_vcs::Repo;
