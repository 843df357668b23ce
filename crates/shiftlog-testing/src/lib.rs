//! Shared harness for the integration test suite: a disposable git repo, a
//! `shiftlog` binary handle, and generators for each agent's native
//! transcript format. Internal to the workspace; not published.

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::TestWorld;
