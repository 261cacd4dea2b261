/// Repository module
///
/// This module provides the data access layer for the marketplace. Every
/// function takes the connection pool and returns `anyhow::Result`; reads
/// are plain synchronous queries and writes go through
/// [`crate::db::execute_with_retry`] so they ride out SQLite lock contention.

mod user_repo;
mod item_repo;
mod tag_repo;
mod message_repo;
mod forum_repo;
mod event_repo;
mod settings_repo;
mod stats_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use item_repo::*;
pub use tag_repo::*;
pub use message_repo::*;
pub use forum_repo::*;
pub use event_repo::*;
pub use settings_repo::*;
pub use stats_repo::*;

/// Most ids bound into one `IN (...)` lookup; longer lists are split so
/// queries stay under SQLite's bound-variable limit
pub(crate) const ID_CHUNK: usize = 500;
