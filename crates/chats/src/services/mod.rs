//! Business logic for conversations.
//!
//! Every operation takes the caller explicitly and runs each mutation in a
//! single transaction, retried once on transient lock contention.

pub mod access_guard;
pub mod chat_store;
pub mod directory;
pub mod membership;
pub mod message_log;
pub mod query_service;
pub mod retry;

use std::sync::Arc;

use sqlx::SqlitePool;
use tutorline_config::ChatConfig;

pub use access_guard::{Access, AccessGuard, ChatOperation};
pub use chat_store::ChatStore;
pub use directory::{SqliteUserDirectory, UserDirectory};
pub use membership::{MembershipManager, Removal};
pub use message_log::MessageLog;
pub use query_service::QueryService;

/// The conversation components wired to one pool and directory.
#[derive(Clone)]
pub struct ChatServices {
    pub store: ChatStore,
    pub membership: MembershipManager,
    pub messages: MessageLog,
    pub queries: QueryService,
}

impl ChatServices {
    pub fn new(pool: SqlitePool, directory: Arc<dyn UserDirectory>, limits: ChatConfig) -> Self {
        Self {
            store: ChatStore::new(pool.clone(), directory.clone()),
            membership: MembershipManager::new(pool.clone(), directory),
            messages: MessageLog::new(pool.clone(), limits),
            queries: QueryService::new(pool),
        }
    }

    /// Services resolving users against the `users` table of the same pool.
    pub fn with_sqlite_directory(pool: SqlitePool, limits: ChatConfig) -> Self {
        let directory = Arc::new(SqliteUserDirectory::new(pool.clone()));
        Self::new(pool, directory, limits)
    }
}
