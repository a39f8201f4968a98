//! Lookup of user identities owned by the profile collaborator.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::types::{ChatResult, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The subset of `user_ids` that does not resolve to a known user.
    async fn missing_users(&self, user_ids: &[UserId]) -> ChatResult<Vec<UserId>>;
}

/// Directory backed by the shared `users` table.
#[derive(Clone)]
pub struct SqliteUserDirectory {
    pool: SqlitePool,
}

impl SqliteUserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn missing_users(&self, user_ids: &[UserId]) -> ChatResult<Vec<UserId>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM users WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let found: Vec<UserId> = query
            .build_query_scalar::<UserId>()
            .fetch_all(&self.pool)
            .await?;

        let mut missing: Vec<UserId> = user_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        Ok(missing)
    }
}
