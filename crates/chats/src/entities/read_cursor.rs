use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ChatId, Sequence, UserId};

/// Per-user bookmark used to derive unread indicators.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReadCursor {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub last_seen_sequence: Sequence,
    pub updated_at: DateTime<Utc>,
}
