use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ChatId, UserId};

/// Membership fact linking a user to a chat.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Participant {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}
