use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Message, Participant};
use crate::types::{ChatError, ChatId, Sequence, UserId};

/// Direct chats are opened between exactly two users; group chats are named
/// and grow through membership changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Direct,
    Group,
}

impl ChatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatKind::Direct => "direct",
            ChatKind::Group => "group",
        }
    }
}

impl FromStr for ChatKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(ChatKind::Direct),
            "group" => Ok(ChatKind::Group),
            other => Err(ChatError::validation(format!(
                "unknown chat kind '{other}', expected 'direct' or 'group'"
            ))),
        }
    }
}

/// An active conversation. Deleted chats are purged and never materialise.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Chat {
    pub id: ChatId,
    pub kind: ChatKind,
    pub name: Option<String>,
    pub creator_id: UserId,
    /// Highest sequence number allocated in this chat, 0 when empty.
    pub last_sequence: Sequence,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn is_direct(&self) -> bool {
        self.kind == ChatKind::Direct
    }
}

/// Canonical key for an unordered pair of users.
pub fn direct_key(a: UserId, b: UserId) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}:{high}")
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: Chat,
    pub participants: Vec<Participant>,
}

/// Listing entry: the chat, who is in it, and the caller's unread state.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    pub participants: Vec<Participant>,
    pub last_message: Option<Message>,
    pub unread: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_is_order_independent() {
        assert_eq!(direct_key(7, 3), "3:7");
        assert_eq!(direct_key(3, 7), "3:7");
    }

    #[test]
    fn chat_kind_parses_case_insensitively() {
        assert_eq!("Direct".parse::<ChatKind>().unwrap(), ChatKind::Direct);
        assert_eq!(" group ".parse::<ChatKind>().unwrap(), ChatKind::Group);
        assert!(matches!(
            "channel".parse::<ChatKind>(),
            Err(ChatError::Validation { .. })
        ));
    }
}
