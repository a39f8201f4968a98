use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::{ChatError, ChatId, ChatResult, Sequence, UserId};

const CURSOR_PREFIX: &str = "s:";

/// An immutable entry in a chat's log.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub body: String,
    pub sequence: Sequence,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn cursor(&self) -> Cursor {
        Cursor::after(self.sequence)
    }
}

/// Opaque pagination token: a strict lower bound on the sequences returned next.
///
/// ```
/// use tutorline_chats::Cursor;
///
/// let cursor = Cursor::after(2);
/// let token = cursor.encode();
/// assert_eq!(Cursor::decode(&token).unwrap(), cursor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(Sequence);

impl Cursor {
    pub fn after(sequence: Sequence) -> Self {
        Self(sequence)
    }

    pub fn sequence(self) -> Sequence {
        self.0
    }

    pub fn encode(self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{CURSOR_PREFIX}{}", self.0))
    }

    pub fn decode(token: &str) -> ChatResult<Self> {
        let invalid = || ChatError::validation("malformed cursor");

        let bytes = URL_SAFE_NO_PAD.decode(token.trim()).map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;
        let sequence = text
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|raw| raw.parse::<Sequence>().ok())
            .filter(|sequence| *sequence >= 0)
            .ok_or_else(invalid)?;

        Ok(Self(sequence))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

/// One page of history in ascending sequence order.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Cursor of the last returned message, or the request cursor when the
    /// page is empty.
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}
