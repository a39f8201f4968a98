//! Repository for the append-only message log.

use sqlx::SqliteConnection;

use crate::entities::Message;
use crate::types::{ChatId, ChatResult, Sequence, UserId};

pub struct MessageRepository;

impl MessageRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        sender_id: UserId,
        body: &str,
        sequence: Sequence,
        created_at: &str,
    ) -> ChatResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (chat_id, sender_id, body, sequence, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, chat_id, sender_id, body, sequence, created_at
            "#,
        )
        .bind(chat_id)
        .bind(sender_id)
        .bind(body)
        .bind(sequence)
        .bind(created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(message)
    }

    /// Up to `limit` messages with a sequence strictly greater than `after`.
    pub async fn list_after(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        after: Sequence,
        limit: i64,
    ) -> ChatResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, body, sequence, created_at
            FROM messages
            WHERE chat_id = ? AND sequence > ?
            ORDER BY sequence ASC
            LIMIT ?
            "#,
        )
        .bind(chat_id)
        .bind(after)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(messages)
    }

    pub async fn latest(conn: &mut SqliteConnection, chat_id: ChatId) -> ChatResult<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, body, sequence, created_at
            FROM messages
            WHERE chat_id = ?
            ORDER BY sequence DESC
            LIMIT 1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(message)
    }

    pub async fn count(conn: &mut SqliteConnection, chat_id: ChatId) -> ChatResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}
