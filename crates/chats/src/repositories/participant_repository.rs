//! Repository for membership rows.

use sqlx::SqliteConnection;

use crate::entities::Participant;
use crate::types::{ChatId, ChatResult, UserId};

pub struct ParticipantRepository;

impl ParticipantRepository {
    /// Returns `false` when the user was already a participant.
    pub async fn insert_if_absent(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        user_id: UserId,
        joined_at: &str,
    ) -> ChatResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_participants (chat_id, user_id, joined_at)
            VALUES (?, ?, ?)
            ON CONFLICT (chat_id, user_id) DO NOTHING
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(joined_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        user_id: UserId,
    ) -> ChatResult<bool> {
        let result = sqlx::query("DELETE FROM chat_participants WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn exists(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        user_id: UserId,
    ) -> ChatResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM chat_participants WHERE chat_id = ? AND user_id = ?)",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    pub async fn count(conn: &mut SqliteConnection, chat_id: ChatId) -> ChatResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chat_participants WHERE chat_id = ?")
                .bind(chat_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(count)
    }

    pub async fn list(conn: &mut SqliteConnection, chat_id: ChatId) -> ChatResult<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT chat_id, user_id, joined_at
            FROM chat_participants
            WHERE chat_id = ?
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(participants)
    }
}
