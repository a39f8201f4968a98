//! Repository for read cursors.

use sqlx::SqliteConnection;

use crate::entities::ReadCursor;
use crate::types::{ChatId, ChatResult, Sequence, UserId};

pub struct ReadCursorRepository;

impl ReadCursorRepository {
    /// Moves the cursor forward to `sequence`, never backwards.
    ///
    /// Writes nothing unless the user is a current participant, evaluated in
    /// the same statement.
    pub async fn advance(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        user_id: UserId,
        sequence: Sequence,
        updated_at: &str,
    ) -> ChatResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO read_cursors (chat_id, user_id, last_seen_sequence, updated_at)
            SELECT ?1, ?2, ?3, ?4
            WHERE EXISTS (
                SELECT 1 FROM chat_participants WHERE chat_id = ?1 AND user_id = ?2
            )
            ON CONFLICT (chat_id, user_id) DO UPDATE SET
                last_seen_sequence = MAX(last_seen_sequence, excluded.last_seen_sequence),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(sequence)
        .bind(updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        user_id: UserId,
    ) -> ChatResult<Option<ReadCursor>> {
        let cursor = sqlx::query_as::<_, ReadCursor>(
            r#"
            SELECT chat_id, user_id, last_seen_sequence, updated_at
            FROM read_cursors
            WHERE chat_id = ? AND user_id = ?
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(cursor)
    }
}
