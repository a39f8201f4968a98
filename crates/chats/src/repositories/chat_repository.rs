//! Repository for chat rows.

use sqlx::SqliteConnection;

use crate::entities::{Chat, ChatKind};
use crate::types::{ChatId, ChatResult, UserId};

pub struct ChatRepository;

impl ChatRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        kind: ChatKind,
        name: Option<&str>,
        creator_id: UserId,
        direct_key: Option<&str>,
        created_at: &str,
    ) -> ChatResult<Chat> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (kind, name, creator_id, direct_key, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, kind, name, creator_id, last_sequence, created_at
            "#,
        )
        .bind(kind)
        .bind(name)
        .bind(creator_id)
        .bind(direct_key)
        .bind(created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(chat)
    }

    pub async fn find(conn: &mut SqliteConnection, id: ChatId) -> ChatResult<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>(
            "SELECT id, kind, name, creator_id, last_sequence, created_at FROM chats WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(chat)
    }

    pub async fn find_by_direct_key(
        conn: &mut SqliteConnection,
        key: &str,
    ) -> ChatResult<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>(
            "SELECT id, kind, name, creator_id, last_sequence, created_at FROM chats WHERE direct_key = ?",
        )
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(chat)
    }

    /// Takes the chat's write lock for the enclosing transaction.
    ///
    /// SQLite has no `SELECT ... FOR UPDATE`; bumping `lock_version` as the
    /// first statement acquires the database write lock before any
    /// membership check is evaluated.
    pub async fn lock(conn: &mut SqliteConnection, id: ChatId) -> ChatResult<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            UPDATE chats SET lock_version = lock_version + 1
            WHERE id = ?
            RETURNING id, kind, name, creator_id, last_sequence, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(chat)
    }

    /// Allocates the next message sequence; the returned chat carries it in
    /// `last_sequence`. Doubles as the chat lock.
    pub async fn advance_sequence(
        conn: &mut SqliteConnection,
        id: ChatId,
    ) -> ChatResult<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            UPDATE chats SET last_sequence = last_sequence + 1
            WHERE id = ?
            RETURNING id, kind, name, creator_id, last_sequence, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(chat)
    }

    /// Frees the pair key so the two users can open a fresh direct chat.
    pub async fn clear_direct_key(conn: &mut SqliteConnection, id: ChatId) -> ChatResult<()> {
        sqlx::query("UPDATE chats SET direct_key = NULL WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Removes the chat with its history, membership and read cursors.
    pub async fn purge(conn: &mut SqliteConnection, id: ChatId) -> ChatResult<()> {
        for statement in [
            "DELETE FROM read_cursors WHERE chat_id = ?",
            "DELETE FROM messages WHERE chat_id = ?",
            "DELETE FROM chat_participants WHERE chat_id = ?",
            "DELETE FROM chats WHERE id = ?",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Chats the user participates in, most recent activity first.
    pub async fn list_for_user(
        conn: &mut SqliteConnection,
        user_id: UserId,
    ) -> ChatResult<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT c.id, c.kind, c.name, c.creator_id, c.last_sequence, c.created_at
            FROM chats c
            JOIN chat_participants p ON p.chat_id = c.id
            LEFT JOIN messages m ON m.chat_id = c.id AND m.sequence = c.last_sequence
            WHERE p.user_id = ?
            ORDER BY COALESCE(m.created_at, c.created_at) DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(chats)
    }

    /// Every active chat, most recent activity first.
    pub async fn list_all(conn: &mut SqliteConnection) -> ChatResult<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT c.id, c.kind, c.name, c.creator_id, c.last_sequence, c.created_at
            FROM chats c
            LEFT JOIN messages m ON m.chat_id = c.id AND m.sequence = c.last_sequence
            ORDER BY COALESCE(m.created_at, c.created_at) DESC, c.id DESC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(chats)
    }
}
