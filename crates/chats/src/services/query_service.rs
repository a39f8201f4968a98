//! Chat listings with unread indicators, and read-cursor maintenance.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::access_guard::{AccessGuard, ChatOperation};
use super::retry::with_retry;
use crate::entities::{Chat, ChatSummary};
use crate::repositories::{
    ChatRepository, MessageRepository, ParticipantRepository, ReadCursorRepository,
};
use crate::types::{Caller, ChatId, ChatResult, Sequence, UserId};
use crate::utils;

#[derive(Clone)]
pub struct QueryService {
    pool: SqlitePool,
}

impl QueryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Chats visible to the caller, most recent activity first.
    ///
    /// Callers who can read any chat see every active chat; everyone else
    /// sees the chats they currently participate in.
    pub async fn list_chats_for(&self, caller: Caller) -> ChatResult<Vec<ChatSummary>> {
        with_retry("list_chats", move || self.list_chats_once(caller)).await
    }

    async fn list_chats_once(&self, caller: Caller) -> ChatResult<Vec<ChatSummary>> {
        let mut conn = self.pool.acquire().await?;

        let chats = if caller.role.can_read_any_chat() {
            ChatRepository::list_all(&mut conn).await?
        } else {
            ChatRepository::list_for_user(&mut conn, caller.user_id).await?
        };

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            summaries.push(summarize(&mut conn, chat, caller.user_id).await?);
        }

        debug!(
            user_id = caller.user_id,
            count = summaries.len(),
            "listed chats"
        );
        Ok(summaries)
    }

    /// Advances the caller's read cursor to the chat's current last message.
    pub async fn mark_read(&self, chat_id: ChatId, caller: Caller) -> ChatResult<()> {
        with_retry("mark_read", move || self.mark_read_once(chat_id, caller)).await
    }

    async fn mark_read_once(&self, chat_id: ChatId, caller: Caller) -> ChatResult<()> {
        let mut conn = self.pool.acquire().await?;
        let access =
            AccessGuard::authorize(&mut conn, chat_id, &caller, ChatOperation::Read).await?;

        if access.is_participant {
            mark_read_through(&mut conn, chat_id, caller.user_id, access.chat.last_sequence)
                .await?;
        }
        Ok(())
    }
}

/// Builds the listing entry for `chat` from `user_id`'s point of view.
pub(crate) async fn summarize(
    conn: &mut SqliteConnection,
    chat: Chat,
    user_id: UserId,
) -> ChatResult<ChatSummary> {
    let participants = ParticipantRepository::list(&mut *conn, chat.id).await?;
    let last_message = MessageRepository::latest(&mut *conn, chat.id).await?;
    let seen = ReadCursorRepository::find(&mut *conn, chat.id, user_id)
        .await?
        .map(|cursor| cursor.last_seen_sequence)
        .unwrap_or(0);

    let unread = last_message
        .as_ref()
        .is_some_and(|message| message.sequence > seen);

    Ok(ChatSummary {
        chat,
        participants,
        last_message,
        unread,
    })
}

/// Moves the read cursor forward to `sequence`. Empty chats need no cursor.
pub(crate) async fn mark_read_through(
    conn: &mut SqliteConnection,
    chat_id: ChatId,
    user_id: UserId,
    sequence: Sequence,
) -> ChatResult<()> {
    if sequence <= 0 {
        return Ok(());
    }

    let written =
        ReadCursorRepository::advance(conn, chat_id, user_id, sequence, &utils::now()).await?;
    if written {
        debug!(chat_id, user_id, sequence, "advanced read cursor");
    }
    Ok(())
}
