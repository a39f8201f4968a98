//! Append-only per-chat message log with cursor pagination.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use tutorline_config::ChatConfig;

use super::access_guard::{AccessGuard, ChatOperation};
use super::query_service::mark_read_through;
use super::retry::with_retry;
use crate::entities::{Cursor, Message, MessagePage};
use crate::repositories::{ChatRepository, MessageRepository};
use crate::types::{Caller, ChatError, ChatId, ChatResult};
use crate::utils::{self, Validator};

#[derive(Clone)]
pub struct MessageLog {
    pool: SqlitePool,
    limits: ChatConfig,
}

impl MessageLog {
    pub fn new(pool: SqlitePool, limits: ChatConfig) -> Self {
        Self { pool, limits }
    }

    /// Appends a message with the chat's next sequence number.
    ///
    /// The sequence is allocated, membership checked and the row inserted
    /// in one transaction; a failed append consumes no sequence.
    pub async fn append_message(
        &self,
        chat_id: ChatId,
        caller: Caller,
        body: &str,
    ) -> ChatResult<Message> {
        Validator::message_body(body, self.limits.max_message_length)?;

        with_retry("append_message", move || {
            self.append_once(chat_id, caller, body)
        })
        .await
    }

    async fn append_once(&self, chat_id: ChatId, caller: Caller, body: &str) -> ChatResult<Message> {
        let now = utils::now();
        let mut tx = self.pool.begin().await?;

        let chat = ChatRepository::advance_sequence(&mut tx, chat_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_id))?;
        let access = AccessGuard::admit(&mut tx, chat, &caller, ChatOperation::Post).await?;
        let sequence = access.chat.last_sequence;

        let message =
            MessageRepository::insert(&mut tx, chat_id, caller.user_id, body, sequence, &now)
                .await?;
        mark_read_through(&mut tx, chat_id, caller.user_id, sequence).await?;

        tx.commit().await?;

        info!(
            chat_id,
            sender_id = caller.user_id,
            sequence,
            message_id = message.id,
            "appended message"
        );
        Ok(message)
    }

    /// Messages strictly after `cursor` in ascending sequence order.
    ///
    /// `limit` defaults to the configured page size and is clamped to the
    /// configured maximum. Participants' read cursors advance as a side
    /// effect.
    pub async fn list_messages(
        &self,
        chat_id: ChatId,
        caller: Caller,
        cursor: Option<Cursor>,
        limit: Option<u32>,
    ) -> ChatResult<MessagePage> {
        let limit = self.page_size(limit)?;

        let (page, mark) = with_retry("list_messages", move || {
            self.list_once(chat_id, caller, cursor, limit)
        })
        .await?;

        if let Some(sequence) = mark {
            let marked = with_retry("mark_read", move || async move {
                let mut conn = self.pool.acquire().await?;
                mark_read_through(&mut conn, chat_id, caller.user_id, sequence).await
            })
            .await;

            if let Err(error) = marked {
                warn!(chat_id, user_id = caller.user_id, %error, "failed to advance read cursor");
            }
        }

        Ok(page)
    }

    async fn list_once(
        &self,
        chat_id: ChatId,
        caller: Caller,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> ChatResult<(MessagePage, Option<i64>)> {
        let mut conn = self.pool.acquire().await?;
        let access =
            AccessGuard::authorize(&mut conn, chat_id, &caller, ChatOperation::Read).await?;

        let after = cursor.map(Cursor::sequence).unwrap_or(0);
        let mut messages =
            MessageRepository::list_after(&mut conn, chat_id, after, i64::from(limit) + 1).await?;

        let has_more = messages.len() > limit as usize;
        messages.truncate(limit as usize);

        let next_cursor = messages.last().map(Message::cursor).or(cursor);

        debug!(
            chat_id,
            user_id = caller.user_id,
            after,
            returned = messages.len(),
            has_more,
            "listed messages"
        );

        let mark = access.is_participant.then_some(access.chat.last_sequence);
        Ok((
            MessagePage {
                messages,
                next_cursor,
                has_more,
            },
            mark,
        ))
    }

    fn page_size(&self, requested: Option<u32>) -> ChatResult<u32> {
        match requested {
            None => Ok(self.limits.default_page_size),
            Some(0) => Err(ChatError::validation("limit must be at least 1")),
            Some(limit) => Ok(limit.min(self.limits.max_page_size)),
        }
    }
}
