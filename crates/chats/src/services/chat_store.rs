//! Creation and lookup of chats.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::access_guard::{AccessGuard, ChatOperation};
use super::directory::UserDirectory;
use super::query_service::summarize;
use super::retry::with_retry;
use crate::entities::{direct_key, ChatDetail, ChatKind, ChatSummary};
use crate::repositories::{ChatRepository, ParticipantRepository};
use crate::types::{Caller, ChatError, ChatId, ChatResult, UserId};
use crate::utils::{self, Validator};

#[derive(Clone)]
pub struct ChatStore {
    pool: SqlitePool,
    directory: Arc<dyn UserDirectory>,
}

impl ChatStore {
    pub fn new(pool: SqlitePool, directory: Arc<dyn UserDirectory>) -> Self {
        Self { pool, directory }
    }

    /// Creates a chat with its initial participants.
    ///
    /// Direct chats are idempotent per unordered pair: while the pair's chat
    /// exists it is returned instead of a new one.
    pub async fn create_chat(
        &self,
        caller: Caller,
        kind: ChatKind,
        participant_ids: &[UserId],
        name: Option<&str>,
    ) -> ChatResult<ChatSummary> {
        match kind {
            ChatKind::Direct => {
                if name.is_some() {
                    return Err(ChatError::validation("direct chats cannot be named"));
                }
                let (creator, other) = Validator::direct_pair(caller.user_id, participant_ids)?;
                self.ensure_users_exist(&[creator, other]).await?;

                with_retry("create_direct_chat", move || {
                    self.create_direct_once(caller, creator, other)
                })
                .await
            }
            ChatKind::Group => {
                let name = Validator::chat_name(name)?;
                let members = Validator::group_members(caller.user_id, participant_ids);
                self.ensure_users_exist(&members).await?;

                let name = name.as_str();
                let members = members.as_slice();
                with_retry("create_group_chat", move || {
                    self.create_group_once(caller, name, members)
                })
                .await
            }
        }
    }

    /// The chat and its current participants, if the caller may read it.
    pub async fn get_chat(&self, chat_id: ChatId, caller: Caller) -> ChatResult<ChatDetail> {
        with_retry("get_chat", move || self.get_chat_once(chat_id, caller)).await
    }

    async fn get_chat_once(&self, chat_id: ChatId, caller: Caller) -> ChatResult<ChatDetail> {
        let mut conn = self.pool.acquire().await?;
        let access =
            AccessGuard::authorize(&mut conn, chat_id, &caller, ChatOperation::Read).await?;
        let participants = ParticipantRepository::list(&mut conn, chat_id).await?;

        debug!(chat_id, user_id = caller.user_id, "fetched chat");
        Ok(ChatDetail {
            chat: access.chat,
            participants,
        })
    }

    async fn ensure_users_exist(&self, user_ids: &[UserId]) -> ChatResult<()> {
        let missing = self.directory.missing_users(user_ids).await?;
        match missing.first() {
            Some(id) => Err(ChatError::not_found(format!("user {id}"))),
            None => Ok(()),
        }
    }

    async fn create_direct_once(
        &self,
        caller: Caller,
        creator: UserId,
        other: UserId,
    ) -> ChatResult<ChatSummary> {
        let key = direct_key(creator, other);

        {
            let mut conn = self.pool.acquire().await?;
            if let Some(existing) = ChatRepository::find_by_direct_key(&mut conn, &key).await? {
                debug!(chat_id = existing.id, key = %key, "direct chat already exists");
                return summarize(&mut conn, existing, caller.user_id).await;
            }
        }

        let now = utils::now();
        let mut tx = self.pool.begin().await?;

        let inserted = ChatRepository::insert(
            &mut tx,
            ChatKind::Direct,
            None,
            creator,
            Some(key.as_str()),
            &now,
        )
        .await;

        let chat = match inserted {
            Ok(chat) => chat,
            Err(error) if error.is_unique_violation() => {
                tx.rollback().await?;
                return self.existing_direct_chat(&key, caller).await;
            }
            Err(error) => return Err(error),
        };

        for user_id in [creator, other] {
            ParticipantRepository::insert_if_absent(&mut tx, chat.id, user_id, &now).await?;
        }

        let summary = summarize(&mut tx, chat, caller.user_id).await?;
        tx.commit().await?;

        info!(
            chat_id = summary.chat.id,
            creator_id = creator,
            other_id = other,
            "created direct chat"
        );
        Ok(summary)
    }

    /// A concurrent creator won the insert race; hand back their chat.
    async fn existing_direct_chat(&self, key: &str, caller: Caller) -> ChatResult<ChatSummary> {
        let mut conn = self.pool.acquire().await?;
        match ChatRepository::find_by_direct_key(&mut conn, key).await? {
            Some(existing) => {
                debug!(chat_id = existing.id, key, "lost direct chat creation race");
                summarize(&mut conn, existing, caller.user_id).await
            }
            None => Err(ChatError::conflict(
                "direct chat changed concurrently, please retry",
            )),
        }
    }

    async fn create_group_once(
        &self,
        caller: Caller,
        name: &str,
        members: &[UserId],
    ) -> ChatResult<ChatSummary> {
        let now = utils::now();
        let mut tx = self.pool.begin().await?;

        let chat = ChatRepository::insert(
            &mut tx,
            ChatKind::Group,
            Some(name),
            caller.user_id,
            None,
            &now,
        )
        .await?;

        for user_id in members {
            ParticipantRepository::insert_if_absent(&mut tx, chat.id, *user_id, &now).await?;
        }

        let summary = summarize(&mut tx, chat, caller.user_id).await?;
        tx.commit().await?;

        info!(
            chat_id = summary.chat.id,
            creator_id = caller.user_id,
            participants = members.len(),
            "created group chat"
        );
        Ok(summary)
    }
}
