//! Participant lifecycle: joining, removal and reclamation of empty chats.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use super::access_guard::{AccessGuard, ChatOperation};
use super::directory::UserDirectory;
use super::retry::with_retry;
use crate::repositories::{ChatRepository, ParticipantRepository};
use crate::types::{Caller, ChatError, ChatId, ChatResult, UserId};
use crate::utils;

/// What a successful removal did to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The chat still has participants.
    Removed { remaining: i64 },
    /// The last participant left; the chat and its history are gone.
    ChatDeleted,
}

#[derive(Clone)]
pub struct MembershipManager {
    pool: SqlitePool,
    directory: Arc<dyn UserDirectory>,
}

impl MembershipManager {
    pub fn new(pool: SqlitePool, directory: Arc<dyn UserDirectory>) -> Self {
        Self { pool, directory }
    }

    /// Adds `new_user_id` to a group chat. Adding a current participant
    /// succeeds without changes; the return value tells whether a row was
    /// inserted.
    pub async fn add_participant(
        &self,
        chat_id: ChatId,
        caller: Caller,
        new_user_id: UserId,
    ) -> ChatResult<bool> {
        let missing = self.directory.missing_users(&[new_user_id]).await?;
        if !missing.is_empty() {
            return Err(ChatError::not_found(format!("user {new_user_id}")));
        }

        with_retry("add_participant", move || {
            self.add_once(chat_id, caller, new_user_id)
        })
        .await
    }

    async fn add_once(
        &self,
        chat_id: ChatId,
        caller: Caller,
        new_user_id: UserId,
    ) -> ChatResult<bool> {
        let mut tx = self.pool.begin().await?;

        let chat = ChatRepository::lock(&mut tx, chat_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_id))?;
        let access = AccessGuard::admit(&mut tx, chat, &caller, ChatOperation::AddParticipant).await?;

        if access.chat.is_direct() {
            return Err(ChatError::invalid_operation(
                "participants cannot be added to a direct chat",
            ));
        }

        let inserted =
            ParticipantRepository::insert_if_absent(&mut tx, chat_id, new_user_id, &utils::now())
                .await?;
        tx.commit().await?;

        if inserted {
            info!(
                chat_id,
                user_id = new_user_id,
                added_by = caller.user_id,
                "added participant"
            );
        } else {
            info!(chat_id, user_id = new_user_id, "participant already present");
        }
        Ok(inserted)
    }

    /// Removes `target_user_id` from the chat, deleting the chat when nobody
    /// is left.
    pub async fn remove_participant(
        &self,
        chat_id: ChatId,
        caller: Caller,
        target_user_id: UserId,
    ) -> ChatResult<Removal> {
        with_retry("remove_participant", move || {
            self.remove_once(chat_id, caller, target_user_id)
        })
        .await
    }

    /// Self-removal.
    pub async fn leave_chat(&self, chat_id: ChatId, caller: Caller) -> ChatResult<Removal> {
        self.remove_participant(chat_id, caller, caller.user_id).await
    }

    async fn remove_once(
        &self,
        chat_id: ChatId,
        caller: Caller,
        target_user_id: UserId,
    ) -> ChatResult<Removal> {
        let mut tx = self.pool.begin().await?;

        let chat = ChatRepository::lock(&mut tx, chat_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_id))?;
        let access = AccessGuard::admit(
            &mut tx,
            chat,
            &caller,
            ChatOperation::RemoveParticipant {
                target: target_user_id,
            },
        )
        .await?;

        let removed = ParticipantRepository::delete(&mut tx, chat_id, target_user_id).await?;
        if !removed {
            return Err(ChatError::not_found(format!(
                "participant {target_user_id} in chat {chat_id}"
            )));
        }

        let remaining = ParticipantRepository::count(&mut tx, chat_id).await?;
        let outcome = if remaining == 0 {
            ChatRepository::purge(&mut tx, chat_id).await?;
            Removal::ChatDeleted
        } else {
            if access.chat.is_direct() && remaining < 2 {
                ChatRepository::clear_direct_key(&mut tx, chat_id).await?;
            }
            Removal::Removed { remaining }
        };

        tx.commit().await?;

        match outcome {
            Removal::ChatDeleted => info!(
                chat_id,
                user_id = target_user_id,
                removed_by = caller.user_id,
                "last participant left, chat deleted"
            ),
            Removal::Removed { remaining } => info!(
                chat_id,
                user_id = target_user_id,
                removed_by = caller.user_id,
                remaining,
                "removed participant"
            ),
        }
        Ok(outcome)
    }
}
