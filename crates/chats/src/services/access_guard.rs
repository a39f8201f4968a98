//! Capability checks every read and write of a chat passes through.

use sqlx::SqliteConnection;

use crate::entities::Chat;
use crate::repositories::{ChatRepository, ParticipantRepository};
use crate::types::{Caller, ChatError, ChatId, ChatResult, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOperation {
    Read,
    Post,
    AddParticipant,
    RemoveParticipant { target: UserId },
}

/// A chat the caller has been cleared to operate on.
#[derive(Debug, Clone)]
pub struct Access {
    pub chat: Chat,
    pub is_participant: bool,
}

pub struct AccessGuard;

impl AccessGuard {
    /// Decides `operation` for `caller` on `chat` given their membership.
    ///
    /// Callers who can neither participate nor read any chat get the same
    /// `NotFound` a missing chat produces. Posting is reserved for
    /// participants and answers `Forbidden` otherwise.
    pub fn check(
        caller: &Caller,
        chat: &Chat,
        is_participant: bool,
        operation: ChatOperation,
    ) -> ChatResult<()> {
        let visible = is_participant || caller.role.can_read_any_chat();

        match operation {
            ChatOperation::Post => {
                if is_participant {
                    Ok(())
                } else {
                    Err(ChatError::forbidden("only participants can post to this chat"))
                }
            }
            _ if !visible => Err(ChatError::chat_not_found(chat.id)),
            ChatOperation::Read => Ok(()),
            ChatOperation::AddParticipant => {
                if is_participant || caller.role.can_moderate() {
                    Ok(())
                } else {
                    Err(ChatError::forbidden("only participants can add members"))
                }
            }
            ChatOperation::RemoveParticipant { target } if target == caller.user_id => {
                if is_participant {
                    Ok(())
                } else {
                    Err(ChatError::not_found(format!(
                        "participant {target} in chat {}",
                        chat.id
                    )))
                }
            }
            ChatOperation::RemoveParticipant { .. } => {
                let creator = chat.creator_id == caller.user_id && is_participant;
                if creator || caller.role.can_moderate() {
                    Ok(())
                } else {
                    Err(ChatError::forbidden(
                        "only the chat creator or a moderator can remove other participants",
                    ))
                }
            }
        }
    }

    pub async fn membership(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        user_id: UserId,
    ) -> ChatResult<bool> {
        ParticipantRepository::exists(conn, chat_id, user_id).await
    }

    /// Loads the chat and applies [`AccessGuard::check`].
    pub async fn authorize(
        conn: &mut SqliteConnection,
        chat_id: ChatId,
        caller: &Caller,
        operation: ChatOperation,
    ) -> ChatResult<Access> {
        let chat = ChatRepository::find(&mut *conn, chat_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_id))?;

        Self::admit(conn, chat, caller, operation).await
    }

    /// Applies the check to a chat row the caller already holds, typically
    /// one returned by [`ChatRepository::lock`] inside a transaction.
    pub async fn admit(
        conn: &mut SqliteConnection,
        chat: Chat,
        caller: &Caller,
        operation: ChatOperation,
    ) -> ChatResult<Access> {
        let is_participant = Self::membership(conn, chat.id, caller.user_id).await?;
        Self::check(caller, &chat, is_participant, operation)?;

        Ok(Access {
            chat,
            is_participant,
        })
    }
}
