//! Input validation applied before any transaction opens.

use std::collections::BTreeSet;

use crate::types::{ChatError, UserId};

pub const MAX_CHAT_NAME_LENGTH: usize = 255;

pub struct Validator;

impl Validator {
    /// Group names must be non-empty after trimming. Returns the trimmed name.
    pub fn chat_name(name: Option<&str>) -> Result<String, ChatError> {
        let name = name.map(str::trim).unwrap_or("");
        if name.is_empty() {
            return Err(ChatError::validation("group chats require a name"));
        }

        if name.chars().count() > MAX_CHAT_NAME_LENGTH {
            return Err(ChatError::validation(format!(
                "chat name too long (max {MAX_CHAT_NAME_LENGTH} characters)"
            )));
        }

        Ok(name.to_string())
    }

    pub fn message_body(body: &str, max_length: usize) -> Result<(), ChatError> {
        if body.trim().is_empty() {
            return Err(ChatError::validation("message body cannot be empty"));
        }

        if body.chars().count() > max_length {
            return Err(ChatError::validation(format!(
                "message body too long (max {max_length} characters)"
            )));
        }

        Ok(())
    }

    /// The two distinct users of a direct chat, one of whom must be the creator.
    pub fn direct_pair(
        creator: UserId,
        participant_ids: &[UserId],
    ) -> Result<(UserId, UserId), ChatError> {
        let distinct: BTreeSet<UserId> = participant_ids.iter().copied().collect();
        if participant_ids.len() != 2 || distinct.len() != 2 {
            return Err(ChatError::validation(
                "direct chats need exactly two distinct participants",
            ));
        }

        if !distinct.contains(&creator) {
            return Err(ChatError::validation(
                "the creator must be one of the direct chat participants",
            ));
        }

        let other = distinct
            .into_iter()
            .find(|id| *id != creator)
            .ok_or_else(|| ChatError::validation("direct chats need a second participant"))?;

        Ok((creator, other))
    }

    /// Group membership with the creator folded in and duplicates collapsed.
    pub fn group_members(creator: UserId, participant_ids: &[UserId]) -> Vec<UserId> {
        let mut members: BTreeSet<UserId> = participant_ids.iter().copied().collect();
        members.insert(creator);
        members.into_iter().collect()
    }
}
