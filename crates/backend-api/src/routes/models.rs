use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutorline_chats::{Chat, ChatDetail, ChatSummary, Message, MessagePage, Participant};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            user_id: participant.user_id,
            joined_at: participant.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub sequence: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            body: message.body,
            sequence: message.sequence,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatSummaryResponse {
    pub id: i64,
    /// `direct` or `group`
    pub kind: String,
    pub name: Option<String>,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantResponse>,
    pub last_message: Option<MessageResponse>,
    pub unread: bool,
}

impl From<ChatSummary> for ChatSummaryResponse {
    fn from(summary: ChatSummary) -> Self {
        let Chat {
            id,
            kind,
            name,
            creator_id,
            created_at,
            ..
        } = summary.chat;

        Self {
            id,
            kind: kind.as_str().to_string(),
            name,
            creator_id,
            created_at,
            participants: summary.participants.into_iter().map(Into::into).collect(),
            last_message: summary.last_message.map(Into::into),
            unread: summary.unread,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatDetailResponse {
    pub id: i64,
    pub kind: String,
    pub name: Option<String>,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantResponse>,
}

impl From<ChatDetail> for ChatDetailResponse {
    fn from(detail: ChatDetail) -> Self {
        Self {
            id: detail.chat.id,
            kind: detail.chat.kind.as_str().to_string(),
            name: detail.chat.name,
            creator_id: detail.chat.creator_id,
            created_at: detail.chat.created_at,
            participants: detail.participants.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatsResponse {
    pub chats: Vec<ChatSummaryResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessagePageResponse {
    pub messages: Vec<MessageResponse>,
    /// Opaque token for the next page; absent when nothing has been read yet
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl From<MessagePage> for MessagePageResponse {
    fn from(page: MessagePage) -> Self {
        Self {
            messages: page.messages.into_iter().map(Into::into).collect(),
            next_cursor: page.next_cursor.map(|cursor| cursor.encode()),
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChatRequest {
    /// `direct` or `group`
    pub kind: String,
    #[serde(default)]
    pub participant_ids: Vec<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddParticipantRequest {
    pub user_id: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessagesQuery {
    /// Cursor returned by a previous page
    pub cursor: Option<String>,
    /// Page size, clamped to the configured maximum
    pub limit: Option<u32>,
}
