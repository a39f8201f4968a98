//! # Tutorline Chats Crate
//!
//! Conversation and membership management for the tutoring platform:
//! direct and group chats, their participants, an append-only message log
//! with per-chat sequences, and read cursors for unread indicators.
//!
//! ## Architecture
//!
//! - **Entities**: Chat, Participant, Message, ReadCursor
//! - **Repositories**: SQL access over a borrowed connection or transaction
//! - **Services**: AccessGuard, ChatStore, MembershipManager, MessageLog, QueryService
//! - **Types**: identifiers, roles, the caller identity and errors
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tutorline_chats::{Caller, ChatKind, ChatServices, Role};
//! use tutorline_config::ChatConfig;
//!
//! # async fn run(pool: sqlx::SqlitePool) -> tutorline_chats::ChatResult<()> {
//! let services = ChatServices::with_sqlite_directory(pool, ChatConfig::default());
//! let tutor = Caller::new(1, Role::Tutor);
//! let chat = services
//!     .store
//!     .create_chat(tutor, ChatKind::Direct, &[1, 2], None)
//!     .await?;
//! services.messages.append_message(chat.chat.id, tutor, "hello").await?;
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

pub use entities::{
    Chat, ChatDetail, ChatKind, ChatSummary, Cursor, Message, MessagePage, Participant,
    ReadCursor,
};
pub use services::{
    AccessGuard, ChatOperation, ChatServices, ChatStore, MembershipManager, MessageLog,
    QueryService, Removal, SqliteUserDirectory, UserDirectory,
};
pub use types::{Caller, ChatError, ChatId, ChatResult, Role, Sequence, UserId};
