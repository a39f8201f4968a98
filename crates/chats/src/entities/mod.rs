//! Domain entities for conversations.

pub mod chat;
pub mod message;
pub mod participant;
pub mod read_cursor;

pub use chat::{direct_key, Chat, ChatDetail, ChatKind, ChatSummary};
pub use message::{Cursor, Message, MessagePage};
pub use participant::Participant;
pub use read_cursor::ReadCursor;
