//! Data access for conversations.
//!
//! Repositories take a `&mut SqliteConnection` so the services can run them
//! on a pooled connection or inside an open transaction alike.

pub mod chat_repository;
pub mod message_repository;
pub mod participant_repository;
pub mod read_cursor_repository;

pub use chat_repository::ChatRepository;
pub use message_repository::MessageRepository;
pub use participant_repository::ParticipantRepository;
pub use read_cursor_repository::ReadCursorRepository;
