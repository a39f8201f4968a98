//! Shared types for the conversation core: identifiers, roles and the
//! explicit caller identity passed to every operation.

pub mod errors;

use serde::{Deserialize, Serialize};

pub use errors::{ChatError, ChatResult};

pub type ChatId = i64;
pub type UserId = i64;
pub type Sequence = i64;

/// Platform role of a user. Parsed once at the authentication boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
    Admin,
}

impl Role {
    /// Read any chat without being a participant.
    pub fn can_read_any_chat(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Add participants to any group chat and remove any participant.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }
}

/// Unknown role strings resolve to the least privileged role.
impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "tutor" => Role::Tutor,
            _ => Role::Student,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Authenticated identity on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
