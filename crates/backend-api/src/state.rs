use tutorline_auth::Authenticator;
use tutorline_chats::{Caller, ChatServices};

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    chats: ChatServices,
}

impl AppState {
    pub fn new(authenticator: Authenticator, chats: ChatServices) -> Self {
        Self {
            authenticator,
            chats,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn chats(&self) -> &ChatServices {
        &self.chats
    }

    /// Resolves a bearer token to the identity chat operations run as.
    pub async fn authenticate(&self, token: &str) -> Result<Caller, ApiError> {
        let (user, _) = self
            .authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)?;
        Ok(user.caller())
    }
}
