use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::chats::list_chats,
        crate::routes::chats::create_chat,
        crate::routes::chats::get_chat,
        crate::routes::chats::mark_read,
        crate::routes::messages::get_messages,
        crate::routes::messages::create_message,
        crate::routes::participants::add_participant,
        crate::routes::participants::remove_participant,
        crate::routes::participants::leave_chat
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::ParticipantResponse,
            crate::routes::models::MessageResponse,
            crate::routes::models::ChatSummaryResponse,
            crate::routes::models::ChatDetailResponse,
            crate::routes::models::ChatsResponse,
            crate::routes::models::MessagePageResponse,
            crate::routes::models::CreateChatRequest,
            crate::routes::models::CreateMessageRequest,
            crate::routes::models::AddParticipantRequest
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Chats", description = "Direct and group conversations"),
        (name = "Messages", description = "Per-chat message history"),
        (name = "Participants", description = "Chat membership")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
