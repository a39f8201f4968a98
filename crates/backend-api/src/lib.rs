mod docs;
mod error;
mod middleware;
mod state;
mod util;

pub mod routes;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Chat routes
        .route(
            "/api/chats",
            get(routes::chats::list_chats).post(routes::chats::create_chat),
        )
        .route("/api/chats/:chat_id", get(routes::chats::get_chat))
        .route("/api/chats/:chat_id/read", post(routes::chats::mark_read))
        // Message routes
        .route(
            "/api/chats/:chat_id/messages",
            get(routes::messages::get_messages).post(routes::messages::create_message),
        )
        // Participant routes
        .route(
            "/api/chats/:chat_id/participants",
            post(routes::participants::add_participant),
        )
        .route(
            "/api/chats/:chat_id/participants/:user_id",
            delete(routes::participants::remove_participant),
        )
        .route(
            "/api/chats/:chat_id/leave",
            post(routes::participants::leave_chat),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(middleware::logging_middleware))
        .layer(middleware::cors_layer())
}
