use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::routes::models::AddParticipantRequest;
use crate::{util::caller, ApiError, AppState};

#[utoipa::path(
    post,
    path = "/api/chats/{chat_id}/participants",
    tag = "Participants",
    security(("bearerAuth" = [])),
    params(("chat_id" = i64, Path, description = "Chat identifier")),
    request_body = AddParticipantRequest,
    responses(
        (status = 204, description = "User is a participant"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller may not add participants", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat or user not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Direct chats have fixed participants", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_participant(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<AddParticipantRequest>,
) -> Result<StatusCode, ApiError> {
    let caller = caller(&state, &headers).await?;

    state
        .chats()
        .membership
        .add_participant(chat_id, caller, req.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/chats/{chat_id}/participants/{user_id}",
    tag = "Participants",
    security(("bearerAuth" = [])),
    params(
        ("chat_id" = i64, Path, description = "Chat identifier"),
        ("user_id" = i64, Path, description = "Participant to remove")
    ),
    responses(
        (status = 204, description = "Participant removed"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller may not remove this participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat or participant not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_participant(
    State(state): State<AppState>,
    Path((chat_id, user_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let caller = caller(&state, &headers).await?;

    state
        .chats()
        .membership
        .remove_participant(chat_id, caller, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/chats/{chat_id}/leave",
    tag = "Participants",
    security(("bearerAuth" = [])),
    params(("chat_id" = i64, Path, description = "Chat identifier")),
    responses(
        (status = 204, description = "Caller left the chat"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat not found or caller is not a participant", body = crate::error::ErrorResponse)
    )
)]
pub async fn leave_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let caller = caller(&state, &headers).await?;

    state.chats().membership.leave_chat(chat_id, caller).await?;

    Ok(StatusCode::NO_CONTENT)
}
