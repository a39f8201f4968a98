use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tutorline_chats::Cursor;

use crate::routes::models::{
    CreateMessageRequest, MessagePageResponse, MessageResponse, MessagesQuery,
};
use crate::{util::caller, ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(
        ("chat_id" = i64, Path, description = "Chat identifier"),
        MessagesQuery
    ),
    responses(
        (status = 200, description = "Messages after the cursor in sequence order", body = MessagePageResponse),
        (status = 400, description = "Malformed cursor or limit", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat not found or not visible", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    headers: HeaderMap,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagePageResponse>, ApiError> {
    let caller = caller(&state, &headers).await?;
    let cursor = query.cursor.as_deref().map(Cursor::decode).transpose()?;

    let page = state
        .chats()
        .messages
        .list_messages(chat_id, caller, cursor, query.limit)
        .await?;

    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/chats/{chat_id}/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(("chat_id" = i64, Path, description = "Chat identifier")),
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = MessageResponse),
        (status = 400, description = "Empty or oversized body", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let caller = caller(&state, &headers).await?;

    let message = state
        .chats()
        .messages
        .append_message(chat_id, caller, &req.body)
        .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}
