use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tutorline_chats::ChatKind;

use crate::routes::models::{ChatDetailResponse, ChatSummaryResponse, ChatsResponse, CreateChatRequest};
use crate::{util::caller, ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "Chats",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Chats visible to the caller, most recent activity first", body = ChatsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 503, description = "Storage temporarily unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ChatsResponse>, ApiError> {
    let caller = caller(&state, &headers).await?;

    let chats = state.chats().queries.list_chats_for(caller).await?;

    Ok(Json(ChatsResponse {
        chats: chats.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "Chats",
    security(("bearerAuth" = [])),
    request_body = CreateChatRequest,
    responses(
        (status = 200, description = "Chat created, or the existing direct chat for the pair", body = ChatSummaryResponse),
        (status = 400, description = "Invalid chat payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "A participant does not exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateChatRequest>,
) -> Result<Json<ChatSummaryResponse>, ApiError> {
    let caller = caller(&state, &headers).await?;
    let kind: ChatKind = req.kind.parse()?;

    let summary = state
        .chats()
        .store
        .create_chat(caller, kind, &req.participant_ids, req.name.as_deref())
        .await?;

    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}",
    tag = "Chats",
    security(("bearerAuth" = [])),
    params(("chat_id" = i64, Path, description = "Chat identifier")),
    responses(
        (status = 200, description = "Chat with its participants", body = ChatDetailResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat not found or not visible", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ChatDetailResponse>, ApiError> {
    let caller = caller(&state, &headers).await?;

    let detail = state.chats().store.get_chat(chat_id, caller).await?;

    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/api/chats/{chat_id}/read",
    tag = "Chats",
    security(("bearerAuth" = [])),
    params(("chat_id" = i64, Path, description = "Chat identifier")),
    responses(
        (status = 204, description = "Read cursor advanced to the latest message"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Chat not found or not visible", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let caller = caller(&state, &headers).await?;

    state.chats().queries.mark_read(chat_id, caller).await?;

    Ok(StatusCode::NO_CONTENT)
}
