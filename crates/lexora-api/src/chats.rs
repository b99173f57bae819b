use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use lexora_inbox::ConversationIndexer;
use lexora_types::api::RecentChatsResponse;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::messages::parse_user_id;
use crate::middleware::Claims;

/// GET /recent-chats/{user_id}: the caller's inbox, one row per
/// counterparty, most recently active first.
pub async fn recent_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let requested = parse_user_id(&user_id)?;
    if requested != claims.sub {
        return Err(ApiError::Forbidden("inbox belongs to another user".into()));
    }

    let db = state.clone();
    let chats = blocking(move || {
        ConversationIndexer::new(&db.db, &db.db)
            .list_recent_chats(&requested.to_string())
            .map_err(ApiError::from)
    })
    .await?;

    debug!("Inbox for {}: {} conversations", requested, chats.len());

    Ok(Json(RecentChatsResponse { chats }))
}
