use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use lexora_inbox::MessageStore;
use lexora_types::api::SendMessageRequest;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::middleware::Claims;

pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidArgument(format!("malformed user id '{}'", raw)))
}

/// POST /messages: the caller sends a direct message to `receiver_id`.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::InvalidArgument("message content is empty".into()));
    }
    if req.receiver_id == claims.sub {
        return Err(ApiError::InvalidArgument("cannot message yourself".into()));
    }

    let db = state.clone();
    let sender_id = claims.sub;
    let message = blocking(move || {
        db.db
            .get_user_by_id(&req.receiver_id.to_string())
            .map_err(ApiError::store)?
            .ok_or_else(|| ApiError::NotFound(format!("user {}", req.receiver_id)))?;

        db.db
            .insert(sender_id, req.receiver_id, &req.content)
            .map_err(ApiError::store)
    })
    .await?;

    debug!("Message {} from {} to {}", message.id, message.sender_id, message.receiver_id);

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/{other_user_id}: full history between the caller and
/// another member, oldest first.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(other_user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let other = parse_user_id(&other_user_id)?;

    let db = state.clone();
    let messages = blocking(move || {
        db.db
            .query_between(claims.sub, other)
            .map_err(ApiError::store)
    })
    .await?;

    Ok(Json(messages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_must_be_exact_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
        assert!(parse_user_id(&format!(" {} ", id)).is_err());
        assert!(parse_user_id("bob").is_err());
    }
}
