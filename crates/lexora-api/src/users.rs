use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::{info, warn};

use lexora_db::models::{ProfileChanges, UserRow};
use lexora_types::api::{
    CheckUsernameQuery, CheckUsernameResponse, PublicProfile, SearchUsersQuery, UpdateProfileRequest,
    UserSearchResult,
};
use lexora_types::models::User;

use crate::auth::{AppState, USERNAME_MIN, normalize_username};
use crate::error::{ApiError, blocking};
use crate::messages::parse_user_id;
use crate::middleware::Claims;

fn user_from_row(row: UserRow) -> Result<User, ApiError> {
    User::try_from(row).map_err(|e| {
        warn!("Corrupt user row: {:#}", e);
        ApiError::Internal("corrupt user record".into())
    })
}

/// Short display location: the first three comma-separated parts of a full
/// address, e.g. "Pune, Maharashtra, India" out of a longer geocoded string.
pub fn short_location(full_address: &str) -> String {
    full_address
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .take(3)
        .collect::<Vec<_>>()
        .join(", ")
}

/// GET /users/check-username?username=: availability check during signup.
pub async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<CheckUsernameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let username = normalize_username(&query.username);
    if username.chars().count() < USERNAME_MIN {
        return Err(ApiError::InvalidArgument(format!(
            "username must be at least {} characters",
            USERNAME_MIN
        )));
    }

    let db = state.clone();
    let exists = blocking(move || db.db.username_exists(&username).map_err(ApiError::store)).await?;

    Ok(Json(CheckUsernameResponse {
        exists,
        message: if exists { "Username already taken" } else { "Username available" }.to_string(),
    }))
}

/// GET /users/{user_id}
pub async fn public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;

    let db = state.clone();
    let row = blocking(move || db.db.get_user_by_id(&user_id.to_string()).map_err(ApiError::store))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;

    Ok(Json(PublicProfile::from(user_from_row(row)?)))
}

/// GET /users/search?query=
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchUsersQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.search_users(&query.query).map_err(ApiError::store)).await?;

    let results: Vec<UserSearchResult> = rows
        .into_iter()
        .filter_map(|row| user_from_row(row).ok())
        .map(UserSearchResult::from)
        .collect();

    Ok(Json(results))
}

/// PUT /profile: update the caller's own profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.map(|e| e.trim().to_string());
    if email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(ApiError::InvalidArgument("email address is not valid".into()));
    }

    let changes = ProfileChanges {
        firstname: req.firstname,
        lastname: req.lastname,
        email,
        about: req.about,
        location: req.location.as_deref().map(short_location),
        full_address: req.location,
        role: req.role,
        phone: req.phone,
        company: req.company,
        companies_invested: req.companies_invested,
        companies_worked: req.companies_worked,
        want_investment: req.want_investment,
        skillsets: req.skillsets,
        looking_for_who: req.looking_for_who,
    };

    let db = state.clone();
    let user_id = claims.sub.to_string();
    let row = blocking(move || {
        if let Some(email) = &changes.email {
            let owner = db.db.get_user_by_email(email).map_err(ApiError::store)?;
            if owner.is_some_and(|u| u.id != user_id) {
                return Err(ApiError::Conflict("email already registered".into()));
            }
        }

        let updated = db
            .db
            .update_profile(&user_id, &changes)
            .map_err(|e| ApiError::store_or_conflict(e, "email already registered"))?;
        if !updated {
            return Err(ApiError::NotFound(format!("user {}", user_id)));
        }

        db.db
            .get_user_by_id(&user_id)
            .map_err(ApiError::store)?
            .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
    })
    .await?;

    info!("Profile updated for {}", claims.username);

    Ok(Json(PublicProfile::from(user_from_row(row)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_location_keeps_first_three_parts() {
        assert_eq!(
            short_location("Kothrud, Pune, Maharashtra, 411038, India"),
            "Kothrud, Pune, Maharashtra"
        );
        assert_eq!(short_location("Berlin"), "Berlin");
        assert_eq!(short_location(" , Lisbon ,Portugal"), "Lisbon, Portugal");
        assert_eq!(short_location(""), "");
    }
}
