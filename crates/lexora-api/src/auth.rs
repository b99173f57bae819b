use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use lexora_db::Database;
use lexora_db::models::NewUser;
use lexora_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::{ApiError, blocking};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 8;

/// Usernames are stored trimmed and lowercase.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = normalize_username(&req.username);
    let email = req.email.trim().to_string();

    // Validate input
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ApiError::InvalidArgument(format!(
            "username must be {}-{} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !email.contains('@') {
        return Err(ApiError::InvalidArgument("email address is not valid".into()));
    }
    if req.password.len() < PASSWORD_MIN {
        return Err(ApiError::InvalidArgument(format!(
            "password must be at least {} characters",
            PASSWORD_MIN
        )));
    }

    let user_id = Uuid::new_v4();
    let db = state.clone();
    let name = username.clone();
    blocking(move || {
        if db.db.username_exists(&name).map_err(ApiError::store)? {
            return Err(ApiError::Conflict("username already taken".into()));
        }
        if db.db.get_user_by_email(&email).map_err(ApiError::store)?.is_some() {
            return Err(ApiError::Conflict("email already registered".into()));
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?
            .to_string();

        db.db
            .create_user(&NewUser {
                id: &user_id.to_string(),
                username: &name,
                email: &email,
                password_hash: &password_hash,
                firstname: req.firstname.trim(),
                lastname: req.lastname.trim(),
            })
            .map_err(|e| ApiError::store_or_conflict(e, "username or email already registered"))
    })
    .await?;

    info!("Registered user {} ({})", username, user_id);

    let token = create_token(&state, user_id, &username)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user = blocking(move || {
        let user = db
            .db
            .get_user_by_login(req.identifier.trim())
            .map_err(ApiError::store)?
            .ok_or(ApiError::Unauthorized)?;

        // Verify password
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| ApiError::Internal(format!("stored hash unreadable: {}", e)))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(user)
    })
    .await?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|_| ApiError::Internal(format!("corrupt user id '{}'", user.id)))?;

    let token = create_token(&state, user_id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

fn create_token(state: &AppStateInner, user_id: Uuid, username: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(state.token_ttl_days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
}
