use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChatSummary, User};

// -- JWT Claims --

/// Bearer token claims issued at login and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

/// `identifier` is either the username or the email address.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct CheckUsernameQuery {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckUsernameResponse {
    pub exists: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSearchResult {
    pub id: Uuid,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub profile_image: Option<String>,
    pub role: Option<String>,
}

impl From<User> for UserSearchResult {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            firstname: user.firstname,
            lastname: user.lastname,
            profile_image: user.profile_image,
            role: user.role,
        }
    }
}

/// Profile as shown to other members. Omits password hash and phone.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub profile_image: Option<String>,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub company: Option<String>,
    pub companies_invested: Option<String>,
    pub companies_worked: Option<String>,
    pub role: Option<String>,
    pub skillsets: Vec<String>,
    pub want_investment: Option<String>,
    pub about: Option<String>,
    pub looking_for_who: Option<String>,
    pub signup_date: DateTime<Utc>,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
            profile_image: user.profile_image,
            location: user.location,
            full_address: user.full_address,
            company: user.company,
            companies_invested: user.companies_invested,
            companies_worked: user.companies_worked,
            role: user.role,
            skillsets: user.skillsets,
            want_investment: user.want_investment,
            about: user.about,
            looking_for_who: user.looking_for_who,
            signup_date: user.signup_date,
        }
    }
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    /// Full free-form address; the short `location` is derived from it.
    pub location: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub companies_invested: Option<String>,
    pub companies_worked: Option<String>,
    pub want_investment: Option<String>,
    pub skillsets: Option<Vec<String>>,
    pub looking_for_who: Option<String>,
}

// -- Opportunities --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostOpportunityRequest {
    pub role: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub want_investment: Option<String>,
    pub company_stage: Option<String>,
    pub investment_range: Option<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentChatsResponse {
    pub chats: Vec<ChatSummary>,
}
