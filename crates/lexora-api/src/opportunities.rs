use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use lexora_db::models::NewOpportunity;
use lexora_types::api::PostOpportunityRequest;
use lexora_types::models::{Opportunity, OpportunityRole};

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::middleware::Claims;

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidArgument(format!("missing required field '{}'", name)))
}

/// POST /opportunities: post as the caller. Poster name, handle, location
/// and avatar are copied from the profile at posting time.
pub async fn post_opportunity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PostOpportunityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = required(&req.role, "role")?;
    let role = OpportunityRole::parse(role)
        .ok_or_else(|| ApiError::InvalidArgument(format!("unknown role '{}'", role)))?;
    required(&req.title, "title")?;
    required(&req.description, "description")?;

    let id = Uuid::new_v4();
    let db = state.clone();
    let user_id = claims.sub;
    let row = blocking(move || {
        let title = required(&req.title, "title")?;
        let description = required(&req.description, "description")?;
        db.db
            .insert_opportunity(&NewOpportunity {
                id: &id.to_string(),
                user_id: &user_id.to_string(),
                role,
                title,
                description,
                want_investment: req.want_investment.as_deref(),
                company_stage: req.company_stage.as_deref(),
                investment_range: req.investment_range.as_deref(),
                skills_required: &req.skills_required,
            })
            .map_err(ApiError::store)?
            .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
    })
    .await?;

    let opportunity = Opportunity::try_from(row).map_err(|e| {
        warn!("Corrupt opportunity row: {:#}", e);
        ApiError::Internal("corrupt opportunity record".into())
    })?;

    info!("Opportunity {} posted by {}", opportunity.id, claims.username);

    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// GET /opportunities: newest first.
pub async fn browse_opportunities(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_opportunities().map_err(ApiError::store)).await?;

    // Skip broken rows rather than failing the whole listing
    let opportunities: Vec<Opportunity> = rows
        .into_iter()
        .filter_map(|row| {
            Opportunity::try_from(row)
                .map_err(|e| warn!("Skipping corrupt opportunity: {:#}", e))
                .ok()
        })
        .collect();

    Ok(Json(opportunities))
}
