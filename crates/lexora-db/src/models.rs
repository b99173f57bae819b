//! Database row types. These map directly to SQLite rows and stay distinct
//! from the lexora-types models so the storage layer can change on its own.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use lexora_types::models::{Message, Opportunity, OpportunityRole, User};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub profile_image: Option<String>,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub company: Option<String>,
    pub companies_invested: Option<String>,
    pub companies_worked: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    /// JSON array of strings
    pub skillsets: String,
    pub want_investment: Option<String>,
    pub about: Option<String>,
    pub looking_for_who: Option<String>,
    pub provider: String,
    pub signup_date: String,
    pub last_updated: String,
}

pub struct MessageRow {
    pub seq: i64,
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: String,
}

pub struct OpportunityRow {
    pub id: String,
    pub user_id: String,
    pub role: String,
    pub title: String,
    pub description: String,
    pub want_investment: Option<String>,
    pub company_stage: Option<String>,
    pub investment_range: Option<String>,
    /// JSON array of strings
    pub skills_required: String,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: String,
}

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
}

/// Columns touched by a profile update. `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub companies_invested: Option<String>,
    pub companies_worked: Option<String>,
    pub want_investment: Option<String>,
    pub skillsets: Option<Vec<String>>,
    pub looking_for_who: Option<String>,
}

pub struct NewOpportunity<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub role: OpportunityRole,
    pub title: &'a str,
    pub description: &'a str,
    pub want_investment: Option<&'a str>,
    pub company_stage: Option<&'a str>,
    pub investment_range: Option<&'a str>,
    pub skills_required: &'a [String],
}

/// Timestamps are written as RFC 3339 with milliseconds. Rows written by
/// older tooling may carry SQLite's bare `YYYY-MM-DD HH:MM:SS`, read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .map_err(|e| anyhow!("bad timestamp '{}': {}", raw, e))
}

fn parse_string_list(raw: &str, column: &str, row_id: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", column, raw, row_id, e);
        Vec::new()
    })
}

impl TryFrom<MessageRow> for Message {
    type Error = anyhow::Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id.parse().with_context(|| format!("message id '{}'", row.id))?,
            seq: row.seq,
            sender_id: row
                .sender_id
                .parse()
                .with_context(|| format!("sender_id on message '{}'", row.id))?,
            receiver_id: row
                .receiver_id
                .parse()
                .with_context(|| format!("receiver_id on message '{}'", row.id))?,
            created_at: parse_timestamp(&row.created_at)
                .with_context(|| format!("created_at on message '{}'", row.id))?,
            content: row.content,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let id: Uuid = row.id.parse().with_context(|| format!("user id '{}'", row.id))?;
        let skillsets = parse_string_list(&row.skillsets, "skillsets", &row.id);

        Ok(User {
            id,
            signup_date: parse_timestamp(&row.signup_date)?,
            last_updated: parse_timestamp(&row.last_updated)?,
            username: row.username,
            email: row.email,
            firstname: row.firstname,
            lastname: row.lastname,
            profile_image: row.profile_image,
            location: row.location,
            full_address: row.full_address,
            company: row.company,
            companies_invested: row.companies_invested,
            companies_worked: row.companies_worked,
            role: row.role,
            phone: row.phone,
            skillsets,
            want_investment: row.want_investment,
            about: row.about,
            looking_for_who: row.looking_for_who,
            provider: row.provider,
        })
    }
}

impl TryFrom<OpportunityRow> for Opportunity {
    type Error = anyhow::Error;

    fn try_from(row: OpportunityRow) -> Result<Self> {
        let role = OpportunityRole::parse(&row.role)
            .ok_or_else(|| anyhow!("unknown role '{}' on opportunity '{}'", row.role, row.id))?;
        let skills_required = parse_string_list(&row.skills_required, "skills_required", &row.id);

        Ok(Opportunity {
            id: row.id.parse().with_context(|| format!("opportunity id '{}'", row.id))?,
            user_id: row
                .user_id
                .parse()
                .with_context(|| format!("user_id on opportunity '{}'", row.id))?,
            created_at: parse_timestamp(&row.created_at)?,
            role,
            title: row.title,
            description: row.description,
            want_investment: row.want_investment,
            company_stage: row.company_stage,
            investment_range: row.investment_range,
            skills_required,
            firstname: row.firstname,
            lastname: row.lastname,
            username: row.username,
            location: row.location,
            full_address: row.full_address,
            profile_image: row.profile_image,
        })
    }
}
