use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full directory record for a member. Never serialized to other users
/// directly; see `api::PublicProfile` for the outward shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
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
    pub phone: Option<String>,
    pub skillsets: Vec<String>,
    pub want_investment: Option<String>,
    pub about: Option<String>,
    pub looking_for_who: Option<String>,
    pub provider: String,
    pub signup_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// A direct message. Immutable once the store has assigned `id`, `seq` and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Store-assigned insertion sequence, strictly increasing.
    pub seq: i64,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other participant relative to `user_id`, or `None` if `user_id`
    /// is not part of this message.
    pub fn counterparty_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.sender_id == user_id {
            Some(self.receiver_id)
        } else if self.receiver_id == user_id {
            Some(self.sender_id)
        } else {
            None
        }
    }
}

/// One row of a member's inbox: the latest message exchanged with a single
/// counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub counterparty_id: Uuid,
    pub display_name: String,
    pub handle: String,
    pub avatar_ref: Option<String>,
    pub last_message_content: String,
    pub last_message_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityRole {
    #[serde(rename = "Business Owner")]
    BusinessOwner,
    #[serde(rename = "Co-Founder")]
    CoFounder,
    #[serde(rename = "Investor")]
    Investor,
    #[serde(rename = "Freelancer/Worker")]
    Freelancer,
}

impl OpportunityRole {
    pub const ALL: [OpportunityRole; 4] = [
        Self::BusinessOwner,
        Self::CoFounder,
        Self::Investor,
        Self::Freelancer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessOwner => "Business Owner",
            Self::CoFounder => "Co-Founder",
            Self::Investor => "Investor",
            Self::Freelancer => "Freelancer/Worker",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|r| r.as_str() == raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: OpportunityRole,
    pub title: String,
    pub description: String,
    pub want_investment: Option<String>,
    pub company_stage: Option<String>,
    pub investment_range: Option<String>,
    pub skills_required: Vec<String>,
    // Snapshot of the poster at posting time
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: Uuid, receiver: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            seq: 1,
            sender_id: sender,
            receiver_id: receiver,
            content: "hi".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counterparty_is_the_other_side() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let m = message(a, b);
        assert_eq!(m.counterparty_of(a), Some(b));
        assert_eq!(m.counterparty_of(b), Some(a));
        assert_eq!(m.counterparty_of(Uuid::new_v4()), None);
    }

    #[test]
    fn role_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&OpportunityRole::Freelancer).unwrap();
        assert_eq!(json, "\"Freelancer/Worker\"");
        assert_eq!(OpportunityRole::parse(" Co-Founder "), Some(OpportunityRole::CoFounder));
        assert_eq!(OpportunityRole::parse("co-founder"), None);
    }
}
