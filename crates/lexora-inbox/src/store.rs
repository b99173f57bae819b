use anyhow::Result;
use uuid::Uuid;

use lexora_types::models::Message;

/// Append-only log of direct messages.
pub trait MessageStore: Send + Sync {
    /// Append a message. The store assigns `id`, `seq` and `created_at`.
    fn insert(&self, sender_id: Uuid, receiver_id: Uuid, content: &str) -> Result<Message>;

    /// Every message where `user_id` is sender or receiver. No ordering is
    /// guaranteed.
    fn query_by_participant(&self, user_id: Uuid) -> Result<Vec<Message>>;

    /// Both directions between two members, oldest first.
    fn query_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>>;
}

/// Display attributes of a member as shown in an inbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayProfile {
    pub display_name: String,
    pub handle: String,
    pub avatar_ref: Option<String>,
}

pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when the member does not exist (any more).
    fn resolve_display(&self, user_id: Uuid) -> Result<Option<DisplayProfile>>;
}

impl<T: MessageStore + ?Sized> MessageStore for &T {
    fn insert(&self, sender_id: Uuid, receiver_id: Uuid, content: &str) -> Result<Message> {
        (**self).insert(sender_id, receiver_id, content)
    }

    fn query_by_participant(&self, user_id: Uuid) -> Result<Vec<Message>> {
        (**self).query_by_participant(user_id)
    }

    fn query_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>> {
        (**self).query_between(user_a, user_b)
    }
}

impl<T: UserDirectory + ?Sized> UserDirectory for &T {
    fn resolve_display(&self, user_id: Uuid) -> Result<Option<DisplayProfile>> {
        (**self).resolve_display(user_id)
    }
}

/// Identity of a two-party conversation: the unordered pair of its
/// participants, stored sorted so A->B and B->A map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey {
    low: Uuid,
    high: Uuid,
}

impl ConversationKey {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn of(message: &Message) -> Self {
        Self::new(message.sender_id, message.receiver_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_direction() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ConversationKey::new(a, b), ConversationKey::new(b, a));
    }

    #[test]
    fn distinct_pairs_get_distinct_keys() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_ne!(ConversationKey::new(a, b), ConversationKey::new(a, c));
    }
}
