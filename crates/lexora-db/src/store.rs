use anyhow::{Context, Result};
use uuid::Uuid;

use lexora_inbox::{DisplayProfile, MessageStore, UserDirectory};
use lexora_types::models::Message;

use crate::Database;
use crate::models::MessageRow;

impl MessageStore for Database {
    fn insert(&self, sender_id: Uuid, receiver_id: Uuid, content: &str) -> Result<Message> {
        let id = Uuid::new_v4();
        let row = self.insert_message(
            &id.to_string(),
            &sender_id.to_string(),
            &receiver_id.to_string(),
            content,
        )?;
        Message::try_from(row)
    }

    fn query_by_participant(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let rows = self.get_messages_for_participant(&user_id.to_string())?;
        into_messages(rows)
    }

    fn query_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>> {
        let rows = self.get_messages_between(&user_a.to_string(), &user_b.to_string())?;
        into_messages(rows)
    }
}

impl UserDirectory for Database {
    fn resolve_display(&self, user_id: Uuid) -> Result<Option<DisplayProfile>> {
        let row = self.get_user_by_id(&user_id.to_string())?;
        Ok(row.map(|user| DisplayProfile {
            display_name: user.firstname,
            handle: user.username,
            avatar_ref: user.profile_image,
        }))
    }
}

// A corrupt row fails the whole read.
fn into_messages(rows: Vec<MessageRow>) -> Result<Vec<Message>> {
    rows.into_iter()
        .map(|row| {
            let seq = row.seq;
            Message::try_from(row).with_context(|| format!("corrupt message row seq={}", seq))
        })
        .collect()
}
