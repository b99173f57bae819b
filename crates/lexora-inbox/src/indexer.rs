use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use lexora_types::models::{ChatSummary, Message};

use crate::error::InboxError;
use crate::store::{ConversationKey, MessageStore, UserDirectory};

/// Builds a member's "recent chats" list from the message log.
///
/// Stateless: every call reads the store once and recomputes from that
/// snapshot. Nothing is cached between calls.
pub struct ConversationIndexer<S, D> {
    store: S,
    directory: D,
}

impl<S: MessageStore, D: UserDirectory> ConversationIndexer<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    /// One entry per counterparty `user_id` has exchanged messages with,
    /// most recently active first.
    ///
    /// Counterparties the directory no longer knows are dropped from the
    /// list instead of failing the request.
    pub fn list_recent_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, InboxError> {
        let user_id: Uuid = user_id
            .parse()
            .map_err(|_| InboxError::InvalidArgument(format!("malformed user id '{}'", user_id)))?;

        let snapshot = self
            .store
            .query_by_participant(user_id)
            .map_err(InboxError::store)?;

        let latest = latest_per_conversation(user_id, &snapshot);
        let mut chats = Vec::with_capacity(latest.len());

        for message in latest {
            let Some(counterparty_id) = message.counterparty_of(user_id) else {
                continue;
            };

            let profile = self
                .directory
                .resolve_display(counterparty_id)
                .map_err(InboxError::store)?;

            match profile {
                Some(profile) => chats.push(ChatSummary {
                    counterparty_id,
                    display_name: profile.display_name,
                    handle: profile.handle,
                    avatar_ref: profile.avatar_ref,
                    last_message_content: message.content.clone(),
                    last_message_at: message.created_at,
                }),
                None => debug!(
                    "Skipping conversation {} <-> {}: counterparty not in directory",
                    user_id, counterparty_id
                ),
            }
        }

        Ok(chats)
    }
}

/// Latest message of every conversation `user_id` takes part in, newest
/// first.
///
/// Conversations are keyed by the unordered participant pair. Messages not
/// involving `user_id`, and self-addressed ones, are ignored.
pub fn latest_per_conversation(user_id: Uuid, messages: &[Message]) -> Vec<&Message> {
    let mut latest: HashMap<ConversationKey, &Message> = HashMap::new();

    for message in messages {
        if !message.involves(user_id) || message.sender_id == message.receiver_id {
            continue;
        }

        latest
            .entry(ConversationKey::of(message))
            .and_modify(|current| {
                if recency(message) > recency(current) {
                    *current = message;
                }
            })
            .or_insert(message);
    }

    let mut latest: Vec<&Message> = latest.into_values().collect();
    latest.sort_by(|a, b| recency(b).cmp(&recency(a)));
    latest
}

// Timestamp first, insertion sequence breaks ties.
fn recency(message: &Message) -> (DateTime<Utc>, i64) {
    (message.created_at, message.seq)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{Result, bail};

    use super::*;
    use crate::store::DisplayProfile;

    #[derive(Default)]
    struct MemoryStore {
        messages: Mutex<Vec<Message>>,
        down: bool,
    }

    impl MemoryStore {
        fn push(&self, sender: Uuid, receiver: Uuid, at: i64, content: &str) {
            let mut messages = self.messages.lock().unwrap();
            let seq = messages.len() as i64 + 1;
            messages.push(Message {
                id: Uuid::new_v4(),
                seq,
                sender_id: sender,
                receiver_id: receiver,
                content: content.to_string(),
                created_at: ts(at),
            });
        }
    }

    impl MessageStore for MemoryStore {
        fn insert(&self, sender_id: Uuid, receiver_id: Uuid, content: &str) -> Result<Message> {
            if self.down {
                bail!("connection refused");
            }
            let at = Utc::now().timestamp();
            self.push(sender_id, receiver_id, at, content);
            Ok(self.messages.lock().unwrap().last().cloned().unwrap())
        }

        fn query_by_participant(&self, user_id: Uuid) -> Result<Vec<Message>> {
            if self.down {
                bail!("connection refused");
            }
            // Deliberately reversed: callers must not rely on store order.
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|m| m.involves(user_id))
                .cloned()
                .collect())
        }

        fn query_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| ConversationKey::of(m) == ConversationKey::new(a, b))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MemoryDirectory {
        users: HashMap<Uuid, DisplayProfile>,
        down: bool,
    }

    impl MemoryDirectory {
        fn with(mut self, id: Uuid, handle: &str) -> Self {
            self.users.insert(
                id,
                DisplayProfile {
                    display_name: handle.to_uppercase(),
                    handle: handle.to_string(),
                    avatar_ref: Some(format!("/uploads/{}.png", handle)),
                },
            );
            self
        }
    }

    impl UserDirectory for MemoryDirectory {
        fn resolve_display(&self, user_id: Uuid) -> Result<Option<DisplayProfile>> {
            if self.down {
                bail!("directory offline");
            }
            Ok(self.users.get(&user_id).cloned())
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    struct Fixture {
        a: Uuid,
        b: Uuid,
        c: Uuid,
        d: Uuid,
        store: MemoryStore,
        directory: MemoryDirectory,
    }

    fn fixture() -> Fixture {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let directory = MemoryDirectory::default()
            .with(a, "alice")
            .with(b, "bob")
            .with(c, "carol")
            .with(d, "dave");
        Fixture { a, b, c, d, store: MemoryStore::default(), directory }
    }

    fn chats(f: &Fixture, user: Uuid) -> Vec<ChatSummary> {
        ConversationIndexer::new(&f.store, &f.directory)
            .list_recent_chats(&user.to_string())
            .unwrap()
    }

    #[test]
    fn two_way_exchange_is_one_conversation() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "hi");
        f.store.push(f.b, f.a, 2, "hello");
        f.store.push(f.a, f.b, 3, "how are you");

        let list = chats(&f, f.a);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].counterparty_id, f.b);
    }

    #[test]
    fn latest_message_wins_regardless_of_direction() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "hi");
        f.store.push(f.b, f.a, 2, "hello");

        let list = chats(&f, f.a);
        assert_eq!(list[0].last_message_content, "hello");
        assert_eq!(list[0].last_message_at, ts(2));
        assert_eq!(list[0].handle, "bob");
        assert_eq!(list[0].display_name, "BOB");
        assert_eq!(list[0].avatar_ref.as_deref(), Some("/uploads/bob.png"));
    }

    #[test]
    fn never_pairs_user_with_self() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "hi");
        f.store.push(f.c, f.a, 2, "hey");
        // A corrupt self-addressed row must not surface.
        f.store.push(f.a, f.a, 3, "note to self");

        let list = chats(&f, f.a);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|chat| chat.counterparty_id != f.a));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "hi");
        f.store.push(f.c, f.a, 5, "yo");
        f.store.push(f.b, f.a, 3, "sup");

        assert_eq!(chats(&f, f.a), chats(&f, f.a));
    }

    #[test]
    fn ordered_by_most_recent_activity() {
        let f = fixture();
        f.store.push(f.a, f.b, 5, "to bob");
        f.store.push(f.c, f.a, 10, "from carol");
        f.store.push(f.a, f.d, 1, "to dave");

        let order: Vec<_> = chats(&f, f.a).iter().map(|c| c.last_message_at).collect();
        assert_eq!(order, vec![ts(10), ts(5), ts(1)]);
    }

    #[test]
    fn empty_history_is_empty_not_error() {
        let f = fixture();
        f.store.push(f.b, f.c, 1, "not about alice");

        assert!(chats(&f, f.a).is_empty());
        assert!(chats(&f, Uuid::new_v4()).is_empty());
    }

    #[test]
    fn inbox_scenario() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "hi");
        f.store.push(f.b, f.a, 2, "yo");
        f.store.push(f.a, f.c, 3, "hey");

        let list = chats(&f, f.a);
        let view: Vec<_> = list
            .iter()
            .map(|c| (c.counterparty_id, c.last_message_content.as_str(), c.last_message_at))
            .collect();
        assert_eq!(view, vec![(f.c, "hey", ts(3)), (f.b, "yo", ts(2))]);

        // Same log, seen from bob's side.
        let list = chats(&f, f.b);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].counterparty_id, f.a);
        assert_eq!(list[0].last_message_content, "yo");
    }

    #[test]
    fn timestamp_tie_goes_to_later_insert() {
        let f = fixture();
        f.store.push(f.a, f.b, 7, "first");
        f.store.push(f.b, f.a, 7, "second");

        let list = chats(&f, f.a);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].last_message_content, "second");
    }

    #[test]
    fn unknown_counterparty_is_skipped() {
        let f = fixture();
        let ghost = Uuid::new_v4();
        f.store.push(f.a, ghost, 9, "anyone there?");
        f.store.push(f.a, f.b, 1, "hi");

        let list = chats(&f, f.a);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].counterparty_id, f.b);
    }

    #[test]
    fn store_outage_is_an_error_not_an_empty_list() {
        let f = fixture();
        let store = MemoryStore { down: true, ..Default::default() };
        let err = ConversationIndexer::new(&store, &f.directory)
            .list_recent_chats(&f.a.to_string())
            .unwrap_err();
        assert!(matches!(err, InboxError::StoreUnavailable(_)));
    }

    #[test]
    fn directory_outage_is_an_error() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "hi");
        let directory = MemoryDirectory { down: true, ..Default::default() };
        let err = ConversationIndexer::new(&f.store, &directory)
            .list_recent_chats(&f.a.to_string())
            .unwrap_err();
        assert!(matches!(err, InboxError::StoreUnavailable(_)));
    }

    #[test]
    fn malformed_user_id_is_rejected() {
        let f = fixture();
        let err = ConversationIndexer::new(&f.store, &f.directory)
            .list_recent_chats("not-a-user")
            .unwrap_err();
        assert!(matches!(err, InboxError::InvalidArgument(_)));

        for padded in [format!(" {}", f.a), format!("{}\n", f.a), String::new()] {
            let err = ConversationIndexer::new(&f.store, &f.directory)
                .list_recent_chats(&padded)
                .unwrap_err();
            assert!(matches!(err, InboxError::InvalidArgument(_)), "{:?}", padded);
        }
    }

    #[test]
    fn latest_per_conversation_keeps_one_per_pair() {
        let f = fixture();
        f.store.push(f.a, f.b, 1, "1");
        f.store.push(f.b, f.a, 4, "2");
        f.store.push(f.c, f.a, 2, "3");
        f.store.push(f.a, f.c, 3, "4");
        let snapshot = f.store.query_by_participant(f.a).unwrap();

        let latest = latest_per_conversation(f.a, &snapshot);
        let contents: Vec<_> = latest.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["2", "4"]);
    }
}
