//! Read-model over the direct message log: which members a user has talked
//! to, and the latest message exchanged with each of them.

pub mod error;
pub mod indexer;
pub mod store;

pub use error::InboxError;
pub use indexer::ConversationIndexer;
pub use store::{ConversationKey, DisplayProfile, MessageStore, UserDirectory};
