use thiserror::Error;

#[derive(Debug, Error)]
pub enum InboxError {
    /// The requesting user id is not a well-formed identifier.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The message store or user directory could not be read.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl InboxError {
    pub fn store(err: anyhow::Error) -> Self {
        InboxError::StoreUnavailable(format!("{:#}", err))
    }
}
