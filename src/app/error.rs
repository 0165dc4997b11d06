use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Store(String),

    #[error("Blocking store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Malformed notification: {0}")]
    MalformedNotification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotificationsError {
    /// Errors caused by the caller's input. These never reach the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NotificationsError::InvalidRequest(_) | NotificationsError::MalformedNotification(_)
        )
    }

    /// Transient failures; the caller may retry the whole request.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

pub type Result<T> = std::result::Result<T, NotificationsError>;
