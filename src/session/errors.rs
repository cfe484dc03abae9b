use uuid::Uuid;

/// Session errors.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Maximum number of sessions reached")]
    MaxSessions,

    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Transform(Box<dyn std::error::Error + Send + Sync>),
}
