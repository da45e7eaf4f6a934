use thiserror::Error;

/// Failures while starting or stopping the system as a whole.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Failed to signal shutdown: {0}")]
    ShutdownSignal(String),
    #[error("Actor task failed: {0}")]
    ActorTask(#[from] tokio::task::JoinError),
    #[error("Failed to install tracing subscriber: {0}")]
    Tracing(String),
}
