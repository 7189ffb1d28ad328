//! Unified error types surfaced by the runtime API.
//!
//! Wraps revival rejections and worker coordination failures so clients can
//! bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use revival_core::{ConfigError, ErrorSeverity, LifecycleError, RevivalError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Revival(#[from] RevivalError),

    #[error("invalid revival configuration")]
    InvalidConfig(#[from] ConfigError),

    #[error("runtime requires host adapters to be configured before building")]
    MissingHost,

    #[error("controller worker command channel closed")]
    CommandChannelClosed,

    #[error("controller worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("controller worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    /// The revival rejection carried by this error, if any.
    pub fn as_revival(&self) -> Option<&RevivalError> {
        match self {
            Self::Revival(error) => Some(error),
            _ => None,
        }
    }
}

impl LifecycleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Revival(error) => error.severity(),
            Self::InvalidConfig(_) | Self::MissingHost => ErrorSeverity::Validation,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Revival(error) => error.error_code(),
            Self::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
            Self::MissingHost => "RUNTIME_MISSING_HOST",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}
