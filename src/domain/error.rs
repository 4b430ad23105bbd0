use thiserror::Error;

/// Errors reported by a [`ContainerRuntime`](super::ContainerRuntime) backend.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The target object does not exist. Remove primitives report this so
    /// callers can treat an already absent resource as removed.
    #[error("{0} not found")]
    NotFound(String),

    #[error("deadline exceeded while {0}")]
    DeadlineExceeded(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{context} failed ({status}): {stderr}")]
    Command {
        context: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected runtime output while {context}: {output}")]
    Parse { context: String, output: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors of the single component operations (install, installed check).
#[derive(Error, Debug)]
pub enum ComponentError {
    /// The image id is outside every recognized namespace.
    #[error("not srcd component: {0}")]
    NotSrcd(String),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
