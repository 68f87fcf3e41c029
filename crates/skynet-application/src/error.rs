use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("unable to reach the node at {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("node request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("the server replied with error [{status}]: {message}")]
    Status { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodeError {
    /// Connection failures mean no node is listening, as opposed to a node
    /// that answered with an error.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, NodeError::Connect { .. })
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("service '{0}' is already exposed; a service can only be exposed once")]
    AlreadyExposed(String),
    #[error("this synchronizer delivers groups to a callback; it cannot also be read from")]
    CallbackMode,
}
