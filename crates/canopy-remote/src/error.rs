use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("service answered {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },
    /// The request never got an answer.
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no scripted response left for {0}")]
    Unscripted(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl RemoteError {
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            message: None,
        }
    }
}
