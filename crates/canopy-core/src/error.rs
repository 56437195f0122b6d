use thiserror::Error;

use super::presentation::ErrorCategory;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The payload cannot be turned into a tree. No partial tree is ever exposed.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// A fetch failed in a way that may succeed on a second attempt.
    #[error("transient fetch failure: {0}")]
    TransientFetchFailure(String),
    /// A fetch failed and has been classified into a terminal display category.
    #[error("terminal fetch failure ({category:?})")]
    TerminalFetchFailure {
        category: ErrorCategory,
        message: Option<String>,
    },
    /// A vote/save/delete/edit/reply/report request failed after the local state was updated.
    #[error("{action} request for {target} failed: {reason}")]
    ActionRequestFailure {
        action: &'static str,
        target: String,
        reason: String,
    },
    #[error("loading state {from} cannot transition to {to}")]
    InvalidLoadingTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl EngineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    pub fn missing_field(field: &str, context: Option<&str>) -> Self {
        match context {
            Some(id) => Self::MalformedPayload(format!("comment {id} is missing `{field}`")),
            None => Self::MalformedPayload(format!("comment is missing `{field}`")),
        }
    }
}
