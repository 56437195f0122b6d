use super::context::ThreadId;
use super::error::EngineError;
use super::fullname::Fullname;
use super::payload::Thing;
use super::payload::ThreadPayload;
use super::presentation::ErrorCategory;

/// Requests the engine asks the remote comment service to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    FetchThread { thread_id: ThreadId },
    Vote { id: Fullname, dir: i8 },
    Save { id: Fullname },
    Unsave { id: Fullname },
    Delete { id: Fullname },
    Report { id: Fullname },
    Edit { id: Fullname, text: String },
    Reply { parent: Fullname, text: String },
    MoreChildren { link: Fullname, children: Vec<String> },
}

impl RemoteRequest {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FetchThread { .. } => "fetch",
            Self::Vote { .. } => "vote",
            Self::Save { .. } => "save",
            Self::Unsave { .. } => "unsave",
            Self::Delete { .. } => "delete",
            Self::Report { .. } => "report",
            Self::Edit { .. } => "edit",
            Self::Reply { .. } => "reply",
            Self::MoreChildren { .. } => "more_children",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply {
    Ack,
    Thread(ThreadPayload),
    /// Flat or nested things, as returned for replies, edits and expansions.
    Things(Vec<Thing>),
}

/// A failed request, already classified by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub category: ErrorCategory,
    pub retriable: bool,
    pub message: Option<String>,
}

impl RequestFailure {
    pub fn transient(category: ErrorCategory) -> Self {
        Self {
            category,
            retriable: true,
            message: None,
        }
    }

    pub fn terminal(category: ErrorCategory, message: Option<String>) -> Self {
        Self {
            category,
            retriable: false,
            message,
        }
    }

    /// The engine-level error this failure amounts to for a thread fetch.
    pub fn to_fetch_error(&self) -> EngineError {
        if self.retriable {
            EngineError::TransientFetchFailure(self.describe())
        } else {
            EngineError::TerminalFetchFailure {
                category: self.category,
                message: self.message.clone(),
            }
        }
    }

    pub fn describe(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {message}", self.category.label()),
            None => self.category.label().to_string(),
        }
    }
}
