use super::config::Preferences;
use super::context::ThreadId;
use super::context::Ticket;
use super::contracts::RequestFailure;
use super::contracts::ServiceReply;
use super::node::NodeKey;
use super::node::Parent;
use super::vote::VoteDirection;

#[derive(Debug, Clone)]
pub enum ThreadAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    /// Emitted by whatever watches the host page; repeating the live id is harmless.
    Navigate(ThreadId),
    /// The retry button on the error display. Always a full reload.
    Retry,
    Vote {
        node: NodeKey,
        direction: VoteDirection,
    },
    ToggleSave {
        node: NodeKey,
    },
    Reply {
        target: Parent,
        text: String,
    },
    Edit {
        node: NodeKey,
        text: String,
    },
    Delete {
        node: NodeKey,
    },
    Report {
        node: NodeKey,
    },
    ExpandMore {
        node: NodeKey,
    },
    ToggleCollapse {
        node: NodeKey,
    },
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    RequestCompleted {
        ticket: Ticket,
        outcome: Result<ServiceReply, RequestFailure>,
    },
    SetPreferences(Preferences),
}
