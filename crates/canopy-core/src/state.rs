use std::collections::HashMap;

use super::config::Preferences;
use super::context::Generation;
use super::context::RequestId;
use super::context::ThreadContext;
use super::context::ThreadId;
use super::context::Ticket;
use super::error::EngineError;
use super::loading::LoadingState;
use super::loading::LoadingStateMachine;
use super::node::NodeKey;
use super::node::Parent;
use super::presentation::Presentation;
use super::tree::CommentTree;
use super::vote::VoteTransition;

/// What an outstanding request was for, so its completion can be applied or undone.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingKind {
    Fetch,
    Vote {
        node: NodeKey,
        transition: VoteTransition,
    },
    Save {
        node: NodeKey,
        previous: bool,
    },
    Delete {
        node: NodeKey,
    },
    Report {
        node: NodeKey,
    },
    Edit {
        node: NodeKey,
        text: String,
    },
    Reply {
        target: Parent,
    },
    Expand {
        node: NodeKey,
    },
}

impl PendingKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Vote { .. } => "vote",
            Self::Save { .. } => "save",
            Self::Delete { .. } => "delete",
            Self::Report { .. } => "report",
            Self::Edit { .. } => "edit",
            Self::Reply { .. } => "reply",
            Self::Expand { .. } => "expand",
        }
    }
}

/// Requests issued for the live thread and not yet completed.
#[derive(Debug, Clone, Default)]
pub struct PendingLedger {
    requests: HashMap<RequestId, PendingKind>,
    latest_vote: HashMap<NodeKey, RequestId>,
    latest_save: HashMap<NodeKey, RequestId>,
}

impl PendingLedger {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn get(&self, request_id: RequestId) -> Option<&PendingKind> {
        self.requests.get(&request_id)
    }

    pub(crate) fn insert(&mut self, request_id: RequestId, kind: PendingKind) {
        match &kind {
            PendingKind::Vote { node, .. } => {
                self.latest_vote.insert(*node, request_id);
            }
            PendingKind::Save { node, .. } => {
                self.latest_save.insert(*node, request_id);
            }
            _ => {}
        }
        self.requests.insert(request_id, kind);
    }

    /// Removes the request and reports whether it was still the newest one of its kind
    /// for its node. Non vote/save requests are always "latest".
    pub(crate) fn take(&mut self, request_id: RequestId) -> Option<(PendingKind, bool)> {
        let kind = self.requests.remove(&request_id)?;
        let latest = match &kind {
            PendingKind::Vote { node, .. } => take_if_latest(&mut self.latest_vote, *node, request_id),
            PendingKind::Save { node, .. } => take_if_latest(&mut self.latest_save, *node, request_id),
            _ => true,
        };
        Some((kind, latest))
    }

    pub(crate) fn clear(&mut self) {
        self.requests.clear();
        self.latest_vote.clear();
        self.latest_save.clear();
    }
}

fn take_if_latest(
    latest: &mut HashMap<NodeKey, RequestId>,
    node: NodeKey,
    request_id: RequestId,
) -> bool {
    if latest.get(&node) == Some(&request_id) {
        latest.remove(&node);
        true
    } else {
        false
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub preferences: Preferences,
    pub context: Option<ThreadContext>,
    pub loading: Option<LoadingStateMachine>,
    pub tree: Option<CommentTree>,
    pub pending: PendingLedger,
    /// Most recent action request that failed after its local effect was applied.
    pub last_action_error: Option<EngineError>,
    /// Latest failure of the thread fetch itself, cleared once the thread loads.
    pub last_fetch_error: Option<EngineError>,
    generation: Generation,
    next_request_id: u64,
}

impl ViewState {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            context: None,
            loading: None,
            tree: None,
            pending: PendingLedger::default(),
            last_action_error: None,
            last_fetch_error: None,
            generation: Generation::default(),
            next_request_id: 1,
        }
    }

    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.context.as_ref().map(|context| &context.thread_id)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn presentation(&self) -> Option<Presentation> {
        self.loading.as_ref().map(LoadingStateMachine::presentation)
    }

    pub fn is_showing_error(&self) -> bool {
        matches!(
            self.loading.as_ref().map(LoadingStateMachine::state),
            Some(LoadingState::Error { .. })
        )
    }

    /// Drops every trace of the previous thread and opens a new generation for `thread_id`.
    pub(crate) fn begin_thread(&mut self, thread_id: ThreadId) -> ThreadContext {
        self.generation = self.generation.next();
        let context = ThreadContext {
            thread_id,
            generation: self.generation,
        };
        self.context = Some(context.clone());
        self.loading = Some(LoadingStateMachine::new());
        self.tree = None;
        self.pending.clear();
        self.last_action_error = None;
        self.last_fetch_error = None;
        context
    }

    pub(crate) fn issue(&mut self, kind: PendingKind) -> Ticket {
        let request_id = RequestId(self.next_request_id);
        self.next_request_id = self.next_request_id.saturating_add(1);
        self.pending.insert(request_id, kind);
        Ticket {
            generation: self.generation,
            request_id,
        }
    }
}
