#[derive(Debug, Clone, PartialEq)]
pub enum ThreadEffect {
    /// Send `request` to the comment service and feed the outcome back as
    /// [`RuntimeAction::RequestCompleted`] carrying the same ticket.
    Remote {
        ticket: Ticket,
        request: RemoteRequest,
    },
    RequestFrame,
}

use chrono::Utc;

use super::actions::RuntimeAction;
use super::actions::ThreadAction;
use super::actions::UserAction;
use super::config::Preferences;
use super::context::ThreadId;
use super::context::Ticket;
use super::contracts::RemoteRequest;
use super::contracts::RequestFailure;
use super::contracts::ServiceReply;
use super::error::EngineError;
use super::loading::LoadingStep;
use super::node::utc_from_epoch;
use super::node::NodeKey;
use super::node::Parent;
use super::payload::nest_flat;
use super::payload::Edited;
use super::payload::Thing;
use super::payload::ThreadPayload;
use super::presentation::ErrorCategory;
use super::state::PendingKind;
use super::state::ViewState;
use super::tree::BuildContext;
use super::tree::CommentTree;
use super::tree::ThreadInfo;
use super::vote::VoteDirection;
use super::vote::VoteTransition;

pub fn reduce(state: &mut ViewState, action: ThreadAction) -> Vec<ThreadEffect> {
    match action {
        ThreadAction::User(user) => reduce_user(state, user),
        ThreadAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut ViewState, action: UserAction) -> Vec<ThreadEffect> {
    match action {
        UserAction::Navigate(thread_id) => {
            if state.thread_id() == Some(&thread_id) {
                return Vec::new();
            }
            begin_load(state, thread_id)
        }
        UserAction::Retry => match state.thread_id().cloned() {
            Some(thread_id) => begin_load(state, thread_id),
            None => Vec::new(),
        },
        UserAction::Vote { node, direction } => vote(state, node, direction),
        UserAction::ToggleSave { node } => toggle_save(state, node),
        UserAction::Reply { target, text } => reply(state, target, text),
        UserAction::Edit { node, text } => {
            let Some(comment) = state.tree.as_ref().and_then(|tree| tree.comment(node)) else {
                return ignore("edit", node);
            };
            if !comment.affordances().edit {
                log::warn!("refusing to edit comment {} owned by someone else", comment.id);
                return Vec::new();
            }
            let id = comment.fullname.clone();
            let ticket = state.issue(PendingKind::Edit {
                node,
                text: text.clone(),
            });
            vec![ThreadEffect::Remote {
                ticket,
                request: RemoteRequest::Edit { id, text },
            }]
        }
        UserAction::Delete { node } => {
            let Some(comment) = state.tree.as_ref().and_then(|tree| tree.comment(node)) else {
                return ignore("delete", node);
            };
            if !comment.affordances().delete {
                log::warn!("refusing to delete comment {} owned by someone else", comment.id);
                return Vec::new();
            }
            let id = comment.fullname.clone();
            let ticket = state.issue(PendingKind::Delete { node });
            vec![ThreadEffect::Remote {
                ticket,
                request: RemoteRequest::Delete { id },
            }]
        }
        UserAction::Report { node } => {
            let Some(comment) = state.tree.as_ref().and_then(|tree| tree.comment(node)) else {
                return ignore("report", node);
            };
            if !comment.affordances().report {
                log::warn!("refusing to report own comment {}", comment.id);
                return Vec::new();
            }
            let id = comment.fullname.clone();
            let ticket = state.issue(PendingKind::Report { node });
            vec![ThreadEffect::Remote {
                ticket,
                request: RemoteRequest::Report { id },
            }]
        }
        UserAction::ExpandMore { node } => expand_more(state, node),
        UserAction::ToggleCollapse { node } => {
            let Some(comment) = state.tree.as_mut().and_then(|tree| tree.comment_mut(node)) else {
                return ignore("collapse", node);
            };
            comment.collapsed = !comment.collapsed;
            vec![ThreadEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut ViewState, action: RuntimeAction) -> Vec<ThreadEffect> {
    match action {
        RuntimeAction::SetPreferences(preferences) => {
            state.preferences = preferences;
            vec![ThreadEffect::RequestFrame]
        }
        RuntimeAction::RequestCompleted { ticket, outcome } => {
            let admitted = state
                .context
                .as_ref()
                .is_some_and(|context| context.admits(ticket));
            if !admitted {
                log::debug!(
                    "dropping completion for request {} from generation {}",
                    ticket.request_id.0,
                    ticket.generation.0
                );
                return Vec::new();
            }
            let Some((kind, latest)) = state.pending.take(ticket.request_id) else {
                log::debug!("dropping completion for unknown request {}", ticket.request_id.0);
                return Vec::new();
            };
            complete_request(state, ticket, kind, latest, outcome)
        }
    }
}

fn begin_load(state: &mut ViewState, thread_id: ThreadId) -> Vec<ThreadEffect> {
    let context = state.begin_thread(thread_id);
    log::info!(
        "loading thread {} (generation {})",
        context.thread_id,
        context.generation.0
    );
    let ticket = state.issue(PendingKind::Fetch);
    vec![
        ThreadEffect::Remote {
            ticket,
            request: RemoteRequest::FetchThread {
                thread_id: context.thread_id,
            },
        },
        ThreadEffect::RequestFrame,
    ]
}

fn vote(state: &mut ViewState, node: NodeKey, direction: VoteDirection) -> Vec<ThreadEffect> {
    let Some(comment) = state.tree.as_mut().and_then(|tree| tree.comment_mut(node)) else {
        return ignore("vote", node);
    };
    let transition = comment.apply_vote(direction);
    let id = comment.fullname.clone();
    let ticket = state.issue(PendingKind::Vote { node, transition });
    vec![
        ThreadEffect::Remote {
            ticket,
            request: RemoteRequest::Vote {
                id,
                dir: transition.next.remote_dir(),
            },
        },
        ThreadEffect::RequestFrame,
    ]
}

fn toggle_save(state: &mut ViewState, node: NodeKey) -> Vec<ThreadEffect> {
    let Some(comment) = state.tree.as_mut().and_then(|tree| tree.comment_mut(node)) else {
        return ignore("save", node);
    };
    let previous = comment.saved;
    let saved = comment.toggle_saved();
    let id = comment.fullname.clone();
    let ticket = state.issue(PendingKind::Save { node, previous });
    let request = if saved {
        RemoteRequest::Save { id }
    } else {
        RemoteRequest::Unsave { id }
    };
    vec![
        ThreadEffect::Remote { ticket, request },
        ThreadEffect::RequestFrame,
    ]
}

fn reply(state: &mut ViewState, target: Parent, text: String) -> Vec<ThreadEffect> {
    let Some(tree) = state.tree.as_ref() else {
        log::debug!("ignoring reply: no thread is loaded");
        return Vec::new();
    };
    let parent = match target {
        Parent::Root => tree.thread().fullname(),
        Parent::Node(key) => match tree.comment(key) {
            Some(comment) => comment.fullname.clone(),
            None => return ignore("reply", key),
        },
    };
    let ticket = state.issue(PendingKind::Reply { target });
    vec![ThreadEffect::Remote {
        ticket,
        request: RemoteRequest::Reply { parent, text },
    }]
}

fn expand_more(state: &mut ViewState, node: NodeKey) -> Vec<ThreadEffect> {
    let Some(tree) = state.tree.as_ref() else {
        return ignore("expand", node);
    };
    let link = tree.thread().fullname();
    let Some(placeholder) = tree.placeholder(node) else {
        return ignore("expand", node);
    };
    if placeholder.is_in_flight() {
        log::debug!("placeholder is already being expanded");
        return Vec::new();
    }
    if placeholder.remaining_child_ids.is_empty() {
        log::info!(
            "placeholder under {} has no child ids to fetch",
            placeholder.parent_identifier
        );
        return Vec::new();
    }
    let children = placeholder.remaining_child_ids.clone();
    let ticket = state.issue(PendingKind::Expand { node });
    if let Some(placeholder) = state.tree.as_mut().and_then(|tree| tree.placeholder_mut(node)) {
        placeholder.in_flight = Some(ticket.request_id);
    }
    vec![
        ThreadEffect::Remote {
            ticket,
            request: RemoteRequest::MoreChildren { link, children },
        },
        ThreadEffect::RequestFrame,
    ]
}

fn complete_request(
    state: &mut ViewState,
    ticket: Ticket,
    kind: PendingKind,
    latest: bool,
    outcome: Result<ServiceReply, RequestFailure>,
) -> Vec<ThreadEffect> {
    match kind {
        PendingKind::Fetch => complete_fetch(state, ticket, outcome),
        PendingKind::Vote { node, transition } => match outcome {
            Ok(_) => Vec::new(),
            Err(failure) => rollback_vote(state, node, transition, latest, failure),
        },
        PendingKind::Save { node, previous } => match outcome {
            Ok(_) => Vec::new(),
            Err(failure) => rollback_save(state, node, previous, latest, failure),
        },
        PendingKind::Delete { node } => match outcome {
            Ok(_) => {
                let removed = state
                    .tree
                    .as_mut()
                    .is_some_and(|tree| tree.remove_node(node));
                if removed {
                    vec![ThreadEffect::RequestFrame]
                } else {
                    Vec::new()
                }
            }
            Err(failure) => record_failure(state, "delete", node, failure.describe()),
        },
        PendingKind::Report { node } => match outcome {
            Ok(_) => Vec::new(),
            Err(failure) => record_failure(state, "report", node, failure.describe()),
        },
        PendingKind::Edit { node, text } => match outcome {
            Ok(reply) => apply_edit(state, node, text, reply),
            Err(failure) => record_failure(state, "edit", node, failure.describe()),
        },
        PendingKind::Reply { target } => match outcome {
            Ok(reply) => apply_reply(state, target, reply),
            Err(failure) => {
                state.last_action_error = Some(EngineError::ActionRequestFailure {
                    action: "reply",
                    target: target_label(state, target),
                    reason: failure.describe(),
                });
                vec![ThreadEffect::RequestFrame]
            }
        },
        PendingKind::Expand { node } => complete_expand(state, node, outcome),
    }
}

fn complete_fetch(
    state: &mut ViewState,
    ticket: Ticket,
    outcome: Result<ServiceReply, RequestFailure>,
) -> Vec<ThreadEffect> {
    let Some(context) = state.context.clone() else {
        return Vec::new();
    };
    let Some(loading) = state.loading.as_mut() else {
        return Vec::new();
    };

    let transition = match outcome {
        Ok(ServiceReply::Thread(payload)) => match build_tree(&state.preferences, ticket, payload) {
            Ok(tree) => {
                let result = loading.complete();
                if result.is_ok() {
                    state.tree = Some(tree);
                    state.last_fetch_error = None;
                }
                result
            }
            Err(err) => {
                log::warn!("thread {} could not be built: {err}", context.thread_id);
                let message = err.to_string();
                state.last_fetch_error = Some(err);
                loading.fail_terminal(ErrorCategory::GenericError, Some(message))
            }
        },
        Ok(other) => {
            log::warn!("thread fetch answered with {other:?}");
            let message = "unexpected reply to a thread fetch".to_string();
            state.last_fetch_error = Some(EngineError::TerminalFetchFailure {
                category: ErrorCategory::GenericError,
                message: Some(message.clone()),
            });
            loading.fail_terminal(ErrorCategory::GenericError, Some(message))
        }
        Err(failure) if failure.retriable => {
            state.last_fetch_error = Some(failure.to_fetch_error());
            match loading.fail_transient(failure.category, failure.message) {
                Ok(LoadingStep::Refetch { .. }) => {
                    let ticket = state.issue(PendingKind::Fetch);
                    return vec![
                        ThreadEffect::Remote {
                            ticket,
                            request: RemoteRequest::FetchThread {
                                thread_id: context.thread_id,
                            },
                        },
                        ThreadEffect::RequestFrame,
                    ];
                }
                Ok(LoadingStep::GaveUp) => Ok(()),
                Err(err) => Err(err),
            }
        }
        Err(failure) => {
            state.last_fetch_error = Some(failure.to_fetch_error());
            loading.fail_terminal(failure.category, failure.message)
        }
    };

    match transition {
        Ok(()) => vec![ThreadEffect::RequestFrame],
        Err(err) => {
            log::warn!("ignoring fetch completion: {err}");
            Vec::new()
        }
    }
}

fn build_tree(
    preferences: &Preferences,
    ticket: Ticket,
    payload: ThreadPayload,
) -> Result<CommentTree, EngineError> {
    let thread = ThreadInfo::from_link(&payload.link)?;
    CommentTree::build(
        BuildContext {
            generation: ticket.generation,
            thread,
            viewer: preferences.username.clone(),
            hidden_score_threshold: preferences.hidden_comment_score_threshold,
        },
        payload.comments,
    )
}

fn rollback_vote(
    state: &mut ViewState,
    node: NodeKey,
    transition: VoteTransition,
    latest: bool,
    failure: RequestFailure,
) -> Vec<ThreadEffect> {
    if !latest {
        log::debug!("superseded vote failed ({}), keeping newer state", failure.describe());
        return Vec::new();
    }
    let reverted = state
        .tree
        .as_mut()
        .and_then(|tree| tree.comment_mut(node))
        .is_some_and(|comment| comment.revert_vote(transition));
    if reverted {
        log::info!("vote failed ({}), rolled back", failure.describe());
    }
    record_failure(state, "vote", node, failure.describe())
}

fn rollback_save(
    state: &mut ViewState,
    node: NodeKey,
    previous: bool,
    latest: bool,
    failure: RequestFailure,
) -> Vec<ThreadEffect> {
    if !latest {
        log::debug!("superseded save failed ({}), keeping newer state", failure.describe());
        return Vec::new();
    }
    if let Some(comment) = state.tree.as_mut().and_then(|tree| tree.comment_mut(node)) {
        comment.saved = previous;
        log::info!("save failed ({}), rolled back", failure.describe());
    }
    record_failure(state, "save", node, failure.describe())
}

fn apply_edit(
    state: &mut ViewState,
    node: NodeKey,
    text: String,
    reply: ServiceReply,
) -> Vec<ThreadEffect> {
    let returned = match reply {
        ServiceReply::Things(things) => things.into_iter().find_map(|thing| match thing {
            Thing::Comment(record) => Some(record),
            _ => None,
        }),
        ServiceReply::Ack | ServiceReply::Thread(_) => None,
    };
    let (body, edited_at) = match returned {
        Some(record) => {
            let edited_at = match record.edited {
                Edited::At(seconds) => utc_from_epoch(seconds),
                Edited::Flag(_) => Utc::now(),
            };
            (record.body.unwrap_or(text), edited_at)
        }
        None => (text, Utc::now()),
    };
    let Some(comment) = state.tree.as_mut().and_then(|tree| tree.comment_mut(node)) else {
        return Vec::new();
    };
    comment.replace_body(body, edited_at);
    vec![ThreadEffect::RequestFrame]
}

fn apply_reply(state: &mut ViewState, target: Parent, reply: ServiceReply) -> Vec<ThreadEffect> {
    let posted = match reply {
        ServiceReply::Things(things) => things
            .into_iter()
            .find(|thing| matches!(thing, Thing::Comment(_))),
        ServiceReply::Ack | ServiceReply::Thread(_) => None,
    };
    let Some(thing) = posted else {
        let reason = "reply was accepted but no comment came back".to_string();
        state.last_action_error = Some(EngineError::ActionRequestFailure {
            action: "reply",
            target: target_label(state, target),
            reason,
        });
        return vec![ThreadEffect::RequestFrame];
    };
    let Some(tree) = state.tree.as_mut() else {
        return Vec::new();
    };
    match tree.insert_reply(target, thing) {
        Ok(_) => vec![ThreadEffect::RequestFrame],
        Err(err) => {
            log::warn!("posted reply could not be inserted: {err}");
            state.last_action_error = Some(err);
            vec![ThreadEffect::RequestFrame]
        }
    }
}

fn complete_expand(
    state: &mut ViewState,
    node: NodeKey,
    outcome: Result<ServiceReply, RequestFailure>,
) -> Vec<ThreadEffect> {
    let Some(tree) = state.tree.as_mut() else {
        return Vec::new();
    };
    let Some(placeholder) = tree.placeholder_mut(node) else {
        return ignore("expand", node);
    };
    placeholder.in_flight = None;
    let requested = placeholder.remaining_child_ids.clone();
    let things = match outcome {
        Ok(ServiceReply::Things(things)) => things,
        Ok(ServiceReply::Thread(payload)) => payload.comments,
        Ok(ServiceReply::Ack) => {
            let reason = "expansion answered without any comments".to_string();
            return record_failure(state, "expand", node, reason);
        }
        Err(failure) => return record_failure(state, "expand", node, failure.describe()),
    };
    if !answers_any(&things, &requested) {
        let reason = format!("none of {} requested comments came back", requested.len());
        return record_failure(state, "expand", node, reason);
    }
    match tree.expand_placeholder(node, nest_flat(things)) {
        Ok(inserted) => {
            log::debug!("expanded placeholder into {} nodes", inserted.len());
            vec![ThreadEffect::RequestFrame]
        }
        Err(err) => {
            log::warn!("placeholder expansion rejected: {err}");
            state.last_action_error = Some(err);
            vec![ThreadEffect::RequestFrame]
        }
    }
}

/// True if any thing, at any depth, is one of the `requested` comments.
fn answers_any(things: &[Thing], requested: &[String]) -> bool {
    things.iter().any(|thing| match thing {
        Thing::Comment(record) => {
            record
                .id
                .as_ref()
                .is_some_and(|id| requested.contains(id))
                || answers_any(&record.replies, requested)
        }
        Thing::More(_) | Thing::Link(_) => false,
    })
}

fn record_failure(
    state: &mut ViewState,
    action: &'static str,
    node: NodeKey,
    reason: String,
) -> Vec<ThreadEffect> {
    let target = target_label(state, Parent::Node(node));
    log::warn!("{action} request for {target} failed: {reason}");
    state.last_action_error = Some(EngineError::ActionRequestFailure {
        action,
        target,
        reason,
    });
    vec![ThreadEffect::RequestFrame]
}

fn target_label(state: &ViewState, target: Parent) -> String {
    let Some(tree) = state.tree.as_ref() else {
        return String::new();
    };
    match target {
        Parent::Root => tree.thread().fullname().to_string(),
        Parent::Node(key) => match tree.get(key) {
            Some(item) => match item.as_comment() {
                Some(comment) => comment.fullname.to_string(),
                None => item
                    .as_placeholder()
                    .map(|placeholder| placeholder.parent_identifier.clone())
                    .unwrap_or_default(),
            },
            None => String::new(),
        },
    }
}

fn ignore(action: &str, node: NodeKey) -> Vec<ThreadEffect> {
    log::debug!(
        "ignoring {action}: node is not live (generation {})",
        node.generation().0
    );
    Vec::new()
}

#[cfg(test)]
mod tests;
