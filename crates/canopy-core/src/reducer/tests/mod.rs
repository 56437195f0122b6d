use pretty_assertions::assert_eq;
use serde_json::json;
use serde_json::Value;

pub(super) use super::reduce;
pub(super) use super::ThreadEffect;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::ThreadAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::Preferences;
pub(super) use crate::context::Generation;
pub(super) use crate::context::ThreadId;
pub(super) use crate::context::Ticket;
pub(super) use crate::contracts::RemoteRequest;
pub(super) use crate::contracts::RequestFailure;
pub(super) use crate::contracts::ServiceReply;
pub(super) use crate::error::EngineError;
pub(super) use crate::fullname::Fullname;
pub(super) use crate::node::CommentNode;
pub(super) use crate::node::NodeKey;
pub(super) use crate::node::Parent;
pub(super) use crate::payload::Listing;
pub(super) use crate::payload::Thing;
pub(super) use crate::payload::ThreadPayload;
pub(super) use crate::presentation::ErrorCategory;
pub(super) use crate::presentation::Presentation;
pub(super) use crate::state::ViewState;
pub(super) use crate::vote::VoteDirection;
pub(super) use crate::vote::VoteState;

mod navigation;
mod optimistic_actions;

const THREAD: &str = "abc";

fn state() -> ViewState {
    ViewState::new(Preferences {
        username: Some("viewer".to_string()),
        ..Preferences::default()
    })
}

fn comment(id: &str, author: &str, score: i64, replies: Value) -> Value {
    json!({"kind": "t1", "data": {
        "id": id,
        "name": format!("t1_{id}"),
        "author": author,
        "body": format!("body {id}"),
        "score": score,
        "likes": null,
        "saved": false,
        "parent_id": "t3_abc",
        "created_utc": 1400000000.0,
        "edited": false,
        "replies": replies
    }})
}

fn listing(children: Vec<Value>) -> Value {
    json!({"kind": "Listing", "data": {"children": children}})
}

fn more(id: &str, parent: &str, children: &[&str]) -> Value {
    json!({"kind": "more", "data": {
        "id": id, "parent_id": parent, "count": children.len(), "children": children
    }})
}

fn thread_reply(link_author: &str, comments: Vec<Value>) -> ServiceReply {
    let listings: Vec<Listing> = serde_json::from_value(json!([
        listing(vec![json!({"kind": "t3", "data": {
            "id": THREAD,
            "author": link_author,
            "permalink": "/r/videos/comments/abc/title/",
            "title": "title"
        }})]),
        listing(comments),
    ]))
    .expect("listings parse");
    ServiceReply::Thread(ThreadPayload::from_listings(listings).expect("thread payload"))
}

fn things(value: Value) -> Vec<Thing> {
    serde_json::from_value(value).expect("things parse")
}

fn user(state: &mut ViewState, action: UserAction) -> Vec<ThreadEffect> {
    reduce(state, ThreadAction::User(action))
}

fn complete(
    state: &mut ViewState,
    ticket: Ticket,
    outcome: Result<ServiceReply, RequestFailure>,
) -> Vec<ThreadEffect> {
    reduce(
        state,
        ThreadAction::Runtime(RuntimeAction::RequestCompleted { ticket, outcome }),
    )
}

fn navigate(state: &mut ViewState, thread: &str) -> Vec<ThreadEffect> {
    user(state, UserAction::Navigate(ThreadId::new(thread)))
}

fn remote_requests(effects: &[ThreadEffect]) -> Vec<(Ticket, RemoteRequest)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            ThreadEffect::Remote { ticket, request } => Some((*ticket, request.clone())),
            ThreadEffect::RequestFrame => None,
        })
        .collect()
}

fn single_remote(effects: &[ThreadEffect]) -> (Ticket, RemoteRequest) {
    let mut requests = remote_requests(effects);
    assert_eq!(requests.len(), 1, "expected exactly one remote request");
    requests.remove(0)
}

/// A thread by `op` with the given comments, fully loaded for the viewer `viewer`.
fn loaded(comments: Vec<Value>) -> ViewState {
    let mut state = state();
    let effects = navigate(&mut state, THREAD);
    let (ticket, _) = single_remote(&effects);
    complete(&mut state, ticket, Ok(thread_reply("op", comments)));
    assert_eq!(state.presentation(), Some(Presentation::Complete));
    state
}

fn key(state: &ViewState, id: &str) -> NodeKey {
    state
        .tree
        .as_ref()
        .and_then(|tree| tree.find_by_id(id))
        .unwrap_or_else(|| panic!("comment {id} is in the tree"))
}

fn node<'a>(state: &'a ViewState, id: &str) -> &'a CommentNode {
    let key = key(state, id);
    state
        .tree
        .as_ref()
        .and_then(|tree| tree.comment(key))
        .unwrap_or_else(|| panic!("{id} is a comment"))
}

fn child_ids(state: &ViewState, parent: Parent) -> Vec<String> {
    let tree = state.tree.as_ref().expect("tree is loaded");
    tree.children_of(parent)
        .iter()
        .map(|key| match tree.get(*key) {
            Some(item) => match item.as_comment() {
                Some(comment) => comment.id.clone(),
                None => "more".to_string(),
            },
            None => "gone".to_string(),
        })
        .collect()
}

fn rejected(category: ErrorCategory) -> RequestFailure {
    RequestFailure::terminal(category, Some("rejected".to_string()))
}
