use std::collections::VecDeque;

use canopy_core::reduce;
use canopy_core::MoreChildrenResponse;
use canopy_core::RemoteRequest;
use canopy_core::RequestFailure;
use canopy_core::RuntimeAction;
use canopy_core::ServiceReply;
use canopy_core::ThreadAction;
use canopy_core::ThreadEffect;
use canopy_core::ThreadPayload;
use canopy_core::Ticket;
use canopy_core::ViewState;

use crate::classify::classify;
use crate::classify::classify_malformed;
use crate::endpoints::HttpRequest;
use crate::service::CommentService;

/// Runs the engine's remote effects against a [`CommentService`].
pub struct Dispatcher<S> {
    service: S,
    user_hash: Option<String>,
}

impl<S: CommentService> Dispatcher<S> {
    pub fn new(service: S, user_hash: Option<String>) -> Self {
        Self { service, user_hash }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Sends one request and turns the answer into the completion the reducer expects.
    pub fn dispatch(&mut self, ticket: Ticket, request: &RemoteRequest) -> RuntimeAction {
        let http = HttpRequest::for_request(request, self.user_hash.as_deref());
        let outcome = match self.service.send(&http) {
            Ok(body) => decode(request, &body),
            Err(err) => {
                log::warn!("{} request via {} failed: {err}", request.label(), self.service.name());
                Err(classify(&err))
            }
        };
        RuntimeAction::RequestCompleted { ticket, outcome }
    }

    /// Feeds `effects` back through the reducer until no remote work is left. Returns how
    /// many frames were requested along the way.
    pub fn drain(&mut self, state: &mut ViewState, effects: Vec<ThreadEffect>) -> usize {
        let mut queue: VecDeque<ThreadEffect> = effects.into();
        let mut frames = 0;
        while let Some(effect) = queue.pop_front() {
            match effect {
                ThreadEffect::RequestFrame => frames += 1,
                ThreadEffect::Remote { ticket, request } => {
                    let completion = self.dispatch(ticket, &request);
                    queue.extend(reduce(state, ThreadAction::Runtime(completion)));
                }
            }
        }
        frames
    }
}

fn decode(request: &RemoteRequest, body: &str) -> Result<ServiceReply, RequestFailure> {
    let decoded = match request {
        RemoteRequest::FetchThread { .. } => ThreadPayload::from_json(body).map(ServiceReply::Thread),
        RemoteRequest::Reply { .. }
        | RemoteRequest::Edit { .. }
        | RemoteRequest::MoreChildren { .. } => {
            MoreChildrenResponse::from_json(body).map(ServiceReply::Things)
        }
        RemoteRequest::Vote { .. }
        | RemoteRequest::Save { .. }
        | RemoteRequest::Unsave { .. }
        | RemoteRequest::Delete { .. }
        | RemoteRequest::Report { .. } => Ok(ServiceReply::Ack),
    };
    decoded.map_err(|err| {
        log::warn!("{} answer could not be decoded: {err}", request.label());
        classify_malformed(&err)
    })
}

#[cfg(test)]
mod tests {
    use canopy_core::ErrorCategory;
    use canopy_core::Preferences;
    use canopy_core::Presentation;
    use canopy_core::ThreadId;
    use canopy_core::UserAction;
    use canopy_core::VoteDirection;
    use canopy_core::VoteState;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::RemoteError;
    use crate::service::ScriptedCommentService;

    fn thread_body() -> String {
        json!([
            {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {
                "id": "abc", "author": "op", "permalink": "/r/videos/comments/abc/title/", "title": "title"
            }}]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {
                    "id": "c1", "name": "t1_c1", "author": "op", "body": "hi", "score": 5,
                    "likes": null, "parent_id": "t3_abc", "created_utc": 1400000000.0, "replies": ""
                }},
                {"kind": "more", "data": {"id": "m", "parent_id": "t3_abc", "count": 1, "children": ["c9"]}}
            ]}}
        ])
        .to_string()
    }

    fn open(dispatcher: &mut Dispatcher<ScriptedCommentService>) -> ViewState {
        let mut state = ViewState::new(Preferences::default());
        let effects = reduce(
            &mut state,
            ThreadAction::User(UserAction::Navigate(ThreadId::new("abc"))),
        );
        dispatcher.drain(&mut state, effects);
        state
    }

    #[test]
    fn overloaded_fetches_are_retried_until_they_succeed() {
        let mut service = ScriptedCommentService::new();
        service
            .script("abc", Err(RemoteError::status(503)))
            .script("abc", Err(RemoteError::Connection("reset".to_string())))
            .script("abc", Ok(thread_body()));
        let mut dispatcher = Dispatcher::new(service, None);

        let state = open(&mut dispatcher);

        assert_eq!(state.presentation(), Some(Presentation::Complete));
        assert_eq!(dispatcher.service().sent().len(), 3);
    }

    #[test]
    fn a_missing_thread_is_not_retried() {
        let mut service = ScriptedCommentService::new();
        service.script("abc", Err(RemoteError::status(404)));
        let mut dispatcher = Dispatcher::new(service, None);

        let state = open(&mut dispatcher);

        assert_eq!(
            state.presentation(),
            Some(Presentation::Error {
                category: ErrorCategory::NotFound,
                message: None,
            })
        );
        assert_eq!(dispatcher.service().sent().len(), 1);
    }

    #[test]
    fn garbage_bodies_show_a_generic_error() {
        let mut service = ScriptedCommentService::new();
        service.script("abc", Ok("<html>".to_string()));
        let mut dispatcher = Dispatcher::new(service, None);

        let state = open(&mut dispatcher);

        assert!(matches!(
            state.presentation(),
            Some(Presentation::Error {
                category: ErrorCategory::GenericError,
                message: Some(_),
            })
        ));
    }

    #[test]
    fn a_rejected_vote_is_rolled_back_through_the_dispatcher() {
        let mut service = ScriptedCommentService::new();
        service
            .script("abc", Ok(thread_body()))
            .script("vote", Err(RemoteError::status(500)));
        let mut dispatcher = Dispatcher::new(service, Some("hash".to_string()));
        let mut state = open(&mut dispatcher);
        let c1 = state
            .tree
            .as_ref()
            .and_then(|tree| tree.find_by_id("c1"))
            .expect("c1");

        let effects = reduce(
            &mut state,
            ThreadAction::User(UserAction::Vote {
                node: c1,
                direction: VoteDirection::Up,
            }),
        );
        dispatcher.drain(&mut state, effects);

        let node = state
            .tree
            .as_ref()
            .and_then(|tree| tree.comment(c1))
            .expect("c1 still present");
        assert_eq!((node.vote_state(), node.score()), (VoteState::Neutral, 5));
        let vote = dispatcher.service().sent().last().cloned().expect("vote sent");
        assert_eq!(vote.field("uh"), Some("hash"));
        assert_eq!(vote.field("dir"), Some("1"));
    }

    #[test]
    fn expansions_are_decoded_from_the_envelope() {
        let mut service = ScriptedCommentService::new();
        service.script("abc", Ok(thread_body())).script(
            "morechildren",
            Ok(json!({"json": {"errors": [], "data": {"things": [
                {"kind": "t1", "data": {
                    "id": "c9", "name": "t1_c9", "author": "x", "body": "late",
                    "parent_id": "t3_abc", "created_utc": 1400000000.0
                }}
            ]}}})
            .to_string()),
        );
        let mut dispatcher = Dispatcher::new(service, None);
        let mut state = open(&mut dispatcher);
        let placeholder = state
            .tree
            .as_ref()
            .map(|tree| tree.roots()[1])
            .expect("placeholder root");

        let effects = reduce(
            &mut state,
            ThreadAction::User(UserAction::ExpandMore { node: placeholder }),
        );
        dispatcher.drain(&mut state, effects);

        let tree = state.tree.as_ref().expect("tree");
        assert!(tree.find_by_id("c9").is_some());
        assert_eq!(tree.roots().len(), 2);
        assert!(tree.placeholder(placeholder).is_none());
    }
}
