use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn vote(state: &mut ViewState, id: &str, direction: VoteDirection) -> (Ticket, RemoteRequest) {
    let node = key(state, id);
    single_remote(&user(state, UserAction::Vote { node, direction }))
}

fn toggle_save(state: &mut ViewState, id: &str) -> (Ticket, RemoteRequest) {
    let node = key(state, id);
    single_remote(&user(state, UserAction::ToggleSave { node }))
}

#[test]
fn upvoting_the_original_posters_comment() {
    let mut state = loaded(vec![json!({"kind": "t1", "data": {
        "id": "c1", "author": "op", "body": "hi", "score": 5, "likes": null
    }})]);
    let before = node(&state, "c1");
    assert_eq!(
        (before.vote_state(), before.score(), before.is_author_original_poster),
        (VoteState::Neutral, 5, true)
    );

    let (_, request) = vote(&mut state, "c1", VoteDirection::Up);

    let after = node(&state, "c1");
    assert_eq!((after.vote_state(), after.score()), (VoteState::Upvoted, 6));
    assert_eq!(
        request,
        RemoteRequest::Vote {
            id: Fullname::comment("c1"),
            dir: 1,
        }
    );
}

#[test]
fn every_vote_is_sent_with_the_resulting_direction() {
    let mut state = loaded(vec![comment("c1", "x", 10, json!(""))]);
    let dirs: Vec<i8> = [VoteDirection::Up, VoteDirection::Down, VoteDirection::Down]
        .into_iter()
        .map(|direction| match vote(&mut state, "c1", direction).1 {
            RemoteRequest::Vote { dir, .. } => dir,
            other => panic!("expected a vote request, got {other:?}"),
        })
        .collect();

    assert_eq!(dirs, vec![1, -1, 0]);
    let after = node(&state, "c1");
    assert_eq!((after.vote_state(), after.score()), (VoteState::Neutral, 10));
    assert_eq!(state.pending.len(), 3);
}

#[test]
fn a_failed_vote_rolls_back_score_and_arrow() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let (ticket, _) = vote(&mut state, "c1", VoteDirection::Down);
    assert_eq!(node(&state, "c1").score(), 4);

    let effects = complete(&mut state, ticket, Err(rejected(ErrorCategory::GenericError)));

    assert_eq!(effects, vec![ThreadEffect::RequestFrame]);
    let after = node(&state, "c1");
    assert_eq!((after.vote_state(), after.score()), (VoteState::Neutral, 5));
    assert!(matches!(
        state.last_action_error,
        Some(EngineError::ActionRequestFailure { action: "vote", .. })
    ));
}

#[test]
fn a_superseded_vote_failure_keeps_the_newer_vote() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let (first, _) = vote(&mut state, "c1", VoteDirection::Up);
    let (second, _) = vote(&mut state, "c1", VoteDirection::Down);
    assert_eq!(node(&state, "c1").score(), 4);

    let effects = complete(&mut state, first, Err(rejected(ErrorCategory::Overload)));
    assert!(effects.is_empty());
    let after = node(&state, "c1");
    assert_eq!((after.vote_state(), after.score()), (VoteState::Downvoted, 4));

    complete(&mut state, second, Ok(ServiceReply::Ack));
    assert_eq!(node(&state, "c1").score(), 4);
    assert!(state.pending.is_empty());
}

#[test]
fn a_successful_vote_changes_nothing_further() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let (ticket, _) = vote(&mut state, "c1", VoteDirection::Up);
    let effects = complete(&mut state, ticket, Ok(ServiceReply::Ack));
    assert!(effects.is_empty());
    assert_eq!(node(&state, "c1").score(), 6);
}

#[test]
fn saving_flips_the_flag_before_the_request_returns() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);

    let (_, request) = toggle_save(&mut state, "c1");
    assert!(node(&state, "c1").saved);
    assert_eq!(
        request,
        RemoteRequest::Save {
            id: Fullname::comment("c1")
        }
    );

    let (_, request) = toggle_save(&mut state, "c1");
    assert!(!node(&state, "c1").saved);
    assert_eq!(
        request,
        RemoteRequest::Unsave {
            id: Fullname::comment("c1")
        }
    );
}

#[test]
fn a_failed_save_restores_the_previous_flag() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let (ticket, _) = toggle_save(&mut state, "c1");

    complete(&mut state, ticket, Err(RequestFailure::transient(ErrorCategory::ConnectionError)));

    assert!(!node(&state, "c1").saved);
}

#[test]
fn a_superseded_save_failure_is_ignored() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let (save, _) = toggle_save(&mut state, "c1");
    let (unsave, _) = toggle_save(&mut state, "c1");

    complete(&mut state, save, Err(rejected(ErrorCategory::GenericError)));
    assert!(!node(&state, "c1").saved);
    assert_eq!(state.last_action_error, None);

    complete(&mut state, unsave, Err(rejected(ErrorCategory::GenericError)));
    assert!(node(&state, "c1").saved);
}
