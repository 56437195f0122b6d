use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn navigate_issues_a_fetch_and_shows_loading() {
    let mut state = state();
    let effects = navigate(&mut state, THREAD);

    let (ticket, request) = single_remote(&effects);
    assert_eq!(
        request,
        RemoteRequest::FetchThread {
            thread_id: ThreadId::new(THREAD)
        }
    );
    assert_eq!(ticket.generation, Generation(1));
    assert!(effects.contains(&ThreadEffect::RequestFrame));
    assert_eq!(state.presentation(), Some(Presentation::Loading(1)));
}

#[test]
fn navigating_to_the_live_thread_is_a_no_op() {
    let mut state = loaded(vec![comment("c1", "x", 1, json!(""))]);
    let generation = state.generation();

    let effects = navigate(&mut state, THREAD);

    assert!(effects.is_empty());
    assert_eq!(state.generation(), generation);
    assert!(state.tree.is_some());
}

#[test]
fn completions_from_a_previous_thread_are_ignored() {
    let mut state = state();
    let first = single_remote(&navigate(&mut state, THREAD)).0;
    let second = single_remote(&navigate(&mut state, "def")).0;
    assert_eq!(second.generation, Generation(2));

    let effects = complete(
        &mut state,
        first,
        Ok(thread_reply("op", vec![comment("stale", "x", 1, json!(""))])),
    );

    assert!(effects.is_empty());
    assert!(state.tree.is_none());
    assert_eq!(state.presentation(), Some(Presentation::Loading(1)));
}

#[test]
fn action_completions_do_not_leak_into_the_next_thread() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let c1 = key(&state, "c1");
    let (vote_ticket, _) = single_remote(&user(
        &mut state,
        UserAction::Vote {
            node: c1,
            direction: VoteDirection::Up,
        },
    ));

    let fetch = single_remote(&navigate(&mut state, "def")).0;
    complete(
        &mut state,
        fetch,
        Ok(thread_reply("op", vec![comment("c1", "x", 5, json!(""))])),
    );
    complete(&mut state, vote_ticket, Err(rejected(ErrorCategory::Overload)));

    let fresh = node(&state, "c1");
    assert_eq!((fresh.vote_state(), fresh.score()), (VoteState::Neutral, 5));
    assert_eq!(state.last_action_error, None);
}

#[test]
fn keys_from_a_replaced_tree_resolve_to_nothing() {
    let mut state = loaded(vec![comment("c1", "x", 5, json!(""))]);
    let old = key(&state, "c1");
    let fetch = single_remote(&user(&mut state, UserAction::Retry)).0;
    complete(
        &mut state,
        fetch,
        Ok(thread_reply("op", vec![comment("c1", "x", 5, json!(""))])),
    );

    let effects = user(
        &mut state,
        UserAction::Vote {
            node: old,
            direction: VoteDirection::Up,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(node(&state, "c1").score(), 5);
}

#[test]
fn retry_reloads_the_current_thread_from_scratch() {
    let mut state = state();
    let fetch = single_remote(&navigate(&mut state, THREAD)).0;
    complete(&mut state, fetch, Err(rejected(ErrorCategory::NotFound)));
    assert!(state.is_showing_error());

    let effects = user(&mut state, UserAction::Retry);

    let (ticket, request) = single_remote(&effects);
    assert_eq!(ticket.generation, Generation(2));
    assert_eq!(
        request,
        RemoteRequest::FetchThread {
            thread_id: ThreadId::new(THREAD)
        }
    );
    assert_eq!(state.presentation(), Some(Presentation::Loading(1)));
    assert_eq!(state.pending.len(), 1);
}

#[test]
fn retry_without_a_thread_does_nothing() {
    let mut state = state();
    assert!(user(&mut state, UserAction::Retry).is_empty());
    assert!(state.context.is_none());
}

#[test]
fn preference_updates_request_a_frame() {
    let mut state = state();
    let effects = reduce(
        &mut state,
        ThreadAction::Runtime(RuntimeAction::SetPreferences(Preferences {
            hidden_comment_score_threshold: -10,
            ..Preferences::default()
        })),
    );
    assert_eq!(effects, vec![ThreadEffect::RequestFrame]);
    assert_eq!(state.preferences.hidden_comment_score_threshold, -10);
}
