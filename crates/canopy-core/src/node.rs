use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;

use super::context::Generation;
use super::context::RequestId;
use super::fullname::Fullname;
use super::vote::VoteDirection;
use super::vote::VoteState;
use super::vote::VoteTransition;

pub const DELETED_BODY: &str = "[deleted]";

/// Handle to a node inside one [`CommentTree`](crate::tree::CommentTree).
///
/// The handle remembers the generation of the tree that issued it, so it stops resolving
/// once that tree is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub(crate) generation: Generation,
    pub(crate) index: u32,
}

impl NodeKey {
    pub fn generation(self) -> Generation {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Root,
    Node(NodeKey),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeItem {
    Comment(CommentNode),
    More(LoadMorePlaceholder),
}

impl TreeItem {
    pub fn as_comment(&self) -> Option<&CommentNode> {
        match self {
            Self::Comment(node) => Some(node),
            Self::More(_) => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&LoadMorePlaceholder> {
        match self {
            Self::More(placeholder) => Some(placeholder),
            Self::Comment(_) => None,
        }
    }
}

/// Which per-comment actions the viewer may take. Report is offered only on other people's
/// comments; edit and delete only on the viewer's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub report: bool,
    pub edit: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub id: String,
    pub fullname: Fullname,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub saved: bool,
    pub gild_count: u32,
    pub flair: Option<String>,
    pub parent_fullname: Option<String>,
    pub is_author_original_poster: bool,
    pub is_own_comment: bool,
    pub collapsed: bool,
    score: i64,
    vote_state: VoteState,
    pub(crate) children: Vec<NodeKey>,
}

impl CommentNode {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        fullname: Fullname,
        author: String,
        body: String,
        score: i64,
        vote_state: VoteState,
        created_at: DateTime<Utc>,
        edited_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            fullname,
            author,
            body,
            created_at,
            edited_at,
            saved: false,
            gild_count: 0,
            flair: None,
            parent_fullname: None,
            is_author_original_poster: false,
            is_own_comment: false,
            collapsed: false,
            score,
            vote_state,
            children: Vec::new(),
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn vote_state(&self) -> VoteState {
        self.vote_state
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn is_deleted(&self) -> bool {
        self.body == DELETED_BODY
    }

    pub fn affordances(&self) -> Affordances {
        Affordances {
            report: !self.is_own_comment,
            edit: self.is_own_comment,
            delete: self.is_own_comment,
        }
    }

    /// Applies one step of the vote algebra to both the vote state and the score.
    pub fn apply_vote(&mut self, direction: VoteDirection) -> VoteTransition {
        let transition = self.vote_state.transition(direction);
        self.vote_state = transition.next;
        self.score += transition.score_delta;
        transition
    }

    /// Undoes `transition` if it is still the node's current vote step.
    pub fn revert_vote(&mut self, transition: VoteTransition) -> bool {
        if self.vote_state != transition.next {
            return false;
        }
        let inverse = transition.inverse();
        self.vote_state = inverse.next;
        self.score += inverse.score_delta;
        true
    }

    /// Returns the new flag.
    pub fn toggle_saved(&mut self) -> bool {
        self.saved = !self.saved;
        self.saved
    }

    pub fn replace_body(&mut self, body: String, edited_at: DateTime<Utc>) {
        self.body = body;
        self.edited_at = Some(edited_at);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadMorePlaceholder {
    pub id: Option<String>,
    pub parent_identifier: String,
    pub remaining_child_ids: Vec<String>,
    pub count: u32,
    pub(crate) in_flight: Option<RequestId>,
}

impl LoadMorePlaceholder {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

pub(crate) fn utc_from_epoch(seconds: f64) -> DateTime<Utc> {
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9) as u32;
    Utc.timestamp_opt(whole, nanos).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(score: i64, vote: VoteState) -> CommentNode {
        CommentNode::new(
            "c1".to_string(),
            Fullname::comment("c1"),
            "someone".to_string(),
            "hi".to_string(),
            score,
            vote,
            utc_from_epoch(0.0),
            None,
        )
    }

    #[test]
    fn score_and_vote_move_together() {
        let mut node = node(5, VoteState::Neutral);
        node.apply_vote(VoteDirection::Up);
        assert_eq!((node.vote_state(), node.score()), (VoteState::Upvoted, 6));
        node.apply_vote(VoteDirection::Down);
        assert_eq!((node.vote_state(), node.score()), (VoteState::Downvoted, 4));
    }

    #[test]
    fn revert_only_applies_to_the_current_step() {
        let mut node = node(10, VoteState::Downvoted);
        let first = node.apply_vote(VoteDirection::Up);
        let second = node.apply_vote(VoteDirection::Up);
        assert_eq!((node.vote_state(), node.score()), (VoteState::Neutral, 11));

        assert!(!node.revert_vote(first));
        assert!(node.revert_vote(second));
        assert_eq!((node.vote_state(), node.score()), (VoteState::Upvoted, 12));
    }

    #[test]
    fn affordances_are_mutually_exclusive() {
        let mut node = node(1, VoteState::Neutral);
        let other = node.affordances();
        assert!(other.report && !other.edit && !other.delete);
        node.is_own_comment = true;
        let own = node.affordances();
        assert!(!own.report && own.edit && own.delete);
    }

    #[test]
    fn fractional_epoch_seconds_keep_the_whole_second() {
        let at = utc_from_epoch(1_400_000_000.75);
        assert_eq!(at.timestamp(), 1_400_000_000);
    }
}
