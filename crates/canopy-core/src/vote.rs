//! The viewer's own vote on a comment and the score arithmetic that goes with it.
//!
//! The remote service only ever receives the resulting [`VoteState`] as `1`, `-1` or `0`
//! and recomputes its own tally. The local score delta exists so the displayed score moves
//! in the same frame as the arrow.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    Upvoted,
    Downvoted,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

/// One applied step of the vote algebra. Holding on to it is enough to undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub previous: VoteState,
    pub next: VoteState,
    pub score_delta: i64,
}

impl VoteTransition {
    pub fn inverse(self) -> Self {
        Self {
            previous: self.next,
            next: self.previous,
            score_delta: -self.score_delta,
        }
    }
}

impl VoteState {
    /// Maps the remote `likes` field (`true`, `false`, `null`).
    pub fn from_likes(likes: Option<bool>) -> Self {
        match likes {
            Some(true) => Self::Upvoted,
            Some(false) => Self::Downvoted,
            None => Self::Neutral,
        }
    }

    pub fn likes(self) -> Option<bool> {
        match self {
            Self::Upvoted => Some(true),
            Self::Downvoted => Some(false),
            Self::Neutral => None,
        }
    }

    /// Value of the `dir` field in a vote request.
    pub fn remote_dir(self) -> i8 {
        match self {
            Self::Upvoted => 1,
            Self::Downvoted => -1,
            Self::Neutral => 0,
        }
    }

    /// Requesting the current direction again is an undo, never a no-op.
    pub fn transition(self, direction: VoteDirection) -> VoteTransition {
        let (next, score_delta) = match (self, direction) {
            (Self::Neutral, VoteDirection::Up) => (Self::Upvoted, 1),
            (Self::Neutral, VoteDirection::Down) => (Self::Downvoted, -1),
            (Self::Upvoted, VoteDirection::Up) => (Self::Neutral, -1),
            (Self::Upvoted, VoteDirection::Down) => (Self::Downvoted, -2),
            (Self::Downvoted, VoteDirection::Up) => (Self::Upvoted, 2),
            (Self::Downvoted, VoteDirection::Down) => (Self::Neutral, 1),
        };
        VoteTransition {
            previous: self,
            next,
            score_delta,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Upvoted => "upvoted",
            Self::Downvoted => "downvoted",
            Self::Neutral => "neutral",
        }
    }
}

impl VoteDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}
