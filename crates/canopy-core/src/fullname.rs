use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::error::EngineError;

/// Prefix digit of a remote "fullname" (`t1_abc`, `t3_xyz`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThingKind {
    Comment,
    Account,
    Link,
    Message,
    Subreddit,
    Award,
}

impl ThingKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Comment => "t1",
            Self::Account => "t2",
            Self::Link => "t3",
            Self::Message => "t4",
            Self::Subreddit => "t5",
            Self::Award => "t6",
        }
    }

    fn from_digit(digit: &str) -> Option<Self> {
        match digit {
            "1" => Some(Self::Comment),
            "2" => Some(Self::Account),
            "3" => Some(Self::Link),
            "4" => Some(Self::Message),
            "5" => Some(Self::Subreddit),
            "6" => Some(Self::Award),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fullname {
    pub kind: ThingKind,
    pub id: String,
}

impl Fullname {
    pub fn comment(id: impl Into<String>) -> Self {
        Self {
            kind: ThingKind::Comment,
            id: id.into(),
        }
    }

    pub fn link(id: impl Into<String>) -> Self {
        Self {
            kind: ThingKind::Link,
            id: id.into(),
        }
    }
}

fn fullname_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^t([1-6])_([0-9a-zA-Z]+)$").expect("fullname pattern is a valid regex")
    })
}

impl FromStr for Fullname {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let captures = fullname_pattern()
            .captures(value.trim())
            .ok_or_else(|| EngineError::malformed(format!("`{value}` is not a fullname")))?;
        let kind = ThingKind::from_digit(&captures[1])
            .ok_or_else(|| EngineError::malformed(format!("`{value}` has an unknown kind")))?;
        Ok(Self {
            kind,
            id: captures[2].to_string(),
        })
    }
}

impl fmt::Display for Fullname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.id)
    }
}
