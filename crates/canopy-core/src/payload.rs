//! Wire shape of the nested comment payloads returned by the remote service.
//!
//! Required comment fields (`id`, `author`, `body`) are kept optional here so a missing
//! field surfaces as [`EngineError::MalformedPayload`] with the field name from the tree
//! builder, instead of an opaque serde message.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Deserializer;

use super::error::EngineError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Thing {
    #[serde(rename = "t1")]
    Comment(CommentRecord),
    #[serde(rename = "more")]
    More(MoreRecord),
    #[serde(rename = "t3")]
    Link(LinkRecord),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CommentRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub likes: Option<bool>,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub gilded: u32,
    #[serde(default)]
    pub author_flair_text: Option<String>,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub edited: Edited,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_replies")]
    pub replies: Vec<Thing>,
}

/// Truncation marker. `children` are the identifiers the service left out.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MoreRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LinkRecord {
    pub id: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub title: String,
}

/// `edited` is `false` or the epoch seconds of the last edit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Edited {
    Flag(bool),
    At(f64),
}

impl Default for Edited {
    fn default() -> Self {
        Self::Flag(false)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RepliesField {
    Empty(String),
    Listing(Listing),
}

fn deserialize_replies<'de, D>(deserializer: D) -> Result<Vec<Thing>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RepliesField>::deserialize(deserializer)? {
        Some(RepliesField::Listing(listing)) => listing.data.children,
        Some(RepliesField::Empty(_)) | None => Vec::new(),
    })
}

impl Thing {
    /// Fullname of the thing this entry hangs under, if the payload says.
    pub fn parent_fullname(&self) -> Option<&str> {
        match self {
            Self::Comment(record) => record.parent_id.as_deref(),
            Self::More(record) => record.parent_id.as_deref(),
            Self::Link(_) => None,
        }
    }

    fn comment_fullname(&self) -> Option<String> {
        match self {
            Self::Comment(record) => record
                .name
                .clone()
                .or_else(|| record.id.as_ref().map(|id| format!("t1_{id}"))),
            _ => None,
        }
    }
}

/// A full thread fetch: the link the comments belong to plus its top-level comments.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPayload {
    pub link: LinkRecord,
    pub comments: Vec<Thing>,
}

impl ThreadPayload {
    /// The thread endpoint answers with `[link listing, comment listing]`.
    pub fn from_listings(listings: Vec<Listing>) -> Result<Self, EngineError> {
        let mut listings = listings.into_iter();
        let (Some(link_listing), Some(comment_listing)) = (listings.next(), listings.next())
        else {
            return Err(EngineError::malformed(
                "thread payload must hold a link listing and a comment listing",
            ));
        };
        let link = link_listing
            .data
            .children
            .into_iter()
            .find_map(|thing| match thing {
                Thing::Link(link) => Some(link),
                _ => None,
            })
            .ok_or_else(|| EngineError::malformed("thread payload has no link record"))?;
        Ok(Self {
            link,
            comments: comment_listing.data.children,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let listings: Vec<Listing> =
            serde_json::from_str(json).map_err(|err| EngineError::malformed(err.to_string()))?;
        Self::from_listings(listings)
    }
}

/// Reply to a "more children" request. Things come back flat, each naming its parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: MoreChildrenData,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<Thing>,
}

impl MoreChildrenResponse {
    pub fn from_json(json: &str) -> Result<Vec<Thing>, EngineError> {
        let response: Self =
            serde_json::from_str(json).map_err(|err| EngineError::malformed(err.to_string()))?;
        if let Some(first) = response.json.errors.first() {
            return Err(EngineError::malformed(format!(
                "more children request rejected: {first}"
            )));
        }
        Ok(response.json.data.things)
    }
}

/// Re-nests a flat list of things by `parent_id`. Things whose parent is not in the list
/// stay at the top level. Input order is kept at every level.
pub fn nest_flat(things: Vec<Thing>) -> Vec<Thing> {
    let positions: HashMap<String, usize> = things
        .iter()
        .enumerate()
        .filter_map(|(idx, thing)| thing.comment_fullname().map(|name| (name, idx)))
        .collect();

    let mut child_lists: Vec<Vec<usize>> = vec![Vec::new(); things.len()];
    let mut top_level = Vec::new();
    for (idx, thing) in things.iter().enumerate() {
        match thing
            .parent_fullname()
            .and_then(|parent| positions.get(parent))
            .copied()
        {
            Some(parent_idx) if parent_idx != idx => child_lists[parent_idx].push(idx),
            _ => top_level.push(idx),
        }
    }

    let mut slots: Vec<Option<Thing>> = things.into_iter().map(Some).collect();
    top_level
        .into_iter()
        .filter_map(|idx| assemble(idx, &mut slots, &child_lists))
        .collect()
}

fn assemble(idx: usize, slots: &mut [Option<Thing>], child_lists: &[Vec<usize>]) -> Option<Thing> {
    let mut thing = slots[idx].take()?;
    if let Thing::Comment(record) = &mut thing {
        for &child_idx in &child_lists[idx] {
            if let Some(child) = assemble(child_idx, slots, child_lists) {
                record.replies.push(child);
            }
        }
    }
    Some(thing)
}
