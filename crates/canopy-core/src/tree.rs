//! The canonical comment graph for one thread load.
//!
//! Nodes live in an append-only arena. Structure is expressed with [`NodeKey`]s: a parent
//! owns the ordered keys of its children and each entry records its parent key for
//! removal. Slots are emptied on removal and never reused, so a stale key can only ever
//! resolve to `None`.

use std::collections::HashMap;
use std::collections::HashSet;

use super::context::Generation;
use super::error::EngineError;
use super::fullname::Fullname;
use super::node::utc_from_epoch;
use super::node::CommentNode;
use super::node::LoadMorePlaceholder;
use super::node::NodeKey;
use super::node::Parent;
use super::node::TreeItem;
use super::payload::CommentRecord;
use super::payload::Edited;
use super::payload::LinkRecord;
use super::payload::MoreRecord;
use super::payload::Thing;
use super::vote::VoteState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: String,
    pub author: String,
    pub permalink: String,
    pub title: String,
}

impl ThreadInfo {
    pub fn from_link(link: &LinkRecord) -> Result<Self, EngineError> {
        let id = link
            .id
            .clone()
            .ok_or_else(|| EngineError::malformed("link record is missing `id`"))?;
        Ok(Self {
            id,
            author: link.author.clone().unwrap_or_default(),
            permalink: link.permalink.clone(),
            title: link.title.clone(),
        })
    }

    pub fn fullname(&self) -> Fullname {
        Fullname::link(self.id.clone())
    }
}

/// Everything the builder needs besides the payload itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub generation: Generation,
    pub thread: ThreadInfo,
    pub viewer: Option<String>,
    pub hidden_score_threshold: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry {
    pub parent: Parent,
    pub item: TreeItem,
}

#[derive(Debug, Clone)]
pub struct CommentTree {
    context: BuildContext,
    entries: Vec<Option<TreeEntry>>,
    roots: Vec<NodeKey>,
    index: HashMap<String, NodeKey>,
}

impl CommentTree {
    pub fn build(context: BuildContext, things: Vec<Thing>) -> Result<Self, EngineError> {
        let mut tree = Self {
            context,
            entries: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
        };
        let mut seen = HashSet::new();
        let checked = validate(things, &tree.index, &mut seen)?;
        let thread_fullname = tree.context.thread.fullname().to_string();
        for thing in checked {
            let key = tree.materialize(thing, Parent::Root, &thread_fullname);
            tree.roots.push(key);
        }
        log::debug!(
            "built comment tree for thread {} (generation {}, {} nodes)",
            tree.context.thread.id,
            tree.context.generation.0,
            tree.len()
        );
        Ok(tree)
    }

    pub fn generation(&self) -> Generation {
        self.context.generation
    }

    pub fn thread(&self) -> &ThreadInfo {
        &self.context.thread
    }

    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    pub fn children_of(&self, parent: Parent) -> &[NodeKey] {
        match parent {
            Parent::Root => &self.roots,
            Parent::Node(key) => self
                .comment(key)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn entry(&self, key: NodeKey) -> Option<&TreeEntry> {
        if key.generation != self.context.generation {
            return None;
        }
        self.entries.get(key.index as usize)?.as_ref()
    }

    fn entry_mut(&mut self, key: NodeKey) -> Option<&mut TreeEntry> {
        if key.generation != self.context.generation {
            return None;
        }
        self.entries.get_mut(key.index as usize)?.as_mut()
    }

    pub fn get(&self, key: NodeKey) -> Option<&TreeItem> {
        self.entry(key).map(|entry| &entry.item)
    }

    pub fn comment(&self, key: NodeKey) -> Option<&CommentNode> {
        self.get(key)?.as_comment()
    }

    pub fn comment_mut(&mut self, key: NodeKey) -> Option<&mut CommentNode> {
        match &mut self.entry_mut(key)?.item {
            TreeItem::Comment(node) => Some(node),
            TreeItem::More(_) => None,
        }
    }

    pub fn placeholder(&self, key: NodeKey) -> Option<&LoadMorePlaceholder> {
        self.get(key)?.as_placeholder()
    }

    pub fn placeholder_mut(&mut self, key: NodeKey) -> Option<&mut LoadMorePlaceholder> {
        match &mut self.entry_mut(key)?.item {
            TreeItem::More(placeholder) => Some(placeholder),
            TreeItem::Comment(_) => None,
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    /// Number of live nodes, placeholders included.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order walk of every reachable node with its depth (top level is 0).
    pub fn depth_first(&self) -> Vec<(NodeKey, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeKey, usize)> =
            self.roots.iter().rev().map(|key| (*key, 0)).collect();
        while let Some((key, depth)) = stack.pop() {
            out.push((key, depth));
            if let Some(node) = self.comment(key) {
                stack.extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
            }
        }
        out
    }

    /// Detaches `key` and frees its subtree. Returns `false` if it was already gone.
    pub fn remove_node(&mut self, key: NodeKey) -> bool {
        let Some(parent) = self.entry(key).map(|entry| entry.parent) else {
            return false;
        };
        let Some(siblings) = self.siblings_mut(parent) else {
            return false;
        };
        let Some(position) = siblings.iter().position(|sibling| *sibling == key) else {
            return false;
        };
        siblings.remove(position);
        self.free_subtree(key);
        true
    }

    /// Replaces the placeholder at `key` with nodes built from `things`, at the same
    /// position among its siblings. The tree is untouched if the payload is malformed.
    pub fn expand_placeholder(
        &mut self,
        key: NodeKey,
        things: Vec<Thing>,
    ) -> Result<Vec<NodeKey>, EngineError> {
        let Some(entry) = self.entry(key) else {
            return Err(EngineError::malformed("placeholder is not part of this tree"));
        };
        let TreeItem::More(placeholder) = &entry.item else {
            return Err(EngineError::malformed("node is not a load-more placeholder"));
        };
        let parent = entry.parent;
        let parent_identifier = placeholder.parent_identifier.clone();
        let position = self
            .children_of(parent)
            .iter()
            .position(|sibling| *sibling == key)
            .ok_or_else(|| EngineError::malformed("placeholder is detached"))?;

        let mut seen = HashSet::new();
        let checked = validate(things, &self.index, &mut seen)?;

        let inserted: Vec<NodeKey> = checked
            .into_iter()
            .map(|thing| self.materialize(thing, parent, &parent_identifier))
            .collect();
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.splice(position..=position, inserted.iter().copied());
        }
        self.free_subtree(key);
        Ok(inserted)
    }

    /// Adds a freshly posted reply as the first child of `parent`.
    pub fn insert_reply(&mut self, parent: Parent, thing: Thing) -> Result<NodeKey, EngineError> {
        if let Parent::Node(parent_key) = parent {
            if self.comment(parent_key).is_none() {
                return Err(EngineError::malformed("reply target is not a live comment"));
            }
        }
        let mut seen = HashSet::new();
        let checked = validate(vec![thing], &self.index, &mut seen)?
            .pop()
            .ok_or_else(|| EngineError::malformed("empty reply payload"))?;
        let parent_identifier = match parent {
            Parent::Root => self.context.thread.fullname().to_string(),
            Parent::Node(parent_key) => self
                .comment(parent_key)
                .map(|node| node.fullname.to_string())
                .unwrap_or_default(),
        };
        let key = self.materialize(checked, parent, &parent_identifier);
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.insert(0, key);
        }
        Ok(key)
    }

    fn siblings_mut(&mut self, parent: Parent) -> Option<&mut Vec<NodeKey>> {
        match parent {
            Parent::Root => Some(&mut self.roots),
            Parent::Node(key) => self.comment_mut(key).map(|node| &mut node.children),
        }
    }

    fn free_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            let Some(slot) = self.entries.get_mut(key.index as usize) else {
                continue;
            };
            let Some(entry) = slot.take() else {
                continue;
            };
            if let TreeItem::Comment(node) = entry.item {
                self.index.remove(&node.id);
                stack.extend(node.children);
            }
        }
    }

    fn push(&mut self, entry: TreeEntry) -> NodeKey {
        let key = NodeKey {
            generation: self.context.generation,
            index: self.entries.len() as u32,
        };
        self.entries.push(Some(entry));
        key
    }

    fn materialize(&mut self, thing: Checked, parent: Parent, parent_identifier: &str) -> NodeKey {
        match thing {
            Checked::Comment { record, replies } => {
                self.materialize_comment(record, replies, parent)
            }
            Checked::More(record) => self.materialize_more(record, parent, parent_identifier),
        }
    }

    fn materialize_comment(
        &mut self,
        record: CommentRecord,
        replies: Vec<Checked>,
        parent: Parent,
    ) -> NodeKey {
        let CommentRecord {
            id,
            name,
            author,
            body,
            score,
            likes,
            saved,
            gilded,
            author_flair_text,
            created_utc,
            edited,
            parent_id,
            replies: _,
        } = record;
        let id = id.unwrap_or_default();
        let author = author.unwrap_or_default();
        let body = body.unwrap_or_default();
        let fullname = name
            .and_then(|name| name.parse::<Fullname>().ok())
            .unwrap_or_else(|| Fullname::comment(id.clone()));
        let created_at = utc_from_epoch(created_utc);
        let edited_at = match edited {
            Edited::Flag(true) => Some(created_at),
            Edited::Flag(false) => None,
            Edited::At(seconds) => Some(utc_from_epoch(seconds)),
        };

        let mut node = CommentNode::new(
            id.clone(),
            fullname,
            author,
            body,
            score,
            VoteState::from_likes(likes),
            created_at,
            edited_at,
        );
        node.saved = saved;
        node.gild_count = gilded;
        node.flair = author_flair_text.filter(|flair| !flair.is_empty());
        node.parent_fullname = parent_id;
        node.is_author_original_poster = node.author == self.context.thread.author;
        node.is_own_comment = self
            .context
            .viewer
            .as_deref()
            .is_some_and(|viewer| viewer == node.author);
        node.collapsed = node.score() < self.context.hidden_score_threshold;

        let own_fullname = node.fullname.to_string();
        let key = self.push(TreeEntry {
            parent,
            item: TreeItem::Comment(node),
        });
        self.index.insert(id, key);

        let children: Vec<NodeKey> = replies
            .into_iter()
            .map(|reply| self.materialize(reply, Parent::Node(key), &own_fullname))
            .collect();
        if let Some(node) = self.comment_mut(key) {
            node.children = children;
        }
        key
    }

    fn materialize_more(
        &mut self,
        record: MoreRecord,
        parent: Parent,
        parent_identifier: &str,
    ) -> NodeKey {
        let placeholder = LoadMorePlaceholder {
            id: record.id,
            parent_identifier: record
                .parent_id
                .unwrap_or_else(|| parent_identifier.to_string()),
            remaining_child_ids: record.children,
            count: record.count,
            in_flight: None,
        };
        self.push(TreeEntry {
            parent,
            item: TreeItem::More(placeholder),
        })
    }
}

/// Checks required fields and identifier uniqueness for a whole batch before anything is
/// inserted, so a failure never leaves a half-built tree behind.
/// A thing that passed [`validate`]: comments carry their required fields and their
/// replies are checked too.
enum Checked {
    Comment {
        record: CommentRecord,
        replies: Vec<Checked>,
    },
    More(MoreRecord),
}

/// Checks a whole batch before anything is materialized, so a rejected batch leaves the
/// tree untouched.
fn validate(
    things: Vec<Thing>,
    existing: &HashMap<String, NodeKey>,
    seen: &mut HashSet<String>,
) -> Result<Vec<Checked>, EngineError> {
    let mut checked = Vec::with_capacity(things.len());
    for thing in things {
        match thing {
            Thing::Comment(mut record) => {
                let id = record
                    .id
                    .as_deref()
                    .ok_or_else(|| EngineError::missing_field("id", None))?;
                if record.author.is_none() {
                    return Err(EngineError::missing_field("author", Some(id)));
                }
                if record.body.is_none() {
                    return Err(EngineError::missing_field("body", Some(id)));
                }
                if existing.contains_key(id) || !seen.insert(id.to_string()) {
                    return Err(EngineError::malformed(format!(
                        "comment {id} appears more than once"
                    )));
                }
                let replies = validate(std::mem::take(&mut record.replies), existing, seen)?;
                checked.push(Checked::Comment { record, replies });
            }
            Thing::More(record) => checked.push(Checked::More(record)),
            Thing::Link(_) => {
                return Err(EngineError::malformed(
                    "link record found inside a comment listing",
                ));
            }
        }
    }
    Ok(checked)
}
