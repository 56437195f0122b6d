//! The rendering seam between the engine and whatever actually draws the thread.
//!
//! A surface hands out fragments cloned from a small set of templates and lets the
//! presenter fill their named slots. The engine never sees the concrete widgets.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FragmentKind {
    Section,
    Comment,
    LoadMore,
    Loading,
    Error,
}

/// Named parts of a fragment template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Root,
    Author,
    GildCount,
    Flair,
    Score,
    Timestamp,
    Body,
    Reply,
    Permalink,
    ParentLink,
    Source,
    Save,
    GiveGold,
    Report,
    Edit,
    Delete,
    Vote,
    Replies,
    LoadMoreLabel,
    LoadingHeader,
    LoadingText,
    ErrorImage,
    ErrorHeader,
    ErrorText,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FragmentId(pub usize);

pub trait UiSurface {
    fn fragment(&mut self, kind: FragmentKind) -> FragmentId;
    fn set_text(&mut self, fragment: FragmentId, slot: Slot, text: &str);
    fn set_attribute(&mut self, fragment: FragmentId, slot: Slot, name: &str, value: &str);
    fn add_class(&mut self, fragment: FragmentId, slot: Slot, class: &str);
    fn remove_slot(&mut self, fragment: FragmentId, slot: Slot);
    /// Nests `child` under `parent`'s `slot` (normally [`Slot::Replies`]).
    fn append_child(&mut self, parent: FragmentId, slot: Slot, child: FragmentId);
    /// Replaces whatever was shown with `root`.
    fn mount(&mut self, root: FragmentId);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotContent {
    pub text: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFragment {
    pub kind: FragmentKind,
    pub slots: BTreeMap<Slot, SlotContent>,
    pub removed: BTreeSet<Slot>,
    pub children: Vec<FragmentId>,
}

impl RecordedFragment {
    fn new(kind: FragmentKind) -> Self {
        Self {
            kind,
            slots: BTreeMap::new(),
            removed: BTreeSet::new(),
            children: Vec::new(),
        }
    }
}

/// In-memory surface. Keeps every fragment it ever handed out; only the mounted root and
/// its descendants are considered visible.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    fragments: Vec<RecordedFragment>,
    mounted: Option<FragmentId>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(&self) -> Option<FragmentId> {
        self.mounted
    }

    pub fn get(&self, fragment: FragmentId) -> Option<&RecordedFragment> {
        self.fragments.get(fragment.0)
    }

    pub fn text(&self, fragment: FragmentId, slot: Slot) -> Option<&str> {
        self.slot(fragment, slot)?.text.as_deref()
    }

    pub fn attribute(&self, fragment: FragmentId, slot: Slot, name: &str) -> Option<&str> {
        self.slot(fragment, slot)?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    pub fn has_class(&self, fragment: FragmentId, slot: Slot, class: &str) -> bool {
        self.slot(fragment, slot)
            .is_some_and(|content| content.classes.contains(class))
    }

    pub fn is_removed(&self, fragment: FragmentId, slot: Slot) -> bool {
        self.get(fragment)
            .is_some_and(|recorded| recorded.removed.contains(&slot))
    }

    pub fn children(&self, fragment: FragmentId) -> &[FragmentId] {
        self.get(fragment)
            .map(|recorded| recorded.children.as_slice())
            .unwrap_or(&[])
    }

    /// Plain-text outline of the mounted fragment tree, two spaces per level.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.mounted {
            self.render_into(root, 0, &mut out);
        }
        out
    }

    fn render_into(&self, fragment: FragmentId, depth: usize, out: &mut String) {
        let Some(recorded) = self.get(fragment) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let line = match recorded.kind {
            FragmentKind::Section => None,
            FragmentKind::Comment => {
                let mut header = Vec::new();
                for slot in [Slot::Author, Slot::Flair, Slot::Score, Slot::Timestamp] {
                    if let Some(text) = self.text(fragment, slot).filter(|text| !text.is_empty()) {
                        header.push(text.to_string());
                    }
                }
                if self.has_class(fragment, Slot::Vote, "liked") {
                    header.push("[+]".to_string());
                } else if self.has_class(fragment, Slot::Vote, "disliked") {
                    header.push("[-]".to_string());
                }
                if self.has_class(fragment, Slot::Root, "hidden") {
                    header.push("[collapsed]".to_string());
                }
                let body = self.text(fragment, Slot::Body).unwrap_or_default();
                Some(format!("{}\n{indent}  {}", header.join(" | "), body.replace('\n', " ")))
            }
            FragmentKind::LoadMore => self.text(fragment, Slot::LoadMoreLabel).map(str::to_string),
            FragmentKind::Loading => {
                let header = self.text(fragment, Slot::LoadingHeader).unwrap_or_default();
                let text = self.text(fragment, Slot::LoadingText).unwrap_or_default();
                Some(format!("{header} {text}"))
            }
            FragmentKind::Error => {
                let header = self.text(fragment, Slot::ErrorHeader).unwrap_or_default();
                let text = self.text(fragment, Slot::ErrorText).unwrap_or_default();
                let retry = self.text(fragment, Slot::Retry).unwrap_or_default();
                Some(format!("{header}: {text} [{retry}]"))
            }
        };
        let child_depth = match line {
            Some(line) => {
                out.push_str(&indent);
                out.push_str(&line);
                out.push('\n');
                depth + 1
            }
            None => depth,
        };
        for child in &recorded.children {
            self.render_into(*child, child_depth, out);
        }
    }

    fn slot(&self, fragment: FragmentId, slot: Slot) -> Option<&SlotContent> {
        self.get(fragment)?.slots.get(&slot)
    }

    fn slot_mut(&mut self, fragment: FragmentId, slot: Slot) -> Option<&mut SlotContent> {
        let recorded = self.fragments.get_mut(fragment.0)?;
        Some(recorded.slots.entry(slot).or_default())
    }
}

impl UiSurface for RecordingSurface {
    fn fragment(&mut self, kind: FragmentKind) -> FragmentId {
        self.fragments.push(RecordedFragment::new(kind));
        FragmentId(self.fragments.len() - 1)
    }

    fn set_text(&mut self, fragment: FragmentId, slot: Slot, text: &str) {
        if let Some(content) = self.slot_mut(fragment, slot) {
            content.text = Some(text.to_string());
        }
    }

    fn set_attribute(&mut self, fragment: FragmentId, slot: Slot, name: &str, value: &str) {
        if let Some(content) = self.slot_mut(fragment, slot) {
            content.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn add_class(&mut self, fragment: FragmentId, slot: Slot, class: &str) {
        if let Some(content) = self.slot_mut(fragment, slot) {
            content.classes.insert(class.to_string());
        }
    }

    fn remove_slot(&mut self, fragment: FragmentId, slot: Slot) {
        if let Some(recorded) = self.fragments.get_mut(fragment.0) {
            recorded.slots.remove(&slot);
            recorded.removed.insert(slot);
        }
    }

    fn append_child(&mut self, parent: FragmentId, _slot: Slot, child: FragmentId) {
        if let Some(recorded) = self.fragments.get_mut(parent.0) {
            recorded.children.push(child);
        }
    }

    fn mount(&mut self, root: FragmentId) {
        self.mounted = Some(root);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn only_the_mounted_tree_is_rendered() {
        let mut surface = RecordingSurface::new();
        let stale = surface.fragment(FragmentKind::Loading);
        surface.set_text(stale, Slot::LoadingHeader, "old");
        let section = surface.fragment(FragmentKind::Section);
        let more = surface.fragment(FragmentKind::LoadMore);
        surface.set_text(more, Slot::LoadMoreLabel, "load more comments (2 replies)");
        surface.append_child(section, Slot::Replies, more);
        surface.mount(section);

        assert_eq!(surface.render_text(), "load more comments (2 replies)\n");
    }

    #[test]
    fn removed_slots_stay_removed() {
        let mut surface = RecordingSurface::new();
        let comment = surface.fragment(FragmentKind::Comment);
        surface.set_text(comment, Slot::Report, "report");
        surface.remove_slot(comment, Slot::Report);
        assert!(surface.is_removed(comment, Slot::Report));
        assert_eq!(surface.text(comment, Slot::Report), None);
    }
}
