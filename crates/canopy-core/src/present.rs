//! Projects a [`ViewState`] onto a [`UiSurface`].
//!
//! Every frame is rendered from scratch: the previous fragments are simply unmounted. The
//! returned [`FrameBindings`] let the host map clicks on fragments back to node keys.

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;

use super::localisation::relative_timestamp;
use super::localisation::Localiser;
use super::node::CommentNode;
use super::node::LoadMorePlaceholder;
use super::node::NodeKey;
use super::node::TreeItem;
use super::presentation::ErrorDisplay;
use super::presentation::ErrorText;
use super::presentation::LoadingDisplay;
use super::presentation::Presentation;
use super::state::ViewState;
use super::surface::FragmentId;
use super::surface::FragmentKind;
use super::surface::Slot;
use super::surface::UiSurface;
use super::tree::CommentTree;
use super::tree::ThreadInfo;
use super::vote::VoteState;

const SITE: &str = "http://www.reddit.com";
const PROFILE: &str = "http://reddit.com/u/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBindings {
    pub root: Option<FragmentId>,
    /// Comment and load-more fragments with the node they show.
    pub nodes: Vec<(FragmentId, NodeKey)>,
    pub retry: Option<FragmentId>,
}

impl FrameBindings {
    pub fn node_for(&self, fragment: FragmentId) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find(|(candidate, _)| *candidate == fragment)
            .map(|(_, key)| *key)
    }

    pub fn fragment_for(&self, key: NodeKey) -> Option<FragmentId> {
        self.nodes
            .iter()
            .find(|(_, candidate)| *candidate == key)
            .map(|(fragment, _)| *fragment)
    }
}

pub struct Presenter<'a> {
    localiser: &'a dyn Localiser,
    now: DateTime<Utc>,
}

impl<'a> Presenter<'a> {
    pub fn new(localiser: &'a dyn Localiser, now: DateTime<Utc>) -> Self {
        Self { localiser, now }
    }

    pub fn present(&self, state: &ViewState, surface: &mut dyn UiSurface) -> FrameBindings {
        let mut bindings = FrameBindings::default();
        let root = match state.presentation() {
            None => surface.fragment(FragmentKind::Section),
            Some(Presentation::Complete) => match state.tree.as_ref() {
                Some(tree) => self.present_tree(tree, surface, &mut bindings),
                None => surface.fragment(FragmentKind::Section),
            },
            Some(Presentation::Error { category, message }) => {
                let display =
                    ErrorDisplay::for_category(category, message.as_deref(), state.generation());
                let fragment = self.present_error(&display, surface);
                bindings.retry = Some(fragment);
                fragment
            }
            Some(loading) => self.present_loading(&loading, surface),
        };
        surface.mount(root);
        bindings.root = Some(root);
        bindings
    }

    fn present_loading(&self, presentation: &Presentation, surface: &mut dyn UiSurface) -> FragmentId {
        let fragment = surface.fragment(FragmentKind::Loading);
        if let Some(display) = LoadingDisplay::for_presentation(presentation) {
            let args: Vec<&str> = display.text_args.iter().map(String::as_str).collect();
            surface.set_text(fragment, Slot::LoadingHeader, &self.localiser.get(display.header_key));
            surface.set_text(
                fragment,
                Slot::LoadingText,
                &self.localiser.format(display.text_key, &args),
            );
        }
        fragment
    }

    fn present_error(&self, display: &ErrorDisplay, surface: &mut dyn UiSurface) -> FragmentId {
        let fragment = surface.fragment(FragmentKind::Error);
        surface.set_attribute(fragment, Slot::ErrorImage, "src", &display.image.source());
        surface.set_text(fragment, Slot::ErrorHeader, &self.localiser.get(display.header_key));
        let text = match &display.text {
            ErrorText::Key(key) => self.localiser.get(key),
            ErrorText::Message(message) => message.clone(),
            ErrorText::Empty => String::new(),
        };
        surface.set_text(fragment, Slot::ErrorText, &text);
        surface.set_text(fragment, Slot::Retry, &self.localiser.get(display.retry_key));
        surface.set_attribute(fragment, Slot::Root, "data-category", display.category.label());
        fragment
    }

    fn present_tree(
        &self,
        tree: &CommentTree,
        surface: &mut dyn UiSurface,
        bindings: &mut FrameBindings,
    ) -> FragmentId {
        let section = surface.fragment(FragmentKind::Section);
        surface.set_text(section, Slot::Root, &tree.thread().title);
        for key in tree.roots() {
            if let Some(child) = self.present_item(tree, *key, surface, bindings) {
                surface.append_child(section, Slot::Replies, child);
            }
        }
        section
    }

    fn present_item(
        &self,
        tree: &CommentTree,
        key: NodeKey,
        surface: &mut dyn UiSurface,
        bindings: &mut FrameBindings,
    ) -> Option<FragmentId> {
        let fragment = match tree.get(key)? {
            TreeItem::Comment(node) => {
                let fragment = self.present_comment(tree.thread(), node, surface);
                for child in node.children() {
                    if let Some(child_fragment) = self.present_item(tree, *child, surface, bindings) {
                        surface.append_child(fragment, Slot::Replies, child_fragment);
                    }
                }
                fragment
            }
            TreeItem::More(placeholder) => self.present_load_more(placeholder, surface),
        };
        bindings.nodes.push((fragment, key));
        Some(fragment)
    }

    fn present_load_more(
        &self,
        placeholder: &LoadMorePlaceholder,
        surface: &mut dyn UiSurface,
    ) -> FragmentId {
        let fragment = surface.fragment(FragmentKind::LoadMore);
        let label = if placeholder.is_in_flight() {
            self.localiser.get("post_load_more_pending")
        } else {
            let count = placeholder.count.to_string();
            self.localiser.format("post_load_more", &[count.as_str()])
        };
        surface.set_text(fragment, Slot::LoadMoreLabel, &label);
        fragment
    }

    fn present_comment(
        &self,
        thread: &ThreadInfo,
        node: &CommentNode,
        surface: &mut dyn UiSurface,
    ) -> FragmentId {
        let localiser = self.localiser;
        let fragment = surface.fragment(FragmentKind::Comment);
        surface.set_attribute(fragment, Slot::Root, "data-reddit-id", &node.id);
        if node.collapsed {
            surface.add_class(fragment, Slot::Root, "hidden");
        }
        if node.is_deleted() {
            surface.add_class(fragment, Slot::Root, "deleted");
        }
        if node.edited_at.is_some() {
            surface.add_class(fragment, Slot::Root, "edited");
        }

        surface.set_text(fragment, Slot::Author, &node.author);
        surface.set_attribute(fragment, Slot::Author, "href", &format!("{PROFILE}{}", node.author));
        surface.set_attribute(fragment, Slot::Author, "data-username", &node.author);
        if node.is_author_original_poster {
            surface.set_attribute(fragment, Slot::Author, "data-reddit-op", "true");
        }

        if node.gild_count > 0 {
            surface.set_attribute(fragment, Slot::GildCount, "data-count", &node.gild_count.to_string());
        } else {
            surface.remove_slot(fragment, Slot::GildCount);
        }
        match &node.flair {
            Some(flair) => surface.set_text(fragment, Slot::Flair, flair),
            None => surface.remove_slot(fragment, Slot::Flair),
        }

        let points = if node.score() == 1 {
            localiser.get("post_current_score")
        } else {
            localiser.get("post_current_score_plural")
        };
        surface.set_text(fragment, Slot::Score, &format!("{}{points}", node.score()));

        surface.set_text(
            fragment,
            Slot::Timestamp,
            &relative_timestamp(self.now, node.created_at, localiser),
        );
        surface.set_attribute(
            fragment,
            Slot::Timestamp,
            "timestamp",
            &node.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        surface.set_text(fragment, Slot::Body, &node.body);

        surface.set_text(fragment, Slot::Reply, &localiser.get("post_button_reply"));
        surface.set_text(fragment, Slot::Permalink, &localiser.get("post_button_permalink"));
        surface.set_attribute(
            fragment,
            Slot::Permalink,
            "href",
            &format!("{SITE}{}{}", thread.permalink, node.id),
        );
        surface.set_text(fragment, Slot::ParentLink, &localiser.get("post_button_parent"));
        let parent_anchor = node
            .parent_fullname
            .as_deref()
            .and_then(|parent| parent.get(3..))
            .unwrap_or_default();
        surface.set_attribute(
            fragment,
            Slot::ParentLink,
            "href",
            &format!("{SITE}{}#{parent_anchor}", thread.permalink),
        );
        surface.set_text(fragment, Slot::Source, &localiser.get("post_button_source"));

        if node.saved {
            surface.set_text(fragment, Slot::Save, &localiser.get("post_button_unsave"));
            surface.set_attribute(fragment, Slot::Save, "saved", "true");
        } else {
            surface.set_text(fragment, Slot::Save, &localiser.get("post_button_save"));
        }

        surface.set_text(fragment, Slot::GiveGold, &localiser.get("post_button_gold"));
        surface.set_attribute(
            fragment,
            Slot::GiveGold,
            "href",
            &format!("{SITE}/gold?goldtype=gift&months=1&thing={}", node.fullname),
        );

        let affordances = node.affordances();
        if affordances.report {
            surface.set_text(fragment, Slot::Report, &localiser.get("post_button_report"));
        } else {
            surface.remove_slot(fragment, Slot::Report);
        }
        if affordances.edit {
            surface.set_text(fragment, Slot::Edit, &localiser.get("post_button_edit"));
        } else {
            surface.remove_slot(fragment, Slot::Edit);
        }
        if affordances.delete {
            surface.set_text(fragment, Slot::Delete, &localiser.get("post_button_delete"));
        } else {
            surface.remove_slot(fragment, Slot::Delete);
        }

        match node.vote_state() {
            VoteState::Upvoted => surface.add_class(fragment, Slot::Vote, "liked"),
            VoteState::Downvoted => surface.add_class(fragment, Slot::Vote, "disliked"),
            VoteState::Neutral => {}
        }
        fragment
    }
}
