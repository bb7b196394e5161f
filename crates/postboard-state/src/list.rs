//! State behind the post list: the search box, the tag filter popover, and
//! the derived view of which loaded posts are visible.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::Post;
use crate::store::{OpKind, Operation, PostStore, RequestStatus};

/// Search terms at or below this many characters never hit the network.
pub const SEARCH_MIN_EXCLUSIVE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    FetchAll,
    Search(String),
    Hold,
}

impl SearchIntent {
    pub fn from_input(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self::FetchAll
        } else if trimmed.chars().count() > SEARCH_MIN_EXCLUSIVE {
            Self::Search(text.to_string())
        } else {
            Self::Hold
        }
    }

    pub fn into_operation(self) -> Option<Operation> {
        match self {
            Self::FetchAll => Some(Operation::FetchAll),
            Self::Search(term) => Some(Operation::Search(term)),
            Self::Hold => None,
        }
    }
}

pub fn tag_universe(posts: &[Post]) -> BTreeSet<String> {
    posts
        .iter()
        .flat_map(|post| post.tags.iter().cloned())
        .collect()
}

/// Posts carrying at least one of `selected`, in list order.
pub fn filter_any_tag(posts: &[Post], selected: &BTreeSet<String>) -> Vec<Post> {
    posts
        .iter()
        .filter(|post| selected.iter().any(|tag| post.has_tag(tag)))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Popover {
    open: bool,
}

impl Popover {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Pointer-down anywhere on the page; `inside` tells whether it landed in
    /// the popover's region.
    pub fn on_pointer_down(&mut self, inside: bool) {
        if !inside {
            self.open = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    pub search_text: String,
    pub selected_tags: BTreeSet<String>,
    pub popover: Popover,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list only fetches on mount while nothing has been requested yet.
    pub fn needs_initial_fetch(store: &PostStore) -> bool {
        store.status(OpKind::FetchAll) == RequestStatus::Idle
            && store.list_status().status == RequestStatus::Idle
    }

    pub fn on_search_input(&mut self, text: &str) -> Option<Operation> {
        self.search_text = text.to_string();
        let intent = SearchIntent::from_input(text);
        debug!(?intent, "search input");
        intent.into_operation()
    }

    /// Adds or removes `tag`. Emptying the selection asks for the full list
    /// again.
    pub fn toggle_tag(&mut self, tag: &str) -> Option<Operation> {
        if !self.selected_tags.remove(tag) {
            self.selected_tags.insert(tag.to_string());
        }
        debug!(tag, selected = self.selected_tags.len(), "tag toggled");

        if self.selected_tags.is_empty() {
            Some(Operation::FetchAll)
        } else {
            None
        }
    }

    pub fn apply_filter(&mut self) -> Option<Operation> {
        self.popover.close();
        if self.selected_tags.is_empty() {
            Some(Operation::FetchAll)
        } else {
            None
        }
    }

    pub fn visible_posts(&self, loaded: &[Post]) -> Vec<Post> {
        if self.selected_tags.is_empty() {
            loaded.to_vec()
        } else {
            filter_any_tag(loaded, &self.selected_tags)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Payload;
    use crate::model::Reactions;

    fn tagged(id: u64, tags: &[&str]) -> Post {
        Post {
            id,
            title: String::new(),
            body: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            reactions: Reactions::default(),
            image: None,
            thumbnail: None,
            views: None,
            user_id: None,
            comments: vec![],
        }
    }

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn search_length_threshold() {
        assert_eq!(SearchIntent::from_input(""), SearchIntent::FetchAll);
        assert_eq!(SearchIntent::from_input("   "), SearchIntent::FetchAll);
        assert_eq!(SearchIntent::from_input("a"), SearchIntent::Hold);
        assert_eq!(SearchIntent::from_input("abc"), SearchIntent::Hold);
        assert_eq!(SearchIntent::from_input(" abc "), SearchIntent::Hold);
        assert_eq!(SearchIntent::from_input("abcd"), SearchIntent::Search("abcd".into()));
    }

    #[test]
    fn tag_universe_is_union_without_duplicates() {
        let posts = vec![tagged(1, &["a", "b"]), tagged(2, &["b", "c"]), tagged(3, &[])];
        assert_eq!(tag_universe(&posts), set(&["a", "b", "c"]));
        assert!(tag_universe(&[]).is_empty());
    }

    #[test]
    fn or_filter_scenario() {
        let posts = vec![tagged(1, &["a", "b"]), tagged(2, &["b", "c"])];
        let mut state = ListState::new();

        assert_eq!(state.toggle_tag("a"), None);
        let ids: Vec<u64> = state.visible_posts(&posts).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);

        assert_eq!(state.toggle_tag("c"), None);
        let ids: Vec<u64> = state.visible_posts(&posts).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn toggling_twice_falls_back_to_full_list() {
        let posts = vec![tagged(1, &["a"]), tagged(2, &["b"])];
        let mut state = ListState::new();

        assert_eq!(state.toggle_tag("a"), None);
        assert_eq!(state.toggle_tag("a"), Some(Operation::FetchAll));
        assert!(state.selected_tags.is_empty());
        assert_eq!(state.visible_posts(&posts), posts);
    }

    #[test]
    fn apply_closes_popover() {
        let mut state = ListState::new();
        state.popover.toggle();
        assert!(state.popover.is_open());
        assert_eq!(state.apply_filter(), Some(Operation::FetchAll));
        assert!(!state.popover.is_open());

        state.popover.toggle();
        state.toggle_tag("x");
        assert_eq!(state.apply_filter(), None);
    }

    #[test]
    fn pointer_down_outside_closes() {
        let mut popover = Popover::default();
        popover.toggle();
        popover.on_pointer_down(true);
        assert!(popover.is_open());
        popover.on_pointer_down(false);
        assert!(!popover.is_open());
    }

    #[test]
    fn initial_fetch_only_while_idle() {
        let mut store = PostStore::new();
        assert!(ListState::needs_initial_fetch(&store));

        let ticket = store.begin(Operation::FetchAll);
        assert!(!ListState::needs_initial_fetch(&store));
        store.complete(ticket, Ok(Payload::Posts(vec![])));
        assert!(!ListState::needs_initial_fetch(&store));
    }

    #[test]
    fn search_input_keeps_text_even_when_held() {
        let mut state = ListState::new();
        assert_eq!(state.on_search_input("ab"), None);
        assert_eq!(state.search_text, "ab");
        assert_eq!(state.on_search_input("abcde"), Some(Operation::Search("abcde".into())));
        assert_eq!(state.on_search_input(""), Some(Operation::FetchAll));
    }
}
