//! Render targets: the seam between the binding core and a presentation
//! surface.
//!
//! The crawler and formatter never touch a real page. They talk to
//! [`RenderTarget`], a minimal capability with two operations: write markup,
//! and mark the target done (the completion signal a host would surface to
//! assistive tooling). Hosts with a real surface implement the trait; the
//! CLI and the tests use [`SlotBoard`], an in-memory board of named slots.

use dashmap::DashMap;
use std::sync::Arc;

/// Capability handed to the binding injector for each bound location.
pub trait RenderTarget: Send {
    /// Write rendered markup into the target.
    fn apply(&mut self, markup: &str);

    /// Mark the target complete. Called once per target after injection,
    /// whether or not any markup was written.
    fn mark_done(&mut self);
}

/// State of one named slot on a [`SlotBoard`].
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    /// Rendered markup, if the slot's binding resolved with output.
    pub markup: Option<String>,
    /// Completion marker.
    pub done: bool,
}

/// Thread-safe board of named render slots (lock-free reads).
///
/// A slot left untouched after a crawl means its binding never resolved:
/// the silent partial-failure outcome, observable here and in the crawl
/// report, never an error.
#[derive(Clone, Default)]
pub struct SlotBoard {
    slots: Arc<DashMap<String, SlotState>>,
}

impl SlotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target writing into the named slot, registering the slot.
    pub fn target(&self, name: impl Into<String>) -> SlotTarget {
        let name = name.into();
        self.slots.entry(name.clone()).or_default();
        SlotTarget {
            board: self.clone(),
            name,
        }
    }

    /// Markup written into a slot, if any.
    pub fn markup(&self, name: &str) -> Option<String> {
        self.slots.get(name).and_then(|s| s.markup.clone())
    }

    /// Whether a slot has been marked done.
    pub fn is_done(&self, name: &str) -> bool {
        self.slots.get(name).map(|s| s.done).unwrap_or(false)
    }

    /// Registered slot names, unordered.
    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|e| e.key().clone()).collect()
    }
}

/// A [`RenderTarget`] bound to one named slot of a [`SlotBoard`].
pub struct SlotTarget {
    board: SlotBoard,
    name: String,
}

impl RenderTarget for SlotTarget {
    fn apply(&mut self, markup: &str) {
        if let Some(mut slot) = self.board.slots.get_mut(&self.name) {
            slot.markup = Some(markup.to_string());
        }
    }

    fn mark_done(&mut self) {
        if let Some(mut slot) = self.board.slots.get_mut(&self.name) {
            slot.done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_records_markup_and_completion() {
        let board = SlotBoard::new();
        let mut target = board.target("title");

        assert!(!board.is_done("title"));
        assert_eq!(board.markup("title"), None);

        target.apply("<li>Systems WG</li>");
        target.mark_done();

        assert_eq!(board.markup("title"), Some("<li>Systems WG</li>".into()));
        assert!(board.is_done("title"));
    }

    #[test]
    fn untouched_slot_stays_as_authored() {
        let board = SlotBoard::new();
        let _ = board.target("never-resolved");

        assert_eq!(board.markup("never-resolved"), None);
        assert!(!board.is_done("never-resolved"));
        assert_eq!(board.names(), vec!["never-resolved".to_string()]);
    }

    #[test]
    fn two_targets_can_share_a_board() {
        let board = SlotBoard::new();
        let mut a = board.target("a");
        let mut b = board.target("b");

        a.apply("one");
        b.apply("two");

        assert_eq!(board.markup("a"), Some("one".into()));
        assert_eq!(board.markup("b"), Some("two".into()));
    }
}
