//! The navigation stack.
//!
//! Push descends into a screen, pop returns to the one beneath. Popping
//! an entry cancels its token, which tears down any stream workers the
//! screen started. The app quits when the stack empties.

use tracing::debug;

use crate::screen::StackEntry;

#[derive(Default)]
pub struct ScreenStack {
    entries: Vec<StackEntry>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StackEntry) {
        debug!(breadcrumb = %entry.breadcrumb, depth = self.entries.len() + 1, "push screen");
        self.entries.push(entry);
    }

    /// Pop the top entry, cancelling its workers.
    pub fn pop(&mut self) -> Option<StackEntry> {
        let entry = self.entries.pop()?;
        entry.cancel.cancel();
        debug!(breadcrumb = %entry.breadcrumb, depth = self.entries.len(), "pop screen");
        Some(entry)
    }

    pub fn top_mut(&mut self) -> Option<&mut StackEntry> {
        self.entries.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Breadcrumb trail for the header, root first.
    pub fn breadcrumbs(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.breadcrumb.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::msg::{Cmd, Msg};
    use crate::screen::Screen;
    use ratatui::Frame;
    use ratatui::layout::Rect;

    struct Blank;

    impl Screen for Blank {
        fn update(&mut self, _msg: Msg) -> Option<Cmd> {
            None
        }
        fn view(&mut self, _frame: &mut Frame, _area: Rect) {}
    }

    fn entry(label: &str) -> StackEntry {
        StackEntry::new(label, Box::new(Blank))
    }

    #[test]
    fn push_then_pop_restores_each_level() {
        let mut stack = ScreenStack::new();
        stack.push(entry("Resources"));
        stack.push(entry("web"));
        stack.push(entry("Logs"));
        assert_eq!(stack.len(), 3);

        assert_eq!(stack.pop().unwrap().breadcrumb, "Logs");
        assert_eq!(stack.top_mut().unwrap().breadcrumb, "web");
        assert_eq!(stack.pop().unwrap().breadcrumb, "web");
        assert_eq!(stack.pop().unwrap().breadcrumb, "Resources");
        assert!(stack.is_empty());
    }

    #[test]
    fn pop_cancels_the_entry_token() {
        let mut stack = ScreenStack::new();
        stack.push(entry("Logs"));
        let token = stack.top_mut().unwrap().cancel.clone();
        assert!(!token.is_cancelled());

        stack.pop();
        assert!(token.is_cancelled());
    }

    #[test]
    fn lower_entries_keep_their_tokens_on_pop() {
        let mut stack = ScreenStack::new();
        stack.push(entry("Resources"));
        let lower = stack.top_mut().unwrap().cancel.clone();
        stack.push(entry("Logs"));

        stack.pop();
        assert!(!lower.is_cancelled());
    }

    #[test]
    fn breadcrumbs_join_root_first() {
        let mut stack = ScreenStack::new();
        stack.push(entry("Resources"));
        stack.push(entry("web (storefront - production)"));
        stack.push(entry("Logs"));
        assert_eq!(
            stack.breadcrumbs(),
            "Resources / web (storefront - production) / Logs"
        );
    }
}
