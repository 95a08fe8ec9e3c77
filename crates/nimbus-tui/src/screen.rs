//! Screen trait and the stack entry wrapper.

use std::fmt;

use ratatui::Frame;
use ratatui::layout::Rect;
use tokio_util::sync::CancellationToken;

use crate::msg::{Cmd, Msg};

/// One view in the navigation stack.
///
/// Screens are plain state machines: the app loop feeds them messages,
/// they return commands. They never touch the terminal or spawn tasks
/// themselves.
pub trait Screen: Send {
    /// Called once, when the screen first becomes the top of the stack.
    fn init(&mut self) -> Option<Cmd> {
        None
    }

    /// Handle a message. Only the top screen receives messages.
    fn update(&mut self, msg: Msg) -> Option<Cmd>;

    /// Draw into `area`.
    fn view(&mut self, frame: &mut Frame, area: Rect);

    /// Consume an Esc press. Return `true` when handled locally (e.g.
    /// closing an overlay); `false` pops the screen.
    fn on_back(&mut self) -> bool {
        false
    }

    /// Key hints for the footer line.
    fn hints(&self) -> &'static str {
        ""
    }
}

/// A screen plus the state the stack tracks for it.
pub struct StackEntry {
    /// Short label shown in the breadcrumb header.
    pub breadcrumb: String,
    pub screen: Box<dyn Screen>,
    /// Cancels this entry's background workers when it is popped.
    pub cancel: CancellationToken,
    pub(crate) initialized: bool,
}

impl StackEntry {
    pub fn new(breadcrumb: impl Into<String>, screen: Box<dyn Screen>) -> Self {
        Self {
            breadcrumb: breadcrumb.into(),
            screen,
            cancel: CancellationToken::new(),
            initialized: false,
        }
    }
}

impl fmt::Debug for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackEntry")
            .field("breadcrumb", &self.breadcrumb)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
