//! Async loading state machine.
//!
//! Each screen that fetches data owns a [`Loader`]. The loader only
//! tracks state; the actual work runs as a [`Cmd`] and reports back via
//! [`Loader::complete`] / [`Loader::fail`]. A failed load stays failed
//! until the operator explicitly retries.

use nimbus_core::CoreError;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::msg::Cmd;
use crate::theme;

#[derive(Debug, Default)]
pub enum LoadingState<T> {
    #[default]
    NotStarted,
    Loading,
    Done(T),
    Failed(CoreError),
}

pub struct Loader<T> {
    state: LoadingState<T>,
    throbber: ThrobberState,
    message: String,
}

impl<T> Loader<T> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            state: LoadingState::NotStarted,
            throbber: ThrobberState::default(),
            message: message.into(),
        }
    }

    /// Begin a load. Starting while a load is in flight is a bug in the
    /// calling screen; debug builds assert, release builds ignore the
    /// second start and keep the first in-flight result.
    pub fn start(&mut self, make: impl FnOnce() -> Cmd) -> Option<Cmd> {
        if matches!(self.state, LoadingState::Loading) {
            debug_assert!(false, "loader started while already loading");
            return None;
        }
        self.state = LoadingState::Loading;
        Some(make())
    }

    pub fn complete(&mut self, value: T) {
        self.state = LoadingState::Done(value);
    }

    pub fn fail(&mut self, err: CoreError) {
        self.state = LoadingState::Failed(err);
    }

    /// Back to `NotStarted`. The only way out of `Failed`.
    pub fn reset(&mut self) {
        self.state = LoadingState::NotStarted;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadingState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            LoadingState::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            LoadingState::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match &self.state {
            LoadingState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Advance the spinner. Call on every tick.
    pub fn on_tick(&mut self) {
        if self.is_loading() {
            self.throbber.calc_next();
        }
    }

    /// Draw the spinner line (while loading) or the failure line.
    pub fn view_status(&mut self, frame: &mut Frame, area: Rect) {
        match &self.state {
            LoadingState::Loading => {
                let throbber = Throbber::default()
                    .label(self.message.clone())
                    .style(theme::loading())
                    .throbber_set(throbber_widgets_tui::BRAILLE_SIX);
                frame.render_stateful_widget(throbber, area, &mut self.throbber);
            }
            LoadingState::Failed(err) => {
                frame.render_widget(Span::styled(format!("error: {err}"), theme::error()), area);
            }
            LoadingState::NotStarted | LoadingState::Done(_) => {}
        }
    }
}
