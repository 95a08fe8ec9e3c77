//! Generic confirm-then-perform screen.
//!
//! Used for every mutating operation in interactive mode: restart,
//! job cancel. Shows a prompt, runs the operation on `y`/Enter, and
//! reports the outcome. `n` or Esc declines and pops back.

use crossterm::event::KeyCode;
use futures::future::BoxFuture;
use nimbus_core::CoreError;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::msg::{Cmd, Msg};
use crate::screen::Screen;
use crate::theme;

type Perform = Box<dyn FnOnce() -> BoxFuture<'static, Msg> + Send>;

enum Phase {
    Asking,
    Running,
    Done(String),
    Failed(CoreError),
}

pub struct ConfirmScreen {
    prompt: String,
    perform: Option<Perform>,
    phase: Phase,
    throbber: ThrobberState,
    /// When the screen is the whole session (one-shot commands), a
    /// dismissed outcome ends the session with the result message
    /// instead of popping back.
    standalone: bool,
}

impl ConfirmScreen {
    /// `perform` is built lazily; it only runs if the operator confirms.
    pub fn new<F>(prompt: impl Into<String>, perform: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Msg> + Send + 'static,
    {
        Self {
            prompt: prompt.into(),
            perform: Some(Box::new(perform)),
            phase: Phase::Asking,
            throbber: ThrobberState::default(),
            standalone: false,
        }
    }

    /// A confirm screen that is the root of its session.
    pub fn standalone<F>(prompt: impl Into<String>, perform: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Msg> + Send + 'static,
    {
        let mut screen = Self::new(prompt, perform);
        screen.standalone = true;
        screen
    }

    fn confirm(&mut self) -> Option<Cmd> {
        let perform = self.perform.take()?;
        self.phase = Phase::Running;
        Some(Cmd::Future(perform()))
    }
}

impl Screen for ConfirmScreen {
    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::ActionCompleted(message) => {
                self.phase = Phase::Done(message);
                None
            }
            Msg::Error(err) => {
                self.phase = Phase::Failed(err);
                None
            }
            Msg::Tick => {
                if matches!(self.phase, Phase::Running) {
                    self.throbber.calc_next();
                }
                None
            }
            Msg::Key(key) => match &self.phase {
                Phase::Asking => match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => self.confirm(),
                    KeyCode::Char('n') => Some(Cmd::Msg(Msg::Pop)),
                    _ => None,
                },
                // Any key dismisses the outcome.
                Phase::Done(message) if self.standalone => Some(Cmd::Msg(Msg::Done {
                    message: message.clone(),
                })),
                Phase::Done(_) | Phase::Failed(_) => Some(Cmd::Msg(Msg::Pop)),
                Phase::Running => None,
            },
            _ => None,
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

        match &self.phase {
            Phase::Asking => {
                frame.render_widget(Paragraph::new(self.prompt.clone()), rows[0]);
                frame.render_widget(
                    Span::styled("y confirm    n cancel", theme::key_hint()),
                    rows[1],
                );
            }
            Phase::Running => {
                let throbber = Throbber::default()
                    .label("working")
                    .style(theme::loading())
                    .throbber_set(throbber_widgets_tui::BRAILLE_SIX);
                frame.render_stateful_widget(throbber, rows[0], &mut self.throbber);
            }
            Phase::Done(message) => {
                frame.render_widget(Span::styled(message.clone(), theme::success()), rows[0]);
                frame.render_widget(
                    Span::styled("press any key to continue", theme::key_hint()),
                    rows[1],
                );
            }
            Phase::Failed(err) => {
                frame.render_widget(
                    Span::styled(format!("error: {err}"), theme::error()),
                    rows[0],
                );
                frame.render_widget(
                    Span::styled("press any key to continue", theme::key_hint()),
                    rows[1],
                );
            }
        }
    }

    fn hints(&self) -> &'static str {
        "y confirm  n cancel  esc back"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use futures::FutureExt;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn confirm_screen() -> ConfirmScreen {
        ConfirmScreen::new("Restart web?", || {
            async { Msg::ActionCompleted("Restarted web".into()) }.boxed()
        })
    }

    #[test]
    fn yes_runs_the_operation_once() {
        let mut s = confirm_screen();
        let cmd = s.update(Msg::Key(key(KeyCode::Char('y'))));
        assert!(matches!(cmd, Some(Cmd::Future(_))));
        assert!(matches!(s.phase, Phase::Running));

        // A second confirm has nothing left to run.
        let again = s.update(Msg::Key(key(KeyCode::Char('y'))));
        assert!(again.is_none());
    }

    #[test]
    fn no_pops_without_running() {
        let mut s = confirm_screen();
        let cmd = s.update(Msg::Key(key(KeyCode::Char('n'))));
        assert!(matches!(cmd, Some(Cmd::Msg(Msg::Pop))));
        assert!(s.perform.is_some(), "declined operation must not run");
    }

    #[test]
    fn outcome_dismisses_on_any_key() {
        let mut s = confirm_screen();
        s.update(Msg::Key(key(KeyCode::Enter)));
        s.update(Msg::ActionCompleted("done".into()));
        let cmd = s.update(Msg::Key(key(KeyCode::Char('x'))));
        assert!(matches!(cmd, Some(Cmd::Msg(Msg::Pop))));
    }

    #[test]
    fn standalone_outcome_ends_the_session_with_the_message() {
        let mut s = ConfirmScreen::standalone("Restart web?", || {
            async { Msg::ActionCompleted("Restarted web".into()) }.boxed()
        });
        s.update(Msg::Key(key(KeyCode::Enter)));
        s.update(Msg::ActionCompleted("Restarted web".into()));
        let cmd = s.update(Msg::Key(key(KeyCode::Enter)));
        assert!(matches!(cmd, Some(Cmd::Msg(Msg::Done { .. }))));
    }

    #[test]
    fn failure_is_shown_then_dismissed() {
        let mut s = confirm_screen();
        s.update(Msg::Key(key(KeyCode::Enter)));
        s.update(Msg::Error(nimbus_core::CoreError::validation("nope")));
        assert!(matches!(s.phase, Phase::Failed(_)));
        let cmd = s.update(Msg::Key(key(KeyCode::Enter)));
        assert!(matches!(cmd, Some(Cmd::Msg(Msg::Pop))));
    }
}
