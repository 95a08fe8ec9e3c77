//! Device authorization login screen.
//!
//! Requests a grant, shows the user code and verification URL, then
//! polls the token endpoint until the operator approves in the browser.
//! On success the credentials are persisted and the screen pops itself,
//! revealing whatever was gated behind it.

use chrono::Utc;
use crossterm::event::KeyCode;
use nimbus_api::DeviceGrant;
use nimbus_core::{CoreError, api_config_for_token, poll_for_token};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::info;

use crate::loading::Loader;
use crate::msg::{Cmd, Msg};
use crate::screen::Screen;
use crate::screens::connect_anonymous;
use crate::theme;

enum Phase {
    Requesting,
    WaitingApproval(DeviceGrant),
    Done,
}

pub struct LoginScreen {
    phase: Phase,
    loader: Loader<()>,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            phase: Phase::Requesting,
            loader: Loader::new("contacting nimbus"),
        }
    }

    fn request_grant() -> Cmd {
        Cmd::future(async {
            let client = match connect_anonymous() {
                Ok(client) => client,
                Err(err) => return Msg::Error(err),
            };
            match client.create_device_grant().await {
                Ok(grant) => Msg::GrantReady(grant),
                Err(err) => Msg::Error(err.into()),
            }
        })
    }

    /// Long-running approval poll. Runs as a stream so popping the
    /// screen cancels the worker instead of leaving it polling in the
    /// background; credentials are only saved if the screen is still up.
    fn poll_until_approved(grant: DeviceGrant) -> Cmd {
        Cmd::stream(move |tx, cancel| async move {
            let client = match connect_anonymous() {
                Ok(client) => client,
                Err(err) => {
                    let _ = tx.send(Msg::Error(err));
                    return;
                }
            };

            let token = tokio::select! {
                () = cancel.cancelled() => return,
                result = poll_for_token(&grant, || client.device_token(&grant)) => {
                    match result {
                        Ok(token) => token,
                        Err(err) => {
                            let _ = tx.send(Msg::Error(err));
                            return;
                        }
                    }
                }
            };
            if cancel.is_cancelled() {
                return;
            }

            let mut config = nimbus_config::load_or_default();
            let host = nimbus_config::resolve_host(&config);
            config.set_api(api_config_for_token(&host, &token, Utc::now()));
            let msg = match nimbus_config::save(&config) {
                Ok(()) => {
                    info!("login completed, credentials saved");
                    Msg::LoginCompleted
                }
                Err(err) => Msg::Error(CoreError::from(err)),
            };
            let _ = tx.send(msg);
        })
    }
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for LoginScreen {
    fn init(&mut self) -> Option<Cmd> {
        self.loader.start(Self::request_grant)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::GrantReady(grant) => {
                self.loader.complete(());
                self.phase = Phase::WaitingApproval(grant.clone());
                Some(Self::poll_until_approved(grant))
            }
            Msg::LoginCompleted => {
                self.phase = Phase::Done;
                Some(Cmd::Msg(Msg::Pop))
            }
            Msg::Error(err) => {
                self.phase = Phase::Requesting;
                self.loader.fail(err);
                None
            }
            Msg::Tick => {
                self.loader.on_tick();
                None
            }
            Msg::Key(key) if key.code == KeyCode::Char('r') => {
                // Retry from scratch after a failure.
                self.loader.reset();
                self.phase = Phase::Requesting;
                self.loader.start(Self::request_grant)
            }
            _ => None,
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

        match &self.phase {
            Phase::Requesting => {
                self.loader.view_status(frame, rows[0]);
            }
            Phase::WaitingApproval(grant) => {
                frame.render_widget(
                    Paragraph::new("Complete your login in the browser, then return here."),
                    rows[0],
                );
                frame.render_widget(
                    Line::from(vec![
                        Span::styled("  Code: ", theme::dim()),
                        Span::styled(grant.user_code.clone(), theme::emphasis()),
                    ]),
                    rows[1],
                );
                frame.render_widget(
                    Line::from(vec![
                        Span::styled("  URL:  ", theme::dim()),
                        Span::raw(grant.verification_uri_complete.clone()),
                    ]),
                    rows[2],
                );
                frame.render_widget(
                    Span::styled("waiting for approval...", theme::loading()),
                    rows[3],
                );
            }
            Phase::Done => {
                frame.render_widget(Span::styled("Logged in.", theme::success()), rows[0]);
            }
        }
    }

    fn hints(&self) -> &'static str {
        "r retry  esc cancel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> DeviceGrant {
        DeviceGrant {
            device_code: "dev-1".into(),
            user_code: "ABCD-EFGH".into(),
            verification_uri: "https://nimbus.test/device".into(),
            verification_uri_complete: "https://nimbus.test/device?code=ABCD-EFGH".into(),
            expires_in: 900,
            interval: 5,
        }
    }

    #[test]
    fn grant_starts_a_cancellable_poll_worker() {
        let mut screen = LoginScreen::new();

        // The poll must run as a stream so the stack entry's token can
        // tear it down when the screen is popped mid-approval.
        let cmd = screen.update(Msg::GrantReady(grant()));
        assert!(matches!(cmd, Some(Cmd::Stream(_))));
        assert!(matches!(screen.phase, Phase::WaitingApproval(_)));
    }

    #[test]
    fn completed_login_pops_the_screen() {
        let mut screen = LoginScreen::new();
        let cmd = screen.update(Msg::LoginCompleted);
        assert!(matches!(cmd, Some(Cmd::Msg(Msg::Pop))));
        assert!(matches!(screen.phase, Phase::Done));
    }
}
