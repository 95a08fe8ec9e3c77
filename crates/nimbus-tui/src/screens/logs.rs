//! Log viewer for one resource.
//!
//! Loads a page of recent history, then optionally tails the live
//! stream (`t`). The tail worker is tied to both the screen's own
//! toggle token and the stack entry's token, so either `t` or popping
//! the screen tears the connection down. `/` opens a filter overlay
//! applied to the visible lines.

use crossterm::event::{KeyCode, KeyEvent};
use nimbus_api::{ListLogsParams, LogEntry};
use nimbus_core::{Resource, ResourceService};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::loading::Loader;
use crate::msg::{Cmd, Msg};
use crate::screen::Screen;
use crate::screens::{connect, workspace_id};
use crate::theme;

/// Keep at most this many lines in memory.
const MAX_LINES: usize = 2_000;
const PAGE_LIMIT: u32 = 100;

pub struct LogsScreen {
    resource_id: String,
    /// False while only an ID is known; the screen looks the resource
    /// up itself on init, behind the stack's login gates.
    resolved: bool,
    loader: Loader<()>,
    entries: Vec<LogEntry>,
    /// Lines scrolled up from the bottom. Zero means follow.
    scroll_back: usize,
    tailing: bool,
    tail_cancel: Option<CancellationToken>,
    filter: String,
    filter_input: Option<Input>,
}

impl LogsScreen {
    pub fn new(resource: Resource) -> Self {
        Self::build(resource.id, true)
    }

    /// Open for a bare resource ID. The lookup runs inside the session,
    /// after any login gates have been satisfied.
    pub fn from_id(resource_id: String) -> Self {
        Self::build(resource_id, false)
    }

    fn build(resource_id: String, resolved: bool) -> Self {
        Self {
            resource_id,
            resolved,
            loader: Loader::new("loading logs"),
            entries: Vec::new(),
            scroll_back: 0,
            tailing: false,
            tail_cancel: None,
            filter: String::new(),
            filter_input: None,
        }
    }

    fn params(&self) -> ListLogsParams {
        ListLogsParams {
            resource_ids: vec![self.resource_id.clone()],
            limit: PAGE_LIMIT,
            ..Default::default()
        }
    }

    fn resolve(&self) -> Cmd {
        let id = self.resource_id.clone();
        Cmd::future(async move {
            let client = match connect() {
                Ok(client) => client,
                Err(err) => return Msg::Error(err),
            };
            match ResourceService::new(client).get(&id).await {
                Ok(resource) => Msg::ResourceLoaded(resource),
                Err(err) => Msg::Error(err),
            }
        })
    }

    fn load_history(&self) -> Cmd {
        let mut params = self.params();
        Cmd::future(async move {
            let client = match connect() {
                Ok(client) => client,
                Err(err) => return Msg::Error(err),
            };
            params.owner_id = match workspace_id() {
                Ok(id) => id,
                Err(err) => return Msg::Error(err),
            };
            match client.list_logs(&params).await {
                Ok(page) => {
                    // Backward reads return newest first; display oldest first.
                    let mut logs = page.logs;
                    logs.reverse();
                    Msg::LogsLoaded(logs)
                }
                Err(err) => Msg::Error(err.into()),
            }
        })
    }

    fn start_tail(&mut self) -> Cmd {
        let mut params = self.params();
        let own = CancellationToken::new();
        self.tail_cancel = Some(own.clone());
        self.tailing = true;

        Cmd::stream(move |tx, entry_cancel| async move {
            let client = match connect() {
                Ok(client) => client,
                Err(err) => {
                    let _ = tx.send(Msg::Error(err));
                    return;
                }
            };
            params.owner_id = match workspace_id() {
                Ok(id) => id,
                Err(err) => {
                    let _ = tx.send(Msg::Error(err));
                    return;
                }
            };

            let mut rx = match client.tail_logs(&params, own.clone()).await {
                Ok(rx) => rx,
                Err(err) => {
                    let _ = tx.send(Msg::Error(err.into()));
                    return;
                }
            };

            loop {
                tokio::select! {
                    () = entry_cancel.cancelled() => {
                        own.cancel();
                        break;
                    }
                    entry = rx.recv() => match entry {
                        Some(entry) => {
                            if tx.send(Msg::LogLine(entry)).is_err() {
                                own.cancel();
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            debug!("log tail worker finished");
        })
    }

    fn stop_tail(&mut self) {
        if let Some(cancel) = self.tail_cancel.take() {
            cancel.cancel();
        }
        self.tailing = false;
    }

    fn push_line(&mut self, entry: LogEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_LINES {
            let excess = self.entries.len() - MAX_LINES;
            self.entries.drain(..excess);
        }
    }

    fn visible(&self) -> Vec<&LogEntry> {
        if self.filter.is_empty() {
            self.entries.iter().collect()
        } else {
            self.entries
                .iter()
                .filter(|e| e.message.contains(self.filter.as_str()))
                .collect()
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<Cmd> {
        // The overlay swallows every key while open.
        let Some(input) = self.filter_input.as_mut() else {
            return None;
        };
        if key.code == KeyCode::Enter {
            self.filter = input.value().to_owned();
            self.filter_input = None;
        } else {
            input.handle_event(&crossterm::event::Event::Key(key));
        }
        None
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Cmd> {
        if self.filter_input.is_some() {
            return self.handle_filter_key(key);
        }
        match key.code {
            KeyCode::Char('t') => {
                if self.tailing {
                    self.stop_tail();
                    None
                } else {
                    Some(self.start_tail())
                }
            }
            KeyCode::Char('/') => {
                self.filter_input = Some(Input::new(self.filter.clone()));
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_back = (self.scroll_back + 1).min(self.entries.len());
                None
            }
            KeyCode::Char('G') => {
                self.scroll_back = 0;
                None
            }
            KeyCode::Char('R') => {
                self.entries.clear();
                self.loader.reset();
                let cmd = self.load_history();
                self.loader.start(move || cmd)
            }
            _ => None,
        }
    }
}

impl Screen for LogsScreen {
    fn init(&mut self) -> Option<Cmd> {
        let cmd = if self.resolved {
            self.load_history()
        } else {
            self.resolve()
        };
        self.loader.start(move || cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::ResourceLoaded(resource) => {
                self.resource_id = resource.id;
                self.resolved = true;
                self.loader.reset();
                let cmd = self.load_history();
                self.loader.start(move || cmd)
            }
            Msg::LogsLoaded(logs) => {
                self.loader.complete(());
                for entry in logs {
                    self.push_line(entry);
                }
                None
            }
            Msg::LogLine(entry) => {
                self.push_line(entry);
                None
            }
            Msg::Error(err) => {
                self.loader.fail(err);
                self.tailing = false;
                None
            }
            Msg::Tick => {
                self.loader.on_tick();
                None
            }
            Msg::Key(key) => self.handle_key(key),
            _ => None,
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
        let log_area = rows[0];
        let status_area = rows[1];

        if self.loader.is_loading() || self.loader.error().is_some() {
            self.loader.view_status(frame, log_area);
        } else {
            let visible = self.visible();
            let height = usize::from(log_area.height);
            let end = visible.len().saturating_sub(self.scroll_back);
            let start = end.saturating_sub(height);
            let items: Vec<ListItem> = visible[start..end]
                .iter()
                .map(|e| {
                    let level = e.level.as_deref().unwrap_or("");
                    ListItem::new(Line::from(vec![
                        Span::styled(e.timestamp.format("%H:%M:%S ").to_string(), theme::dim()),
                        Span::styled(format!("{level:<6}"), level_style(level)),
                        Span::raw(e.message.clone()),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(items), log_area);
        }

        if let Some(input) = &self.filter_input {
            frame.render_widget(
                Line::from(vec![
                    Span::styled("filter: ", theme::emphasis()),
                    Span::raw(input.value().to_owned()),
                ]),
                status_area,
            );
        } else {
            let mut spans = vec![if self.tailing {
                Span::styled("● tailing", theme::success())
            } else {
                Span::styled("○ paused", theme::dim())
            }];
            if !self.filter.is_empty() {
                spans.push(Span::styled(
                    format!("  filter: {}", self.filter),
                    theme::dim(),
                ));
            }
            frame.render_widget(Line::from(spans), status_area);
        }
    }

    fn on_back(&mut self) -> bool {
        // Esc closes the filter overlay before it pops the screen.
        if self.filter_input.take().is_some() {
            return true;
        }
        false
    }

    fn hints(&self) -> &'static str {
        "t tail  / filter  j/k scroll  G bottom  R reload  esc back"
    }
}

fn level_style(level: &str) -> ratatui::style::Style {
    match level {
        "error" => theme::error(),
        "warning" | "warn" => theme::loading(),
        _ => theme::dim(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::{KeyCode, KeyModifiers};
    use nimbus_core::ResourceDetail;

    fn screen() -> LogsScreen {
        LogsScreen::new(Resource {
            id: "srv-1".into(),
            name: "web".into(),
            environment_name: None,
            project_name: None,
            detail: ResourceDetail::Service {
                service_type: None,
                suspended: None,
            },
        })
    }

    fn line(message: &str) -> LogEntry {
        LogEntry {
            id: "log-1".into(),
            timestamp: Utc::now(),
            message: message.into(),
            level: None,
            labels: Vec::new(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn filter_limits_visible_lines() {
        let mut s = screen();
        s.update(Msg::LogLine(line("GET / 200")));
        s.update(Msg::LogLine(line("connection reset")));
        s.filter = "GET".into();
        let visible = s.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "GET / 200");
    }

    #[test]
    fn back_closes_the_filter_overlay_first() {
        let mut s = screen();
        s.handle_key(key(KeyCode::Char('/')));
        assert!(s.filter_input.is_some());

        // First Esc is consumed by the overlay, second pops the screen.
        assert!(s.on_back());
        assert!(s.filter_input.is_none());
        assert!(!s.on_back());
    }

    #[test]
    fn overlay_swallows_screen_keys() {
        let mut s = screen();
        s.handle_key(key(KeyCode::Char('/')));
        // 't' must type into the filter, not toggle tailing.
        s.handle_key(key(KeyCode::Char('t')));
        assert!(!s.tailing);
        assert_eq!(s.filter_input.as_ref().unwrap().value(), "t");
    }

    #[test]
    fn enter_applies_the_filter() {
        let mut s = screen();
        s.handle_key(key(KeyCode::Char('/')));
        s.handle_key(key(KeyCode::Char('5')));
        s.handle_key(key(KeyCode::Char('0')));
        s.handle_key(key(KeyCode::Enter));
        assert_eq!(s.filter, "50");
        assert!(s.filter_input.is_none());
    }

    #[test]
    fn line_buffer_is_capped() {
        let mut s = screen();
        for i in 0..(MAX_LINES + 50) {
            s.push_line(line(&format!("line {i}")));
        }
        assert_eq!(s.entries.len(), MAX_LINES);
        assert_eq!(s.entries[0].message, "line 50");
    }

    #[test]
    fn bare_id_resolves_the_resource_before_loading_history() {
        let mut s = LogsScreen::from_id("srv-9".into());
        assert!(!s.resolved);

        // Init looks the resource up instead of fetching logs blind.
        assert!(matches!(s.init(), Some(Cmd::Future(_))));

        let resource = Resource {
            id: "srv-9".into(),
            name: "worker".into(),
            environment_name: None,
            project_name: None,
            detail: ResourceDetail::Service {
                service_type: None,
                suspended: None,
            },
        };
        let cmd = s.update(Msg::ResourceLoaded(resource));
        assert!(s.resolved);
        assert!(matches!(cmd, Some(Cmd::Future(_))));
        assert!(s.loader.is_loading());
    }

    #[test]
    fn toggling_tail_off_cancels_the_worker_token() {
        let mut s = screen();
        let _cmd = s.start_tail();
        let token = s.tail_cancel.clone().unwrap();
        assert!(s.tailing);
        assert!(!token.is_cancelled());

        s.stop_tail();
        assert!(token.is_cancelled());
        assert!(!s.tailing);
    }
}
