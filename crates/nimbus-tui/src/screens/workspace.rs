//! Workspace picker.
//!
//! Lists the workspaces the operator belongs to; selecting one persists
//! it and pops back to whatever was gated behind the picker.

use crossterm::event::KeyCode;
use nimbus_core::{CoreError, Workspace};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};
use tracing::info;

use crate::loading::Loader;
use crate::msg::{Cmd, Msg};
use crate::screen::Screen;
use crate::screens::connect;
use crate::theme;

pub struct WorkspaceScreen {
    loader: Loader<Vec<Workspace>>,
    list: ListState,
}

impl WorkspaceScreen {
    pub fn new() -> Self {
        Self {
            loader: Loader::new("loading workspaces"),
            list: ListState::default(),
        }
    }

    fn load() -> Cmd {
        Cmd::future(async {
            let client = match connect() {
                Ok(client) => client,
                Err(err) => return Msg::Error(err),
            };
            match client.list_owners().await {
                Ok(owners) => {
                    Msg::WorkspacesLoaded(owners.into_iter().map(Workspace::from).collect())
                }
                Err(err) => Msg::Error(err.into()),
            }
        })
    }

    fn select_current(&mut self) -> Option<Cmd> {
        let workspaces = self.loader.value()?;
        let workspace = workspaces.get(self.list.selected()?)?.clone();

        let mut config = nimbus_config::load_or_default();
        config.set_workspace(workspace.id.clone(), workspace.name.clone());
        if let Err(err) = nimbus_config::save(&config) {
            return Some(Cmd::Msg(Msg::Error(CoreError::from(err))));
        }
        info!(workspace = %workspace.name, "workspace selected");
        Some(Cmd::Msg(Msg::Pop))
    }
}

impl Default for WorkspaceScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for WorkspaceScreen {
    fn init(&mut self) -> Option<Cmd> {
        self.loader.start(Self::load)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::WorkspacesLoaded(workspaces) => {
                if !workspaces.is_empty() {
                    self.list.select(Some(0));
                }
                self.loader.complete(workspaces);
                None
            }
            Msg::Error(err) => {
                self.loader.fail(err);
                None
            }
            Msg::Tick => {
                self.loader.on_tick();
                None
            }
            Msg::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.list.select_next();
                    None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.list.select_previous();
                    None
                }
                KeyCode::Enter => self.select_current(),
                KeyCode::Char('R') => {
                    self.loader.reset();
                    self.loader.start(Self::load)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(area);

        frame.render_widget(
            Span::styled("Select a workspace", theme::header()),
            rows[0],
        );

        if let Some(workspaces) = self.loader.value() {
            let items: Vec<ListItem> = workspaces
                .iter()
                .map(|w| {
                    ListItem::new(Line::from(vec![
                        Span::raw(w.name.clone()),
                        Span::styled(format!("  {}", w.id), theme::dim()),
                    ]))
                })
                .collect();
            let list = List::new(items).highlight_style(theme::selected_row());
            frame.render_stateful_widget(list, rows[1], &mut self.list);
        } else {
            self.loader.view_status(frame, rows[1]);
        }
    }

    fn hints(&self) -> &'static str {
        "j/k move  enter select  R reload  esc back"
    }
}
