//! Resource list: every service, database, and key value store the
//! workspace can see, in one sorted table.
//!
//! Enter (or `l`) descends into logs for the selected resource; `r`
//! asks for confirmation and restarts it.

use crossterm::event::KeyCode;
use futures::FutureExt;
use nimbus_core::{Resource, ResourceQuery, ResourceService};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Row, Table, TableState};

use crate::loading::Loader;
use crate::msg::{Cmd, Msg};
use crate::screen::{Screen, StackEntry};
use crate::screens::{ConfirmScreen, LogsScreen, connect};
use crate::theme;

pub struct ResourceListScreen {
    query: ResourceQuery,
    loader: Loader<Vec<Resource>>,
    table: TableState,
}

impl ResourceListScreen {
    pub fn new(query: ResourceQuery) -> Self {
        Self {
            query,
            loader: Loader::new("loading resources"),
            table: TableState::default(),
        }
    }

    fn load(&self) -> Cmd {
        let query = self.query.clone();
        Cmd::future(async move {
            let client = match connect() {
                Ok(client) => client,
                Err(err) => return Msg::Error(err),
            };
            match ResourceService::new(client).list_all(&query).await {
                Ok(resources) => Msg::ResourcesLoaded(resources),
                Err(err) => Msg::Error(err),
            }
        })
    }

    fn selected(&self) -> Option<&Resource> {
        self.loader.value()?.get(self.table.selected()?)
    }

    fn open_logs(&self) -> Option<Cmd> {
        let resource = self.selected()?.clone();
        let breadcrumb = resource.breadcrumb();
        let entry = StackEntry::new(breadcrumb, Box::new(LogsScreen::new(resource)));
        Some(Cmd::Msg(Msg::Push(entry)))
    }

    fn confirm_restart(&self) -> Option<Cmd> {
        let resource = self.selected()?.clone();
        let id = resource.id.clone();
        let name = resource.name.clone();
        let entry = StackEntry::new(
            "Restart",
            Box::new(ConfirmScreen::new(
                format!("Restart {}?", resource.breadcrumb()),
                move || {
                    async move {
                        let client = match connect() {
                            Ok(client) => client,
                            Err(err) => return Msg::Error(err),
                        };
                        match ResourceService::new(client).restart(&id).await {
                            Ok(()) => Msg::ActionCompleted(format!("Restarted {name}")),
                            Err(err) => Msg::Error(err),
                        }
                    }
                    .boxed()
                },
            )),
        );
        Some(Cmd::Msg(Msg::Push(entry)))
    }
}

impl Screen for ResourceListScreen {
    fn init(&mut self) -> Option<Cmd> {
        let cmd = self.load();
        self.loader.start(move || cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::ResourcesLoaded(resources) => {
                if !resources.is_empty() && self.table.selected().is_none() {
                    self.table.select(Some(0));
                }
                self.loader.complete(resources);
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
                    self.table.select_next();
                    None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.table.select_previous();
                    None
                }
                KeyCode::Char('g') => {
                    self.table.select_first();
                    None
                }
                KeyCode::Char('G') => {
                    self.table.select_last();
                    None
                }
                KeyCode::Enter | KeyCode::Char('l') => self.open_logs(),
                KeyCode::Char('r') => self.confirm_restart(),
                KeyCode::Char('R') => {
                    self.loader.reset();
                    let cmd = self.load();
                    self.loader.start(move || cmd)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let Some(resources) = self.loader.value() else {
            self.loader.view_status(frame, area);
            return;
        };

        if resources.is_empty() {
            frame.render_widget(Span::styled("No resources found.", theme::dim()), area);
            return;
        }

        let rows: Vec<Row> = resources
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.name.clone()),
                    Cell::from(r.kind().to_string()),
                    Cell::from(r.environment_name.clone().unwrap_or_default()),
                    Cell::from(r.project_name.clone().unwrap_or_default()),
                    Cell::from(r.status().unwrap_or_default().to_owned()),
                    Cell::from(Span::styled(r.id.clone(), theme::dim())),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(14),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["Name", "Kind", "Environment", "Project", "Status", "ID"])
                    .style(theme::table_header()),
            )
            .row_highlight_style(theme::selected_row());

        let layout = Layout::vertical([Constraint::Min(1)]).split(area);
        frame.render_stateful_widget(table, layout[0], &mut self.table);
    }

    fn hints(&self) -> &'static str {
        "j/k move  enter logs  r restart  R reload  esc back"
    }
}
