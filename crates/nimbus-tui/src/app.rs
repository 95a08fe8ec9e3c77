//! The session loop.
//!
//! One unbounded channel carries every [`Msg`]; the loop drains it,
//! routes navigation messages itself, and hands everything else to the
//! top screen. Commands returned by screens are spawned here, so
//! screens stay free of tasks and terminals.

use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Span};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::event::{Event, EventReader};
use crate::msg::{Cmd, Msg, MsgSender};
use crate::screen::StackEntry;
use crate::stack::ScreenStack;
use crate::term::Tui;
use crate::theme;

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operator backed out or quit; nothing to report.
    Quit,
    /// A command finished with a message to print on the plain terminal.
    Done { message: String },
}

pub struct App {
    stack: ScreenStack,
    msg_tx: MsgSender,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    running: bool,
    outcome: Outcome,
}

impl App {
    /// Build an app over the given entries, bottom first. The last
    /// entry starts on top (gates go after their target).
    pub fn new(entries: Vec<StackEntry>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let mut stack = ScreenStack::new();
        for entry in entries {
            stack.push(entry);
        }
        Self {
            stack,
            msg_tx,
            msg_rx,
            running: true,
            outcome: Outcome::Quit,
        }
    }

    /// A sender for injecting messages from outside the loop (tests).
    pub fn sender(&self) -> MsgSender {
        self.msg_tx.clone()
    }

    /// Run the session until the stack empties or a command finishes.
    pub async fn run(mut self) -> Result<Outcome> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_top();

        let mut events = EventReader::new(
            Duration::from_millis(250), // spinner tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("session loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(w, h) => {
                    let _ = self.msg_tx.send(Msg::Resize(w, h));
                }
                Event::Tick => {
                    let _ = self.msg_tx.send(Msg::Tick);
                }
                Event::Render => {
                    let _ = self.msg_tx.send(Msg::Render);
                }
            }

            // Drain queued messages, including results from spawned
            // commands that arrived since the last event.
            while let Ok(msg) = self.msg_rx.try_recv() {
                if matches!(msg, Msg::Render) {
                    tui.draw(|frame| self.render(frame))?;
                } else {
                    self.process(msg);
                }
            }
        }

        events.stop();
        tui.exit()?;
        info!("session loop ended");
        Ok(self.outcome)
    }

    /// Global keys first; everything else goes to the top screen.
    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            let _ = self.msg_tx.send(Msg::Quit);
            return;
        }
        if key.code == KeyCode::Esc {
            // The screen may consume Esc (close an overlay); otherwise
            // it unwinds one level.
            if let Some(entry) = self.stack.top_mut() {
                if entry.screen.on_back() {
                    return;
                }
            }
            let _ = self.msg_tx.send(Msg::Pop);
            return;
        }
        let _ = self.msg_tx.send(Msg::Key(key));
    }

    fn process(&mut self, msg: Msg) {
        match msg {
            Msg::Push(entry) => {
                self.stack.push(entry);
                self.init_top();
            }
            Msg::Pop => {
                self.stack.pop();
                if self.stack.is_empty() {
                    self.running = false;
                } else {
                    // A gate beneath may activate for the first time here.
                    self.init_top();
                }
            }
            Msg::Quit => {
                self.running = false;
            }
            Msg::Done { message } => {
                self.outcome = Outcome::Done { message };
                self.running = false;
            }
            Msg::Resize(w, h) => {
                debug!(width = w, height = h, "terminal resized");
            }
            Msg::Render => {}
            other => {
                if let Some(entry) = self.stack.top_mut() {
                    if let Some(cmd) = entry.screen.update(other) {
                        self.dispatch(cmd);
                    }
                }
            }
        }
    }

    /// Initialize the top entry if it has not been active before.
    fn init_top(&mut self) {
        let Some(entry) = self.stack.top_mut() else {
            return;
        };
        if entry.initialized {
            return;
        }
        entry.initialized = true;
        if let Some(cmd) = entry.screen.init() {
            self.dispatch(cmd);
        }
    }

    fn dispatch(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::Msg(msg) => {
                let _ = self.msg_tx.send(msg);
            }
            Cmd::Future(fut) => {
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(fut.await);
                });
            }
            Cmd::Stream(start) => {
                let tx = self.msg_tx.clone();
                let cancel = self
                    .stack
                    .top_mut()
                    .map(|entry| entry.cancel.clone())
                    .unwrap_or_default();
                tokio::spawn(start(tx, cancel));
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.dispatch(cmd);
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Length(1), // breadcrumbs
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // key hints
        ])
        .split(frame.area());

        frame.render_widget(
            Span::styled(format!(" {}", self.stack.breadcrumbs()), theme::header()),
            layout[0],
        );

        let hints = self
            .stack
            .top_mut()
            .map(|entry| entry.screen.hints())
            .unwrap_or_default();
        frame.render_widget(
            Line::from(vec![
                Span::styled(format!(" {hints}"), theme::key_hint()),
                Span::styled("  ctrl+c quit", theme::key_hint()),
            ]),
            layout[2],
        );

        if let Some(entry) = self.stack.top_mut() {
            entry.screen.view(frame, layout[1]);
        }
    }
}
