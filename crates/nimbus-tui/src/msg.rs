//! Messages and commands. Every state transition in the TUI is a [`Msg`];
//! every side effect a screen wants run is a [`Cmd`].

use crossterm::event::KeyEvent;
use futures::future::BoxFuture;
use nimbus_api::{DeviceGrant, LogEntry};
use nimbus_core::{CoreError, Resource, Workspace};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::screen::StackEntry;

/// Sender half of the single message channel the app loop drains.
pub type MsgSender = mpsc::UnboundedSender<Msg>;

/// Every state transition in the TUI is expressed as a Msg.
#[derive(Debug)]
pub enum Msg {
    // ── Lifecycle ──────────────────────────────────────────────────
    Key(KeyEvent),
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ─────────────────────────────────────────────────
    Push(StackEntry),
    Pop,
    Quit,
    /// Leave the TUI and print `message` on the restored terminal.
    Done { message: String },

    // ── Failures ───────────────────────────────────────────────────
    Error(CoreError),

    // ── Data events (from spawned commands) ────────────────────────
    GrantReady(DeviceGrant),
    LoginCompleted,
    WorkspacesLoaded(Vec<Workspace>),
    ResourceLoaded(Resource),
    ResourcesLoaded(Vec<Resource>),
    LogsLoaded(Vec<LogEntry>),
    LogLine(LogEntry),
    ActionCompleted(String),
}

/// A side effect requested by a screen.
///
/// Futures resolve to exactly one follow-up [`Msg`]. Streams get the
/// message sender plus the owning stack entry's cancellation token, so
/// popping the screen tears its workers down.
pub enum Cmd {
    Msg(Msg),
    Future(BoxFuture<'static, Msg>),
    Stream(Box<dyn FnOnce(MsgSender, CancellationToken) -> BoxFuture<'static, ()> + Send>),
    Batch(Vec<Cmd>),
}

impl Cmd {
    pub fn future(fut: impl Future<Output = Msg> + Send + 'static) -> Self {
        Self::Future(Box::pin(fut))
    }

    pub fn stream<F, Fut>(f: F) -> Self
    where
        F: FnOnce(MsgSender, CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Stream(Box::new(move |tx, cancel| Box::pin(f(tx, cancel))))
    }
}
