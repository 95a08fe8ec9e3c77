//! Terminal input pump.
//!
//! A background task merges crossterm events with tick and render
//! pulses onto one channel, so the app loop has a single source to
//! await.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Spinner and housekeeping cadence.
    Tick,
    /// Frame cadence.
    Render,
}

/// Handle to the pump task. Dropping it shuts the task down.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(pump(tx, cancel.clone(), tick_rate, render_rate));
        Self { rx, cancel }
    }

    /// Next merged event, or `None` once the pump has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn pump(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    render_rate: Duration,
) {
    let mut input = EventStream::new();
    let mut ticks = tokio::time::interval(tick_rate);
    let mut frames = tokio::time::interval(render_rate);
    // Skip missed pulses rather than replaying a backlog.
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => return,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            Some(Ok(raw)) = input.next() => match raw {
                // Only key presses; release and repeat reports would
                // double keystrokes on terminals that emit them.
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                _ => continue,
            },
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}
