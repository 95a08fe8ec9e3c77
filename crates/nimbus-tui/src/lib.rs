//! Interactive session engine for the Nimbus CLI.
//!
//! The `nimbus` binary drives this crate when a command runs on a real
//! terminal: it builds a [`StackEntry`] for the command's screen, lets
//! [`gate`] prepend login / workspace setup screens, and hands the
//! stack to [`App::run`]. Screens communicate exclusively through
//! [`Msg`] / [`Cmd`]; all task spawning and terminal handling lives in
//! the app loop.

pub mod app;
pub mod event;
pub mod gate;
pub mod loading;
pub mod msg;
pub mod screen;
pub mod screens;
pub mod stack;
pub mod term;
pub mod theme;

pub use app::{App, Outcome};
pub use gate::{Gate, GateRequirement, missing_gates};
pub use loading::{Loader, LoadingState};
pub use msg::{Cmd, Msg, MsgSender};
pub use screen::{Screen, StackEntry};
pub use stack::ScreenStack;
pub use term::{Tui, install_hooks};
