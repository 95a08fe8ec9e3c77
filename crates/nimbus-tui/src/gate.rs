//! Precondition gates for interactive sessions.
//!
//! Commands declare what they need (a valid login, a selected
//! workspace); the gates inspect the config and produce setup screens
//! to push on top of the target screen. The login gate sits outermost,
//! so an operator who is neither logged in nor scoped sees login first,
//! then the workspace picker, then the screen they asked for.

use chrono::{DateTime, Utc};
use nimbus_config::Config;

use crate::screen::StackEntry;
use crate::screens::{LoginScreen, WorkspaceScreen};

/// What a command needs before its screen may run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateRequirement {
    pub login: bool,
    pub workspace: bool,
}

impl GateRequirement {
    /// Login plus workspace; what almost every command needs.
    pub fn full() -> Self {
        Self {
            login: true,
            workspace: true,
        }
    }

    pub fn login_only() -> Self {
        Self {
            login: true,
            workspace: false,
        }
    }
}

/// A precondition that is not currently satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Login,
    Workspace,
}

impl Gate {
    pub fn entry(self) -> StackEntry {
        match self {
            Self::Login => StackEntry::new("Login", Box::new(LoginScreen::new())),
            Self::Workspace => StackEntry::new("Workspace", Box::new(WorkspaceScreen::new())),
        }
    }
}

/// The gates `config` fails to satisfy, in push order.
///
/// Push order is innermost first: the workspace picker goes on the
/// stack before the login screen, leaving login on top.
pub fn missing_gates(config: &Config, now: DateTime<Utc>, req: GateRequirement) -> Vec<Gate> {
    let mut gates = Vec::new();
    if req.workspace && config.workspace.is_none() {
        gates.push(Gate::Workspace);
    }
    if req.login && nimbus_config::resolve_api_key(config, now).is_err() {
        gates.push(Gate::Login);
    }
    gates
}
