//! Command handlers. Each submodule owns one subcommand and runs it in
//! whichever mode the session resolved to.

pub mod config_cmd;
pub mod jobs;
pub mod login;
pub mod logs;
pub mod resources;
pub mod workspace;
