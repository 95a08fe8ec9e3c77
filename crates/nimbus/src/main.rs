//! Entry point: parse, resolve the session mode, dispatch.

mod cli;
mod commands;
mod error;
mod output;
mod session;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigCommand, JobsCommand, WorkspaceCommand};
use crate::error::CliError;
use crate::session::Session;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let session = Session::resolve(&cli.global);
    let _guard = init_tracing(cli.global.verbose, session.interactive);
    tracing::debug!(interactive = session.interactive, "session resolved");

    if let Err(err) = run(cli.command, session).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(command: Command, session: Session) -> Result<(), CliError> {
    match command {
        Command::Login => commands::login::run(session).await,
        Command::List(args) => commands::resources::list(session, args).await,
        Command::Restart { resource_id } => {
            commands::resources::restart(session, resource_id).await
        }
        Command::Jobs {
            command: JobsCommand::Cancel { service_id, job_id },
        } => commands::jobs::cancel(session, service_id, job_id).await,
        Command::Logs(args) => commands::logs::run(session, args).await,
        Command::Workspace { command } => match command {
            WorkspaceCommand::Set { id } => commands::workspace::set(session, id).await,
            WorkspaceCommand::Show => commands::workspace::show(session),
        },
        Command::Config { command } => match command {
            ConfigCommand::Show => commands::config_cmd::show(session),
            ConfigCommand::Path => {
                commands::config_cmd::path();
                Ok(())
            }
        },
        Command::Completions { shell } => {
            completions(shell);
            Ok(())
        }
    }
}

fn completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Interactive sessions log to a file; writing to stderr would tear up
/// the alternate screen.
fn init_tracing(verbose: u8, interactive: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if interactive {
        let appender = tracing_appender::rolling::never(std::env::temp_dir(), "nimbus.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        None
    }
}
