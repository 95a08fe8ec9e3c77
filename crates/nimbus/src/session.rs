//! Session context and the dual-mode command executor.
//!
//! Every command runs in one of two modes. Interactive mode builds a
//! screen, lets the gate chain prepend login / workspace setup, and
//! hands the stack to the full-screen session loop. Non-interactive
//! mode talks to the API directly and prints in the selected format.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use nimbus_api::NimbusClient;
use nimbus_core::CoreError;
use nimbus_tui::screens::ConfirmScreen;
use nimbus_tui::{App, GateRequirement, Msg, Outcome, Screen, StackEntry, missing_gates};
use url::Url;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Resolved execution context for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub format: OutputFormat,
    pub interactive: bool,
    pub yes: bool,
}

impl Session {
    pub fn resolve(global: &GlobalOpts) -> Self {
        let format = resolve_format(global.output);
        Self {
            format,
            interactive: format == OutputFormat::Interactive,
            yes: global.confirm,
        }
    }
}

/// Interactive output needs a real terminal; pipes and CI runs get
/// plain text instead.
fn resolve_format(requested: OutputFormat) -> OutputFormat {
    if requested == OutputFormat::Interactive
        && (!io::stdout().is_terminal() || std::env::var("CI").is_ok())
    {
        return OutputFormat::Text;
    }
    requested
}

/// Authenticated client for direct command paths.
pub fn client() -> Result<Arc<NimbusClient>, CliError> {
    let config = nimbus_config::load_or_default();
    let key = nimbus_config::resolve_api_key(&config, Utc::now())?;
    let host = nimbus_config::resolve_host(&config);
    let url = parse_host(&host)?;
    let client = NimbusClient::new(url, Some(key)).map_err(CoreError::from)?;
    Ok(Arc::new(client))
}

/// Authenticated client with core errors, for closures whose results
/// feed interactive screens.
pub fn core_client() -> Result<Arc<NimbusClient>, CoreError> {
    let config = nimbus_config::load_or_default();
    let key = nimbus_config::resolve_api_key(&config, Utc::now())?;
    let host = nimbus_config::resolve_host(&config);
    let url = Url::parse(&host)
        .map_err(|e| CoreError::config(format!("invalid API host '{host}': {e}")))?;
    Ok(Arc::new(NimbusClient::new(url, Some(key))?))
}

/// Unauthenticated client; the device flow needs no key.
pub fn anonymous_client() -> Result<Arc<NimbusClient>, CliError> {
    let config = nimbus_config::load_or_default();
    let host = nimbus_config::resolve_host(&config);
    let url = parse_host(&host)?;
    let client = NimbusClient::new(url, None).map_err(CoreError::from)?;
    Ok(Arc::new(client))
}

/// The selected workspace ID, required for log queries.
pub fn workspace_id() -> Result<String, CliError> {
    let config = nimbus_config::load_or_default();
    Ok(config.workspace()?.id.clone())
}

fn parse_host(host: &str) -> Result<Url, CliError> {
    Url::parse(host).map_err(|e| CliError::Config {
        message: format!("invalid API host '{host}': {e}"),
    })
}

/// Ask for confirmation on the plain terminal.
///
/// `--confirm` short-circuits to yes. Without it, a non-terminal stdin
/// is an error rather than a silent yes.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::ConfirmationRequired);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Terminal {
            message: e.to_string(),
        })
}

/// Run an interactive session over `screen`, prepending whatever gate
/// screens the current config calls for.
pub async fn run_app(
    breadcrumb: impl Into<String>,
    screen: Box<dyn Screen>,
    requirement: GateRequirement,
) -> Result<Outcome, CliError> {
    nimbus_tui::install_hooks().map_err(|e| CliError::Terminal {
        message: e.to_string(),
    })?;
    let config = nimbus_config::load_or_default();
    let mut entries = vec![StackEntry::new(breadcrumb, screen)];
    for gate in missing_gates(&config, Utc::now(), requirement) {
        entries.push(gate.entry());
    }
    App::new(entries)
        .run()
        .await
        .map_err(|e| CliError::Terminal {
            message: e.to_string(),
        })
}

/// Print the final message of a finished session, if any.
pub fn report(outcome: &Outcome) {
    if let Outcome::Done { message } = outcome {
        println!("{message}");
    }
}

/// Run a mutating operation in the mode the session calls for.
///
/// Interactive mode shows a confirm screen; declining pops back out.
/// Non-interactive mode prompts on the terminal (unless `--confirm`)
/// and prints the result message.
pub async fn run_confirmed<F, Fut>(
    session: Session,
    breadcrumb: &'static str,
    prompt: String,
    perform: F,
) -> Result<(), CliError>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<String, CoreError>> + Send + 'static,
{
    if session.interactive {
        let screen = ConfirmScreen::standalone(prompt, move || {
            async move {
                match perform().await {
                    Ok(message) => Msg::ActionCompleted(message),
                    Err(err) => Msg::Error(err),
                }
            }
            .boxed()
        });
        let outcome = run_app(breadcrumb, Box::new(screen), GateRequirement::login_only()).await?;
        report(&outcome);
        return Ok(());
    }

    if !confirm(&prompt, session.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    let message = perform().await?;
    println!("{message}");
    Ok(())
}
