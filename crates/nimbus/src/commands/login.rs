//! Device authorization login.
//!
//! Interactive mode runs the login screen. Non-interactive mode prints
//! the verification URL and code, then polls with a spinner until the
//! grant is approved or expires.

use std::time::Duration;

use chrono::Utc;
use indicatif::ProgressBar;
use nimbus_core::{CoreError, api_config_for_token, poll_for_token};
use nimbus_tui::GateRequirement;
use nimbus_tui::screens::LoginScreen;
use owo_colors::OwoColorize;

use crate::error::CliError;
use crate::session::{self, Session};

pub async fn run(session: Session) -> Result<(), CliError> {
    // A still-valid key short-circuits the whole flow.
    let config = nimbus_config::load_or_default();
    if nimbus_config::resolve_api_key(&config, Utc::now()).is_ok() {
        println!("Already logged in.");
        return Ok(());
    }

    if session.interactive {
        session::run_app(
            "Login",
            Box::new(LoginScreen::new()),
            GateRequirement::default(),
        )
        .await?;
        // The screen pops itself once the token is saved; an aborted
        // session leaves the config without a usable key.
        let config = nimbus_config::load_or_default();
        if nimbus_config::resolve_api_key(&config, Utc::now()).is_ok() {
            println!("Logged in.");
        }
        return Ok(());
    }

    let client = session::anonymous_client()?;
    let grant = client.create_device_grant().await.map_err(CoreError::from)?;

    println!(
        "Open {} and enter the code {}",
        grant.verification_uri,
        grant.user_code.bold()
    );
    println!("Or visit {}", grant.verification_uri_complete);

    let spinner = ProgressBar::new_spinner().with_message("Waiting for approval...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = poll_for_token(&grant, || client.device_token(&grant)).await;
    spinner.finish_and_clear();
    let token = result?;

    let mut config = nimbus_config::load_or_default();
    let host = nimbus_config::resolve_host(&config);
    config.set_api(api_config_for_token(&host, &token, Utc::now()));
    nimbus_config::save(&config)?;
    println!("Logged in.");
    Ok(())
}
