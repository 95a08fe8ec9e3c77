//! `config show` / `config path`.

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

pub fn show(session: Session) -> Result<(), CliError> {
    let mut config = nimbus_config::load_or_default();
    // Credentials never leave the config file in clear text.
    if let Some(api) = config.api.as_mut() {
        api.key = "<redacted>".into();
        api.refresh_token = "<redacted>".into();
    }

    let rendered = if matches!(
        session.format,
        OutputFormat::Interactive | OutputFormat::Text
    ) {
        toml::to_string_pretty(&config).map_err(|e| CliError::Config {
            message: e.to_string(),
        })?
    } else {
        output::render_single(session.format, &config, |_| String::new())
    };
    output::print_output(rendered.trim_end());
    Ok(())
}

pub fn path() {
    println!("{}", nimbus_config::config_path().display());
}
