//! `workspace set` / `workspace show`.

use nimbus_core::CoreError;
use nimbus_tui::GateRequirement;
use nimbus_tui::screens::WorkspaceScreen;

use crate::error::CliError;
use crate::output;
use crate::session::{self, Session};

pub async fn set(session: Session, id: Option<String>) -> Result<(), CliError> {
    if let Some(id) = id {
        // Validate the ID against the API before persisting it.
        let client = session::client()?;
        let owner = client.retrieve_owner(&id).await.map_err(CoreError::from)?;
        let mut config = nimbus_config::load_or_default();
        config.set_workspace(owner.id.clone(), owner.name.clone());
        nimbus_config::save(&config)?;
        println!("Workspace set to {} ({})", owner.name, owner.id);
        return Ok(());
    }

    if !session.interactive {
        return Err(CliError::usage(
            "--id is required outside interactive mode",
        ));
    }

    session::run_app(
        "Workspace",
        Box::new(WorkspaceScreen::new()),
        GateRequirement::login_only(),
    )
    .await?;
    let config = nimbus_config::load_or_default();
    if let Ok(workspace) = config.workspace() {
        println!("Workspace set to {} ({})", workspace.name, workspace.id);
    }
    Ok(())
}

pub fn show(session: Session) -> Result<(), CliError> {
    let config = nimbus_config::load_or_default();
    let workspace = config.workspace()?;
    output::print_output(&output::render_single(session.format, workspace, |w| {
        format!("{} ({})", w.name, w.id)
    }));
    Ok(())
}
