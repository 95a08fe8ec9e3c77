//! `list` and `restart`.

use nimbus_core::{Resource, ResourceKind, ResourceQuery, ResourceService};
use nimbus_tui::GateRequirement;
use nimbus_tui::screens::ResourceListScreen;
use tabled::Tabled;

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output;
use crate::session::{self, Session};

#[derive(Tabled)]
pub struct ResourceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn to_row(resource: &Resource) -> ResourceRow {
    ResourceRow {
        name: resource.name.clone(),
        kind: resource.kind().to_string(),
        environment: resource.environment_name.clone().unwrap_or_default(),
        project: resource.project_name.clone().unwrap_or_default(),
        status: resource.status().unwrap_or_default().to_owned(),
        id: resource.id.clone(),
    }
}

pub async fn list(session: Session, args: ListArgs) -> Result<(), CliError> {
    let query = ResourceQuery {
        environment_ids: args.environment_ids,
        include_previews: args.include_previews,
    };

    if session.interactive {
        let outcome = session::run_app(
            "Resources",
            Box::new(ResourceListScreen::new(query)),
            GateRequirement::full(),
        )
        .await?;
        session::report(&outcome);
        return Ok(());
    }

    let client = session::client()?;
    let resources = ResourceService::new(client).list_all(&query).await?;
    output::print_output(&output::render_list(session.format, &resources, to_row));
    Ok(())
}

pub async fn restart(session: Session, resource_id: String) -> Result<(), CliError> {
    // Unsupported kinds fail before any prompt or network call.
    let kind = ResourceKind::from_id(&resource_id)?;
    if matches!(kind, ResourceKind::KeyValue | ResourceKind::CronJob) {
        return Err(CliError::Unsupported {
            kind: kind.to_string(),
            operation: "restart",
        });
    }

    let prompt = format!("Restart {resource_id}?");
    let id = resource_id;
    session::run_confirmed(session, "Restart", prompt, move || async move {
        let client = session::core_client()?;
        ResourceService::new(client).restart(&id).await?;
        Ok(format!("Restarted {id}"))
    })
    .await
}
