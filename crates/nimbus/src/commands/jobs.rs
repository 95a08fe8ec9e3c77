//! `jobs cancel`.

use nimbus_core::CoreError;

use crate::error::CliError;
use crate::session::{self, Session};

pub async fn cancel(session: Session, service_id: String, job_id: String) -> Result<(), CliError> {
    let prompt = format!("Cancel job {job_id}?");
    session::run_confirmed(session, "Cancel job", prompt, move || async move {
        let client = session::core_client()?;
        let job = client
            .cancel_job(&service_id, &job_id)
            .await
            .map_err(CoreError::from)?;
        let status = job.status.unwrap_or_else(|| "canceled".into());
        Ok(format!("Canceled job {} ({status})", job.id))
    })
    .await
}
