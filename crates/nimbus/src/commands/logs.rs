//! `logs`: history page, optional live tail.

use chrono::{Duration as ChronoDuration, Utc};
use nimbus_api::{ListLogsParams, LogEntry};
use nimbus_core::{CoreError, ResourceQuery};
use nimbus_tui::GateRequirement;
use nimbus_tui::screens::{LogsScreen, ResourceListScreen};
use tokio_util::sync::CancellationToken;

use crate::cli::{Direction, LogsArgs, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::session::{self, Session};

pub async fn run(session: Session, args: LogsArgs) -> Result<(), CliError> {
    if session.interactive {
        return interactive(args).await;
    }

    let Some(resource_id) = args.resource_id.clone() else {
        return Err(CliError::usage(
            "a resource ID is required outside interactive mode",
        ));
    };

    let client = session::client()?;
    let mut params = build_params(&args, resource_id);
    params.owner_id = session::workspace_id()?;

    let page = client.list_logs(&params).await.map_err(CoreError::from)?;
    let has_more = page.has_more;
    let mut entries = page.logs;
    if args.direction == Direction::Backward {
        // Backward reads return newest first; print oldest first.
        entries.reverse();
    }
    print_history(session.format, &entries);
    if let Some(note) = truncation_note(has_more, args.limit) {
        // Stderr, so piped output stays parseable.
        eprintln!("{note}");
    }

    if args.tail {
        tail(&client, &params, session.format).await?;
    }
    Ok(())
}

/// With an ID, open the log screen for that resource; otherwise open
/// the resource list and let the operator pick. The resource lookup
/// happens inside the session, so a logged-out operator logs in first
/// and still lands on the logs they asked for.
async fn interactive(args: LogsArgs) -> Result<(), CliError> {
    let outcome = if let Some(id) = args.resource_id {
        session::run_app(
            format!("Logs {id}"),
            Box::new(LogsScreen::from_id(id)),
            GateRequirement::full(),
        )
        .await?
    } else {
        session::run_app(
            "Resources",
            Box::new(ResourceListScreen::new(ResourceQuery::default())),
            GateRequirement::full(),
        )
        .await?
    };
    session::report(&outcome);
    Ok(())
}

/// Tell the operator when the page was cut off by the server.
fn truncation_note(has_more: bool, limit: u32) -> Option<String> {
    has_more.then(|| {
        format!("note: only the most recent {limit} entries shown; raise --limit or narrow the time range")
    })
}

fn build_params(args: &LogsArgs, resource_id: String) -> ListLogsParams {
    let start_time = args
        .since
        .and_then(|since| ChronoDuration::from_std(since).ok())
        .map_or(args.start, |lookback| Some(Utc::now() - lookback));

    ListLogsParams {
        resource_ids: vec![resource_id],
        text: args.text.clone(),
        level: args.level.clone(),
        limit: args.limit,
        start_time,
        end_time: args.end,
        direction: args.direction.into(),
        ..Default::default()
    }
}

/// Stream live entries to stdout until ctrl-c.
async fn tail(
    client: &nimbus_api::NimbusClient,
    params: &ListLogsParams,
    format: OutputFormat,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let mut rx = client
        .tail_logs(params, cancel.clone())
        .await
        .map_err(CoreError::from)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            }
            entry = rx.recv() => match entry {
                Some(entry) => print_line(format, &entry),
                None => break,
            },
        }
    }
    Ok(())
}

fn print_history(format: OutputFormat, entries: &[LogEntry]) {
    if matches!(format, OutputFormat::Interactive | OutputFormat::Text) {
        for entry in entries {
            print_line(format, entry);
        }
    } else {
        output::print_output(&output::render_single(format, &entries, |_| String::new()));
    }
}

/// Structured formats get one JSON object per line so tails stay
/// machine-parseable; text gets a timestamped line.
fn print_line(format: OutputFormat, entry: &LogEntry) {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            if let Ok(line) = serde_json::to_string(entry) {
                println!("{line}");
            }
        }
        OutputFormat::Interactive | OutputFormat::Text => {
            let level = entry.level.as_deref().unwrap_or("-");
            println!(
                "{} {level:<7} {}",
                entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                entry.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LogsArgs {
        LogsArgs {
            resource_id: Some("srv-1".into()),
            tail: false,
            text: vec!["timeout".into()],
            level: vec!["error".into()],
            limit: 50,
            start: None,
            end: None,
            since: None,
            direction: Direction::Backward,
        }
    }

    #[test]
    fn params_carry_the_filters() {
        let params = build_params(&args(), "srv-1".into());
        assert_eq!(params.resource_ids, vec!["srv-1"]);
        assert_eq!(params.text, vec!["timeout"]);
        assert_eq!(params.level, vec!["error"]);
        assert_eq!(params.limit, 50);
        assert!(params.start_time.is_none());
    }

    #[test]
    fn truncated_pages_get_a_note() {
        assert!(truncation_note(false, 100).is_none());
        let note = truncation_note(true, 100).expect("truncated page must note it");
        assert!(note.contains("100"), "got: {note}");
    }

    #[test]
    fn since_takes_precedence_over_start() {
        let mut a = args();
        a.start = Some(Utc::now() - ChronoDuration::days(30));
        a.since = Some(std::time::Duration::from_secs(3600));
        let params = build_params(&a, "srv-1".into());

        let start = params.start_time.expect("since must set a start time");
        let age = Utc::now() - start;
        assert!(age >= ChronoDuration::minutes(59) && age <= ChronoDuration::minutes(61));
    }
}
