//! Log listing and tailing.
//!
//! Listing is a plain GET; tailing streams NDJSON from the subscribe
//! endpoint into a channel. The tail worker stops — and the underlying
//! connection is dropped — when the cancellation token fires or the
//! receiver goes away, whichever happens first.

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::NimbusClient;

/// One log line as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub labels: Vec<LogLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLabel {
    pub name: String,
    pub value: String,
}

/// A page of historical logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub has_more: bool,
}

/// Which end of the time range to read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogDirection {
    #[default]
    Backward,
    Forward,
}

impl LogDirection {
    fn as_param(self) -> &'static str {
        match self {
            Self::Backward => "backward",
            Self::Forward => "forward",
        }
    }
}

/// Filter parameters shared by the list and subscribe endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListLogsParams {
    pub owner_id: String,
    pub resource_ids: Vec<String>,
    pub instance: Vec<String>,
    pub text: Vec<String>,
    pub level: Vec<String>,
    pub log_type: Vec<String>,
    pub host: Vec<String>,
    pub status_code: Vec<String>,
    pub method: Vec<String>,
    pub path: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: u32,
    pub direction: LogDirection,
}

impl ListLogsParams {
    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("ownerId", &self.owner_id);
        for v in &self.resource_ids {
            pairs.append_pair("resource", v);
        }
        for v in &self.instance {
            pairs.append_pair("instance", v);
        }
        for v in &self.text {
            pairs.append_pair("text", v);
        }
        for v in &self.level {
            pairs.append_pair("level", v);
        }
        for v in &self.log_type {
            pairs.append_pair("type", v);
        }
        for v in &self.host {
            pairs.append_pair("host", v);
        }
        for v in &self.status_code {
            pairs.append_pair("statusCode", v);
        }
        for v in &self.method {
            pairs.append_pair("method", v);
        }
        for v in &self.path {
            pairs.append_pair("path", v);
        }
        if let Some(start) = self.start_time {
            pairs.append_pair("startTime", &start.to_rfc3339());
        }
        if let Some(end) = self.end_time {
            pairs.append_pair("endTime", &end.to_rfc3339());
        }
        pairs.append_pair("limit", &self.limit.to_string());
        pairs.append_pair("direction", self.direction.as_param());
    }
}

impl NimbusClient {
    /// Fetch a page of historical logs.
    pub async fn list_logs(&self, params: &ListLogsParams) -> Result<LogPage, Error> {
        let mut url = self.api_url("v1/logs")?;
        params.apply(&mut url);
        self.get(url).await
    }

    /// Open a log subscription and stream entries into a channel.
    ///
    /// The connection is established before this returns, so callers
    /// see subscribe-time failures synchronously. The reader task ends
    /// when `cancel` fires, the server closes the stream, or the
    /// receiver is dropped; in every case the response (and its
    /// connection) is released.
    pub async fn tail_logs(
        &self,
        params: &ListLogsParams,
        cancel: CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<LogEntry>, Error> {
        let mut url = self.api_url("v1/logs/subscribe")?;
        params.apply(&mut url);

        let resp = self.get_raw(url).await?;
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut stream = resp.bytes_stream();
            let mut buf: Vec<u8> = Vec::new();

            loop {
                let chunk = tokio::select! {
                    () = cancel.cancelled() => break,
                    chunk = stream.next() => chunk,
                };

                let Some(chunk) = chunk else { break };
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        warn!(error = %e, "log stream read failed");
                        break;
                    }
                };

                buf.extend_from_slice(&bytes);
                // NDJSON: one entry per line
                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buf.drain(..=pos).collect();
                    let line = &line[..line.len().saturating_sub(1)];
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_slice::<LogEntry>(line) {
                        Ok(entry) => {
                            if tx.send(entry).is_err() {
                                return; // receiver gone, drop connection
                            }
                        }
                        Err(e) => warn!(error = %e, "skipping undecodable log line"),
                    }
                }
            }
            debug!("log tail stream closed");
        });

        Ok(rx)
    }
}
