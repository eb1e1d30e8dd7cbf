//! Periodic OpenAPI document merging.
//!
//! # Responsibilities
//! - Group routes by OpenAPI source URL (once, at construction)
//! - Fetch every source concurrently once per cycle
//! - Merge matching paths under the route id prefix
//! - Publish the working document when all sources of a cycle completed
//!
//! # Cycle
//! ```text
//! Idle → FetchingAll(remaining = #sources) → publish → Idle
//! ```
//! A failed source is logged and counts as completed; paths merged by earlier
//! cycles stay in the working document.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};
use tracing::Instrument;

use crate::observability::{metrics, CorrelationId};
use crate::openapi::{AggregatedDoc, DocSnapshot};
use crate::routing::RouteTable;

/// A route whose paths come from a shared source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub route_id: String,
    /// Only source paths starting with this prefix are merged for the route.
    pub path_prefix: String,
}

/// All routes sharing one OpenAPI source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup {
    pub url: String,
    pub members: Vec<GroupMember>,
}

/// Group routes by their OpenAPI URL, preserving table order.
pub fn document_groups(table: &RouteTable) -> Vec<DocumentGroup> {
    let mut groups: Vec<DocumentGroup> = Vec::new();

    for entry in table.entries() {
        let member = GroupMember {
            route_id: entry.id.clone(),
            path_prefix: entry.target.path.clone(),
        };
        match groups.iter_mut().find(|group| group.url == entry.open_api_url) {
            Some(group) => group.members.push(member),
            None => groups.push(DocumentGroup {
                url: entry.open_api_url.clone(),
                members: vec![member],
            }),
        }
    }

    groups
}

/// Why a source contributed nothing to a cycle.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no paths object")]
    MissingPaths,
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub succeeded: usize,
    pub failed: usize,
    pub merged_paths: usize,
}

/// Background task owning the working document.
pub struct OpenApiAggregator {
    groups: Vec<DocumentGroup>,
    document: AggregatedDoc,
    snapshot: Arc<DocSnapshot>,
    client: reqwest::Client,
    interval: Duration,
}

impl OpenApiAggregator {
    /// Create an aggregator for every route in `table`.
    pub fn new(
        table: &RouteTable,
        document: AggregatedDoc,
        snapshot: Arc<DocSnapshot>,
        interval: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().no_proxy().build()?;

        Ok(Self {
            groups: document_groups(table),
            document,
            snapshot,
            client,
            interval,
        })
    }

    pub fn groups(&self) -> &[DocumentGroup] {
        &self.groups
    }

    /// Run one cycle now and then every interval until shutdown.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            sources = self.groups.len(),
            "OpenAPI merging enabled"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("OpenAPI aggregator received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Fetch all sources, merge what succeeded and publish.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let span = tracing::info_span!("open_api", correlation_id = %CorrelationId::new());
        self.merge_all().instrument(span).await
    }

    async fn merge_all(&mut self) -> CycleReport {
        let started = Instant::now();
        let mut remaining = self.groups.len();
        tracing::info!(sources = remaining, "Started update for OpenAPI document");

        let mut fetches: FuturesUnordered<_> = self
            .groups
            .iter()
            .enumerate()
            .map(|(idx, group)| {
                let client = self.client.clone();
                let url = group.url.clone();
                tracing::debug!(url = %url, "OpenAPI document update started");
                async move { (idx, fetch_paths(&client, &url).await) }
            })
            .collect();

        let mut report = CycleReport::default();
        while let Some((idx, result)) = fetches.next().await {
            let group = &self.groups[idx];
            remaining -= 1;

            match result {
                Ok(paths) => {
                    let merged = merge_paths(&mut self.document, group, &paths);
                    report.succeeded += 1;
                    report.merged_paths += merged;
                    tracing::info!(url = %group.url, merged, remaining, "OpenAPI document merged");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(url = %group.url, error = %e, remaining, "OpenAPI document update failed");
                }
            }
        }

        match self.document.to_json() {
            Ok(json) => {
                self.snapshot.publish(json);
                tracing::info!(
                    succeeded = report.succeeded,
                    failed = report.failed,
                    "OpenAPI document fully updated"
                );
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize OpenAPI document"),
        }

        metrics::record_open_api_cycle(report.succeeded, report.failed, started);
        report
    }
}

/// Merge the source `paths` of one group into `document`, keyed as
/// `route_id` followed by the unchanged source key.
/// Returns the number of inserted paths.
pub fn merge_paths(document: &mut AggregatedDoc, group: &DocumentGroup, paths: &Map<String, Value>) -> usize {
    let mut merged = 0;
    for (key, operations) in paths {
        for member in &group.members {
            if key.starts_with(&member.path_prefix)
                && document.insert_path(format!("{}{}", member.route_id, key), operations.clone())
            {
                merged += 1;
            }
        }
    }
    merged
}

async fn fetch_paths(client: &reqwest::Client, url: &str) -> Result<Map<String, Value>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.bytes().await?;
    let mut document: Value = serde_json::from_slice(&body)?;
    match document.get_mut("paths").map(Value::take) {
        Some(Value::Object(paths)) => Ok(paths),
        _ => Err(FetchError::MissingPaths),
    }
}
