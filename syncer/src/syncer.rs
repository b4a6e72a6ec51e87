//! The sync orchestrator: decides between a full rebuild and a windowed
//! update, walks the upstream pages, and lands the results in the year
//! partition files before advancing the marker.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use nvd_mirror_model::{api2, legacy};

use crate::client::{FetchError, NvdClient};
use crate::convert;
use crate::feed::{FeedError, FeedStore};
use crate::marker::SyncMarker;

/// Format of the `lastModStartDate`/`lastModEndDate` query parameters. No
/// zone suffix; the API treats the values as UTC.
const API20_WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const LEGACY_FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const DEFAULT_PAGE_INTERVAL: Duration = Duration::from_secs(6);

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("fetching CVEs: {0}")]
    Fetch(FetchError),
    #[error("CVE identifier {0:?} has no usable year")]
    InvalidCveId(String),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("sync cancelled")]
    Cancelled,
}

/// Mirrors the NVD CVE corpus into legacy feed files under one directory.
///
/// Without a sync marker on disk a run rebuilds the mirror from scratch;
/// with one it fetches only the window since the last run and merges. The
/// marker is written strictly after all partitions, so an interrupted run
/// re-fetches its window instead of losing it.
pub struct CveSyncer {
    client: NvdClient,
    feeds: FeedStore,
    marker: SyncMarker,
    /// Minimum wait between successive page requests.
    pub page_interval: Duration,
}

impl CveSyncer {
    pub fn new(client: NvdClient, db_dir: impl Into<PathBuf>) -> Self {
        let db_dir = db_dir.into();
        Self {
            client,
            feeds: FeedStore::new(&db_dir),
            marker: SyncMarker::new(&db_dir),
            page_interval: DEFAULT_PAGE_INTERVAL,
        }
    }

    /// Run one synchronization end to end.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), SyncError> {
        let since = self.marker.load()?;
        match &since {
            None => {
                log::info!("No sync marker, rebuilding the full mirror");
                self.feeds.remove_stale()?;
            }
            Some(since) => log::info!("Syncing CVEs modified since {since}"),
        }

        let timestamp = self.sync(cancel, since.as_deref()).await?;

        // Every touched partition is on disk by now; a crash before this
        // line repeats work on the next run instead of losing it.
        self.marker.store(&timestamp)?;
        Ok(())
    }

    /// Fetch all pages for the given window (the full corpus when `since` is
    /// `None`), write the year partitions, and return the upstream timestamp
    /// of the last page.
    async fn sync(
        &self,
        cancel: &CancellationToken,
        since: Option<&str>,
    ) -> Result<String, SyncError> {
        // Upper bound captured once: records modified while paging belong
        // to the next run's window.
        let until = since.map(|_| Utc::now().format(API20_WINDOW_FORMAT).to_string());

        let mut start_index = 0;
        let mut vulnerabilities = Vec::new();

        let last_timestamp = loop {
            let page = self
                .client
                .fetch_page(cancel, start_index, since, until.as_deref())
                .await
                .map_err(|err| match err {
                    FetchError::Cancelled => SyncError::Cancelled,
                    err => SyncError::Fetch(err),
                })?;

            let total_results = page.total_results;
            start_index += page.results_per_page;
            vulnerabilities.extend(page.vulnerabilities);

            log::info!("Fetched {} of {} CVEs", vulnerabilities.len(), total_results);

            if start_index >= total_results {
                break page.timestamp;
            }

            // Unauthenticated NVD rate limits are strict; pause before the
            // next page, never after the final one.
            tokio::select! {
                _ = tokio::time::sleep(self.page_interval) => {}
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            }
        };

        let update = since.is_some();
        for (year, group) in group_by_year(&vulnerabilities)? {
            self.write_year(year, group, update)?;
        }

        Ok(last_timestamp)
    }

    fn write_year(
        &self,
        year: i32,
        group: Vec<&api2::Cve>,
        update: bool,
    ) -> Result<(), SyncError> {
        // Rejected records never reach the feed files.
        let converted: Vec<legacy::CveItem> = group
            .into_iter()
            .filter(|cve| cve.vuln_status.as_deref() != Some("Rejected"))
            .map(convert::to_legacy)
            .collect();

        let mut feed = if update && self.feeds.exists(year) {
            let mut feed = self.feeds.read(year)?;
            merge_items(&mut feed.cve_items, converted);
            feed
        } else {
            let mut feed = legacy::CveFeed::empty(feed_timestamp());
            feed.cve_items = if update {
                // New year inside an update window: upstream response order.
                converted
            } else {
                unique_sorted_by_id(converted)
            };
            feed
        };

        feed.update_count();
        log::info!("Writing {} CVEs for {year}", feed.cve_items.len());
        self.feeds.write(year, &feed)?;
        Ok(())
    }
}

fn feed_timestamp() -> String {
    Utc::now().format(LEGACY_FEED_TIME_FORMAT).to_string()
}

/// Group records by the year segment of their identifier (`CVE-YYYY-…`,
/// characters five through eight, taken verbatim as the partition key). An
/// identifier without a parseable year fails the whole run.
fn group_by_year(
    vulnerabilities: &[api2::Vulnerability],
) -> Result<BTreeMap<i32, Vec<&api2::Cve>>, SyncError> {
    let mut years: BTreeMap<i32, Vec<&api2::Cve>> = BTreeMap::new();
    for vulnerability in vulnerabilities {
        let cve = &vulnerability.cve;
        let id = cve.id.as_deref().unwrap_or_default();
        let year = id
            .get(4..8)
            .and_then(|segment| segment.parse().ok())
            .ok_or_else(|| SyncError::InvalidCveId(id.to_string()))?;
        years.entry(year).or_default().push(cve);
    }
    Ok(years)
}

/// Merge freshly converted items into a partition's existing list. Matched
/// identifiers are replaced in place, keeping their position; the rest is
/// appended in upstream response order. Update mode never re-sorts.
fn merge_items(existing: &mut Vec<legacy::CveItem>, incoming: Vec<legacy::CveItem>) {
    let mut positions: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(position, item)| (item.cve.cve_data_meta.id.clone(), position))
        .collect();

    for item in incoming {
        let id = item.cve.cve_data_meta.id.clone();
        match positions.get(&id) {
            Some(&position) => existing[position] = item,
            None => {
                positions.insert(id, existing.len());
                existing.push(item);
            }
        }
    }
}

/// Identifier-sorted, duplicate-free item list for a full rebuild. When the
/// same identifier shows up on multiple pages the last occurrence wins,
/// mirroring update-mode replacement.
fn unique_sorted_by_id(items: Vec<legacy::CveItem>) -> Vec<legacy::CveItem> {
    let mut by_id = BTreeMap::new();
    for item in items {
        by_id.insert(item.cve.cve_data_meta.id.clone(), item);
    }
    by_id.into_values().collect()
}
