use crate::core::client::Fetch;
use crate::core::config::{
    CHECKSUM_FILE_NAME, LATEST_PREFIX_FILE_NAME, MASTER_BUCKET_PREFIX, MAX_NUM_DEFINITIONS,
    NETWORK_FILE_NAME, TIMESTAMP_FORMAT,
};
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ExternalNetworkSources;
use crate::core::storage::ObjectStore;
use crate::core::validate::validate;
use crate::crawlers::NetworkCrawler;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/*-------------------------------------------------------------------------------------------------
  Crawling
-------------------------------------------------------------------------------------------------*/

/// How a crawl reacts to a provider that fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strictness {
    /// Abort at the first failing provider; nothing is published.
    #[default]
    Strict,

    /// Record the failure, keep crawling, and publish what succeeded.
    Lenient,
}

/// The outcome of crawling a set of providers.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub sources: ExternalNetworkSources,

    /// Minimum prefix count per crawled provider name, fed to [validate].
    pub thresholds: BTreeMap<String, usize>,

    /// Names of the providers that failed to crawl (lenient crawls only).
    pub failed: Vec<String>,
}

impl CrawlReport {
    /// `Ok` when every provider was crawled, otherwise [Error::PartialCrawl].
    pub fn ensure_complete(&self) -> Result<()> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(Error::PartialCrawl {
                failed: self.failed.clone(),
            })
        }
    }
}

/// Crawl each provider in turn.
///
/// Fails with [Error::NoCrawlSources] when no provider could be crawled.
pub fn crawl_all(
    crawlers: &[Box<dyn NetworkCrawler>],
    fetch: &dyn Fetch,
    strictness: Strictness,
) -> Result<CrawlReport> {
    let names: Vec<&str> = crawlers.iter().map(|c| c.human_readable_name()).collect();
    info!("Crawling from this list of providers: {}", names.join(", "));

    let mut report = CrawlReport::default();
    for crawler in crawlers {
        let name = crawler.human_readable_name();
        info!("Crawling from provider {name}...");

        match crawler.crawl(fetch) {
            Ok(provider_networks) => {
                info!(
                    "Successfully crawled provider {name}: {} IP prefixes",
                    provider_networks.ip_prefix_count()
                );
                report.thresholds.insert(
                    crawler.provider_key().to_string(),
                    crawler.min_required_ip_prefixes(),
                );
                report.sources.push(provider_networks);
            }
            Err(crawl_error) => {
                error!("Failed to crawl networks for {name}: {crawl_error}");
                match strictness {
                    Strictness::Strict => return Err(crawl_error),
                    Strictness::Lenient => report.failed.push(crawler.provider_key().to_string()),
                }
            }
        }
    }

    if report.sources.is_empty() {
        return Err(Error::NoCrawlSources);
    }
    Ok(report)
}

/*-------------------------------------------------------------------------------------------------
  Serialization
-------------------------------------------------------------------------------------------------*/

/// Serialize the sources to JSON and compute the hex-encoded SHA-256 digest of the bytes.
pub fn marshal_and_checksum(sources: &ExternalNetworkSources) -> Result<(Vec<u8>, String)> {
    let data = serde_json::to_vec(sources)?;
    let checksum = hex::encode(Sha256::digest(&data));
    Ok((data, checksum))
}

/// Object prefix of the snapshot taken at `timestamp`, made unique with a short hash suffix.
fn snapshot_prefix(now: &DateTime<Utc>) -> String {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let nanos = now.timestamp_nanos_opt().unwrap_or_default();
    let digest = hex::encode(Sha256::digest(format!("{timestamp}{nanos}")));
    format!("{MASTER_BUCKET_PREFIX}/{timestamp}-{}", &digest[..8])
}

/*-------------------------------------------------------------------------------------------------
  Publisher
-------------------------------------------------------------------------------------------------*/

/// A published (or, in a dry run, would-be published) snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    pub prefix: String,
    pub checksum: String,
    pub timestamp: String,
}

/// Writes validated snapshots to a bucket and prunes the old ones.
///
/// Bucket layout:
///
/// ```text
/// external-networks/latest_prefix                         -> "external-networks/<snapshot>"
/// external-networks/<YYYY-MM-DD HH-MM-SS>-<suffix>/networks
/// external-networks/<YYYY-MM-DD HH-MM-SS>-<suffix>/checksum
/// ```
pub struct Publisher<'s> {
    store: &'s dyn ObjectStore,
    bucket: String,
    dry_run: bool,
    max_definitions: usize,
}

impl<'s> Publisher<'s> {
    pub fn new(store: &'s dyn ObjectStore, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            dry_run: false,
            max_definitions: MAX_NUM_DEFINITIONS,
        }
    }

    /// Compute and log the snapshot without writing or deleting anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Number of snapshots kept by [Publisher::truncate_outdated]; defaults to `10`.
    pub fn max_definitions(mut self, max_definitions: usize) -> Self {
        self.max_definitions = max_definitions;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /*-------------------------------------------------------------------------
      Publish
    -------------------------------------------------------------------------*/

    /// Validate the crawled sources and upload them as a new snapshot.
    ///
    /// The network file and its checksum are written first; the latest-prefix pointer is only
    /// moved once both are in place.
    pub fn publish(&self, report: &CrawlReport) -> Result<Snapshot> {
        validate(&report.sources, &report.thresholds)?;

        let (data, checksum) = marshal_and_checksum(&report.sources)?;
        let now = Utc::now();
        let snapshot = Snapshot {
            prefix: snapshot_prefix(&now),
            checksum,
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        };

        if self.dry_run {
            info!(
                "Dry run specified. Skipping upload. Folder name is: {}. Checksum computed is: {}. Timestamp is: {}",
                snapshot.prefix, snapshot.checksum, snapshot.timestamp
            );
            return Ok(snapshot);
        }

        info!("Uploading crawled networks to bucket {}...", self.bucket);
        self.store
            .write(&self.bucket, &snapshot.prefix, NETWORK_FILE_NAME, &data)?;
        self.store.write(
            &self.bucket,
            &snapshot.prefix,
            CHECKSUM_FILE_NAME,
            snapshot.checksum.as_bytes(),
        )?;
        self.store.write(
            &self.bucket,
            MASTER_BUCKET_PREFIX,
            LATEST_PREFIX_FILE_NAME,
            snapshot.prefix.as_bytes(),
        )?;
        info!("Successfully uploaded {} and its checksum", snapshot.prefix);

        Ok(snapshot)
    }

    /*-------------------------------------------------------------------------
      Truncate Outdated
    -------------------------------------------------------------------------*/

    /// Delete all but the newest `max_definitions` snapshots; returns the deleted prefixes.
    ///
    /// Fails with [Error::LatestPrefixFileNotFound] when the bucket has no latest-prefix
    /// pointer, since that means the bucket was not written by a publish run.
    pub fn truncate_outdated(&self) -> Result<Vec<String>> {
        if self.dry_run {
            info!("Dry run specified. Skipping to truncate any network definitions.");
            return Ok(Vec::new());
        }

        let latest_prefix_file = format!("{MASTER_BUCKET_PREFIX}/{LATEST_PREFIX_FILE_NAME}");
        if self
            .store
            .list_objects(&self.bucket, &latest_prefix_file)?
            .is_empty()
        {
            return Err(Error::LatestPrefixFileNotFound {
                bucket: self.bucket.clone(),
            });
        }

        let snapshot_root = format!("{MASTER_BUCKET_PREFIX}/");
        let mut snapshots: Vec<String> = self
            .store
            .list_prefixes(&self.bucket)?
            .into_iter()
            .filter(|prefix| prefix.starts_with(&snapshot_root))
            .collect();

        // Never drop the snapshot the pointer refers to.
        let keep = self.max_definitions.max(1);
        if snapshots.len() <= keep {
            return Ok(Vec::new());
        }
        warn!(
            "Found {} records. Max allowed is: {}. Truncating some records...",
            snapshots.len(),
            keep
        );

        // Timestamped names sort chronologically.
        snapshots.sort();
        let outdated: Vec<String> = snapshots.drain(..snapshots.len() - keep).collect();
        info!("Deleting objects with folder names: {}", outdated.join(", "));
        for prefix in &outdated {
            self.store.delete(&self.bucket, prefix)?;
        }

        Ok(outdated)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
