//! Crawl the public IP ranges published by the major cloud providers, normalize them into a
//! single provider → region → service → prefixes document, and publish validated, checksummed
//! snapshots to an object store.
//!
//! ```no_run
//! use cloudipranges::{crawlers, crawl_all, Client, LocalObjectStore, Publisher, Strictness};
//!
//! let crawlers = crawlers::get(&[crawlers::Provider::Azure]);
//! let report = crawl_all(&crawlers, &Client::new(), Strictness::Strict).unwrap();
//!
//! let store = LocalObjectStore::default();
//! let publisher = Publisher::new(&store, "external-networks-bucket");
//! publisher.publish(&report).unwrap();
//! publisher.truncate_outdated().unwrap();
//! ```

mod core;
pub mod crawlers;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::cidr;
pub use crate::core::compound_name;
pub use crate::core::config;
pub use crate::core::redundancy;

pub use crate::core::client::{resolve_download_url, Client, ClientBuilder, Fetch};
pub use crate::core::errors::{Error, Result};
pub use crate::core::network_ranges::{
    ExternalNetworkSources, ProviderNetworkRanges, RegionNetworkDetail, ServiceIpRanges,
};
pub use crate::core::prefix_type::PrefixType;
pub use crate::core::publish::{
    crawl_all, marshal_and_checksum, CrawlReport, Publisher, Snapshot, Strictness,
};
pub use crate::core::redundancy::{RedundancyPolicy, RegionServicePair};
pub use crate::core::storage::{LocalObjectStore, ObjectStore};
pub use crate::core::validate::validate;
