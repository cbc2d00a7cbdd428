use crate::core::client::Fetch;
use crate::core::compound_name::{join, ORACLE_TAG_DELIMITER};
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ProviderNetworkRanges;
use crate::core::redundancy::RedundancyPolicy;
use crate::crawlers::{NetworkCrawler, Provider};
use log::debug;
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Oracle Cloud JSON
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Default, Deserialize, Serialize)]
struct OciNetworkSpec {
    #[serde(default)]
    last_updated_timestamp: String,
    regions: Vec<OciRegionNetworkDetails>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct OciRegionNetworkDetails {
    region: String,
    cidrs: Vec<OciCidrDefinition>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct OciCidrDefinition {
    cidr: String,
    #[serde(default)]
    tags: Vec<String>,
}

/*-------------------------------------------------------------------------------------------------
  Oracle Cloud Crawler
-------------------------------------------------------------------------------------------------*/

pub struct OciNetworkCrawler {
    url: &'static str,
}

impl OciNetworkCrawler {
    pub fn new() -> Self {
        Self {
            url: Provider::Oracle.urls()[0],
        }
    }

    fn parse_networks(&self, data: &[u8]) -> Result<ProviderNetworkRanges> {
        let spec: OciNetworkSpec =
            serde_json::from_slice(data).map_err(|source| Error::DecodeFailed {
                provider: self.human_readable_name().to_string(),
                source,
            })?;
        debug!("OCI ranges last updated {}", spec.last_updated_timestamp);

        let mut provider_networks = ProviderNetworkRanges::new(self.provider_key().as_str());
        for region_networks in &spec.regions {
            for cidr_definition in &region_networks.cidrs {
                let service = to_service_name(&cidr_definition.tags);
                provider_networks.add_ip_prefix(
                    &region_networks.region,
                    &service,
                    &cidr_definition.cidr,
                    RedundancyPolicy::ExactMatch,
                )?;
            }
        }

        Ok(provider_networks)
    }
}

impl Default for OciNetworkCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCrawler for OciNetworkCrawler {
    fn crawl(&self, fetch: &dyn Fetch) -> Result<ProviderNetworkRanges> {
        let data = fetch.get(self.url)?;
        self.parse_networks(&data)
    }

    fn human_readable_name(&self) -> &'static str {
        "Oracle Cloud Infrastructure"
    }

    fn provider_key(&self) -> Provider {
        Provider::Oracle
    }

    fn min_required_ip_prefixes(&self) -> usize {
        300
    }
}

/// Tags are unordered; sort them so the same set always yields the same service name.
fn to_service_name(tags: &[String]) -> String {
    let mut tags = tags.to_vec();
    tags.sort();
    join(ORACLE_TAG_DELIMITER, tags)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
